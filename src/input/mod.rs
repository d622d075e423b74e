pub mod drag;
pub mod events;
pub mod visibility;

// Re-export the essential types
pub use drag::{DragCommit, DragController, DragState};
pub use events::{EventHandled, HitTarget, SurfaceEvent};
pub use visibility::VisibilityController;
