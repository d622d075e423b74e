pub mod renderer;
pub mod surface;

pub use renderer::{LabelElement, OverlayLayout, OverlayRenderer};
pub use surface::{HeadlessSurface, OverlaySurface};
