pub mod record;
pub mod store;

pub use record::{LabelRecord, LabelStyle};
pub use store::LabelStore;
