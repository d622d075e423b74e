pub mod widget;

pub use widget::{parse_hex_color, LabelOverlayWidget};
