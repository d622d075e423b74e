//! Crate-wide constants for the label overlay.

/// Lower bound applied to geographic spans and pixel extents before they are used as divisors.
pub const SPAN_EPSILON: f64 = 1e-9;

/// A dragged label within this many geographic units of its default position
/// (on both axes) snaps back to the default.
pub const SNAP_TOLERANCE: f64 = 0.0005;

/// Label font size used when the service omits style metadata.
pub const DEFAULT_LABEL_FONT_PX: f64 = 12.0;

/// Poster defaults reported by the service when no styling is requested.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
pub const DEFAULT_FONT_COLOR: &str = "#ffffff";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#0a3dbb";

/// Signature overlay scale limits, in percent of the poster width.
pub const SIGNATURE_SCALE_MIN: f64 = 2.0;
pub const SIGNATURE_SCALE_MAX: f64 = 50.0;

/// Side of the square hide affordance drawn next to each label, in display pixels.
pub const HIDE_AFFORDANCE_SIZE: f32 = 14.0;
