use crate::core::geo::Point;
use crate::core::geometry::DisplaySize;
use serde::{Deserialize, Serialize};

/// The part of a label element under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    /// The label text itself; pressing it starts a drag
    Label(String),
    /// The small hide button next to the label
    HideButton(String),
}

impl HitTarget {
    pub fn name(&self) -> &str {
        match self {
            HitTarget::Label(name) | HitTarget::HideButton(name) => name,
        }
    }
}

/// Events a rendering surface reports to the label editor.
///
/// Pointer positions are display pixels relative to the overlay container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The map image finished decoding and was laid out at `displayed`
    ImageLoaded {
        natural: DisplaySize,
        displayed: DisplaySize,
    },
    /// The layout changed the rendered image size
    Resized { displayed: DisplaySize },
    PointerDown { target: HitTarget, position: Point },
    PointerMove { position: Point },
    PointerUp { position: Point },
    /// Pointer entered a label element
    PointerEnter { name: String },
    /// Pointer left a label element
    PointerLeave { name: String },
}

impl SurfaceEvent {
    /// Gets the pointer position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            SurfaceEvent::PointerDown { position, .. }
            | SurfaceEvent::PointerMove { position }
            | SurfaceEvent::PointerUp { position } => Some(*position),
            _ => None,
        }
    }
}

/// Whether an event was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl EventHandled {
    pub fn from_bool(handled: bool) -> Self {
        if handled {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }
}
