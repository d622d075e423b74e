use crate::core::geo::Point;
use crate::core::geometry::DisplaySize;
use crate::labels::record::LabelRecord;
use crate::session::MapSession;

/// Placement and styling of one label on the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct LabelElement {
    pub name: String,
    /// Bottom-center of the label text, in display pixels relative to the overlay container
    pub anchor: Point,
    pub font_size_px: f64,
    pub font_family: String,
    pub color: String,
    pub opacity: f32,
    /// Whether the element receives pointer events
    pub interactive: bool,
    pub hidden: bool,
    /// Whether the hide button is currently revealed
    pub show_hide_affordance: bool,
    pub locked: bool,
}

/// Complete overlay contents; surfaces replace whatever they showed before
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayLayout {
    pub visible: bool,
    pub size: DisplaySize,
    pub elements: Vec<LabelElement>,
}

impl OverlayLayout {
    /// An empty, hidden overlay
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn element(&self, name: &str) -> Option<&LabelElement> {
        self.elements.iter().find(|element| element.name == name)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut LabelElement> {
        self.elements.iter_mut().find(|element| element.name == name)
    }
}

/// Lays labels out over the displayed map image.
///
/// Rendering is a pure function of the session plus the hovered label, so it
/// can run on every resize and image load.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    hovered: Option<String>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Returns `true` when the hovered label changed.
    pub fn set_hovered(&mut self, name: Option<&str>) -> bool {
        if self.hovered.as_deref() == name {
            return false;
        }
        self.hovered = name.map(str::to_string);
        true
    }

    /// Full layout. Without labels or a loaded image the overlay is hidden
    /// rather than drawn with invalid transforms.
    pub fn render(&self, session: &MapSession) -> OverlayLayout {
        let display = session.display();
        if !session.has_map() || session.labels().is_empty() || !display.is_loaded() {
            return OverlayLayout::hidden();
        }

        let elements = session
            .labels()
            .labels()
            .iter()
            .filter_map(|label| self.layout_label(session, label))
            .collect();

        OverlayLayout {
            visible: true,
            size: display,
            elements,
        }
    }

    /// Layout of a single label, for in-place updates.
    pub fn element(&self, session: &MapSession, name: &str) -> Option<LabelElement> {
        if !session.display().is_loaded() {
            return None;
        }
        let label = session.labels().get(name)?;
        self.layout_label(session, label)
    }

    fn layout_label(&self, session: &MapSession, label: &LabelRecord) -> Option<LabelElement> {
        let snapshot = session.snapshot()?;
        let display = session.display();
        let position = session.pending_position(&label.name)?;

        let anchor = snapshot.geometry.to_pixel(&position, &display);
        let font_size_px = snapshot
            .geometry
            .scale_font(snapshot.style.label_font_size_px, &display);

        let hidden = session.is_hidden(&label.name);
        let (color, opacity) = if hidden {
            (snapshot.style.background_color.clone(), 0.0)
        } else {
            (snapshot.style.font_color.clone(), 1.0)
        };

        Some(LabelElement {
            name: label.name.clone(),
            anchor,
            font_size_px,
            font_family: snapshot.style.font_family.clone(),
            color,
            opacity,
            interactive: !hidden,
            hidden,
            show_hide_affordance: !hidden && self.hovered() == Some(label.name.as_str()),
            locked: label.locked,
        })
    }
}
