use crate::core::geometry::DisplaySize;
use crate::overlay::renderer::{LabelElement, OverlayLayout};

/// Whatever actually shows the overlay: an egui painter, a DOM, a test double.
///
/// Surfaces report interaction back as [`crate::input::events::SurfaceEvent`]s.
pub trait OverlaySurface {
    /// Current size of the overlay container, read fresh whenever it matters.
    fn container_size(&self) -> DisplaySize;

    /// Replaces all overlay elements with `layout`.
    fn present(&mut self, layout: &OverlayLayout);

    /// Updates one element in place, without touching the others.
    fn update_element(&mut self, element: &LabelElement);
}

/// A surface that only keeps what it was told to show
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    size: DisplaySize,
    layout: OverlayLayout,
    presents: usize,
    updates: usize,
}

impl HeadlessSurface {
    pub fn new(size: DisplaySize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn resize(&mut self, size: DisplaySize) {
        self.size = size;
    }

    pub fn layout(&self) -> &OverlayLayout {
        &self.layout
    }

    /// Number of full replacements so far
    pub fn present_count(&self) -> usize {
        self.presents
    }

    /// Number of single-element updates so far
    pub fn update_count(&self) -> usize {
        self.updates
    }
}

impl OverlaySurface for HeadlessSurface {
    fn container_size(&self) -> DisplaySize {
        self.size
    }

    fn present(&mut self, layout: &OverlayLayout) {
        self.layout = layout.clone();
        self.presents += 1;
    }

    fn update_element(&mut self, element: &LabelElement) {
        if let Some(existing) = self.layout.element_mut(&element.name) {
            *existing = element.clone();
        }
        self.updates += 1;
    }
}
