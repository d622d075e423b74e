//! The label editor: single owner of a [`MapSession`], wiring surface events
//! to the drag and visibility controllers and keeping the overlay current.

use crate::core::constants::SNAP_TOLERANCE;
use crate::input::drag::DragController;
use crate::input::events::{EventHandled, HitTarget, SurfaceEvent};
use crate::input::visibility::VisibilityController;
use crate::overlay::renderer::{OverlayLayout, OverlayRenderer};
use crate::overlay::surface::OverlaySurface;
use crate::session::MapSession;

pub struct LabelEditor<S: OverlaySurface> {
    session: MapSession,
    renderer: OverlayRenderer,
    drag: DragController,
    surface: S,
}

impl<S: OverlaySurface> LabelEditor<S> {
    pub fn new(session: MapSession, surface: S) -> Self {
        Self::with_tolerance(session, surface, SNAP_TOLERANCE)
    }

    pub fn with_tolerance(session: MapSession, surface: S, tolerance: f64) -> Self {
        Self {
            session,
            renderer: OverlayRenderer::new(),
            drag: DragController::new(tolerance),
            surface,
        }
    }

    pub fn session(&self) -> &MapSession {
        &self.session
    }

    /// Mutable access for the sync layer. Call [`LabelEditor::render`] after
    /// a response changed the map.
    pub fn session_mut(&mut self) -> &mut MapSession {
        &mut self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Re-renders the whole overlay and hands it to the surface.
    pub fn render(&mut self) -> OverlayLayout {
        let layout = self.renderer.render(&self.session);
        self.surface.present(&layout);
        layout
    }

    /// Drops any drag in progress, e.g. because a new map replaced the labels.
    pub fn cancel_drag(&mut self) {
        if let Some(name) = self.drag.cancel() {
            log::debug!("drag of {name} abandoned");
        }
    }

    pub fn handle_event(&mut self, event: SurfaceEvent) -> EventHandled {
        match event {
            SurfaceEvent::ImageLoaded { natural, displayed } => {
                log::debug!(
                    "map image loaded: natural {}x{}, displayed {}x{}",
                    natural.width,
                    natural.height,
                    displayed.width,
                    displayed.height
                );
                self.session.set_display(displayed);
                self.render();
                EventHandled::Handled
            }
            SurfaceEvent::Resized { displayed } => {
                if !self.session.set_display(displayed) {
                    return EventHandled::NotHandled;
                }
                self.render();
                EventHandled::Handled
            }
            SurfaceEvent::PointerDown {
                target: HitTarget::Label(name),
                position,
            } => {
                let element = match self.renderer.element(&self.session, &name) {
                    Some(element) if element.interactive => element,
                    _ => return EventHandled::NotHandled,
                };
                let container = self.surface.container_size();
                let revision = self.session.revision();
                EventHandled::from_bool(self.drag.begin(&name, element.anchor, position, container, revision))
            }
            SurfaceEvent::PointerDown {
                target: HitTarget::HideButton(name),
                ..
            } => match VisibilityController::hide(&mut self.session, &mut self.renderer, &name) {
                Some(element) => {
                    self.surface.update_element(&element);
                    EventHandled::Handled
                }
                None => EventHandled::NotHandled,
            },
            SurfaceEvent::PointerMove { position } => {
                let (name, anchor) = match self.drag.update(position) {
                    Some((name, anchor)) => (name.to_string(), anchor),
                    None => return EventHandled::NotHandled,
                };
                match self.renderer.element(&self.session, &name) {
                    Some(mut element) => {
                        element.anchor = anchor;
                        self.surface.update_element(&element);
                        EventHandled::Handled
                    }
                    None => EventHandled::NotHandled,
                }
            }
            SurfaceEvent::PointerUp { position } => {
                let container = self.surface.container_size();
                let commit = match self.drag.finish(position, container, &self.session) {
                    Some(commit) => commit,
                    None => return EventHandled::NotHandled,
                };
                commit.apply(&mut self.session);
                if let Some(element) = self.renderer.element(&self.session, commit.name()) {
                    self.surface.update_element(&element);
                }
                EventHandled::Handled
            }
            SurfaceEvent::PointerEnter { name } => {
                if self.session.is_hidden(&name) || !self.renderer.set_hovered(Some(name.as_str())) {
                    return EventHandled::NotHandled;
                }
                // Only one affordance is visible at a time; repaint the whole overlay.
                self.render();
                EventHandled::Handled
            }
            SurfaceEvent::PointerLeave { name } => {
                if self.renderer.hovered() != Some(name.as_str()) {
                    return EventHandled::NotHandled;
                }
                self.renderer.set_hovered(None);
                if let Some(element) = self.renderer.element(&self.session, &name) {
                    self.surface.update_element(&element);
                }
                EventHandled::Handled
            }
        }
    }
}
