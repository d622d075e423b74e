use crate::overlay::renderer::{LabelElement, OverlayRenderer};
use crate::session::MapSession;

/// Label visibility operations
pub struct VisibilityController;

impl VisibilityController {
    /// Hides a label for the rest of the session's map.
    ///
    /// Returns the restyled element so the surface can update it in place, or
    /// `None` when the label is unknown or already hidden.
    pub fn hide(session: &mut MapSession, renderer: &mut OverlayRenderer, name: &str) -> Option<LabelElement> {
        if !session.hide(name) {
            return None;
        }
        if renderer.hovered() == Some(name) {
            renderer.set_hovered(None);
        }
        log::debug!("label {name} hidden");
        renderer.element(session, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{GeoBounds, GeoPoint};
    use crate::core::geometry::DisplaySize;
    use crate::labels::record::{LabelRecord, LabelStyle};
    use crate::sync::wire::{GenerateRequest, MapPayload, MapReply};

    fn session() -> MapSession {
        let map = MapPayload {
            map_url: "/maps/p.png".to_string(),
            figure: None,
            axes: None,
            bounds: GeoBounds::new(0.0, 10.0, 0.0, 10.0),
            style: LabelStyle::default(),
            labels: vec![LabelRecord::new("Kraków", GeoPoint::new(5.0, 5.0), 0.0, 0.0)],
            paper: None,
            final_download: None,
            warnings: Vec::new(),
        };
        let mut session = MapSession::new();
        let pending = session.begin_generate(GenerateRequest::new("Kraków")).unwrap();
        session.complete_generate(pending, Ok(MapReply::new(map))).unwrap();
        session.set_display(DisplaySize::new(800.0, 800.0));
        session
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut session = session();
        let mut renderer = OverlayRenderer::new();
        renderer.set_hovered(Some("Kraków"));

        let element = VisibilityController::hide(&mut session, &mut renderer, "Kraków").unwrap();
        assert!(element.hidden);
        assert!(!element.interactive);
        assert_eq!(renderer.hovered(), None);

        assert!(VisibilityController::hide(&mut session, &mut renderer, "Kraków").is_none());
        assert_eq!(session.labels().hidden_names(), vec!["Kraków".to_string()]);
    }

    #[test]
    fn test_hide_unknown_label() {
        let mut session = session();
        let mut renderer = OverlayRenderer::new();
        assert!(VisibilityController::hide(&mut session, &mut renderer, "Gdańsk").is_none());
        assert!(session.labels().hidden_names().is_empty());
    }
}
