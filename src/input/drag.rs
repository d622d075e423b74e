//! Label dragging: `Idle -> Dragging -> Idle`.
//!
//! While dragging only the on-screen position moves. The label store is
//! written once, on release, after the final pixel position has been turned
//! back into geographic coordinates.

use crate::core::constants::SNAP_TOLERANCE;
use crate::core::geo::{GeoPoint, Point};
use crate::core::geometry::DisplaySize;
use crate::session::MapSession;

/// An in-progress drag
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub name: String,
    /// Element anchor (bottom-center) when the drag started
    pub start_anchor: Point,
    pub start_pointer: Point,
    /// Current clamped anchor position
    pub current: Point,
    /// Container size read at drag start
    pub container: DisplaySize,
    /// Session revision the drag started on
    pub revision: u64,
}

impl ActiveDrag {
    /// Start anchor moved by the pointer delta, kept inside the container
    fn anchor_for(&self, pointer: Point, container: &DisplaySize) -> Point {
        let delta = pointer.subtract(&self.start_pointer);
        self.start_anchor
            .add(&delta)
            .clamp_to(container.width, container.height)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

/// Result of releasing a dragged label
#[derive(Debug, Clone, PartialEq)]
pub enum DragCommit {
    /// The label moved away from its default position
    Override { name: String, position: GeoPoint },
    /// The label was dropped close enough to its default to snap back
    SnapBack { name: String },
}

impl DragCommit {
    pub fn name(&self) -> &str {
        match self {
            DragCommit::Override { name, .. } | DragCommit::SnapBack { name } => name,
        }
    }

    /// Writes the commit into the session's label state.
    pub fn apply(&self, session: &mut MapSession) {
        match self {
            DragCommit::Override { name, position } => {
                log::debug!("label {name} moved to ({:.5}, {:.5})", position.lon, position.lat);
                session.set_override(name, *position);
            }
            DragCommit::SnapBack { name } => {
                log::debug!("label {name} snapped back to its default position");
                session.clear_override(name);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    tolerance: f64,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(SNAP_TOLERANCE)
    }
}

impl DragController {
    pub fn new(tolerance: f64) -> Self {
        Self {
            state: DragState::Idle,
            tolerance,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Abandons the current drag without committing. Returns the label that was being dragged.
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(drag) => Some(drag.name),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn dragging_name(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging(drag) => Some(drag.name.as_str()),
            DragState::Idle => None,
        }
    }

    /// Pointer-down on a label body. Ignored while another drag is active.
    ///
    /// `revision` is the session's [`MapSession::revision`] at pointer-down.
    pub fn begin(
        &mut self,
        name: &str,
        anchor: Point,
        pointer: Point,
        container: DisplaySize,
        revision: u64,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.state = DragState::Dragging(ActiveDrag {
            name: name.to_string(),
            start_anchor: anchor,
            start_pointer: pointer,
            current: anchor,
            container,
            revision,
        });
        true
    }

    /// Pointer-move: the new on-screen anchor of the dragged label.
    pub fn update(&mut self, pointer: Point) -> Option<(&str, Point)> {
        match &mut self.state {
            DragState::Dragging(drag) => {
                drag.current = drag.anchor_for(pointer, &drag.container);
                Some((drag.name.as_str(), drag.current))
            }
            DragState::Idle => None,
        }
    }

    /// Pointer-up: returns to idle and decides between an override and a snap-back.
    ///
    /// `container` is re-read by the caller so layout changes during the drag
    /// are honoured. Returns `None` when idle, when a response replaced the map
    /// since pointer-down, or when the new image has not been laid out yet.
    pub fn finish(&mut self, pointer: Point, container: DisplaySize, session: &MapSession) -> Option<DragCommit> {
        let drag = match std::mem::take(&mut self.state) {
            DragState::Dragging(drag) => drag,
            DragState::Idle => return None,
        };
        if drag.revision != session.revision() || !session.display().is_loaded() {
            log::debug!("drag of {} dropped: the map changed underneath it", drag.name);
            return None;
        }

        let anchor = drag.anchor_for(pointer, &container);
        let geometry = session.geometry()?;
        let label = session.labels().get(&drag.name)?;

        let position = geometry.to_geo(&anchor, &session.display());
        if position.within_tolerance(&label.default_position(), self.tolerance) {
            Some(DragCommit::SnapBack { name: drag.name })
        } else {
            Some(DragCommit::Override {
                name: drag.name,
                position,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::GeoBounds;
    use crate::core::geometry::{AxesGeometry, FigureGeometry};
    use crate::labels::record::{LabelRecord, LabelStyle};
    use crate::sync::wire::{GenerateRequest, MapPayload, MapReply};

    fn session() -> MapSession {
        let map = MapPayload {
            map_url: "/maps/p.png".to_string(),
            figure: Some(FigureGeometry::new(1000.0, 1000.0)),
            axes: Some(AxesGeometry::new(0.0, 0.0, 1000.0, 1000.0)),
            bounds: GeoBounds::new(0.0, 10.0, 0.0, 10.0),
            style: LabelStyle::default(),
            labels: vec![LabelRecord::new("Opole", GeoPoint::new(5.0, 5.0), 0.0, 0.0)],
            paper: None,
            final_download: None,
            warnings: Vec::new(),
        };
        let mut session = MapSession::new();
        let pending = session.begin_generate(GenerateRequest::new("Opole")).unwrap();
        session.complete_generate(pending, Ok(MapReply::new(map))).unwrap();
        session.set_display(DisplaySize::new(1000.0, 1000.0));
        session
    }

    const CONTAINER: DisplaySize = DisplaySize {
        width: 1000.0,
        height: 1000.0,
    };

    #[test]
    fn test_drag_moves_by_pointer_delta() {
        let mut drag = DragController::default();
        assert!(drag.begin("Opole", Point::new(500.0, 500.0), Point::new(510.0, 490.0), CONTAINER, 1));
        assert!(!drag.begin("Opole", Point::new(0.0, 0.0), Point::new(0.0, 0.0), CONTAINER, 1));

        let (name, anchor) = drag.update(Point::new(610.0, 390.0)).unwrap();
        assert_eq!(name, "Opole");
        assert_eq!(anchor, Point::new(600.0, 400.0));
    }

    #[test]
    fn test_drag_is_clamped_to_container() {
        let mut drag = DragController::default();
        drag.begin("Opole", Point::new(500.0, 500.0), Point::new(500.0, 500.0), CONTAINER, 1);
        let (_, anchor) = drag.update(Point::new(-300.0, 1700.0)).unwrap();
        assert_eq!(anchor, Point::new(0.0, 1000.0));
    }

    #[test]
    fn test_release_far_from_default_creates_override() {
        let session = session();
        let mut drag = DragController::default();
        drag.begin("Opole", Point::new(500.0, 500.0), Point::new(500.0, 500.0), CONTAINER, 1);
        drag.update(Point::new(600.0, 400.0));

        let commit = drag.finish(Point::new(600.0, 400.0), CONTAINER, &session).unwrap();
        match commit {
            DragCommit::Override { name, position } => {
                assert_eq!(name, "Opole");
                assert!((position.lon - 6.0).abs() < 1e-9);
                assert!((position.lat - 6.0).abs() < 1e-9);
            }
            other => panic!("expected override, got {other:?}"),
        }
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_release_near_default_snaps_back() {
        let session = session();
        let mut drag = DragController::default();
        // 0.03 px is 0.0003 geographic units at this scale
        drag.begin("Opole", Point::new(500.0, 500.0), Point::new(500.0, 500.0), CONTAINER, 1);
        let commit = drag.finish(Point::new(500.03, 499.97), CONTAINER, &session).unwrap();
        assert_eq!(commit, DragCommit::SnapBack { name: "Opole".to_string() });
    }

    #[test]
    fn test_release_just_outside_tolerance_keeps_override() {
        let session = session();
        let mut drag = DragController::default();
        // 0.1 px is 0.001 geographic units
        drag.begin("Opole", Point::new(500.0, 500.0), Point::new(500.0, 500.0), CONTAINER, 1);
        let commit = drag.finish(Point::new(500.0, 499.9), CONTAINER, &session).unwrap();
        assert!(matches!(commit, DragCommit::Override { .. }));
    }

    #[test]
    fn test_release_uses_fresh_container() {
        let session = session();
        let mut drag = DragController::default();
        drag.begin("Opole", Point::new(500.0, 500.0), Point::new(500.0, 500.0), CONTAINER, 1);

        let shrunk = DisplaySize::new(700.0, 700.0);
        let commit = drag.finish(Point::new(2000.0, 500.0), shrunk, &session).unwrap();
        match commit {
            DragCommit::Override { position, .. } => assert!((position.lon - 7.0).abs() < 1e-9),
            other => panic!("expected override, got {other:?}"),
        }
    }

    #[test]
    fn test_release_after_map_replaced_is_dropped() {
        let mut session = session();
        let mut drag = DragController::default();
        drag.begin("Opole", Point::new(500.0, 500.0), Point::new(500.0, 500.0), CONTAINER, session.revision());

        let pending = session.begin_apply(false).unwrap();
        let labels = session.labels().labels().to_vec();
        let map = MapPayload {
            map_url: "/maps/p2.png".to_string(),
            figure: None,
            axes: None,
            bounds: GeoBounds::new(0.0, 10.0, 0.0, 10.0),
            style: LabelStyle::default(),
            labels,
            paper: None,
            final_download: None,
            warnings: Vec::new(),
        };
        session.complete_apply(pending, Ok(MapReply::new(map))).unwrap();
        assert!(session.display().is_loaded());

        assert!(drag.finish(Point::new(600.0, 400.0), CONTAINER, &session).is_none());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_finish_when_idle_is_noop() {
        let session = session();
        let mut drag = DragController::default();
        assert!(drag.finish(Point::new(1.0, 1.0), CONTAINER, &session).is_none());
        assert!(drag.update(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_commit_apply_writes_session() {
        let mut session = session();
        DragCommit::Override {
            name: "Opole".to_string(),
            position: GeoPoint::new(6.0, 6.0),
        }
        .apply(&mut session);
        assert_eq!(session.pending_position("Opole"), Some(GeoPoint::new(6.0, 6.0)));

        DragCommit::SnapBack {
            name: "Opole".to_string(),
        }
        .apply(&mut session);
        assert_eq!(session.labels().override_for("Opole"), None);
    }
}
