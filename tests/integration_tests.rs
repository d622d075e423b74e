use async_trait::async_trait;
use maplabel::overlay::HeadlessSurface;
use maplabel::sync::service::decode_reply;
use maplabel::{
    ApplyLabelsRequest, DisplaySize, Error, EventHandled, GenerateRequest, GeoPoint, HitTarget,
    LabelEditor, LabelService, MapSession, Point, Result, SurfaceEvent, SyncController, SyncOutcome,
};
use maplabel::sync::MapReply;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// End-to-end label editing scenarios: service JSON in, user gestures on the
/// overlay, apply/finalize requests out.
#[cfg(test)]
mod integration_tests {
    use super::*;

    fn poster_json(map_url: &str, labels: serde_json::Value) -> serde_json::Value {
        json!({
            "success": true,
            "warnings": [],
            "cities": ["Opole", "Wrocław"],
            "map": {
                "mapUrl": map_url,
                "figure": {"width_px": 1000.0, "height_px": 1000.0},
                "axes": {"x0": 0.0, "y0": 0.0, "width": 1000.0, "height": 1000.0, "x1": 1000.0, "y1": 1000.0},
                "bounds": {"lon_min": 0.0, "lon_max": 10.0, "lat_min": 0.0, "lat_max": 10.0},
                "style": {
                    "label_font_size_px": 24.0,
                    "font_family": "DejaVu Sans",
                    "font_color": "#ffffff",
                    "background_color": "#0a3dbb"
                },
                "labels": labels
            }
        })
    }

    fn default_labels() -> serde_json::Value {
        json!([
            {"name": "Opole", "anchor_lon": 5.0, "anchor_lat": 5.0, "dx": 0.0, "dy": 0.0,
             "position_lon": 5.0, "position_lat": 5.0, "x_rel": 0.5, "y_rel": 0.5},
            {"name": "Wrocław", "anchor_lon": 2.0, "anchor_lat": 3.0, "dx": 0.1, "dy": 0.2, "locked": true}
        ])
    }

    fn reply(body: serde_json::Value) -> Result<MapReply> {
        decode_reply(200, body.to_string().as_bytes())
    }

    /// Replays canned JSON replies and records every apply request
    struct ScriptedService {
        replies: Mutex<VecDeque<Result<MapReply>>>,
        applied: Mutex<Vec<ApplyLabelsRequest>>,
    }

    impl ScriptedService {
        fn new(replies: Vec<Result<MapReply>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                applied: Mutex::new(Vec::new()),
            }
        }

        fn next(&self) -> Result<MapReply> {
            self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(Error::Service {
                    status: None,
                    message: "script exhausted".to_string(),
                })
            })
        }
    }

    #[async_trait]
    impl LabelService for ScriptedService {
        async fn generate(&self, _request: &GenerateRequest) -> Result<MapReply> {
            self.next()
        }

        async fn apply_labels(&self, request: &ApplyLabelsRequest) -> Result<MapReply> {
            self.applied.lock().unwrap().push(request.clone());
            self.next()
        }

        async fn fetch_raster(&self, map_url: &str) -> Result<Vec<u8>> {
            Ok(format!("raster:{map_url}").into_bytes())
        }
    }

    fn editor() -> LabelEditor<HeadlessSurface> {
        let size = DisplaySize::new(1000.0, 1000.0);
        LabelEditor::new(MapSession::new(), HeadlessSurface::new(size))
    }

    fn load_image(editor: &mut LabelEditor<HeadlessSurface>, width: f64, height: f64) {
        let displayed = DisplaySize::new(width, height);
        editor.surface_mut().resize(displayed);
        editor.handle_event(SurfaceEvent::ImageLoaded {
            natural: DisplaySize::new(1000.0, 1000.0),
            displayed,
        });
    }

    fn drag(editor: &mut LabelEditor<HeadlessSurface>, name: &str, from: Point, to: Point) {
        let down = SurfaceEvent::PointerDown {
            target: HitTarget::Label(name.to_string()),
            position: from,
        };
        assert_eq!(editor.handle_event(down), EventHandled::Handled);
        editor.handle_event(SurfaceEvent::PointerMove { position: to });
        assert_eq!(
            editor.handle_event(SurfaceEvent::PointerUp { position: to }),
            EventHandled::Handled
        );
    }

    #[tokio::test]
    async fn test_drag_then_apply_round_trip() {
        let applied_labels = json!([
            {"name": "Opole", "anchor_lon": 5.0, "anchor_lat": 5.0, "dx": 1.0, "dy": 1.0,
             "position_lon": 6.0, "position_lat": 6.0},
            {"name": "Wrocław", "anchor_lon": 2.0, "anchor_lat": 3.0, "dx": 0.1, "dy": 0.2}
        ]);
        let service = ScriptedService::new(vec![
            reply(poster_json("/maps/preview.png", default_labels())),
            reply(poster_json("/maps/preview.png", applied_labels)),
        ]);
        let controller = SyncController::new(service);
        let mut editor = editor();

        let outcome = controller
            .generate(editor.session_mut(), GenerateRequest::new("Opole, Wrocław"))
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Generated);
        load_image(&mut editor, 1000.0, 1000.0);

        let opole = editor.surface().layout().element("Opole").unwrap().clone();
        assert_eq!(opole.anchor, Point::new(500.0, 500.0));

        drag(&mut editor, "Opole", Point::new(500.0, 500.0), Point::new(600.0, 400.0));
        let moved = editor.session().pending_position("Opole").unwrap();
        assert!((moved.lon - 6.0).abs() < 1e-9);
        assert!((moved.lat - 6.0).abs() < 1e-9);

        let outcome = controller.apply(editor.session_mut()).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Applied);
        editor.render();

        {
            let applied = controller.service().applied.lock().unwrap();
            let request = &applied[0];
            let opole = request.labels.iter().find(|a| a.city == "Opole").unwrap();
            assert!((opole.dx - 1.0).abs() < 1e-9);
            assert!((opole.dy - 1.0).abs() < 1e-9);
            assert_eq!(request.payload.cities, "Opole, Wrocław");
        }

        // overrides cleared, labels exactly as the response reported them
        let session = editor.session();
        assert_eq!(session.labels().override_count(), 0);
        let opole = session.labels().get("Opole").unwrap();
        assert_eq!((opole.dx, opole.dy), (1.0, 1.0));
        assert_eq!(session.pending_position("Opole"), Some(GeoPoint::new(6.0, 6.0)));
        assert_eq!(session.labels().len(), 2);
        assert!(!session.labels().get("Wrocław").unwrap().locked);
    }

    #[tokio::test]
    async fn test_drop_near_default_snaps_back() {
        let service = ScriptedService::new(vec![reply(poster_json("/maps/p.png", default_labels()))]);
        let controller = SyncController::new(service);
        let mut editor = editor();
        controller
            .generate(editor.session_mut(), GenerateRequest::new("Opole"))
            .await
            .unwrap();
        load_image(&mut editor, 1000.0, 1000.0);

        drag(&mut editor, "Opole", Point::new(500.0, 500.0), Point::new(600.0, 400.0));
        assert_eq!(editor.session().labels().override_count(), 1);

        // back to within 0.0004 geographic units of the default
        drag(&mut editor, "Opole", Point::new(600.0, 400.0), Point::new(500.04, 499.96));
        assert_eq!(editor.session().labels().override_count(), 0);
        assert_eq!(
            editor.surface().layout().element("Opole").unwrap().anchor,
            Point::new(500.0, 500.0)
        );
    }

    #[tokio::test]
    async fn test_resize_halves_positions_and_font() {
        let service = ScriptedService::new(vec![reply(poster_json("/maps/p.png", default_labels()))]);
        let controller = SyncController::new(service);
        let mut editor = editor();
        controller
            .generate(editor.session_mut(), GenerateRequest::new("Opole"))
            .await
            .unwrap();

        load_image(&mut editor, 1000.0, 1000.0);
        let full = editor.surface().layout().element("Wrocław").unwrap().clone();

        editor.surface_mut().resize(DisplaySize::new(500.0, 500.0));
        editor.handle_event(SurfaceEvent::Resized {
            displayed: DisplaySize::new(500.0, 500.0),
        });
        let half = editor.surface().layout().element("Wrocław").unwrap().clone();

        assert!((half.anchor.x - full.anchor.x / 2.0).abs() < 1e-9);
        assert!((half.anchor.y - full.anchor.y / 2.0).abs() < 1e-9);
        assert_eq!(full.font_size_px, 24.0);
        assert_eq!(half.font_size_px, 12.0);
    }

    #[tokio::test]
    async fn test_hidden_labels_are_excluded_and_survive_apply() {
        let service = ScriptedService::new(vec![
            reply(poster_json("/maps/p1.png", default_labels())),
            reply(poster_json("/maps/p2.png", default_labels())),
            reply(poster_json("/maps/p3.png", default_labels())),
            reply(poster_json("/maps/p4.png", default_labels())),
        ]);
        let controller = SyncController::new(service);
        let mut editor = editor();
        controller
            .generate(editor.session_mut(), GenerateRequest::new("Opole, Wrocław"))
            .await
            .unwrap();
        load_image(&mut editor, 1000.0, 1000.0);

        editor.handle_event(SurfaceEvent::PointerEnter {
            name: "Wrocław".to_string(),
        });
        let hide = SurfaceEvent::PointerDown {
            target: HitTarget::HideButton("Wrocław".to_string()),
            position: Point::new(0.0, 0.0),
        };
        assert_eq!(editor.handle_event(hide), EventHandled::Handled);

        controller.apply(editor.session_mut()).await.unwrap();
        controller.apply(editor.session_mut()).await.unwrap();
        {
            let applied = controller.service().applied.lock().unwrap();
            for request in applied.iter() {
                assert!(request.labels.iter().all(|a| a.city != "Wrocław"));
                assert_eq!(request.hidden_labels, vec!["Wrocław".to_string()]);
            }
            assert_eq!(applied.len(), 2);
        }

        // a fresh generate starts with every label visible again
        controller
            .generate(editor.session_mut(), GenerateRequest::new("Opole, Wrocław"))
            .await
            .unwrap();
        assert!(!editor.session().is_hidden("Wrocław"));
    }

    #[test]
    fn test_last_issued_request_wins() {
        let mut session = MapSession::new();
        let first = session.begin_generate(GenerateRequest::new("Opole")).unwrap();
        let second = session.begin_generate(GenerateRequest::new("Opole, Wrocław")).unwrap();

        let newer = reply(poster_json("/maps/newer.png", default_labels()));
        assert_eq!(session.complete_generate(second, newer).unwrap(), SyncOutcome::Generated);

        let older = reply(poster_json("/maps/older.png", json!([])));
        assert_eq!(session.complete_generate(first, older).unwrap(), SyncOutcome::Stale);
        assert_eq!(session.snapshot().unwrap().map_url, "/maps/newer.png");
        assert_eq!(session.labels().len(), 2);
    }

    #[test]
    fn test_service_failures_surface_verbatim() {
        let failure = json!({"success": false, "error": "Nie znaleziono miasta: Xyz"});
        let err = decode_reply(200, failure.to_string().as_bytes()).unwrap_err();
        assert_eq!(err.user_message(), "Nie znaleziono miasta: Xyz");

        let success_body = poster_json("/maps/p.png", default_labels());
        let err = decode_reply(502, success_body.to_string().as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Service { status: Some(502), .. }));
    }

    #[tokio::test]
    async fn test_finalize_downloads_without_touching_preview() {
        let service = ScriptedService::new(vec![
            reply(poster_json("/maps/preview.png", default_labels())),
            reply(poster_json("/maps/map_final.png", default_labels())),
        ]);
        let controller = SyncController::new(service);
        let mut session = MapSession::new().with_download_filename("route-map.png");
        controller
            .generate(&mut session, GenerateRequest::new("Opole, Wrocław"))
            .await
            .unwrap();
        session.set_override("Opole", GeoPoint::new(5.5, 5.5));

        let artifact = match controller.finalize(&mut session).await.unwrap() {
            SyncOutcome::Finalized(artifact) => artifact,
            other => panic!("expected a final artifact, got {other:?}"),
        };
        assert_eq!(artifact.map_url, "/maps/map_final.png");
        assert_eq!(session.snapshot().unwrap().map_url, "/maps/preview.png");
        assert_eq!(session.pending_position("Opole"), Some(GeoPoint::new(5.5, 5.5)));
        assert_eq!(session.latest_download(), Some(&artifact));

        let dir = tempfile::tempdir().unwrap();
        let path = controller.download(&artifact, dir.path()).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"raster:/maps/map_final.png");
    }

    #[tokio::test]
    async fn test_degenerate_bounds_render_finite_positions() {
        let mut body = poster_json("/maps/p.png", default_labels());
        body["map"]["bounds"] = json!({"lon_min": 5.0, "lon_max": 5.0, "lat_min": 0.0, "lat_max": 10.0});
        body["map"].as_object_mut().unwrap().remove("figure");
        body["map"].as_object_mut().unwrap().remove("axes");

        let controller = SyncController::new(ScriptedService::new(vec![reply(body)]));
        let mut editor = editor();
        controller
            .generate(editor.session_mut(), GenerateRequest::new("Opole"))
            .await
            .unwrap();
        load_image(&mut editor, 800.0, 600.0);

        let layout = editor.surface().layout();
        assert!(layout.visible);
        assert!(layout.elements.iter().all(|e| e.anchor.is_finite()));
    }
}
