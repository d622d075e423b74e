//! Session state for one editing session: the current map, its labels, and the
//! bookkeeping that decides which service response is authoritative.
//!
//! Every service round trip is split in two halves. `begin_*` validates the
//! preconditions, builds the wire request and issues a [`RequestToken`];
//! `complete_*` takes the service result back together with that token. Only
//! the most recently issued token of a sequence may change state, so a slow
//! response can never overwrite the effect of a newer one.

use crate::core::geo::GeoPoint;
use crate::core::geometry::{DisplaySize, MapGeometry};
use crate::labels::record::LabelStyle;
use crate::labels::store::LabelStore;
use crate::raster::MapArtifact;
use crate::sync::wire::{ApplyLabelsRequest, GenerateRequest, MapPayload, MapReply, PaperInfo};
use crate::{Error, Result};

/// Identifies one issued request within its sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic token source; the last issued token is the only current one.
#[derive(Debug, Clone, Default)]
struct RequestSequencer {
    issued: u64,
    settled: u64,
}

impl RequestSequencer {
    fn issue(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Marks the sequence idle if `token` is current.
    fn settle(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.settled = self.issued;
            true
        } else {
            false
        }
    }

    /// Makes every outstanding token stale.
    fn invalidate(&mut self) {
        self.issued += 1;
        self.settled = self.issued;
    }

    fn is_busy(&self) -> bool {
        self.issued > self.settled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    Generate,
    Apply,
    Finalize,
}

/// A request that has been issued but whose response has not been applied yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest<R> {
    pub token: RequestToken,
    pub kind: SyncKind,
    pub request: R,
}

/// What a completed round trip did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// A new map replaced the session; hidden labels were cleared
    Generated,
    /// The preview was replaced and pending overrides dropped
    Applied,
    /// A final artifact is ready to save; the preview is untouched
    Finalized(MapArtifact),
    /// A newer request was issued meanwhile; the response was discarded
    Stale,
}

/// The rendered map currently shown
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub map_url: String,
    pub geometry: MapGeometry,
    pub style: LabelStyle,
    pub paper: Option<PaperInfo>,
}

impl MapSnapshot {
    fn from_payload(map: &MapPayload) -> Self {
        Self {
            map_url: map.map_url.clone(),
            geometry: map.geometry(),
            style: map.style.clone(),
            paper: map.paper.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapSession {
    snapshot: Option<MapSnapshot>,
    labels: LabelStore,
    request: Option<GenerateRequest>,
    display: DisplaySize,
    warnings: Vec<String>,
    latest_download: Option<MapArtifact>,
    download_filename: String,
    /// Bumped whenever a response replaces the map or its labels
    revision: u64,
    preview_requests: RequestSequencer,
    finalize_requests: RequestSequencer,
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSession {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            labels: LabelStore::new(),
            request: None,
            display: DisplaySize::default(),
            warnings: Vec::new(),
            latest_download: None,
            download_filename: "route-map.png".to_string(),
            revision: 0,
            preview_requests: RequestSequencer::default(),
            finalize_requests: RequestSequencer::default(),
        }
    }

    pub fn with_download_filename(mut self, filename: impl Into<String>) -> Self {
        self.download_filename = filename.into();
        self
    }

    /// Installs a freshly generated map. Overrides and hidden labels start empty
    /// and the image must load again before the overlay can be drawn.
    pub fn reset(&mut self, map: &MapPayload, request: GenerateRequest) {
        self.snapshot = Some(MapSnapshot::from_payload(map));
        self.labels.reset(map.labels.clone());
        self.request = Some(request);
        self.display = DisplaySize::default();
        self.latest_download = None;
        self.revision += 1;
        log::info!("session reset: {} labels on {}", self.labels.len(), map.map_url);
    }

    /// Replaces the preview from an apply response. Hidden labels carry over.
    ///
    /// A previously finalized artifact no longer matches the new labels, so the
    /// latest download is whatever this response rendered alongside, if anything.
    fn replace(&mut self, map: &MapPayload) {
        self.snapshot = Some(MapSnapshot::from_payload(map));
        self.labels.replace_labels(map.labels.clone());
        self.latest_download = map
            .final_download
            .as_ref()
            .map(|final_map| self.artifact_for(&final_map.map_url));
        self.revision += 1;
        log::info!("session replaced: {} labels on {}", self.labels.len(), map.map_url);
    }

    fn artifact_for(&self, map_url: &str) -> MapArtifact {
        MapArtifact::new(map_url, self.download_filename.clone())
    }

    /// Identifies the map and label set currently shown. Changes on every
    /// successful generate or apply.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_map(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&MapSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn geometry(&self) -> Option<&MapGeometry> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.geometry)
    }

    pub fn style(&self) -> Option<&LabelStyle> {
        self.snapshot.as_ref().map(|snapshot| &snapshot.style)
    }

    pub fn labels(&self) -> &LabelStore {
        &self.labels
    }

    pub fn request(&self) -> Option<&GenerateRequest> {
        self.request.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn latest_download(&self) -> Option<&MapArtifact> {
        self.latest_download.as_ref()
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    /// Records the rendered image size. Returns `true` when it changed.
    pub fn set_display(&mut self, display: DisplaySize) -> bool {
        let changed = self.display != display;
        self.display = display;
        changed
    }

    /// True while a generate or apply response is outstanding.
    pub fn is_busy(&self) -> bool {
        self.preview_requests.is_busy()
    }

    pub fn is_finalizing(&self) -> bool {
        self.finalize_requests.is_busy()
    }

    pub fn pending_position(&self, name: &str) -> Option<GeoPoint> {
        self.labels.pending_position(name)
    }

    pub fn set_override(&mut self, name: &str, position: GeoPoint) -> bool {
        self.labels.set_override(name, position)
    }

    pub fn clear_override(&mut self, name: &str) -> bool {
        self.labels.clear_override(name)
    }

    pub fn hide(&mut self, name: &str) -> bool {
        self.labels.hide(name)
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.labels.is_hidden(name)
    }

    pub fn begin_generate(&mut self, request: GenerateRequest) -> Result<PendingRequest<GenerateRequest>> {
        request.validate()?;
        let token = self.preview_requests.issue();
        log::debug!("issuing generate request #{}", token.value());
        Ok(PendingRequest {
            token,
            kind: SyncKind::Generate,
            request,
        })
    }

    pub fn complete_generate(
        &mut self,
        pending: PendingRequest<GenerateRequest>,
        result: Result<MapReply>,
    ) -> Result<SyncOutcome> {
        if !self.preview_requests.settle(pending.token) {
            log::warn!("discarding stale generate response #{}", pending.token.value());
            return Ok(SyncOutcome::Stale);
        }
        let reply = result?;
        self.finalize_requests.invalidate();
        self.reset(&reply.map, pending.request);
        self.warnings = merge_warnings(reply.warnings, &reply.map.warnings);
        Ok(SyncOutcome::Generated)
    }

    /// Builds the apply (or finalize) request from the current edits.
    pub fn begin_apply(&mut self, finalize: bool) -> Result<PendingRequest<ApplyLabelsRequest>> {
        let payload = match (&self.snapshot, &self.request) {
            (Some(_), Some(request)) => request.clone(),
            _ => return Err(Error::precondition("Generate a map before editing labels.")),
        };
        if self.labels.is_empty() {
            return Err(Error::precondition("The map has no labels to apply."));
        }

        let request = ApplyLabelsRequest {
            labels: self.labels.adjustments(),
            payload,
            finalize,
            hidden_labels: self.labels.hidden_names(),
        };
        let (token, kind) = if finalize {
            (self.finalize_requests.issue(), SyncKind::Finalize)
        } else {
            (self.preview_requests.issue(), SyncKind::Apply)
        };
        log::debug!(
            "issuing {:?} request #{} ({} adjustments, {} hidden)",
            kind,
            token.value(),
            request.labels.len(),
            request.hidden_labels.len()
        );
        Ok(PendingRequest {
            token,
            kind,
            request,
        })
    }

    pub fn complete_apply(
        &mut self,
        pending: PendingRequest<ApplyLabelsRequest>,
        result: Result<MapReply>,
    ) -> Result<SyncOutcome> {
        let sequence = match pending.kind {
            SyncKind::Finalize => &mut self.finalize_requests,
            _ => &mut self.preview_requests,
        };
        if !sequence.settle(pending.token) {
            log::warn!(
                "discarding stale {:?} response #{}",
                pending.kind,
                pending.token.value()
            );
            return Ok(SyncOutcome::Stale);
        }
        let reply = result?;

        if pending.kind == SyncKind::Finalize {
            let artifact = self.artifact_for(&reply.map.map_url);
            self.latest_download = Some(artifact.clone());
            return Ok(SyncOutcome::Finalized(artifact));
        }

        self.replace(&reply.map);
        self.warnings = merge_warnings(reply.warnings, &reply.map.warnings);
        Ok(SyncOutcome::Applied)
    }
}

/// Response-level warnings followed by map-level ones, without repeats.
fn merge_warnings(mut warnings: Vec<String>, map_warnings: &[String]) -> Vec<String> {
    for warning in map_warnings {
        if !warnings.contains(warning) {
            warnings.push(warning.clone());
        }
    }
    warnings
}
