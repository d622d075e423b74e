//! Async orchestration of generate, apply and finalize round trips.

use crate::raster::{save_artifact, MapArtifact};
use crate::session::{MapSession, SyncOutcome};
use crate::sync::service::LabelService;
use crate::sync::wire::GenerateRequest;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Drives a [`MapSession`] through the rendering service.
///
/// Each call validates against the session, awaits the service, then lets the
/// session decide whether the response is still the latest. Errors leave the
/// session's label state untouched.
pub struct SyncController<S: LabelService> {
    service: Arc<S>,
}

impl<S: LabelService> Clone for SyncController<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: LabelService> SyncController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn from_shared(service: Arc<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub async fn generate(&self, session: &mut MapSession, request: GenerateRequest) -> Result<SyncOutcome> {
        let pending = session.begin_generate(request)?;
        let result = self.service.generate(&pending.request).await;
        if let Err(err) = &result {
            log::warn!("generate request #{} failed: {err}", pending.token.value());
        }
        session.complete_generate(pending, result)
    }

    /// Sends the current overrides and hidden labels for a new preview.
    pub async fn apply(&self, session: &mut MapSession) -> Result<SyncOutcome> {
        self.apply_labels(session, false).await
    }

    /// Renders the final poster from the current edits without touching the preview.
    pub async fn finalize(&self, session: &mut MapSession) -> Result<SyncOutcome> {
        self.apply_labels(session, true).await
    }

    async fn apply_labels(&self, session: &mut MapSession, finalize: bool) -> Result<SyncOutcome> {
        let pending = session.begin_apply(finalize)?;
        let result = self.service.apply_labels(&pending.request).await;
        if let Err(err) = &result {
            log::warn!(
                "{:?} request #{} failed: {err}",
                pending.kind,
                pending.token.value()
            );
        }
        session.complete_apply(pending, result)
    }

    /// Fetches an artifact and saves it under `dir` with its suggested filename.
    pub async fn download(&self, artifact: &MapArtifact, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let bytes = self.service.fetch_raster(&artifact.map_url).await?;
        save_artifact(&bytes, dir, &artifact.filename)
    }
}
