//! # maplabel
//!
//! Interactive label placement over rendered route map posters.
//!
//! A rendering service turns a route into a raster poster plus geometry
//! metadata and a list of city labels. This crate maps those labels onto the
//! displayed image, lets the user drag or hide them, and reconciles the edits
//! into the "apply labels" request that makes the service re-render the poster.

pub mod core;
pub mod editor;
pub mod input;
pub mod labels;
pub mod overlay;
pub mod prelude;
pub mod raster;
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
pub mod session;
pub mod sync;
#[cfg(feature = "egui")]
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::ClientConfig,
    geo::{GeoBounds, GeoPoint, Point},
    geometry::{AxesGeometry, DisplaySize, FigureGeometry, MapGeometry},
};

pub use labels::{record::LabelRecord, record::LabelStyle, store::LabelStore};

pub use input::{
    drag::{DragCommit, DragController},
    events::{EventHandled, HitTarget, SurfaceEvent},
};

pub use overlay::{
    renderer::{LabelElement, OverlayLayout, OverlayRenderer},
    surface::OverlaySurface,
};

pub use session::{MapSession, SyncOutcome};

pub use editor::LabelEditor;

pub use sync::{
    controller::SyncController,
    service::{HttpLabelService, LabelService},
    wire::{ApplyLabelsRequest, GenerateRequest, LabelAdjustment, MapPayload, MapResponse},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown for failures that never reached the rendering service.
const NETWORK_FAILURE_MESSAGE: &str =
    "Could not reach the map service. Check your connection and try again.";

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The service answered but reported a failure (`success: false` or a non-2xx status).
    #[error("Service error: {message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// The action cannot run in the current session state; nothing was sent.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn service(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Text suitable for showing to the user.
    ///
    /// Transport failures collapse into one generic message, service failures
    /// surface the service's own string verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Error::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            Error::Service { message, .. } => message.clone(),
            Error::Precondition(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// Precondition failures are warnings: no request was sent and the session is intact.
    pub fn is_warning(&self) -> bool {
        matches!(self, Error::Precondition(_))
    }
}

/// Installs `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("maplabel=info"),
    )
    .try_init();
}
