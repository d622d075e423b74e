//! Prelude module for common maplabel types and traits
//!
//! Re-exports the types most applications need, for importing with
//! `use maplabel::prelude::*;`

pub use crate::core::{
    config::ClientConfig,
    geo::{GeoBounds, GeoPoint, Point},
    geometry::{AxesGeometry, DisplaySize, FigureGeometry, MapGeometry},
};

pub use crate::labels::{LabelRecord, LabelStore, LabelStyle};

pub use crate::input::{
    DragCommit, DragController, EventHandled, HitTarget, SurfaceEvent, VisibilityController,
};

pub use crate::overlay::{HeadlessSurface, LabelElement, OverlayLayout, OverlayRenderer, OverlaySurface};

pub use crate::session::{MapSession, MapSnapshot, RequestToken, SyncOutcome};

pub use crate::editor::LabelEditor;

pub use crate::sync::{
    wire::{PaperFormat, SignaturePosition},
    ApplyLabelsRequest, GenerateRequest, HttpLabelService, LabelService, MapPayload, MapReply,
    SyncController,
};

pub use crate::raster::{cache_busted_url, save_artifact, MapArtifact};

#[cfg(feature = "render")]
pub use crate::raster::RasterImage;

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::{spawn_task, TaskHandle, TaskRuntime};

#[cfg(feature = "egui")]
pub use crate::ui::LabelOverlayWidget;

pub use crate::{Error as MapLabelError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
