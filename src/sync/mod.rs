pub mod controller;
pub mod service;
pub mod wire;

pub use controller::SyncController;
pub use service::{HttpLabelService, LabelService};
pub use wire::{ApplyLabelsRequest, GenerateRequest, LabelAdjustment, MapPayload, MapReply, MapResponse};
