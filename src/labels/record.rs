use crate::core::constants::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_FONT_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_LABEL_FONT_PX,
};
use crate::core::geo::GeoPoint;
use serde::{Deserialize, Serialize};

/// One named point label as laid out by the rendering service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub name: String,
    /// Geographic coordinate of the point the label describes
    pub anchor_lon: f64,
    pub anchor_lat: f64,
    /// Server-computed default offset from the anchor, in geographic units
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
    /// The service keeps locked labels where they are during collision avoidance
    #[serde(default)]
    pub locked: bool,
    /// Default label position; the snap-back reference for drags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_lat: Option<f64>,
}

impl LabelRecord {
    /// Creates a record whose default position is `anchor + (dx, dy)`
    pub fn new(name: impl Into<String>, anchor: GeoPoint, dx: f64, dy: f64) -> Self {
        let position = anchor.offset(dx, dy);
        Self {
            name: name.into(),
            anchor_lon: anchor.lon,
            anchor_lat: anchor.lat,
            dx,
            dy,
            locked: false,
            position_lon: Some(position.lon),
            position_lat: Some(position.lat),
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn anchor(&self) -> GeoPoint {
        GeoPoint::new(self.anchor_lon, self.anchor_lat)
    }

    /// Anchor displaced by the default offset
    pub fn offset_position(&self) -> GeoPoint {
        self.anchor().offset(self.dx, self.dy)
    }

    /// Reported default position, or `anchor + offset` when the service omitted it
    pub fn default_position(&self) -> GeoPoint {
        match (self.position_lon, self.position_lat) {
            (Some(lon), Some(lat)) => GeoPoint::new(lon, lat),
            _ => self.offset_position(),
        }
    }
}

/// Text styling the service used for labels on the poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    /// Font size in figure pixels
    pub label_font_size_px: f64,
    pub font_family: String,
    pub font_color: String,
    pub background_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_font_size_pt: Option<f64>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            label_font_size_px: DEFAULT_LABEL_FONT_PX,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_color: DEFAULT_FONT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            label_font_size_pt: None,
        }
    }
}
