//! JSON shapes exchanged with the poster rendering service.

use crate::core::constants::{SIGNATURE_SCALE_MAX, SIGNATURE_SCALE_MIN};
use crate::core::geo::GeoBounds;
use crate::core::geometry::{AxesGeometry, FigureGeometry, MapGeometry};
use crate::labels::record::{LabelRecord, LabelStyle};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Paper formats the service knows how to lay out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperFormat {
    #[serde(rename = "POSTCARD")]
    Postcard,
    #[serde(rename = "POSTER_50X70")]
    Poster50x70,
    #[serde(rename = "POSTER_70X50")]
    Poster70x50,
    #[serde(rename = "POSTER_60X100")]
    Poster60x100,
    #[serde(rename = "POSTER_100X60")]
    Poster100x60,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignaturePosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    BottomCenter,
    TopCenter,
}

/// Request that renders a route into a fresh poster.
///
/// Every styling option is optional and left out of the JSON when unset so
/// the service applies its own defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Route text: city names separated by commas or newlines
    pub cities: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_format: Option<PaperFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_borders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_right: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_position: Option<SignaturePosition>,
    /// Percent of the poster width, clamped to 2..=50
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_bidirectional_routes: Option<bool>,
}

/// Picks the font to request: a custom font name when the selector says
/// `"custom"`, the selected family otherwise. Blank values mean "service default".
pub fn resolve_font(selected: &str, custom: Option<&str>) -> Option<String> {
    let selected = selected.trim();
    let chosen = if selected.eq_ignore_ascii_case("custom") {
        custom.map(str::trim).unwrap_or_default()
    } else {
        selected
    };
    (!chosen.is_empty()).then(|| chosen.to_string())
}

impl GenerateRequest {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            cities: route.into(),
            ..Self::default()
        }
    }

    /// City names from the route text, split on commas and line breaks.
    pub fn route_cities(&self) -> Vec<String> {
        self.cities
            .replace([',', '\r'], "\n")
            .split('\n')
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.route_cities().is_empty() {
            return Err(Error::precondition("Enter at least one city."));
        }
        Ok(())
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn with_font(mut self, selected: &str, custom: Option<&str>) -> Self {
        self.font_family = resolve_font(selected, custom);
        self
    }

    pub fn with_font_color(mut self, color: impl Into<String>) -> Self {
        self.font_color = Some(color.into());
        self
    }

    pub fn with_paper(mut self, format: PaperFormat, dpi: Option<u32>) -> Self {
        self.paper_format = Some(format);
        self.dpi = dpi;
        self
    }

    pub fn with_line(mut self, style: impl Into<String>, color: impl Into<String>, width: Option<f64>) -> Self {
        self.line_style = Some(style.into());
        self.line_color = Some(color.into());
        self.line_width = width;
        self
    }

    pub fn with_points(mut self, style: impl Into<String>, color: impl Into<String>, size: Option<f64>) -> Self {
        self.point_style = Some(style.into());
        self.point_color = Some(color.into());
        self.point_size = size;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_footer(mut self, left: Option<String>, right: Option<String>) -> Self {
        self.footer_left = left;
        self.footer_right = right;
        self
    }

    pub fn with_signature(
        mut self,
        path: Option<String>,
        position: SignaturePosition,
        scale_percent: Option<f64>,
    ) -> Self {
        self.signature_enabled = Some(true);
        self.signature_path = path;
        self.signature_position = Some(position);
        self.signature_scale =
            scale_percent.map(|scale| scale.clamp(SIGNATURE_SCALE_MIN, SIGNATURE_SCALE_MAX));
        self
    }

    pub fn with_borders(mut self, show: bool) -> Self {
        self.show_borders = Some(show);
        self
    }

    pub fn with_merged_bidirectional_routes(mut self, merge: bool) -> Self {
        self.merge_bidirectional_routes = Some(merge);
        self
    }
}

/// Offset of one label from its anchor, in geographic units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAdjustment {
    pub city: String,
    pub dx: f64,
    pub dy: f64,
}

/// Request that re-renders the poster with the user's label edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyLabelsRequest {
    pub labels: Vec<LabelAdjustment>,
    /// The generate request that produced the current map
    pub payload: GenerateRequest,
    /// `true` asks for the final artifact instead of a new preview
    #[serde(rename = "final")]
    pub finalize: bool,
    pub hidden_labels: Vec<String>,
}

/// Print metadata reported alongside a rendered poster
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperInfo {
    pub format: Option<String>,
    pub label: Option<String>,
    pub orientation: Option<String>,
    pub dpi: Option<u32>,
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
}

/// Rendered map description returned by generate and apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPayload {
    #[serde(rename = "mapUrl")]
    pub map_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figure: Option<FigureGeometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<AxesGeometry>,
    pub bounds: GeoBounds,
    #[serde(default)]
    pub style: LabelStyle,
    #[serde(default)]
    pub labels: Vec<LabelRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper: Option<PaperInfo>,
    /// Map-level notes from the renderer, e.g. a signature that could not be placed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Final artifact rendered next to a preview by a non-final apply
    #[serde(default, rename = "finalDownload", skip_serializing_if = "Option::is_none")]
    pub final_download: Option<Box<MapPayload>>,
}

impl MapPayload {
    pub fn geometry(&self) -> MapGeometry {
        MapGeometry::new(self.bounds, self.figure, self.axes)
    }
}

/// Response envelope as sent by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapResponse {
    pub success: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<MapPayload>,
}

/// A successful generate/apply round trip
#[derive(Debug, Clone, PartialEq)]
pub struct MapReply {
    pub map: MapPayload,
    pub warnings: Vec<String>,
    pub cities: Vec<String>,
}

impl MapResponse {
    /// Validates the envelope. A non-2xx `status` is a failure even when the
    /// body claims success.
    pub fn into_reply(self, status: Option<u16>) -> Result<MapReply> {
        let status_ok = status.map_or(true, |code| (200..300).contains(&code));
        if !self.success || !status_ok {
            let message = self
                .error
                .unwrap_or_else(|| match status {
                    Some(code) => format!("The map service failed with status {code}."),
                    None => "The map service reported a failure.".to_string(),
                });
            return Err(Error::service(status, message));
        }
        let map = self
            .map
            .ok_or_else(|| Error::service(status, "The map service returned no map."))?;
        Ok(MapReply {
            map,
            warnings: self.warnings,
            cities: self.cities,
        })
    }
}

impl MapReply {
    pub fn new(map: MapPayload) -> Self {
        Self {
            map,
            warnings: Vec::new(),
            cities: Vec::new(),
        }
    }
}
