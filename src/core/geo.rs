use crate::core::constants::SPAN_EPSILON;
use serde::{Deserialize, Serialize};

/// A geographic coordinate in the poster's plate carrée data space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a new coordinate
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns this coordinate displaced by a geographic offset
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.lon + dx, self.lat + dy)
    }

    /// Geographic displacement from `origin` to this coordinate
    pub fn delta_from(&self, origin: &GeoPoint) -> (f64, f64) {
        (self.lon - origin.lon, self.lat - origin.lat)
    }

    /// True when both axes differ from `other` by at most `tolerance`
    pub fn within_tolerance(&self, other: &GeoPoint, tolerance: f64) -> bool {
        (self.lon - other.lon).abs() <= tolerance && (self.lat - other.lat).abs() <= tolerance
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in figure or display pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    /// Clamps the point into the rectangle `[0, width] x [0, height]`
    pub fn clamp_to(&self, width: f64, height: f64) -> Point {
        Point::new(self.x.clamp(0.0, width.max(0.0)), self.y.clamp(0.0, height.max(0.0)))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Geographic extent covered by the map's axes rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GeoBounds {
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Longitude span, never smaller than [`SPAN_EPSILON`]
    pub fn lon_span(&self) -> f64 {
        (self.lon_max - self.lon_min).max(SPAN_EPSILON)
    }

    /// Latitude span, never smaller than [`SPAN_EPSILON`]
    pub fn lat_span(&self) -> f64 {
        (self.lat_max - self.lat_min).max(SPAN_EPSILON)
    }

    /// Whether the bounds satisfy `max > min` on both axes
    pub fn is_valid(&self) -> bool {
        self.lon_max > self.lon_min && self.lat_max > self.lat_min
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.lon >= self.lon_min
            && point.lon <= self.lon_max
            && point.lat >= self.lat_min
            && point.lat <= self.lat_max
    }

    /// Position of `point` relative to the bounds, `(0, 0)` at the south-west corner
    pub fn to_relative(&self, point: &GeoPoint) -> (f64, f64) {
        (
            (point.lon - self.lon_min) / self.lon_span(),
            (point.lat - self.lat_min) / self.lat_span(),
        )
    }

    /// Inverse of [`GeoBounds::to_relative`]
    pub fn from_relative(&self, x_rel: f64, y_rel: f64) -> GeoPoint {
        GeoPoint::new(
            self.lon_min + x_rel * self.lon_span(),
            self.lat_min + y_rel * self.lat_span(),
        )
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lon_min + self.lon_max) / 2.0,
            (self.lat_min + self.lat_max) / 2.0,
        )
    }
}
