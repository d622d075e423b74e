//! Coordinate transforms between geographic, figure-pixel and display-pixel space.
//!
//! The rendering service reports the full figure size, the axes rectangle in
//! which geographic bounds map linearly, and the bounds themselves. Figure
//! pixels grow upward from the bottom-left corner (the plotting convention);
//! display pixels grow downward from the top-left corner of the image as it is
//! currently shown, which may be scaled by the surrounding layout.

use crate::core::constants::SPAN_EPSILON;
use crate::core::geo::{GeoBounds, GeoPoint, Point};
use serde::{Deserialize, Serialize};

/// Full rendered canvas size in native pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureGeometry {
    pub width_px: f64,
    pub height_px: f64,
}

impl FigureGeometry {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    fn is_usable(&self) -> bool {
        self.width_px > 0.0 && self.height_px > 0.0
    }
}

/// Pixel rectangle inside the figure onto which the geographic bounds map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxesGeometry {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl AxesGeometry {
    pub fn new(x0: f64, y0: f64, width: f64, height: f64) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Axes covering the whole figure
    pub fn full(figure: &FigureGeometry) -> Self {
        Self::new(0.0, 0.0, figure.width_px, figure.height_px)
    }
}

/// Size of the image as currently laid out on screen
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// An image that has not finished decoding reports no dimensions
    pub fn is_loaded(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Projects a geographic coordinate into display pixels.
pub fn to_pixel(
    geo: &GeoPoint,
    bounds: &GeoBounds,
    fig: &FigureGeometry,
    axes: &AxesGeometry,
    display_width: f64,
    display_height: f64,
) -> Point {
    let (x_rel, y_rel) = bounds.to_relative(geo);

    let x_fig = axes.x0 + x_rel * axes.width;
    let y_fig = axes.y0 + y_rel * axes.height;
    let y_fig_flipped = fig.height_px - y_fig;

    let (scale_x, scale_y) = display_scale(fig, display_width, display_height);
    Point::new(x_fig * scale_x, y_fig_flipped * scale_y)
}

/// Inverse of [`to_pixel`].
pub fn to_geo(
    pixel: &Point,
    bounds: &GeoBounds,
    fig: &FigureGeometry,
    axes: &AxesGeometry,
    display_width: f64,
    display_height: f64,
) -> GeoPoint {
    let (scale_x, scale_y) = display_scale(fig, display_width, display_height);

    let x_fig = pixel.x / scale_x.max(SPAN_EPSILON);
    let y_fig_flipped = pixel.y / scale_y.max(SPAN_EPSILON);
    let y_fig = fig.height_px - y_fig_flipped;

    let x_rel = (x_fig - axes.x0) / axes.width.max(SPAN_EPSILON);
    let y_rel = (y_fig - axes.y0) / axes.height.max(SPAN_EPSILON);

    bounds.from_relative(x_rel, y_rel)
}

/// Figure-to-display scale factors `(x, y)`.
pub fn display_scale(fig: &FigureGeometry, display_width: f64, display_height: f64) -> (f64, f64) {
    (
        display_width / fig.width_px.max(SPAN_EPSILON),
        display_height / fig.height_px.max(SPAN_EPSILON),
    )
}

/// Geometry metadata of one rendered map, immutable until the next generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapGeometry {
    pub bounds: GeoBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figure: Option<FigureGeometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<AxesGeometry>,
}

impl MapGeometry {
    pub fn new(bounds: GeoBounds, figure: Option<FigureGeometry>, axes: Option<AxesGeometry>) -> Self {
        Self {
            bounds,
            figure,
            axes,
        }
    }

    /// Figure and axes to transform with. Missing metadata falls back to the
    /// displayed image acting as both figure and axes rectangle.
    pub fn resolve(&self, display: &DisplaySize) -> (FigureGeometry, AxesGeometry) {
        let figure = self
            .figure
            .filter(FigureGeometry::is_usable)
            .unwrap_or_else(|| FigureGeometry::new(display.width, display.height));
        let axes = self.axes.unwrap_or_else(|| AxesGeometry::full(&figure));
        (figure, axes)
    }

    pub fn to_pixel(&self, geo: &GeoPoint, display: &DisplaySize) -> Point {
        let (figure, axes) = self.resolve(display);
        to_pixel(geo, &self.bounds, &figure, &axes, display.width, display.height)
    }

    pub fn to_geo(&self, pixel: &Point, display: &DisplaySize) -> GeoPoint {
        let (figure, axes) = self.resolve(display);
        to_geo(pixel, &self.bounds, &figure, &axes, display.width, display.height)
    }

    /// Scales a font size given in figure pixels to the displayed image.
    ///
    /// Uses the vertical scale so glyphs keep their proportion to the poster.
    pub fn scale_font(&self, figure_px: f64, display: &DisplaySize) -> f64 {
        let (figure, _) = self.resolve(display);
        let (_, scale_y) = display_scale(&figure, display.width, display.height);
        figure_px * scale_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_geometry() -> MapGeometry {
        MapGeometry::new(
            GeoBounds::new(0.0, 10.0, 0.0, 10.0),
            Some(FigureGeometry::new(1000.0, 1000.0)),
            Some(AxesGeometry::new(0.0, 0.0, 1000.0, 1000.0)),
        )
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-6 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_center_maps_to_center() {
        let geometry = square_geometry();
        let pixel = geometry.to_pixel(&GeoPoint::new(5.0, 5.0), &DisplaySize::new(1000.0, 1000.0));
        assert_close(pixel.x, 500.0);
        assert_close(pixel.y, 500.0);
    }

    #[test]
    fn test_vertical_axis_is_flipped() {
        let geometry = square_geometry();
        let display = DisplaySize::new(1000.0, 1000.0);

        let north = geometry.to_pixel(&GeoPoint::new(0.0, 10.0), &display);
        assert_close(north.y, 0.0);

        let geo = geometry.to_geo(&Point::new(600.0, 400.0), &display);
        assert_close(geo.lon, 6.0);
        assert_close(geo.lat, 6.0);
    }

    #[test]
    fn test_round_trip_with_offset_axes_and_scaled_display() {
        let geometry = MapGeometry::new(
            GeoBounds::new(14.07, 24.15, 49.0, 54.84),
            Some(FigureGeometry::new(5906.0, 8268.0)),
            Some(AxesGeometry::new(295.3, 826.8, 5315.4, 6614.4)),
        );
        let display = DisplaySize::new(613.0, 858.2);

        for point in [
            GeoPoint::new(21.0122, 52.2297),
            GeoPoint::new(19.9450, 50.0647),
            GeoPoint::new(18.6466, 54.3520),
            GeoPoint::new(14.5528, 53.4285),
        ] {
            let pixel = geometry.to_pixel(&point, &display);
            let back = geometry.to_geo(&pixel, &display);
            assert_close(back.lon, point.lon);
            assert_close(back.lat, point.lat);
        }
    }

    #[test]
    fn test_degenerate_bounds_stay_finite() {
        let geometry = MapGeometry::new(
            GeoBounds::new(3.0, 3.0, 7.0, 7.0),
            Some(FigureGeometry::new(800.0, 600.0)),
            Some(AxesGeometry::new(40.0, 30.0, 720.0, 540.0)),
        );
        let display = DisplaySize::new(400.0, 300.0);

        let pixel = geometry.to_pixel(&GeoPoint::new(3.0, 7.0), &display);
        assert!(pixel.is_finite());

        let geo = geometry.to_geo(&Point::new(123.0, 45.0), &display);
        assert!(geo.is_finite());
    }

    #[test]
    fn test_missing_metadata_uses_image_as_axes() {
        let geometry = MapGeometry::new(GeoBounds::new(0.0, 4.0, 0.0, 2.0), None, None);
        let display = DisplaySize::new(400.0, 200.0);

        let (figure, axes) = geometry.resolve(&display);
        assert_eq!(figure, FigureGeometry::new(400.0, 200.0));
        assert_eq!(axes, AxesGeometry::new(0.0, 0.0, 400.0, 200.0));

        let pixel = geometry.to_pixel(&GeoPoint::new(1.0, 1.5), &display);
        assert_close(pixel.x, 100.0);
        assert_close(pixel.y, 50.0);
    }

    #[test]
    fn test_resize_halves_pixels_and_font() {
        let geometry = square_geometry();
        let full = DisplaySize::new(1000.0, 1000.0);
        let half = DisplaySize::new(500.0, 500.0);
        let point = GeoPoint::new(2.5, 7.5);

        let a = geometry.to_pixel(&point, &full);
        let b = geometry.to_pixel(&point, &half);
        assert_close(b.x, a.x * 0.5);
        assert_close(b.y, a.y * 0.5);

        assert_close(geometry.scale_font(50.0, &full), 50.0);
        assert_close(geometry.scale_font(50.0, &half), 25.0);
    }

    #[test]
    fn test_axes_metadata_ignores_extra_corners() {
        let axes: AxesGeometry = serde_json::from_str(
            r#"{"x0": 10.0, "y0": 20.0, "x1": 110.0, "y1": 220.0, "width": 100.0, "height": 200.0}"#,
        )
        .unwrap();
        assert_eq!(axes, AxesGeometry::new(10.0, 20.0, 100.0, 200.0));
    }
}
