use crate::{
    math::{angular_distance, azimuth, GeoPoint},
    PanoramaError,
};
use serde::Serialize;
use std::f64::consts::TAU;

/// Largest accepted supersampling exponent.
pub const MAX_SUPERSAMPLING_EXPONENT: u32 = 2;

/// Where the observer stands, where they look, and the size of the
/// image to compute.
///
/// Pixel `(0, 0)` is the top-left corner of the image. Columns map
/// linearly to azimuths and rows to altitudes, both centered on the
/// middle of the image, with the same angular step on both axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanoramaParameters {
    observer_position: GeoPoint,
    observer_elevation: f64,
    center_azimuth: f64,
    horizontal_field_of_view: f64,
    max_distance: f64,
    width: usize,
    height: usize,
}

impl PanoramaParameters {
    pub fn new(
        observer_position: GeoPoint,
        observer_elevation: f64,
        center_azimuth: f64,
        horizontal_field_of_view: f64,
        max_distance: f64,
        width: usize,
        height: usize,
    ) -> Result<Self, PanoramaError> {
        if !observer_elevation.is_finite() {
            return Err(PanoramaError::InvalidParameter("observer_elevation"));
        }
        if !azimuth::is_canonical(center_azimuth) {
            return Err(PanoramaError::InvalidParameter("center_azimuth"));
        }
        if !(horizontal_field_of_view > 0.0 && horizontal_field_of_view <= TAU) {
            return Err(PanoramaError::InvalidParameter("horizontal_field_of_view"));
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(PanoramaError::InvalidParameter("max_distance"));
        }
        if width < 2 {
            return Err(PanoramaError::InvalidParameter("width"));
        }
        if height < 1 {
            return Err(PanoramaError::InvalidParameter("height"));
        }
        Ok(Self {
            observer_position,
            observer_elevation,
            center_azimuth,
            horizontal_field_of_view,
            max_distance,
            width,
            height,
        })
    }

    /// Returns the same view with `2^exponent` times as many pixels
    /// along each axis.
    pub fn supersampled(&self, exponent: u32) -> Result<Self, PanoramaError> {
        if exponent > MAX_SUPERSAMPLING_EXPONENT {
            return Err(PanoramaError::InvalidParameter("supersampling"));
        }
        Self::new(
            self.observer_position,
            self.observer_elevation,
            self.center_azimuth,
            self.horizontal_field_of_view,
            self.max_distance,
            self.width << exponent,
            self.height << exponent,
        )
    }

    pub fn observer_position(&self) -> GeoPoint {
        self.observer_position
    }

    /// Observer elevation, in meters.
    pub fn observer_elevation(&self) -> f64 {
        self.observer_elevation
    }

    pub fn center_azimuth(&self) -> f64 {
        self.center_azimuth
    }

    pub fn horizontal_field_of_view(&self) -> f64 {
        self.horizontal_field_of_view
    }

    pub fn vertical_field_of_view(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let rows = (self.height - 1) as f64;
        self.angular_step() * rows
    }

    /// Maximum distance, in meters, at which terrain is looked for.
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Angle between two adjacent pixels, in radians.
    pub fn angular_step(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let columns = (self.width - 1) as f64;
        self.horizontal_field_of_view / columns
    }

    /// Azimuth of (the possibly fractional) column `x`.
    pub fn azimuth_for_x(&self, x: f64) -> Result<f64, PanoramaError> {
        if !(0.0..=self.max_x()).contains(&x) {
            return Err(PanoramaError::InvalidParameter("x"));
        }
        Ok(azimuth::canonicalize(
            self.center_azimuth + (x - self.center_x()) * self.angular_step(),
        ))
    }

    /// Column looking towards `azimuth`.
    pub fn x_for_azimuth(&self, azimuth: f64) -> Result<f64, PanoramaError> {
        let delta = angular_distance(self.center_azimuth, azimuth);
        if delta.abs() > self.horizontal_field_of_view / 2.0 {
            return Err(PanoramaError::InvalidParameter("azimuth"));
        }
        Ok(self.center_x() + delta / self.angular_step())
    }

    /// Altitude angle of (the possibly fractional) row `y`, positive
    /// above the horizontal.
    pub fn altitude_for_y(&self, y: f64) -> Result<f64, PanoramaError> {
        if !(0.0..=self.max_y()).contains(&y) {
            return Err(PanoramaError::InvalidParameter("y"));
        }
        Ok((self.center_y() - y) * self.angular_step())
    }

    /// Row looking at `altitude`.
    pub fn y_for_altitude(&self, altitude: f64) -> Result<f64, PanoramaError> {
        if altitude.is_nan() || altitude.abs() > self.vertical_field_of_view() / 2.0 {
            return Err(PanoramaError::InvalidParameter("altitude"));
        }
        Ok(self.center_y() - altitude / self.angular_step())
    }

    pub fn is_valid_sample_index(&self, x: i64, y: i64) -> bool {
        usize::try_from(x).map_or(false, |x| x < self.width)
            && usize::try_from(y).map_or(false, |y| y < self.height)
    }

    /// Position of pixel `(x, y)` in row-major order.
    pub fn linear_sample_index(&self, x: i64, y: i64) -> Result<usize, PanoramaError> {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(ux), Ok(uy)) if ux < self.width && uy < self.height => Ok(ux + uy * self.width),
            _ => Err(PanoramaError::PixelOutOfRange(x, y)),
        }
    }
}

/// Private API.
impl PanoramaParameters {
    #[allow(clippy::cast_precision_loss)]
    fn max_x(&self) -> f64 {
        (self.width - 1) as f64
    }

    #[allow(clippy::cast_precision_loss)]
    fn max_y(&self) -> f64 {
        (self.height - 1) as f64
    }

    fn center_x(&self) -> f64 {
        self.max_x() / 2.0
    }

    fn center_y(&self) -> f64 {
        self.max_y() / 2.0
    }
}
