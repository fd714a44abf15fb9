use super::{azimuth, sq, to_meters, to_radians};
use crate::PanoramaError;
use geo::geometry::Point;
use serde::Serialize;
use std::{
    f64::consts::{FRAC_PI_2, PI, TAU},
    fmt,
};

/// A point on the spherical Earth.
///
/// Both coordinates are in radians; longitude lies in (-π, π] and
/// latitude in [-π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, PanoramaError> {
        if longitude.is_nan() || longitude <= -PI || longitude > PI {
            return Err(PanoramaError::InvalidParameter("longitude"));
        }
        if !(-FRAC_PI_2..=FRAC_PI_2).contains(&latitude) {
            return Err(PanoramaError::InvalidParameter("latitude"));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    pub fn from_degrees(longitude: f64, latitude: f64) -> Result<Self, PanoramaError> {
        Self::new(longitude.to_radians(), latitude.to_radians())
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Great-circle distance to `that`, in meters.
    pub fn distance_to(&self, that: &Self) -> f64 {
        let hav = |a: f64| sq((a / 2.0).sin());
        let a = hav(that.latitude - self.latitude)
            + self.latitude.cos() * that.latitude.cos() * hav(that.longitude - self.longitude);
        to_meters(2.0 * a.sqrt().min(1.0).asin())
    }

    /// Initial bearing of the great circle from `self` to `that`, as a
    /// canonical azimuth.
    pub fn azimuth_to(&self, that: &Self) -> f64 {
        let d_lon = that.longitude - self.longitude;
        let y = d_lon.sin() * that.latitude.cos();
        let x = self.latitude.cos() * that.latitude.sin()
            - self.latitude.sin() * that.latitude.cos() * d_lon.cos();
        azimuth::canonicalize(y.atan2(x))
    }

    /// Returns the point reached by following the great circle that
    /// leaves `self` with the given initial `azimuth` for `distance`
    /// meters.
    pub fn destination(&self, azimuth: f64, distance: f64) -> Self {
        let delta = to_radians(distance);
        let (sin_lat, cos_lat) = self.latitude.sin_cos();
        let (sin_delta, cos_delta) = delta.sin_cos();
        let (sin_az, cos_az) = azimuth.sin_cos();

        let latitude = (sin_lat * cos_delta + cos_lat * sin_delta * cos_az)
            .clamp(-1.0, 1.0)
            .asin();
        let longitude = self.longitude
            + (sin_az * sin_delta * cos_lat).atan2(cos_delta - sin_lat * latitude.sin());

        Self {
            longitude: normalized_longitude(longitude),
            latitude,
        }
    }
}

/// Wraps `longitude` into (-π, π].
fn normalized_longitude(longitude: f64) -> f64 {
    PI - (PI - longitude).rem_euclid(TAU)
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.4},{:.4})",
            self.longitude.to_degrees(),
            self.latitude.to_degrees()
        )
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(p: GeoPoint) -> Self {
        Point::new(p.longitude.to_degrees(), p.latitude.to_degrees())
    }
}

impl TryFrom<Point<f64>> for GeoPoint {
    type Error = PanoramaError;

    fn try_from(p: Point<f64>) -> Result<Self, PanoramaError> {
        Self::from_degrees(p.x(), p.y())
    }
}
