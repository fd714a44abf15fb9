//! Elevation models.
//!
//! A [`DiscreteElevationModel`] gives access to raw samples on an
//! integer grid where index `i` on either axis sits at `i /
//! SAMPLES_PER_DEGREE` degrees of longitude (x) or latitude (y). The
//! [`ContinuousElevationModel`] turns one into functions of a
//! [`GeoPoint`](crate::math::GeoPoint).

mod composite;
mod continuous;
mod synthetic;
mod tile;

pub use self::{
    composite::CompositeElevationModel, continuous::ContinuousElevationModel,
    synthetic::SyntheticElevationModel, tile::HgtElevationModel,
};
use crate::{math::Interval2D, PanoramaError};
use std::f64::consts::PI;

/// Number of sample intervals spanning one degree.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const SAMPLES_PER_DEGREE: i32 = hgt::SAMPLES_PER_DEGREE as i32;

/// Number of sample intervals spanning one radian.
pub const SAMPLES_PER_RADIAN: f64 = SAMPLES_PER_DEGREE as f64 * 180.0 / PI;

/// Converts an angle (radians) to a fractional sample index.
pub fn sample_index(angle: f64) -> f64 {
    angle * SAMPLES_PER_RADIAN
}

/// Converts a (possibly fractional) sample index to an angle in
/// radians.
pub fn to_radians(sample_index: f64) -> f64 {
    sample_index / SAMPLES_PER_RADIAN
}

/// Read-only access to elevation samples over a rectangular extent.
///
/// Implementations must be safe to read from many threads at once.
pub trait DiscreteElevationModel: Send + Sync {
    /// Indices for which [`elevation_sample`](Self::elevation_sample)
    /// may be called.
    fn extent(&self) -> Interval2D;

    /// Elevation, in meters, of sample `(x, y)`.
    fn elevation_sample(&self, x: i32, y: i32) -> Result<f64, PanoramaError>;

    /// Releases any resource backing this model. Reads made after
    /// release fail.
    fn release(&mut self);

    /// Returns a model covering both `self` and `that`, where `self`
    /// takes precedence on overlapping samples.
    fn union<D>(self, that: D) -> CompositeElevationModel<Self, D>
    where
        Self: Sized,
        D: DiscreteElevationModel,
    {
        CompositeElevationModel::new(self, that)
    }
}

impl<D: DiscreteElevationModel + ?Sized> DiscreteElevationModel for Box<D> {
    fn extent(&self) -> Interval2D {
        (**self).extent()
    }

    fn elevation_sample(&self, x: i32, y: i32) -> Result<f64, PanoramaError> {
        (**self).elevation_sample(x, y)
    }

    fn release(&mut self) {
        (**self).release();
    }
}
