use super::DiscreteElevationModel;
use crate::{math::Interval2D, PanoramaError};

/// A discrete elevation model computed from a function of the sample
/// indices.
///
/// Useful for synthetic scenes and for benchmarking without tiles on
/// disk.
pub struct SyntheticElevationModel<F> {
    extent: Interval2D,
    elevation: F,
    released: bool,
}

impl<F> SyntheticElevationModel<F>
where
    F: Fn(i32, i32) -> f64 + Send + Sync,
{
    pub fn new(extent: Interval2D, elevation: F) -> Self {
        Self {
            extent,
            elevation,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl<F> DiscreteElevationModel for SyntheticElevationModel<F>
where
    F: Fn(i32, i32) -> f64 + Send + Sync,
{
    fn extent(&self) -> Interval2D {
        self.extent
    }

    fn elevation_sample(&self, x: i32, y: i32) -> Result<f64, PanoramaError> {
        if self.released {
            Err(PanoramaError::Released)
        } else if self.extent.contains(x, y) {
            Ok((self.elevation)(x, y))
        } else {
            Err(PanoramaError::SampleOutOfRange(x, y))
        }
    }

    fn release(&mut self) {
        self.released = true;
    }
}
