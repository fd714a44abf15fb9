use super::DiscreteElevationModel;
use crate::{math::Interval2D, PanoramaError};

/// The union of two discrete elevation models.
///
/// The extent is the per-axis union of both extents and may therefore
/// contain samples neither model provides; reading those fails. Samples
/// `first` covers come from `first`, the rest from `second`.
pub struct CompositeElevationModel<A, B> {
    first: A,
    second: B,
    extent: Interval2D,
}

impl<A, B> CompositeElevationModel<A, B>
where
    A: DiscreteElevationModel,
    B: DiscreteElevationModel,
{
    pub fn new(first: A, second: B) -> Self {
        let extent = first.extent().union(&second.extent());
        Self {
            first,
            second,
            extent,
        }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A, B> DiscreteElevationModel for CompositeElevationModel<A, B>
where
    A: DiscreteElevationModel,
    B: DiscreteElevationModel,
{
    fn extent(&self) -> Interval2D {
        self.extent
    }

    fn elevation_sample(&self, x: i32, y: i32) -> Result<f64, PanoramaError> {
        if self.first.extent().contains(x, y) {
            match self.first.elevation_sample(x, y) {
                // `first` may itself be a composite with a hole here.
                Err(PanoramaError::SampleOutOfRange(..))
                    if self.second.extent().contains(x, y) =>
                {
                    self.second.elevation_sample(x, y)
                }
                found => found,
            }
        } else if self.second.extent().contains(x, y) {
            self.second.elevation_sample(x, y)
        } else {
            Err(PanoramaError::SampleOutOfRange(x, y))
        }
    }

    fn release(&mut self) {
        self.first.release();
        self.second.release();
    }
}
