use crate::{
    dem::{ContinuousElevationModel, DiscreteElevationModel},
    math::{azimuth, lerp, GeoPoint},
    PanoramaError,
};

/// Terrain elevation as a function of distance along a great circle
/// leaving `origin` with a fixed initial azimuth.
///
/// Elevations are sampled once, every `step` meters, when the profile
/// is built and linearly interpolated afterwards.
pub struct ElevationProfile<'a, D> {
    dem: &'a ContinuousElevationModel<D>,
    origin: GeoPoint,
    azimuth: f64,
    length: f64,
    step: f64,
    elevations: Box<[f64]>,
}

impl<'a, D: DiscreteElevationModel> ElevationProfile<'a, D> {
    /// Default distance between cached samples, in meters.
    pub const STEP_M: f64 = 16.0;

    pub fn new(
        dem: &'a ContinuousElevationModel<D>,
        origin: GeoPoint,
        azimuth: f64,
        length: f64,
    ) -> Result<Self, PanoramaError> {
        Self::with_step(dem, origin, azimuth, length, Self::STEP_M)
    }

    pub fn with_step(
        dem: &'a ContinuousElevationModel<D>,
        origin: GeoPoint,
        azimuth: f64,
        length: f64,
        step: f64,
    ) -> Result<Self, PanoramaError> {
        if !azimuth::is_canonical(azimuth) {
            return Err(PanoramaError::InvalidParameter("azimuth"));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(PanoramaError::InvalidParameter("length"));
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(PanoramaError::InvalidParameter("step"));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let mut intervals = (length / step).ceil() as usize;
        // Rounding may put the last waypoint before `length` onto it.
        #[allow(clippy::cast_precision_loss)]
        while intervals > 1 && (intervals - 1) as f64 * step >= length {
            intervals -= 1;
        }
        let elevations = (0..=intervals)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let distance = (i as f64 * step).min(length);
                dem.elevation_at(origin.destination(azimuth, distance))
            })
            .collect::<Result<Box<[f64]>, _>>()?;

        Ok(Self {
            dem,
            origin,
            azimuth,
            length,
            step,
            elevations,
        })
    }

    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Terrain elevation `distance` meters from the origin.
    pub fn elevation_at(&self, distance: f64) -> Result<f64, PanoramaError> {
        self.check_distance(distance)?;
        let position = distance / self.step;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = position.floor() as usize;
        let last = self.elevations.len() - 1;
        if i >= last {
            return Ok(self.elevations[last]);
        }
        // The final interval may be shorter than `step`.
        #[allow(clippy::cast_precision_loss)]
        let (d0, d1) = (i as f64 * self.step, ((i + 1) as f64 * self.step).min(self.length));
        Ok(lerp(
            self.elevations[i],
            self.elevations[i + 1],
            (distance - d0) / (d1 - d0),
        ))
    }

    /// Position `distance` meters from the origin.
    pub fn position_at(&self, distance: f64) -> Result<GeoPoint, PanoramaError> {
        self.check_distance(distance)?;
        Ok(self.origin.destination(self.azimuth, distance))
    }

    /// Terrain slope `distance` meters from the origin.
    pub fn slope_at(&self, distance: f64) -> Result<f64, PanoramaError> {
        self.dem.slope_at(self.position_at(distance)?)
    }

    fn check_distance(&self, distance: f64) -> Result<(), PanoramaError> {
        if (0.0..=self.length).contains(&distance) {
            Ok(())
        } else {
            Err(PanoramaError::DistanceOutOfRange(distance))
        }
    }
}
