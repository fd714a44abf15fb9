use crate::{
    dem::{ContinuousElevationModel, DiscreteElevationModel},
    math::{sq, try_first_interval_containing_root, try_improve_root, EARTH_RADIUS},
    panorama::{Panorama, PanoramaSample},
    profile::ElevationProfile,
    PanoramaError, PanoramaParameters,
};
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Casts rays from an observer over a continuous elevation model, one
/// per pixel, and records what each ray hits first.
pub struct PanoramaComputer<D> {
    dem: ContinuousElevationModel<D>,
    spacing_m: f64,
    epsilon_m: f64,
    refraction: f64,
    profile_step_m: f64,
}

impl<D> PanoramaComputer<D>
where
    D: DiscreteElevationModel,
{
    pub fn builder() -> PanoramaComputerBuilder<D> {
        PanoramaComputerBuilder {
            dem: None,
            spacing_m: 64.0,
            epsilon_m: 4.0,
            refraction: 0.13,
            profile_step_m: ElevationProfile::<D>::STEP_M,
        }
    }

    pub fn dem(&self) -> &ContinuousElevationModel<D> {
        &self.dem
    }

    pub fn into_dem(self) -> ContinuousElevationModel<D> {
        self.dem
    }

    /// Height, in meters, of a ray above the terrain `x` meters along
    /// `profile`.
    ///
    /// The ray leaves the profile origin at elevation `ray0` with slope
    /// `ray_slope` (the tangent of its altitude angle). The last term
    /// accounts for the Earth's curvature, reduced by atmospheric
    /// refraction.
    pub fn ray_to_ground_distance(
        &self,
        profile: &ElevationProfile<'_, D>,
        ray0: f64,
        ray_slope: f64,
        x: f64,
    ) -> Result<f64, PanoramaError> {
        let curvature = (1.0 - self.refraction) / (2.0 * EARTH_RADIUS);
        Ok(ray0 + x * ray_slope - profile.elevation_at(x)? + sq(x) * curvature)
    }

    pub fn compute_panorama(&self, params: &PanoramaParameters) -> Result<Panorama, PanoramaError> {
        self.compute_panorama_with(params, &AtomicBool::new(false), |_| ())
    }

    /// Same as [`compute_panorama`](Self::compute_panorama), but stops
    /// with [`PanoramaError::Cancelled`] as soon as `cancel` is raised
    /// and calls `on_column` with the index of every finished column.
    ///
    /// Columns are computed in parallel; `on_column` may therefore be
    /// called from several threads and out of order.
    pub fn compute_panorama_with<F>(
        &self,
        params: &PanoramaParameters,
        cancel: &AtomicBool,
        on_column: F,
    ) -> Result<Panorama, PanoramaError>
    where
        F: Fn(usize) + Sync,
    {
        let now = std::time::Instant::now();
        let columns = (0..params.width())
            .into_par_iter()
            .map(|x| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(PanoramaError::Cancelled);
                }
                let column = self.compute_column(params, x)?;
                on_column(x);
                Ok(column)
            })
            .collect::<Result<Vec<_>, PanoramaError>>()?;
        let compute_runtime = now.elapsed();

        let now = std::time::Instant::now();
        let mut builder = Panorama::builder(params.clone());
        for (x, column) in columns.into_iter().enumerate() {
            for (y, sample) in column {
                builder.set_sample_at(x, y, sample)?;
            }
        }
        let panorama = builder.build()?;
        let build_runtime = now.elapsed();

        debug!(
            "panorama; size: {}x{}, compute_exec: {:?}, build_exec: {:?}",
            params.width(),
            params.height(),
            compute_runtime,
            build_runtime
        );
        Ok(panorama)
    }
}

/// Private API.
impl<D> PanoramaComputer<D>
where
    D: DiscreteElevationModel,
{
    /// Walks column `x` from the bottom row up, returning the terrain
    /// hits. Stops at the first row whose ray escapes.
    fn compute_column(
        &self,
        params: &PanoramaParameters,
        x: usize,
    ) -> Result<Vec<(usize, PanoramaSample)>, PanoramaError> {
        let max_distance = params.max_distance();
        let ray0 = params.observer_elevation();
        #[allow(clippy::cast_precision_loss)]
        let azimuth = params.azimuth_for_x(x as f64)?;
        let profile = ElevationProfile::with_step(
            &self.dem,
            params.observer_position(),
            azimuth,
            max_distance,
            self.profile_step_m,
        )?;

        let mut hits = Vec::new();
        // No row above the current one can hit closer than this.
        let mut root = 0.0;
        for y in (0..params.height()).rev() {
            #[allow(clippy::cast_precision_loss)]
            let altitude = params.altitude_for_y(y as f64)?;
            let ray_slope = altitude.tan();
            let f = |d| self.ray_to_ground_distance(&profile, ray0, ray_slope, d);

            let Some(lower) =
                try_first_interval_containing_root(&f, root, max_distance, self.spacing_m)?
            else {
                break;
            };
            let upper = (lower + self.spacing_m).min(max_distance);
            root = try_improve_root(&f, lower, upper, self.epsilon_m)?;

            let position = profile.position_at(root)?;
            #[allow(clippy::cast_possible_truncation)]
            let sample = PanoramaSample {
                distance: (root / altitude.cos()) as f32,
                longitude: position.longitude() as f32,
                latitude: position.latitude() as f32,
                elevation: self.dem.elevation_at(position)? as f32,
                slope: profile.slope_at(root)? as f32,
            };
            hits.push((y, sample));
        }
        Ok(hits)
    }
}

pub struct PanoramaComputerBuilder<D> {
    /// Terrain to cast rays over (required).
    dem: Option<ContinuousElevationModel<D>>,

    /// Step of the coarse root scan (meters, defaults to 64).
    spacing_m: f64,

    /// Width of the bracket the root is refined to (meters, defaults
    /// to 4).
    epsilon_m: f64,

    /// Atmospheric refraction coefficient (defaults to 0.13).
    refraction: f64,

    /// Distance between cached profile samples (meters, defaults to
    /// 16).
    profile_step_m: f64,
}

impl<D> PanoramaComputerBuilder<D>
where
    D: DiscreteElevationModel,
{
    /// Terrain to cast rays over (required).
    #[must_use]
    pub fn dem(mut self, dem: ContinuousElevationModel<D>) -> Self {
        self.dem = Some(dem);
        self
    }

    /// Step of the coarse root scan (meters, defaults to 64).
    #[must_use]
    pub fn spacing(mut self, meters: f64) -> Self {
        self.spacing_m = meters;
        self
    }

    /// Width of the bracket the root is refined to (meters, defaults
    /// to 4).
    #[must_use]
    pub fn epsilon(mut self, meters: f64) -> Self {
        self.epsilon_m = meters;
        self
    }

    /// Atmospheric refraction coefficient (defaults to 0.13).
    #[must_use]
    pub fn refraction(mut self, k: f64) -> Self {
        self.refraction = k;
        self
    }

    /// Distance between cached profile samples (meters, defaults to
    /// 16).
    #[must_use]
    pub fn profile_step(mut self, meters: f64) -> Self {
        self.profile_step_m = meters;
        self
    }

    pub fn build(self) -> Result<PanoramaComputer<D>, PanoramaError> {
        let dem = self.dem.ok_or(PanoramaError::Builder("dem"))?;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.spacing_m) {
            return Err(PanoramaError::InvalidParameter("spacing"));
        }
        if !positive(self.epsilon_m) {
            return Err(PanoramaError::InvalidParameter("epsilon"));
        }
        if !self.refraction.is_finite() {
            return Err(PanoramaError::InvalidParameter("refraction"));
        }
        if !positive(self.profile_step_m) {
            return Err(PanoramaError::InvalidParameter("profile_step"));
        }
        Ok(PanoramaComputer {
            dem,
            spacing_m: self.spacing_m,
            epsilon_m: self.epsilon_m,
            refraction: self.refraction,
            profile_step_m: self.profile_step_m,
        })
    }
}
