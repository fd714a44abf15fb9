use super::{sample_index, DiscreteElevationModel, SAMPLES_PER_RADIAN};
use crate::{
    math::{bilerp, to_meters, GeoPoint, Interval2D},
    PanoramaError,
};

/// Elevation and slope as continuous functions of position, derived
/// from a discrete model by bilinear interpolation.
///
/// The supported region is the discrete extent grown by one sample on
/// every side. Samples in that margin repeat the nearest edge sample.
pub struct ContinuousElevationModel<D> {
    dem: D,
    extent: Interval2D,
}

impl<D: DiscreteElevationModel> ContinuousElevationModel<D> {
    pub fn new(dem: D) -> Self {
        let extent = dem.extent();
        Self { dem, extent }
    }

    pub fn dem(&self) -> &D {
        &self.dem
    }

    pub fn into_inner(self) -> D {
        self.dem
    }

    /// Releases the underlying discrete model.
    pub fn release(&mut self) {
        self.dem.release();
    }

    /// Region, in sample indices, over which this model is defined.
    pub fn supported_extent(&self) -> Interval2D {
        self.extent.expanded(1)
    }

    /// Elevation in meters at `point`.
    pub fn elevation_at(&self, point: GeoPoint) -> Result<f64, PanoramaError> {
        let (x, y) = self.grid_coordinates(point)?;
        self.interpolated(x, y)
    }

    /// Terrain slope in radians at `point`, 0 being flat.
    pub fn slope_at(&self, point: GeoPoint) -> Result<f64, PanoramaError> {
        let (x, y) = self.grid_coordinates(point)?;
        let z = self.interpolated(x, y)?;
        let dz_east = self.interpolated(x + 1.0, y)? - z;
        let dz_north = self.interpolated(x, y + 1.0)? - z;

        let spacing_north = to_meters(1.0 / SAMPLES_PER_RADIAN);
        let spacing_east = spacing_north * point.latitude().cos();

        let gradient = (dz_east / spacing_east).hypot(dz_north / spacing_north);
        Ok(gradient.atan())
    }
}

/// Private API.
impl<D: DiscreteElevationModel> ContinuousElevationModel<D> {
    fn grid_coordinates(&self, point: GeoPoint) -> Result<(f64, f64), PanoramaError> {
        let x = sample_index(point.longitude());
        let y = sample_index(point.latitude());
        let supported = self.supported_extent();
        let within = |v: f64, from: i32, to: i32| f64::from(from) <= v && v <= f64::from(to);
        if within(
            x,
            supported.ix().included_from(),
            supported.ix().included_to(),
        ) && within(
            y,
            supported.iy().included_from(),
            supported.iy().included_to(),
        ) {
            Ok((x, y))
        } else {
            Err(PanoramaError::PointOutOfRange(
                point.longitude().to_degrees(),
                point.latitude().to_degrees(),
            ))
        }
    }

    fn interpolated(&self, x: f64, y: f64) -> Result<f64, PanoramaError> {
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        #[allow(clippy::cast_possible_truncation)]
        let (x0, y0) = (x0 as i32, y0 as i32);
        Ok(bilerp(
            self.clamped_sample(x0, y0)?,
            self.clamped_sample(x0 + 1, y0)?,
            self.clamped_sample(x0, y0 + 1)?,
            self.clamped_sample(x0 + 1, y0 + 1)?,
            fx,
            fy,
        ))
    }

    fn clamped_sample(&self, x: i32, y: i32) -> Result<f64, PanoramaError> {
        let (ix, iy) = (self.extent.ix(), self.extent.iy());
        self.dem.elevation_sample(
            x.clamp(ix.included_from(), ix.included_to()),
            y.clamp(iy.included_from(), iy.included_to()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ContinuousElevationModel;
    use crate::{
        dem::{to_radians, SyntheticElevationModel, SAMPLES_PER_RADIAN},
        math::{to_meters, GeoPoint, Interval1D, Interval2D},
        PanoramaError,
    };
    use approx::assert_relative_eq;

    /// Sample indices around 7°E, 46°N.
    const X0: i32 = 7 * 3600;
    const Y0: i32 = 46 * 3600;

    fn extent() -> Interval2D {
        Interval2D::new(
            Interval1D::new(X0, X0 + 100).unwrap(),
            Interval1D::new(Y0, Y0 + 100).unwrap(),
        )
    }

    fn point(x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(to_radians(x), to_radians(y)).unwrap()
    }

    /// A pseudo-random but deterministic terrain.
    #[allow(clippy::cast_precision_loss)]
    fn bumpy(x: i32, y: i32) -> f64 {
        ((i64::from(x) * 7919 + i64::from(y) * 104_729) % 1000) as f64
    }

    #[test]
    fn test_exact_at_grid_points() {
        let dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), bumpy));
        for (dx, dy) in [(0, 0), (1, 0), (37, 52), (99, 100), (100, 100)] {
            let (x, y) = (X0 + dx, Y0 + dy);
            assert_relative_eq!(
                dem.elevation_at(point(f64::from(x), f64::from(y))).unwrap(),
                bumpy(x, y),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_bilinear_interpolation() {
        let plane = |x: i32, y: i32| f64::from(2 * (x - X0) + 3 * (y - Y0));
        let dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), plane));
        let x = f64::from(X0) + 10.25;
        let y = f64::from(Y0) + 20.5;
        assert_relative_eq!(
            dem.elevation_at(point(x, y)).unwrap(),
            2.0 * 10.25 + 3.0 * 20.5,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_margin() {
        let dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), bumpy));
        // Margin samples repeat the edge.
        assert_relative_eq!(
            dem.elevation_at(point(f64::from(X0) - 0.5, f64::from(Y0))).unwrap(),
            bumpy(X0, Y0),
            epsilon = 1e-6
        );
        assert_relative_eq!(
            dem.elevation_at(point(f64::from(X0) + 100.5, f64::from(Y0) + 100.5))
                .unwrap(),
            bumpy(X0 + 100, Y0 + 100),
            epsilon = 1e-6
        );
        assert!(matches!(
            dem.elevation_at(point(f64::from(X0) - 1.5, f64::from(Y0))),
            Err(PanoramaError::PointOutOfRange(..))
        ));
        assert!(matches!(
            dem.slope_at(point(f64::from(X0), f64::from(Y0 + 102))),
            Err(PanoramaError::PointOutOfRange(..))
        ));
    }

    #[test]
    fn test_flat_slope() {
        let dem =
            ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), |_, _| 500.0));
        let p = point(f64::from(X0) + 3.3, f64::from(Y0) + 4.4);
        assert_eq!(dem.slope_at(p).unwrap(), 0.0);
    }

    #[test]
    fn test_inclined_slope() {
        // Rises one sample spacing per sample northward: 45°.
        let spacing = to_meters(1.0 / SAMPLES_PER_RADIAN);
        let ramp = move |_: i32, y: i32| f64::from(y - Y0) * spacing;
        let dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), ramp));
        assert_relative_eq!(
            dem.slope_at(point(f64::from(X0) + 10.0, f64::from(Y0) + 10.5))
                .unwrap(),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-9
        );

        // Eastward samples are closer together than northward ones.
        let ramp = move |x: i32, _: i32| f64::from(x - X0) * spacing;
        let dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), ramp));
        let p = point(f64::from(X0) + 10.0, f64::from(Y0) + 10.0);
        assert_relative_eq!(
            dem.slope_at(p).unwrap(),
            (1.0 / p.latitude().cos()).atan(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_release() {
        let mut dem = ContinuousElevationModel::new(SyntheticElevationModel::new(extent(), bumpy));
        dem.release();
        assert!(dem.dem().is_released());
        assert!(matches!(
            dem.elevation_at(point(f64::from(X0), f64::from(Y0))),
            Err(PanoramaError::Released)
        ));
    }
}
