use crate::{PanoramaError, PanoramaParameters};
use std::mem;

/// Everything computed for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanoramaSample {
    /// Distance from the observer to the terrain hit, in meters;
    /// `f32::INFINITY` for sky.
    pub distance: f32,
    /// Longitude of the terrain hit, in radians.
    pub longitude: f32,
    /// Latitude of the terrain hit, in radians.
    pub latitude: f32,
    /// Terrain elevation at the hit, in meters.
    pub elevation: f32,
    /// Terrain slope at the hit, in radians.
    pub slope: f32,
}

impl Default for PanoramaSample {
    fn default() -> Self {
        Self {
            distance: f32::INFINITY,
            longitude: 0.0,
            latitude: 0.0,
            elevation: 0.0,
            slope: 0.0,
        }
    }
}

#[derive(Debug)]
struct Channels {
    distance: Box<[f32]>,
    longitude: Box<[f32]>,
    latitude: Box<[f32]>,
    elevation: Box<[f32]>,
    slope: Box<[f32]>,
}

impl Channels {
    fn new(len: usize) -> Self {
        let filled = |v: f32| vec![v; len].into_boxed_slice();
        Self {
            distance: filled(f32::INFINITY),
            longitude: filled(0.0),
            latitude: filled(0.0),
            elevation: filled(0.0),
            slope: filled(0.0),
        }
    }
}

/// A computed panorama: five per-pixel channels over a
/// [`PanoramaParameters`] grid.
#[derive(Debug)]
pub struct Panorama {
    parameters: PanoramaParameters,
    channels: Channels,
}

impl Panorama {
    pub fn builder(parameters: PanoramaParameters) -> PanoramaBuilder {
        let len = parameters.width() * parameters.height();
        PanoramaBuilder {
            parameters,
            state: BuilderState::Accumulating(Channels::new(len)),
        }
    }

    pub fn parameters(&self) -> &PanoramaParameters {
        &self.parameters
    }

    pub fn distance_at(&self, x: usize, y: usize) -> Result<f32, PanoramaError> {
        Ok(self.channels.distance[self.index(x, y)?])
    }

    /// Distance at `(x, y)`, or `default` if the pixel lies outside the
    /// image.
    pub fn distance_at_or(&self, x: i64, y: i64, default: f32) -> f32 {
        self.parameters
            .linear_sample_index(x, y)
            .map_or(default, |i| self.channels.distance[i])
    }

    pub fn longitude_at(&self, x: usize, y: usize) -> Result<f32, PanoramaError> {
        Ok(self.channels.longitude[self.index(x, y)?])
    }

    pub fn latitude_at(&self, x: usize, y: usize) -> Result<f32, PanoramaError> {
        Ok(self.channels.latitude[self.index(x, y)?])
    }

    pub fn elevation_at(&self, x: usize, y: usize) -> Result<f32, PanoramaError> {
        Ok(self.channels.elevation[self.index(x, y)?])
    }

    pub fn slope_at(&self, x: usize, y: usize) -> Result<f32, PanoramaError> {
        Ok(self.channels.slope[self.index(x, y)?])
    }

    pub fn sample_at(&self, x: usize, y: usize) -> Result<PanoramaSample, PanoramaError> {
        let i = self.index(x, y)?;
        let c = &self.channels;
        Ok(PanoramaSample {
            distance: c.distance[i],
            longitude: c.longitude[i],
            latitude: c.latitude[i],
            elevation: c.elevation[i],
            slope: c.slope[i],
        })
    }

    /// Returns `true` if no pixel of column `x` hits terrain.
    pub fn column_is_sky(&self, x: usize) -> Result<bool, PanoramaError> {
        Ok(self.horizon_row(x)?.is_none())
    }

    /// Topmost row of column `x` that hits terrain.
    pub fn horizon_row(&self, x: usize) -> Result<Option<usize>, PanoramaError> {
        self.index(x, 0)?;
        let width = self.parameters.width();
        Ok((0..self.parameters.height())
            .find(|y| self.channels.distance[x + y * width].is_finite()))
    }

    /// How much farther than pixel `(x, y)` the farthest of its four
    /// neighbors is. Neighbors outside the image count as distance 0.
    ///
    /// Large values mark silhouette edges.
    pub fn max_distance_to_neighbors(&self, x: usize, y: usize) -> Result<f32, PanoramaError> {
        let center = self.distance_at(x, y)?;
        let (x, y) = (signed(x), signed(y));
        let farthest = [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
            .into_iter()
            .map(|(nx, ny)| self.distance_at_or(nx, ny, 0.0))
            .fold(f32::NEG_INFINITY, f32::max);
        Ok(farthest - center)
    }

    fn index(&self, x: usize, y: usize) -> Result<usize, PanoramaError> {
        self.parameters.linear_sample_index(signed(x), signed(y))
    }
}

enum BuilderState {
    Accumulating(Channels),
    Finalized,
}

/// Write-once accumulator for a [`Panorama`].
///
/// Every pixel starts as sky. Once [`build`](Self::build) has been
/// called, every further call fails with
/// [`PanoramaError::Finalized`].
pub struct PanoramaBuilder {
    parameters: PanoramaParameters,
    state: BuilderState,
}

impl PanoramaBuilder {
    pub fn parameters(&self) -> &PanoramaParameters {
        &self.parameters
    }

    pub fn set_distance_at(
        &mut self,
        x: usize,
        y: usize,
        distance: f32,
    ) -> Result<&mut Self, PanoramaError> {
        let (i, c) = self.slot(x, y)?;
        c.distance[i] = distance;
        Ok(self)
    }

    pub fn set_longitude_at(
        &mut self,
        x: usize,
        y: usize,
        longitude: f32,
    ) -> Result<&mut Self, PanoramaError> {
        let (i, c) = self.slot(x, y)?;
        c.longitude[i] = longitude;
        Ok(self)
    }

    pub fn set_latitude_at(
        &mut self,
        x: usize,
        y: usize,
        latitude: f32,
    ) -> Result<&mut Self, PanoramaError> {
        let (i, c) = self.slot(x, y)?;
        c.latitude[i] = latitude;
        Ok(self)
    }

    pub fn set_elevation_at(
        &mut self,
        x: usize,
        y: usize,
        elevation: f32,
    ) -> Result<&mut Self, PanoramaError> {
        let (i, c) = self.slot(x, y)?;
        c.elevation[i] = elevation;
        Ok(self)
    }

    pub fn set_slope_at(
        &mut self,
        x: usize,
        y: usize,
        slope: f32,
    ) -> Result<&mut Self, PanoramaError> {
        let (i, c) = self.slot(x, y)?;
        c.slope[i] = slope;
        Ok(self)
    }

    /// Writes all five channels of pixel `(x, y)` at once.
    pub fn set_sample_at(
        &mut self,
        x: usize,
        y: usize,
        sample: PanoramaSample,
    ) -> Result<&mut Self, PanoramaError> {
        let (i, c) = self.slot(x, y)?;
        c.distance[i] = sample.distance;
        c.longitude[i] = sample.longitude;
        c.latitude[i] = sample.latitude;
        c.elevation[i] = sample.elevation;
        c.slope[i] = sample.slope;
        Ok(self)
    }

    /// Hands the accumulated channels over to a [`Panorama`].
    pub fn build(&mut self) -> Result<Panorama, PanoramaError> {
        match mem::replace(&mut self.state, BuilderState::Finalized) {
            BuilderState::Accumulating(channels) => Ok(Panorama {
                parameters: self.parameters.clone(),
                channels,
            }),
            BuilderState::Finalized => Err(PanoramaError::Finalized),
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.state, BuilderState::Finalized)
    }

    fn slot(&mut self, x: usize, y: usize) -> Result<(usize, &mut Channels), PanoramaError> {
        match &mut self.state {
            BuilderState::Accumulating(channels) => {
                let i = self.parameters.linear_sample_index(signed(x), signed(y))?;
                Ok((i, channels))
            }
            BuilderState::Finalized => Err(PanoramaError::Finalized),
        }
    }
}

fn signed(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::{Panorama, PanoramaSample};
    use crate::{math::GeoPoint, PanoramaError, PanoramaParameters};

    fn params(width: usize, height: usize) -> PanoramaParameters {
        PanoramaParameters::new(
            GeoPoint::from_degrees(7.0, 46.0).unwrap(),
            1000.0,
            0.0,
            1.0,
            10_000.0,
            width,
            height,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let panorama = Panorama::builder(params(4, 3)).build().unwrap();
        for x in 0..4 {
            for y in 0..3 {
                assert_eq!(panorama.sample_at(x, y).unwrap(), PanoramaSample::default());
            }
            assert!(panorama.column_is_sky(x).unwrap());
        }
        assert_eq!(panorama.distance_at(3, 2).unwrap(), f32::INFINITY);
    }

    #[test]
    fn test_setters_and_readers() {
        let mut builder = Panorama::builder(params(4, 3));
        builder
            .set_distance_at(1, 2, 100.0)
            .unwrap()
            .set_longitude_at(1, 2, 0.1)
            .unwrap()
            .set_latitude_at(1, 2, 0.8)
            .unwrap()
            .set_elevation_at(1, 2, 1500.0)
            .unwrap()
            .set_slope_at(1, 2, 0.3)
            .unwrap();
        let sample = PanoramaSample {
            distance: 50.0,
            longitude: 0.2,
            latitude: 0.7,
            elevation: 900.0,
            slope: 0.0,
        };
        builder.set_sample_at(3, 0, sample).unwrap();
        let panorama = builder.build().unwrap();

        assert_eq!(panorama.distance_at(1, 2).unwrap(), 100.0);
        assert_eq!(panorama.longitude_at(1, 2).unwrap(), 0.1);
        assert_eq!(panorama.latitude_at(1, 2).unwrap(), 0.8);
        assert_eq!(panorama.elevation_at(1, 2).unwrap(), 1500.0);
        assert_eq!(panorama.slope_at(1, 2).unwrap(), 0.3);
        assert_eq!(panorama.sample_at(3, 0).unwrap(), sample);
        // Other pixels are untouched.
        assert_eq!(panorama.distance_at(2, 2).unwrap(), f32::INFINITY);
    }

    #[test]
    fn test_out_of_range_pixels() {
        let mut builder = Panorama::builder(params(4, 3));
        assert!(matches!(
            builder.set_distance_at(4, 0, 1.0),
            Err(PanoramaError::PixelOutOfRange(4, 0))
        ));
        assert!(matches!(
            builder.set_sample_at(0, 3, PanoramaSample::default()),
            Err(PanoramaError::PixelOutOfRange(0, 3))
        ));
        let panorama = builder.build().unwrap();
        assert!(matches!(
            panorama.elevation_at(0, 3),
            Err(PanoramaError::PixelOutOfRange(0, 3))
        ));
        assert!(panorama.horizon_row(4).is_err());
    }

    #[test]
    fn test_build_once() {
        let mut builder = Panorama::builder(params(2, 2));
        builder.set_distance_at(0, 0, 10.0).unwrap();
        assert!(!builder.is_finalized());
        let panorama = builder.build().unwrap();
        assert!(builder.is_finalized());
        assert!(matches!(builder.build(), Err(PanoramaError::Finalized)));
        assert!(matches!(
            builder.set_distance_at(0, 0, 20.0),
            Err(PanoramaError::Finalized)
        ));
        // Usage errors win over range checks once finalized.
        assert!(matches!(
            builder.set_slope_at(9, 9, 0.0),
            Err(PanoramaError::Finalized)
        ));
        assert_eq!(panorama.distance_at(0, 0).unwrap(), 10.0);
    }

    #[test]
    fn test_distance_at_or() {
        let mut builder = Panorama::builder(params(2, 2));
        builder.set_distance_at(1, 1, 7.0).unwrap();
        let panorama = builder.build().unwrap();
        assert_eq!(panorama.distance_at_or(1, 1, -1.0), 7.0);
        assert_eq!(panorama.distance_at_or(0, 0, -1.0), f32::INFINITY);
        assert_eq!(panorama.distance_at_or(-1, 0, -1.0), -1.0);
        assert_eq!(panorama.distance_at_or(0, 2, -1.0), -1.0);
    }

    #[test]
    fn test_horizon_row() {
        let mut builder = Panorama::builder(params(3, 5));
        for y in 2..5 {
            builder.set_distance_at(0, y, 1_000.0).unwrap();
        }
        builder.set_distance_at(2, 4, 1_000.0).unwrap();
        let panorama = builder.build().unwrap();
        assert_eq!(panorama.horizon_row(0).unwrap(), Some(2));
        assert_eq!(panorama.horizon_row(1).unwrap(), None);
        assert!(panorama.column_is_sky(1).unwrap());
        assert_eq!(panorama.horizon_row(2).unwrap(), Some(4));
    }

    #[test]
    fn test_max_distance_to_neighbors() {
        let mut builder = Panorama::builder(params(3, 3));
        for x in 0..3 {
            for y in 0..3 {
                builder.set_distance_at(x, y, 100.0).unwrap();
            }
        }
        builder.set_distance_at(1, 0, 5_000.0).unwrap();
        let panorama = builder.build().unwrap();
        assert_eq!(panorama.max_distance_to_neighbors(1, 1).unwrap(), 4_900.0);
        assert_eq!(panorama.max_distance_to_neighbors(2, 2).unwrap(), 0.0);
        // Outside neighbors read as 0.
        assert_eq!(panorama.max_distance_to_neighbors(1, 0).unwrap(), -4_900.0);
        assert!(panorama.max_distance_to_neighbors(3, 0).is_err());
    }
}
