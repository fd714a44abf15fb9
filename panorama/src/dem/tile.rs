use super::{DiscreteElevationModel, SAMPLES_PER_DEGREE};
use crate::{
    math::{Interval1D, Interval2D},
    PanoramaError,
};
use hgt::{HgtError, Tile};
use std::path::Path;

/// A discrete elevation model backed by one `.hgt` tile.
pub struct HgtElevationModel {
    tile: Tile,
    extent: Interval2D,
}

impl HgtElevationModel {
    /// Maps the tile at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PanoramaError> {
        Self::try_from(Tile::memmap(path)?)
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }
}

impl TryFrom<Tile> for HgtElevationModel {
    type Error = PanoramaError;

    fn try_from(tile: Tile) -> Result<Self, PanoramaError> {
        let interval = |degrees: i16| {
            let from = i32::from(degrees) * SAMPLES_PER_DEGREE;
            Interval1D::new(from, from + SAMPLES_PER_DEGREE)
        };
        let sw = tile.sw_corner();
        let extent = Interval2D::new(interval(sw.x)?, interval(sw.y)?);
        Ok(Self { tile, extent })
    }
}

impl DiscreteElevationModel for HgtElevationModel {
    fn extent(&self) -> Interval2D {
        self.extent
    }

    fn elevation_sample(&self, x: i32, y: i32) -> Result<f64, PanoramaError> {
        if !self.extent.contains(x, y) {
            return Err(PanoramaError::SampleOutOfRange(x, y));
        }
        #[allow(clippy::cast_sign_loss)]
        let xy = (
            (x - self.extent.ix().included_from()) as usize,
            (y - self.extent.iy().included_from()) as usize,
        );
        match self.tile.get_xy(xy) {
            Ok(sample) => Ok(f64::from(sample)),
            Err(HgtError::Released) => Err(PanoramaError::Released),
            Err(e) => Err(e.into()),
        }
    }

    fn release(&mut self) {
        self.tile.release();
    }
}

#[cfg(test)]
mod tests {
    use super::HgtElevationModel;
    use crate::{dem::DiscreteElevationModel, PanoramaError};
    use hgt::{FILE_LEN, SIDE};
    use std::fs;

    #[test]
    fn test_hgt_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("S02W003.hgt");
        let mut data = vec![0_u8; FILE_LEN as usize];
        // Northwest corner, then southeast corner.
        data[0..2].copy_from_slice(&1234_i16.to_be_bytes());
        let se = (SIDE * SIDE - 1) * 2;
        data[se..se + 2].copy_from_slice(&(-12_i16).to_be_bytes());
        fs::write(&path, data).unwrap();

        let mut dem = HgtElevationModel::open(&path).unwrap();
        let extent = dem.extent();
        assert_eq!(extent.ix().included_from(), -3 * 3600);
        assert_eq!(extent.ix().included_to(), -2 * 3600);
        assert_eq!(extent.iy().included_from(), -2 * 3600);
        assert_eq!(extent.iy().included_to(), -3600);

        assert_eq!(dem.elevation_sample(-3 * 3600, -3600).unwrap(), 1234.0);
        assert_eq!(dem.elevation_sample(-2 * 3600, -2 * 3600).unwrap(), -12.0);
        assert_eq!(dem.elevation_sample(-2 * 3600, -3600).unwrap(), 0.0);
        assert!(matches!(
            dem.elevation_sample(-2 * 3600 + 1, -3600),
            Err(PanoramaError::SampleOutOfRange(..))
        ));

        dem.release();
        assert!(matches!(
            dem.elevation_sample(-3 * 3600, -3600),
            Err(PanoramaError::Released)
        ));
    }

    #[test]
    fn test_invalid_file_is_a_construction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("N46E007.hgt");
        fs::write(&path, [0_u8; 16]).unwrap();
        assert!(matches!(
            HgtElevationModel::open(&path),
            Err(PanoramaError::Hgt(hgt::HgtError::HgtLen(16, _)))
        ));
    }
}
