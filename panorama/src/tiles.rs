//! `.hgt` tile directory.

use crate::{
    dem::{DiscreteElevationModel, HgtElevationModel},
    math::{to_radians, GeoPoint},
    PanoramaError,
};
use geo::geometry::Coord;
use hgt::{HgtError, Tile};
use log::debug;
use std::{
    io::ErrorKind,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};

/// A directory of `.hgt` tiles named after their southwest corner.
#[derive(Debug, Clone)]
pub struct Tiles {
    tile_dir: PathBuf,
}

impl Tiles {
    pub fn new(tile_dir: PathBuf) -> Result<Self, PanoramaError> {
        // Fail early if there is nothing to load.
        let mut has_height_files = false;
        for entry in std::fs::read_dir(&tile_dir)? {
            let path = entry?.path();
            if path
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .map_or(false, |ext| ext.eq_ignore_ascii_case("hgt"))
            {
                has_height_files = true;
                break;
            }
        }

        if has_height_files {
            Ok(Self { tile_dir })
        } else {
            Err(PanoramaError::Path(tile_dir))
        }
    }

    pub fn tile_dir(&self) -> &Path {
        &self.tile_dir
    }

    /// Returns the model for the tile whose southwest corner is
    /// `sw_corner` (in whole degrees), or a sea-level stand-in if the
    /// directory doesn't have it.
    pub fn load(&self, sw_corner: Coord<i16>) -> Result<HgtElevationModel, PanoramaError> {
        let tile = match Tile::memmap(self.tile_path(sw_corner)) {
            Ok(tile) => tile,
            Err(HgtError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("loading tombstone in lieu of missing tile for {sw_corner:?}");
                Tile::tombstone(sw_corner)
            }
            Err(e) => return Err(e.into()),
        };
        HgtElevationModel::try_from(tile)
    }

    /// Returns a model covering every sample within `max_distance`
    /// meters of `observer`.
    ///
    /// All tiles touched by the bounding box of that disk are loaded
    /// and combined. The box does not wrap around the antimeridian.
    pub fn around(
        &self,
        observer: GeoPoint,
        max_distance: f64,
    ) -> Result<Box<dyn DiscreteElevationModel>, PanoramaError> {
        if !(max_distance.is_finite() && max_distance >= 0.0) {
            return Err(PanoramaError::InvalidParameter("max_distance"));
        }
        let (sw, ne) = bounding_box(observer, max_distance);
        let (sw, ne) = (sw_corner(sw), sw_corner(ne));
        debug!(
            "around {observer}; tiles: {}x{}",
            ne.x - sw.x + 1,
            ne.y - sw.y + 1
        );

        // Rows are combined on their own first so that no intermediate
        // model has a hole in its extent.
        let mut dem: Option<Box<dyn DiscreteElevationModel>> = None;
        for y in sw.y..=ne.y {
            let row = self.load_row(sw.x..=ne.x, y)?;
            dem = Some(match dem {
                None => row,
                Some(dem) => Box::new(dem.union(row)),
            });
        }
        // The loops run at least once.
        dem.ok_or(PanoramaError::InvalidParameter("max_distance"))
    }
}

/// Private API.
impl Tiles {
    fn load_row(
        &self,
        xs: RangeInclusive<i16>,
        y: i16,
    ) -> Result<Box<dyn DiscreteElevationModel>, PanoramaError> {
        let mut row: Option<Box<dyn DiscreteElevationModel>> = None;
        for x in xs {
            let tile = self.load(Coord { x, y })?;
            row = Some(match row {
                None => Box::new(tile) as Box<dyn DiscreteElevationModel>,
                Some(row) => Box::new(row.union(tile)),
            });
        }
        row.ok_or(PanoramaError::InvalidParameter("max_distance"))
    }

    fn tile_path(&self, sw_corner: Coord<i16>) -> PathBuf {
        let file_name = file_name(sw_corner);
        let tile_path = self.tile_dir.join(&file_name);
        if tile_path.exists() {
            tile_path
        } else {
            self.tile_dir.join(file_name.to_lowercase())
        }
    }
}

/// Southwest and northeast corners, in degrees, of the smallest box
/// containing every point within `max_distance` of `center`.
fn bounding_box(center: GeoPoint, max_distance: f64) -> (Coord<f64>, Coord<f64>) {
    let angle = to_radians(max_distance).to_degrees();
    let lat = center.latitude().to_degrees();
    let lon = center.longitude().to_degrees();

    let south = (lat - angle).max(-90.0);
    let north = (lat + angle).min(90.0);
    let widest = south.abs().max(north.abs()).to_radians().cos();
    let (west, east) = if widest * 180.0 > angle {
        (
            (lon - angle / widest).max(-180.0),
            (lon + angle / widest).min(180.0),
        )
    } else {
        (-180.0, 180.0)
    };
    // Tiles are named after their southwest corner, so the northern
    // and eastern edges of the world belong to the previous tile.
    let nudge = |v: f64, edge: f64| if v >= edge { edge - 1.0 } else { v };
    (
        Coord {
            x: nudge(west, 180.0),
            y: nudge(south, 90.0),
        },
        Coord {
            x: nudge(east, 180.0),
            y: nudge(north, 90.0),
        },
    )
}

/// Returns the southwest corner as integers for coord.
fn sw_corner(Coord { x, y }: Coord<f64>) -> Coord<i16> {
    #[allow(clippy::cast_possible_truncation)]
    Coord {
        x: (x.floor() as i16),
        y: (y.floor() as i16),
    }
}

/// Returns the expected file name for the tile at `sw_corner`.
pub fn file_name(Coord { x, y }: Coord<i16>) -> String {
    let n_s = if y.is_negative() { 'S' } else { 'N' };
    let e_w = if x.is_negative() { 'W' } else { 'E' };
    format!("{n_s}{:02}{e_w}{:03}.hgt", y.unsigned_abs(), x.unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::{bounding_box, file_name, sw_corner, Coord, Tiles};
    use crate::{dem::DiscreteElevationModel, math::GeoPoint, PanoramaError};
    use hgt::{FILE_LEN, SIDE};
    use std::{fs, path::Path};

    fn write_tile(dir: &Path, name: &str, northwest_sample: i16) {
        let mut data = vec![0_u8; FILE_LEN as usize];
        data[0..2].copy_from_slice(&northwest_sample.to_be_bytes());
        fs::write(dir.join(name), data).unwrap();
    }

    #[test]
    fn test_file_name() {
        let name = file_name(sw_corner(Coord {
            y: 0.0 + f64::EPSILON,
            x: 0.0 + f64::EPSILON,
        }));
        assert_eq!(name, "N00E000.hgt");

        let name = file_name(sw_corner(Coord {
            y: 0.0 + f64::EPSILON,
            x: 0.0 - f64::EPSILON,
        }));
        assert_eq!(name, "N00W001.hgt");

        let name = file_name(sw_corner(Coord {
            y: 0.0 - f64::EPSILON,
            x: 0.0 - f64::EPSILON,
        }));
        assert_eq!(name, "S01W001.hgt");

        let name = file_name(sw_corner(Coord { y: 46.5, x: 7.5 }));
        assert_eq!(name, "N46E007.hgt");
    }

    #[test]
    fn test_empty_dir_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README"), "no tiles here").unwrap();
        assert!(matches!(
            Tiles::new(dir.path().to_path_buf()),
            Err(PanoramaError::Path(_))
        ));
    }

    #[test]
    fn test_bounding_box() {
        let center = GeoPoint::from_degrees(7.5, 46.5).unwrap();
        let (sw, ne) = bounding_box(center, 10_000.0);
        assert_eq!(sw_corner(sw), Coord { x: 7, y: 46 });
        assert_eq!(sw_corner(ne), Coord { x: 7, y: 46 });

        // 100 km reaches into every neighbor.
        let (sw, ne) = bounding_box(center, 100_000.0);
        assert_eq!(sw_corner(sw), Coord { x: 6, y: 45 });
        assert_eq!(sw_corner(ne), Coord { x: 8, y: 47 });

        // Near a pole the box spans every longitude.
        let pole = GeoPoint::from_degrees(0.0, 89.9).unwrap();
        let (sw, ne) = bounding_box(pole, 100_000.0);
        assert_eq!((sw.x, ne.x), (-180.0, 179.0));
        assert_eq!(sw_corner(ne).y, 89);
    }

    #[test]
    fn test_around() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), "N46E007.hgt", 4_000);
        // Lowercase names are found too.
        write_tile(dir.path(), "n46e008.hgt", 3_000);
        let tiles = Tiles::new(dir.path().to_path_buf()).unwrap();

        let center = GeoPoint::from_degrees(7.9, 46.1).unwrap();
        let dem = tiles.around(center, 20_000.0).unwrap();
        let extent = dem.extent();
        assert_eq!(extent.ix().included_from(), 7 * 3600);
        assert_eq!(extent.ix().included_to(), 9 * 3600);
        assert_eq!(extent.iy().included_from(), 45 * 3600);
        assert_eq!(extent.iy().included_to(), 47 * 3600);

        // Northwest corners of both tiles, then a tombstone.
        assert_eq!(dem.elevation_sample(7 * 3600, 47 * 3600).unwrap(), 4_000.0);
        assert_eq!(dem.elevation_sample(8 * 3600 + 1, 47 * 3600).unwrap(), 0.0);
        assert_eq!(dem.elevation_sample(7 * 3600 + 5, 45 * 3600 + 5).unwrap(), 0.0);

        let tile = tiles.load(Coord { x: 8, y: 46 }).unwrap();
        assert!(!tile.tile().is_tombstone());
        assert_eq!(tile.elevation_sample(8 * 3600, 47 * 3600).unwrap(), 3_000.0);
        assert_eq!(tile.tile().len(), SIDE * SIDE);
    }

    #[test]
    fn test_around_two_by_two() {
        let dir = tempfile::tempdir().unwrap();
        for (name, elevation) in [
            ("N45E007.hgt", 1_u8),
            ("N45E008.hgt", 2),
            ("N46E007.hgt", 3),
            ("N46E008.hgt", 4),
        ] {
            let data: Vec<u8> = [0, elevation].repeat(SIDE * SIDE);
            fs::write(dir.path().join(name), data).unwrap();
        }
        let tiles = Tiles::new(dir.path().to_path_buf()).unwrap();
        let dem = tiles
            .around(GeoPoint::from_degrees(7.9, 46.1).unwrap(), 20_000.0)
            .unwrap();

        // Centers of each tile.
        for (x, y, expected) in [(7, 45, 1.0), (8, 45, 2.0), (7, 46, 3.0), (8, 46, 4.0)] {
            assert_eq!(
                dem.elevation_sample(x * 3600 + 1800, y * 3600 + 1800).unwrap(),
                expected
            );
        }
    }

    #[test]
    fn test_release_after_around() {
        let dir = tempfile::tempdir().unwrap();
        write_tile(dir.path(), "N46E007.hgt", 4_000);
        let tiles = Tiles::new(dir.path().to_path_buf()).unwrap();
        let mut dem = tiles
            .around(GeoPoint::from_degrees(7.5, 46.5).unwrap(), 1_000.0)
            .unwrap();
        dem.release();
        assert!(matches!(
            dem.elevation_sample(7 * 3600, 47 * 3600),
            Err(PanoramaError::Released)
        ));
    }
}
