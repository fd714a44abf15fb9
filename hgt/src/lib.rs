//! SRTM 1 arc-second elevation (`.hgt`) file format.
//!
//! A tile covers one square degree. Its samples form a
//! [`SIDE`]×[`SIDE`] grid of big-endian `i16` meters, stored row
//! major from the northern edge to the southern edge, and west to
//! east within a row. Neighboring tiles share their edge rows and
//! columns.
//!
//! # References
//!
//! 1. [30-Meter SRTM Tile Downloader](https://dwtkns.com/srtm30m)
//! 1. [Archive Team](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;

pub use crate::error::HgtError;
use byteorder::{BigEndian as BE, ByteOrder};
use geo::geometry::Coord;
use log::debug;
use memmap2::Mmap;
use std::{fs::File, mem::size_of, path::Path};

/// Number of sample intervals spanning one degree of latitude or
/// longitude.
pub const SAMPLES_PER_DEGREE: usize = 3600;

/// Number of samples along each side of a tile.
pub const SIDE: usize = SAMPLES_PER_DEGREE + 1;

/// Exact byte length of a valid tile file.
pub const FILE_LEN: u64 = (SIDE * SIDE * size_of::<i16>()) as u64;

pub struct Tile {
    /// Southwest corner of the tile, in whole degrees.
    sw_corner: Coord<i16>,

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    /// Stand-in for a tile missing on disk; every sample is sea level.
    Tombstone,
    MemMap(Mmap),
    Released,
}

impl SampleStore {
    fn get(&self, index: usize) -> Result<i16, HgtError> {
        match self {
            Self::Tombstone => Ok(0),
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                Ok(BE::read_i16(&raw[start..start + size_of::<i16>()]))
            }
            Self::Released => Err(HgtError::Released),
        }
    }
}

impl Tile {
    /// Returns a Tile using the memory-mapped file at `path` as
    /// storage.
    ///
    /// The file name must be of the form `N46E007.hgt` and the file
    /// must be exactly [`FILE_LEN`] bytes long.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, HgtError> {
        let sw_corner = parse_sw_corner(&path)?;
        check_len(&path)?;

        let samples = {
            let file = File::open(&path)?;
            // SAFETY: tiles are treated as immutable once written.
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        debug!("mapped {:?}, sw corner {:?}", path.as_ref(), sw_corner);

        Ok(Self { sw_corner, samples })
    }

    /// Returns a tile which reads 0 m everywhere.
    pub fn tombstone(sw_corner: Coord<i16>) -> Self {
        Self {
            sw_corner,
            samples: SampleStore::Tombstone,
        }
    }

    /// Southwest corner of this tile in whole degrees (`x` is
    /// longitude, `y` latitude).
    pub fn sw_corner(&self) -> Coord<i16> {
        self.sw_corner
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        SIDE * SIDE
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self.samples, SampleStore::Tombstone)
    }

    /// Returns the sample at column `x` (counting eastward from the
    /// western edge) and row `y` (counting northward from the
    /// southern edge).
    pub fn get_xy(&self, (x, y): (usize, usize)) -> Result<i16, HgtError> {
        if x >= SIDE || y >= SIDE {
            return Err(HgtError::OutOfBounds(x, y));
        }
        self.samples.get(xy_to_linear_index((x, y)))
    }

    /// Unmaps the underlying file.
    ///
    /// Every subsequent read fails with [`HgtError::Released`].
    pub fn release(&mut self) {
        if !self.is_released() {
            debug!("releasing tile {:?}", self.sw_corner);
        }
        self.samples = SampleStore::Released;
    }

    pub fn is_released(&self) -> bool {
        matches!(self.samples, SampleStore::Released)
    }
}

/// Storage row 0 is the northern edge.
fn xy_to_linear_index((x, y): (usize, usize)) -> usize {
    SIDE * (SIDE - 1 - y) + x
}

fn check_len<P: AsRef<Path>>(path: P) -> Result<(), HgtError> {
    match path.as_ref().metadata().map(|m| m.len())? {
        FILE_LEN => Ok(()),
        invalid_len => Err(HgtError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, HgtError> {
    let mk_err = || HgtError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_name()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 11 || !name.is_ascii() || !name[7..].eq_ignore_ascii_case(".hgt") {
        return Err(mk_err());
    }
    let parse_field = |field: &str| -> Result<i16, HgtError> {
        if field.bytes().all(|b| b.is_ascii_digit()) {
            field.parse::<i16>().map_err(|_| mk_err())
        } else {
            Err(mk_err())
        }
    };
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * parse_field(&name[1..3])?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * parse_field(&name[4..7])?;
    if !(-90..90).contains(&lat) || !(-180..180).contains(&lon) {
        return Err(mk_err());
    }
    Ok(Coord { x: lon, y: lat })
}
