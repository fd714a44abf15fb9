use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand};
use geo::geometry::Coord;
use std::{path::PathBuf, str::FromStr};

/// Compute what an observer sees from a point on the terrain.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Directory containing `.hgt` elevation tiles.
    #[arg(short, long)]
    pub tile_dir: PathBuf,

    /// Observer "lat,lon", in degrees.
    #[arg(short, long)]
    pub observer: LatLon,

    /// Observer elevation, in meters.
    #[arg(short, long)]
    pub elevation: f64,

    /// Azimuth of the center of the view, in degrees clockwise from
    /// north.
    #[arg(short, long, default_value_t = 0.0)]
    pub azimuth: f64,

    /// Horizontal field of view, in degrees.
    #[arg(short, long, default_value_t = 60.0)]
    pub fov: f64,

    /// How far to look for terrain, in meters.
    #[arg(short, long, default_value_t = 100_000.0)]
    pub max_distance: f64,

    /// Panorama width, in pixels.
    #[arg(long, default_value_t = 300)]
    pub width: usize,

    /// Panorama height, in pixels.
    #[arg(long, default_value_t = 100)]
    pub height: usize,

    /// Compute 2^N times as many pixels along each axis (0 to 2).
    #[arg(short, long, default_value_t = 0)]
    pub supersampling: u32,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Debug, Copy)]
pub struct LatLon(pub Coord<f64>);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon pair"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        Ok(Self(Coord { y: lat, x: lon }))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print a short description of the view to stdout.
    Summary,

    /// Plot the skyline to terminal.
    Skyline,

    /// Print every pixel that hits terrain to stdout.
    Json,
}

#[cfg(test)]
mod tests {
    use super::LatLon;
    use std::str::FromStr;

    #[test]
    fn test_parse_lat_lon() {
        let LatLon(coord) = LatLon::from_str("46.2, -7.5").unwrap();
        assert_eq!((coord.y, coord.x), (46.2, -7.5));
        assert!(LatLon::from_str("46.2").is_err());
        assert!(LatLon::from_str("north,7").is_err());
    }
}
