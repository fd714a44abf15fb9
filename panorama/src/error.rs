use hgt::HgtError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanoramaError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("invalid parameter '{0}'")]
    InvalidParameter(&'static str),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("no height files in {0}")]
    Path(PathBuf),

    #[error("{0}")]
    Hgt(#[from] HgtError),

    #[error("sample ({0}, {1}) is outside of the elevation model")]
    SampleOutOfRange(i32, i32),

    #[error("point ({0}, {1}) is outside of the elevation model")]
    PointOutOfRange(f64, f64),

    #[error("distance {0} m is outside of the profile")]
    DistanceOutOfRange(f64),

    #[error("pixel ({0}, {1}) is outside of the panorama")]
    PixelOutOfRange(i64, i64),

    #[error("no sign change in [{0}, {1}]")]
    NoRoot(f64, f64),

    #[error("elevation model has been released")]
    Released,

    #[error("panorama builder is already finalized")]
    Finalized,

    #[error("computation cancelled")]
    Cancelled,
}
