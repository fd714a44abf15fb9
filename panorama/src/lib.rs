//! # Terrain Panoramas
//!
//! `panorama` computes what an observer standing anywhere on a
//! spherical Earth would see: for every pixel of a panorama, the
//! distance, position, elevation and slope of the terrain the
//! corresponding ray hits first.

mod computer;
pub mod dem;
mod error;
pub mod math;
mod panorama;
mod parameters;
mod profile;
pub mod tiles;

pub use {
    crate::{
        computer::{PanoramaComputer, PanoramaComputerBuilder},
        error::PanoramaError,
        panorama::{Panorama, PanoramaBuilder, PanoramaSample},
        parameters::{PanoramaParameters, MAX_SUPERSAMPLING_EXPONENT},
        profile::ElevationProfile,
        tiles::Tiles,
    },
    geo, hgt,
};
