//! Geometry primitives and small numeric routines shared by the
//! elevation models and the panorama computer.

pub mod azimuth;
mod geo_point;
mod interval;
mod roots;

pub use self::{
    geo_point::GeoPoint,
    interval::{Interval1D, Interval2D},
    roots::{
        first_interval_containing_root, improve_root, try_first_interval_containing_root,
        try_improve_root,
    },
};
use num_traits::Float;
use std::f64::consts::{PI, TAU};

/// Mean radius of the spherical Earth model, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Converts a distance on the Earth's surface to the angle it spans.
pub fn to_radians(meters: f64) -> f64 {
    meters / EARTH_RADIUS
}

/// Converts an angle at the Earth's center to the surface distance it
/// spans.
pub fn to_meters(radians: f64) -> f64 {
    radians * EARTH_RADIUS
}

pub fn sq<T: Float>(x: T) -> T {
    x * x
}

/// Linear interpolation between `y0` (at 0) and `y1` (at 1).
pub fn lerp<T: Float>(y0: T, y1: T, x: T) -> T {
    y0 + (y1 - y0) * x
}

/// Bilinear interpolation over the unit square, where `zXY` is the
/// value at corner `(X, Y)`.
pub fn bilerp<T: Float>(z00: T, z10: T, z01: T, z11: T, x: T, y: T) -> T {
    lerp(lerp(z00, z10, x), lerp(z01, z11, x), y)
}

/// Returns the signed shortest angle from `a1` to `a2`, in (−π, π].
pub fn angular_distance(a1: f64, a2: f64) -> f64 {
    let d = (a2 - a1).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}
