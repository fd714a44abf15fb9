//! Azimuths: angles measured clockwise from north, in radians.

use std::f64::consts::{FRAC_PI_4, TAU};

/// Returns `true` if `azimuth` lies in [0, 2π).
pub fn is_canonical(azimuth: f64) -> bool {
    (0.0..TAU).contains(&azimuth)
}

/// Maps any angle onto the equivalent azimuth in [0, 2π).
pub fn canonicalize(azimuth: f64) -> f64 {
    let a = azimuth.rem_euclid(TAU);
    // rem_euclid can round up to exactly 2π for tiny negative inputs.
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Converts a canonical azimuth to the same direction measured
/// counter-clockwise from north.
pub fn to_math(azimuth: f64) -> f64 {
    debug_assert!(is_canonical(azimuth));
    canonicalize(TAU - azimuth)
}

/// Inverse of [`to_math`].
pub fn from_math(angle: f64) -> f64 {
    debug_assert!(is_canonical(angle));
    canonicalize(TAU - angle)
}

/// Names the closest of the eight compass octants, built from the
/// given cardinal point names (e.g. `"N"`, `"E"`, `"S"`, `"W"`).
pub fn to_octant_string(azimuth: f64, n: &str, e: &str, s: &str, w: &str) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let octant = (canonicalize(azimuth) / FRAC_PI_4).round() as usize % 8;
    match octant {
        0 => n.to_owned(),
        1 => format!("{n}{e}"),
        2 => e.to_owned(),
        3 => format!("{s}{e}"),
        4 => s.to_owned(),
        5 => format!("{s}{w}"),
        6 => w.to_owned(),
        _ => format!("{n}{w}"),
    }
}
