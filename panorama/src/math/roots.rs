//! Root bracketing and refinement for the ray-to-ground function.

use crate::PanoramaError;
use std::convert::Infallible;

/// Scans `[min_x, max_x]` in steps of `dx` and returns the lower bound
/// of the first step over which `f` changes sign (or touches zero).
///
/// Returns `None` when no such step exists before `max_x`; a root
/// closer than `dx` to `max_x` may therefore be missed. A step that
/// isn't positive finds nothing.
pub fn first_interval_containing_root<F>(f: F, min_x: f64, max_x: f64, dx: f64) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    match try_first_interval_containing_root(|x| Ok::<_, Infallible>(f(x)), min_x, max_x, dx) {
        Ok(found) => found,
        Err(never) => match never {},
    }
}

/// Fallible version of [`first_interval_containing_root`]; the first
/// error returned by `f` aborts the scan.
pub fn try_first_interval_containing_root<F, E>(
    f: F,
    min_x: f64,
    max_x: f64,
    dx: f64,
) -> Result<Option<f64>, E>
where
    F: Fn(f64) -> Result<f64, E>,
{
    if dx.is_nan() || dx <= 0.0 {
        return Ok(None);
    }
    let mut step = 0_u64;
    let mut x0 = min_x;
    let mut f0 = f(x0)?;
    loop {
        step += 1;
        #[allow(clippy::cast_precision_loss)]
        let x1 = min_x + step as f64 * dx;
        if x1 > max_x {
            return Ok(None);
        }
        let f1 = f(x1)?;
        if f0 * f1 <= 0.0 {
            return Ok(Some(x0));
        }
        x0 = x1;
        f0 = f1;
    }
}

/// Narrows `[x1, x2]`, over which `f` must change sign, by bisection
/// until it is at most `epsilon` wide, or can't be split any further,
/// and returns its lower bound.
pub fn improve_root<F>(f: F, x1: f64, x2: f64, epsilon: f64) -> Result<f64, PanoramaError>
where
    F: Fn(f64) -> f64,
{
    try_improve_root(|x| Ok(f(x)), x1, x2, epsilon)
}

/// Fallible version of [`improve_root`].
pub fn try_improve_root<F, E>(f: F, mut x1: f64, mut x2: f64, epsilon: f64) -> Result<f64, E>
where
    F: Fn(f64) -> Result<f64, E>,
    E: From<PanoramaError>,
{
    if epsilon.is_nan() || epsilon <= 0.0 || x2 < x1 {
        return Err(PanoramaError::InvalidParameter("root bracket").into());
    }
    let mut f1 = f(x1)?;
    if f1 * f(x2)? > 0.0 {
        return Err(PanoramaError::NoRoot(x1, x2).into());
    }
    while x2 - x1 > epsilon {
        let mid = (x1 + x2) / 2.0;
        if mid <= x1 || mid >= x2 {
            break;
        }
        let f_mid = f(mid)?;
        if f_mid * f1 > 0.0 {
            x1 = mid;
            f1 = f_mid;
        } else {
            x2 = mid;
        }
    }
    Ok(x1)
}
