//! Romberg integration.
//!
//! Trapezoidal estimates at successively halved step sizes are combined by
//! Richardson extrapolation:
//!
//! ```text
//! R(k, m) = (4^m R(k, m-1) - R(k-1, m-1)) / (4^m - 1)
//! ```

use log::warn;

use super::adaptive::QuadResult;
use crate::callback::Evaluation;
use crate::error::{IntegrateError, IntegrateResult, check_tolerances};

/// Levels beyond this would need more than 2^30 intervals.
const MAX_LEVELS_CAP: usize = 30;

/// Options for Romberg integration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RombergOptions {
    /// Relative tolerance (default: 1e-8)
    pub rtol: f64,
    /// Absolute tolerance (default: 1e-8)
    pub atol: f64,
    /// Maximum number of extrapolation levels (default: 20)
    pub max_levels: usize,
}

impl Default for RombergOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-8,
            max_levels: 20,
        }
    }
}

impl RombergOptions {
    /// Create options with specified tolerances.
    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Default::default()
        }
    }

    /// Set the maximum number of levels.
    pub fn max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }
}

/// Romberg integration using Richardson extrapolation.
///
/// Applies Richardson extrapolation to the trapezoidal rule to achieve
/// high accuracy for smooth functions. Convergence is declared when the
/// diagonal of the table moves by less than `atol + rtol * |R(k, k)|`.
/// When `max_levels` is reached first, the last diagonal entry is returned
/// with `converged == false` and its last change as the error.
///
/// # Arguments
///
/// * `f` - Function to integrate
/// * `a` - Lower bound (finite)
/// * `b` - Upper bound (finite)
/// * `options` - Integration options
///
/// # Example
///
/// ```
/// use numint::{romberg, RombergOptions};
///
/// // Integrate exp(x) from 0 to 1 = e - 1
/// let result = romberg(|x: f64| x.exp(), 0.0, 1.0, &RombergOptions::default()).unwrap();
/// let exact = std::f64::consts::E - 1.0;
/// assert!((result.integral - exact).abs() < 1e-10);
/// ```
pub fn romberg<F, R>(
    f: F,
    a: f64,
    b: f64,
    options: &RombergOptions,
) -> IntegrateResult<QuadResult<f64>>
where
    F: Fn(f64) -> R,
    R: Evaluation<f64>,
{
    if !a.is_finite() || !b.is_finite() {
        return Err(IntegrateError::InvalidInterval {
            a,
            b,
            context: "romberg (bounds must be finite)".to_string(),
        });
    }

    if options.max_levels == 0 {
        return Err(IntegrateError::invalid_parameter(
            "max_levels",
            "must be at least 1",
        ));
    }
    check_tolerances(options.rtol, options.atol)?;

    if a == b {
        return Ok(QuadResult {
            integral: 0.0,
            error: 0.0,
            neval: 0,
            converged: true,
        });
    }

    let f = |x: f64| f(x).into_value();
    let max_levels = options.max_levels.min(MAX_LEVELS_CAP);
    let h = b - a;

    // Only the current and previous rows of the table are kept
    let mut r_prev = vec![0.0; max_levels];
    let mut r_curr = vec![0.0; max_levels];

    r_prev[0] = 0.5 * h * (f(a)? + f(b)?);
    let mut neval = 2;
    let mut last_change = r_prev[0].abs();

    for k in 1..max_levels {
        let n: u64 = 1 << k;
        let h_k = h / n as f64;

        // Midpoints of the previous level's intervals
        let new_points = 1u64 << (k - 1);
        let mut sum = 0.0;
        for i in 0..new_points {
            sum += f(a + (2 * i + 1) as f64 * h_k)?;
        }
        neval += new_points as usize;

        r_curr[0] = 0.5 * r_prev[0] + h_k * sum;

        let mut factor = 1.0;
        for m in 1..=k {
            factor *= 4.0;
            r_curr[m] = (factor * r_curr[m - 1] - r_prev[m - 1]) / (factor - 1.0);
        }

        last_change = (r_curr[k] - r_prev[k - 1]).abs();
        let tolerance = options.atol + options.rtol * r_curr[k].abs();
        if last_change <= tolerance {
            return Ok(QuadResult {
                integral: r_curr[k],
                error: last_change,
                neval,
                converged: true,
            });
        }

        std::mem::swap(&mut r_prev, &mut r_curr);
    }

    let k = max_levels - 1;
    warn!(
        "romberg: no convergence after {} levels (last change {:.2e})",
        max_levels, last_change
    );

    Ok(QuadResult {
        integral: r_prev[k],
        error: last_change,
        neval,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_romberg_polynomial() {
        let result = romberg(|x: f64| x.powi(4), 0.0, 1.0, &RombergOptions::default()).unwrap();
        assert!(
            (result.integral - 0.2).abs() < 1e-10,
            "integral = {}, expected 0.2",
            result.integral
        );
        assert!(result.converged);
    }

    #[test]
    fn test_romberg_trig() {
        let result = romberg(|x: f64| x.sin(), 0.0, PI, &RombergOptions::default()).unwrap();
        assert!((result.integral - 2.0).abs() < 1e-8);
        assert!(result.converged);
        // 2^k + 1 points at level k
        assert!((result.neval - 1).is_power_of_two());
    }

    #[test]
    fn test_romberg_reversed() {
        let result = romberg(|x: f64| x.exp(), 1.0, 0.0, &RombergOptions::default()).unwrap();
        assert!((result.integral + (std::f64::consts::E - 1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_romberg_not_converged() {
        // sqrt has an unbounded derivative at 0, three levels are not enough
        let options = RombergOptions::with_tolerances(1e-14, 1e-14).max_levels(3);
        let result = romberg(|x: f64| x.sqrt(), 0.0, 1.0, &options).unwrap();
        assert!(!result.converged);
        assert!(result.error > 0.0);
        assert_eq!(result.neval, 5);
        assert!((result.integral - 2.0 / 3.0).abs() < 2e-2);
    }

    #[test]
    fn test_romberg_errors() {
        let opts = RombergOptions::default();
        assert!(romberg(|x: f64| x, 0.0, f64::INFINITY, &opts).is_err());
        assert!(romberg(|x: f64| x, 0.0, 1.0, &opts.clone().max_levels(0)).is_err());

        let result = romberg(
            |_x: f64| Err::<f64, _>(IntegrateError::callback("boom")),
            0.0,
            1.0,
            &opts,
        );
        assert!(matches!(result, Err(IntegrateError::Callback(_))));
    }
}
