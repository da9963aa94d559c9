//! Simpson's rule for numerical integration.
//!
//! Simpson's rule fits a parabola through each pair of intervals. It is
//! exact for quadratics on any grid and for cubics on uniform grids, with
//! O(h⁴) accuracy for smooth functions.

use super::trapezoid::{Spacing, trapezoid_range};
use crate::error::IntegrateResult;

/// Treatment of the final interval when the number of samples is even.
///
/// An even sample count leaves an odd number of intervals, so one interval
/// is not covered by the paired Simpson panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvenSamples {
    /// Integrate the quadratic through the last three samples over the
    /// final interval. Keeps the result exact for quadratics.
    #[default]
    Corrected,
    /// Use the trapezoidal rule on the final interval.
    Trapezoid,
}

/// Integrate using the composite Simpson's rule.
///
/// Equivalent to [`simpson_with`] using [`EvenSamples::Corrected`].
///
/// With an even number of samples the final interval is integrated with the
/// quadratic through the last three samples rather than the trapezoidal
/// rule, so the result stays exact for quadratics on any sample count. Pass
/// [`EvenSamples::Trapezoid`] to [`simpson_with`] for the plain trapezoidal
/// end interval.
///
/// # Arguments
///
/// * `y` - Function values at sample points
/// * `x` - Sample points, or `None` for uniform spacing
/// * `dx` - Spacing used when `x` is `None`
///
/// # Example
///
/// ```
/// use numint::simpson;
///
/// // Integrate y = x^2 from 0 to 1 (exact = 1/3)
/// let n = 11;
/// let x: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
/// let y: Vec<f64> = x.iter().map(|&xi| xi * xi).collect();
///
/// let result = simpson(&y, Some(&x), 1.0).unwrap();
/// assert!((result - 1.0 / 3.0).abs() < 1e-14);
/// ```
pub fn simpson(y: &[f64], x: Option<&[f64]>, dx: f64) -> IntegrateResult<f64> {
    simpson_with(y, x, dx, EvenSamples::default())
}

/// Integrate using the composite Simpson's rule with a chosen treatment of
/// an even sample count.
///
/// Panels use the three-point quadratic fit, so non-uniform spacing is
/// handled exactly for quadratics. Two samples fall back to a single
/// trapezoid.
///
/// # Example
///
/// ```
/// use numint::{simpson_with, EvenSamples};
///
/// let y = [0.0, 1.0, 4.0, 9.0]; // x^2 at x = 0, 1, 2, 3
/// let exact = simpson_with(&y, None, 1.0, EvenSamples::Corrected).unwrap();
/// assert!((exact - 9.0).abs() < 1e-14);
///
/// let rough = simpson_with(&y, None, 1.0, EvenSamples::Trapezoid).unwrap();
/// assert!((rough - 9.0).abs() > 1e-3);
/// ```
pub fn simpson_with(
    y: &[f64],
    x: Option<&[f64]>,
    dx: f64,
    even: EvenSamples,
) -> IntegrateResult<f64> {
    let spacing = Spacing::new(y, x, dx, "simpson")?;
    let n = y.len();

    if n == 2 {
        return Ok(trapezoid_range(y, spacing, 0, 1));
    }

    if n % 2 == 1 {
        return Ok(simpson_panels(y, spacing, n - 1));
    }

    // Odd prefix of n - 1 samples, then the last interval
    let mut integral = simpson_panels(y, spacing, n - 2);
    integral += match even {
        EvenSamples::Corrected => {
            let h0 = spacing.width(n - 3);
            let h1 = spacing.width(n - 2);
            let alpha = (2.0 * h1 * h1 + 3.0 * h0 * h1) / (6.0 * (h0 + h1));
            let beta = (h1 * h1 + 3.0 * h0 * h1) / (6.0 * h0);
            let eta = h1 * h1 * h1 / (6.0 * h0 * (h0 + h1));
            alpha * y[n - 1] + beta * y[n - 2] - eta * y[n - 3]
        }
        EvenSamples::Trapezoid => trapezoid_range(y, spacing, n - 2, n - 1),
    };

    Ok(integral)
}

/// Sum of Simpson panels over the intervals `0..intervals` (an even count).
fn simpson_panels(y: &[f64], spacing: Spacing<'_>, intervals: usize) -> f64 {
    let mut integral = 0.0;
    for i in (0..intervals).step_by(2) {
        let h0 = spacing.width(i);
        let h1 = spacing.width(i + 1);
        let h = h0 + h1;

        // Reduces to h/6 * (y0 + 4 y1 + y2) when h0 == h1
        integral += h / 6.0
            * ((2.0 - h1 / h0) * y[i] + h * h / (h0 * h1) * y[i + 1] + (2.0 - h0 / h1) * y[i + 2]);
    }
    integral
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_simpson_cubic_uniform() {
        // Exact for cubics on a uniform grid
        let x: Vec<f64> = (0..5).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&xi| xi * xi * xi - xi).collect();
        let result = simpson(&y, None, 0.5).unwrap();
        assert!((result - (4.0 - 2.0)).abs() < 1e-13);
    }

    #[test]
    fn test_simpson_quadratic_nonuniform() {
        let x = [0.0, 0.1, 0.5, 0.6, 1.3, 2.0, 2.2];
        let f = |t: f64| 3.0 * t * t - 2.0 * t + 1.0;
        let y: Vec<f64> = x.iter().map(|&t| f(t)).collect();
        let exact = 2.2f64.powi(3) - 2.2 * 2.2 + 2.2;

        let result = simpson(&y, Some(&x), 1.0).unwrap();
        assert!((result - exact).abs() < 1e-12, "got {}", result);
    }

    #[test]
    fn test_simpson_even_corrected_exact_for_quadratics() {
        let x = [0.0, 0.4, 1.0, 1.5, 2.5, 3.0];
        let y: Vec<f64> = x.iter().map(|&t| t * t).collect();
        let result = simpson_with(&y, Some(&x), 1.0, EvenSamples::Corrected).unwrap();
        assert!((result - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_simpson_even_trapezoid() {
        // Odd prefix is exact, final trapezoid over [2, 3] overshoots by 1/6
        let y = [0.0, 1.0, 4.0, 9.0];
        let result = simpson_with(&y, None, 1.0, EvenSamples::Trapezoid).unwrap();
        assert!((result - (9.0 + 1.0 / 6.0)).abs() < 1e-13);
    }

    #[test]
    fn test_simpson_two_points() {
        let result = simpson(&[1.0, 3.0], Some(&[0.0, 2.0]), 1.0).unwrap();
        assert!((result - 4.0).abs() < 1e-15);
    }

    #[test]
    fn test_simpson_sin() {
        let n = 101;
        let dx = PI / (n - 1) as f64;
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * dx).sin()).collect();
        let result = simpson(&y, None, dx).unwrap();
        assert!((result - 2.0).abs() < 1e-7);
    }

    #[test]
    fn test_simpson_errors() {
        assert!(simpson(&[1.0], None, 1.0).is_err());
        assert!(simpson(&[1.0, 2.0, 3.0], Some(&[0.0, 1.0]), 1.0).is_err());
        assert!(simpson(&[1.0, 2.0, 3.0], None, -0.1).is_err());
    }
}
