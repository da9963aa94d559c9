//! Trapezoidal rule for numerical integration.
//!
//! The trapezoidal rule approximates the integral by summing trapezoid areas.
//! It has O(h²) accuracy for smooth functions and is exact for
//! piecewise-linear data.

use crate::error::{IntegrateError, IntegrateResult};

/// Sample positions: explicit abscissae or a uniform spacing.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Spacing<'a> {
    Uniform(f64),
    Points(&'a [f64]),
}

impl Spacing<'_> {
    /// Check the sample layout shared by all sampled-data rules.
    pub fn new<'a>(
        y: &[f64],
        x: Option<&'a [f64]>,
        dx: f64,
        context: &str,
    ) -> IntegrateResult<Spacing<'a>> {
        let spacing = match x {
            Some(x) => {
                if x.len() != y.len() {
                    return Err(IntegrateError::InvalidInput {
                        context: format!(
                            "{}: x and y must have same length (got {} and {})",
                            context,
                            x.len(),
                            y.len()
                        ),
                    });
                }
                Spacing::Points(x)
            }
            None => {
                if !dx.is_finite() || dx <= 0.0 {
                    return Err(IntegrateError::invalid_parameter(
                        "dx",
                        format!("{}: spacing must be finite and positive, got {}", context, dx),
                    ));
                }
                Spacing::Uniform(dx)
            }
        };

        if y.len() < 2 {
            return Err(IntegrateError::InvalidInput {
                context: format!("{}: need at least 2 points", context),
            });
        }

        Ok(spacing)
    }

    /// Width of the interval `[i, i + 1]`.
    #[inline]
    pub fn width(&self, i: usize) -> f64 {
        match self {
            Self::Uniform(dx) => *dx,
            Self::Points(x) => x[i + 1] - x[i],
        }
    }
}

/// Integrate using the composite trapezoidal rule.
///
/// Computes the definite integral of sampled `y` values. When `x` is given
/// the samples may be non-uniformly spaced and `dx` is ignored; otherwise the
/// samples are taken to be `dx` apart.
///
/// # Errors
///
/// Returns an error if:
/// - `x` and `y` have different lengths
/// - there are fewer than 2 points
/// - `x` is absent and `dx` is not finite and positive
///
/// # Example
///
/// ```
/// use numint::trapezoid;
///
/// // Integrate y = x^2 from 0 to 1 using 101 points
/// let n = 101;
/// let x: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
/// let y: Vec<f64> = x.iter().map(|&xi| xi * xi).collect();
///
/// let result = trapezoid(&y, Some(&x), 1.0).unwrap();
/// assert!((result - 1.0 / 3.0).abs() < 0.001);
///
/// // Same samples, uniform spacing
/// let result = trapezoid(&y, None, 0.01).unwrap();
/// assert!((result - 1.0 / 3.0).abs() < 0.001);
/// ```
pub fn trapezoid(y: &[f64], x: Option<&[f64]>, dx: f64) -> IntegrateResult<f64> {
    let spacing = Spacing::new(y, x, dx, "trapezoid")?;
    Ok(trapezoid_range(y, spacing, 0, y.len() - 1))
}

/// Trapezoid sum over the intervals `start..end`.
pub(crate) fn trapezoid_range(y: &[f64], spacing: Spacing<'_>, start: usize, end: usize) -> f64 {
    let mut integral = 0.0;
    for i in start..end {
        integral += 0.5 * spacing.width(i) * (y[i] + y[i + 1]);
    }
    integral
}

/// Cumulative integral using the trapezoidal rule.
///
/// Returns a vector of the same length as `y` whose `i`-th entry is the
/// integral from the first sample to sample `i`. The first entry is 0 and
/// the last equals [`trapezoid`] over the same samples.
///
/// # Example
///
/// ```
/// use numint::cumulative_trapezoid;
///
/// let y = [0.0, 1.0, 2.0, 3.0];
/// let running = cumulative_trapezoid(&y, None, 1.0).unwrap();
/// assert_eq!(running, vec![0.0, 0.5, 2.0, 4.5]);
/// ```
pub fn cumulative_trapezoid(y: &[f64], x: Option<&[f64]>, dx: f64) -> IntegrateResult<Vec<f64>> {
    let spacing = Spacing::new(y, x, dx, "cumulative_trapezoid")?;

    let mut running = Vec::with_capacity(y.len());
    let mut total = 0.0;
    running.push(total);
    for i in 0..y.len() - 1 {
        total += 0.5 * spacing.width(i) * (y[i] + y[i + 1]);
        running.push(total);
    }

    Ok(running)
}
