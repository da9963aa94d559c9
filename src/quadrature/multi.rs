//! Iterated adaptive quadrature over two- and three-dimensional regions.
//!
//! The region is described from the outside in: constant limits for the
//! outermost variable `x`, then limits for `y` that may depend on `x`, then
//! limits for `z` that may depend on `(x, y)`. Every level is integrated by
//! [`quad`] with the same options.

use std::cell::Cell;

use super::adaptive::{QuadOptions, QuadResult, quad};
use crate::callback::Evaluation;
use crate::error::IntegrateResult;

/// Totals gathered from the inner integrations.
#[derive(Debug)]
struct InnerStats {
    neval: Cell<usize>,
    converged: Cell<bool>,
}

impl InnerStats {
    fn new() -> Self {
        Self {
            neval: Cell::new(0),
            converged: Cell::new(true),
        }
    }

    fn record(&self, result: &QuadResult<f64>) -> f64 {
        self.neval.set(self.neval.get() + result.neval);
        self.converged.set(self.converged.get() && result.converged);
        result.integral
    }

    fn finish(self, outer: QuadResult<f64>) -> QuadResult<f64> {
        QuadResult {
            integral: outer.integral,
            error: outer.error,
            neval: self.neval.get(),
            converged: outer.converged && self.converged.get(),
        }
    }
}

/// Compute a double integral.
///
/// Evaluates `∫_a^b ∫_{gfun(x)}^{hfun(x)} f(y, x) dy dx`.
///
/// The reported `error` is the estimate of the outer integration only;
/// `neval` counts every call of `f`, and `converged` is true only when the
/// outer and every inner integration converged.
///
/// # Example
///
/// ```
/// use numint::{dblquad, QuadOptions};
///
/// // Area of the triangle 0 <= y <= x <= 1
/// let result = dblquad(|_y, _x| 1.0, 0.0, 1.0, |_x| 0.0, |x| x, &QuadOptions::default()).unwrap();
/// assert!((result.integral - 0.5).abs() < 1e-10);
/// ```
pub fn dblquad<F, R, G, H>(
    f: F,
    a: f64,
    b: f64,
    gfun: G,
    hfun: H,
    options: &QuadOptions,
) -> IntegrateResult<QuadResult<f64>>
where
    F: Fn(f64, f64) -> R,
    R: Evaluation<f64>,
    G: Fn(f64) -> f64,
    H: Fn(f64) -> f64,
{
    let stats = InnerStats::new();

    let outer = quad(
        |x: f64| -> IntegrateResult<f64> {
            let inner = quad(|y: f64| f(y, x), gfun(x), hfun(x), options)?;
            Ok(stats.record(&inner))
        },
        a,
        b,
        options,
    )?;

    Ok(stats.finish(outer))
}

/// Compute a triple integral.
///
/// Evaluates
/// `∫_a^b ∫_{gfun(x)}^{hfun(x)} ∫_{qfun(x, y)}^{rfun(x, y)} f(z, y, x) dz dy dx`.
///
/// Error, evaluation count and convergence are reported as for [`dblquad`].
///
/// # Example
///
/// ```
/// use numint::{tplquad, QuadOptions};
///
/// // Volume of the unit cube
/// let result = tplquad(
///     |_z, _y, _x| 1.0,
///     0.0,
///     1.0,
///     |_x| 0.0,
///     |_x| 1.0,
///     |_x, _y| 0.0,
///     |_x, _y| 1.0,
///     &QuadOptions::default(),
/// )
/// .unwrap();
/// assert!((result.integral - 1.0).abs() < 1e-10);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn tplquad<F, R, G, H, Q, S>(
    f: F,
    a: f64,
    b: f64,
    gfun: G,
    hfun: H,
    qfun: Q,
    rfun: S,
    options: &QuadOptions,
) -> IntegrateResult<QuadResult<f64>>
where
    F: Fn(f64, f64, f64) -> R,
    R: Evaluation<f64>,
    G: Fn(f64) -> f64,
    H: Fn(f64) -> f64,
    Q: Fn(f64, f64) -> f64,
    S: Fn(f64, f64) -> f64,
{
    let stats = InnerStats::new();

    let outer = quad(
        |x: f64| -> IntegrateResult<f64> {
            let middle = quad(
                |y: f64| -> IntegrateResult<f64> {
                    let inner = quad(|z: f64| f(z, y, x), qfun(x, y), rfun(x, y), options)?;
                    Ok(stats.record(&inner))
                },
                gfun(x),
                hfun(x),
                options,
            )?;
            stats.converged.set(stats.converged.get() && middle.converged);
            Ok(middle.integral)
        },
        a,
        b,
        options,
    )?;

    Ok(stats.finish(outer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntegrateError;
    use std::f64::consts::PI;

    #[test]
    fn test_dblquad_unit_square() {
        let result = dblquad(
            |_y, _x| 1.0,
            0.0,
            1.0,
            |_x| 0.0,
            |_x| 1.0,
            &QuadOptions::default(),
        )
        .unwrap();
        assert!((result.integral - 1.0).abs() < 1e-10);
        assert!(result.converged);
        // One 15-point inner rule per outer node
        assert_eq!(result.neval, 15 * 15);
    }

    #[test]
    fn test_dblquad_variable_limits() {
        // ∫_0^1 ∫_0^x x*y dy dx = ∫_0^1 x^3/2 dx = 1/8
        let result = dblquad(
            |y, x| x * y,
            0.0,
            1.0,
            |_x| 0.0,
            |x| x,
            &QuadOptions::default(),
        )
        .unwrap();
        assert!((result.integral - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_dblquad_disk_area() {
        let result = dblquad(
            |_y, _x| 1.0,
            -1.0,
            1.0,
            |x| -(1.0 - x * x).sqrt(),
            |x| (1.0 - x * x).sqrt(),
            &QuadOptions::with_tolerances(1e-10, 1e-10).limit(200),
        )
        .unwrap();
        assert!((result.integral - PI).abs() < 1e-7);
    }

    #[test]
    fn test_tplquad_unit_cube() {
        let result = tplquad(
            |z, y, x| x + y + z,
            0.0,
            1.0,
            |_x| 0.0,
            |_x| 1.0,
            |_x, _y| 0.0,
            |_x, _y| 1.0,
            &QuadOptions::default(),
        )
        .unwrap();
        assert!((result.integral - 1.5).abs() < 1e-10);
        assert_eq!(result.neval, 15 * 15 * 15);
    }

    #[test]
    fn test_tplquad_tetrahedron() {
        // Volume of x, y, z >= 0, x + y + z <= 1 is 1/6
        let result = tplquad(
            |_z, _y, _x| 1.0,
            0.0,
            1.0,
            |_x| 0.0,
            |x| 1.0 - x,
            |_x, _y| 0.0,
            |x, y| 1.0 - x - y,
            &QuadOptions::default(),
        )
        .unwrap();
        assert!((result.integral - 1.0 / 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_inner_errors_propagate() {
        let result = dblquad(
            |y: f64, _x: f64| {
                if y > 0.5 {
                    Err(IntegrateError::callback("outside model"))
                } else {
                    Ok(y)
                }
            },
            0.0,
            1.0,
            |_x| 0.0,
            |_x| 1.0,
            &QuadOptions::default(),
        );
        assert!(matches!(result, Err(IntegrateError::Callback(_))));

        let result = dblquad(
            |y, _x| y,
            0.0,
            1.0,
            |_x| f64::NAN,
            |_x| 1.0,
            &QuadOptions::default(),
        );
        assert!(matches!(result, Err(IntegrateError::InvalidInterval { .. })));
    }
}
