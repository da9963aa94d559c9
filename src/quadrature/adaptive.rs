//! Adaptive Gauss-Kronrod quadrature.
//!
//! Each segment is integrated with the G7-K15 pair: the Kronrod value is the
//! estimate and `|K - G|` its error. Segments live on an explicit work-list;
//! the one with the largest error is bisected until the summed error meets
//! the tolerance or the subdivision budget runs out.

use std::ops::{Add, Mul, Sub};

use log::{trace, warn};
use num_complex::Complex64;

use super::transform::{Bounds, Domain};
use crate::callback::{Evaluation, Scalar};
use crate::error::{IntegrateError, IntegrateResult, check_tolerances};

/// Segments are not bisected past this depth.
const MAX_DEPTH: usize = 64;

/// Options for adaptive quadrature.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuadOptions {
    /// Relative tolerance (default: 1e-8)
    pub rtol: f64,
    /// Absolute tolerance (default: 1e-8)
    pub atol: f64,
    /// Maximum number of subdivisions (default: 50)
    pub limit: usize,
}

impl Default for QuadOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-8,
            limit: 50,
        }
    }
}

impl QuadOptions {
    /// Create options with specified tolerances.
    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            ..Default::default()
        }
    }

    /// Set the subdivision limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn validate(&self) -> IntegrateResult<()> {
        if self.limit == 0 {
            return Err(IntegrateError::invalid_parameter(
                "limit",
                "must be at least 1",
            ));
        }
        check_tolerances(self.rtol, self.atol)
    }
}

/// Result of a quadrature.
#[derive(Debug, Clone)]
pub struct QuadResult<T = f64> {
    /// Computed integral value
    pub integral: T,
    /// Estimated absolute error
    pub error: f64,
    /// Number of function evaluations
    pub neval: usize,
    /// Whether integration converged
    pub converged: bool,
}

impl<T> QuadResult<T> {
    fn zero_measure(integral: T) -> Self {
        Self {
            integral,
            error: 0.0,
            neval: 0,
            converged: true,
        }
    }
}

/// Values the adaptive integrator can accumulate.
pub(crate) trait QuadValue:
    Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self>
{
    fn zero() -> Self;
    fn magnitude(self) -> f64;
    fn finite(self) -> bool;
}

impl QuadValue for f64 {
    fn zero() -> Self {
        0.0
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn finite(self) -> bool {
        self.is_finite()
    }
}

impl QuadValue for Complex64 {
    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }

    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

/// Adaptive Gauss-Kronrod quadrature of a real integrand.
///
/// Uses the G7-K15 rule (7-point Gauss, 15-point Kronrod) with adaptive
/// interval subdivision to achieve the requested tolerance. Either bound may
/// be infinite; `a > b` yields the negated integral and `a == b` yields zero.
///
/// The integrand may return `f64` or `Result<f64, E>`; an `Err` aborts the
/// integration and is returned unchanged.
///
/// # Arguments
///
/// * `f` - Function to integrate
/// * `a` - Lower bound
/// * `b` - Upper bound
/// * `options` - Quadrature options
///
/// # Returns
///
/// A [`QuadResult`] containing the integral, error estimate, and diagnostics.
/// Exhausting the subdivision limit is not an error: the best estimate is
/// returned with `converged == false`.
///
/// # Example
///
/// ```
/// use numint::{quad, QuadOptions};
///
/// // Integrate sin(x) from 0 to pi
/// let result = quad(|x: f64| x.sin(), 0.0, std::f64::consts::PI, &QuadOptions::default()).unwrap();
/// assert!((result.integral - 2.0).abs() < 1e-10);
/// assert!(result.converged);
///
/// // Semi-infinite range
/// let result = quad(|x: f64| (-x).exp(), 0.0, f64::INFINITY, &QuadOptions::default()).unwrap();
/// assert!((result.integral - 1.0).abs() < 1e-8);
/// ```
pub fn quad<F, R>(f: F, a: f64, b: f64, options: &QuadOptions) -> IntegrateResult<QuadResult<f64>>
where
    F: Fn(f64) -> R,
    R: Evaluation<f64>,
{
    options.validate()?;
    let Some(bounds) = Bounds::new(a, b, "quad")? else {
        return Ok(QuadResult::zero_measure(0.0));
    };
    integrate(|x| f(x).into_value(), bounds, options, "quad")
}

/// Adaptive quadrature of a complex-valued integrand.
///
/// Real and imaginary parts are integrated on one shared subdivision tree;
/// the error of a segment is the modulus of the complex Gauss-Kronrod
/// difference.
///
/// # Example
///
/// ```
/// use num_complex::Complex64;
/// use numint::{quad_complex, QuadOptions};
///
/// // Integral of e^{ix} over [0, pi] = 2i
/// let result = quad_complex(
///     |x: f64| Complex64::new(x.cos(), x.sin()),
///     0.0,
///     std::f64::consts::PI,
///     &QuadOptions::default(),
/// )
/// .unwrap();
/// assert!(result.integral.re.abs() < 1e-8);
/// assert!((result.integral.im - 2.0).abs() < 1e-8);
/// ```
pub fn quad_complex<F, R>(
    f: F,
    a: f64,
    b: f64,
    options: &QuadOptions,
) -> IntegrateResult<QuadResult<Complex64>>
where
    F: Fn(f64) -> R,
    R: Evaluation<Complex64>,
{
    options.validate()?;
    let Some(bounds) = Bounds::new(a, b, "quad_complex")? else {
        return Ok(QuadResult::zero_measure(Complex64::new(0.0, 0.0)));
    };
    integrate(|x| f(x).into_value(), bounds, options, "quad_complex")
}

/// Adaptive quadrature of an integrand whose real/complex shape is decided
/// at runtime.
///
/// The integrand is evaluated once at a point inside the domain. The shape
/// of that value commits the integration to the real or the complex path for
/// the rest of the call. After committing to complex, real values are
/// promoted; after committing to real, a complex value is an
/// [`IntegrateError::InconsistentIntegrand`]. The probe counts towards
/// `neval`.
///
/// # Example
///
/// ```
/// use num_complex::Complex64;
/// use numint::{quad_scalar, QuadOptions, Scalar};
///
/// let real = quad_scalar(|x: f64| Scalar::Real(x * x), 0.0, 1.0, &QuadOptions::default()).unwrap();
/// assert!(!real.integral.is_complex());
///
/// let complex = quad_scalar(
///     |x: f64| Scalar::Complex(Complex64::new(0.0, x)),
///     0.0,
///     2.0,
///     &QuadOptions::default(),
/// )
/// .unwrap();
/// assert!((complex.integral.im() - 2.0).abs() < 1e-12);
/// ```
pub fn quad_scalar<F, R>(
    f: F,
    a: f64,
    b: f64,
    options: &QuadOptions,
) -> IntegrateResult<QuadResult<Scalar>>
where
    F: Fn(f64) -> R,
    R: Evaluation<Scalar>,
{
    options.validate()?;
    let Some(bounds) = Bounds::new(a, b, "quad_scalar")? else {
        return Ok(QuadResult::zero_measure(Scalar::Real(0.0)));
    };

    let probe = f(bounds.domain.probe_point()).into_value()?;
    if probe.is_complex() {
        let result = integrate(
            |x| f(x).into_value().map(|v| v.to_complex()),
            bounds,
            options,
            "quad_scalar",
        )?;
        Ok(QuadResult {
            integral: Scalar::Complex(result.integral),
            error: result.error,
            neval: result.neval + 1,
            converged: result.converged,
        })
    } else {
        let result = integrate(
            |x| match f(x).into_value()? {
                Scalar::Real(v) => Ok(v),
                Scalar::Complex(_) => Err(IntegrateError::InconsistentIntegrand {
                    context: format!("quad_scalar at x = {}", x),
                }),
            },
            bounds,
            options,
            "quad_scalar",
        )?;
        Ok(QuadResult {
            integral: Scalar::Real(result.integral),
            error: result.error,
            neval: result.neval + 1,
            converged: result.converged,
        })
    }
}

/// Work-list entry.
#[derive(Debug, Clone, Copy)]
struct Segment<V> {
    a: f64,
    b: f64,
    integral: V,
    error: f64,
    depth: usize,
}

impl<V> Segment<V> {
    fn splittable(&self) -> bool {
        let mid = 0.5 * (self.a + self.b);
        self.depth < MAX_DEPTH && mid > self.a && mid < self.b
    }
}

/// Core adaptive loop over the (possibly transformed) domain.
pub(crate) fn integrate<V, G>(
    g: G,
    bounds: Bounds,
    options: &QuadOptions,
    context: &str,
) -> IntegrateResult<QuadResult<V>>
where
    V: QuadValue,
    G: Fn(f64) -> IntegrateResult<V>,
{
    let domain = bounds.domain;
    let h = |t: f64| -> IntegrateResult<V> {
        match domain {
            Domain::Finite { .. } => g(t),
            _ => {
                let (x, jacobian) = domain.map(t);
                Ok(g(x)? * jacobian)
            }
        }
    };

    let (a, b) = domain.reference();
    let (integral, error) = gauss_kronrod_15(&h, a, b)?;
    let mut neval = 15;
    let mut segments = vec![Segment {
        a,
        b,
        integral,
        error,
        depth: 0,
    }];
    let mut subdivisions = 0;

    let (total_integral, total_error) = loop {
        let (total_integral, total_error) = totals(&segments);

        let tolerance = options.atol + options.rtol * total_integral.magnitude();
        if total_error <= tolerance {
            return Ok(QuadResult {
                integral: total_integral * bounds.sign,
                error: total_error,
                neval,
                converged: true,
            });
        }

        if subdivisions >= options.limit {
            break (total_integral, total_error);
        }

        // Bisect the splittable segment with the largest error
        let Some(max_idx) = segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.splittable())
            .max_by(|x, y| x.1.error.total_cmp(&y.1.error))
            .map(|(i, _)| i)
        else {
            break (total_integral, total_error);
        };

        let seg = segments.swap_remove(max_idx);
        let mid = 0.5 * (seg.a + seg.b);
        trace!(
            "{}: bisecting [{:.6e}, {:.6e}] at depth {} (error {:.2e})",
            context, seg.a, seg.b, seg.depth, seg.error
        );

        let (int1, err1) = gauss_kronrod_15(&h, seg.a, mid)?;
        let (int2, err2) = gauss_kronrod_15(&h, mid, seg.b)?;
        neval += 30;

        segments.push(Segment {
            a: seg.a,
            b: mid,
            integral: int1,
            error: err1,
            depth: seg.depth + 1,
        });
        segments.push(Segment {
            a: mid,
            b: seg.b,
            integral: int2,
            error: err2,
            depth: seg.depth + 1,
        });

        subdivisions += 1;
    };

    warn!(
        "{}: no convergence after {} subdivisions (error estimate {:.2e})",
        context, subdivisions, total_error
    );

    Ok(QuadResult {
        integral: total_integral * bounds.sign,
        error: total_error,
        neval,
        converged: false,
    })
}

fn totals<V: QuadValue>(segments: &[Segment<V>]) -> (V, f64) {
    segments
        .iter()
        .fold((V::zero(), 0.0), |(integral, error), s| {
            (integral + s.integral, error + s.error)
        })
}

// Kronrod nodes on [0, 1] (the rule is symmetric); odd indices are the
// 7-point Gauss nodes.
const XGK: [f64; 8] = [
    0.9914553711208126,
    0.9491079123427585,
    0.8648644233597691,
    0.7415311855993945,
    0.5860872354676911,
    0.4058451513773972,
    0.20778495500789848,
    0.0,
];

// Kronrod weights matching XGK.
const WGK: [f64; 8] = [
    0.022935322010529224,
    0.06309209262997856,
    0.10479001032225019,
    0.14065325971552592,
    0.1690047266392679,
    0.19035057806478542,
    0.20443294007529889,
    0.20948214108472782,
];

// Gauss weights for XGK[1], XGK[3], XGK[5] and the center node.
const WG: [f64; 4] = [
    0.1294849661688697,
    0.27970539148927664,
    0.3818300505051189,
    0.4179591836734694,
];

/// Gauss-Kronrod 15-point rule (G7-K15) on `[a, b]`.
///
/// Returns (integral, error). A non-finite sample contributes nothing to the
/// value and makes the error infinite so the segment gets bisected.
fn gauss_kronrod_15<V, H>(h: &H, a: f64, b: f64) -> IntegrateResult<(V, f64)>
where
    V: QuadValue,
    H: Fn(f64) -> IntegrateResult<V>,
{
    let center = 0.5 * (a + b);
    let half_width = 0.5 * (b - a);
    let mut singular = false;

    let mut sample = |x: f64| -> IntegrateResult<V> {
        let v = h(x)?;
        if v.finite() {
            Ok(v)
        } else {
            singular = true;
            Ok(V::zero())
        }
    };

    let f_center = sample(center)?;
    let mut result_kronrod = f_center * WGK[7];
    let mut result_gauss = f_center * WG[3];

    for j in 0..7 {
        let dx = half_width * XGK[j];
        let f1 = sample(center - dx)?;
        let f2 = sample(center + dx)?;
        let pair = f1 + f2;
        result_kronrod = result_kronrod + pair * WGK[j];
        if j % 2 == 1 {
            result_gauss = result_gauss + pair * WG[j / 2];
        }
    }

    let integral = result_kronrod * half_width;
    let error = if singular {
        f64::INFINITY
    } else {
        ((result_kronrod - result_gauss) * half_width).magnitude()
    };

    Ok((integral, error))
}
