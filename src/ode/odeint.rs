//! Integration of an ODE system over a caller-supplied time grid.
//!
//! The derivative takes the state first, `f(y, t)`. The grid may increase or
//! decrease but must be strictly monotonic. By default every grid interval is
//! crossed with a fixed number of classic RK4 substeps; with
//! [`OdeintOptions::adaptive`] the grid is walked by the Dormand-Prince
//! solver and the solution is interpolated at the grid points.
//!
//! Unlike [`solve_ivp`](crate::solve_ivp), any step failure is an `Err`.

use log::debug;

use super::rk::tableau::RK4;
use super::rk::{Rhs, run};
use super::types::{ODEMethod, ODEOptions};
use crate::callback::Evaluation;
use crate::error::{IntegrateError, IntegrateResult, check_tolerances};

/// Options for [`odeint`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OdeintOptions {
    /// Minimum number of RK4 substeps per grid interval (default: 4)
    pub substeps: usize,
    /// Largest allowed step magnitude (default: unbounded)
    pub hmax: Option<f64>,
    /// Use the adaptive Dormand-Prince solver (default: false)
    pub adaptive: bool,
    /// Relative tolerance of the adaptive solver (default: 1.49012e-8)
    pub rtol: f64,
    /// Absolute tolerance of the adaptive solver (default: 1.49012e-8)
    pub atol: f64,
    /// Step limit of the adaptive solver over the whole grid (default: 10000)
    pub max_steps: usize,
    /// Attach diagnostics to the result (default: false)
    pub full_output: bool,
}

impl Default for OdeintOptions {
    fn default() -> Self {
        Self {
            substeps: 4,
            hmax: None,
            adaptive: false,
            rtol: 1.49012e-8,
            atol: 1.49012e-8,
            max_steps: 10000,
            full_output: false,
        }
    }
}

impl OdeintOptions {
    /// Adaptive integration with the given tolerances.
    pub fn with_tolerances(rtol: f64, atol: f64) -> Self {
        Self {
            adaptive: true,
            rtol,
            atol,
            ..Default::default()
        }
    }

    /// Set the minimum number of substeps per grid interval.
    pub fn substeps(mut self, n: usize) -> Self {
        self.substeps = n;
        self
    }

    /// Set the largest allowed step magnitude.
    pub fn hmax(mut self, hmax: f64) -> Self {
        self.hmax = Some(hmax);
        self
    }

    /// Switch between fixed RK4 substeps and the adaptive solver.
    pub fn adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Set the step limit of the adaptive solver.
    pub fn max_steps(mut self, n: usize) -> Self {
        self.max_steps = n;
        self
    }

    /// Request diagnostics.
    pub fn full_output(mut self, full_output: bool) -> Self {
        self.full_output = full_output;
        self
    }
}

/// Diagnostics returned when `full_output` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct OdeintInfo {
    /// Number of derivative evaluations.
    pub nfe: usize,
    /// Number of (sub)steps taken.
    pub nst: usize,
    /// `hu[i]` is the magnitude of the last step used to reach grid point `i + 1`.
    pub hu: Vec<f64>,
    /// Termination message.
    pub message: String,
}

/// Result of [`odeint`].
#[derive(Debug, Clone)]
pub struct OdeintResult {
    /// State at each grid point; `y[0]` is the initial condition.
    pub y: Vec<Vec<f64>>,
    /// Diagnostics, present when `full_output` was requested.
    pub info: Option<OdeintInfo>,
}

/// Integrate `dy/dt = f(y, t)` and report the state at every point of `t`.
///
/// # Example
///
/// ```
/// use numint::{odeint, OdeintOptions};
///
/// let grid: Vec<f64> = (0..=10).map(|i| i as f64 * 0.1).collect();
/// let options = OdeintOptions::default();
/// let result = odeint(|y: &[f64], _t| vec![-y[0]], &[1.0], &grid, &options).unwrap();
///
/// assert_eq!(result.y[0], vec![1.0]);
/// assert!((result.y[10][0] - (-1.0_f64).exp()).abs() < 1e-8);
/// ```
pub fn odeint<F, R>(
    f: F,
    y0: &[f64],
    t: &[f64],
    options: &OdeintOptions,
) -> IntegrateResult<OdeintResult>
where
    F: Fn(&[f64], f64) -> R,
    R: Evaluation<Vec<f64>>,
{
    odeint_with_args(|y, t, _: &()| f(y, t), y0, t, &(), options)
}

/// [`odeint`] with extra arguments forwarded to the derivative.
pub fn odeint_with_args<F, A, R>(
    f: F,
    y0: &[f64],
    t: &[f64],
    args: &A,
    options: &OdeintOptions,
) -> IntegrateResult<OdeintResult>
where
    A: ?Sized,
    F: Fn(&[f64], f64, &A) -> R,
    R: Evaluation<Vec<f64>>,
{
    validate(y0, t, options)?;

    let mut rhs = Rhs::new(|s: f64, y: &[f64], a: &A| f(y, s, a), args, y0.len());

    if t.len() == 1 {
        let info = options.full_output.then(|| OdeintInfo {
            nfe: 0,
            nst: 0,
            hu: Vec::new(),
            message: "Integration successful.".to_string(),
        });
        return Ok(OdeintResult {
            y: vec![y0.to_vec()],
            info,
        });
    }

    let outcome = if options.adaptive {
        walk_adaptive(&mut rhs, y0, t, options)
    } else {
        walk_fixed(&mut rhs, y0, t, options)
    };

    let (y, nst, hu) = match outcome {
        Ok(walk) => walk,
        Err(err) => {
            debug!("odeint: {}", err);
            return Err(err);
        }
    };

    let info = options.full_output.then(|| OdeintInfo {
        nfe: rhs.nfev(),
        nst,
        hu,
        message: "Integration successful.".to_string(),
    });

    Ok(OdeintResult { y, info })
}

type Walk = (Vec<Vec<f64>>, usize, Vec<f64>);

/// Cross every grid interval with classic RK4 substeps.
fn walk_fixed<F, A, R>(
    rhs: &mut Rhs<'_, F, A>,
    y0: &[f64],
    t: &[f64],
    options: &OdeintOptions,
) -> IntegrateResult<Walk>
where
    A: ?Sized,
    F: Fn(f64, &[f64], &A) -> R,
    R: Evaluation<Vec<f64>>,
{
    let mut rows = Vec::with_capacity(t.len());
    let mut hu = Vec::with_capacity(t.len() - 1);
    let mut nst = 0;

    let mut y = y0.to_vec();
    let mut f = rhs.eval(t[0], &y)?;
    check_finite(&f, t[0])?;
    rows.push(y.clone());

    for w in t.windows(2) {
        let (start, end) = (w[0], w[1]);
        let dt = end - start;

        let mut m = options.substeps;
        if let Some(hmax) = options.hmax {
            m = m.max((dt.abs() / hmax).ceil() as usize);
        }
        let h = dt / m as f64;

        let mut last = h;
        for k in 0..m {
            let s = start + k as f64 * h;
            // The last substep lands exactly on the grid point
            let h_k = if k + 1 == m { end - s } else { h };

            let step = RK4.step(|s, v| rhs.eval(s, v), s, &y, &f, h_k)?;
            check_finite(&step.y_new, s + h_k)?;
            check_finite(&step.f_new, s + h_k)?;

            y = step.y_new;
            f = step.f_new;
            last = h_k;
            nst += 1;
        }

        hu.push(last.abs());
        rows.push(y.clone());
    }

    Ok((rows, nst, hu))
}

/// Walk the grid with the adaptive Dormand-Prince solver.
fn walk_adaptive<F, A, R>(
    rhs: &mut Rhs<'_, F, A>,
    y0: &[f64],
    t: &[f64],
    options: &OdeintOptions,
) -> IntegrateResult<Walk>
where
    A: ?Sized,
    F: Fn(f64, &[f64], &A) -> R,
    R: Evaluation<Vec<f64>>,
{
    let mut ode_options = ODEOptions::with_method(ODEMethod::RK45)
        .tolerances(options.rtol, options.atol)
        .t_eval(t.to_vec())
        .max_steps(options.max_steps)
        .dense_output(options.full_output);
    ode_options.max_step = options.hmax;

    let t_span = [t[0], t[t.len() - 1]];
    let (result, failure) = run(rhs, t_span, y0, &ode_options)?;
    if let Some(err) = failure {
        return Err(err);
    }

    let mut hu = Vec::new();
    if let Some(sol) = &result.sol {
        for &p in &t[1..] {
            hu.push(sol.step_at(p)?.h().abs());
        }
    }

    Ok((result.y, result.naccept, hu))
}

fn check_finite(values: &[f64], t: f64) -> IntegrateResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(IntegrateError::NumericalError {
            message: format!("odeint: non-finite state or derivative at t = {}", t),
        })
    }
}

fn validate(y0: &[f64], t: &[f64], options: &OdeintOptions) -> IntegrateResult<()> {
    if y0.is_empty() {
        return Err(IntegrateError::invalid_input(
            "odeint: initial condition cannot be empty",
        ));
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(IntegrateError::invalid_input(
            "odeint: initial condition must be finite",
        ));
    }

    if t.is_empty() {
        return Err(IntegrateError::invalid_input("odeint: time grid is empty"));
    }
    if let Some(i) = t.iter().position(|v| !v.is_finite()) {
        return Err(IntegrateError::invalid_input(format!(
            "odeint: t[{}] = {} is not finite",
            i, t[i]
        )));
    }
    if t.len() > 1 {
        let direction = (t[1] - t[0]).signum();
        let monotonic = t.windows(2).all(|w| direction * (w[1] - w[0]) > 0.0);
        if !monotonic {
            return Err(IntegrateError::invalid_input(
                "odeint: time grid must be strictly monotonic",
            ));
        }
    }

    if options.max_steps == 0 {
        return Err(IntegrateError::invalid_parameter(
            "max_steps",
            "must be at least 1",
        ));
    }
    if options.substeps == 0 {
        return Err(IntegrateError::invalid_parameter(
            "substeps",
            "must be at least 1",
        ));
    }
    if let Some(hmax) = options.hmax {
        if hmax.is_nan() || hmax <= 0.0 {
            return Err(IntegrateError::invalid_parameter(
                "hmax",
                format!("must be positive (got {})", hmax),
            ));
        }
    }
    check_tolerances(options.rtol, options.atol)
}
