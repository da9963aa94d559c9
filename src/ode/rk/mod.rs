//! Runge-Kutta ODE solvers.
//!
//! Implements RK23 (Bogacki-Shampine), RK45 (Dormand-Prince) and fixed-step
//! RK4 on one tableau-driven stepper.

pub(crate) mod tableau;

use log::{debug, trace};

use super::dense_output::{DenseOutputStep, DenseSolution};
use super::types::{ODEMethod, ODEOptions, ODEResult};
use crate::callback::Evaluation;
use crate::error::{IntegrateError, IntegrateResult, check_tolerances};
use tableau::Tableau;

/// Step size controller for adaptive methods.
#[derive(Debug, Clone)]
pub struct StepSizeController {
    /// Safety factor (default: 0.9)
    pub safety: f64,
    /// Minimum scale factor (default: 0.2)
    pub min_factor: f64,
    /// Maximum scale factor (default: 10.0)
    pub max_factor: f64,
}

impl Default for StepSizeController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 10.0,
        }
    }
}

impl StepSizeController {
    /// Compute the new step size based on error estimate.
    ///
    /// # Arguments
    /// * `h` - Current step size magnitude
    /// * `err` - Normalized error (should be <= 1 for step acceptance)
    /// * `order` - Order of the error estimator
    pub fn compute_step(&self, h: f64, err: f64, order: usize) -> (f64, bool) {
        let accept = err <= 1.0;

        // Compute scale factor
        let exponent = 1.0 / (order as f64 + 1.0);
        let factor = if err == 0.0 {
            self.max_factor
        } else if err.is_finite() {
            self.safety * (1.0 / err).powf(exponent)
        } else {
            self.min_factor
        };

        // Clamp factor
        let factor = factor.clamp(self.min_factor, self.max_factor);

        // Don't increase step size after rejection
        let factor = if accept { factor } else { factor.min(1.0) };

        (h * factor, accept)
    }
}

/// Derivative wrapper that counts evaluations and checks the output length.
pub(crate) struct Rhs<'a, F, A: ?Sized> {
    f: F,
    args: &'a A,
    dim: usize,
    nfev: usize,
}

impl<'a, F, A, R> Rhs<'a, F, A>
where
    A: ?Sized,
    F: Fn(f64, &[f64], &A) -> R,
    R: Evaluation<Vec<f64>>,
{
    pub fn new(f: F, args: &'a A, dim: usize) -> Self {
        Self {
            f,
            args,
            dim,
            nfev: 0,
        }
    }

    pub fn eval(&mut self, t: f64, y: &[f64]) -> IntegrateResult<Vec<f64>> {
        self.nfev += 1;
        let dy = (self.f)(t, y, self.args).into_value()?;
        if dy.len() != self.dim {
            return Err(IntegrateError::invalid_input(format!(
                "derivative returned {} values, expected {}",
                dy.len(),
                self.dim
            )));
        }
        Ok(dy)
    }

    pub fn nfev(&self) -> usize {
        self.nfev
    }
}

/// Solve an initial value problem.
///
/// Main entry point for ODE solving. Solves the system:
///   dy/dt = f(t, y)
///   y(t0) = y0
///
/// Integration runs backwards when `t_span[0] > t_span[1]`. The derivative
/// may return `Vec<f64>` or a `Result` whose error converts into
/// [`IntegrateError`].
///
/// # Arguments
///
/// * `f` - Right-hand side function f(t, y) -> dy/dt
/// * `t_span` - Integration interval [t0, tf]
/// * `y0` - Initial condition
/// * `options` - Solver options
///
/// # Returns
///
/// An [`ODEResult`] containing the solution trajectory and diagnostics.
/// Step failures (step size underflow, non-finite values, step limit) are
/// reported with `success == false` and the partial trajectory; invalid
/// input and callback errors are returned as `Err`.
///
/// # Example
///
/// ```
/// use numint::{solve_ivp, ODEOptions};
///
/// // Solve dy/dt = -y, y(0) = 1
/// // Exact solution: y(t) = exp(-t)
/// let result = solve_ivp(
///     |_t, y: &[f64]| vec![-y[0]],
///     [0.0, 5.0],
///     &[1.0],
///     &ODEOptions::default(),
/// ).unwrap();
///
/// let y_final = result.y.last().unwrap()[0];
/// let exact = (-5.0_f64).exp();
/// assert!((y_final - exact).abs() < 1e-4);
/// ```
pub fn solve_ivp<F, R>(
    f: F,
    t_span: [f64; 2],
    y0: &[f64],
    options: &ODEOptions,
) -> IntegrateResult<ODEResult>
where
    F: Fn(f64, &[f64]) -> R,
    R: Evaluation<Vec<f64>>,
{
    solve_ivp_with_args(|t, y, _: &()| f(t, y), t_span, y0, &(), options)
}

/// Solve an initial value problem with extra arguments forwarded to the
/// derivative.
///
/// # Example
///
/// ```
/// use numint::{solve_ivp_with_args, ODEOptions};
///
/// struct Decay {
///     rate: f64,
/// }
///
/// let result = solve_ivp_with_args(
///     |_t, y: &[f64], p: &Decay| vec![-p.rate * y[0]],
///     [0.0, 1.0],
///     &[1.0],
///     &Decay { rate: 2.0 },
///     &ODEOptions::with_tolerances(1e-8, 1e-10),
/// ).unwrap();
/// assert!((result.y_final().unwrap()[0] - (-2.0_f64).exp()).abs() < 1e-7);
/// ```
pub fn solve_ivp_with_args<F, A, R>(
    f: F,
    t_span: [f64; 2],
    y0: &[f64],
    args: &A,
    options: &ODEOptions,
) -> IntegrateResult<ODEResult>
where
    A: ?Sized,
    F: Fn(f64, &[f64], &A) -> R,
    R: Evaluation<Vec<f64>>,
{
    let mut rhs = Rhs::new(f, args, y0.len());
    let (result, failure) = run(&mut rhs, t_span, y0, options)?;
    if let Some(err) = failure {
        debug!("solve_ivp: {}", err);
    }
    Ok(result)
}

/// Drive the stepper from `t_span[0]` to `t_span[1]`.
///
/// Returns the result (with `success` and `message` filled in) and the
/// failure that ended the integration early, if any.
pub(crate) fn run<F, A, R>(
    rhs: &mut Rhs<'_, F, A>,
    t_span: [f64; 2],
    y0: &[f64],
    options: &ODEOptions,
) -> IntegrateResult<(ODEResult, Option<IntegrateError>)>
where
    A: ?Sized,
    F: Fn(f64, &[f64], &A) -> R,
    R: Evaluation<Vec<f64>>,
{
    validate(t_span, y0, options)?;

    let [t0, tf] = t_span;
    let tableau: &Tableau = match options.method {
        ODEMethod::RK23 => &tableau::RK23,
        ODEMethod::RK45 => &tableau::RK45,
        ODEMethod::RK4 => &tableau::RK4,
    };
    let adaptive = tableau.e.is_some();
    let context = format!("{:?}", options.method);

    let direction = if tf > t0 { 1.0 } else { -1.0 };
    let max_step = options.max_step.unwrap_or(f64::INFINITY);
    let user_min_step = options.min_step.unwrap_or(0.0);
    let controller = StepSizeController::default();

    let mut t = t0;
    let mut y = y0.to_vec();
    let mut f = rhs.eval(t, &y)?;
    let mut recorder = Recorder::new(options, t0, y0, direction);

    let mut naccept = 0;
    let mut nreject = 0;

    let failure = if !all_finite(&f) {
        Some(IntegrateError::NumericalError {
            message: format!("{}: non-finite derivative at t = {}", context, t),
        })
    } else {
        let mut h_abs = match options.h0 {
            Some(h0) => h0.abs(),
            None if !adaptive => (tf - t0).abs() / 100.0,
            None => compute_initial_step(
                |s, v| rhs.eval(s, v),
                t0,
                tf,
                &y,
                &f,
                tableau.error_order,
                options.rtol,
                options.atol,
            )?,
        };
        h_abs = h_abs.min(max_step);

        let mut step_rejected = false;
        loop {
            if t == tf {
                break None;
            }
            if naccept + nreject >= options.max_steps {
                break Some(IntegrateError::MaxStepsExceeded {
                    steps: options.max_steps,
                    t,
                    context,
                });
            }

            if adaptive {
                let min_step = user_min_step.max(10.0 * ulp_toward(t, direction));
                if h_abs < min_step {
                    if step_rejected {
                        break Some(IntegrateError::StepSizeTooSmall {
                            step: h_abs,
                            t,
                            context,
                        });
                    }
                    h_abs = min_step;
                }
                h_abs = h_abs.min(max_step);
            }

            // Fixed steps are placed by index so the grid does not drift
            let mut t_new = if adaptive {
                t + direction * h_abs
            } else {
                t0 + direction * h_abs * (naccept + 1) as f64
            };
            // Never overshoot the end point
            if direction * (t_new - tf) > 0.0
                || (tf - t_new).abs() <= 10.0 * f64::EPSILON * tf.abs().max(t_new.abs())
            {
                t_new = tf;
            }
            let h = t_new - t;

            let trial = tableau.step(|s, v| rhs.eval(s, v), t, &y, &f, h)?;

            if !all_finite(&trial.y_new) || !all_finite(&trial.f_new) {
                break Some(IntegrateError::NumericalError {
                    message: format!(
                        "{}: non-finite state or derivative in step from t = {} to {}",
                        context, t, t_new
                    ),
                });
            }

            let (h_next, accept) = match &trial.error {
                Some(y_err) => {
                    let err = compute_error(&trial.y_new, y_err, &y, options.rtol, options.atol);
                    controller.compute_step(h.abs(), err, tableau.error_order)
                }
                None => (h_abs, true),
            };

            if accept {
                recorder.record(t, &y, &f, t_new, &trial.y_new, &trial.f_new);
                t = t_new;
                y = trial.y_new;
                f = trial.f_new;
                naccept += 1;

                h_abs = if step_rejected {
                    h_next.min(h.abs())
                } else {
                    h_next
                };
                step_rejected = false;
            } else {
                trace!("{}: rejected step h = {:.3e} at t = {}", context, h, t);
                nreject += 1;
                step_rejected = true;
                h_abs = h_next;
            }
        }
    };

    let (t_out, y_out, sol) = recorder.finish();
    let result = ODEResult {
        t: t_out,
        y: y_out,
        success: failure.is_none(),
        message: failure.as_ref().map(ToString::to_string),
        nfev: rhs.nfev(),
        naccept,
        nreject,
        method: options.method,
        sol,
    };

    Ok((result, failure))
}

/// Check the interval, initial state, tolerances, step bounds and `t_eval`.
fn validate(t_span: [f64; 2], y0: &[f64], options: &ODEOptions) -> IntegrateResult<()> {
    let [t0, tf] = t_span;

    if !t0.is_finite() || !tf.is_finite() || t0 == tf {
        return Err(IntegrateError::InvalidInterval {
            a: t0,
            b: tf,
            context: "solve_ivp".to_string(),
        });
    }

    if y0.is_empty() {
        return Err(IntegrateError::invalid_input(
            "solve_ivp: initial condition cannot be empty",
        ));
    }
    if !all_finite(y0) {
        return Err(IntegrateError::invalid_input(
            "solve_ivp: initial condition must be finite",
        ));
    }

    check_tolerances(options.rtol, options.atol)?;

    if let Some(h0) = options.h0 {
        if !h0.is_finite() || h0 == 0.0 {
            return Err(IntegrateError::invalid_parameter(
                "h0",
                format!("must be finite and non-zero (got {})", h0),
            ));
        }
    }
    if let Some(max_step) = options.max_step {
        if max_step.is_nan() || max_step <= 0.0 {
            return Err(IntegrateError::invalid_parameter(
                "max_step",
                format!("must be positive (got {})", max_step),
            ));
        }
    }
    if let Some(min_step) = options.min_step {
        let max_step = options.max_step.unwrap_or(f64::INFINITY);
        if !min_step.is_finite() || min_step < 0.0 || min_step > max_step {
            return Err(IntegrateError::invalid_parameter(
                "min_step",
                format!("must be in [0, max_step] (got {})", min_step),
            ));
        }
    }
    if options.max_steps == 0 {
        return Err(IntegrateError::invalid_parameter(
            "max_steps",
            "must be at least 1",
        ));
    }

    if let Some(times) = &options.t_eval {
        let direction = if tf > t0 { 1.0 } else { -1.0 };
        for (i, &p) in times.iter().enumerate() {
            let inside = direction * (p - t0) >= 0.0 && direction * (tf - p) >= 0.0;
            if !inside {
                return Err(IntegrateError::invalid_input(format!(
                    "solve_ivp: t_eval[{}] = {} outside [{}, {}]",
                    i, p, t0, tf
                )));
            }
            if i > 0 && direction * (p - times[i - 1]) <= 0.0 {
                return Err(IntegrateError::invalid_input(format!(
                    "solve_ivp: t_eval must be strictly monotonic in the direction of integration (t_eval[{}] = {})",
                    i, p
                )));
            }
        }
    }

    Ok(())
}

/// Distance from `t` to the next representable value in `direction`.
/// Positive for every finite `t`, including zero.
fn ulp_toward(t: f64, direction: f64) -> f64 {
    let next = if direction > 0.0 {
        t.next_up()
    } else {
        t.next_down()
    };
    (next - t).abs()
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Collects output points and, when requested, the dense solution.
struct Recorder<'a> {
    t_eval: Option<&'a [f64]>,
    next: usize,
    direction: f64,
    t: Vec<f64>,
    y: Vec<Vec<f64>>,
    dense: Option<DenseSolution>,
}

impl<'a> Recorder<'a> {
    fn new(options: &'a ODEOptions, t0: f64, y0: &[f64], direction: f64) -> Self {
        let t_eval = options.t_eval.as_deref();
        let mut recorder = Self {
            t_eval,
            next: 0,
            direction,
            t: Vec::new(),
            y: Vec::new(),
            dense: options.dense_output.then(DenseSolution::default),
        };
        if t_eval.is_none() {
            recorder.t.push(t0);
            recorder.y.push(y0.to_vec());
        }
        recorder
    }

    fn record(
        &mut self,
        t_old: f64,
        y_old: &[f64],
        f_old: &[f64],
        t_new: f64,
        y_new: &[f64],
        f_new: &[f64],
    ) {
        let step = match (self.t_eval, self.dense.is_some()) {
            (None, false) => {
                self.t.push(t_new);
                self.y.push(y_new.to_vec());
                return;
            }
            _ => DenseOutputStep {
                t_old,
                t_new,
                y_old: y_old.to_vec(),
                y_new: y_new.to_vec(),
                f_old: f_old.to_vec(),
                f_new: f_new.to_vec(),
            },
        };

        match self.t_eval {
            None => {
                self.t.push(t_new);
                self.y.push(y_new.to_vec());
            }
            Some(times) => {
                while let Some(&p) = times.get(self.next) {
                    if self.direction * (p - t_new) > 0.0 {
                        break;
                    }
                    self.t.push(p);
                    self.y.push(step.eval(p));
                    self.next += 1;
                }
            }
        }

        if let Some(dense) = &mut self.dense {
            dense.push(step);
        }
    }

    fn finish(self) -> (Vec<f64>, Vec<Vec<f64>>, Option<DenseSolution>) {
        (self.t, self.y, self.dense)
    }
}

/// Compute initial step size using the algorithm from Hairer & Wanner.
///
/// Works in either direction: the trial Euler step is taken towards
/// `t_bound`. The returned magnitude never exceeds `|t_bound - t0|`.
#[allow(clippy::too_many_arguments)]
pub fn compute_initial_step<F>(
    mut f: F,
    t0: f64,
    t_bound: f64,
    y0: &[f64],
    f0: &[f64],
    order: usize,
    rtol: f64,
    atol: f64,
) -> IntegrateResult<f64>
where
    F: FnMut(f64, &[f64]) -> IntegrateResult<Vec<f64>>,
{
    let n = y0.len();
    let direction = if t_bound >= t0 { 1.0 } else { -1.0 };
    let interval = (t_bound - t0).abs();

    // Compute scaling
    let sc: Vec<f64> = y0.iter().map(|y| atol + rtol * y.abs()).collect();

    // d0 = ||y0 / sc||, d1 = ||f0 / sc||
    let d0 = rms(y0.iter().zip(&sc).map(|(y, s)| y / s), n);
    let d1 = rms(f0.iter().zip(&sc).map(|(f, s)| f / s), n);

    // First guess
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(interval);

    // Explicit Euler step to estimate second derivative
    let y1: Vec<f64> = y0
        .iter()
        .zip(f0)
        .map(|(y, f)| y + direction * h0 * f)
        .collect();
    let f1 = f(t0 + direction * h0, &y1)?;

    // d2 = ||f1 - f0|| / h0
    let d2 = rms(f1.iter().zip(f0).zip(&sc).map(|((f1, f0), s)| (f1 - f0) / s), n) / h0;

    let h1 = if d1.max(d2) <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order as f64 + 1.0))
    };

    Ok((100.0 * h0).min(h1).min(interval))
}

/// Root mean square of `n` values.
fn rms(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    values.map(|v| v * v).sum::<f64>().sqrt() / (n as f64).sqrt()
}

/// Compute normalized error.
pub fn compute_error(y_new: &[f64], y_err: &[f64], y_old: &[f64], rtol: f64, atol: f64) -> f64 {
    let n = y_new.len();
    let mut err_sum = 0.0;

    for i in 0..n {
        let sc = atol + rtol * y_old[i].abs().max(y_new[i].abs());
        err_sum += (y_err[i] / sc).powi(2);
    }

    (err_sum / n as f64).sqrt()
}
