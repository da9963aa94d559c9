//! Numerical integration and ODE solvers.
//!
//! # Quadrature
//!
//! - [`quad`], [`quad_complex`], [`quad_scalar`] - Adaptive Gauss-Kronrod
//!   quadrature over finite or infinite intervals
//! - [`dblquad`], [`tplquad`] - Iterated adaptive quadrature in 2 and 3 dimensions
//! - [`fixed_quad`] / [`GaussLegendreQuadrature`] - Fixed-order Gauss-Legendre
//! - [`romberg`] - Romberg integration via Richardson extrapolation
//! - [`trapezoid`], [`cumulative_trapezoid`], [`simpson`] - Rules for sampled data
//!
//! # ODE Solvers
//!
//! - [`solve_ivp`] - Initial value problems with RK23, RK45 (default) or fixed-step RK4,
//!   optional output times and dense output
//! - [`odeint`] - Integration over a caller-supplied time grid
//!
//! # Callbacks
//!
//! Integrands and derivatives may return a plain value or a `Result`; an
//! `Err` aborts the integration and is returned to the caller (see
//! [`Evaluation`] and [`IntegrateError::callback`]).
//!
//! # Example
//!
//! ```
//! use numint::{quad, QuadOptions};
//!
//! let result = quad(|x: f64| (-x * x).exp(), f64::NEG_INFINITY, f64::INFINITY, &QuadOptions::default())
//!     .unwrap();
//! assert!((result.integral - std::f64::consts::PI.sqrt()).abs() < 1e-8);
//! ```

pub mod callback;
pub mod error;
pub mod ode;
pub mod quadrature;

pub use callback::{Evaluation, Scalar};
pub use error::{CallbackError, IntegrateError, IntegrateResult};

pub use quadrature::{
    EvenSamples, GaussLegendreQuadrature, QuadOptions, QuadResult, RombergOptions,
    cumulative_trapezoid, dblquad, fixed_quad, quad, quad_complex, quad_scalar, romberg, simpson,
    simpson_with, tplquad, trapezoid,
};

pub use ode::{
    DenseOutputStep, DenseSolution, ODEMethod, ODEOptions, ODEResult, OdeintInfo, OdeintOptions,
    OdeintResult, StepSizeController, odeint, odeint_with_args, solve_ivp, solve_ivp_with_args,
};
