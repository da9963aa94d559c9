//! Ordinary differential equation (ODE) solvers.
//!
//! This module provides methods for solving initial value problems (IVPs)
//! of the form dy/dt = f(t, y), y(t0) = y0.
//!
//! # Available Methods
//!
//! | Method | Order | Type | Best For |
//! |--------|-------|------|----------|
//! | RK23 | 3(2) | Explicit, adaptive | Low accuracy, fast |
//! | RK45 | 5(4) | Explicit, adaptive | General purpose (default) |
//! | RK4 | 4 | Explicit, fixed step | Uniform grids |
//!
//! # Usage
//!
//! Use [`solve_ivp`] as the main entry point. [`odeint`] integrates over a
//! caller-supplied grid with the derivative written as `f(y, t)`.
//!
//! ```
//! use numint::{solve_ivp, ODEMethod, ODEOptions};
//!
//! // Solve dy/dt = -y, y(0) = 1
//! let result = solve_ivp(
//!     |_t, y: &[f64]| vec![-y[0]],  // RHS function
//!     [0.0, 5.0],                   // time span
//!     &[1.0],                       // initial condition
//!     &ODEOptions::with_method(ODEMethod::RK45),
//! ).unwrap();
//!
//! // y(5) ≈ exp(-5) ≈ 0.00674
//! assert!((result.y.last().unwrap()[0] - (-5.0_f64).exp()).abs() < 1e-4);
//! ```

mod dense_output;
mod odeint;
mod rk;
mod types;

pub use dense_output::{DenseOutputStep, DenseSolution};
pub use odeint::{OdeintInfo, OdeintOptions, OdeintResult, odeint, odeint_with_args};
pub use rk::{
    StepSizeController, compute_error, compute_initial_step, solve_ivp, solve_ivp_with_args,
};
pub use types::{ODEMethod, ODEOptions, ODEResult};
