//! Quadrature methods for definite integrals.
//!
//! | Function | Input | Method |
//! |----------|-------|--------|
//! | [`quad`], [`quad_complex`], [`quad_scalar`] | function | Adaptive Gauss-Kronrod (G7-K15), infinite bounds |
//! | [`dblquad`], [`tplquad`] | function | Iterated adaptive quadrature |
//! | [`fixed_quad`] | function | Gauss-Legendre, fixed order |
//! | [`romberg`] | function | Richardson-extrapolated trapezoid |
//! | [`trapezoid`], [`cumulative_trapezoid`] | samples | Composite trapezoid |
//! | [`simpson`], [`simpson_with`] | samples | Composite Simpson |

mod adaptive;
mod gauss;
mod multi;
mod romberg;
mod simpson;
mod transform;
mod trapezoid;

pub use adaptive::{QuadOptions, QuadResult, quad, quad_complex, quad_scalar};
pub use gauss::{GaussLegendreQuadrature, fixed_quad};
pub use multi::{dblquad, tplquad};
pub use romberg::{RombergOptions, romberg};
pub use simpson::{EvenSamples, simpson, simpson_with};
pub use trapezoid::{cumulative_trapezoid, trapezoid};
