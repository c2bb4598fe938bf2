//! Convective numerical fluxes.
//!
//! Provides face fluxes for finite-volume discretizations of the
//! two-temperature Euler equations:
//! - Eigenstructure of the projected flux Jacobian and the exact projected
//!   flux and Jacobian
//! - Approximate Riemann solver: Roe
//! - Flux-vector splitting: modified Steger-Warming (MSW)
//! - Advection upstream splitting: AUSM, AUSM+-up2, AUSMPW+
//! - Centered scheme with Lax artificial dissipation
//!
//! # Flux Trait
//!
//! The [`ConvectiveFlux`] trait is the common interface of all schemes.
//! [`ConvectiveScheme`] wraps the built-in schemes for enum dispatch when
//! the scheme is selected at run time from a [`FluxSchemeKind`].
//!
//! ## Built-in Schemes
//! - [`RoeFlux`]: Roe solver with Harten-Hyman entropy fix
//! - [`MswFlux`]: pressure-switched Steger-Warming splitting
//! - [`AusmFlux`]: Van Leer split Mach numbers and pressures
//! - [`AusmUp2Flux`]: AUSM with low-Mach pressure and velocity diffusion
//! - [`AusmPwPlusFlux`]: AUSM with pressure-based weight functions
//! - [`LaxFlux`]: centered flux, scalar first-order dissipation

mod ausm;
mod ausm_up2;
mod ausmpw_plus;
pub mod batch;
pub mod eigen;
mod lax;
mod msw;
pub mod projected;
mod roe;
pub mod traits;

pub use ausm::{AusmFlux, mach_minus, mach_plus, pressure_minus, pressure_plus};
pub use ausm_up2::{AusmUp2Flux, InterfaceState};
pub use ausmpw_plus::AusmPwPlusFlux;
pub use batch::compute_faces;
#[cfg(feature = "parallel")]
pub use batch::compute_faces_parallel;
pub use eigen::{create_basis, eigenvalues, entropy_fix, p_matrix, p_matrix_inv};
pub use lax::LaxFlux;
pub use msw::MswFlux;
pub use projected::{inviscid_proj_flux, inviscid_proj_jacobian};
pub use roe::RoeFlux;

// Re-export trait-based dispatch
pub use traits::{
    ConvectiveFlux, ConvectiveScheme, FaceInputs, FluxOutput, FluxSchemeKind, create_scheme,
};
