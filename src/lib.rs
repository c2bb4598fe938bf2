//! # tne2-rs
//!
//! Numerical fluxes and source terms for finite-volume discretizations of
//! the two-temperature (TNE2) compressible Navier-Stokes equations used in
//! hypersonic nonequilibrium flow.
//!
//! This crate provides the per-face and per-cell building blocks of an
//! implicit or explicit TNE2 solver:
//! - Variable layout of the conserved and primitive vectors
//! - Species, reaction and numerics configuration
//! - A two-temperature thermodynamic model behind the [`ThermoModel`] trait
//! - Eigenstructure of the projected flux Jacobian
//! - Convective fluxes (Roe, MSW, AUSM, AUSM+-up2, AUSMPW+, centered Lax)
//! - Averaged-gradient viscous fluxes with non-orthogonal correction
//! - Chemistry, vibrational relaxation and axisymmetric source terms
//!
//! Every evaluator returns its residual and, in implicit mode, the analytic
//! Jacobian with respect to the conserved variables.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tne2_rs::config::{GasConfig, NumericsConfig};
//! use tne2_rs::flux::{ConvectiveFlux, FaceInputs, FluxOutput, FluxSchemeKind, create_scheme};
//! use tne2_rs::thermo::TwoTemperatureGas;
//!
//! let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
//! let config = NumericsConfig::new(2).with_implicit(true);
//! let mut roe = create_scheme(FluxSchemeKind::Roe, gas.clone(), &config).unwrap();
//! let layout = roe.layout();
//!
//! let left = gas
//!     .state_from_primitives(layout, &[0.01, 0.001], 3000.0, 2000.0, &[1500.0, 0.0])
//!     .unwrap();
//! let right = gas
//!     .state_from_primitives(layout, &[0.02, 0.001], 4000.0, 2200.0, &[800.0, 0.0])
//!     .unwrap();
//! let normal = [1.0, 0.0];
//! let mut out = FluxOutput::new(layout);
//! roe.compute(&FaceInputs::from_states(&left, &right, &normal), &mut out);
//! assert!(out.residual.iter().all(|r| r.is_finite()));
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod flux;
pub mod linalg;
pub mod source;
pub mod thermo;
pub mod types;
pub mod viscous;

// Re-export main types for convenience
pub use config::{GasConfig, NumericsConfig, Reaction, SpeciesData};
pub use error::{Result, Tne2Error};
pub use flux::{
    AusmFlux, AusmPwPlusFlux, AusmUp2Flux, ConvectiveFlux, ConvectiveScheme, FaceInputs,
    FluxOutput, FluxSchemeKind, LaxFlux, MswFlux, RoeFlux, compute_faces, create_scheme,
};
#[cfg(feature = "parallel")]
pub use flux::compute_faces_parallel;
pub use source::{
    AxisymmetricSource, CellInputs, ChemistrySource, CombinedSource, RelaxationSource,
    SourceKind, SourceOutput, SourceTerm,
};
pub use thermo::{GasState, ThermoModel, TwoTemperatureGas};
pub use types::VariableLayout;
pub use viscous::{
    AvgGradCorrectedFlux, AvgGradFlux, TransportProperties, ViscousFlux, ViscousInputs,
    ViscousSide,
};
