//! Physical constants shared by the flux and source evaluators.
//!
//! Molar quantities use kilomoles, matching species molar masses given in
//! kg/kmol.

/// Universal gas constant in kJ/(kmol·K).
pub const UNIVERSAL_GAS_CONSTANT: f64 = 8.314_462_1;

/// Universal gas constant in J/(kmol·K).
pub const RU: f64 = 1000.0 * UNIVERSAL_GAS_CONSTANT;

/// Avogadro's number, particles per kilomole.
pub const AVOGADRO: f64 = 6.022_141_5e26;

/// Standard atmosphere (Pa), the pressure normalisation of Millikan-White.
pub const STANDARD_ATMOSPHERE: f64 = 101_325.0;

/// Small number guarding ratios of spectral radii.
pub const EPS: f64 = 1e-16;

pub use std::f64::consts::PI;
