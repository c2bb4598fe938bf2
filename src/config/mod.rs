//! Gas and numerics configuration.
//!
//! Two read-only tables feed every evaluator:
//! - [`GasConfig`]: species constants, finite-rate reactions, ionization flag
//! - [`NumericsConfig`]: dimensionality, implicit flag, scheme tuning constants
//!
//! Both follow the `with_*` builder idiom and are checked once with
//! `validate()` before evaluators are built from them.

mod equilibrium;
mod reaction;
mod species;

pub use equilibrium::{EquilibriumTable, N_COEFFICIENTS, N_REGIMES};
pub use reaction::{Arrhenius, MAX_PARTICIPANTS, RateTemperature, Reaction};
pub use species::{ElectronicLevel, SpeciesData};

use crate::error::{Result, Tne2Error};
use crate::types::VariableLayout;

// =============================================================================
// Gas configuration
// =============================================================================

/// Species and reaction tables of a gas mixture.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasConfig {
    /// Species constants; with ionization the electron is the last entry.
    pub species: Vec<SpeciesData>,
    /// Finite-rate reactions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reactions: Vec<Reaction>,
    /// Whether the last species is the free electron.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ionization: bool,
}

impl GasConfig {
    /// Create a gas from its species table, without reactions.
    pub fn new(species: Vec<SpeciesData>) -> Self {
        Self {
            species,
            reactions: Vec::new(),
            ionization: false,
        }
    }

    pub fn with_reaction(mut self, reaction: Reaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    pub fn with_ionization(mut self, ionization: bool) -> Self {
        self.ionization = ionization;
        self
    }

    #[inline]
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Number of species that are not the free electron.
    #[inline]
    pub fn n_heavy(&self) -> usize {
        if self.ionization {
            self.species.len().saturating_sub(1)
        } else {
            self.species.len()
        }
    }

    /// Check the tables for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.species.is_empty() {
            return Err(Tne2Error::InvalidConfig("species table is empty".into()));
        }
        if self.ionization && self.species.len() < 2 {
            return Err(Tne2Error::InvalidConfig(
                "an ionized mixture needs at least one heavy species and the electron".into(),
            ));
        }
        for s in &self.species {
            if !(s.molar_mass > 0.0) {
                return Err(Tne2Error::InvalidConfig(format!(
                    "species {} has non-positive molar mass {}",
                    s.name, s.molar_mass
                )));
            }
            if s.theta_v < 0.0 {
                return Err(Tne2Error::InvalidConfig(format!(
                    "species {} has negative vibrational temperature",
                    s.name
                )));
            }
        }

        let ns = self.species.len();
        for (r, reaction) in self.reactions.iter().enumerate() {
            for side in [&reaction.reactants, &reaction.products] {
                if side.is_empty() || side.len() > MAX_PARTICIPANTS {
                    return Err(Tne2Error::InvalidConfig(format!(
                        "reaction {r} must have 1 to {MAX_PARTICIPANTS} participants per side"
                    )));
                }
                if let Some(&bad) = side.iter().find(|&&s| s >= ns) {
                    return Err(Tne2Error::InvalidConfig(format!(
                        "reaction {r} references species {bad}, mixture has {ns}"
                    )));
                }
            }

            let imbalance: f64 = reaction
                .products
                .iter()
                .map(|&s| self.species[s].molar_mass)
                .sum::<f64>()
                - reaction
                    .reactants
                    .iter()
                    .map(|&s| self.species[s].molar_mass)
                    .sum::<f64>();
            if imbalance.abs() > 1e-6 {
                log::warn!("reaction {r} is not mass balanced (Δm = {imbalance:.3e} kg/kmol)");
            }
        }

        if self.ionization {
            log::warn!("ionized mixture: species diffusion in the viscous flux is unsupported");
        }
        Ok(())
    }

    /// Two-species dissociating nitrogen (N2, N) with Park's rates.
    ///
    /// Reactions:
    /// - N2 + N2 ⇌ N + N + N2
    /// - N2 + N ⇌ N + N + N
    pub fn nitrogen() -> Self {
        let n2 = SpeciesData::new("N2", 28.0134)
            .with_rotational_modes(2.0)
            .with_theta_v(3395.0);
        let n = SpeciesData::new("N", 14.0067).with_formation_enthalpy(3.36e7);

        let equilibrium = EquilibriumTable::new([
            [3.4907, 0.83133, 4.0978, -12.728, 0.07487],
            [2.0723, 1.38970, 2.0617, -11.828, 0.015105],
            [1.6060, 1.57320, 1.3923, -11.533, -0.004543],
            [1.5351, 1.60610, 1.2993, -11.494, -0.00698],
            [1.4766, 1.62910, 1.2153, -11.457, -0.00944],
            [1.4766, 1.62910, 1.2153, -11.457, -0.00944],
        ]);

        let dissociation = |partner: usize, pre_exponential: f64| Reaction {
            reactants: vec![0, partner],
            products: vec![1, 1, partner],
            arrhenius: Arrhenius::new(pre_exponential, -1.6, 113_200.0),
            forward_temperature: RateTemperature::park(),
            backward_temperature: RateTemperature::translational(),
            equilibrium,
        };

        Self::new(vec![n2, n])
            .with_reaction(dissociation(0, 7.0e21))
            .with_reaction(dissociation(1, 3.0e22))
    }
}

// =============================================================================
// Numerics configuration
// =============================================================================

/// Tuning constants of the AUSM+-up2 scheme.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AusmUp2Params {
    /// Ratio of specific heats used in the critical sound speed.
    pub gamma: f64,
    /// Free-stream Mach number, lower bound of the reference Mach number.
    pub mach_inf: f64,
}

impl Default for AusmUp2Params {
    fn default() -> Self {
        Self {
            gamma: 1.4,
            mach_inf: 1.0,
        }
    }
}

/// Where AUSMPW+ takes face velocities and pressures from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AusmPwInputs {
    /// Velocity and pressure are zeroed before use. The scheme is incomplete
    /// in this mode and produces non-finite fluxes.
    #[default]
    AsShipped,
    /// Velocity and pressure are read from the primitive vectors.
    Restored,
}

/// Numerical-scheme flags and constants.
///
/// # Example
///
/// ```
/// use tne2_rs::config::NumericsConfig;
///
/// let config = NumericsConfig::new(2).with_implicit(true).with_lax_kappa(0.2);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.lax_kappa, 0.2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumericsConfig {
    /// Spatial dimension (2 or 3).
    pub n_dim: usize,
    /// Whether Jacobian blocks are produced.
    pub implicit: bool,
    /// First-order artificial-dissipation coefficient of the centered Lax scheme.
    pub lax_kappa: f64,
    /// AUSM+-up2 constants.
    pub ausm_up2: AusmUp2Params,
    /// AUSMPW+ input mode.
    pub ausmpw_inputs: AusmPwInputs,
}

impl NumericsConfig {
    /// Explicit configuration in `n_dim` dimensions with default constants.
    pub fn new(n_dim: usize) -> Self {
        Self {
            n_dim,
            implicit: false,
            lax_kappa: 0.15,
            ausm_up2: AusmUp2Params::default(),
            ausmpw_inputs: AusmPwInputs::default(),
        }
    }

    pub fn with_implicit(mut self, implicit: bool) -> Self {
        self.implicit = implicit;
        self
    }

    pub fn with_lax_kappa(mut self, kappa: f64) -> Self {
        self.lax_kappa = kappa;
        self
    }

    pub fn with_ausm_up2(mut self, params: AusmUp2Params) -> Self {
        self.ausm_up2 = params;
        self
    }

    pub fn with_ausmpw_inputs(mut self, inputs: AusmPwInputs) -> Self {
        self.ausmpw_inputs = inputs;
        self
    }

    /// Check the constants.
    pub fn validate(&self) -> Result<()> {
        if !(2..=3).contains(&self.n_dim) {
            return Err(Tne2Error::InvalidConfig(format!(
                "nDim must be 2 or 3, got {}",
                self.n_dim
            )));
        }
        if self.lax_kappa < 0.0 {
            return Err(Tne2Error::InvalidConfig(
                "Lax dissipation coefficient must be non-negative".into(),
            ));
        }
        if !(self.ausm_up2.gamma > 1.0) {
            return Err(Tne2Error::InvalidConfig(
                "AUSM+-up2 gamma must exceed 1".into(),
            ));
        }
        Ok(())
    }

    /// Variable layout for a gas with `n_species` species.
    pub fn layout(&self, n_species: usize) -> Result<VariableLayout> {
        VariableLayout::checked(n_species, self.n_dim)
    }
}
