//! Finite-rate reaction definitions.

use super::equilibrium::EquilibriumTable;

/// Maximum number of participants on either side of a reaction.
pub const MAX_PARTICIPANTS: usize = 3;

/// Modified Arrhenius rate k = C·T^η·exp(−θ/T).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arrhenius {
    /// Pre-exponential factor C (cm³/mol/s for bimolecular reactions).
    pub pre_exponential: f64,
    /// Temperature exponent η.
    pub temperature_exponent: f64,
    /// Activation temperature θ (K).
    pub activation_temperature: f64,
}

impl Arrhenius {
    pub fn new(pre_exponential: f64, temperature_exponent: f64, activation_temperature: f64) -> Self {
        Self {
            pre_exponential,
            temperature_exponent,
            activation_temperature,
        }
    }

    /// Rate coefficient at temperature `t`.
    #[inline]
    pub fn rate(&self, t: f64) -> f64 {
        self.pre_exponential
            * t.powf(self.temperature_exponent)
            * (-self.activation_temperature / t).exp()
    }

    /// (1/k)·dk/dT at temperature `t`.
    #[inline]
    pub fn log_derivative(&self, t: f64) -> f64 {
        self.temperature_exponent / t + self.activation_temperature / (t * t)
    }
}

/// Exponents of the rate-controlling temperature T^a·Tve^b.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateTemperature {
    pub t_exponent: f64,
    pub tve_exponent: f64,
}

impl RateTemperature {
    pub fn new(t_exponent: f64, tve_exponent: f64) -> Self {
        Self {
            t_exponent,
            tve_exponent,
        }
    }

    /// Translational temperature only.
    pub fn translational() -> Self {
        Self::new(1.0, 0.0)
    }

    /// Park's geometric mean √(T·Tve).
    pub fn park() -> Self {
        Self::new(0.5, 0.5)
    }

    #[inline]
    pub fn evaluate(&self, t: f64, tve: f64) -> f64 {
        t.powf(self.t_exponent) * tve.powf(self.tve_exponent)
    }
}

/// One reversible reaction: reactants ⇌ products.
///
/// Species appearing twice on a side (e.g. `N + N`) are listed twice; a
/// collision partner that is not consumed appears on both sides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reaction {
    /// Reactant species indices (1 to 3 entries).
    pub reactants: Vec<usize>,
    /// Product species indices (1 to 3 entries).
    pub products: Vec<usize>,
    /// Forward rate coefficient fit.
    pub arrhenius: Arrhenius,
    /// Rate-controlling temperature of the forward direction.
    pub forward_temperature: RateTemperature,
    /// Rate-controlling temperature of the backward direction.
    pub backward_temperature: RateTemperature,
    /// Equilibrium-constant table.
    pub equilibrium: EquilibriumTable,
}

impl Reaction {
    /// Stoichiometric count of species `s` among the reactants.
    pub fn reactant_count(&self, s: usize) -> u32 {
        self.reactants.iter().filter(|&&r| r == s).count() as u32
    }

    /// Stoichiometric count of species `s` among the products.
    pub fn product_count(&self, s: usize) -> u32 {
        self.products.iter().filter(|&&p| p == s).count() as u32
    }
}
