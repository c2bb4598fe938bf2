//! Per-species physical constants.

use crate::constants::RU;

/// One electronic energy level: degeneracy and characteristic temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElectronicLevel {
    /// Degeneracy g_k.
    pub degeneracy: f64,
    /// Characteristic electronic temperature θ_k (K).
    pub theta: f64,
}

impl ElectronicLevel {
    pub fn new(degeneracy: f64, theta: f64) -> Self {
        Self { degeneracy, theta }
    }
}

/// Physical constants of a single chemical species.
///
/// # Example
///
/// ```
/// use tne2_rs::config::SpeciesData;
///
/// let n2 = SpeciesData::new("N2", 28.0134)
///     .with_rotational_modes(2.0)
///     .with_theta_v(3395.0);
/// assert!((n2.translational_cv() - 2.5 * n2.gas_constant()).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesData {
    /// Species label, for diagnostics only.
    pub name: String,
    /// Molar mass (kg/kmol).
    pub molar_mass: f64,
    /// Number of rotational degrees of freedom ξ (0 for atoms, 2 for diatomics).
    pub rotational_modes: f64,
    /// Characteristic vibrational temperature θv (K), zero for atoms.
    pub theta_v: f64,
    /// Enthalpy of formation (J/kg).
    pub formation_enthalpy: f64,
    /// Reference temperature of the formation enthalpy (K).
    pub reference_temperature: f64,
    /// Electronic levels, ground state first. Empty means no electronic energy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub electronic_levels: Vec<ElectronicLevel>,
}

impl SpeciesData {
    /// Create a monatomic, formation-free species of the given molar mass.
    pub fn new(name: impl Into<String>, molar_mass: f64) -> Self {
        Self {
            name: name.into(),
            molar_mass,
            rotational_modes: 0.0,
            theta_v: 0.0,
            formation_enthalpy: 0.0,
            reference_temperature: 0.0,
            electronic_levels: Vec::new(),
        }
    }

    pub fn with_rotational_modes(mut self, xi: f64) -> Self {
        self.rotational_modes = xi;
        self
    }

    pub fn with_theta_v(mut self, theta_v: f64) -> Self {
        self.theta_v = theta_v;
        self
    }

    pub fn with_formation_enthalpy(mut self, hf: f64) -> Self {
        self.formation_enthalpy = hf;
        self
    }

    pub fn with_reference_temperature(mut self, t_ref: f64) -> Self {
        self.reference_temperature = t_ref;
        self
    }

    pub fn with_electronic_levels(mut self, levels: Vec<ElectronicLevel>) -> Self {
        self.electronic_levels = levels;
        self
    }

    /// Specific gas constant R_s = Ru / M_s (J/(kg·K)).
    #[inline]
    pub fn gas_constant(&self) -> f64 {
        RU / self.molar_mass
    }

    /// Translational-rotational heat capacity (3/2 + ξ/2)·R_s.
    #[inline]
    pub fn translational_cv(&self) -> f64 {
        (1.5 + 0.5 * self.rotational_modes) * self.gas_constant()
    }
}
