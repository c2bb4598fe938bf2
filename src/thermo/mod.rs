//! Thermodynamic state provider.
//!
//! The flux and source evaluators never evaluate a gas model directly; they
//! call through [`ThermoModel`], which exposes per-species vibrational
//! energy, vibrational heat capacity and enthalpy, and the derivatives of
//! pressure with respect to the conserved variables.
//!
//! [`TwoTemperatureGas`] is the reference implementation (harmonic-oscillator
//! vibration, optional electronic levels, free electrons in the
//! vibrational-electronic pool) and also assembles complete cell states
//! ([`GasState`]) from either primitive or conserved variables.

mod two_temperature;

pub use two_temperature::{GasState, TwoTemperatureGas};

use crate::config::{Reaction, SpeciesData};
use crate::types::VariableLayout;

/// Thermodynamic collaborator consumed by every evaluator.
///
/// Implementations must be thread-safe (`Send + Sync`): one model is shared
/// by all evaluator instances.
pub trait ThermoModel: Send + Sync {
    /// Species constants.
    fn species(&self) -> &[SpeciesData];

    /// Whether the last species is the free electron.
    fn ionization(&self) -> bool;

    /// Finite-rate reactions of the mixture.
    fn reactions(&self) -> &[Reaction] {
        &[]
    }

    /// Vibrational-electronic energy of species `s` at `tve` (J/kg).
    fn species_vib_energy(&self, tve: f64, s: usize) -> f64;

    /// Vibrational-electronic heat capacity of species `s` at `tve` (J/(kg·K)).
    fn species_vib_cv(&self, tve: f64, s: usize) -> f64;

    /// Specific enthalpy of species `s` given T and its vibrational energy.
    fn species_enthalpy(&self, t: f64, eve_s: f64, s: usize) -> f64;

    /// Pressure derivatives ∂P/∂U of the state `v` (conserved layout).
    fn pressure_derivatives(
        &self,
        layout: &VariableLayout,
        v: &[f64],
        eve: &[f64],
        dpdu: &mut [f64],
    );

    #[inline]
    fn n_species(&self) -> usize {
        self.species().len()
    }

    /// Number of species that are not the free electron.
    #[inline]
    fn n_heavy(&self) -> usize {
        if self.ionization() {
            self.n_species() - 1
        } else {
            self.n_species()
        }
    }

    #[inline]
    fn is_electron(&self, s: usize) -> bool {
        self.ionization() && s + 1 == self.n_species()
    }

    /// Specific gas constant Ru/M_s.
    #[inline]
    fn gas_constant(&self, s: usize) -> f64 {
        self.species()[s].gas_constant()
    }

    /// Translational-rotational heat capacity (3/2 + ξ/2)·Ru/M_s.
    #[inline]
    fn translational_cv(&self, s: usize) -> f64 {
        self.species()[s].translational_cv()
    }

    /// Vibrational energies of all species at `tve`.
    fn vib_energies(&self, tve: f64, out: &mut [f64]) {
        for (s, e) in out.iter_mut().enumerate().take(self.n_species()) {
            *e = self.species_vib_energy(tve, s);
        }
    }

    /// Vibrational heat capacities of all species at `tve`.
    fn vib_heat_capacities(&self, tve: f64, out: &mut [f64]) {
        for (s, cv) in out.iter_mut().enumerate().take(self.n_species()) {
            *cv = self.species_vib_cv(tve, s);
        }
    }
}
