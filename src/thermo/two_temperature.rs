//! Reference two-temperature gas model.
//!
//! Energy partition of species s (heavy):
//!
//! e_s = Cvtr_s·(T − Tref_s) + hf_s + eve_s(Tve)
//!
//! with eve_s the harmonic-oscillator vibrational energy plus the electronic
//! energy of the species' levels. The free electron (last species of an
//! ionized mixture) keeps its translational energy (3/2)·R_e·(Tve − Tref) in
//! the vibrational-electronic pool and contributes R_e·Tve to the pressure.

use crate::config::{GasConfig, Reaction, SpeciesData};
use crate::error::{Result, Tne2Error};
use crate::types::VariableLayout;

use super::ThermoModel;

/// Newton iterations allowed when recovering Tve from ρEve.
const MAX_NEWTON_ITERATIONS: usize = 50;

/// Relative tolerance on Tve.
const NEWTON_TOLERANCE: f64 = 1e-10;

/// Two-temperature mixture built from a [`GasConfig`].
#[derive(Clone, Debug)]
pub struct TwoTemperatureGas {
    config: GasConfig,
}

impl TwoTemperatureGas {
    /// Build the model after validating the gas tables.
    pub fn new(config: GasConfig) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "two-temperature gas: {} species, {} reactions",
            config.n_species(),
            config.reactions.len()
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// Heat capacity entering ρCvtr (zero for the electron).
    #[inline]
    fn cvtr_mode(&self, s: usize) -> f64 {
        if self.is_electron(s) {
            0.0
        } else {
            self.config.species[s].translational_cv()
        }
    }

    /// Translational-rotational energy plus formation enthalpy of species s.
    #[inline]
    fn frozen_energy(&self, t: f64, s: usize) -> f64 {
        let sp = &self.config.species[s];
        self.cvtr_mode(s) * (t - sp.reference_temperature) + sp.formation_enthalpy
    }

    /// dT/dU and dTve/dU of the state `v`.
    pub fn temperature_derivatives(
        &self,
        layout: &VariableLayout,
        v: &[f64],
        eve: &[f64],
        dtdu: &mut [f64],
        dtvedu: &mut [f64],
    ) {
        let ns = layout.n_species();
        let t = v[layout.t()];
        let rho_cvtr = v[layout.rho_cvtr()];
        let rho_cvve = v[layout.rho_cvve()];
        let half_sqvel = 0.5 * layout.velocity_squared(v);

        for s in 0..ns {
            dtdu[s] = -(self.frozen_energy(t, s) - half_sqvel) / rho_cvtr;
        }
        for d in 0..layout.n_dim() {
            dtdu[layout.momentum() + d] = -v[layout.vel() + d] / rho_cvtr;
        }
        dtdu[layout.energy()] = 1.0 / rho_cvtr;
        dtdu[layout.eve()] = -1.0 / rho_cvtr;

        dtvedu[..layout.n_var()].fill(0.0);
        // A mixture without vibrational modes keeps Tve frozen
        if rho_cvve > 0.0 {
            for s in 0..ns {
                dtvedu[s] = -eve[s] / rho_cvve;
            }
            dtvedu[layout.eve()] = 1.0 / rho_cvve;
        }
    }

    /// Assemble a complete state from species densities, temperatures and velocity.
    ///
    /// # Example
    ///
    /// ```
    /// use tne2_rs::config::GasConfig;
    /// use tne2_rs::thermo::TwoTemperatureGas;
    /// use tne2_rs::types::VariableLayout;
    ///
    /// let gas = TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap();
    /// let layout = VariableLayout::new(2, 2);
    /// let state = gas
    ///     .state_from_primitives(layout, &[0.9e-2, 0.1e-2], 3000.0, 2500.0, &[2000.0, 0.0])
    ///     .unwrap();
    /// assert!((state.v[layout.rho()] - 1e-2).abs() < 1e-15);
    /// assert!(state.v[layout.a()] > 0.0);
    /// ```
    pub fn state_from_primitives(
        &self,
        layout: VariableLayout,
        rhos: &[f64],
        t: f64,
        tve: f64,
        velocity: &[f64],
    ) -> Result<GasState> {
        let ns = self.check_layout(&layout)?;
        if rhos.len() != ns || velocity.len() != layout.n_dim() {
            return Err(Tne2Error::dimension_mismatch(
                format!("{ns} densities and {} velocity components", layout.n_dim()),
                format!("{} and {}", rhos.len(), velocity.len()),
            ));
        }
        if !(t > 0.0 && tve > 0.0) {
            return Err(Tne2Error::InvalidState(format!(
                "temperatures must be positive (T = {t}, Tve = {tve})"
            )));
        }

        let mut state = GasState::zeros(layout);
        let rho: f64 = rhos.iter().sum();
        let sqvel: f64 = velocity.iter().map(|u| u * u).sum();

        let mut rho_cvtr = 0.0;
        let mut rho_cvve = 0.0;
        let mut pressure = 0.0;
        let mut rho_e = 0.5 * rho * sqvel;
        let mut rho_eve = 0.0;
        for s in 0..ns {
            let eve_s = self.species_vib_energy(tve, s);
            let cvve_s = self.species_vib_cv(tve, s);
            state.eve[s] = eve_s;
            state.cvve[s] = cvve_s;
            rho_cvtr += rhos[s] * self.cvtr_mode(s);
            rho_cvve += rhos[s] * cvve_s;
            let t_s = if self.is_electron(s) { tve } else { t };
            pressure += rhos[s] * self.gas_constant(s) * t_s;
            rho_e += rhos[s] * (self.frozen_energy(t, s) + eve_s);
            rho_eve += rhos[s] * eve_s;
        }

        let v = &mut state.v;
        v[..ns].copy_from_slice(rhos);
        v[layout.t()] = t;
        v[layout.tve()] = tve;
        v[layout.vel()..layout.vel() + layout.n_dim()].copy_from_slice(velocity);
        v[layout.p()] = pressure;
        v[layout.rho()] = rho;
        v[layout.h()] = (rho_e + pressure) / rho;
        v[layout.rho_cvtr()] = rho_cvtr;
        v[layout.rho_cvve()] = rho_cvve;

        let u = &mut state.u;
        u[..ns].copy_from_slice(rhos);
        for d in 0..layout.n_dim() {
            u[layout.momentum() + d] = rho * velocity[d];
        }
        u[layout.energy()] = rho_e;
        u[layout.eve()] = rho_eve;

        self.finish_state(&mut state);
        Ok(state)
    }

    /// Recover a complete state from conserved variables.
    ///
    /// T follows explicitly from the energy balance; Tve is found by Newton
    /// iteration on Σ ρ_s·eve_s(Tve) = ρEve.
    pub fn state_from_conserved(&self, layout: VariableLayout, u: &[f64]) -> Result<GasState> {
        let ns = self.check_layout(&layout)?;
        if u.len() != layout.n_var() {
            return Err(Tne2Error::dimension_mismatch(
                layout.n_var().to_string(),
                u.len().to_string(),
            ));
        }

        let rhos = &u[..ns];
        let rho: f64 = rhos.iter().sum();
        if !(rho > 0.0) {
            return Err(Tne2Error::InvalidState(format!(
                "non-positive mixture density {rho}"
            )));
        }
        let velocity: Vec<f64> = (0..layout.n_dim())
            .map(|d| u[layout.momentum() + d] / rho)
            .collect();
        let sqvel: f64 = velocity.iter().map(|x| x * x).sum();
        let rho_eve = u[layout.eve()];

        // ρCvtr·T = ρE − ρEve − ½ρ|u|² − Σ ρ_s (hf_s − Cvtr_s·Tref_s)
        let mut rho_cvtr = 0.0;
        let mut offset = 0.0;
        for s in 0..ns {
            rho_cvtr += rhos[s] * self.cvtr_mode(s);
            offset += rhos[s] * self.frozen_energy(0.0, s);
        }
        let t = (u[layout.energy()] - rho_eve - 0.5 * rho * sqvel - offset) / rho_cvtr;
        if !(t > 0.0) {
            return Err(Tne2Error::InvalidState(format!(
                "non-positive translational temperature {t}"
            )));
        }

        let tve = self.solve_tve(rhos, rho_eve, t)?;
        self.state_from_primitives(layout, rhos, t, tve, &velocity)
    }

    fn solve_tve(&self, rhos: &[f64], rho_eve: f64, guess: f64) -> Result<f64> {
        let mut tve = guess;
        for iter in 0..MAX_NEWTON_ITERATIONS {
            let mut f = -rho_eve;
            let mut df = 0.0;
            for (s, &rho_s) in rhos.iter().enumerate() {
                f += rho_s * self.species_vib_energy(tve, s);
                df += rho_s * self.species_vib_cv(tve, s);
            }
            if df <= 0.0 {
                // No vibrational-electronic modes: Tve is undetermined, keep T
                return Ok(guess);
            }
            let mut step = f / df;
            while tve - step <= 0.0 {
                step *= 0.5;
            }
            tve -= step;
            log::trace!("Tve Newton iter {}: Tve = {:.6e}, step = {:.3e}", iter + 1, tve, step);
            if step.abs() <= NEWTON_TOLERANCE * tve {
                return Ok(tve);
            }
        }
        Err(Tne2Error::InvalidState(format!(
            "vibrational temperature did not converge (ρEve = {rho_eve})"
        )))
    }

    fn check_layout(&self, layout: &VariableLayout) -> Result<usize> {
        let ns = self.config.n_species();
        if layout.n_species() != ns {
            return Err(Tne2Error::dimension_mismatch(
                format!("{ns} species"),
                format!("{} species", layout.n_species()),
            ));
        }
        Ok(ns)
    }

    /// Fill the derivative vectors and the frozen sound speed.
    fn finish_state(&self, state: &mut GasState) {
        let layout = state.layout;
        let ns = layout.n_species();
        self.pressure_derivatives(&layout, &state.v, &state.eve, &mut state.dpdu);
        self.temperature_derivatives(
            &layout,
            &state.v,
            &state.eve,
            &mut state.dtdu,
            &mut state.dtvedu,
        );

        // a² = Σ Y_k ψ_k + β (H − |u|²) + φ·eve_mix
        let v = &state.v;
        let rho = v[layout.rho()];
        let beta = state.dpdu[layout.energy()];
        let phi = state.dpdu[layout.eve()];
        let mut a2 = beta * (v[layout.h()] - layout.velocity_squared(v))
            + phi * state.u[layout.eve()] / rho;
        for s in 0..ns {
            a2 += v[s] / rho * state.dpdu[s];
        }
        state.v[layout.a()] = a2.sqrt();
    }
}

impl ThermoModel for TwoTemperatureGas {
    fn species(&self) -> &[SpeciesData] {
        &self.config.species
    }

    fn ionization(&self) -> bool {
        self.config.ionization
    }

    fn reactions(&self) -> &[Reaction] {
        &self.config.reactions
    }

    fn species_vib_energy(&self, tve: f64, s: usize) -> f64 {
        let sp = &self.config.species[s];
        let r = sp.gas_constant();
        if self.is_electron(s) {
            return sp.translational_cv() * (tve - sp.reference_temperature);
        }

        let ev = if sp.theta_v > 0.0 {
            r * sp.theta_v / (sp.theta_v / tve).exp_m1()
        } else {
            0.0
        };

        let eel = if sp.electronic_levels.is_empty() {
            0.0
        } else {
            let mut num = 0.0;
            let mut denom = 0.0;
            for level in &sp.electronic_levels {
                let w = level.degeneracy * (-level.theta / tve).exp();
                num += level.theta * w;
                denom += w;
            }
            r * num / denom
        };

        ev + eel
    }

    fn species_vib_cv(&self, tve: f64, s: usize) -> f64 {
        let sp = &self.config.species[s];
        let r = sp.gas_constant();
        if self.is_electron(s) {
            return sp.translational_cv();
        }

        let cvv = if sp.theta_v > 0.0 {
            let x = sp.theta_v / tve;
            let e = (-x).exp();
            r * x * x * e / ((1.0 - e) * (1.0 - e))
        } else {
            0.0
        };

        let cvel = if sp.electronic_levels.is_empty() {
            0.0
        } else {
            let mut sum0 = 0.0;
            let mut sum1 = 0.0;
            let mut sum2 = 0.0;
            for level in &sp.electronic_levels {
                let w = level.degeneracy * (-level.theta / tve).exp();
                sum0 += w;
                sum1 += level.theta * w;
                sum2 += level.theta * level.theta * w;
            }
            r / (tve * tve) * (sum2 / sum0 - (sum1 / sum0).powi(2))
        };

        cvv + cvel
    }

    fn species_enthalpy(&self, t: f64, eve_s: f64, s: usize) -> f64 {
        let sp = &self.config.species[s];
        let r = sp.gas_constant();
        if self.is_electron(s) {
            let t_e = eve_s / sp.translational_cv() + sp.reference_temperature;
            return r * t_e + sp.formation_enthalpy + eve_s;
        }
        sp.translational_cv() * (t - sp.reference_temperature)
            + r * t
            + sp.formation_enthalpy
            + eve_s
    }

    fn pressure_derivatives(
        &self,
        layout: &VariableLayout,
        v: &[f64],
        eve: &[f64],
        dpdu: &mut [f64],
    ) {
        let ns = layout.n_species();
        let t = v[layout.t()];
        let tve = v[layout.tve()];

        let rho_cvtr = v[layout.rho_cvtr()];
        let rho_cvve = v[layout.rho_cvve()];
        let half_sqvel = 0.5 * layout.velocity_squared(v);

        let mut rho_r_heavy = 0.0;
        let mut rho_r_el = 0.0;
        for s in 0..ns {
            if self.is_electron(s) {
                rho_r_el += v[s] * self.gas_constant(s);
            } else {
                rho_r_heavy += v[s] * self.gas_constant(s);
            }
        }
        let el_over_cvve = if rho_cvve > 0.0 {
            rho_r_el / rho_cvve
        } else {
            0.0
        };

        // P = Σ_heavy ρ_s R_s T + ρ_e R_e Tve, with T and Tve functions of U
        for s in 0..ns {
            let dtdu = -(self.frozen_energy(t, s) - half_sqvel) / rho_cvtr;
            let t_s = if self.is_electron(s) { tve } else { t };
            dpdu[s] = rho_r_heavy * dtdu - el_over_cvve * eve[s] + self.gas_constant(s) * t_s;
        }
        for d in 0..layout.n_dim() {
            dpdu[layout.momentum() + d] = -rho_r_heavy * v[layout.vel() + d] / rho_cvtr;
        }
        dpdu[layout.energy()] = rho_r_heavy / rho_cvtr;
        dpdu[layout.eve()] = -rho_r_heavy / rho_cvtr + el_over_cvve;
    }
}

// =============================================================================
// Cell state
// =============================================================================

/// Everything the evaluators need about one cell or reconstructed face state.
#[derive(Clone, Debug, PartialEq)]
pub struct GasState {
    pub layout: VariableLayout,
    /// Conserved variables.
    pub u: Vec<f64>,
    /// Primitive variables.
    pub v: Vec<f64>,
    /// Per-species vibrational-electronic energy.
    pub eve: Vec<f64>,
    /// Per-species vibrational-electronic heat capacity.
    pub cvve: Vec<f64>,
    /// ∂P/∂U.
    pub dpdu: Vec<f64>,
    /// ∂T/∂U.
    pub dtdu: Vec<f64>,
    /// ∂Tve/∂U.
    pub dtvedu: Vec<f64>,
}

impl GasState {
    /// All-zero state sized for `layout`.
    pub fn zeros(layout: VariableLayout) -> Self {
        let ns = layout.n_species();
        let n_var = layout.n_var();
        Self {
            layout,
            u: vec![0.0; n_var],
            v: vec![0.0; layout.n_prim_var()],
            eve: vec![0.0; ns],
            cvve: vec![0.0; ns],
            dpdu: vec![0.0; n_var],
            dtdu: vec![0.0; n_var],
            dtvedu: vec![0.0; n_var],
        }
    }

    #[inline]
    pub fn pressure(&self) -> f64 {
        self.v[self.layout.p()]
    }

    #[inline]
    pub fn density(&self) -> f64 {
        self.v[self.layout.rho()]
    }

    #[inline]
    pub fn sound_speed(&self) -> f64 {
        self.v[self.layout.a()]
    }
}
