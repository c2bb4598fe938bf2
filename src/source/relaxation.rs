//! Vibrational-translational energy exchange (Landau-Teller).
//!
//! Q = Σ_s ρ_s·(e*_s(T) − e_ve,s)/τ_s over the heavy species, where
//! τ_s = τ_MW,s + τ_P,s combines the Millikan-White mixture time
//!
//! τ_MW,s = Σ_j X_j / Σ_j (X_j/τ_sj),
//! τ_sj = (1 atm/P)·exp(A_sj·(T^(−1/3) − B_sj) − 18.42)
//!
//! with Park's high-temperature limit τ_P,s = 1/(σ·c̄_s·N),
//! σ = 10⁻²⁰·(5·10⁴/T)² m², c̄_s = √(8·Ru·T/(π·M_s)).

use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::constants::{AVOGADRO, PI, RU, STANDARD_ATMOSPHERE};
use crate::error::Result;
use crate::linalg;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::traits::{CellInputs, SourceOutput, SourceTerm, source_layout};

/// Limiting cross section at 50 000 K (m²).
const PARK_SIGMA: f64 = 1e-20 * 5e4 * 5e4;

/// Landau-Teller relaxation evaluator.
#[derive(Clone)]
pub struct RelaxationSource {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    molar_mass: Vec<f64>,
    /// Millikan-White A_sr and B_sr.
    a_sr: Mat<f64>,
    b_sr: Mat<f64>,
    tau_sr: Mat<f64>,
    conc: Vec<f64>,
    tau_mw: Vec<f64>,
    tau_p: Vec<f64>,
    /// Σ_j c_j/τ_sj per species.
    mw_denominator: Vec<f64>,
    estar: Vec<f64>,
}

impl RelaxationSource {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = source_layout("relaxation", thermo.as_ref(), config)?;
        let ns = layout.n_species();
        let species = thermo.species();
        let molar_mass: Vec<f64> = species.iter().map(|s| s.molar_mass).collect();

        let mut a_sr = Mat::zeros(ns, ns);
        let mut b_sr = Mat::zeros(ns, ns);
        for s in 0..ns {
            for j in 0..ns {
                let mu = molar_mass[s] * molar_mass[j] / (molar_mass[s] + molar_mass[j]);
                a_sr[(s, j)] = 1.16e-3 * mu.sqrt() * species[s].theta_v.powf(4.0 / 3.0);
                b_sr[(s, j)] = 0.015 * mu.powf(0.25);
            }
        }

        Ok(Self {
            thermo,
            layout,
            implicit: config.implicit,
            molar_mass,
            a_sr,
            b_sr,
            tau_sr: Mat::zeros(ns, ns),
            conc: vec![0.0; ns],
            tau_mw: vec![0.0; ns],
            tau_p: vec![0.0; ns],
            mw_denominator: vec![0.0; ns],
            estar: vec![0.0; ns],
        })
    }

    /// Relaxation time τ_s of each heavy species at the last evaluated cell.
    pub fn relaxation_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.tau_mw
            .iter()
            .zip(&self.tau_p)
            .take(self.thermo.n_heavy())
            .map(|(mw, p)| mw + p)
    }
}

impl SourceTerm for RelaxationSource {
    fn compute(&mut self, cell: &CellInputs<'_>, out: &mut SourceOutput) -> Result<()> {
        let layout = self.layout;
        cell.validate(&layout)?;
        let ns = layout.n_species();
        let nv = layout.n_var();
        let ev = layout.eve();
        let n_heavy = self.thermo.n_heavy();
        let p = cell.v[layout.p()];
        let t = cell.v[layout.t()];
        let volume = cell.volume;

        out.residual.fill(0.0);
        if self.implicit {
            linalg::zero(&mut out.jacobian);
        }

        let mut conc_total = 0.0;
        for s in 0..ns {
            self.conc[s] = cell.v[s] / self.molar_mass[s];
            conc_total += self.conc[s];
        }
        let n_mix = conc_total * AVOGADRO;
        let t_cbrt_inv = t.powf(-1.0 / 3.0);

        for s in 0..n_heavy {
            // Σ X_j = 1, so τ_MW = c/Σ c_j/τ_sj
            let mut denominator = 0.0;
            for j in 0..ns {
                let tau = STANDARD_ATMOSPHERE / p
                    * (self.a_sr[(s, j)] * (t_cbrt_inv - self.b_sr[(s, j)]) - 18.42).exp();
                self.tau_sr[(s, j)] = tau;
                denominator += self.conc[j] / tau;
            }
            self.mw_denominator[s] = denominator;
            self.tau_mw[s] = conc_total / denominator;

            let mean_speed = (8.0 * RU * t / (PI * self.molar_mass[s])).sqrt();
            let sigma = PARK_SIGMA / (t * t);
            self.tau_p[s] = 1.0 / (sigma * mean_speed * n_mix);

            self.estar[s] = self.thermo.species_vib_energy(t, s);
            let tau_s = self.tau_mw[s] + self.tau_p[s];
            out.residual[ev] += cell.v[s] * (self.estar[s] - cell.eve[s]) / tau_s * volume;
        }

        if !self.implicit {
            return Ok(());
        }

        for s in 0..n_heavy {
            let rhos = cell.v[s];
            let tau_s = self.tau_mw[s] + self.tau_p[s];
            let gap = self.estar[s] - cell.eve[s];
            let cv_star = self.thermo.species_vib_cv(t, s);

            // ∂ln τ_MW/∂T through every binary time
            let mut dln_mw_dt = 0.0;
            for j in 0..ns {
                let weight = self.conc[j] / self.tau_sr[(s, j)] / self.mw_denominator[s];
                dln_mw_dt -= weight * self.a_sr[(s, j)] / 3.0 * t.powf(-4.0 / 3.0);
            }
            let dln_p_dt = 1.5 / t;

            let lt = rhos / tau_s * volume;
            let dr_dtau = -rhos * gap / (tau_s * tau_s) * volume;
            for k in 0..nv {
                let mut dtau_mw = -cell.dpdu[k] / p + dln_mw_dt * cell.dtdu[k];
                let mut dtau_p = dln_p_dt * cell.dtdu[k];
                if k < ns {
                    let mk = self.molar_mass[k];
                    dtau_mw +=
                        (1.0 / conc_total - 1.0 / (self.tau_sr[(s, k)] * self.mw_denominator[s])) / mk;
                    dtau_p -= 1.0 / (mk * conc_total);
                }
                let dtau = self.tau_mw[s] * dtau_mw + self.tau_p[s] * dtau_p;

                out.jacobian[(ev, k)] += lt
                    * (cv_star * cell.dtdu[k] - cell.cvve[s] * cell.dtvedu[k])
                    + dr_dtau * dtau;
            }
            out.jacobian[(ev, s)] += gap / tau_s * volume;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "relaxation"
    }

    fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn is_implicit(&self) -> bool {
        self.implicit
    }

    fn is_stiff(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GasConfig;
    use crate::thermo::TwoTemperatureGas;

    fn setup(implicit: bool) -> (Arc<TwoTemperatureGas>, RelaxationSource) {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        let config = NumericsConfig::new(2).with_implicit(implicit);
        let relax = RelaxationSource::new(gas.clone(), &config).unwrap();
        (gas, relax)
    }

    #[test]
    fn test_vanishes_in_thermal_equilibrium() {
        let (gas, mut relax) = setup(false);
        let layout = relax.layout();
        let state = gas
            .state_from_primitives(layout, &[0.01, 0.002], 5000.0, 5000.0, &[100.0, 0.0])
            .unwrap();
        let coord = [0.0, 0.0];
        let mut out = SourceOutput::new(layout);
        relax
            .compute(&CellInputs::from_state(&state, &coord, 1.0), &mut out)
            .unwrap();
        assert!(out.residual.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn test_energy_flows_toward_cold_mode() {
        let (gas, mut relax) = setup(false);
        let layout = relax.layout();
        let coord = [0.0, 0.0];
        let mut out = SourceOutput::new(layout);

        let heating = gas
            .state_from_primitives(layout, &[0.01, 0.002], 8000.0, 3000.0, &[0.0, 0.0])
            .unwrap();
        relax
            .compute(&CellInputs::from_state(&heating, &coord, 1.0), &mut out)
            .unwrap();
        assert!(out.residual[layout.eve()] > 0.0);
        assert!(relax.relaxation_times().all(|tau| tau > 0.0 && tau.is_finite()));

        let cooling = gas
            .state_from_primitives(layout, &[0.01, 0.002], 3000.0, 8000.0, &[0.0, 0.0])
            .unwrap();
        relax
            .compute(&CellInputs::from_state(&cooling, &coord, 1.0), &mut out)
            .unwrap();
        assert!(out.residual[layout.eve()] < 0.0);
        for k in 0..layout.eve() {
            assert_eq!(out.residual[k], 0.0);
        }
    }

    #[test]
    fn test_park_limit_dominates_at_high_temperature() {
        let (gas, mut relax) = setup(false);
        let layout = relax.layout();
        let coord = [0.0, 0.0];
        let mut out = SourceOutput::new(layout);
        let state = gas
            .state_from_primitives(layout, &[1e-4, 0.0], 30_000.0, 10_000.0, &[0.0, 0.0])
            .unwrap();
        relax
            .compute(&CellInputs::from_state(&state, &coord, 1.0), &mut out)
            .unwrap();
        assert!(relax.tau_p[0] > relax.tau_mw[0]);
    }
}
