//! Finite-rate chemistry source.
//!
//! Each reaction proceeds at
//!
//! w = 10³·(k_f·Π c_r^α_r − k_b·Π c_p^β_p)   (kmol/m³/s)
//!
//! with molar concentrations c in mol/cm³, k_f = C·T_f^η·exp(−θ/T_f) and
//! k_b = k_f(T_b)/Keq(T_b). The rate-controlling temperatures T_f, T_b are
//! the smoothed maximum of T^a·Tve^b and 800 K. Species production enters
//! the species rows and carries its vibrational energy into the ρEve row.

use std::sync::Arc;

use crate::config::{EquilibriumTable, NumericsConfig, Reaction};
use crate::constants::AVOGADRO;
use crate::error::Result;
use crate::linalg;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::traits::{CellInputs, SourceOutput, SourceTerm, source_layout};

/// Floor of the rate-controlling temperature (K).
const T_MIN: f64 = 800.0;

/// Width of the smoothed maximum (K).
const SMOOTHING: f64 = 80.0;

/// kmol/m³ to mol/cm³.
const TO_MOL_PER_CM3: f64 = 1e-3;

/// m⁻³ to cm⁻³.
const TO_PER_CM3: f64 = 1e-6;

/// ½(x + T_min + √((x − T_min)² + ε²)) and its derivative.
#[inline]
pub fn smoothed_temperature(x: f64) -> (f64, f64) {
    let root = ((x - T_MIN) * (x - T_MIN) + SMOOTHING * SMOOTHING).sqrt();
    (0.5 * (x + T_MIN + root), 0.5 * (1.0 + (x - T_MIN) / root))
}

/// Reaction with its stoichiometric counts per species.
#[derive(Clone, Debug)]
struct CompiledReaction {
    reaction: Reaction,
    alpha: Vec<i32>,
    beta: Vec<i32>,
}

/// Finite-rate chemistry evaluator.
#[derive(Clone)]
pub struct ChemistrySource {
    layout: VariableLayout,
    implicit: bool,
    molar_mass: Vec<f64>,
    reactions: Vec<CompiledReaction>,
    conc: Vec<f64>,
    dprod_f: Vec<f64>,
    dprod_b: Vec<f64>,
    dkf: Vec<f64>,
    dkb: Vec<f64>,
    dw: Vec<f64>,
}

impl ChemistrySource {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = source_layout("chemistry", thermo.as_ref(), config)?;
        let ns = layout.n_species();
        let nv = layout.n_var();
        let reactions: Vec<_> = thermo
            .reactions()
            .iter()
            .map(|r| CompiledReaction {
                alpha: (0..ns).map(|s| r.reactant_count(s) as i32).collect(),
                beta: (0..ns).map(|s| r.product_count(s) as i32).collect(),
                reaction: r.clone(),
            })
            .collect();
        if reactions.is_empty() {
            log::debug!("chemistry source built for a mixture without reactions");
        }
        Ok(Self {
            layout,
            implicit: config.implicit,
            molar_mass: thermo.species().iter().map(|s| s.molar_mass).collect(),
            reactions,
            conc: vec![0.0; ns],
            dprod_f: vec![0.0; ns],
            dprod_b: vec![0.0; ns],
            dkf: vec![0.0; nv],
            dkb: vec![0.0; nv],
            dw: vec![0.0; nv],
        })
    }

    /// Number of reactions evaluated.
    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// Concentration product Π c_s^n_s and its derivatives with respect to ρ_s.
    fn rate_law(conc: &[f64], molar_mass: &[f64], counts: &[i32], dprod: &mut [f64]) -> f64 {
        let ns = conc.len();
        let mut prod = 1.0;
        for s in 0..ns {
            prod *= conc[s].powi(counts[s]);
        }
        for s in 0..ns {
            let mut d = TO_MOL_PER_CM3 * counts[s] as f64 / molar_mass[s]
                * conc[s].powi((counts[s] - 1).max(0));
            for j in (0..ns).filter(|&j| j != s) {
                d *= conc[j].powi(counts[j]);
            }
            dprod[s] = d;
        }
        prod
    }
}

impl SourceTerm for ChemistrySource {
    fn compute(&mut self, cell: &CellInputs<'_>, out: &mut SourceOutput) -> Result<()> {
        let layout = self.layout;
        cell.validate(&layout)?;
        let ns = layout.n_species();
        let nv = layout.n_var();
        let ev = layout.eve();
        let t = cell.v[layout.t()];
        let tve = cell.v[layout.tve()];
        let volume = cell.volume;

        out.residual.fill(0.0);
        if self.implicit {
            linalg::zero(&mut out.jacobian);
        }

        let mut n_mix = 0.0;
        for s in 0..ns {
            self.conc[s] = TO_MOL_PER_CM3 * cell.u[s] / self.molar_mass[s];
            n_mix += cell.v[s] / self.molar_mass[s] * AVOGADRO;
        }
        n_mix *= TO_PER_CM3;

        for rxn in &self.reactions {
            let reaction = &rxn.reaction;
            let trxn_f = reaction.forward_temperature.evaluate(t, tve);
            let trxn_b = reaction.backward_temperature.evaluate(t, tve);
            let (thf, dthf) = smoothed_temperature(trxn_f);
            let (thb, dthb) = smoothed_temperature(trxn_b);

            let coeffs = reaction.equilibrium.coefficients(n_mix);
            let keq = EquilibriumTable::ln_keq(&coeffs, thb).exp();
            let kf = reaction.arrhenius.rate(thf);
            let kb = reaction.arrhenius.rate(thb) / keq;

            let prod_f = Self::rate_law(&self.conc, &self.molar_mass, &rxn.alpha, &mut self.dprod_f);
            let prod_b = Self::rate_law(&self.conc, &self.molar_mass, &rxn.beta, &mut self.dprod_b);
            let w = 1e3 * (kf * prod_f - kb * prod_b);

            for s in 0..ns {
                let net = (rxn.beta[s] - rxn.alpha[s]) as f64;
                if net != 0.0 {
                    let rate = net * self.molar_mass[s] * w * volume;
                    out.residual[s] += rate;
                    out.residual[ev] += rate * cell.eve[s];
                }
            }

            if !self.implicit {
                continue;
            }

            // Rate coefficients through the smoothed temperatures
            let ft = &reaction.forward_temperature;
            let bt = &reaction.backward_temperature;
            let cf = kf * reaction.arrhenius.log_derivative(thf) * dthf;
            let cb = kb
                * (reaction.arrhenius.log_derivative(thb)
                    - EquilibriumTable::dln_keq_dt(&coeffs, thb))
                * dthb;
            for k in 0..nv {
                let dtrxn_f = ft.t_exponent * trxn_f / t * cell.dtdu[k]
                    + ft.tve_exponent * trxn_f / tve * cell.dtvedu[k];
                let dtrxn_b = bt.t_exponent * trxn_b / t * cell.dtdu[k]
                    + bt.tve_exponent * trxn_b / tve * cell.dtvedu[k];
                self.dkf[k] = cf * dtrxn_f;
                self.dkb[k] = cb * dtrxn_b;
            }

            // Keq through the density regime of the table
            let slopes = reaction.equilibrium.coefficient_slopes(n_mix);
            let basis = EquilibriumTable::ln_keq_basis(thb);
            let dln_keq_dn: f64 = slopes.iter().zip(&basis).map(|(a, b)| a * b).sum();
            for s in 0..ns {
                self.dkb[s] -= kb * dln_keq_dn * AVOGADRO * TO_PER_CM3 / self.molar_mass[s];
            }

            for k in 0..nv {
                self.dw[k] = 1e3 * (self.dkf[k] * prod_f - self.dkb[k] * prod_b);
            }
            for s in 0..ns {
                self.dw[s] += 1e3 * (kf * self.dprod_f[s] - kb * self.dprod_b[s]);
            }

            for s in 0..ns {
                let net = (rxn.beta[s] - rxn.alpha[s]) as f64;
                if net == 0.0 {
                    continue;
                }
                let scale = net * self.molar_mass[s] * volume;
                for k in 0..nv {
                    out.jacobian[(s, k)] += scale * self.dw[k];
                    out.jacobian[(ev, k)] += scale
                        * (self.dw[k] * cell.eve[s] + w * cell.cvve[s] * cell.dtvedu[k]);
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chemistry"
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

    fn setup(implicit: bool) -> (Arc<TwoTemperatureGas>, ChemistrySource) {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        let config = NumericsConfig::new(2).with_implicit(implicit);
        let chem = ChemistrySource::new(gas.clone(), &config).unwrap();
        (gas, chem)
    }

    #[test]
    fn test_smoothed_temperature() {
        let (low, dlow) = smoothed_temperature(100.0);
        assert!((low - T_MIN).abs() < 5.0);
        assert!(dlow < 0.01);
        let (high, dhigh) = smoothed_temperature(10_000.0);
        assert!((high - 10_000.0).abs() < 1.0);
        assert!((dhigh - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_hot_nitrogen_dissociates_and_conserves_mass() {
        let (gas, mut chem) = setup(false);
        let layout = chem.layout();
        assert_eq!(chem.n_reactions(), 2);
        let state = gas
            .state_from_primitives(layout, &[0.02, 1e-5], 9000.0, 8000.0, &[0.0, 0.0])
            .unwrap();
        let coord = [0.0, 0.0];
        let mut out = SourceOutput::new(layout);
        chem.compute(&CellInputs::from_state(&state, &coord, 2.0), &mut out)
            .unwrap();

        assert!(out.residual[0] < 0.0, "N2 is consumed");
        assert!(out.residual[1] > 0.0, "N is produced");
        let total = out.residual[0] + out.residual[1];
        assert!(total.abs() < 1e-12 * out.residual[0].abs());
        // Momentum and total energy are untouched
        for k in layout.momentum()..layout.eve() {
            assert_eq!(out.residual[k], 0.0);
        }
    }

    #[test]
    fn test_residual_scales_with_volume() {
        let (gas, mut chem) = setup(false);
        let layout = chem.layout();
        let state = gas
            .state_from_primitives(layout, &[0.02, 0.002], 7000.0, 6000.0, &[0.0, 0.0])
            .unwrap();
        let coord = [0.0, 0.0];
        let mut a = SourceOutput::new(layout);
        let mut b = SourceOutput::new(layout);
        chem.compute(&CellInputs::from_state(&state, &coord, 1.0), &mut a)
            .unwrap();
        chem.compute(&CellInputs::from_state(&state, &coord, 3.0), &mut b)
            .unwrap();
        for k in 0..layout.n_var() {
            assert!((b.residual[k] - 3.0 * a.residual[k]).abs() <= 1e-12 * b.residual[k].abs());
        }
    }

    #[test]
    fn test_rate_law_derivative_with_repeated_species() {
        // N + N: d(c²)/dρ = 2c·10⁻³/M
        let conc = [0.5, 2.0];
        let mm = [28.0, 14.0];
        let mut d = [0.0; 2];
        let prod = ChemistrySource::rate_law(&conc, &mm, &[0, 2], &mut d);
        assert!((prod - 4.0).abs() < 1e-14);
        assert_eq!(d[0], 0.0);
        assert!((d[1] - 2.0 * 2.0 * TO_MOL_PER_CM3 / 14.0).abs() < 1e-15);
    }
}
