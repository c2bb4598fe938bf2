//! Axisymmetric geometric source.
//!
//! A 2D solution revolved about the x axis gains the source
//! (ρv/y)·(Y_s, u, v, H, e_ve) with y the radial coordinate of the cell
//! center. Cells on the axis (y = 0) contribute nothing.

use std::sync::Arc;

use crate::config::NumericsConfig;
use crate::error::{Result, Tne2Error};
use crate::linalg;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::traits::{CellInputs, SourceOutput, SourceTerm, source_layout};

#[derive(Clone, Debug)]
pub struct AxisymmetricSource {
    layout: VariableLayout,
    implicit: bool,
    ys: Vec<f64>,
}

impl AxisymmetricSource {
    /// Only two-dimensional layouts have a radial coordinate.
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        if config.n_dim != 2 {
            return Err(Tne2Error::unsupported(format!(
                "axisymmetric source in {} dimensions",
                config.n_dim
            )));
        }
        let layout = source_layout("axisymmetric", thermo.as_ref(), config)?;
        Ok(Self {
            layout,
            implicit: config.implicit,
            ys: vec![0.0; layout.n_species()],
        })
    }
}

impl SourceTerm for AxisymmetricSource {
    fn compute(&mut self, cell: &CellInputs<'_>, out: &mut SourceOutput) -> Result<()> {
        let layout = self.layout;
        cell.validate(&layout)?;
        let ns = layout.n_species();
        let mom = layout.momentum();
        let e = layout.energy();
        let ev = layout.eve();

        let y = cell.coord[1];
        let yinv = if y != 0.0 { 1.0 / y } else { 0.0 };

        let rho = cell.v[layout.rho()];
        let rhou = cell.u[mom];
        let rhov = cell.u[mom + 1];
        let rho_eve = cell.u[ev];
        let h = cell.v[layout.h()];
        for s in 0..ns {
            self.ys[s] = cell.v[s] / rho;
        }

        let scale = yinv * cell.volume;
        for s in 0..ns {
            out.residual[s] = rhov * self.ys[s] * scale;
        }
        out.residual[mom] = rhov * rhou / rho * scale;
        out.residual[mom + 1] = rhov * rhov / rho * scale;
        out.residual[e] = rhov * h * scale;
        out.residual[ev] = rhov * rho_eve / rho * scale;

        if !self.implicit {
            return Ok(());
        }

        let jac = &mut out.jacobian;
        linalg::zero(jac);
        let v = rhov / rho;

        for s in 0..ns {
            for k in 0..ns {
                jac[(s, k)] = -self.ys[s] / rho * rhov;
            }
            jac[(s, s)] += rhov / rho;
            jac[(s, mom + 1)] = self.ys[s];
        }

        for k in 0..ns {
            jac[(mom, k)] = -rhou * rhov / (rho * rho);
            jac[(mom + 1, k)] = -rhov * rhov / (rho * rho);
            jac[(e, k)] = -h * v + cell.dpdu[k] * v;
            jac[(ev, k)] = -rho_eve * rhov / (rho * rho);
        }
        jac[(mom, mom)] = v;
        jac[(mom, mom + 1)] = rhou / rho;
        jac[(mom + 1, mom + 1)] = 2.0 * v;

        // ρH = ρE + P
        jac[(e, mom)] = cell.dpdu[mom] * v;
        jac[(e, mom + 1)] = h + cell.dpdu[mom + 1] * v;
        jac[(e, e)] = (1.0 + cell.dpdu[e]) * v;
        jac[(e, ev)] = cell.dpdu[ev] * v;

        jac[(ev, mom + 1)] = rho_eve / rho;
        jac[(ev, ev)] = v;

        linalg::scale(jac, scale);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "axisymmetric"
    }

    fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn is_implicit(&self) -> bool {
        self.implicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GasConfig;
    use crate::thermo::TwoTemperatureGas;

    fn setup(implicit: bool) -> (Arc<TwoTemperatureGas>, AxisymmetricSource) {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        let config = NumericsConfig::new(2).with_implicit(implicit);
        let axi = AxisymmetricSource::new(gas.clone(), &config).unwrap();
        (gas, axi)
    }

    #[test]
    fn test_rejects_three_dimensions() {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        assert!(matches!(
            AxisymmetricSource::new(gas, &NumericsConfig::new(3)),
            Err(Tne2Error::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_axis_cells_contribute_nothing() {
        let (gas, mut axi) = setup(true);
        let layout = axi.layout();
        let state = gas
            .state_from_primitives(layout, &[0.01, 0.002], 3000.0, 2500.0, &[400.0, 150.0])
            .unwrap();
        let coord = [0.3, 0.0];
        let mut out = SourceOutput::new(layout);
        axi.compute(&CellInputs::from_state(&state, &coord, 1.0), &mut out)
            .unwrap();
        assert!(out.residual.iter().all(|&r| r == 0.0));
        let nv = layout.n_var();
        for i in 0..nv {
            for j in 0..nv {
                assert_eq!(out.jacobian[(i, j)], 0.0);
            }
        }
    }

    #[test]
    fn test_decays_with_radius() {
        let (gas, mut axi) = setup(false);
        let layout = axi.layout();
        let state = gas
            .state_from_primitives(layout, &[0.01, 0.002], 3000.0, 2500.0, &[400.0, 150.0])
            .unwrap();
        let mut near = SourceOutput::new(layout);
        let mut far = SourceOutput::new(layout);
        axi.compute(&CellInputs::from_state(&state, &[0.0, 1.0], 1.0), &mut near)
            .unwrap();
        axi.compute(&CellInputs::from_state(&state, &[0.0, 1e12], 1.0), &mut far)
            .unwrap();

        let rho = state.v[layout.rho()];
        let v = state.v[layout.vel() + 1];
        assert!((near.residual[layout.momentum() + 1] - rho * v * v).abs() < 1e-9 * rho * v * v);
        let rho_v_h = rho * v * state.v[layout.h()];
        assert!((near.residual[layout.energy()] - rho_v_h).abs() < 1e-9 * rho_v_h.abs());
        for k in 0..layout.n_var() {
            assert!(far.residual[k].abs() <= 2e-12 * near.residual[k].abs());
        }
    }
}
