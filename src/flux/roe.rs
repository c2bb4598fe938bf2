//! Roe approximate Riemann solver for the two-temperature Euler system.
//!
//! The face flux is
//!
//! F* = ½(F_i + F_j)·n − ½·|A|·(U_j − U_i)·Area,   |A| = P·|Λ|·P⁻¹,
//!
//! with the eigenstructure built at the density-weighted (Roe) average of
//! the two states and Harten-Hyman regularization of |Λ|.

use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::error::Result;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::eigen::{create_basis, eigenvalues, entropy_fix, p_matrix, p_matrix_inv};
use super::projected::{inviscid_proj_flux, inviscid_proj_jacobian};
use super::traits::{ConvectiveFlux, FaceGeometry, FaceInputs, FluxOutput, scheme_layout};

/// Roe flux evaluator.
#[derive(Clone)]
pub struct RoeFlux {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    roe_u: Vec<f64>,
    roe_v: Vec<f64>,
    roe_eve: Vec<f64>,
    roe_dpdu: Vec<f64>,
    flux_i: Vec<f64>,
    flux_j: Vec<f64>,
    diff_u: Vec<f64>,
    lambda: Vec<f64>,
    p: Mat<f64>,
    p_inv: Mat<f64>,
    dissipation: Mat<f64>,
}

impl RoeFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout("Roe", thermo.as_ref(), config)?;
        let nv = layout.n_var();
        Ok(Self {
            roe_u: vec![0.0; nv],
            roe_v: vec![0.0; layout.n_prim_var()],
            roe_eve: vec![0.0; layout.n_species()],
            roe_dpdu: vec![0.0; nv],
            flux_i: vec![0.0; nv],
            flux_j: vec![0.0; nv],
            diff_u: vec![0.0; nv],
            lambda: vec![0.0; nv],
            p: Mat::zeros(nv, nv),
            p_inv: Mat::zeros(nv, nv),
            dissipation: Mat::zeros(nv, nv),
            thermo,
            layout,
            implicit: config.implicit,
        })
    }

    /// Build the Roe state: averaged U and V (sound speed included), then
    /// vibrational energies and pressure derivatives at the averaged Tve.
    fn roe_average(&mut self, face: &FaceInputs<'_>) {
        let layout = &self.layout;
        let rho = layout.rho();
        let r = (face.v_j[rho] / face.v_i[rho]).abs().sqrt();

        for (k, x) in self.roe_u.iter_mut().enumerate() {
            *x = (r * face.u_j[k] + face.u_i[k]) / (r + 1.0);
        }
        for (k, x) in self.roe_v.iter_mut().enumerate() {
            *x = (r * face.v_j[k] + face.v_i[k]) / (r + 1.0);
        }

        self.thermo
            .vib_energies(self.roe_v[layout.tve()], &mut self.roe_eve);
        self.thermo
            .pressure_derivatives(layout, &self.roe_v, &self.roe_eve, &mut self.roe_dpdu);
    }
}

impl ConvectiveFlux for RoeFlux {
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        let layout = self.layout;
        let nv = layout.n_var();
        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();

        self.roe_average(face);
        let (l, m) = create_basis(n);

        inviscid_proj_flux(&layout, face.u_i, face.v_i, face.normal, &mut self.flux_i);
        inviscid_proj_flux(&layout, face.u_j, face.v_j, face.normal, &mut self.flux_j);

        p_matrix(&layout, &self.roe_u, &self.roe_v, &self.roe_dpdu, n, &l, &m, &mut self.p);
        p_matrix_inv(&layout, &self.roe_u, &self.roe_v, &self.roe_dpdu, n, &l, &m, &mut self.p_inv);

        let q = layout.projected_velocity(&self.roe_v, n);
        let q_i = layout.projected_velocity(face.v_i, n);
        let q_j = layout.projected_velocity(face.v_j, n);
        let a_i = face.v_i[layout.a()];
        let a_j = face.v_j[layout.a()];
        eigenvalues(&layout, q, self.roe_v[layout.a()], &mut self.lambda);

        // Harten-Hyman bounds: one shared by the convective waves, one per acoustic wave
        let plus = layout.n_species() + layout.n_dim() - 1;
        let minus = plus + 1;
        let eps_q = 4.0 * 0.0_f64.max(q - q_i).max(q_j - q);
        let eps_plus = 4.0
            * 0.0_f64
                .max(self.lambda[plus] - (q_i + a_i))
                .max((q_j + a_j) - self.lambda[plus]);
        let eps_minus = 4.0
            * 0.0_f64
                .max(self.lambda[minus] - (q_i - a_i))
                .max((q_j - a_j) - self.lambda[minus]);
        for (k, lambda) in self.lambda.iter_mut().enumerate() {
            let eps = if k == plus {
                eps_plus
            } else if k == minus {
                eps_minus
            } else {
                eps_q
            };
            *lambda = entropy_fix(*lambda, eps);
        }

        crate::linalg::similarity(&self.p, &self.lambda, &self.p_inv, &mut self.dissipation);

        for k in 0..nv {
            self.diff_u[k] = face.u_j[k] - face.u_i[k];
        }
        for i in 0..nv {
            let mut damping = 0.0;
            for j in 0..nv {
                damping += self.dissipation[(i, j)] * self.diff_u[j];
            }
            out.residual[i] = 0.5 * (self.flux_i[i] + self.flux_j[i]) - 0.5 * damping * geo.area;
        }

        if self.implicit {
            // Central part from the exact Jacobians, dissipation added with opposite signs
            inviscid_proj_jacobian(
                &layout,
                face.u_i,
                face.v_i,
                face.dpdu_i,
                face.normal,
                0.5,
                &mut out.jacobian_i,
            );
            inviscid_proj_jacobian(
                &layout,
                face.u_j,
                face.v_j,
                face.dpdu_j,
                face.normal,
                0.5,
                &mut out.jacobian_j,
            );
            for i in 0..nv {
                for j in 0..nv {
                    let d = 0.5 * self.dissipation[(i, j)] * geo.area;
                    out.jacobian_i[(i, j)] += d;
                    out.jacobian_j[(i, j)] -= d;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "roe"
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
    use crate::thermo::{GasState, TwoTemperatureGas};

    const TOL: f64 = 1e-9;

    fn setup(implicit: bool) -> (Arc<TwoTemperatureGas>, RoeFlux, VariableLayout) {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        let config = NumericsConfig::new(2).with_implicit(implicit);
        let roe = RoeFlux::new(gas.clone(), &config).unwrap();
        let layout = roe.layout();
        (gas, roe, layout)
    }

    fn states(gas: &TwoTemperatureGas, layout: VariableLayout) -> (GasState, GasState) {
        let left = gas
            .state_from_primitives(layout, &[0.02, 0.002], 6000.0, 4000.0, &[3000.0, 200.0])
            .unwrap();
        let right = gas
            .state_from_primitives(layout, &[0.012, 0.004], 4500.0, 3500.0, &[2600.0, -100.0])
            .unwrap();
        (left, right)
    }

    #[test]
    fn test_uniform_state_gives_physical_flux() {
        let (gas, mut roe, layout) = setup(false);
        let (left, _) = states(&gas, layout);
        let normal = [0.3, 0.4];
        let mut out = FluxOutput::new(layout);
        roe.compute(&FaceInputs::from_states(&left, &left, &normal), &mut out);

        let mut exact = vec![0.0; layout.n_var()];
        inviscid_proj_flux(&layout, &left.u, &left.v, &normal, &mut exact);
        for k in 0..layout.n_var() {
            assert!((out.residual[k] - exact[k]).abs() < TOL * exact[k].abs().max(1.0));
        }
    }

    #[test]
    fn test_roe_state_sound_speed() {
        let (gas, mut roe, layout) = setup(false);
        let (left, right) = states(&gas, layout);
        roe.roe_average(&FaceInputs::from_states(&left, &right, &[1.0, 0.0]));
        let r = (right.v[layout.rho()] / left.v[layout.rho()]).sqrt();
        let expected = (r * right.sound_speed() + left.sound_speed()) / (r + 1.0);
        let a = roe.roe_v[layout.a()];
        assert!((a - expected).abs() < 1e-12 * expected);
        // Density weighting lies between the two sides
        let t = roe.roe_v[layout.t()];
        assert!(t < 6000.0 && t > 4500.0);
    }

    #[test]
    fn test_jacobian_blocks_sum_to_flux_jacobian_difference() {
        let (gas, mut roe, layout) = setup(true);
        let (left, right) = states(&gas, layout);
        let normal = [0.6, -0.8];
        let mut out = FluxOutput::new(layout);
        roe.compute(&FaceInputs::from_states(&left, &right, &normal), &mut out);

        // J_i + J_j = ½(A_i + A_j): the dissipation cancels
        let nv = layout.n_var();
        let mut a_i = Mat::zeros(nv, nv);
        let mut a_j = Mat::zeros(nv, nv);
        inviscid_proj_jacobian(&layout, &left.u, &left.v, &left.dpdu, &normal, 0.5, &mut a_i);
        inviscid_proj_jacobian(&layout, &right.u, &right.v, &right.dpdu, &normal, 0.5, &mut a_j);
        for i in 0..nv {
            for j in 0..nv {
                let sum = out.jacobian_i[(i, j)] + out.jacobian_j[(i, j)];
                let expected = a_i[(i, j)] + a_j[(i, j)];
                assert!((sum - expected).abs() < 1e-8 * expected.abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_explicit_mode_leaves_blocks_untouched() {
        let (gas, mut roe, layout) = setup(false);
        let (left, right) = states(&gas, layout);
        let mut out = FluxOutput::new(layout);
        out.jacobian_i[(0, 0)] = 7.0;
        roe.compute(&FaceInputs::from_states(&left, &right, &[1.0, 0.0]), &mut out);
        assert_eq!(out.jacobian_i[(0, 0)], 7.0);
    }
}
