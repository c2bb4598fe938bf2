//! AUSMPW+: AUSM with pressure-based weight functions.
//!
//! The interface sound speed comes from the normal total enthalpy
//! H_n = ½(H_i − ½|u_t,i|² + H_j − ½|u_t,j|²) and the local translational
//! specific-heat ratios; the split Mach numbers are then reweighted by
//! w = 1 − min(P_i/P_j, P_j/P_i)³ and f = P/(P⁺ + P⁻) − 1 so that
//! oscillations near walls and shocks are damped.
//!
//! The Jacobian freezes the interface sound speed and the weights w and f.
//!
//! In [`AusmPwInputs::AsShipped`] mode face velocities and pressures are
//! zeroed before use, which makes the scheme produce non-finite fluxes;
//! [`AusmPwInputs::Restored`] reads them from the primitive vectors.

use std::sync::Arc;

use crate::config::{AusmPwInputs, NumericsConfig};
use crate::error::Result;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::traits::{ConvectiveFlux, FaceGeometry, FaceInputs, FluxOutput, scheme_layout};

const ALPHA: f64 = 3.0 / 16.0;

/// Relative density jump below which the ratio of specific heats is averaged.
const DENSITY_JUMP: f64 = 1e-3;

/// Velocity and pressure of one side, as seen by the scheme.
#[derive(Clone, Copy)]
struct SideState {
    vel: [f64; 3],
    p: f64,
    q: f64,
    sq_tangential: f64,
}

/// Fc = [ρ_s, ρu, ρH, ρEve].
fn convective_vector(
    layout: &VariableLayout,
    u: &[f64],
    v: &[f64],
    side: &SideState,
    fc: &mut [f64],
) {
    let rho = v[layout.rho()];
    for s in 0..layout.n_species() {
        fc[s] = v[layout.rhos() + s];
    }
    for d in 0..layout.n_dim() {
        fc[layout.momentum() + d] = rho * side.vel[d];
    }
    fc[layout.energy()] = rho * v[layout.h()];
    fc[layout.eve()] = u[layout.eve()];
}

/// AUSMPW+ flux evaluator.
#[derive(Clone)]
pub struct AusmPwPlusFlux {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    inputs: AusmPwInputs,
    fc_l: Vec<f64>,
    fc_r: Vec<f64>,
    dm_lp: Vec<f64>,
    dm_rm: Vec<f64>,
    dp_lp: Vec<f64>,
    dp_rm: Vec<f64>,
}

impl AusmPwPlusFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout("AUSMPW+", thermo.as_ref(), config)?;
        if config.ausmpw_inputs == AusmPwInputs::AsShipped {
            log::warn!(
                "AUSMPW+ built with zeroed face velocities and pressures, fluxes will not be finite"
            );
        }
        let nv = layout.n_var();
        Ok(Self {
            fc_l: vec![0.0; nv],
            fc_r: vec![0.0; nv],
            dm_lp: vec![0.0; nv],
            dm_rm: vec![0.0; nv],
            dp_lp: vec![0.0; nv],
            dp_rm: vec![0.0; nv],
            inputs: config.ausmpw_inputs,
            thermo,
            layout,
            implicit: config.implicit,
        })
    }

    pub fn inputs(&self) -> AusmPwInputs {
        self.inputs
    }

    fn side_state(&self, v: &[f64], n: &[f64]) -> SideState {
        let layout = &self.layout;
        let nd = layout.n_dim();
        let mut vel = [0.0; 3];
        let mut p = 0.0;
        if self.inputs == AusmPwInputs::Restored {
            for (d, x) in vel.iter_mut().take(nd).enumerate() {
                *x = v[layout.vel() + d];
            }
            p = v[layout.p()];
        }
        let q: f64 = (0..nd).map(|d| vel[d] * n[d]).sum();
        let sq_tangential = (0..nd).map(|d| (vel[d] - q * n[d]).powi(2)).sum();
        SideState {
            vel,
            p,
            q,
            sq_tangential,
        }
    }

    /// Translational-rotational ratio of specific heats ρR/(ρCv_tr + ρCv_ve) + 1.
    fn gamma_tr(&self, v: &[f64]) -> f64 {
        let layout = &self.layout;
        let rho_r: f64 = (0..layout.n_species())
            .map(|s| v[layout.rhos() + s] * self.thermo.gas_constant(s))
            .sum();
        rho_r / (v[layout.rho_cvtr()] + v[layout.rho_cvve()]) + 1.0
    }
}

impl ConvectiveFlux for AusmPwPlusFlux {
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        let layout = self.layout;
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let nv = layout.n_var();
        let mom = layout.momentum();
        let e = layout.energy();
        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();
        let area = geo.area;

        let left = self.side_state(face.v_i, n);
        let right = self.side_state(face.v_j, n);
        let rho_i = face.v_i[layout.rho()];
        let rho_j = face.v_j[layout.rho()];
        let (p_i, p_j) = (left.p, right.p);

        // Interface sound speed
        let h_norm = 0.5
            * (face.v_i[layout.h()] - 0.5 * left.sq_tangential + face.v_j[layout.h()]
                - 0.5 * right.sq_tangential);
        let g_i = self.gamma_tr(face.v_i);
        let g_j = self.gamma_tr(face.v_j);
        let a_tl = if (rho_i - rho_j).abs() / (0.5 * (rho_i + rho_j)) < DENSITY_JUMP {
            let gam = 0.5 * (g_i + g_j);
            (2.0 * h_norm * (gam - 1.0) / (gam + 1.0)).sqrt()
        } else {
            let num = (g_i - 1.0) / (g_i * rho_i) - (g_j - 1.0) / (g_j * rho_j);
            let den = (g_j + 1.0) / (g_j * rho_i) - (g_i + 1.0) / (g_i * rho_j);
            (2.0 * h_norm * num / den).sqrt()
        };
        let q_upwind = if 0.5 * (left.q + right.q) >= 0.0 {
            left.q
        } else {
            right.q
        };
        let aij = a_tl * a_tl / q_upwind.abs().max(a_tl);

        // Split Mach numbers and pressures
        let m_l = left.q / aij;
        let m_r = right.q / aij;
        let subsonic_l = m_l.abs() <= 1.0;
        let subsonic_r = m_r.abs() <= 1.0;
        let (m_lp, p_lp) = if subsonic_l {
            (
                0.25 * (m_l + 1.0).powi(2),
                p_i * (0.25 * (m_l + 1.0).powi(2) * (2.0 - m_l)
                    + ALPHA * m_l * (m_l * m_l - 1.0).powi(2)),
            )
        } else {
            (0.5 * (m_l + m_l.abs()), p_i * 0.5 * (m_l + m_l.abs()) / m_l)
        };
        let (m_rm, p_rm) = if subsonic_r {
            (
                -0.25 * (m_r - 1.0).powi(2),
                p_j * (0.25 * (m_r - 1.0).powi(2) * (2.0 + m_r)
                    - ALPHA * m_r * (m_r * m_r - 1.0).powi(2)),
            )
        } else {
            (0.5 * (m_r - m_r.abs()), p_j * 0.5 * (m_r - m_r.abs()) / m_r)
        };

        // Pressure-based weights
        let w = 1.0 - (p_i / p_j).min(p_j / p_i).powi(3);
        let ps = p_lp + p_rm;
        let f_l = if m_l.abs() < 1.0 { p_i / ps - 1.0 } else { 0.0 };
        let f_r = if m_r.abs() < 1.0 { p_j / ps - 1.0 } else { 0.0 };

        // Modified Mach functions and their slopes in M⁺(m_L) and M⁻(m_R) at frozen w, f
        let m_f = m_lp + m_rm;
        let (mb_lp, mb_rm, lp_from_l, rm_from_l, lp_from_r, rm_from_r) = if m_f >= 0.0 {
            let c = (1.0 - w) * (1.0 + f_r) - f_l;
            (
                m_lp + m_rm * c,
                m_rm * w * (1.0 + f_r),
                1.0,
                0.0,
                c,
                w * (1.0 + f_r),
            )
        } else {
            let c = (1.0 - w) * (1.0 + f_l) + f_l - f_r;
            (
                m_lp * w * (1.0 + f_l),
                m_rm + m_lp * c,
                w * (1.0 + f_l),
                c,
                0.0,
                1.0,
            )
        };

        convective_vector(&layout, face.u_i, face.v_i, &left, &mut self.fc_l);
        convective_vector(&layout, face.u_j, face.v_j, &right, &mut self.fc_r);
        let (fc_l, fc_r) = (&self.fc_l, &self.fc_r);

        for k in 0..nv {
            out.residual[k] = (mb_lp * fc_l[k] + mb_rm * fc_r[k]) * aij * area;
        }
        for d in 0..nd {
            out.residual[mom + d] += (p_lp + p_rm) * n[d] * area;
        }

        if self.implicit {
            crate::linalg::zero(&mut out.jacobian_i);
            crate::linalg::zero(&mut out.jacobian_j);

            // ∂m/∂U at frozen aij
            for j in 0..nv {
                self.dm_lp[j] = 0.0;
                self.dm_rm[j] = 0.0;
            }
            for s in 0..ns {
                self.dm_lp[s] = -left.q / (rho_i * aij);
                self.dm_rm[s] = -right.q / (rho_j * aij);
            }
            for d in 0..nd {
                self.dm_lp[mom + d] = n[d] / (rho_i * aij);
                self.dm_rm[mom + d] = n[d] / (rho_j * aij);
            }

            // Split pressure derivatives use the unsplit ∂m/∂U
            if subsonic_l {
                let fact = 0.5 * (m_l + 1.0) * (2.0 - m_l) - 0.25 * (m_l + 1.0).powi(2)
                    + ALPHA * (m_l * m_l - 1.0).powi(2)
                    + 4.0 * ALPHA * m_l * m_l * (m_l * m_l - 1.0);
                for j in 0..nv {
                    self.dp_lp[j] = face.dpdu_i[j] * p_lp / p_i + p_i * fact * self.dm_lp[j];
                }
            } else {
                for j in 0..nv {
                    self.dp_lp[j] = face.dpdu_i[j] * 0.5 * (m_l + m_l.abs()) / m_l;
                }
            }
            if subsonic_r {
                let fact = 0.5 * (m_r - 1.0) * (2.0 + m_r) + 0.25 * (m_r - 1.0).powi(2)
                    - ALPHA * (m_r * m_r - 1.0).powi(2)
                    - 4.0 * ALPHA * m_r * m_r * (m_r * m_r - 1.0);
                for j in 0..nv {
                    self.dp_rm[j] = face.dpdu_j[j] * p_rm / p_j + p_j * fact * self.dm_rm[j];
                }
            } else {
                for j in 0..nv {
                    self.dp_rm[j] = face.dpdu_j[j] * 0.5 * (m_r - m_r.abs()) / m_r;
                }
            }

            // Split Mach derivatives
            let slope_l = if subsonic_l {
                0.5 * (m_l + 1.0)
            } else {
                0.5 * (1.0 + m_l.signum())
            };
            let slope_r = if subsonic_r {
                -0.5 * (m_r - 1.0)
            } else {
                0.5 * (1.0 - m_r.signum())
            };
            for j in 0..nv {
                self.dm_lp[j] *= slope_l;
                self.dm_rm[j] *= slope_r;
            }

            for i in 0..nv {
                let conv_l = (lp_from_l * fc_l[i] + rm_from_l * fc_r[i]) * aij * area;
                let conv_r = (lp_from_r * fc_l[i] + rm_from_r * fc_r[i]) * aij * area;
                for j in 0..nv {
                    out.jacobian_i[(i, j)] += self.dm_lp[j] * conv_l;
                    out.jacobian_j[(i, j)] += self.dm_rm[j] * conv_r;
                }
                out.jacobian_i[(i, i)] += mb_lp * aij * area;
                out.jacobian_j[(i, i)] += mb_rm * aij * area;
                out.jacobian_i[(e, i)] += mb_lp * aij * face.dpdu_i[i] * area;
                out.jacobian_j[(e, i)] += mb_rm * aij * face.dpdu_j[i] * area;
                for d in 0..nd {
                    out.jacobian_i[(mom + d, i)] += self.dp_lp[i] * n[d] * area;
                    out.jacobian_j[(mom + d, i)] += self.dp_rm[i] * n[d] * area;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "ausmpw+"
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
    use crate::flux::projected::inviscid_proj_flux;
    use crate::thermo::TwoTemperatureGas;

    fn setup(inputs: AusmPwInputs, implicit: bool) -> (Arc<TwoTemperatureGas>, AusmPwPlusFlux) {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        let config = NumericsConfig::new(2)
            .with_implicit(implicit)
            .with_ausmpw_inputs(inputs);
        let flux = AusmPwPlusFlux::new(gas.clone(), &config).unwrap();
        (gas, flux)
    }

    #[test]
    fn test_as_shipped_mode_is_not_finite() {
        let (gas, mut flux) = setup(AusmPwInputs::AsShipped, false);
        let layout = flux.layout();
        let st = gas
            .state_from_primitives(layout, &[0.01, 0.001], 3000.0, 2500.0, &[800.0, 10.0])
            .unwrap();
        let mut out = FluxOutput::new(layout);
        flux.compute(&FaceInputs::from_states(&st, &st, &[1.0, 0.0]), &mut out);
        assert!(out.residual.iter().any(|r| !r.is_finite()));
    }

    #[test]
    fn test_restored_uniform_state_gives_physical_flux() {
        let (gas, mut flux) = setup(AusmPwInputs::Restored, true);
        let layout = flux.layout();
        let st = gas
            .state_from_primitives(layout, &[0.01, 0.001], 3000.0, 2500.0, &[800.0, 150.0])
            .unwrap();
        let normal = [0.3, -0.2];
        let mut out = FluxOutput::new(layout);
        flux.compute(&FaceInputs::from_states(&st, &st, &normal), &mut out);

        let mut exact = vec![0.0; layout.n_var()];
        inviscid_proj_flux(&layout, &st.u, &st.v, &normal, &mut exact);
        for k in 0..layout.n_var() {
            assert!((out.residual[k] - exact[k]).abs() < 1e-9 * exact[k].abs().max(1.0));
        }
        for i in 0..layout.n_var() {
            for j in 0..layout.n_var() {
                assert!(out.jacobian_i[(i, j)].is_finite());
                assert!(out.jacobian_j[(i, j)].is_finite());
            }
        }
    }

    #[test]
    fn test_supersonic_face_is_fully_upwind() {
        let (gas, mut flux) = setup(AusmPwInputs::Restored, true);
        let layout = flux.layout();
        let left = gas
            .state_from_primitives(layout, &[0.01, 0.001], 1000.0, 1000.0, &[5000.0, 0.0])
            .unwrap();
        let right = gas
            .state_from_primitives(layout, &[0.02, 0.001], 1500.0, 1200.0, &[4800.0, 0.0])
            .unwrap();
        let normal = [2.0, 0.0];
        let mut out = FluxOutput::new(layout);
        flux.compute(&FaceInputs::from_states(&left, &right, &normal), &mut out);

        let mut exact = vec![0.0; layout.n_var()];
        inviscid_proj_flux(&layout, &left.u, &left.v, &normal, &mut exact);
        for k in 0..layout.n_var() {
            assert!((out.residual[k] - exact[k]).abs() < 1e-9 * exact[k].abs().max(1.0));
        }
        // Nothing downstream feeds back into the face
        for i in 0..layout.n_var() {
            for j in 0..layout.n_var() {
                assert_eq!(out.jacobian_j[(i, j)], 0.0);
            }
        }
    }
}
