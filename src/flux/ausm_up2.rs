//! AUSM+-up2: AUSM with a common interface sound speed, low-Mach pressure
//! diffusion and velocity diffusion in the pressure flux.
//!
//! The interface speed is a_F = min(Ĉ_L, Ĉ_R), with
//! C* = sqrt(2(γ − 1)/(γ + 1)·H), Ĉ_L = C*_L²/max(C*_L, q_i) and
//! Ĉ_R = C*_R²/max(C*_R, −q_j). Both face Mach numbers are taken against
//! a_F, and so is the convective vector.

use std::sync::Arc;

use crate::config::{AusmUp2Params, NumericsConfig};
use crate::error::Result;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::ausm::{AusmJacobian, AusmSide, FaceSide};
use super::traits::{ConvectiveFlux, FaceGeometry, FaceInputs, FluxOutput, scheme_layout};

/// Pressure-diffusion coefficient.
const KP: f64 = 0.25;
/// Pressure-diffusion Mach scaling.
const SIGMA: f64 = 1.0;
/// Fourth-order Mach split coefficient.
const BETA: f64 = 0.125;

/// Interface quantities of one AUSM+-up2 evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterfaceState {
    /// Interface sound speed.
    pub a_f: f64,
    /// Left and right face Mach numbers.
    pub m_l: f64,
    pub m_r: f64,
    /// Interface Mach number, pressure diffusion included.
    pub m_f: f64,
    /// Interface pressure, velocity diffusion included.
    pub p_f: f64,
}

/// AUSM+-up2 flux evaluator.
#[derive(Clone)]
pub struct AusmUp2Flux {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    params: AusmUp2Params,
    fc_l: Vec<f64>,
    fc_r: Vec<f64>,
    work: AusmJacobian,
}

impl AusmUp2Flux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout("AUSM+-up2", thermo.as_ref(), config)?;
        Ok(Self {
            fc_l: vec![0.0; layout.n_var()],
            fc_r: vec![0.0; layout.n_var()],
            work: AusmJacobian::new(&layout),
            params: config.ausm_up2,
            thermo,
            layout,
            implicit: config.implicit,
        })
    }

    /// Sound speed, Mach numbers and pressure at the interface.
    pub fn interface(&self, face: &FaceInputs<'_>) -> InterfaceState {
        let layout = &self.layout;
        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();
        let gamma = self.params.gamma;
        let mach_inf = self.params.mach_inf;

        let q_i = layout.projected_velocity(face.v_i, n);
        let q_j = layout.projected_velocity(face.v_j, n);
        let rho_i = face.v_i[layout.rho()];
        let rho_j = face.v_j[layout.rho()];
        let p_i = face.v_i[layout.p()];
        let p_j = face.v_j[layout.p()];

        let c_star = |h: f64| (2.0 * (gamma - 1.0) / (gamma + 1.0) * h).sqrt();
        let c_star_l = c_star(face.v_i[layout.h()]);
        let c_star_r = c_star(face.v_j[layout.h()]);
        let c_hat_l = c_star_l * c_star_l / c_star_l.max(q_i);
        let c_hat_r = c_star_r * c_star_r / c_star_r.max(-q_j);
        let a_f = c_hat_l.min(c_hat_r);

        let m_l = q_i / a_f;
        let m_r = q_j / a_f;

        let rho_f = 0.5 * (rho_i + rho_j);
        let mf_sq = 0.5 * (m_l * m_l + m_r * m_r);
        let mref_sq = mf_sq.max(mach_inf * mach_inf).min(1.0);
        let fa = 2.0 * mref_sq.sqrt() - mref_sq;
        let alpha = 3.0 / 16.0 * (-4.0 + 5.0 * fa * fa);

        let m_p = -(KP / fa) * (1.0 - SIGMA * mf_sq).max(0.0) * (p_j - p_i) / (rho_f * a_f * a_f);

        let m_lp = if m_l.abs() <= 1.0 {
            0.25 * (m_l + 1.0).powi(2) + BETA * (m_l * m_l - 1.0).powi(2)
        } else {
            0.5 * (m_l + m_l.abs())
        };
        let m_rm = if m_r.abs() <= 1.0 {
            -0.25 * (m_r - 1.0).powi(2) - BETA * (m_r * m_r - 1.0).powi(2)
        } else {
            0.5 * (m_r - m_r.abs())
        };
        let m_f = m_lp + m_rm + m_p;

        let p_lp = if m_l.abs() <= 1.0 {
            0.25 * (m_l + 1.0).powi(2) * (2.0 - m_l) + alpha * m_l * (m_l * m_l - 1.0).powi(2)
        } else {
            0.5 * (m_l + m_l.abs()) / m_l
        };
        let p_rm = if m_r.abs() <= 1.0 {
            0.25 * (m_r - 1.0).powi(2) * (2.0 + m_r) - alpha * m_r * (m_r * m_r - 1.0).powi(2)
        } else {
            0.5 * (m_r - m_r.abs()) / m_r
        };

        let sq_vel = 0.5 * (layout.velocity_squared(face.v_i) + layout.velocity_squared(face.v_j));
        let p_fi = sq_vel.sqrt() * (p_lp + p_rm - 1.0) * rho_f * a_f;
        let p_f = 0.5 * (p_i + p_j) + 0.5 * (p_lp - p_rm) * (p_i - p_j) + p_fi;

        InterfaceState {
            a_f,
            m_l,
            m_r,
            m_f,
            p_f,
        }
    }
}

impl ConvectiveFlux for AusmUp2Flux {
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        let layout = self.layout;
        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();
        let area = geo.area;

        let state = self.interface(face);
        let m_f = state.m_f;
        let mf_plus = 0.5 * (m_f + m_f.abs());
        let mf_minus = 0.5 * (m_f - m_f.abs());

        let left = AusmSide::left(face, state.a_f);
        let right = AusmSide::right(face, state.a_f);
        left.convective_vector(&layout, &mut self.fc_l);
        right.convective_vector(&layout, &mut self.fc_r);

        for k in 0..layout.n_var() {
            out.residual[k] = (mf_plus * self.fc_l[k] + mf_minus * self.fc_r[k]) * area;
        }
        for d in 0..layout.n_dim() {
            out.residual[layout.momentum() + d] += state.p_f * n[d] * area;
        }

        if self.implicit {
            // AUSM linearization at the frozen interface speed
            crate::linalg::zero(&mut out.jacobian_i);
            crate::linalg::zero(&mut out.jacobian_j);
            let fc_upwind = if m_f >= 0.0 { &self.fc_l } else { &self.fc_r };
            self.work.accumulate(
                self.thermo.as_ref(),
                &layout,
                FaceSide::Left,
                &left,
                n,
                state.m_l,
                m_f,
                &self.fc_l,
                fc_upwind,
                &mut out.jacobian_i,
            );
            self.work.accumulate(
                self.thermo.as_ref(),
                &layout,
                FaceSide::Right,
                &right,
                n,
                state.m_r,
                m_f,
                &self.fc_r,
                fc_upwind,
                &mut out.jacobian_j,
            );
            crate::linalg::scale(&mut out.jacobian_i, area);
            crate::linalg::scale(&mut out.jacobian_j, area);
        }
    }

    fn name(&self) -> &'static str {
        "ausm+up2"
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

    fn setup(config: NumericsConfig) -> (Arc<TwoTemperatureGas>, AusmUp2Flux) {
        let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
        let flux = AusmUp2Flux::new(gas.clone(), &config).unwrap();
        (gas, flux)
    }

    #[test]
    fn test_uniform_state_gives_physical_flux() {
        let (gas, mut flux) = setup(NumericsConfig::new(3).with_implicit(true));
        let layout = flux.layout();
        let st = gas
            .state_from_primitives(layout, &[0.02, 0.003], 1500.0, 1200.0, &[300.0, 20.0, -50.0])
            .unwrap();
        let normal = [0.2, -0.1, 0.4];
        let face = FaceInputs::from_states(&st, &st, &normal);
        let state = flux.interface(&face);
        assert!((state.p_f - st.pressure()).abs() < 1e-9 * st.pressure());

        let mut out = FluxOutput::new(layout);
        flux.compute(&face, &mut out);
        let mut exact = vec![0.0; layout.n_var()];
        inviscid_proj_flux(&layout, &st.u, &st.v, &normal, &mut exact);
        for k in 0..layout.n_var() {
            assert!((out.residual[k] - exact[k]).abs() < 1e-9 * exact[k].abs().max(1.0));
        }
    }

    #[test]
    fn test_interface_speed_bounded_by_critical_speed() {
        let (gas, flux) = setup(NumericsConfig::new(2));
        let layout = flux.layout();
        let left = gas
            .state_from_primitives(layout, &[0.01, 0.001], 800.0, 800.0, &[100.0, 0.0])
            .unwrap();
        let right = gas
            .state_from_primitives(layout, &[0.012, 0.001], 700.0, 700.0, &[80.0, 0.0])
            .unwrap();
        let state = flux.interface(&FaceInputs::from_states(&left, &right, &[1.0, 0.0]));
        let c_star_l = (2.0 * 0.4 / 2.4 * left.v[layout.h()]).sqrt();
        assert!(state.a_f > 0.0 && state.a_f <= c_star_l);
        assert!(state.m_l > 0.0 && state.m_l < 1.0);
    }

    #[test]
    fn test_supersonic_face_takes_left_flux() {
        let (gas, mut flux) = setup(NumericsConfig::new(2));
        let layout = flux.layout();
        let left = gas
            .state_from_primitives(layout, &[0.01, 0.002], 1000.0, 1000.0, &[7000.0, 0.0])
            .unwrap();
        let right = gas
            .state_from_primitives(layout, &[0.012, 0.002], 1100.0, 1000.0, &[6800.0, 0.0])
            .unwrap();
        let normal = [1.0, 0.0];
        let mut out = FluxOutput::new(layout);
        flux.compute(&FaceInputs::from_states(&left, &right, &normal), &mut out);

        let mut exact = vec![0.0; layout.n_var()];
        inviscid_proj_flux(&layout, &left.u, &left.v, &normal, &mut exact);
        for k in 0..layout.n_var() {
            assert!((out.residual[k] - exact[k]).abs() < 1e-9 * exact[k].abs().max(1.0));
        }
    }
}
