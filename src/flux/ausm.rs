//! Advection Upstream Splitting Method (AUSM).
//!
//! Face Mach numbers use each side's own frozen sound speed,
//! m_L = q_i/a_i and m_R = q_j/a_j, split with the Van Leer polynomials
//!
//! ```text
//! M⁺(m) = ¼(m + 1)²          |m| ≤ 1,   ½(m + |m|) otherwise
//! M⁻(m) = −¼(m − 1)²         |m| ≤ 1,   ½(m − |m|) otherwise
//! P⁺(m) = ¼(m + 1)²(2 − m)   |m| ≤ 1,   ½(m + |m|)/m otherwise
//! P⁻(m) = ¼(m − 1)²(2 + m)   |m| ≤ 1,   ½(m − |m|)/m otherwise
//! ```
//!
//! The flux is ½[(m_F + |m_F|)·Fc_L + (m_F − |m_F|)·Fc_R]·Area + p_F·n·Area
//! with Fc = a·[ρ_s, ρu, ρH, ρEve], m_F = M⁺(m_L) + M⁻(m_R) and
//! p_F = P_i·P⁺(m_L) + P_j·P⁻(m_R).
//!
//! The Jacobian assembly in this module is shared with AUSM+-up2, which
//! runs it with the interface sound speed in place of a_i and a_j.

use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::error::Result;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::traits::{ConvectiveFlux, FaceGeometry, FaceInputs, FluxOutput, scheme_layout};

// =============================================================================
// Split functions
// =============================================================================

/// Split Mach number M⁺.
#[inline]
pub fn mach_plus(m: f64) -> f64 {
    if m.abs() <= 1.0 {
        0.25 * (m + 1.0) * (m + 1.0)
    } else {
        0.5 * (m + m.abs())
    }
}

/// Split Mach number M⁻.
#[inline]
pub fn mach_minus(m: f64) -> f64 {
    if m.abs() <= 1.0 {
        -0.25 * (m - 1.0) * (m - 1.0)
    } else {
        0.5 * (m - m.abs())
    }
}

/// Split pressure weight P⁺ (multiply by the left pressure).
#[inline]
pub fn pressure_plus(m: f64) -> f64 {
    if m.abs() <= 1.0 {
        0.25 * (m + 1.0) * (m + 1.0) * (2.0 - m)
    } else {
        0.5 * (m + m.abs()) / m
    }
}

/// Split pressure weight P⁻ (multiply by the right pressure).
#[inline]
pub fn pressure_minus(m: f64) -> f64 {
    if m.abs() <= 1.0 {
        0.25 * (m - 1.0) * (m - 1.0) * (2.0 + m)
    } else {
        0.5 * (m - m.abs()) / m
    }
}

// =============================================================================
// Shared Jacobian assembly
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FaceSide {
    Left,
    Right,
}

/// One face state together with the sound speed that scales its
/// convective vector.
#[derive(Clone, Copy)]
pub(crate) struct AusmSide<'a> {
    pub u: &'a [f64],
    pub v: &'a [f64],
    pub dpdu: &'a [f64],
    pub a: f64,
}

impl<'a> AusmSide<'a> {
    pub fn left(face: &FaceInputs<'a>, a: f64) -> Self {
        Self {
            u: face.u_i,
            v: face.v_i,
            dpdu: face.dpdu_i,
            a,
        }
    }

    pub fn right(face: &FaceInputs<'a>, a: f64) -> Self {
        Self {
            u: face.u_j,
            v: face.v_j,
            dpdu: face.dpdu_j,
            a,
        }
    }

    /// Fc = a·[ρ_s, ρu, ρH, ρEve].
    pub fn convective_vector(&self, layout: &VariableLayout, fc: &mut [f64]) {
        let ns = layout.n_species();
        let rho = self.v[layout.rho()];
        for s in 0..ns {
            fc[s] = self.v[s] * self.a;
        }
        for d in 0..layout.n_dim() {
            fc[layout.momentum() + d] = rho * self.a * self.v[layout.vel() + d];
        }
        fc[layout.energy()] = rho * self.a * self.v[layout.h()];
        fc[layout.eve()] = self.a * self.u[layout.eve()];
    }
}

/// Scratch vectors of the AUSM Jacobian.
#[derive(Clone, Debug)]
pub(crate) struct AusmJacobian {
    da: Vec<f64>,
    dm: Vec<f64>,
    dp: Vec<f64>,
}

impl AusmJacobian {
    pub fn new(layout: &VariableLayout) -> Self {
        let nv = layout.n_var();
        Self {
            da: vec![0.0; nv],
            dm: vec![0.0; nv],
            dp: vec![0.0; nv],
        }
    }

    /// ∂a/∂U from a² = (1 + β)·P/ρ, with `side.a` in the 1/(2a) prefactor.
    fn sound_speed_derivatives(
        &mut self,
        thermo: &dyn ThermoModel,
        layout: &VariableLayout,
        side: &AusmSide<'_>,
    ) {
        let ns = layout.n_species();
        let rho = side.v[layout.rho()];
        let p = side.v[layout.p()];
        let rho_cvtr = side.v[layout.rho_cvtr()];
        let beta = side.dpdu[layout.energy()];
        let phi = side.dpdu[layout.eve()];
        let p_rho = p / rho;
        let half_inv_a = 0.5 / side.a;

        for s in 0..ns {
            let pressure_part = (1.0 + beta) * (side.dpdu[s] - p_rho) / rho;
            self.da[s] = if thermo.is_electron(s) {
                half_inv_a * pressure_part
            } else {
                let dbeta = (thermo.gas_constant(s) - thermo.translational_cv(s) * beta) / rho_cvtr;
                half_inv_a * (dbeta * p_rho + pressure_part)
            };
        }
        for d in 0..layout.n_dim() {
            self.da[layout.momentum() + d] =
                -half_inv_a / rho * (1.0 + beta) * beta * side.v[layout.vel() + d];
        }
        self.da[layout.energy()] = half_inv_a / rho * (1.0 + beta) * beta;
        self.da[layout.eve()] = half_inv_a / rho * (1.0 + beta) * phi;
    }

    /// Add the unscaled Jacobian block of one side to `jac`.
    ///
    /// The convective part is present only on the upwind side of m_F; the
    /// split-pressure part is present on the upwind side and on both sides
    /// when |m_F| ≤ 1.
    #[allow(clippy::too_many_arguments)]
    pub fn accumulate(
        &mut self,
        thermo: &dyn ThermoModel,
        layout: &VariableLayout,
        face_side: FaceSide,
        side: &AusmSide<'_>,
        n: &[f64],
        m: f64,
        m_f: f64,
        fc: &[f64],
        fc_upwind: &[f64],
        jac: &mut Mat<f64>,
    ) {
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let nv = layout.n_var();
        let mom = layout.momentum();
        let e = layout.energy();
        let ev = layout.eve();

        self.sound_speed_derivatives(thermo, layout, side);

        let a = side.a;
        let rho = side.v[layout.rho()];
        let p = side.v[layout.p()];
        let rho_h = rho * side.v[layout.h()];
        let q = layout.projected_velocity(side.v, n);
        let beta = side.dpdu[e];
        let dpdu = side.dpdu;

        let (convective, pressure) = match face_side {
            FaceSide::Left => (m_f >= 0.0, m_f >= 0.0 || m_f.abs() <= 1.0),
            FaceSide::Right => (m_f < 0.0, m_f < 0.0 || m_f.abs() <= 1.0),
        };

        if convective {
            for i in 0..ns + nd {
                for j in 0..nv {
                    jac[(i, j)] += m_f * fc[i] / a * self.da[j];
                }
                jac[(i, i)] += m_f * a;
            }
            for s in 0..ns {
                jac[(e, s)] += m_f * (dpdu[s] * a + rho_h * self.da[s]);
            }
            for d in 0..nd {
                jac[(e, mom + d)] += m_f * (dpdu[mom + d] * a + rho_h * self.da[mom + d]);
            }
            jac[(e, e)] += m_f * ((1.0 + beta) * a + rho_h * self.da[e]);
            jac[(e, ev)] += m_f * (dpdu[ev] * a + rho_h * self.da[ev]);
            for j in 0..nv {
                jac[(ev, j)] += m_f * fc[ev] / a * self.da[j];
            }
            jac[(ev, ev)] += m_f * a;
        }

        if pressure {
            // ∂m/∂U of m = q/a
            for j in 0..nv {
                self.dm[j] = -q / (a * a) * self.da[j];
            }
            for s in 0..ns {
                self.dm[s] -= q / (rho * a);
            }
            for d in 0..nd {
                self.dm[mom + d] += n[d] / (rho * a);
            }

            let subsonic = m.abs() <= 1.0;
            for j in 0..nv {
                let (dm, dp) = match (face_side, subsonic) {
                    (FaceSide::Left, true) => (
                        0.5 * (m + 1.0) * self.dm[j],
                        0.25 * (m + 1.0)
                            * (dpdu[j] * (m + 1.0) * (2.0 - m) + p * self.dm[j] * (3.0 - 3.0 * m)),
                    ),
                    (FaceSide::Right, true) => (
                        -0.5 * (m - 1.0) * self.dm[j],
                        0.25 * (m - 1.0)
                            * (dpdu[j] * (m - 1.0) * (2.0 + m) + p * self.dm[j] * (3.0 + 3.0 * m)),
                    ),
                    (FaceSide::Left, false) => {
                        let upwind = if m > 1.0 { 1.0 } else { 0.0 };
                        (upwind * self.dm[j], upwind * dpdu[j])
                    }
                    (FaceSide::Right, false) => {
                        let upwind = if m < -1.0 { 1.0 } else { 0.0 };
                        (upwind * self.dm[j], upwind * dpdu[j])
                    }
                };
                self.dm[j] = dm;
                self.dp[j] = dp;
            }

            for i in 0..nv {
                for j in 0..nv {
                    jac[(i, j)] += self.dm[j] * fc_upwind[i];
                }
            }
            for d in 0..nd {
                for j in 0..nv {
                    jac[(mom + d, j)] += self.dp[j] * n[d];
                }
            }
        }
    }
}

// =============================================================================
// AUSM flux
// =============================================================================

/// Baseline AUSM flux evaluator.
#[derive(Clone)]
pub struct AusmFlux {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    fc_l: Vec<f64>,
    fc_r: Vec<f64>,
    work: AusmJacobian,
}

impl AusmFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout("AUSM", thermo.as_ref(), config)?;
        Ok(Self {
            fc_l: vec![0.0; layout.n_var()],
            fc_r: vec![0.0; layout.n_var()],
            work: AusmJacobian::new(&layout),
            thermo,
            layout,
            implicit: config.implicit,
        })
    }
}

impl ConvectiveFlux for AusmFlux {
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        let layout = self.layout;
        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();
        let area = geo.area;

        let left = AusmSide::left(face, face.v_i[layout.a()]);
        let right = AusmSide::right(face, face.v_j[layout.a()]);

        let m_l = layout.projected_velocity(face.v_i, n) / left.a;
        let m_r = layout.projected_velocity(face.v_j, n) / right.a;
        let m_f = mach_plus(m_l) + mach_minus(m_r);
        let p_f = face.v_i[layout.p()] * pressure_plus(m_l) + face.v_j[layout.p()] * pressure_minus(m_r);
        let phi = m_f.abs();

        left.convective_vector(&layout, &mut self.fc_l);
        right.convective_vector(&layout, &mut self.fc_r);

        for k in 0..layout.n_var() {
            out.residual[k] = 0.5 * ((m_f + phi) * self.fc_l[k] + (m_f - phi) * self.fc_r[k]) * area;
        }
        for d in 0..layout.n_dim() {
            out.residual[layout.momentum() + d] += p_f * n[d] * area;
        }

        if self.implicit {
            crate::linalg::zero(&mut out.jacobian_i);
            crate::linalg::zero(&mut out.jacobian_j);
            let fc_upwind = if m_f >= 0.0 { &self.fc_l } else { &self.fc_r };
            self.work.accumulate(
                self.thermo.as_ref(),
                &layout,
                FaceSide::Left,
                &left,
                n,
                m_l,
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
                m_r,
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
        "ausm"
    }

    fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn is_implicit(&self) -> bool {
        self.implicit
    }
}
