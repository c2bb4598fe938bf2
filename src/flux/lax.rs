//! Centered scheme with first-order (Lax) artificial dissipation.
//!
//! F* = ½(F_i + F_j)·n + ε₀·ψ·λ̄·ΔU, where ΔU = U_i − U_j with the energy
//! entry replaced by ρ_iH_i − ρ_jH_j, λ = |u·n| + a·Area is the local
//! spectral radius, ψ = 4Φ_iΦ_j/(Φ_i + Φ_j) with Φ = (λ/4λ̄)^0.3 is the
//! stretching factor and ε₀ = κ·3(N_i + N_j)/(N_i·N_j)·nDim/3.

use std::sync::Arc;

use crate::config::NumericsConfig;
use crate::constants::EPS;
use crate::error::Result;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::projected::{inviscid_proj_flux, inviscid_proj_jacobian};
use super::traits::{ConvectiveFlux, FaceInputs, FluxOutput, scheme_layout};

/// Exponent of the stretching factor.
const STRETCH_EXPONENT: f64 = 0.3;

/// Centered Lax flux evaluator.
#[derive(Clone)]
pub struct LaxFlux {
    layout: VariableLayout,
    implicit: bool,
    kappa: f64,
    flux_i: Vec<f64>,
    flux_j: Vec<f64>,
    diff_u: Vec<f64>,
}

impl LaxFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout("Lax", thermo.as_ref(), config)?;
        let nv = layout.n_var();
        Ok(Self {
            flux_i: vec![0.0; nv],
            flux_j: vec![0.0; nv],
            diff_u: vec![0.0; nv],
            kappa: config.lax_kappa,
            layout,
            implicit: config.implicit,
        })
    }

    /// Dissipation coefficient ε₀·ψ·λ̄ of a face.
    pub fn dissipation_coefficient(&self, face: &FaceInputs<'_>) -> f64 {
        let layout = &self.layout;
        let area = face.area();
        let lambda_i =
            layout.projected_velocity(face.v_i, face.normal).abs() + face.v_i[layout.a()] * area;
        let lambda_j =
            layout.projected_velocity(face.v_j, face.normal).abs() + face.v_j[layout.a()] * area;
        let mean_lambda = 0.5 * (lambda_i + lambda_j);

        let phi_i = (lambda_i / (4.0 * mean_lambda + EPS)).powf(STRETCH_EXPONENT);
        let phi_j = (lambda_j / (4.0 * mean_lambda + EPS)).powf(STRETCH_EXPONENT);
        let stretching = 4.0 * phi_i * phi_j / (phi_i + phi_j + EPS);

        let n_i = face.neighbors_i as f64;
        let n_j = face.neighbors_j as f64;
        let sc0 = 3.0 * (n_i + n_j) / (n_i * n_j);
        let epsilon_0 = self.kappa * sc0 * layout.n_dim() as f64 / 3.0;

        epsilon_0 * stretching * mean_lambda
    }
}

impl ConvectiveFlux for LaxFlux {
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        let layout = self.layout;
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let nv = layout.n_var();
        let e = layout.energy();
        let ev = layout.eve();

        inviscid_proj_flux(&layout, face.u_i, face.v_i, face.normal, &mut self.flux_i);
        inviscid_proj_flux(&layout, face.u_j, face.v_j, face.normal, &mut self.flux_j);

        for k in 0..nv {
            self.diff_u[k] = face.u_i[k] - face.u_j[k];
        }
        self.diff_u[e] = face.v_i[layout.rho()] * face.v_i[layout.h()]
            - face.v_j[layout.rho()] * face.v_j[layout.h()];

        let cte = self.dissipation_coefficient(face);
        for k in 0..nv {
            out.residual[k] = 0.5 * (self.flux_i[k] + self.flux_j[k]) + cte * self.diff_u[k];
        }

        if self.implicit {
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

            for k in 0..ns + nd {
                out.jacobian_i[(k, k)] += cte;
                out.jacobian_j[(k, k)] -= cte;
            }
            // ∂(ρH)/∂U = ∂(ρE)/∂U + ∂P/∂U
            for k in 0..ns + nd {
                out.jacobian_i[(e, k)] += cte * face.dpdu_i[k];
                out.jacobian_j[(e, k)] -= cte * face.dpdu_j[k];
            }
            out.jacobian_i[(e, e)] += cte * (1.0 + face.dpdu_i[e]);
            out.jacobian_j[(e, e)] -= cte * (1.0 + face.dpdu_j[e]);
            out.jacobian_i[(e, ev)] += cte * face.dpdu_i[ev];
            out.jacobian_j[(e, ev)] -= cte * face.dpdu_j[ev];
            out.jacobian_i[(ev, ev)] += cte;
            out.jacobian_j[(ev, ev)] -= cte;
        }
    }

    fn name(&self) -> &'static str {
        "lax"
    }

    fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn is_implicit(&self) -> bool {
        self.implicit
    }

    fn is_upwind(&self) -> bool {
        false
    }
}
