//! Modified Steger-Warming flux-vector splitting.
//!
//! F* = A⁺(U*_i)·U_i·Area + A⁻(U*_j)·U_j·Area, where A± = P·Λ±·P⁻¹ and the
//! starred states blend the two sides with a pressure-switch weight
//!
//! w = ½ / ((α·|P_j − P_i| / min(P_i, P_j))² + 1),   α = 5,
//!
//! so smooth regions split about the face average and shocks fall back to
//! pure Steger-Warming.

use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::error::Result;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::eigen::{create_basis, eigenvalues, p_matrix, p_matrix_inv};
use super::traits::{ConvectiveFlux, FaceGeometry, FaceInputs, FluxOutput, scheme_layout};

/// Pressure-switch sensitivity.
const ALPHA: f64 = 5.0;

/// Scratch of one split Jacobian A±.
#[derive(Clone)]
struct SplitWorkspace {
    eve: Vec<f64>,
    dpdu: Vec<f64>,
    lambda: Vec<f64>,
    p: Mat<f64>,
    p_inv: Mat<f64>,
    tensor: Mat<f64>,
}

impl SplitWorkspace {
    fn new(layout: &VariableLayout) -> Self {
        let nv = layout.n_var();
        Self {
            eve: vec![0.0; layout.n_species()],
            dpdu: vec![0.0; nv],
            lambda: vec![0.0; nv],
            p: Mat::zeros(nv, nv),
            p_inv: Mat::zeros(nv, nv),
            tensor: Mat::zeros(nv, nv),
        }
    }

    /// tensor = P·Λ±·P⁻¹ of the state (u, v); `positive` selects Λ⁺.
    #[allow(clippy::too_many_arguments)]
    fn split(
        &mut self,
        thermo: &dyn ThermoModel,
        layout: &VariableLayout,
        u: &[f64],
        v: &[f64],
        n: &[f64],
        l: &[f64; 3],
        m: &[f64; 3],
        positive: bool,
    ) {
        thermo.vib_energies(v[layout.tve()], &mut self.eve);
        thermo.pressure_derivatives(layout, v, &self.eve, &mut self.dpdu);

        p_matrix(layout, u, v, &self.dpdu, n, l, m, &mut self.p);
        p_matrix_inv(layout, u, v, &self.dpdu, n, l, m, &mut self.p_inv);

        let q = layout.projected_velocity(v, n);
        eigenvalues(layout, q, v[layout.a()], &mut self.lambda);
        for lambda in self.lambda.iter_mut() {
            *lambda = if positive {
                0.5 * (*lambda + lambda.abs())
            } else {
                0.5 * (*lambda - lambda.abs())
            };
        }

        crate::linalg::similarity(&self.p, &self.lambda, &self.p_inv, &mut self.tensor);
    }
}

/// MSW flux evaluator.
#[derive(Clone)]
pub struct MswFlux {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    ust_i: Vec<f64>,
    ust_j: Vec<f64>,
    vst_i: Vec<f64>,
    vst_j: Vec<f64>,
    work: SplitWorkspace,
}

impl MswFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout("MSW", thermo.as_ref(), config)?;
        let nv = layout.n_var();
        let npv = layout.n_prim_var();
        Ok(Self {
            ust_i: vec![0.0; nv],
            ust_j: vec![0.0; nv],
            vst_i: vec![0.0; npv],
            vst_j: vec![0.0; npv],
            work: SplitWorkspace::new(&layout),
            thermo,
            layout,
            implicit: config.implicit,
        })
    }

    /// Blending weight of the opposite state.
    #[inline]
    pub fn pressure_weight(p_i: f64, p_j: f64) -> f64 {
        let dp = (p_j - p_i).abs() / p_i.min(p_j);
        0.5 / ((ALPHA * dp).powi(2) + 1.0)
    }
}

impl ConvectiveFlux for MswFlux {
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        let layout = self.layout;
        let nv = layout.n_var();
        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();
        let (l, m) = create_basis(n);

        let w = Self::pressure_weight(face.v_i[layout.p()], face.v_j[layout.p()]);
        let onemw = 1.0 - w;
        for k in 0..nv {
            self.ust_i[k] = onemw * face.u_i[k] + w * face.u_j[k];
            self.ust_j[k] = onemw * face.u_j[k] + w * face.u_i[k];
        }
        for k in 0..layout.n_prim_var() {
            self.vst_i[k] = onemw * face.v_i[k] + w * face.v_j[k];
            self.vst_j[k] = onemw * face.v_j[k] + w * face.v_i[k];
        }

        // f⁺ from the starred i state
        self.work.split(
            self.thermo.as_ref(),
            &layout,
            &self.ust_i,
            &self.vst_i,
            n,
            &l,
            &m,
            true,
        );
        for i in 0..nv {
            let mut sum = 0.0;
            for j in 0..nv {
                sum += self.work.tensor[(i, j)] * face.u_i[j];
            }
            out.residual[i] = sum * geo.area;
        }
        if self.implicit {
            for i in 0..nv {
                for j in 0..nv {
                    out.jacobian_i[(i, j)] = self.work.tensor[(i, j)] * geo.area;
                }
            }
        }

        // f⁻ from the starred j state
        self.work.split(
            self.thermo.as_ref(),
            &layout,
            &self.ust_j,
            &self.vst_j,
            n,
            &l,
            &m,
            false,
        );
        for i in 0..nv {
            let mut sum = 0.0;
            for j in 0..nv {
                sum += self.work.tensor[(i, j)] * face.u_j[j];
            }
            out.residual[i] += sum * geo.area;
        }
        if self.implicit {
            for i in 0..nv {
                for j in 0..nv {
                    out.jacobian_j[(i, j)] = self.work.tensor[(i, j)] * geo.area;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "msw"
    }

    fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn is_implicit(&self) -> bool {
        self.implicit
    }
}
