//! Viscous face fluxes.
//!
//! The viscous flux of a face is evaluated from arithmetic averages of the
//! two adjacent states and of their reconstructed primitive gradients:
//! species diffusion with a mass-conserving correction, the Newtonian
//! stress tensor, and translational/vibrational heat conduction. The
//! corrected variant replaces the normal-to-edge component of the averaged
//! gradient with the finite difference along the edge joining the two cell
//! centers, which keeps the discretization consistent on non-orthogonal
//! meshes.
//!
//! Ionized mixtures are rejected at construction: electron diffusion
//! is not modeled.

mod avg_grad;

pub use avg_grad::{AvgGradCorrectedFlux, AvgGradFlux};

use faer::Mat;

use crate::error::{Result, Tne2Error, check_len};
use crate::flux::FluxOutput;
use crate::thermo::GasState;
use crate::types::VariableLayout;

/// Transport coefficients of one state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportProperties {
    /// Species diffusion coefficients D_s (m²/s).
    pub diffusion: Vec<f64>,
    /// Laminar viscosity μ.
    pub viscosity: f64,
    /// Translational-rotational thermal conductivity.
    pub conductivity_tr: f64,
    /// Vibrational-electronic thermal conductivity.
    pub conductivity_ve: f64,
}

impl TransportProperties {
    /// Same diffusion coefficient for every species.
    pub fn uniform(
        n_species: usize,
        diffusion: f64,
        viscosity: f64,
        conductivity_tr: f64,
        conductivity_ve: f64,
    ) -> Self {
        Self {
            diffusion: vec![diffusion; n_species],
            viscosity,
            conductivity_tr,
            conductivity_ve,
        }
    }
}

/// One side of a viscous face.
#[derive(Clone, Copy, Debug)]
pub struct ViscousSide<'a> {
    /// Primitive variables (species densities in the species slots).
    pub v: &'a [f64],
    /// Primitive gradients, nPrimVarGrad rows × nDim columns.
    pub grad: &'a Mat<f64>,
    pub eve: &'a [f64],
    pub cvve: &'a [f64],
    pub dtdu: &'a [f64],
    pub dtvedu: &'a [f64],
    pub transport: &'a TransportProperties,
    /// Cell-center coordinates.
    pub coord: &'a [f64],
}

impl<'a> ViscousSide<'a> {
    pub fn new(
        state: &'a GasState,
        grad: &'a Mat<f64>,
        transport: &'a TransportProperties,
        coord: &'a [f64],
    ) -> Self {
        Self {
            v: &state.v,
            grad,
            eve: &state.eve,
            cvve: &state.cvve,
            dtdu: &state.dtdu,
            dtvedu: &state.dtvedu,
            transport,
            coord,
        }
    }

    fn validate(&self, name: &str, layout: &VariableLayout) -> Result<()> {
        let ns = layout.n_species();
        let nd = layout.n_dim();
        check_len(&format!("V_{name}"), self.v, layout.n_prim_var())?;
        check_len(&format!("eve_{name}"), self.eve, ns)?;
        check_len(&format!("Cvve_{name}"), self.cvve, ns)?;
        check_len(&format!("dTdU_{name}"), self.dtdu, layout.n_var())?;
        check_len(&format!("dTvedU_{name}"), self.dtvedu, layout.n_var())?;
        check_len(&format!("D_{name}"), &self.transport.diffusion, ns)?;
        check_len(&format!("coord_{name}"), self.coord, nd)?;
        if self.grad.nrows() < layout.n_prim_var_grad() || self.grad.ncols() != nd {
            return Err(Tne2Error::dimension_mismatch(
                format!("gradient of {} × {nd}", layout.n_prim_var_grad()),
                format!("{} × {}", self.grad.nrows(), self.grad.ncols()),
            ));
        }
        Ok(())
    }
}

/// Both sides of a viscous face and the area-scaled normal from i to j.
#[derive(Clone, Copy, Debug)]
pub struct ViscousInputs<'a> {
    pub i: ViscousSide<'a>,
    pub j: ViscousSide<'a>,
    pub normal: &'a [f64],
}

impl<'a> ViscousInputs<'a> {
    pub fn new(i: ViscousSide<'a>, j: ViscousSide<'a>, normal: &'a [f64]) -> Self {
        Self { i, j, normal }
    }

    /// Check every vector against `layout` and the face geometry.
    pub fn validate(&self, layout: &VariableLayout) -> Result<()> {
        self.i.validate("i", layout)?;
        self.j.validate("j", layout)?;
        if self.normal.len() != layout.n_dim() {
            return Err(Tne2Error::dimension_mismatch(
                format!("normal with {} components", layout.n_dim()),
                format!("{} components", self.normal.len()),
            ));
        }
        let area: f64 = self.normal.iter().map(|n| n * n).sum::<f64>().sqrt();
        if !(area > 0.0) {
            return Err(Tne2Error::InvalidState("degenerate face normal".into()));
        }
        if !(self.distance() > 0.0) {
            return Err(Tne2Error::InvalidState(
                "coincident cell centers across a viscous face".into(),
            ));
        }
        Ok(())
    }

    /// Distance between the two cell centers.
    pub fn distance(&self) -> f64 {
        self.i
            .coord
            .iter()
            .zip(self.j.coord)
            .map(|(a, b)| (b - a) * (b - a))
            .sum::<f64>()
            .sqrt()
    }
}

/// Common interface of the viscous evaluators.
pub trait ViscousFlux: Send {
    /// Residual and, in implicit mode, both Jacobian blocks of one face.
    fn compute(&mut self, face: &ViscousInputs<'_>, out: &mut FluxOutput) -> Result<()>;

    fn name(&self) -> &'static str;

    fn layout(&self) -> VariableLayout;

    fn is_implicit(&self) -> bool;
}
