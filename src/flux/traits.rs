//! Common contract of the convective flux evaluators.
//!
//! Every scheme maps the two reconstructed face states and the area-scaled
//! face normal to a residual (flux integrated over the face) and, in implicit
//! mode, the two Jacobian blocks ∂residual/∂U_i and ∂residual/∂U_j.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use tne2_rs::config::{GasConfig, NumericsConfig};
//! use tne2_rs::flux::{ConvectiveFlux, FaceInputs, FluxOutput, FluxSchemeKind, create_scheme};
//! use tne2_rs::thermo::TwoTemperatureGas;
//!
//! let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
//! let numerics = NumericsConfig::new(2);
//! let layout = numerics.layout(2).unwrap();
//! let left = gas
//!     .state_from_primitives(layout, &[0.010, 0.001], 4000.0, 3000.0, &[2500.0, 0.0])
//!     .unwrap();
//! let right = gas
//!     .state_from_primitives(layout, &[0.008, 0.002], 3500.0, 2800.0, &[2300.0, 50.0])
//!     .unwrap();
//!
//! let mut scheme = create_scheme(FluxSchemeKind::Roe, gas, &numerics).unwrap();
//! let mut out = FluxOutput::new(layout);
//! let normal = [0.01, 0.0];
//! scheme.compute(&FaceInputs::from_states(&left, &right, &normal), &mut out);
//! assert!(out.residual.iter().all(|r| r.is_finite()));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::error::{Result, Tne2Error, check_len};
use crate::thermo::{GasState, ThermoModel};
use crate::types::VariableLayout;

use super::ausm::AusmFlux;
use super::ausm_up2::AusmUp2Flux;
use super::ausmpw_plus::AusmPwPlusFlux;
use super::lax::LaxFlux;
use super::msw::MswFlux;
use super::roe::RoeFlux;

// =============================================================================
// Face inputs and outputs
// =============================================================================

/// Borrowed left (i) and right (j) states of one face.
///
/// The normal points from i to j and its magnitude is the face area.
#[derive(Clone, Copy, Debug)]
pub struct FaceInputs<'a> {
    pub u_i: &'a [f64],
    pub u_j: &'a [f64],
    pub v_i: &'a [f64],
    pub v_j: &'a [f64],
    pub dpdu_i: &'a [f64],
    pub dpdu_j: &'a [f64],
    /// Area-scaled face normal.
    pub normal: &'a [f64],
    /// Neighbour count of cell i (Lax dissipation scaling).
    pub neighbors_i: usize,
    /// Neighbour count of cell j.
    pub neighbors_j: usize,
}

impl<'a> FaceInputs<'a> {
    /// Face inputs from raw vectors; neighbour counts default to 2·nDim.
    pub fn new(
        u_i: &'a [f64],
        u_j: &'a [f64],
        v_i: &'a [f64],
        v_j: &'a [f64],
        dpdu_i: &'a [f64],
        dpdu_j: &'a [f64],
        normal: &'a [f64],
    ) -> Self {
        let neighbors = 2 * normal.len();
        Self {
            u_i,
            u_j,
            v_i,
            v_j,
            dpdu_i,
            dpdu_j,
            normal,
            neighbors_i: neighbors,
            neighbors_j: neighbors,
        }
    }

    /// Face inputs borrowing two assembled gas states.
    pub fn from_states(left: &'a GasState, right: &'a GasState, normal: &'a [f64]) -> Self {
        Self::new(
            &left.u,
            &right.u,
            &left.v,
            &right.v,
            &left.dpdu,
            &right.dpdu,
            normal,
        )
    }

    pub fn with_neighbors(mut self, neighbors_i: usize, neighbors_j: usize) -> Self {
        self.neighbors_i = neighbors_i;
        self.neighbors_j = neighbors_j;
        self
    }

    /// Face area, the magnitude of the normal.
    #[inline]
    pub fn area(&self) -> f64 {
        self.normal.iter().map(|n| n * n).sum::<f64>().sqrt()
    }

    /// Check every vector against `layout`.
    pub fn validate(&self, layout: &VariableLayout) -> Result<()> {
        let nv = layout.n_var();
        let npv = layout.n_prim_var();
        check_len("U_i", self.u_i, nv)?;
        check_len("U_j", self.u_j, nv)?;
        check_len("V_i", self.v_i, npv)?;
        check_len("V_j", self.v_j, npv)?;
        check_len("dPdU_i", self.dpdu_i, nv)?;
        check_len("dPdU_j", self.dpdu_j, nv)?;
        if self.normal.len() != layout.n_dim() {
            return Err(Tne2Error::dimension_mismatch(
                format!("normal with {} components", layout.n_dim()),
                format!("{} components", self.normal.len()),
            ));
        }
        if !(self.area() > 0.0) {
            return Err(Tne2Error::InvalidState("degenerate face normal".into()));
        }
        if self.neighbors_i == 0 || self.neighbors_j == 0 {
            return Err(Tne2Error::InvalidState(format!(
                "neighbor counts must be positive, got ({}, {})",
                self.neighbors_i, self.neighbors_j
            )));
        }
        Ok(())
    }
}

/// Area and unit normal of a face.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FaceGeometry {
    pub area: f64,
    unit_normal: [f64; 3],
    n_dim: usize,
}

impl FaceGeometry {
    #[inline]
    pub fn new(normal: &[f64]) -> Self {
        let area = normal.iter().map(|n| n * n).sum::<f64>().sqrt();
        let mut unit_normal = [0.0; 3];
        for (d, n) in normal.iter().enumerate() {
            unit_normal[d] = n / area;
        }
        Self {
            area,
            unit_normal,
            n_dim: normal.len(),
        }
    }

    #[inline]
    pub fn unit_normal(&self) -> &[f64] {
        &self.unit_normal[..self.n_dim]
    }
}

/// Residual and Jacobian blocks of one face evaluation.
///
/// Allocated once and reused; every call overwrites the residual and, in
/// implicit mode, both blocks.
#[derive(Clone, Debug)]
pub struct FluxOutput {
    pub residual: Vec<f64>,
    pub jacobian_i: Mat<f64>,
    pub jacobian_j: Mat<f64>,
}

impl FluxOutput {
    pub fn new(layout: VariableLayout) -> Self {
        let nv = layout.n_var();
        Self {
            residual: vec![0.0; nv],
            jacobian_i: Mat::zeros(nv, nv),
            jacobian_j: Mat::zeros(nv, nv),
        }
    }
}

// =============================================================================
// Convective Flux Trait
// =============================================================================

/// A convective flux evaluator.
///
/// Evaluators own pre-sized scratch space, so `compute` takes `&mut self`
/// and one instance must not be shared between threads. Clone one per
/// worker instead.
///
/// Convective fluxes never fail: an invalid upstream state propagates into
/// non-finite outputs.
pub trait ConvectiveFlux: Send {
    /// Evaluate the face; Jacobian blocks are written only in implicit mode.
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput);

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Variable layout the evaluator was sized for.
    fn layout(&self) -> VariableLayout;

    /// Whether Jacobian blocks are produced.
    fn is_implicit(&self) -> bool;

    /// Whether the scheme upwinds (false for centered schemes).
    fn is_upwind(&self) -> bool {
        true
    }
}

/// Shared construction checks of every scheme.
pub(crate) fn scheme_layout(
    name: &str,
    thermo: &dyn ThermoModel,
    config: &NumericsConfig,
) -> Result<VariableLayout> {
    config.validate()?;
    let layout = config.layout(thermo.n_species())?;
    log::debug!(
        "{name} flux: {layout}, implicit = {}",
        config.implicit
    );
    Ok(layout)
}

// =============================================================================
// Scheme selection
// =============================================================================

/// Convective scheme selector, as read from a configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FluxSchemeKind {
    /// Roe approximate Riemann solver
    #[default]
    Roe,
    /// Modified Steger-Warming flux-vector splitting
    Msw,
    /// Baseline AUSM
    Ausm,
    /// AUSM+-up2 (low-Mach corrected)
    AusmPlusUp2,
    /// AUSMPW+ (pressure-weighted)
    AusmPwPlus,
    /// Centered Lax with scalar dissipation
    Lax,
}

impl FluxSchemeKind {
    pub const ALL: [FluxSchemeKind; 6] = [
        FluxSchemeKind::Roe,
        FluxSchemeKind::Msw,
        FluxSchemeKind::Ausm,
        FluxSchemeKind::AusmPlusUp2,
        FluxSchemeKind::AusmPwPlus,
        FluxSchemeKind::Lax,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FluxSchemeKind::Roe => "roe",
            FluxSchemeKind::Msw => "msw",
            FluxSchemeKind::Ausm => "ausm",
            FluxSchemeKind::AusmPlusUp2 => "ausm+up2",
            FluxSchemeKind::AusmPwPlus => "ausmpw+",
            FluxSchemeKind::Lax => "lax",
        }
    }
}

impl fmt::Display for FluxSchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FluxSchemeKind {
    type Err = Tne2Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        FluxSchemeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == key)
            .ok_or_else(|| Tne2Error::InvalidConfig(format!("unknown convective scheme '{s}'")))
    }
}

/// Closed set of convective schemes with static dispatch.
#[derive(Clone)]
pub enum ConvectiveScheme {
    Roe(RoeFlux),
    Msw(MswFlux),
    Ausm(AusmFlux),
    AusmPlusUp2(AusmUp2Flux),
    AusmPwPlus(AusmPwPlusFlux),
    Lax(LaxFlux),
}

impl ConvectiveScheme {
    pub fn kind(&self) -> FluxSchemeKind {
        match self {
            ConvectiveScheme::Roe(_) => FluxSchemeKind::Roe,
            ConvectiveScheme::Msw(_) => FluxSchemeKind::Msw,
            ConvectiveScheme::Ausm(_) => FluxSchemeKind::Ausm,
            ConvectiveScheme::AusmPlusUp2(_) => FluxSchemeKind::AusmPlusUp2,
            ConvectiveScheme::AusmPwPlus(_) => FluxSchemeKind::AusmPwPlus,
            ConvectiveScheme::Lax(_) => FluxSchemeKind::Lax,
        }
    }

    fn inner(&self) -> &dyn ConvectiveFlux {
        match self {
            ConvectiveScheme::Roe(f) => f,
            ConvectiveScheme::Msw(f) => f,
            ConvectiveScheme::Ausm(f) => f,
            ConvectiveScheme::AusmPlusUp2(f) => f,
            ConvectiveScheme::AusmPwPlus(f) => f,
            ConvectiveScheme::Lax(f) => f,
        }
    }
}

impl ConvectiveFlux for ConvectiveScheme {
    #[inline]
    fn compute(&mut self, face: &FaceInputs<'_>, out: &mut FluxOutput) {
        match self {
            ConvectiveScheme::Roe(f) => f.compute(face, out),
            ConvectiveScheme::Msw(f) => f.compute(face, out),
            ConvectiveScheme::Ausm(f) => f.compute(face, out),
            ConvectiveScheme::AusmPlusUp2(f) => f.compute(face, out),
            ConvectiveScheme::AusmPwPlus(f) => f.compute(face, out),
            ConvectiveScheme::Lax(f) => f.compute(face, out),
        }
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn layout(&self) -> VariableLayout {
        self.inner().layout()
    }

    fn is_implicit(&self) -> bool {
        self.inner().is_implicit()
    }

    fn is_upwind(&self) -> bool {
        self.inner().is_upwind()
    }
}

/// Build a convective scheme from its selector.
pub fn create_scheme(
    kind: FluxSchemeKind,
    thermo: Arc<dyn ThermoModel>,
    config: &NumericsConfig,
) -> Result<ConvectiveScheme> {
    Ok(match kind {
        FluxSchemeKind::Roe => ConvectiveScheme::Roe(RoeFlux::new(thermo, config)?),
        FluxSchemeKind::Msw => ConvectiveScheme::Msw(MswFlux::new(thermo, config)?),
        FluxSchemeKind::Ausm => ConvectiveScheme::Ausm(AusmFlux::new(thermo, config)?),
        FluxSchemeKind::AusmPlusUp2 => {
            ConvectiveScheme::AusmPlusUp2(AusmUp2Flux::new(thermo, config)?)
        }
        FluxSchemeKind::AusmPwPlus => {
            ConvectiveScheme::AusmPwPlus(AusmPwPlusFlux::new(thermo, config)?)
        }
        FluxSchemeKind::Lax => ConvectiveScheme::Lax(LaxFlux::new(thermo, config)?),
    })
}
