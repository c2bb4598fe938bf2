//! Cell source-term interface.
//!
//! A source term maps one cell state to a volume-integrated residual and,
//! in implicit mode, its Jacobian with respect to the conserved variables:
//!
//! - [`CellInputs`]: borrowed cell state, coordinates and volume
//! - [`SourceOutput`]: residual and Jacobian storage
//! - [`SourceTerm`]: the evaluator trait
//! - [`CombinedSource`]: sum of independently selected sources

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::error::{Result, Tne2Error, check_len};
use crate::linalg;
use crate::thermo::{GasState, ThermoModel};
use crate::types::VariableLayout;

use super::{AxisymmetricSource, ChemistrySource, RelaxationSource};

/// Everything a source evaluator reads from one cell.
#[derive(Clone, Copy, Debug)]
pub struct CellInputs<'a> {
    pub u: &'a [f64],
    pub v: &'a [f64],
    pub eve: &'a [f64],
    pub cvve: &'a [f64],
    pub dpdu: &'a [f64],
    pub dtdu: &'a [f64],
    pub dtvedu: &'a [f64],
    /// Cell-center coordinates.
    pub coord: &'a [f64],
    pub volume: f64,
}

impl<'a> CellInputs<'a> {
    /// Borrow a cell state assembled by the thermodynamic model.
    pub fn from_state(state: &'a GasState, coord: &'a [f64], volume: f64) -> Self {
        Self {
            u: &state.u,
            v: &state.v,
            eve: &state.eve,
            cvve: &state.cvve,
            dpdu: &state.dpdu,
            dtdu: &state.dtdu,
            dtvedu: &state.dtvedu,
            coord,
            volume,
        }
    }

    /// Check every vector against `layout`.
    pub fn validate(&self, layout: &VariableLayout) -> Result<()> {
        let ns = layout.n_species();
        let nv = layout.n_var();
        check_len("U", self.u, nv)?;
        check_len("V", self.v, layout.n_prim_var())?;
        check_len("eve", self.eve, ns)?;
        check_len("Cvve", self.cvve, ns)?;
        check_len("dPdU", self.dpdu, nv)?;
        check_len("dTdU", self.dtdu, nv)?;
        check_len("dTvedU", self.dtvedu, nv)?;
        check_len("coord", self.coord, layout.n_dim())?;
        if !(self.volume > 0.0) {
            return Err(Tne2Error::InvalidState(format!(
                "cell volume must be positive, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}

/// Residual and Jacobian of one cell evaluation.
#[derive(Clone, Debug)]
pub struct SourceOutput {
    pub residual: Vec<f64>,
    pub jacobian: Mat<f64>,
}

impl SourceOutput {
    pub fn new(layout: VariableLayout) -> Self {
        let nv = layout.n_var();
        Self {
            residual: vec![0.0; nv],
            jacobian: Mat::zeros(nv, nv),
        }
    }

    /// Reset the residual and Jacobian to zero.
    pub fn clear(&mut self) {
        self.residual.fill(0.0);
        linalg::zero(&mut self.jacobian);
    }

    /// Add another output into this one.
    pub fn accumulate(&mut self, other: &SourceOutput) {
        for (r, o) in self.residual.iter_mut().zip(&other.residual) {
            *r += o;
        }
        for j in 0..self.jacobian.ncols() {
            for i in 0..self.jacobian.nrows() {
                self.jacobian[(i, j)] += other.jacobian[(i, j)];
            }
        }
    }
}

/// A cell source evaluator.
///
/// Every call overwrites the residual and, in implicit mode, the Jacobian.
/// Evaluators own scratch space, so one instance per worker.
pub trait SourceTerm: Send {
    fn compute(&mut self, cell: &CellInputs<'_>, out: &mut SourceOutput) -> Result<()>;

    /// Name of this source term for logging.
    fn name(&self) -> &'static str;

    fn layout(&self) -> VariableLayout;

    fn is_implicit(&self) -> bool;

    /// Whether the source is stiff enough to call for implicit treatment.
    fn is_stiff(&self) -> bool {
        false
    }
}

/// Shared construction checks of every source.
pub(crate) fn source_layout(
    name: &str,
    thermo: &dyn ThermoModel,
    config: &NumericsConfig,
) -> Result<VariableLayout> {
    config.validate()?;
    let layout = config.layout(thermo.n_species())?;
    log::debug!("{name} source: {layout}, implicit = {}", config.implicit);
    Ok(layout)
}

/// Source selector, as read from a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// Finite-rate chemistry
    Chemistry,
    /// Vibrational-translational energy relaxation
    Relaxation,
    /// Axisymmetric geometric source
    Axisymmetric,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Chemistry => "chemistry",
            SourceKind::Relaxation => "relaxation",
            SourceKind::Axisymmetric => "axisymmetric",
        }
    }

    /// Build the evaluator of this kind.
    pub fn create(
        self,
        thermo: Arc<dyn ThermoModel>,
        config: &NumericsConfig,
    ) -> Result<Box<dyn SourceTerm>> {
        Ok(match self {
            SourceKind::Chemistry => Box::new(ChemistrySource::new(thermo, config)?),
            SourceKind::Relaxation => Box::new(RelaxationSource::new(thermo, config)?),
            SourceKind::Axisymmetric => Box::new(AxisymmetricSource::new(thermo, config)?),
        })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = Tne2Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "chemistry" => Ok(SourceKind::Chemistry),
            "relaxation" | "vib_relaxation" => Ok(SourceKind::Relaxation),
            "axisymmetric" => Ok(SourceKind::Axisymmetric),
            other => Err(Tne2Error::InvalidConfig(format!(
                "unknown source term '{other}'"
            ))),
        }
    }
}

/// Sum of several source terms evaluated on the same cell.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tne2_rs::config::{GasConfig, NumericsConfig};
/// use tne2_rs::source::{CombinedSource, SourceKind, SourceTerm};
/// use tne2_rs::thermo::TwoTemperatureGas;
///
/// let gas = Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap());
/// let config = NumericsConfig::new(2);
/// let combined = CombinedSource::from_kinds(
///     &[SourceKind::Chemistry, SourceKind::Relaxation],
///     gas,
///     &config,
/// )
/// .unwrap();
/// assert_eq!(combined.len(), 2);
/// assert!(combined.is_stiff());
/// ```
pub struct CombinedSource {
    layout: VariableLayout,
    implicit: bool,
    sources: Vec<Box<dyn SourceTerm>>,
    scratch: SourceOutput,
}

impl CombinedSource {
    /// Empty combination sized for `config`.
    pub fn new(thermo: &dyn ThermoModel, config: &NumericsConfig) -> Result<Self> {
        let layout = source_layout("combined", thermo, config)?;
        Ok(Self {
            layout,
            implicit: config.implicit,
            sources: Vec::new(),
            scratch: SourceOutput::new(layout),
        })
    }

    /// Combination of the given kinds, in order.
    pub fn from_kinds(
        kinds: &[SourceKind],
        thermo: Arc<dyn ThermoModel>,
        config: &NumericsConfig,
    ) -> Result<Self> {
        let mut combined = Self::new(thermo.as_ref(), config)?;
        for kind in kinds {
            combined.add(kind.create(thermo.clone(), config)?)?;
        }
        Ok(combined)
    }

    /// Add a source; its layout and implicit flag must match.
    pub fn add(&mut self, source: Box<dyn SourceTerm>) -> Result<()> {
        if source.layout() != self.layout {
            return Err(Tne2Error::dimension_mismatch(
                format!("{}", self.layout),
                format!("{}", source.layout()),
            ));
        }
        if source.is_implicit() != self.implicit {
            return Err(Tne2Error::InvalidConfig(format!(
                "{} source disagrees on implicit mode",
                source.name()
            )));
        }
        self.sources.push(source);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl SourceTerm for CombinedSource {
    fn compute(&mut self, cell: &CellInputs<'_>, out: &mut SourceOutput) -> Result<()> {
        out.clear();
        for source in &mut self.sources {
            source.compute(cell, &mut self.scratch)?;
            out.accumulate(&self.scratch);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "combined"
    }

    fn layout(&self) -> VariableLayout {
        self.layout
    }

    fn is_implicit(&self) -> bool {
        self.implicit
    }

    fn is_stiff(&self) -> bool {
        self.sources.iter().any(|s| s.is_stiff())
    }
}
