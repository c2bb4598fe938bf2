//! Cell source terms of the two-temperature equations.
//!
//! - [`ChemistrySource`]: finite-rate reactions with Park's two-temperature
//!   rate control and tabulated equilibrium constants
//! - [`RelaxationSource`]: Landau-Teller vibrational relaxation with
//!   Millikan-White and Park relaxation times
//! - [`AxisymmetricSource`]: geometric source of revolved 2D solutions
//!
//! Sources are selected independently and summed with [`CombinedSource`].

mod axisymmetric;
mod chemistry;
mod relaxation;
pub mod traits;

pub use axisymmetric::AxisymmetricSource;
pub use chemistry::{ChemistrySource, smoothed_temperature};
pub use relaxation::RelaxationSource;
pub use traits::{CellInputs, CombinedSource, SourceKind, SourceOutput, SourceTerm};
