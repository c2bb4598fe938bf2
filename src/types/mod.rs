//! Strongly-typed layout types for the TNE2 variable vectors.
//!
//! Every evaluator indexes U, V and dPdU through a [`VariableLayout`]
//! instead of hard-coded offsets, so the same code serves any species
//! count and both 2D and 3D.

mod layout;

pub use layout::VariableLayout;
