//! Offsets of the conserved and primitive TNE2 variable vectors.

use std::fmt;

use crate::error::{Result, Tne2Error};

/// Layout of the conserved vector U and the primitive vector V.
///
/// Conserved: `[ρ_1..ρ_ns, ρu_1..ρu_nd, ρE, ρEve]`.
///
/// Primitive: `[ρ_1..ρ_ns, T, Tve, u_1..u_nd, P, ρ, H, a, ρCvtr, ρCvve]`.
///
/// # Example
///
/// ```
/// use tne2_rs::types::VariableLayout;
///
/// let layout = VariableLayout::new(2, 2);
/// assert_eq!(layout.n_var(), 6);
/// assert_eq!(layout.n_prim_var(), 12);
/// assert_eq!(layout.p(), 6);
/// assert_eq!(layout.energy(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VariableLayout {
    n_species: usize,
    n_dim: usize,
}

impl VariableLayout {
    /// Create a layout for `n_species` species in `n_dim` dimensions.
    #[inline]
    pub const fn new(n_species: usize, n_dim: usize) -> Self {
        Self { n_species, n_dim }
    }

    /// Create a layout, rejecting unsupported sizes.
    pub fn checked(n_species: usize, n_dim: usize) -> Result<Self> {
        if n_species == 0 {
            return Err(Tne2Error::InvalidConfig(
                "at least one species is required".into(),
            ));
        }
        if !(2..=3).contains(&n_dim) {
            return Err(Tne2Error::InvalidConfig(format!(
                "nDim must be 2 or 3, got {n_dim}"
            )));
        }
        Ok(Self::new(n_species, n_dim))
    }

    #[inline]
    pub const fn n_species(&self) -> usize {
        self.n_species
    }

    #[inline]
    pub const fn n_dim(&self) -> usize {
        self.n_dim
    }

    /// Number of conserved variables.
    #[inline]
    pub const fn n_var(&self) -> usize {
        self.n_species + self.n_dim + 2
    }

    /// Number of primitive variables.
    #[inline]
    pub const fn n_prim_var(&self) -> usize {
        self.n_species + self.n_dim + 8
    }

    /// Number of primitive variables carrying gradients (through ρ).
    #[inline]
    pub const fn n_prim_var_grad(&self) -> usize {
        self.n_species + self.n_dim + 4
    }

    // Conserved offsets

    /// First momentum component in U.
    #[inline]
    pub const fn momentum(&self) -> usize {
        self.n_species
    }

    /// Total energy ρE in U (also ∂P/∂(ρE) in dPdU).
    #[inline]
    pub const fn energy(&self) -> usize {
        self.n_species + self.n_dim
    }

    /// Vibrational-electronic energy ρEve in U.
    #[inline]
    pub const fn eve(&self) -> usize {
        self.n_species + self.n_dim + 1
    }

    // Primitive offsets

    #[inline]
    pub const fn rhos(&self) -> usize {
        0
    }

    #[inline]
    pub const fn t(&self) -> usize {
        self.n_species
    }

    #[inline]
    pub const fn tve(&self) -> usize {
        self.n_species + 1
    }

    #[inline]
    pub const fn vel(&self) -> usize {
        self.n_species + 2
    }

    #[inline]
    pub const fn p(&self) -> usize {
        self.n_species + self.n_dim + 2
    }

    #[inline]
    pub const fn rho(&self) -> usize {
        self.n_species + self.n_dim + 3
    }

    /// Total specific enthalpy H = (ρE + P)/ρ.
    #[inline]
    pub const fn h(&self) -> usize {
        self.n_species + self.n_dim + 4
    }

    /// Frozen sound speed.
    #[inline]
    pub const fn a(&self) -> usize {
        self.n_species + self.n_dim + 5
    }

    #[inline]
    pub const fn rho_cvtr(&self) -> usize {
        self.n_species + self.n_dim + 6
    }

    #[inline]
    pub const fn rho_cvve(&self) -> usize {
        self.n_species + self.n_dim + 7
    }

    /// Velocity component `d` of a primitive vector.
    #[inline]
    pub fn velocity(&self, v: &[f64], d: usize) -> f64 {
        v[self.vel() + d]
    }

    /// u · n for a primitive vector.
    #[inline]
    pub fn projected_velocity(&self, v: &[f64], normal: &[f64]) -> f64 {
        (0..self.n_dim).map(|d| v[self.vel() + d] * normal[d]).sum()
    }

    /// |u|² for a primitive vector.
    #[inline]
    pub fn velocity_squared(&self, v: &[f64]) -> f64 {
        (0..self.n_dim).map(|d| v[self.vel() + d].powi(2)).sum()
    }
}

impl fmt::Display for VariableLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} species, {}D (nVar = {}, nPrimVar = {})",
            self.n_species,
            self.n_dim,
            self.n_var(),
            self.n_prim_var()
        )
    }
}
