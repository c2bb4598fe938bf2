//! Density-regime equilibrium-constant curve fits.
//!
//! The equilibrium constant of a reaction is
//!
//! ln Keq = A0·(T/10⁴) + A1 + A2·ln(10⁴/T) + A3·(10⁴/T) + A4·(10⁴/T)²
//!
//! where the five coefficients depend on the mixture number density. Row `k`
//! of the table holds the fit for n = 10^(14+k) cm⁻³.

/// Number of density regimes in a table.
pub const N_REGIMES: usize = 6;

/// Number of curve-fit coefficients per regime.
pub const N_COEFFICIENTS: usize = 5;

/// Base-10 exponent of the first regime (cm⁻³).
const FIRST_REGIME_EXPONENT: i32 = 14;

/// Equilibrium-constant coefficients indexed by density regime.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquilibriumTable {
    pub rows: [[f64; N_COEFFICIENTS]; N_REGIMES],
}

impl EquilibriumTable {
    pub fn new(rows: [[f64; N_COEFFICIENTS]; N_REGIMES]) -> Self {
        Self { rows }
    }

    /// Coefficients for a mixture number density `n_mix` in cm⁻³.
    ///
    /// Densities at or below the second regime's decade map onto the first
    /// row, densities in or above the last decade onto the last row; in
    /// between, coefficients are interpolated linearly in n across the
    /// decade containing it.
    pub fn coefficients(&self, n_mix: f64) -> [f64; N_COEFFICIENTS] {
        let pwr = n_mix.log10().floor();
        // NaN or -inf exponents fall to the first row
        let index = if pwr.is_finite() {
            pwr as i32 - FIRST_REGIME_EXPONENT
        } else if pwr > 0.0 {
            N_REGIMES as i32
        } else {
            0
        };

        if index <= 0 {
            return self.rows[0];
        }
        if index >= N_REGIMES as i32 - 1 {
            return self.rows[N_REGIMES - 1];
        }

        let i = index as usize;
        let n_lo = 10f64.powf(pwr);
        let n_hi = 10f64.powf(pwr + 1.0);
        let mut out = [0.0; N_COEFFICIENTS];
        for (c, value) in out.iter_mut().enumerate() {
            let slope = (self.rows[i + 1][c] - self.rows[i][c]) / (n_hi - n_lo);
            *value = slope * (n_mix - n_lo) + self.rows[i][c];
        }
        out
    }

    /// Derivatives of [`coefficients`](Self::coefficients) with respect to
    /// `n_mix`; zero where the lookup is clamped.
    pub fn coefficient_slopes(&self, n_mix: f64) -> [f64; N_COEFFICIENTS] {
        let pwr = n_mix.log10().floor();
        if !pwr.is_finite() {
            return [0.0; N_COEFFICIENTS];
        }
        let index = pwr as i32 - FIRST_REGIME_EXPONENT;
        if index <= 0 || index >= N_REGIMES as i32 - 1 {
            return [0.0; N_COEFFICIENTS];
        }
        let i = index as usize;
        let width = 10f64.powf(pwr + 1.0) - 10f64.powf(pwr);
        let mut out = [0.0; N_COEFFICIENTS];
        for (c, value) in out.iter_mut().enumerate() {
            *value = (self.rows[i + 1][c] - self.rows[i][c]) / width;
        }
        out
    }

    /// ∂(ln Keq)/∂A_c, the basis functions of the fit at temperature `t`.
    #[inline]
    pub fn ln_keq_basis(t: f64) -> [f64; N_COEFFICIENTS] {
        let x = 1e4 / t;
        [1.0 / x, 1.0, x.ln(), x, x * x]
    }

    /// Evaluate ln Keq at temperature `t` for the given coefficients.
    #[inline]
    pub fn ln_keq(coefficients: &[f64; N_COEFFICIENTS], t: f64) -> f64 {
        let x = 1e4 / t;
        coefficients[0] / x
            + coefficients[1]
            + coefficients[2] * x.ln()
            + coefficients[3] * x
            + coefficients[4] * x * x
    }

    /// d(ln Keq)/dT for the given coefficients.
    #[inline]
    pub fn dln_keq_dt(coefficients: &[f64; N_COEFFICIENTS], t: f64) -> f64 {
        let x = 1e4 / t;
        (coefficients[0] / x - coefficients[2] - coefficients[3] * x - 2.0 * coefficients[4] * x * x)
            / t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EquilibriumTable {
        let mut rows = [[0.0; N_COEFFICIENTS]; N_REGIMES];
        for (k, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value = (10 * k + c) as f64;
            }
        }
        EquilibriumTable::new(rows)
    }

    #[test]
    fn test_clamps_below_lowest_regime() {
        let t = table();
        assert_eq!(t.coefficients(1e10), t.rows[0]);
        assert_eq!(t.coefficients(5e14), t.rows[0]);
        assert_eq!(t.coefficients(0.0), t.rows[0]);
    }

    #[test]
    fn test_clamps_above_highest_regime() {
        let t = table();
        assert_eq!(t.coefficients(1e19), t.rows[5]);
        assert_eq!(t.coefficients(3e25), t.rows[5]);
    }

    #[test]
    fn test_interpolates_within_decade() {
        let t = table();
        // n = 1e16 sits on row 2 exactly
        let c = t.coefficients(1e16);
        for k in 0..N_COEFFICIENTS {
            assert!((c[k] - t.rows[2][k]).abs() < 1e-9);
        }
        // Halfway through the 1e16 decade
        let c = t.coefficients(5.5e16);
        for k in 0..N_COEFFICIENTS {
            let expected = 0.5 * (t.rows[2][k] + t.rows[3][k]);
            assert!((c[k] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_slopes_vanish_where_clamped() {
        let t = table();
        assert_eq!(t.coefficient_slopes(1e12), [0.0; N_COEFFICIENTS]);
        assert_eq!(t.coefficient_slopes(2e20), [0.0; N_COEFFICIENTS]);
        let n = 3e17;
        let dn = 1e10;
        let hi = t.coefficients(n + dn);
        let lo = t.coefficients(n - dn);
        let slopes = t.coefficient_slopes(n);
        for k in 0..N_COEFFICIENTS {
            assert!((slopes[k] - (hi[k] - lo[k]) / (2.0 * dn)).abs() < 1e-6 * slopes[k].abs());
        }
    }

    #[test]
    fn test_ln_keq_derivative() {
        let c = [1.5, 1.6, 1.2, -11.5, -0.01];
        let t = 7000.0;
        let dt = 1e-3;
        let fd = (EquilibriumTable::ln_keq(&c, t + dt) - EquilibriumTable::ln_keq(&c, t - dt))
            / (2.0 * dt);
        assert!((EquilibriumTable::dln_keq_dt(&c, t) - fd).abs() < 1e-8);
    }
}
