//! Eigenstructure of the projected TNE2 Euler flux Jacobian.
//!
//! For a unit normal n the projected Jacobian A = ∂(F·n)/∂U has eigenvalues
//!
//! - q (one per species, nDim−1 shear waves, vibrational energy)
//! - q + a, q − a (acoustic waves)
//!
//! with q = u·n and a the frozen sound speed. Eigenvalues and the columns of
//! the right-eigenvector matrix P are ordered
//! `[species.., shear.., q+a, q−a, vib]`.
//!
//! P is parameterized by the pressure derivatives ψ_k = ∂P/∂ρ_k,
//! β = ∂P/∂(ρE) and φ = ∂P/∂(ρEve). The acoustic energy entries use
//! h̃ ± a·q with h̃ = (a² − Σ Y_k ψ_k − φ·eve)/β + |u|², which equals the
//! total enthalpy H whenever the state is thermodynamically consistent and
//! keeps P⁻¹ an exact inverse otherwise.

use faer::Mat;

use crate::types::VariableLayout;

/// Tangent vectors completing an orthonormal basis with the unit normal.
///
/// In 2D the single tangent is the in-plane normal rotated by +90°, and the
/// second tangent is zero. In 3D, l ⊥ n is taken from the (0, −n_z, n_y)
/// direction (falling back to (−n_z, 0, n_x) for normals along x) and
/// m = n × l.
///
/// # Example
///
/// ```
/// use tne2_rs::flux::create_basis;
///
/// let (l, m) = create_basis(&[0.0, 0.0, 1.0]);
/// let dot = |a: &[f64; 3], b: &[f64; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
/// assert!(dot(&l, &m).abs() < 1e-14);
/// assert!((dot(&l, &l) - 1.0).abs() < 1e-14);
/// assert!(l[2].abs() < 1e-14 && m[2].abs() < 1e-14);
/// ```
pub fn create_basis(unit_normal: &[f64]) -> ([f64; 3], [f64; 3]) {
    if unit_normal.len() == 2 {
        return ([-unit_normal[1], unit_normal[0], 0.0], [0.0; 3]);
    }

    let n = [unit_normal[0], unit_normal[1], unit_normal[2]];
    let mut l = [0.0, -n[2], n[1]];
    if l[1] == 0.0 && l[2] == 0.0 {
        l = [-n[2], 0.0, n[0]];
    }
    let mut m = [
        n[1] * l[2] - n[2] * l[1],
        n[2] * l[0] - n[0] * l[2],
        n[0] * l[1] - n[1] * l[0],
    ];

    let norm_l = (l[0] * l[0] + l[1] * l[1] + l[2] * l[2]).sqrt();
    let norm_m = (m[0] * m[0] + m[1] * m[1] + m[2] * m[2]).sqrt();
    for d in 0..3 {
        l[d] /= norm_l;
        m[d] /= norm_m;
    }
    (l, m)
}

/// Harten-Hyman entropy fix of a single eigenvalue.
///
/// Returns `(λ² + ε²)/(2ε)` when |λ| < ε and |λ| otherwise. The result is
/// never below |λ|.
#[inline]
pub fn entropy_fix(lambda: f64, epsilon: f64) -> f64 {
    let abs = lambda.abs();
    if abs < epsilon {
        (lambda * lambda + epsilon * epsilon) / (2.0 * epsilon)
    } else {
        abs
    }
}

/// Quantities shared by P and P⁻¹ for one reference state.
struct EigenState {
    rho: f64,
    eve: f64,
    a: f64,
    beta: f64,
    phi: f64,
    sqvel: f64,
    q: f64,
    h_tilde: f64,
}

impl EigenState {
    fn new(layout: &VariableLayout, u: &[f64], v: &[f64], dpdu: &[f64], n: &[f64]) -> Self {
        let ns = layout.n_species();
        let rho = v[layout.rho()];
        let eve = u[layout.eve()] / rho;
        let a = v[layout.a()];
        let beta = dpdu[layout.energy()];
        let phi = dpdu[layout.eve()];
        let sqvel = layout.velocity_squared(v);
        let q = layout.projected_velocity(v, n);

        let mut y_psi = 0.0;
        for s in 0..ns {
            y_psi += v[s] / rho * dpdu[s];
        }
        let h_tilde = (a * a - y_psi - phi * eve) / beta + sqvel;

        Self {
            rho,
            eve,
            a,
            beta,
            phi,
            sqvel,
            q,
            h_tilde,
        }
    }
}

fn tangents(n_dim: usize, l: &[f64; 3], m: &[f64; 3]) -> [[f64; 3]; 2] {
    if n_dim == 2 { [*l, [0.0; 3]] } else { [*l, *m] }
}

/// Right-eigenvector matrix P of the projected Jacobian (overwrites `p`).
///
/// # Arguments
/// * `u`, `v`, `dpdu` - Reference state
/// * `n` - Unit normal
/// * `l`, `m` - Tangents from [`create_basis`]
pub fn p_matrix(
    layout: &VariableLayout,
    u: &[f64],
    v: &[f64],
    dpdu: &[f64],
    n: &[f64],
    l: &[f64; 3],
    m: &[f64; 3],
    p: &mut Mat<f64>,
) {
    let ns = layout.n_species();
    let nd = layout.n_dim();
    let mom = layout.momentum();
    let e = layout.energy();
    let ev = layout.eve();
    let st = EigenState::new(layout, u, v, dpdu, n);
    let vel = &v[layout.vel()..layout.vel() + nd];

    crate::linalg::zero(p);

    // Species columns
    for s in 0..ns {
        p[(s, s)] = 1.0;
        for d in 0..nd {
            p[(mom + d, s)] = vel[d];
        }
        p[(e, s)] = st.sqvel - (dpdu[s] + st.phi * st.eve) / st.beta;
        p[(ev, s)] = st.eve;
    }

    // Shear columns
    let tangents = tangents(nd, l, m);
    for (t, tau) in tangents.iter().enumerate().take(nd - 1) {
        let col = ns + t;
        let mut u_tau = 0.0;
        for d in 0..nd {
            p[(mom + d, col)] = tau[d];
            u_tau += vel[d] * tau[d];
        }
        p[(e, col)] = u_tau;
    }

    // Acoustic columns
    let plus = ns + nd - 1;
    let minus = ns + nd;
    for s in 0..ns {
        let y = v[s] / st.rho;
        p[(s, plus)] = y;
        p[(s, minus)] = y;
    }
    for d in 0..nd {
        p[(mom + d, plus)] = vel[d] + st.a * n[d];
        p[(mom + d, minus)] = vel[d] - st.a * n[d];
    }
    p[(e, plus)] = st.h_tilde + st.a * st.q;
    p[(e, minus)] = st.h_tilde - st.a * st.q;
    p[(ev, plus)] = st.eve;
    p[(ev, minus)] = st.eve;

    // Vibrational column
    let vib = ns + nd + 1;
    p[(e, vib)] = -st.phi / st.beta;
    p[(ev, vib)] = 1.0;
}

/// Inverse of [`p_matrix`] (overwrites `p_inv`).
pub fn p_matrix_inv(
    layout: &VariableLayout,
    u: &[f64],
    v: &[f64],
    dpdu: &[f64],
    n: &[f64],
    l: &[f64; 3],
    m: &[f64; 3],
    p_inv: &mut Mat<f64>,
) {
    let ns = layout.n_species();
    let nd = layout.n_dim();
    let mom = layout.momentum();
    let e = layout.energy();
    let ev = layout.eve();
    let st = EigenState::new(layout, u, v, dpdu, n);
    let vel = &v[layout.vel()..layout.vel() + nd];
    let a2 = st.a * st.a;

    crate::linalg::zero(p_inv);

    // Species rows: dρ_s − Y_s dP/a²
    for s in 0..ns {
        let y = v[s] / st.rho;
        for k in 0..ns {
            p_inv[(s, k)] = -y * dpdu[k] / a2;
        }
        p_inv[(s, s)] += 1.0;
        for d in 0..nd {
            p_inv[(s, mom + d)] = y * st.beta * vel[d] / a2;
        }
        p_inv[(s, e)] = -y * st.beta / a2;
        p_inv[(s, ev)] = -y * st.phi / a2;
    }

    // Shear rows: τ·(dm − u dρ)
    let tangents = tangents(nd, l, m);
    for (t, tau) in tangents.iter().enumerate().take(nd - 1) {
        let row = ns + t;
        let u_tau: f64 = (0..nd).map(|d| vel[d] * tau[d]).sum();
        for k in 0..ns {
            p_inv[(row, k)] = -u_tau;
        }
        for d in 0..nd {
            p_inv[(row, mom + d)] = tau[d];
        }
    }

    // Acoustic rows: (dP/a² ± (n·dm − q dρ)/a)/2
    let plus = ns + nd - 1;
    let minus = ns + nd;
    for k in 0..ns {
        p_inv[(plus, k)] = 0.5 * (dpdu[k] / a2 - st.q / st.a);
        p_inv[(minus, k)] = 0.5 * (dpdu[k] / a2 + st.q / st.a);
    }
    for d in 0..nd {
        p_inv[(plus, mom + d)] = 0.5 * (-st.beta * vel[d] / a2 + n[d] / st.a);
        p_inv[(minus, mom + d)] = 0.5 * (-st.beta * vel[d] / a2 - n[d] / st.a);
    }
    p_inv[(plus, e)] = 0.5 * st.beta / a2;
    p_inv[(minus, e)] = 0.5 * st.beta / a2;
    p_inv[(plus, ev)] = 0.5 * st.phi / a2;
    p_inv[(minus, ev)] = 0.5 * st.phi / a2;

    // Vibrational row: dρEve − eve dρ
    let vib = ns + nd + 1;
    for k in 0..ns {
        p_inv[(vib, k)] = -st.eve;
    }
    p_inv[(vib, ev)] = 1.0;
}

/// Eigenvalues of the projected Jacobian in P's column order.
pub fn eigenvalues(layout: &VariableLayout, q: f64, a: f64, lambda: &mut [f64]) {
    let nd = layout.n_dim();
    let ns = layout.n_species();
    for value in lambda.iter_mut().take(ns + nd - 1) {
        *value = q;
    }
    lambda[ns + nd - 1] = q + a;
    lambda[ns + nd] = q - a;
    lambda[ns + nd + 1] = q;
}
