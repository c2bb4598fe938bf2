//! Exact projected inviscid flux and its Jacobian.
//!
//! For a normal n (area-scaled or unit) and q = u·n:
//!
//! F·n = [ρ_s q, ρ u q + P n, ρ H q, ρEve q]

use faer::Mat;

use crate::types::VariableLayout;

/// Projected inviscid flux F(U)·n.
///
/// # Arguments
/// * `u` - Conserved state
/// * `v` - Primitive state (density, velocity, pressure, total enthalpy)
/// * `normal` - Face normal; its magnitude scales the flux
/// * `flux` - Output of length nVar
pub fn inviscid_proj_flux(
    layout: &VariableLayout,
    u: &[f64],
    v: &[f64],
    normal: &[f64],
    flux: &mut [f64],
) {
    let ns = layout.n_species();
    let nd = layout.n_dim();
    let rho = v[layout.rho()];
    let p = v[layout.p()];
    let q = layout.projected_velocity(v, normal);

    for s in 0..ns {
        flux[s] = u[s] * q;
    }
    for d in 0..nd {
        flux[layout.momentum() + d] = rho * v[layout.vel() + d] * q + p * normal[d];
    }
    flux[layout.energy()] = rho * v[layout.h()] * q;
    flux[layout.eve()] = u[layout.eve()] * q;
}

/// Jacobian ∂(F·n)/∂U multiplied by `scale` (overwrites `jac`).
///
/// Pressure enters through the supplied derivatives `dpdu`.
pub fn inviscid_proj_jacobian(
    layout: &VariableLayout,
    u: &[f64],
    v: &[f64],
    dpdu: &[f64],
    normal: &[f64],
    scale: f64,
    jac: &mut Mat<f64>,
) {
    let ns = layout.n_species();
    let nd = layout.n_dim();
    let mom = layout.momentum();
    let e = layout.energy();
    let ev = layout.eve();

    let rho = v[layout.rho()];
    let h = v[layout.h()];
    let eve = u[ev] / rho;
    let q = layout.projected_velocity(v, normal);
    let vel = &v[layout.vel()..layout.vel() + nd];

    crate::linalg::zero(jac);

    for s in 0..ns {
        let y = u[s] / rho;
        for k in 0..ns {
            jac[(s, k)] = -y * q;
        }
        jac[(s, s)] += q;
        for d in 0..nd {
            jac[(s, mom + d)] = y * normal[d];
        }
    }

    for d in 0..nd {
        let row = mom + d;
        for k in 0..ns {
            jac[(row, k)] = -vel[d] * q + dpdu[k] * normal[d];
        }
        for c in 0..nd {
            jac[(row, mom + c)] = vel[d] * normal[c] + dpdu[mom + c] * normal[d];
        }
        jac[(row, row)] += q;
        jac[(row, e)] = dpdu[e] * normal[d];
        jac[(row, ev)] = dpdu[ev] * normal[d];
    }

    for k in 0..ns {
        jac[(e, k)] = (dpdu[k] - h) * q;
    }
    for c in 0..nd {
        jac[(e, mom + c)] = h * normal[c] + dpdu[mom + c] * q;
    }
    jac[(e, e)] = (1.0 + dpdu[e]) * q;
    jac[(e, ev)] = dpdu[ev] * q;

    for k in 0..ns {
        jac[(ev, k)] = -eve * q;
    }
    for c in 0..nd {
        jac[(ev, mom + c)] = eve * normal[c];
    }
    jac[(ev, ev)] = q;

    if scale != 1.0 {
        crate::linalg::scale(jac, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GasConfig;
    use crate::thermo::TwoTemperatureGas;

    #[test]
    fn test_flux_scales_with_area() {
        let gas = TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap();
        let layout = VariableLayout::new(2, 2);
        let st = gas
            .state_from_primitives(layout, &[0.01, 0.002], 3000.0, 2000.0, &[500.0, 100.0])
            .unwrap();
        let mut f1 = vec![0.0; 6];
        let mut f3 = vec![0.0; 6];
        inviscid_proj_flux(&layout, &st.u, &st.v, &[0.6, 0.8], &mut f1);
        inviscid_proj_flux(&layout, &st.u, &st.v, &[1.8, 2.4], &mut f3);
        for k in 0..6 {
            assert!((3.0 * f1[k] - f3[k]).abs() < 1e-9 * f3[k].abs().max(1.0));
        }
        // Mass flux equals ρ q
        let q = 0.6 * 500.0 + 0.8 * 100.0;
        assert!((f1[0] + f1[1] - 0.012 * q).abs() < 1e-12);
    }

    #[test]
    fn test_jacobian_matches_finite_differences() {
        let gas = TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap();
        let layout = VariableLayout::new(2, 3);
        let st = gas
            .state_from_primitives(layout, &[0.02, 0.001], 5000.0, 3000.0, &[900.0, -150.0, 300.0])
            .unwrap();
        let normal = [0.3, -0.2, 1.1];
        let nv = layout.n_var();
        let mut jac = Mat::zeros(nv, nv);
        inviscid_proj_jacobian(&layout, &st.u, &st.v, &st.dpdu, &normal, 0.5, &mut jac);

        let mut fp = vec![0.0; nv];
        let mut fm = vec![0.0; nv];
        for k in 0..nv {
            let h = 1e-6 * st.u[k].abs().max(1e-4);
            let mut up = st.u.clone();
            let mut um = st.u.clone();
            up[k] += h;
            um[k] -= h;
            let sp = gas.state_from_conserved(layout, &up).unwrap();
            let sm = gas.state_from_conserved(layout, &um).unwrap();
            inviscid_proj_flux(&layout, &sp.u, &sp.v, &normal, &mut fp);
            inviscid_proj_flux(&layout, &sm.u, &sm.v, &normal, &mut fm);
            for i in 0..nv {
                let fd = 0.5 * (fp[i] - fm[i]) / (2.0 * h);
                let scale = jac[(i, k)].abs().max(1.0);
                assert!(
                    (jac[(i, k)] - fd).abs() < 1e-5 * scale,
                    "J[{i}][{k}] = {} vs fd {fd}",
                    jac[(i, k)]
                );
            }
        }
    }
}
