//! Integration tests for the convective flux schemes.
//!
//! These tests verify:
//! - Consistency: equal states give the exact projected flux
//! - The single-species reference state shared by Roe, AUSM and Lax
//! - Mirror antisymmetry F(L, R, n) = −F(R, L, −n) of the upwind schemes
//! - The pressure-weighted AUSMPW+ flux, which breaks that symmetry
//! - The exact projected Jacobian against finite differences

use std::sync::Arc;

use approx::assert_relative_eq;
use faer::Mat;
use tne2_rs::config::{AusmPwInputs, GasConfig, NumericsConfig, SpeciesData};
use tne2_rs::constants::RU;
use tne2_rs::flux::{
    ConvectiveFlux, FaceInputs, FluxOutput, FluxSchemeKind, create_scheme, entropy_fix,
    inviscid_proj_flux, inviscid_proj_jacobian,
};
use tne2_rs::{GasState, TwoTemperatureGas, VariableLayout};

fn nitrogen() -> Arc<TwoTemperatureGas> {
    Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap())
}

fn exact_flux(layout: &VariableLayout, state: &GasState, normal: &[f64]) -> Vec<f64> {
    let mut flux = vec![0.0; layout.n_var()];
    inviscid_proj_flux(layout, &state.u, &state.v, normal, &mut flux);
    flux
}

fn assert_flux_close(actual: &[f64], expected: &[f64], tol: f64, what: &str) {
    let scale = expected.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    for (k, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tol * scale,
            "{what}: entry {k} is {a}, expected {e}"
        );
    }
}

/// Every scheme reduces to the physical flux when both sides agree.
#[test]
fn test_uniform_state_consistency() {
    let gas = nitrogen();
    for n_dim in [2, 3] {
        let config = NumericsConfig::new(n_dim).with_ausmpw_inputs(AusmPwInputs::Restored);
        let layout = config.layout(2).unwrap();
        let velocity: Vec<f64> = [250.0, -80.0, 40.0][..n_dim].to_vec();
        let state = gas
            .state_from_primitives(layout, &[0.03, 0.004], 2500.0, 1800.0, &velocity)
            .unwrap();
        let normal: Vec<f64> = [0.3, 0.4, -0.2][..n_dim].to_vec();
        let expected = exact_flux(&layout, &state, &normal);

        for kind in FluxSchemeKind::ALL {
            let mut scheme = create_scheme(kind, gas.clone(), &config).unwrap();
            let mut out = FluxOutput::new(layout);
            scheme.compute(&FaceInputs::from_states(&state, &state, &normal), &mut out);
            assert_flux_close(&out.residual, &expected, 1e-10, &format!("{kind} in {n_dim}D"));
        }
    }
}

/// Single species at rest-frame conditions: ρ = 1, u = (100, 0), P = 1 atm.
#[test]
fn test_single_species_reference_state() {
    let n2 = SpeciesData::new("N2", 28.0134)
        .with_rotational_modes(2.0)
        .with_theta_v(3395.0);
    let gas = Arc::new(TwoTemperatureGas::new(GasConfig::new(vec![n2])).unwrap());
    let config = NumericsConfig::new(2);
    let layout = config.layout(1).unwrap();

    let rho = 1.0;
    let pressure = 101_325.0;
    let t = pressure / (rho * RU / 28.0134);
    let state = gas
        .state_from_primitives(layout, &[rho], t, t, &[100.0, 0.0])
        .unwrap();
    assert_relative_eq!(state.v[layout.p()], pressure, max_relative = 1e-12);

    let normal = [0.7, 0.2];
    let expected = exact_flux(&layout, &state, &normal);
    let mom = layout.momentum();
    assert_relative_eq!(expected[0], rho * 100.0 * 0.7, max_relative = 1e-12);
    assert_relative_eq!(
        expected[mom],
        rho * 100.0 * 100.0 * 0.7 + pressure * 0.7,
        max_relative = 1e-12
    );
    assert_relative_eq!(expected[mom + 1], pressure * 0.2, max_relative = 1e-12);

    let face = FaceInputs::from_states(&state, &state, &normal);
    let mut fluxes = Vec::new();
    for kind in [FluxSchemeKind::Roe, FluxSchemeKind::Ausm, FluxSchemeKind::Lax] {
        let mut scheme = create_scheme(kind, gas.clone(), &config).unwrap();
        let mut out = FluxOutput::new(layout);
        scheme.compute(&face, &mut out);
        assert_flux_close(&out.residual, &expected, 1e-12, kind.name());
        fluxes.push(out.residual);
    }
    assert_flux_close(&fluxes[0], &fluxes[1], 1e-12, "roe vs ausm");
    assert_flux_close(&fluxes[1], &fluxes[2], 1e-12, "ausm vs lax");
}

fn mirror_states(gas: &TwoTemperatureGas, layout: VariableLayout) -> (GasState, GasState) {
    let left = gas
        .state_from_primitives(layout, &[0.02, 0.003], 3000.0, 2200.0, &[600.0, 50.0])
        .unwrap();
    let right = gas
        .state_from_primitives(layout, &[0.035, 0.002], 4200.0, 2600.0, &[350.0, -20.0])
        .unwrap();
    (left, right)
}

/// F(L, R, n) and F(R, L, −n) for one scheme.
fn mirrored_fluxes(
    kind: FluxSchemeKind,
    gas: &Arc<TwoTemperatureGas>,
    config: &NumericsConfig,
) -> (Vec<f64>, Vec<f64>) {
    let layout = config.layout(2).unwrap();
    let (left, right) = mirror_states(gas, layout);
    let normal = [0.8, -0.6];
    let flipped = [-0.8, 0.6];
    let mut scheme = create_scheme(kind, gas.clone(), config).unwrap();
    let mut forward = FluxOutput::new(layout);
    let mut backward = FluxOutput::new(layout);
    scheme.compute(&FaceInputs::from_states(&left, &right, &normal), &mut forward);
    scheme.compute(&FaceInputs::from_states(&right, &left, &flipped), &mut backward);
    (forward.residual, backward.residual)
}

/// Relabeling the sides and flipping the normal negates the flux.
#[test]
fn test_mirror_antisymmetry() {
    let gas = nitrogen();
    let config = NumericsConfig::new(2);

    for kind in [
        FluxSchemeKind::Roe,
        FluxSchemeKind::Msw,
        FluxSchemeKind::Ausm,
        FluxSchemeKind::AusmPlusUp2,
    ] {
        let (forward, backward) = mirrored_fluxes(kind, &gas, &config);
        let negated: Vec<f64> = backward.iter().map(|x| -x).collect();
        assert_flux_close(&forward, &negated, 1e-10, kind.name());
    }
}

/// The fL − fR pressure-weight term of AUSMPW+ is not odd under side swap.
#[test]
fn test_ausmpw_plus_is_not_mirror_antisymmetric() {
    let gas = nitrogen();
    let config = NumericsConfig::new(2).with_ausmpw_inputs(AusmPwInputs::Restored);
    let (forward, backward) = mirrored_fluxes(FluxSchemeKind::AusmPwPlus, &gas, &config);
    assert!(forward.iter().chain(&backward).all(|x| x.is_finite()));

    let scale = forward.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    let defect = forward
        .iter()
        .zip(&backward)
        .fold(0.0f64, |m, (f, b)| m.max((f + b).abs()));
    assert!(defect > 1e-3 * scale, "defect {defect} against flux scale {scale}");
}

#[test]
fn test_entropy_fix_is_monotone() {
    for &eps in &[1e-3, 0.5, 10.0] {
        for k in -50..=50 {
            let lambda = k as f64 * 0.37;
            let fixed = entropy_fix(lambda, eps);
            assert!(fixed >= lambda.abs());
            if lambda.abs() >= eps {
                assert_eq!(fixed, lambda.abs());
            }
        }
    }
}

/// Central differences through the conserved-to-primitive recovery.
#[test]
fn test_projected_jacobian_matches_finite_differences() {
    let gas = nitrogen();
    let config = NumericsConfig::new(3);
    let layout = config.layout(2).unwrap();
    let nv = layout.n_var();
    let state = gas
        .state_from_primitives(layout, &[0.02, 0.005], 4000.0, 3000.0, &[700.0, -150.0, 90.0])
        .unwrap();
    let normal = [0.2, 0.5, -0.4];

    let mut analytic = Mat::zeros(nv, nv);
    inviscid_proj_jacobian(&layout, &state.u, &state.v, &state.dpdu, &normal, 1.0, &mut analytic);

    for k in 0..nv {
        let h = 1e-6 * state.u[k].abs();
        let mut plus = state.u.clone();
        let mut minus = state.u.clone();
        plus[k] += h;
        minus[k] -= h;
        let fp = exact_flux(&layout, &gas.state_from_conserved(layout, &plus).unwrap(), &normal);
        let fm = exact_flux(&layout, &gas.state_from_conserved(layout, &minus).unwrap(), &normal);
        for r in 0..nv {
            let row_scale = (0..nv).fold(0.0f64, |m, c| m.max(analytic[(r, c)].abs()));
            let fd = (fp[r] - fm[r]) / (2.0 * h);
            assert!(
                (fd - analytic[(r, k)]).abs() <= 1e-5 * row_scale,
                "J[{r}][{k}]: analytic {}, finite difference {fd}",
                analytic[(r, k)]
            );
        }
    }
}

/// AUSM on a supersonic face returns the upstream flux.
#[test]
fn test_supersonic_upwinding() {
    let gas = nitrogen();
    let config = NumericsConfig::new(2).with_implicit(true);
    let layout = config.layout(2).unwrap();
    let left = gas
        .state_from_primitives(layout, &[0.01, 0.001], 800.0, 800.0, &[4000.0, 0.0])
        .unwrap();
    let right = gas
        .state_from_primitives(layout, &[0.012, 0.001], 900.0, 850.0, &[3800.0, 10.0])
        .unwrap();
    let normal = [1.0, 0.0];
    let expected = exact_flux(&layout, &left, &normal);

    let mut scheme = create_scheme(FluxSchemeKind::Ausm, gas.clone(), &config).unwrap();
    let mut out = FluxOutput::new(layout);
    scheme.compute(&FaceInputs::from_states(&left, &right, &normal), &mut out);
    assert_flux_close(&out.residual, &expected, 1e-12, "ausm");

    // The right state has no influence
    let nv = layout.n_var();
    for r in 0..nv {
        for c in 0..nv {
            assert_eq!(out.jacobian_j[(r, c)], 0.0);
        }
    }
}
