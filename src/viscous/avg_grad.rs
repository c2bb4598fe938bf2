//! Averaged-gradient viscous flux and its edge-corrected variant.

use std::sync::Arc;

use faer::Mat;

use crate::config::NumericsConfig;
use crate::error::{Result, Tne2Error};
use crate::flux::FluxOutput;
use crate::flux::traits::{FaceGeometry, scheme_layout};
use crate::linalg;
use crate::thermo::ThermoModel;
use crate::types::VariableLayout;

use super::{ViscousFlux, ViscousInputs, ViscousSide};

/// Mean state, mean gradients and the scratch matrices of the Jacobian.
#[derive(Clone)]
struct ViscousCore {
    thermo: Arc<dyn ThermoModel>,
    layout: VariableLayout,
    implicit: bool,
    mean_v: Vec<f64>,
    mean_eve: Vec<f64>,
    mean_cvve: Vec<f64>,
    mean_diffusion: Vec<f64>,
    mean_viscosity: f64,
    mean_k_tr: f64,
    mean_k_ve: f64,
    mean_grad: Mat<f64>,
    hs: Vec<f64>,
    /// ρD_s∇Y_s minus its mass-conserving correction, ns × nDim.
    species_flux: Mat<f64>,
    ys_i: Vec<f64>,
    ys_j: Vec<f64>,
    djdr_i: Mat<f64>,
    djdr_j: Mat<f64>,
    dfdv_i: Mat<f64>,
    dfdv_j: Mat<f64>,
    dvdu_i: Mat<f64>,
    dvdu_j: Mat<f64>,
}

impl ViscousCore {
    fn new(name: &str, thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        let layout = scheme_layout(name, thermo.as_ref(), config)?;
        if thermo.ionization() {
            return Err(Tne2Error::unsupported(
                "viscous species diffusion of ionized mixtures",
            ));
        }
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let nv = layout.n_var();
        Ok(Self {
            thermo,
            layout,
            implicit: config.implicit,
            mean_v: vec![0.0; layout.n_prim_var()],
            mean_eve: vec![0.0; ns],
            mean_cvve: vec![0.0; ns],
            mean_diffusion: vec![0.0; ns],
            mean_viscosity: 0.0,
            mean_k_tr: 0.0,
            mean_k_ve: 0.0,
            mean_grad: Mat::zeros(layout.n_prim_var_grad(), nd),
            hs: vec![0.0; ns],
            species_flux: Mat::zeros(ns, nd),
            ys_i: vec![0.0; ns],
            ys_j: vec![0.0; ns],
            djdr_i: Mat::zeros(ns, ns),
            djdr_j: Mat::zeros(ns, ns),
            dfdv_i: Mat::zeros(nv, nv),
            dfdv_j: Mat::zeros(nv, nv),
            dvdu_i: Mat::zeros(nv, nv),
            dvdu_j: Mat::zeros(nv, nv),
        })
    }

    /// Arithmetic means of the two sides. Species slots of the mean state
    /// hold mass fractions and species gradient rows hold ∇Y_s.
    fn average(&mut self, face: &ViscousInputs<'_>) {
        let layout = self.layout;
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let rho = layout.rho();
        let (i, j) = (&face.i, &face.j);

        for k in 0..layout.n_prim_var() {
            self.mean_v[k] = 0.5 * (i.v[k] + j.v[k]);
        }
        for s in 0..ns {
            self.ys_i[s] = i.v[s] / i.v[rho];
            self.ys_j[s] = j.v[s] / j.v[rho];
            self.mean_v[s] = 0.5 * (self.ys_i[s] + self.ys_j[s]);
            self.mean_eve[s] = 0.5 * (i.eve[s] + j.eve[s]);
            self.mean_cvve[s] = 0.5 * (i.cvve[s] + j.cvve[s]);
            self.mean_diffusion[s] =
                0.5 * (i.transport.diffusion[s] + j.transport.diffusion[s]);
        }
        self.mean_viscosity = 0.5 * (i.transport.viscosity + j.transport.viscosity);
        self.mean_k_tr = 0.5 * (i.transport.conductivity_tr + j.transport.conductivity_tr);
        self.mean_k_ve = 0.5 * (i.transport.conductivity_ve + j.transport.conductivity_ve);

        // ∇Y_s = (∇ρ_s − Y_s∇ρ)/ρ on each side
        for s in 0..ns {
            for d in 0..nd {
                let side = |c: &ViscousSide<'_>, ys: f64| {
                    (c.grad[(s, d)] - ys * c.grad[(rho, d)]) / c.v[rho]
                };
                self.mean_grad[(s, d)] =
                    0.5 * (side(i, self.ys_i[s]) + side(j, self.ys_j[s]));
            }
        }
        for k in ns..layout.n_prim_var_grad() {
            for d in 0..nd {
                self.mean_grad[(k, d)] = 0.5 * (i.grad[(k, d)] + j.grad[(k, d)]);
            }
        }
    }

    /// Replace the edge component of every mean gradient with the finite
    /// difference between the two cell centers.
    fn correct_along_edge(&mut self, face: &ViscousInputs<'_>) {
        let layout = self.layout;
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let mut edge = [0.0; 3];
        let mut dist2 = 0.0;
        for d in 0..nd {
            edge[d] = face.j.coord[d] - face.i.coord[d];
            dist2 += edge[d] * edge[d];
        }

        for k in 0..layout.n_prim_var_grad() {
            let jump = if k < ns {
                self.ys_j[k] - self.ys_i[k]
            } else {
                face.j.v[k] - face.i.v[k]
            };
            let projected: f64 = (0..nd).map(|d| self.mean_grad[(k, d)] * edge[d]).sum();
            let correction = (projected - jump) / dist2;
            for d in 0..nd {
                self.mean_grad[(k, d)] -= correction * edge[d];
            }
        }
    }

    /// Viscous flux of the mean state projected on `normal`.
    fn projected_flux(&mut self, normal: &[f64], residual: &mut [f64]) {
        let layout = self.layout;
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let e = layout.energy();
        let ev = layout.eve();
        let mom = layout.momentum();
        let rho = self.mean_v[layout.rho()];
        let t = self.mean_v[layout.t()];
        let mu = self.mean_viscosity;
        let grad = &self.mean_grad;

        for s in 0..ns {
            self.hs[s] = self.thermo.species_enthalpy(t, self.mean_eve[s], s);
        }

        let mut diffusion_sum = [0.0; 3];
        for d in 0..nd {
            for s in 0..ns {
                diffusion_sum[d] += rho * self.mean_diffusion[s] * grad[(s, d)];
            }
            for s in 0..ns {
                self.species_flux[(s, d)] = rho * self.mean_diffusion[s] * grad[(s, d)]
                    - self.mean_v[s] * diffusion_sum[d];
            }
        }

        let vel = layout.vel();
        let divergence: f64 = (0..nd).map(|d| grad[(vel + d, d)]).sum();
        let mut tau = [[0.0; 3]; 3];
        for a in 0..nd {
            for b in 0..nd {
                tau[a][b] = mu * (grad[(vel + b, a)] + grad[(vel + a, b)]);
            }
            tau[a][a] -= 2.0 / 3.0 * mu * divergence;
        }

        residual.fill(0.0);
        for d in 0..nd {
            let n = normal[d];
            let mut energy = self.mean_k_tr * grad[(layout.t(), d)]
                + self.mean_k_ve * grad[(layout.tve(), d)];
            let mut vib = self.mean_k_ve * grad[(layout.tve(), d)];
            for s in 0..ns {
                let f = self.species_flux[(s, d)];
                residual[s] += f * n;
                energy += f * self.hs[s];
                vib += f * self.mean_eve[s];
            }
            for b in 0..nd {
                residual[mom + b] += tau[d][b] * n;
                energy += tau[d][b] * self.mean_v[vel + b];
            }
            residual[e] += energy * n;
            residual[ev] += vib * n;
        }
    }

    /// ∂J_s/∂ρ_k of the two-point species diffusion flux.
    fn diffusion_jacobian(&mut self, rho_i: f64, rho_j: f64, coef: f64) {
        let ns = self.layout.n_species();
        let (ys_i, ys_j, ds) = (&self.ys_i, &self.ys_j, &self.mean_diffusion);
        let mut sum_y = 0.0;
        let mut sum_y_i = 0.0;
        let mut sum_y_j = 0.0;
        for s in 0..ns {
            sum_y_i += ds[s] * coef * ys_i[s];
            sum_y_j += ds[s] * coef * ys_j[s];
            sum_y += ds[s] * coef * (ys_j[s] - ys_i[s]);
        }
        let rho_sum = rho_i + rho_j;

        for s in 0..ns {
            let y_sum = ys_i[s] + ys_j[s];
            for k in 0..ns {
                self.djdr_j[(s, k)] = 0.5 * ds[s] * coef * (ys_j[s] * rho_i / rho_j + ys_i[s])
                    + 0.25 * (ys_i[s] - rho_i / rho_j * ys_j[s]) * sum_y
                    + 0.25 * y_sum * rho_sum * ds[k] * coef / rho_j
                    - 0.25 * y_sum * rho_sum * sum_y_j / rho_j;
                self.djdr_i[(s, k)] = -0.5 * ds[s] * coef * (ys_j[s] + ys_i[s] * rho_j / rho_i)
                    + 0.25 * (ys_j[s] - rho_j / rho_i * ys_i[s]) * sum_y
                    - 0.25 * y_sum * rho_sum * ds[k] * coef / rho_i
                    + 0.25 * y_sum * rho_sum * sum_y_i / rho_i;
            }
            self.djdr_j[(s, s)] +=
                -0.5 * ds[s] * coef * (1.0 + rho_i / rho_j) + 0.25 * (1.0 + rho_i / rho_j) * sum_y;
            self.djdr_i[(s, s)] +=
                0.5 * ds[s] * coef * (1.0 + rho_j / rho_i) + 0.25 * (1.0 + rho_j / rho_i) * sum_y;
        }
    }

    /// ∂V/∂U of one side, with V ordered as (ρ_s, u, T, Tve).
    fn primitive_jacobian(layout: &VariableLayout, side: &ViscousSide<'_>, dvdu: &mut Mat<f64>) {
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let rho = side.v[layout.rho()];
        linalg::zero(dvdu);
        for s in 0..ns {
            dvdu[(s, s)] = 1.0;
        }
        for d in 0..nd {
            let row = layout.momentum() + d;
            let u = side.v[layout.vel() + d];
            for s in 0..ns {
                dvdu[(row, s)] = -u / rho;
            }
            dvdu[(row, row)] = 1.0 / rho;
        }
        for k in 0..layout.n_var() {
            dvdu[(layout.energy(), k)] = side.dtdu[k];
            dvdu[(layout.eve(), k)] = side.dtvedu[k];
        }
    }

    /// Both Jacobian blocks, given the flux already written to the residual.
    fn jacobians(&mut self, face: &ViscousInputs<'_>, out: &mut FluxOutput) {
        let fv = &out.residual;
        let layout = self.layout;
        let ns = layout.n_species();
        let nd = layout.n_dim();
        let nv = layout.n_var();
        let mom = layout.momentum();
        let e = layout.energy();
        let ev = layout.eve();

        let geo = FaceGeometry::new(face.normal);
        let n = geo.unit_normal();
        let ds = face.normal.iter().map(|x| x * x).sum::<f64>().sqrt();
        let theta: f64 = n.iter().map(|x| x * x).sum();
        let dist = face.distance();
        let mu = self.mean_viscosity;

        let rho_i = face.i.v[layout.rho()];
        let rho_j = face.j.v[layout.rho()];
        self.diffusion_jacobian(rho_i, rho_j, theta / dist);

        Self::primitive_jacobian(&layout, &face.i, &mut self.dvdu_i);
        Self::primitive_jacobian(&layout, &face.j, &mut self.dvdu_j);

        linalg::zero(&mut self.dfdv_j);
        for a in 0..nd {
            let mut pi = 0.0;
            for b in 0..nd {
                let mut geom = n[a] * n[b] / 3.0;
                if a == b {
                    geom += theta;
                }
                self.dfdv_j[(mom + a, mom + b)] = mu * geom / dist * ds;
                pi += geom * self.mean_v[layout.vel() + b];
            }
            self.dfdv_j[(e, mom + a)] = mu / dist * pi * ds;
        }
        self.dfdv_j[(e, e)] = self.mean_k_tr * theta / dist * ds;
        self.dfdv_j[(e, ev)] = self.mean_k_ve * theta / dist * ds;
        self.dfdv_j[(ev, ev)] = self.mean_k_ve * theta / dist * ds;

        for r in 0..nv {
            for c in 0..nv {
                self.dfdv_i[(r, c)] = -self.dfdv_j[(r, c)];
            }
        }

        // Terms shared by both sides
        let mut common_t = 0.0;
        let mut common_tve = 0.0;
        for s in 0..ns {
            common_t += 0.5
                * fv[s]
                * (self.thermo.gas_constant(s) + self.thermo.translational_cv(s));
            common_tve += 0.5 * fv[s] * self.mean_cvve[s];
        }
        for dfdv in [&mut self.dfdv_i, &mut self.dfdv_j] {
            for d in 0..nd {
                dfdv[(e, mom + d)] += 0.5 * fv[mom + d];
            }
            dfdv[(e, e)] += common_t;
            dfdv[(e, ev)] += common_tve;
            dfdv[(ev, ev)] += common_tve;
        }

        for s in 0..ns {
            for k in 0..ns {
                self.dfdv_i[(s, k)] -= self.djdr_i[(s, k)] * ds;
                self.dfdv_j[(s, k)] -= self.djdr_j[(s, k)] * ds;
                self.dfdv_i[(e, s)] -= self.djdr_i[(k, s)] * self.hs[k] * ds;
                self.dfdv_j[(e, s)] -= self.djdr_j[(k, s)] * self.hs[k] * ds;
                self.dfdv_i[(ev, s)] -= self.djdr_i[(k, s)] * self.mean_eve[k] * ds;
                self.dfdv_j[(ev, s)] -= self.djdr_j[(k, s)] * self.mean_eve[k] * ds;
            }
        }

        linalg::mat_mul(&self.dfdv_i, &self.dvdu_i, &mut out.jacobian_i);
        linalg::mat_mul(&self.dfdv_j, &self.dvdu_j, &mut out.jacobian_j);
    }

    fn evaluate(
        &mut self,
        face: &ViscousInputs<'_>,
        out: &mut FluxOutput,
        corrected: bool,
    ) -> Result<()> {
        face.validate(&self.layout)?;
        self.average(face);
        if corrected {
            self.correct_along_edge(face);
        }
        self.projected_flux(face.normal, &mut out.residual);
        if self.implicit {
            self.jacobians(face, out);
        }
        Ok(())
    }
}

/// Viscous flux from the arithmetic mean of the two cell gradients.
#[derive(Clone)]
pub struct AvgGradFlux {
    core: ViscousCore,
}

impl AvgGradFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        Ok(Self {
            core: ViscousCore::new("AvgGrad", thermo, config)?,
        })
    }

    /// Mean primitive gradients of the last evaluated face.
    pub fn mean_gradient(&self) -> &Mat<f64> {
        &self.core.mean_grad
    }
}

impl ViscousFlux for AvgGradFlux {
    fn compute(&mut self, face: &ViscousInputs<'_>, out: &mut FluxOutput) -> Result<()> {
        self.core.evaluate(face, out, false)
    }

    fn name(&self) -> &'static str {
        "avg_grad"
    }

    fn layout(&self) -> VariableLayout {
        self.core.layout
    }

    fn is_implicit(&self) -> bool {
        self.core.implicit
    }
}

/// Averaged-gradient flux with the edge-normal correction for skewed
/// meshes.
#[derive(Clone)]
pub struct AvgGradCorrectedFlux {
    core: ViscousCore,
}

impl AvgGradCorrectedFlux {
    pub fn new(thermo: Arc<dyn ThermoModel>, config: &NumericsConfig) -> Result<Self> {
        Ok(Self {
            core: ViscousCore::new("AvgGradCorrected", thermo, config)?,
        })
    }

    /// Corrected mean primitive gradients of the last evaluated face.
    pub fn mean_gradient(&self) -> &Mat<f64> {
        &self.core.mean_grad
    }
}

impl ViscousFlux for AvgGradCorrectedFlux {
    fn compute(&mut self, face: &ViscousInputs<'_>, out: &mut FluxOutput) -> Result<()> {
        self.core.evaluate(face, out, true)
    }

    fn name(&self) -> &'static str {
        "avg_grad_corrected"
    }

    fn layout(&self) -> VariableLayout {
        self.core.layout
    }

    fn is_implicit(&self) -> bool {
        self.core.implicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GasConfig;
    use crate::thermo::{GasState, TwoTemperatureGas};
    use crate::viscous::TransportProperties;
    use approx::assert_relative_eq;

    const MU: f64 = 2.0e-5;
    const K_TR: f64 = 0.05;
    const K_VE: f64 = 0.01;

    fn gas() -> Arc<TwoTemperatureGas> {
        Arc::new(TwoTemperatureGas::new(GasConfig::nitrogen()).unwrap())
    }

    fn transport() -> TransportProperties {
        TransportProperties::uniform(2, 1.0e-4, MU, K_TR, K_VE)
    }

    fn state(gas: &TwoTemperatureGas, layout: VariableLayout, t: f64) -> GasState {
        gas.state_from_primitives(layout, &[0.02, 0.004], t, 0.9 * t, &[300.0, 40.0])
            .unwrap()
    }

    #[test]
    fn test_rejects_ionized_mixture() {
        let config = NumericsConfig::new(2);
        let model = TwoTemperatureGas::new(GasConfig::nitrogen().with_ionization(true)).unwrap();
        assert!(matches!(
            AvgGradFlux::new(Arc::new(model), &config),
            Err(Tne2Error::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_gradients_give_zero_flux() {
        let gas = gas();
        let config = NumericsConfig::new(2);
        let mut visc = AvgGradFlux::new(gas.clone(), &config).unwrap();
        let layout = visc.layout();
        let st = state(&gas, layout, 1500.0);
        let grad = Mat::zeros(layout.n_prim_var_grad(), 2);
        let tr = transport();
        let side_i = ViscousSide::new(&st, &grad, &tr, &[0.0, 0.0]);
        let side_j = ViscousSide::new(&st, &grad, &tr, &[1.0e-3, 0.0]);
        let normal = [2.0, 0.0];
        let mut out = FluxOutput::new(layout);
        visc.compute(&ViscousInputs::new(side_i, side_j, &normal), &mut out)
            .unwrap();
        assert!(out.residual.iter().all(|r| r.abs() < 1e-14));
    }

    #[test]
    fn test_shear_and_conduction() {
        let gas = gas();
        let config = NumericsConfig::new(2);
        let mut visc = AvgGradFlux::new(gas.clone(), &config).unwrap();
        let layout = visc.layout();
        let st = state(&gas, layout, 1500.0);
        let shear = 1.0e3;
        let dt_dx = 2.0e4;
        let mut grad = Mat::zeros(layout.n_prim_var_grad(), 2);
        // ∂u/∂y only
        grad[(layout.vel(), 1)] = shear;
        grad[(layout.t(), 1)] = dt_dx;
        let tr = transport();
        let side_i = ViscousSide::new(&st, &grad, &tr, &[0.0, 0.0]);
        let side_j = ViscousSide::new(&st, &grad, &tr, &[0.0, 1.0e-3]);
        let area = 0.5;
        let normal = [0.0, area];
        let mut out = FluxOutput::new(layout);
        visc.compute(&ViscousInputs::new(side_i, side_j, &normal), &mut out)
            .unwrap();

        let mom = layout.momentum();
        assert_relative_eq!(out.residual[mom], MU * shear * area, max_relative = 1e-12);
        assert!(out.residual[mom + 1].abs() < 1e-14);
        let u = st.v[layout.vel()];
        let expected_energy = (MU * shear * u + K_TR * dt_dx) * area;
        assert_relative_eq!(out.residual[layout.energy()], expected_energy, max_relative = 1e-12);
        assert!(out.residual[layout.eve()].abs() < 1e-14);
    }

    #[test]
    fn test_species_diffusion_conserves_mass() {
        let gas = gas();
        let config = NumericsConfig::new(2);
        let mut visc = AvgGradFlux::new(gas.clone(), &config).unwrap();
        let layout = visc.layout();
        let st = state(&gas, layout, 3000.0);
        let mut grad = Mat::zeros(layout.n_prim_var_grad(), 2);
        grad[(0, 0)] = 5.0;
        grad[(1, 0)] = -2.0;
        grad[(layout.rho(), 0)] = 3.0;
        let tr = TransportProperties {
            diffusion: vec![1.0e-4, 3.0e-4],
            ..transport()
        };
        let side_i = ViscousSide::new(&st, &grad, &tr, &[0.0, 0.0]);
        let side_j = ViscousSide::new(&st, &grad, &tr, &[1.0e-3, 0.0]);
        let normal = [1.0, 0.0];
        let mut out = FluxOutput::new(layout);
        visc.compute(&ViscousInputs::new(side_i, side_j, &normal), &mut out)
            .unwrap();
        assert!(out.residual[0].abs() > 0.0);
        assert!((out.residual[0] + out.residual[1]).abs() < 1e-15);
    }

    #[test]
    fn test_corrected_flux_uses_edge_difference() {
        let gas = gas();
        let config = NumericsConfig::new(2);
        let mut visc = AvgGradCorrectedFlux::new(gas.clone(), &config).unwrap();
        let layout = visc.layout();
        let left = state(&gas, layout, 1500.0);
        let mut right = left.clone();
        let delta_t = 10.0;
        right.v[layout.t()] += delta_t;
        let grad = Mat::zeros(layout.n_prim_var_grad(), 2);
        let tr = transport();
        let dist = 2.0e-3;
        let side_i = ViscousSide::new(&left, &grad, &tr, &[0.0, 0.0]);
        let coord_j = [dist, 0.0];
        let side_j = ViscousSide::new(&right, &grad, &tr, &coord_j);
        let area = 0.25;
        let normal = [area, 0.0];
        let mut out = FluxOutput::new(layout);
        visc.compute(&ViscousInputs::new(side_i, side_j, &normal), &mut out)
            .unwrap();

        assert_relative_eq!(visc.mean_gradient()[(layout.t(), 0)], delta_t / dist);
        assert_relative_eq!(
            out.residual[layout.energy()],
            K_TR * delta_t / dist * area,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_jacobian_blocks_are_antisymmetric_for_equal_states() {
        let gas = gas();
        let config = NumericsConfig::new(2).with_implicit(true);
        let mut visc = AvgGradFlux::new(gas.clone(), &config).unwrap();
        let layout = visc.layout();
        let nv = layout.n_var();
        let st = state(&gas, layout, 2000.0);
        let grad = Mat::zeros(layout.n_prim_var_grad(), 2);
        let tr = transport();
        let dist = 1.0e-3;
        let side_i = ViscousSide::new(&st, &grad, &tr, &[0.0, 0.0]);
        let coord_j = [0.6 * dist, 0.8 * dist];
        let side_j = ViscousSide::new(&st, &grad, &tr, &coord_j);
        let area = 0.3;
        let normal = [0.6 * area, 0.8 * area];
        let mut out = FluxOutput::new(layout);
        visc.compute(&ViscousInputs::new(side_i, side_j, &normal), &mut out)
            .unwrap();

        for r in 0..nv {
            for c in 0..nv {
                let scale = out.jacobian_j[(r, c)].abs().max(1e-12);
                assert!((out.jacobian_i[(r, c)] + out.jacobian_j[(r, c)]).abs() < 1e-10 * scale);
            }
        }

        let mom = layout.momentum();
        let rho = st.v[layout.rho()];
        let expected = MU * (1.0 + 0.36 / 3.0) / dist * area / rho;
        assert_relative_eq!(out.jacobian_j[(mom, mom)], expected, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_coincident_cell_centers() {
        let gas = gas();
        let config = NumericsConfig::new(2);
        let mut visc = AvgGradFlux::new(gas.clone(), &config).unwrap();
        let layout = visc.layout();
        let st = state(&gas, layout, 1500.0);
        let grad = Mat::zeros(layout.n_prim_var_grad(), 2);
        let tr = transport();
        let side = ViscousSide::new(&st, &grad, &tr, &[0.0, 0.0]);
        let normal = [1.0, 0.0];
        let mut out = FluxOutput::new(layout);
        assert!(matches!(
            visc.compute(&ViscousInputs::new(side, side, &normal), &mut out),
            Err(Tne2Error::InvalidState(_))
        ));
    }
}
