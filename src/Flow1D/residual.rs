//! # Residual engine
//!
//! Assembles the discretized governing equations of every point in the evaluation
//! window. Convective terms are upwinded on the local axial velocity (soot moments
//! on the velocity plus the thermophoretic drift), diffusive terms are central
//! differences of the face fluxes.
//!
//! | row | interior | left boundary | right boundary |
//! |-----|----------|---------------|----------------|
//! | U | continuity (flow type) | continuity to the right | `ρu` / `ρu_j − ρu_{j−1}` |
//! | V | radial momentum | `V` | `V` |
//! | T | energy or `T − T_fixed` | `T` or `T − T_fixed` | `T` / `T_j − T_{j−1}` or `T − T_fixed` |
//! | Λ | `Λ_j − Λ_{j−1}` | `−ρu` | `Λ_j − Λ_{j−1}` |
//! | Y_k | species | `−(j_k + ρu Y_k)`, excess `1 − ΣY` | `j_k + ρu Y_k`, excess `1 − ΣY` |
//! | S_m | soot moment | `−(J_S + ρu S)` | `J_S + ρu S` |
//!
//! `mask[i] == true` marks a differential row, which carries the `rdt` term.
use super::StFlow::StFlow;
use super::flow_api::{FlowError, FlowType};
use super::layout::{Component, OFFSET_L, OFFSET_T, OFFSET_U, OFFSET_V, OFFSET_Y};
use super::properties::column_mut;
use super::soot::SootLocalState;
use crate::GasModels::gas_api::GAS_CONSTANT;

impl StFlow {
    /////////////////////////////////////////////////////////////////////////////////
    //                     SOLUTION COMPONENTS
    /////////////////////////////////////////////////////////////////////////////////
    #[inline]
    fn u(&self, x: &[f64], j: usize) -> f64 {
        x[self.layout.index(OFFSET_U, j)]
    }
    #[inline]
    fn v(&self, x: &[f64], j: usize) -> f64 {
        x[self.layout.index(OFFSET_V, j)]
    }
    #[inline]
    fn t(&self, x: &[f64], j: usize) -> f64 {
        x[self.layout.index(OFFSET_T, j)]
    }
    #[inline]
    fn lambda(&self, x: &[f64], j: usize) -> f64 {
        x[self.layout.index(OFFSET_L, j)]
    }
    #[inline]
    fn y(&self, x: &[f64], k: usize, j: usize) -> f64 {
        x[self.layout.index(OFFSET_Y + k, j)]
    }
    #[inline]
    fn s(&self, x: &[f64], m: usize, j: usize) -> f64 {
        x[self.layout.index_of(Component::Soot(m), j)]
    }
    #[inline]
    fn rho_u(&self, x: &[f64], j: usize) -> f64 {
        self.props.rho[j] * self.u(x, j)
    }

    /// point on the upstream side of `j` for a velocity `w`
    #[inline]
    fn upwind(w: f64, j: usize) -> usize {
        if w > 0.0 { j } else { j + 1 }
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     CONVECTIVE DERIVATIVES (upwind)
    /////////////////////////////////////////////////////////////////////////////////
    pub fn dvdz(&self, x: &[f64], j: usize) -> f64 {
        let jloc = Self::upwind(self.u(x, j), j);
        (self.v(x, jloc) - self.v(x, jloc - 1)) / self.grid.dz(jloc - 1)
    }

    pub fn dydz(&self, x: &[f64], k: usize, j: usize) -> f64 {
        let jloc = Self::upwind(self.u(x, j), j);
        (self.y(x, k, jloc) - self.y(x, k, jloc - 1)) / self.grid.dz(jloc - 1)
    }

    pub fn dtdz(&self, x: &[f64], j: usize) -> f64 {
        let jloc = Self::upwind(self.u(x, j), j);
        (self.t(x, jloc) - self.t(x, jloc - 1)) / self.grid.dz(jloc - 1)
    }

    /// upwinded on `u + v_th`
    pub fn dsdz(&self, x: &[f64], m: usize, j: usize) -> f64 {
        let jloc = Self::upwind(self.u(x, j) + self.props.vstherm[j], j);
        (self.s(x, m, jloc) - self.s(x, m, jloc - 1)) / self.grid.dz(jloc - 1)
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     DIFFUSIVE TERMS (central)
    /////////////////////////////////////////////////////////////////////////////////
    fn shear(&self, x: &[f64], j: usize) -> f64 {
        if !self.do_visc {
            return 0.0;
        }
        let c1 = self.props.visc[j - 1] * (self.v(x, j) - self.v(x, j - 1));
        let c2 = self.props.visc[j] * (self.v(x, j + 1) - self.v(x, j));
        2.0 * (c2 / self.grid.dz(j) - c1 / self.grid.dz(j - 1))
            / (self.grid.z(j + 1) - self.grid.z(j - 1))
    }

    fn div_heat_flux(&self, x: &[f64], j: usize) -> f64 {
        let c1 = self.props.tcon[j - 1] * (self.t(x, j) - self.t(x, j - 1));
        let c2 = self.props.tcon[j] * (self.t(x, j + 1) - self.t(x, j));
        -2.0 * (c2 / self.grid.dz(j) - c1 / self.grid.dz(j - 1))
            / (self.grid.z(j + 1) - self.grid.z(j - 1))
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     ENTRY POINTS
    /////////////////////////////////////////////////////////////////////////////////

    /// Residual of the domain.
    ///
    /// `jg == None` evaluates every row. `Some(j)` evaluates only the rows of points
    /// `j-1 ..= j+1` (a Jacobian column for a perturbation at `j`); rows outside of
    /// that window are left untouched and `j > N` is a no-op. `rdt` is the reciprocal
    /// of the pseudo-time step, `0` for a steady residual.
    pub fn eval(
        &mut self,
        jg: Option<usize>,
        x: &[f64],
        rsd: &mut [f64],
        mask: &mut [bool],
        rdt: f64,
    ) -> Result<(), FlowError> {
        let points = self.layout.points;
        if let Some(j) = jg {
            if j > points {
                return Ok(());
            }
        }
        let flow = self.flow_type()?;
        let size = self.layout.size();
        assert!(
            x.len() == size && rsd.len() == size && mask.len() == size,
            "solution, residual and mask must have {} entries",
            size
        );
        let (jmin, jmax) = match jg {
            None => (0, points - 1),
            Some(j) => (j.max(1) - 1, (j + 1).min(points - 1)),
        };
        self.update_properties(jg, x, jmin, jmax)?;
        self.eval_residual(flow, x, rsd, mask, rdt, jmin, jmax)
    }

    fn eval_residual(
        &mut self,
        flow: FlowType,
        x: &[f64],
        rsd: &mut [f64],
        mask: &mut [bool],
        rdt: f64,
        jmin: usize,
        jmax: usize,
    ) -> Result<(), FlowError> {
        let start = self.layout.index(0, jmin);
        let end = self.layout.index(self.layout.n_components() - 1, jmax);
        mask[start..=end].iter_mut().for_each(|m| *m = false);

        self.update_radiation(x, jmin, jmax);

        let last = self.layout.points - 1;
        for j in jmin..=jmax {
            if j == 0 {
                self.left_boundary_rows(x, rsd);
            } else if j == last {
                self.right_boundary_rows(flow, x, rsd, mask);
            } else {
                self.interior_rows(flow, x, rsd, mask, rdt, j)?;
            }
        }
        Ok(())
    }

    /// Continuity row of interior point `j`. Cached properties must be current.
    pub fn eval_continuity(
        &self,
        j: usize,
        x: &[f64],
        rsd: &mut [f64],
        mask: &mut [bool],
    ) -> Result<(), FlowError> {
        let flow = self.flow_type()?;
        assert!(
            j > 0 && j + 1 < self.layout.points,
            "continuity row {} is not an interior point",
            j
        );
        self.continuity_row(flow, x, rsd, mask, j);
        Ok(())
    }

    /// Rows of the last point. Cached properties must be current.
    pub fn eval_right_boundary(
        &self,
        x: &[f64],
        rsd: &mut [f64],
        mask: &mut [bool],
    ) -> Result<(), FlowError> {
        let flow = self.flow_type()?;
        assert!(self.layout.points > 1, "a single point has no right boundary");
        self.right_boundary_rows(flow, x, rsd, mask);
        Ok(())
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     ROW GROUPS
    /////////////////////////////////////////////////////////////////////////////////

    /// mass flux propagated from the right neighbour
    fn continuity_from_right(&self, x: &[f64], j: usize) -> f64 {
        let rho = &self.props.rho;
        -(self.rho_u(x, j + 1) - self.rho_u(x, j)) / self.grid.dz(j)
            - (rho[j + 1] * self.v(x, j + 1) + rho[j] * self.v(x, j))
    }

    /// mass flux propagated from the left neighbour
    fn continuity_from_left(&self, x: &[f64], j: usize) -> f64 {
        let rho = &self.props.rho;
        -(self.rho_u(x, j) - self.rho_u(x, j - 1)) / self.grid.dz(j - 1)
            - (rho[j - 1] * self.v(x, j - 1) + rho[j] * self.v(x, j))
    }

    fn continuity_row(&self, flow: FlowType, x: &[f64], rsd: &mut [f64], mask: &mut [bool], j: usize) {
        let iu = self.layout.index(OFFSET_U, j);
        mask[iu] = false;
        rsd[iu] = match flow {
            FlowType::AxisymmetricStagnation => self.continuity_from_right(x, j),
            FlowType::FreeFlow => {
                let z = self.grid.z(j);
                match self.zfixed.zip(self.tfixed) {
                    Some((zf, tf)) if z == zf => {
                        if self.do_energy[j] {
                            self.t(x, j) - tf
                        } else {
                            self.rho_u(x, j) - 0.3 * self.props.rho[0]
                        }
                    }
                    Some((zf, _)) if z < zf => self.continuity_from_right(x, j),
                    _ => self.continuity_from_left(x, j),
                }
            }
        };
    }

    fn left_boundary_rows(&self, x: &[f64], rsd: &mut [f64]) {
        let nsp = self.layout.n_species;
        let single = self.layout.points == 1;
        rsd[self.layout.index(OFFSET_U, 0)] = if single {
            self.rho_u(x, 0)
        } else {
            self.continuity_from_right(x, 0)
        };
        rsd[self.layout.index(OFFSET_V, 0)] = self.v(x, 0);
        rsd[self.layout.index(OFFSET_T, 0)] = if self.do_energy[0] {
            self.t(x, 0)
        } else {
            self.t(x, 0) - self.fixed_temp[0]
        };
        rsd[self.layout.index(OFFSET_L, 0)] = -self.rho_u(x, 0);

        let rho_u = self.rho_u(x, 0);
        let mut sum = 0.0;
        for k in 0..nsp {
            let yk = self.y(x, k, 0);
            sum += yk;
            let flux = if single { 0.0 } else { self.props.flux[(k, 0)] };
            rsd[self.layout.index(OFFSET_Y + k, 0)] = if self.do_species[0] {
                -(flux + rho_u * yk)
            } else {
                yk - self.fixed_y[(k, 0)]
            };
        }
        rsd[self.layout.index(OFFSET_Y + self.excess.left, 0)] = 1.0 - sum;

        for m in 0..self.layout.n_soot {
            let sflux = if single { 0.0 } else { self.props.sflux[(m, 0)] };
            rsd[self.layout.index_of(Component::Soot(m), 0)] = -(sflux + rho_u * self.s(x, m, 0));
        }
    }

    fn right_boundary_rows(&self, flow: FlowType, x: &[f64], rsd: &mut [f64], mask: &mut [bool]) {
        let j = self.layout.points - 1;
        let nsp = self.layout.n_species;
        rsd[self.layout.index(OFFSET_V, j)] = self.v(x, j);
        let il = self.layout.index(OFFSET_L, j);
        rsd[il] = self.lambda(x, j) - self.lambda(x, j - 1);
        mask[il] = false;

        let rho_u = self.rho_u(x, j);
        let mut sum = 0.0;
        for k in 0..nsp {
            let yk = self.y(x, k, j);
            sum += yk;
            rsd[self.layout.index(OFFSET_Y + k, j)] = if self.do_species[j] {
                self.props.flux[(k, j - 1)] + rho_u * yk
            } else {
                yk - self.fixed_y[(k, j)]
            };
        }
        let ie = self.layout.index(OFFSET_Y + self.excess.right, j);
        rsd[ie] = 1.0 - sum;
        mask[ie] = false;

        for m in 0..self.layout.n_soot {
            rsd[self.layout.index_of(Component::Soot(m), j)] =
                self.props.sflux[(m, j - 1)] + rho_u * self.s(x, m, j);
        }

        let iu = self.layout.index(OFFSET_U, j);
        let it = self.layout.index(OFFSET_T, j);
        let t_pinned = self.t(x, j) - self.fixed_temp[j];
        match flow {
            FlowType::AxisymmetricStagnation => {
                rsd[iu] = rho_u;
                rsd[it] = if self.do_energy[j] { self.t(x, j) } else { t_pinned };
            }
            FlowType::FreeFlow => {
                rsd[iu] = rho_u - self.rho_u(x, j - 1);
                rsd[it] = if self.do_energy[j] {
                    self.t(x, j) - self.t(x, j - 1)
                } else {
                    t_pinned
                };
            }
        }
    }

    fn interior_rows(
        &mut self,
        flow: FlowType,
        x: &[f64],
        rsd: &mut [f64],
        mask: &mut [bool],
        rdt: f64,
        j: usize,
    ) -> Result<(), FlowError> {
        let nsp = self.layout.n_species;
        let nsoot = self.layout.n_soot;
        self.continuity_row(flow, x, rsd, mask, j);

        let rho = self.props.rho[j];
        let rho_u = self.rho_u(x, j);
        let dz2 = self.grid.z(j + 1) - self.grid.z(j - 1);

        // radial momentum
        let iv = self.layout.index(OFFSET_V, j);
        let v = self.v(x, j);
        rsd[iv] = (self.shear(x, j) - self.lambda(x, j) - rho_u * self.dvdz(x, j) - rho * v * v)
            / rho
            - rdt * (v - self.prev_soln[iv]);
        mask[iv] = true;

        // chemistry and soot sources
        let state = self.gas_state(x, j);
        self.kinetics
            .net_production_rates(&state, column_mut(&mut self.props.wdot, j))?;
        if let Some(soot) = &self.soot {
            let moments: Vec<f64> = (0..nsoot).map(|m| rho * self.s(x, m, j)).collect();
            let local = SootLocalState {
                gas: state,
                density: rho,
                viscosity: 0.5 * (self.props.visc[j - 1] + self.props.visc[j]),
                moments: &moments,
            };
            let props = &mut self.props;
            soot.source_terms(
                &local,
                column_mut(&mut props.sdot, j),
                column_mut(&mut props.sgdot, j),
            )?;
        }

        // species
        for k in 0..nsp {
            let i = self.layout.index(OFFSET_Y + k, j);
            if !self.do_species[j] {
                rsd[i] = x[i] - self.fixed_y[(k, j)];
                continue;
            }
            let mut source = self.wt[k] * self.props.wdot[(k, j)];
            if nsoot > 0 {
                source += self.props.sgdot[(k, j)];
            }
            let convec = rho_u * self.dydz(x, k, j);
            let diffus = 2.0 * (self.props.flux[(k, j)] - self.props.flux[(k, j - 1)]) / dz2;
            rsd[i] = (source - convec - diffus) / rho - rdt * (x[i] - self.prev_soln[i]);
            mask[i] = true;
        }

        // energy
        let it = self.layout.index(OFFSET_T, j);
        let t = self.t(x, j);
        if self.do_energy[j] {
            let mut h_rt = vec![0.0; nsp];
            let mut cp_r = vec![0.0; nsp];
            self.thermo.enthalpy_rt_ref(t, &mut h_rt);
            self.thermo.cp_r_ref(t, &mut cp_r);
            let mut sum = 0.0;
            let mut sum2 = 0.0;
            for k in 0..nsp {
                let flxk = 0.5 * (self.props.flux[(k, j - 1)] + self.props.flux[(k, j)]);
                sum += self.props.wdot[(k, j)] * h_rt[k];
                sum2 += flxk * cp_r[k] / self.wt[k];
            }
            sum *= GAS_CONSTANT * t;
            let dtdzj = self.dtdz(x, j);
            sum2 *= GAS_CONSTANT * dtdzj;
            let cp = self.props.cp[j];
            rsd[it] = (-cp * rho_u * dtdzj - self.div_heat_flux(x, j) - sum - sum2) / (rho * cp)
                - rdt * (t - self.prev_soln[it])
                - self.props.qdot_radiation[j] / (rho * cp);
            mask[it] = true;
        } else {
            rsd[it] = t - self.fixed_temp[j];
        }

        // eigenvalue
        rsd[self.layout.index(OFFSET_L, j)] = self.lambda(x, j) - self.lambda(x, j - 1);

        // soot moments
        for m in 0..nsoot {
            let i = self.layout.index_of(Component::Soot(m), j);
            let convec = rho_u * self.dsdz(x, m, j);
            let diffus = 2.0 * (self.props.sflux[(m, j)] - self.props.sflux[(m, j - 1)]) / dz2;
            rsd[i] = (self.props.sdot[(m, j)] - convec - diffus) / rho
                - rdt * (self.s(x, m, j) - self.prev_soln[i]);
            mask[i] = true;
        }
        Ok(())
    }
}
