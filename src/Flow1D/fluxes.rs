//! # Face fluxes
//!
//! Species diffusion fluxes (mixture-averaged with a mass-conserving correction, or
//! multicomponent, plus the Soret term) and soot-moment fluxes driven by
//! thermophoresis. Face `j` lies between points `j` and `j+1`.
use super::StFlow::StFlow;
use super::flow_api::TransportMode;
use super::layout::{Component, OFFSET_T};

impl StFlow {
    /// mole fraction of species `k` at point `j` from the cached mean molecular weight
    #[inline]
    pub(super) fn mole_fraction(&self, x: &[f64], k: usize, j: usize) -> f64 {
        self.props.wtm[j] * x[self.layout.index_of(Component::Species(k), j)] / self.wt[k]
    }

    /// Diffusive mass fluxes of every species through faces `j0 .. j1`.
    pub fn update_diff_fluxes(&mut self, x: &[f64], j0: usize, j1: usize) {
        let nsp = self.layout.n_species;
        match self.transport_mode {
            TransportMode::MixtureAveraged => {
                for j in j0..j1 {
                    let wtm = self.props.wtm[j];
                    let rho = self.props.rho[j];
                    let dz = self.grid.dz(j);
                    let mut sum = 0.0;
                    for k in 0..nsp {
                        let gradient =
                            (self.mole_fraction(x, k, j) - self.mole_fraction(x, k, j + 1)) / dz;
                        let f = self.wt[k] * (rho * self.props.diff[(k, j)] / wtm) * gradient;
                        self.props.flux[(k, j)] = f;
                        sum -= f;
                    }
                    // correction flux so that the fluxes sum to zero
                    for k in 0..nsp {
                        let yk = x[self.layout.index_of(Component::Species(k), j)];
                        self.props.flux[(k, j)] += sum * yk;
                    }
                }
            }
            TransportMode::Multicomponent => {
                for j in j0..j1 {
                    let dz = self.grid.dz(j);
                    for k in 0..nsp {
                        let mut sum = 0.0;
                        for m in 0..nsp {
                            sum += self.wt[m]
                                * self.props.multidiff[j][(k, m)]
                                * (self.mole_fraction(x, m, j + 1) - self.mole_fraction(x, m, j));
                        }
                        self.props.flux[(k, j)] = sum * self.props.diff[(k, j)] / dz;
                    }
                }
            }
        }

        if self.do_soret {
            for j in j0..j1 {
                let grad_log_t = self.face_log_t_gradient(x, j);
                for k in 0..nsp {
                    self.props.flux[(k, j)] -= self.props.dthermal[(k, j)] * grad_log_t;
                }
            }
        }
    }

    /// d(ln T)/dz at face `j`
    fn face_log_t_gradient(&self, x: &[f64], j: usize) -> f64 {
        let t0 = x[self.layout.index(OFFSET_T, j)];
        let t1 = x[self.layout.index(OFFSET_T, j + 1)];
        2.0 * (t1 - t0) / ((t1 + t0) * self.grid.dz(j))
    }

    /// Thermophoretic velocity and soot-moment fluxes through faces `j0 .. j1`.
    pub fn update_soot_fluxes(&mut self, x: &[f64], j0: usize, j1: usize) {
        let nsoot = self.layout.n_soot;
        if nsoot == 0 {
            return;
        }
        for j in j0..j1 {
            let rho_face = 0.5 * (self.props.rho[j] + self.props.rho[j + 1]);
            let vth = -self.thermophoretic_coeff * self.props.visc[j] / rho_face
                * self.face_log_t_gradient(x, j);
            self.props.vth_face[j] = vth;
            let jup = if vth > 0.0 { j } else { j + 1 };
            for m in 0..nsoot {
                let s = x[self.layout.index_of(Component::Soot(m), jup)];
                self.props.sflux[(m, j)] = rho_face * vth * s;
            }
        }
    }

    /// Point thermophoretic velocities of `jmin ..= jmax` from the adjacent faces.
    pub fn update_thermophoretic_velocity(&mut self, jmin: usize, jmax: usize) {
        if self.layout.n_soot == 0 {
            return;
        }
        let last = self.layout.points - 1;
        for j in jmin..=jmax {
            let faces = &self.props.vth_face;
            self.props.vstherm[j] = if last == 0 {
                0.0
            } else if j == 0 {
                faces[0]
            } else if j == last {
                faces[last - 1]
            } else {
                0.5 * (faces[j - 1] + faces[j])
            };
        }
    }
}
