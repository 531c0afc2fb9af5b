//! # Property cache
//!
//! Per-point thermo properties (ρ, W̄, c_p), per-face transport properties (μ, λ,
//! diffusion data) and the face fluxes derived from them. Values are valid only for
//! the solution vector last passed to [`StFlow::update_properties`]: any change of
//! `x` at point `j` invalidates points `j-1 ..= j+1`, and every residual evaluation
//! refreshes its window before reading the cache.
//!
//! Index conventions: point arrays are indexed by `j`, face arrays by the left point
//! of the face (face `j` lies between `j` and `j+1`). Species-by-point arrays are
//! `DMatrix` with one column per point.
use super::StFlow::StFlow;
use super::flow_api::{FlowError, TransportMode};
use super::layout::{OFFSET_T, OFFSET_Y};
use crate::GasModels::gas_api::GasState;
use log::debug;
use nalgebra::DMatrix;

#[derive(Debug, Clone)]
pub struct PropertyCache {
    n_species: usize,
    n_soot: usize,
    /// kg/m³
    pub rho: Vec<f64>,
    /// kg/kmol
    pub wtm: Vec<f64>,
    /// J/(kg·K)
    pub cp: Vec<f64>,
    /// face viscosity, Pa·s
    pub visc: Vec<f64>,
    /// face conductivity, W/(m·K)
    pub tcon: Vec<f64>,
    /// mixture-averaged D_km, or the prefactor W_k ρ / W̄² in multicomponent mode
    pub diff: DMatrix<f64>,
    /// multicomponent D_km of every face; empty in mixture-averaged mode
    pub multidiff: Vec<DMatrix<f64>>,
    pub dthermal: DMatrix<f64>,
    /// face species fluxes, kg/(m²·s)
    pub flux: DMatrix<f64>,
    /// face soot-moment fluxes
    pub sflux: DMatrix<f64>,
    /// thermophoretic velocity at points
    pub vstherm: Vec<f64>,
    /// thermophoretic velocity at faces
    pub vth_face: Vec<f64>,
    /// kmol/(m³·s)
    pub wdot: DMatrix<f64>,
    pub sdot: DMatrix<f64>,
    /// gas mass exchanged with soot, kg/(m³·s)
    pub sgdot: DMatrix<f64>,
    /// W/m³
    pub qdot_radiation: Vec<f64>,
}

impl PropertyCache {
    pub fn new(n_species: usize, n_soot: usize, points: usize) -> Self {
        Self {
            n_species,
            n_soot,
            rho: vec![0.0; points],
            wtm: vec![0.0; points],
            cp: vec![0.0; points],
            visc: vec![0.0; points],
            tcon: vec![0.0; points],
            diff: DMatrix::zeros(n_species, points),
            multidiff: Vec::new(),
            dthermal: DMatrix::zeros(n_species, points),
            flux: DMatrix::zeros(n_species, points),
            sflux: DMatrix::zeros(n_soot, points),
            vstherm: vec![0.0; points],
            vth_face: vec![0.0; points],
            wdot: DMatrix::zeros(n_species, points),
            sdot: DMatrix::zeros(n_soot, points),
            sgdot: DMatrix::zeros(n_species, points),
            qdot_radiation: vec![0.0; points],
        }
    }

    pub fn resize(&mut self, points: usize) {
        let (nsp, nsoot) = (self.n_species, self.n_soot);
        for v in [
            &mut self.rho,
            &mut self.wtm,
            &mut self.cp,
            &mut self.visc,
            &mut self.tcon,
            &mut self.vstherm,
            &mut self.vth_face,
            &mut self.qdot_radiation,
        ] {
            v.resize(points, 0.0);
        }
        for m in [
            &mut self.diff,
            &mut self.dthermal,
            &mut self.flux,
            &mut self.wdot,
            &mut self.sgdot,
        ] {
            m.resize_mut(nsp, points, 0.0);
        }
        self.sflux.resize_mut(nsoot, points, 0.0);
        self.sdot.resize_mut(nsoot, points, 0.0);
        if !self.multidiff.is_empty() {
            self.multidiff.resize(points, DMatrix::zeros(nsp, nsp));
        }
    }

    /// Allocates (or frees) the per-face multicomponent matrices.
    pub fn set_multicomponent(&mut self, multicomponent: bool) {
        let points = self.rho.len();
        if multicomponent {
            self.multidiff
                .resize(points, DMatrix::zeros(self.n_species, self.n_species));
        } else {
            self.multidiff.clear();
        }
    }
}

/// Column `j` of a species-by-point matrix as a slice.
pub(super) fn column_mut(m: &mut DMatrix<f64>, j: usize) -> &mut [f64] {
    let n = m.nrows();
    &mut m.as_mut_slice()[j * n..(j + 1) * n]
}

impl StFlow {
    /// Snapshot of the gas at point `j`.
    pub fn gas_state<'x>(&self, x: &'x [f64], j: usize) -> GasState<'x> {
        GasState::new(
            x[self.layout.index(OFFSET_T, j)],
            self.pressure,
            &x[self.layout.species_range(j)],
        )
    }

    /// Snapshot of the gas halfway between `j` and `j+1`; the averaged mass fractions
    /// are written to `ybar`.
    pub fn midpoint_state<'a>(&self, x: &[f64], j: usize, ybar: &'a mut [f64]) -> GasState<'a> {
        let t = 0.5 * (x[self.layout.index(OFFSET_T, j)] + x[self.layout.index(OFFSET_T, j + 1)]);
        let left = self.layout.index(OFFSET_Y, j);
        let right = self.layout.index(OFFSET_Y, j + 1);
        for (k, yk) in ybar.iter_mut().enumerate() {
            *yk = 0.5 * (x[left + k] + x[right + k]);
        }
        GasState::new(t, self.pressure, ybar)
    }

    /// ρ, W̄ and c_p at points `j0 ..= j1`.
    pub fn update_thermo(&mut self, x: &[f64], j0: usize, j1: usize) {
        for j in j0..=j1 {
            let state = self.gas_state(x, j);
            self.props.rho[j] = self.thermo.density(&state);
            self.props.wtm[j] = self.thermo.mean_molecular_weight(&state);
            self.props.cp[j] = self.thermo.cp_mass(&state);
        }
    }

    /// Transport properties at faces `j0 .. j1`.
    pub fn update_transport(&mut self, x: &[f64], j0: usize, j1: usize) -> Result<(), FlowError> {
        let nsp = self.layout.n_species;
        let mut ybar = vec![0.0; nsp];
        for j in j0..j1 {
            let state = self.midpoint_state(x, j, &mut ybar);
            self.props.visc[j] = self.transport.viscosity(&state)?;
            self.props.tcon[j] = self.transport.thermal_conductivity(&state)?;
            match self.transport_mode {
                TransportMode::MixtureAveraged => {
                    self.transport
                        .mix_diff_coeffs(&state, column_mut(&mut self.props.diff, j))?;
                }
                TransportMode::Multicomponent => {
                    self.props.multidiff[j] = self.transport.multi_diff_coeffs(&state)?;
                    let wtm = self.thermo.mean_molecular_weight(&state);
                    let rho = self.thermo.density(&state);
                    for k in 0..nsp {
                        self.props.diff[(k, j)] = self.wt[k] * rho / (wtm * wtm);
                    }
                }
            }
            if self.do_soret {
                self.transport
                    .thermal_diff_coeffs(&state, column_mut(&mut self.props.dthermal, j))?;
            }
        }
        Ok(())
    }

    /// Refreshes everything the residual rows of points `jmin ..= jmax` read.
    /// `jg` is the perturbed point of a Jacobian column, `None` for a full evaluation.
    pub fn update_properties(
        &mut self,
        jg: Option<usize>,
        x: &[f64],
        jmin: usize,
        jmax: usize,
    ) -> Result<(), FlowError> {
        let j0 = jmin.max(1) - 1;
        let j1 = (jmax + 1).min(self.layout.points - 1);
        self.update_thermo(x, j0, j1);
        if jg.is_none() || self.force_full_update {
            debug!("transport update on faces {}..{}", j0, j1);
            self.update_transport(x, j0, j1)?;
        }
        if jg.is_none() {
            let last = self.layout.points - 1;
            self.excess.update(
                &x[self.layout.species_range(jmin.min(last))],
                &x[self.layout.species_range(jmax.min(last))],
            );
        }
        self.update_diff_fluxes(x, j0, j1);
        self.update_soot_fluxes(x, j0, j1);
        self.update_thermophoretic_velocity(jmin, jmax);
        Ok(())
    }
}
