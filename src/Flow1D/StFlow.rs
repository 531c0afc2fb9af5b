//! # Stagnation / free flow domain
//!
//! [`StFlow`] owns the discretization of a quasi-one-dimensional reacting flow:
//! the grid, the layout of the unknowns, the per-point flags and fixed values, and the
//! property cache that the residual engine reads. Gas properties come from the
//! [`ThermoPhase`], [`Kinetics`] and [`Transport`] collaborators, which are queried with
//! immutable per-point snapshots.
//!
//! The outer solver drives a domain with
//! 1. `set_axisymmetric_flow` or `set_free_flow` (mandatory),
//! 2. `get_initial_soln` to obtain a starting vector,
//! 3. repeated `eval` calls (full or windowed for Jacobian columns),
//! 4. `finalize` after a grid change, `reset_bad_values` after a bad Newton step.
//!
//! Property cache, fluxes, residual, radiation and snapshot code live in the sibling
//! modules as further `impl StFlow` blocks.
use super::excess_species::{ExcessSpecies, ExcessSpeciesPolicy};
use super::flow_api::{
    FlowError, FlowType, LAMBDA_BOUNDS, MASS_FRACTION_BOUNDS, SOOT_BOUNDS, T_MIN, TransportMode,
    VELOCITY_BOUNDS,
};
use super::grid::{Grid, linear_interp};
use super::layout::{
    Component, OFFSET_L, OFFSET_T, OFFSET_U, OFFSET_V, OFFSET_Y, SolutionLayout,
};
use super::properties::PropertyCache;
use super::soot::SootRates;
use crate::GasModels::gas_api::{GasState, Kinetics, ONE_ATM, ThermoPhase, Transport};
use log::{info, warn};
use nalgebra::DMatrix;

/// default mobility coefficient of the thermophoretic drift
pub const THERMOPHORETIC_COEFF: f64 = 0.554;

pub struct StFlow {
    pub(super) thermo: Box<dyn ThermoPhase>,
    pub(super) kinetics: Box<dyn Kinetics>,
    pub(super) transport: Box<dyn Transport>,
    pub(super) soot: Option<Box<dyn SootRates>>,

    pub(super) layout: SolutionLayout,
    pub(super) grid: Grid,
    /// Pa
    pub(super) pressure: f64,
    pub(super) flow_type: Option<FlowType>,
    /// species molecular weights, kg/kmol
    pub(super) wt: Vec<f64>,
    pub(super) props: PropertyCache,

    // flags
    pub(super) do_energy: Vec<bool>,
    pub(super) do_species: Vec<bool>,
    pub(super) do_soret: bool,
    pub(super) transport_mode: TransportMode,
    pub(super) do_radiation: bool,
    pub(super) do_visc: bool,
    /// refresh transport in windowed evaluations too
    pub(super) force_full_update: bool,
    pub(super) needs_jacobian_update: bool,

    pub(super) epsilon_left: f64,
    pub(super) epsilon_right: f64,
    /// CO2 and H2O
    pub(super) k_radiating: [Option<usize>; 2],

    // fixed T and Y values
    pub(super) fixed_temp: Vec<f64>,
    /// nsp x N, captured by `fix_species`
    pub(super) fixed_y: DMatrix<f64>,
    pub(super) zfix: Vec<f64>,
    pub(super) tfix: Vec<f64>,
    pub(super) zfixed: Option<f64>,
    pub(super) tfixed: Option<f64>,

    pub(super) excess: ExcessSpecies,
    pub(super) thermophoretic_coeff: f64,
    /// solution at the previous pseudo-time step
    pub(super) prev_soln: Vec<f64>,

    pub(super) initial_temperature: f64,
    pub(super) initial_mass_fractions: Vec<f64>,
    pub(super) initial_soot: Vec<f64>,
}

impl StFlow {
    pub fn new(
        thermo: Box<dyn ThermoPhase>,
        kinetics: Box<dyn Kinetics>,
        transport: Box<dyn Transport>,
        points: usize,
    ) -> Result<Self, FlowError> {
        Self::build(thermo, kinetics, transport, None, points)
    }

    /// Domain whose unknowns also carry the moments of `soot`.
    pub fn with_soot(
        thermo: Box<dyn ThermoPhase>,
        kinetics: Box<dyn Kinetics>,
        transport: Box<dyn Transport>,
        soot: Box<dyn SootRates>,
        points: usize,
    ) -> Result<Self, FlowError> {
        Self::build(thermo, kinetics, transport, Some(soot), points)
    }

    fn build(
        thermo: Box<dyn ThermoPhase>,
        kinetics: Box<dyn Kinetics>,
        transport: Box<dyn Transport>,
        soot: Option<Box<dyn SootRates>>,
        points: usize,
    ) -> Result<Self, FlowError> {
        let nsp = thermo.n_species();
        if nsp == 0 {
            return Err(FlowError::NoSpecies);
        }
        if points == 0 {
            return Err(FlowError::NoPoints);
        }
        let nsoot = soot.as_ref().map_or(0, |s| s.n_moments());
        let layout = SolutionLayout::new(nsp, nsoot, points);
        let wt = thermo.molecular_weights().to_vec();
        let k_radiating = [thermo.species_index("CO2"), thermo.species_index("H2O")];
        let mut initial_mass_fractions = vec![0.0; nsp];
        initial_mass_fractions[0] = 1.0;
        info!(
            "flow domain created: {} species, {} soot moments, {} points, {} transport",
            nsp,
            nsoot,
            points,
            transport.model_name()
        );
        let size = layout.size();
        Ok(Self {
            props: PropertyCache::new(nsp, nsoot, points),
            thermo,
            kinetics,
            transport,
            soot,
            layout,
            grid: Grid::uniform(points),
            pressure: ONE_ATM,
            flow_type: None,
            wt,
            do_energy: vec![false; points],
            do_species: vec![true; points],
            do_soret: false,
            transport_mode: TransportMode::MixtureAveraged,
            do_radiation: false,
            do_visc: false,
            force_full_update: false,
            needs_jacobian_update: true,
            epsilon_left: 0.0,
            epsilon_right: 0.0,
            k_radiating,
            fixed_temp: vec![0.0; points],
            fixed_y: DMatrix::zeros(nsp, points),
            zfix: Vec::new(),
            tfix: Vec::new(),
            zfixed: None,
            tfixed: None,
            excess: ExcessSpecies::new(ExcessSpeciesPolicy::LargestMassFraction),
            thermophoretic_coeff: THERMOPHORETIC_COEFF,
            prev_soln: vec![0.0; size],
            initial_temperature: 300.0,
            initial_mass_fractions,
            initial_soot: vec![0.0; nsoot],
        })
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     GRID AND LAYOUT
    /////////////////////////////////////////////////////////////////////////////////

    /// Reallocates every per-point array for `points` points. Called after grid
    /// refinement; existing points keep their order and flags.
    pub fn resize(&mut self, components: usize, points: usize) {
        assert!(points > 0, "a flow domain needs at least one grid point");
        assert_eq!(
            components,
            self.layout.n_components(),
            "a flow domain with {} species and {} soot moments has {} components",
            self.layout.n_species,
            self.layout.n_soot,
            self.layout.n_components()
        );
        self.layout.points = points;
        self.grid.resize(points);
        self.props.resize(points);
        self.props
            .set_multicomponent(self.transport_mode == TransportMode::Multicomponent);
        self.do_energy.resize(points, false);
        self.do_species.resize(points, true);
        self.fixed_temp.resize(points, 0.0);
        self.fixed_y.resize_mut(self.layout.n_species, points, 0.0);
        self.prev_soln.resize(self.layout.size(), 0.0);
        self.needs_jacobian_update = true;
        info!("flow domain resized to {} points", points);
    }

    /// Installs the grid `z` (strictly increasing) and resizes the domain to match.
    pub fn setup_grid(&mut self, z: &[f64]) -> Result<(), FlowError> {
        let mut grid = self.grid.clone();
        grid.setup(z)?;
        self.resize(self.layout.n_components(), z.len());
        self.grid = grid;
        if let Some(zf) = self.zfixed {
            if !z.contains(&zf) {
                warn!(
                    "fixed point z = {} is not a grid point any more; call finalize to relocate it",
                    zf
                );
            }
        }
        Ok(())
    }

    pub fn n_points(&self) -> usize {
        self.layout.points
    }

    pub fn n_components(&self) -> usize {
        self.layout.n_components()
    }

    pub fn n_species(&self) -> usize {
        self.layout.n_species
    }

    pub fn n_soot(&self) -> usize {
        self.layout.n_soot
    }

    pub fn layout(&self) -> &SolutionLayout {
        &self.layout
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// `n + nv*j`; panics outside of the domain
    #[inline]
    pub fn index(&self, n: usize, j: usize) -> usize {
        self.layout.index(n, j)
    }

    pub fn component_name(&self, n: usize) -> String {
        match self.layout.component(n) {
            Component::Velocity => "velocity".to_string(),
            Component::SpreadRate => "spread_rate".to_string(),
            Component::Temperature => "T".to_string(),
            Component::Lambda => "lambda".to_string(),
            Component::Species(k) => self.thermo.species_name(k).to_string(),
            Component::Soot(m) => format!("S{}", m),
        }
    }

    pub fn component_index(&self, name: &str) -> Result<usize, FlowError> {
        match name {
            "velocity" | "u" => return Ok(OFFSET_U),
            "spread_rate" | "V" => return Ok(OFFSET_V),
            "T" => return Ok(OFFSET_T),
            "lambda" | "L" => return Ok(OFFSET_L),
            _ => {}
        }
        if let Some(k) = self.thermo.species_index(name) {
            return Ok(OFFSET_Y + k);
        }
        let moment = name
            .strip_prefix('S')
            .filter(|m| !m.is_empty() && m.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|m| m.parse::<usize>().ok());
        if let Some(m) = moment {
            if m < self.layout.n_soot {
                return Ok(OFFSET_Y + self.layout.n_species + m);
            }
        }
        Err(FlowError::UnknownComponent(name.to_string()))
    }

    /// Whether component `n` carries an equation in the current flow configuration.
    pub fn component_active(&self, n: usize) -> bool {
        match self.layout.component(n) {
            Component::SpreadRate | Component::Lambda => {
                self.flow_type != Some(FlowType::FreeFlow)
            }
            _ => true,
        }
    }

    /// Whether the row of component `n` at point `j` is a transport equation rather
    /// than a pinned value or the boundary closure of the excess species.
    pub fn row_active(&self, n: usize, j: usize) -> bool {
        let last = self.layout.points - 1;
        match self.layout.component(n) {
            Component::Temperature => self.do_energy[j],
            Component::Species(k) => {
                let excess = (j == 0 && k == self.excess.left)
                    || (j == last && k == self.excess.right);
                !excess && self.do_species[j]
            }
            _ => self.component_active(n),
        }
    }

    /// Default lower and upper bounds of component `n`.
    pub fn bounds(&self, n: usize) -> (f64, f64) {
        match self.layout.component(n) {
            Component::Velocity | Component::SpreadRate => VELOCITY_BOUNDS,
            Component::Lambda => LAMBDA_BOUNDS,
            Component::Temperature => (T_MIN, 2.0 * self.thermo.max_temp()),
            Component::Species(_) => MASS_FRACTION_BOUNDS,
            Component::Soot(_) => SOOT_BOUNDS,
        }
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     CONFIGURATION
    /////////////////////////////////////////////////////////////////////////////////

    pub fn set_free_flow(&mut self) {
        self.flow_type = Some(FlowType::FreeFlow);
        self.do_visc = false;
    }

    pub fn set_axisymmetric_flow(&mut self) {
        self.flow_type = Some(FlowType::AxisymmetricStagnation);
        self.do_visc = true;
    }

    pub fn flow_type(&self) -> Result<FlowType, FlowError> {
        self.flow_type.ok_or(FlowError::UnknownFlowType)
    }

    /// Inlet mass fluxes are prescribed for every configuration except the free flame.
    pub fn fixed_mass_flux(&self) -> Result<bool, FlowError> {
        Ok(self.flow_type()? != FlowType::FreeFlow)
    }

    pub fn set_viscosity_flag(&mut self, dovisc: bool) {
        self.do_visc = dovisc;
    }

    pub fn viscosity_enabled(&self) -> bool {
        self.do_visc
    }

    pub fn set_pressure(&mut self, p: f64) {
        self.pressure = p;
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn set_transport(&mut self, transport: Box<dyn Transport>) {
        info!("transport model set to {}", transport.model_name());
        self.transport = transport;
        self.needs_jacobian_update = true;
    }

    pub fn transport_model(&self) -> &str {
        self.transport.model_name()
    }

    pub fn set_transport_mode(&mut self, mode: TransportMode) {
        if mode != self.transport_mode {
            info!("diffusion fluxes switched to {}", mode.name());
            self.needs_jacobian_update = true;
        }
        self.transport_mode = mode;
        self.props
            .set_multicomponent(mode == TransportMode::Multicomponent);
    }

    pub fn transport_mode(&self) -> TransportMode {
        self.transport_mode
    }

    /// Thermal diffusion; `finalize` rejects it unless transport is multicomponent.
    pub fn enable_soret(&mut self, with_soret: bool) {
        self.do_soret = with_soret;
    }

    pub fn with_soret(&self) -> bool {
        self.do_soret
    }

    pub fn enable_radiation(&mut self, do_radiation: bool) {
        self.do_radiation = do_radiation;
    }

    pub fn radiation_enabled(&self) -> bool {
        self.do_radiation
    }

    pub fn set_boundary_emissivities(&mut self, e_left: f64, e_right: f64) -> Result<(), FlowError> {
        for e in [e_left, e_right] {
            if !(0.0..=1.0).contains(&e) {
                return Err(FlowError::InvalidEmissivity(e));
            }
        }
        self.epsilon_left = e_left;
        self.epsilon_right = e_right;
        Ok(())
    }

    pub fn left_emissivity(&self) -> f64 {
        self.epsilon_left
    }

    pub fn right_emissivity(&self) -> f64 {
        self.epsilon_right
    }

    /// Refresh transport properties in windowed (Jacobian) evaluations as well.
    pub fn set_force_full_update(&mut self, force: bool) {
        self.force_full_update = force;
    }

    pub fn force_full_update(&self) -> bool {
        self.force_full_update
    }

    pub fn set_thermophoretic_coeff(&mut self, c: f64) {
        self.thermophoretic_coeff = c;
    }

    pub fn thermophoretic_coeff(&self) -> f64 {
        self.thermophoretic_coeff
    }

    pub fn set_excess_species_policy(&mut self, policy: ExcessSpeciesPolicy) {
        if let ExcessSpeciesPolicy::Fixed(k) = policy {
            assert!(
                k < self.layout.n_species,
                "excess species index {} out of range",
                k
            );
        }
        self.excess = ExcessSpecies::new(policy);
        self.needs_jacobian_update = true;
    }

    pub fn excess_species_policy(&self) -> ExcessSpeciesPolicy {
        self.excess.policy
    }

    pub fn left_excess_species(&self) -> usize {
        self.excess.left
    }

    pub fn right_excess_species(&self) -> usize {
        self.excess.right
    }

    /// State written by `get_initial_soln`.
    pub fn set_initial_gas(&mut self, t: f64, y: &[f64]) -> Result<(), FlowError> {
        GasState::new(t, self.pressure, y).validate(self.layout.n_species)?;
        self.initial_temperature = t;
        self.initial_mass_fractions = y.to_vec();
        Ok(())
    }

    /// Initial soot moments per unit mass.
    pub fn set_initial_soot(&mut self, s: &[f64]) {
        assert_eq!(s.len(), self.layout.n_soot, "wrong number of soot moments");
        self.initial_soot = s.to_vec();
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     ENERGY AND SPECIES FLAGS
    /////////////////////////////////////////////////////////////////////////////////

    fn point_range(&self, j: Option<usize>) -> std::ops::Range<usize> {
        match j {
            Some(j) => {
                assert!(j < self.layout.points, "point {} out of range", j);
                j..j + 1
            }
            None => 0..self.layout.points,
        }
    }

    /// Solve the energy equation at `j` (every point for `None`).
    pub fn solve_energy_eqn(&mut self, j: Option<usize>) {
        let mut changed = false;
        for i in self.point_range(j) {
            if !self.do_energy[i] {
                changed = true;
            }
            self.do_energy[i] = true;
        }
        if changed {
            info!("energy equation enabled");
            self.needs_jacobian_update = true;
        }
    }

    /// Pin the temperature at `j` (every point for `None`) to its fixed value.
    pub fn fix_temperature(&mut self, j: Option<usize>) {
        let mut changed = false;
        for i in self.point_range(j) {
            if self.do_energy[i] {
                changed = true;
            }
            self.do_energy[i] = false;
        }
        if changed {
            info!("energy equation disabled");
            self.needs_jacobian_update = true;
        }
    }

    pub fn do_energy(&self, j: usize) -> bool {
        self.do_energy[j]
    }

    /// Pins the temperature at point `j` to `t`.
    pub fn set_temperature(&mut self, j: usize, t: f64) {
        self.fixed_temp[j] = t;
        self.do_energy[j] = false;
    }

    pub fn t_fixed(&self, j: usize) -> f64 {
        self.fixed_temp[j]
    }

    /// Temperature profile over the relative position `(z - z0)/(zN - z0)` used by
    /// `finalize` when the energy equation is off.
    pub fn set_fixed_temp_profile(&mut self, zfixed: &[f64], tfixed: &[f64]) {
        assert_eq!(zfixed.len(), tfixed.len(), "profile length mismatch");
        self.zfix = zfixed.to_vec();
        self.tfix = tfixed.to_vec();
    }

    pub fn fixed_temp_profile(&self) -> (&[f64], &[f64]) {
        (&self.zfix, &self.tfix)
    }

    /// Point of a free flame where the temperature anchors the flame position.
    pub fn set_fixed_point(&mut self, z: f64, t: f64) {
        self.zfixed = Some(z);
        self.tfixed = Some(t);
    }

    pub fn fixed_point(&self) -> Option<(f64, f64)> {
        self.zfixed.zip(self.tfixed)
    }

    pub fn solve_species(&mut self, j: Option<usize>) {
        let mut changed = false;
        for i in self.point_range(j) {
            if !self.do_species[i] {
                changed = true;
            }
            self.do_species[i] = true;
        }
        if changed {
            self.needs_jacobian_update = true;
        }
    }

    /// Freezes the mass fractions at `j` (every point for `None`) to their values in `x`.
    pub fn fix_species(&mut self, x: &[f64], j: Option<usize>) {
        let mut changed = false;
        for i in self.point_range(j) {
            for k in 0..self.layout.n_species {
                self.fixed_y[(k, i)] = x[self.layout.index(OFFSET_Y + k, i)];
            }
            if self.do_species[i] {
                changed = true;
            }
            self.do_species[i] = false;
        }
        if changed {
            self.needs_jacobian_update = true;
        }
    }

    pub fn do_species(&self, j: usize) -> bool {
        self.do_species[j]
    }

    pub fn needs_jacobian_update(&self) -> bool {
        self.needs_jacobian_update
    }

    /// Called by the outer solver once it has rebuilt the Jacobian.
    pub fn mark_jacobian_current(&mut self) {
        self.needs_jacobian_update = false;
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     LIFECYCLE
    /////////////////////////////////////////////////////////////////////////////////

    /// Uniform initial guess from the configured initial gas: zero velocities and
    /// eigenvalue, the initial soot moments. Also caches the density.
    pub fn get_initial_soln(&mut self, x: &mut [f64]) {
        assert_eq!(x.len(), self.layout.size(), "solution vector has wrong length");
        let state = GasState::new(
            self.initial_temperature,
            self.pressure,
            &self.initial_mass_fractions,
        );
        let rho = self.thermo.density(&state);
        for j in 0..self.layout.points {
            x[self.layout.index(OFFSET_U, j)] = 0.0;
            x[self.layout.index(OFFSET_V, j)] = 0.0;
            x[self.layout.index(OFFSET_T, j)] = self.initial_temperature;
            x[self.layout.index(OFFSET_L, j)] = 0.0;
            x[self.layout.species_range(j)].copy_from_slice(&self.initial_mass_fractions);
            for m in 0..self.layout.n_soot {
                x[self.layout.index_of(Component::Soot(m), j)] = self.initial_soot[m];
            }
            self.props.rho[j] = rho;
        }
    }

    /// Stores `x` as the previous time level of the `rdt` terms.
    pub fn init_time_integration(&mut self, x: &[f64]) {
        assert_eq!(x.len(), self.layout.size(), "solution vector has wrong length");
        self.prev_soln.clear();
        self.prev_soln.extend_from_slice(x);
    }

    pub fn prev_soln(&self, n: usize, j: usize) -> f64 {
        self.prev_soln[self.layout.index(n, j)]
    }

    /// Prepares the domain for solving on the grid currently installed.
    pub fn finalize(&mut self, x: &[f64]) -> Result<(), FlowError> {
        if self.do_soret && self.transport_mode != TransportMode::Multicomponent {
            return Err(FlowError::SoretRequiresMulticomponent);
        }
        let points = self.layout.points;
        let e = self.do_energy[0];
        for j in 0..points {
            self.fixed_temp[j] = if e || self.zfix.is_empty() {
                x[self.layout.index(OFFSET_T, j)]
            } else {
                linear_interp(self.grid.relative_position(j), &self.zfix, &self.tfix)
            };
        }
        if e {
            self.solve_energy_eqn(None);
        }

        if self.flow_type == Some(FlowType::FreeFlow) {
            if let Some(tfixed) = self.tfixed {
                if let Some(zfixed) = self.zfixed {
                    if self.grid.positions().contains(&zfixed) {
                        return Ok(());
                    }
                }
                for j in 0..points.saturating_sub(1) {
                    let t0 = x[self.layout.index(OFFSET_T, j)];
                    let t1 = x[self.layout.index(OFFSET_T, j + 1)];
                    if (t0 - tfixed) * (t1 - tfixed) <= 0.0 {
                        self.tfixed = Some(t1);
                        self.zfixed = Some(self.grid.z(j + 1));
                        warn!(
                            "fixed point relocated to z = {}, T = {}",
                            self.grid.z(j + 1),
                            t1
                        );
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Clamps negative mass fractions and renormalizes every point.
    pub fn reset_bad_values(&self, x: &mut [f64]) {
        for j in 0..self.layout.points {
            let range = self.layout.species_range(j);
            self.thermo.normalize_mass_fractions(&mut x[range]);
        }
    }

    /////////////////////////////////////////////////////////////////////////////////
    //                     CACHED RESULTS
    /////////////////////////////////////////////////////////////////////////////////

    pub fn density(&self, j: usize) -> f64 {
        self.props.rho[j]
    }

    /// diffusive mass flux of species `k` through face `j`, kg/(m²·s)
    pub fn flux(&self, k: usize, j: usize) -> f64 {
        self.props.flux[(k, j)]
    }

    pub fn soot_flux(&self, m: usize, j: usize) -> f64 {
        self.props.sflux[(m, j)]
    }

    /// thermophoretic drift velocity at point `j`, m/s
    pub fn thermophoretic_velocity(&self, j: usize) -> f64 {
        self.props.vstherm[j]
    }

    /// net molar production rate of species `k` at point `j`, kmol/(m³·s)
    pub fn wdot(&self, k: usize, j: usize) -> f64 {
        self.props.wdot[(k, j)]
    }

    pub fn soot_sources(&self, m: usize, j: usize) -> f64 {
        self.props.sdot[(m, j)]
    }

    /// W/m³
    pub fn radiative_heat_loss(&self, j: usize) -> f64 {
        self.props.qdot_radiation[j]
    }

    pub fn thermo(&self) -> &dyn ThermoPhase {
        self.thermo.as_ref()
    }
}
