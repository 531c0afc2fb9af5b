//! # Snapshots and diagnostics
//!
//! `serialize` writes the configuration and the solution of a domain into a JSON
//! document, `restore` rebuilds a domain (grid, flags, fixed values, solution) from
//! one. `solution_table`/`show_solution` render the solution with prettytable.
//!
//! Document keys: `type`, `pressure`, `phase`, `transport-model`,
//! `radiation-enabled`, `emissivity-left`, `emissivity-right`, `energy-enabled`,
//! `species-enabled`, `fixed-mass-fractions`, `Soret-enabled`, `multicomponent`,
//! `viscosity-enabled`, `fixed-point`, `fixed-temperature-profile`,
//! `fixed-temperatures`, `thermophoretic-coefficient`, `excess-species`,
//! `force-full-update`, `grid`, `components`.
use super::StFlow::{StFlow, THERMOPHORETIC_COEFF};
use super::excess_species::ExcessSpeciesPolicy;
use super::flow_api::{FlowError, FlowType, TransportMode};
use super::grid::Grid;
use super::layout::OFFSET_Y;
use log::{info, warn};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A flag that is either uniform over the domain or given per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointFlags {
    Uniform(bool),
    PerPoint(Vec<bool>),
}

impl PointFlags {
    pub fn from_flags(flags: &[bool]) -> Self {
        match flags.first() {
            Some(&first) if flags.iter().all(|&f| f == first) => PointFlags::Uniform(first),
            _ => PointFlags::PerPoint(flags.to_vec()),
        }
    }

    pub fn expand(&self, points: usize) -> Result<Vec<bool>, FlowError> {
        match self {
            PointFlags::Uniform(f) => Ok(vec![*f; points]),
            PointFlags::PerPoint(v) if v.len() == points => Ok(v.clone()),
            PointFlags::PerPoint(v) => Err(FlowError::InvalidSnapshot(format!(
                "{} flags for {} points",
                v.len(),
                points
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub location: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedTemperatureProfile {
    pub z: Vec<f64>,
    #[serde(rename = "T")]
    pub t: Vec<f64>,
}

fn default_thermophoretic_coeff() -> f64 {
    THERMOPHORETIC_COEFF
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlowSnapshot {
    #[serde(rename = "type")]
    pub flow_type: String,
    pub pressure: f64,
    pub phase: String,
    pub transport_model: String,
    pub radiation_enabled: bool,
    #[serde(default)]
    pub emissivity_left: f64,
    #[serde(default)]
    pub emissivity_right: f64,
    pub energy_enabled: PointFlags,
    pub species_enabled: PointFlags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_mass_fractions: Option<BTreeMap<String, Vec<f64>>>,
    #[serde(rename = "Soret-enabled")]
    pub soret_enabled: bool,
    pub multicomponent: bool,
    pub viscosity_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_point: Option<FixedPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_temperature_profile: Option<FixedTemperatureProfile>,
    pub fixed_temperatures: Vec<f64>,
    #[serde(default = "default_thermophoretic_coeff")]
    pub thermophoretic_coefficient: f64,
    #[serde(default)]
    pub excess_species: ExcessSpeciesPolicy,
    #[serde(default)]
    pub force_full_update: bool,
    pub grid: Vec<f64>,
    pub components: BTreeMap<String, Vec<f64>>,
}

impl StFlow {
    /// Structured snapshot of the configuration and of the solution `x`.
    pub fn snapshot(&self, x: &[f64]) -> Result<FlowSnapshot, FlowError> {
        let points = self.layout.points;
        let nv = self.layout.n_components();
        let components = (0..nv)
            .map(|n| {
                let values = (0..points).map(|j| x[self.layout.index(n, j)]).collect();
                (self.component_name(n), values)
            })
            .collect();
        let fixed_mass_fractions = if self.do_species.iter().any(|&on| !on) {
            Some(
                (0..self.layout.n_species)
                    .map(|k| {
                        let name = self.thermo.species_name(k).to_string();
                        (name, self.fixed_y.row(k).iter().copied().collect())
                    })
                    .collect(),
            )
        } else {
            None
        };
        let fixed_temperature_profile = if self.zfix.is_empty() {
            None
        } else {
            Some(FixedTemperatureProfile {
                z: self.zfix.clone(),
                t: self.tfix.clone(),
            })
        };
        Ok(FlowSnapshot {
            flow_type: self.flow_type()?.name().to_string(),
            pressure: self.pressure,
            phase: self.thermo.name().to_string(),
            transport_model: self.transport.model_name().to_string(),
            radiation_enabled: self.do_radiation,
            emissivity_left: self.epsilon_left,
            emissivity_right: self.epsilon_right,
            energy_enabled: PointFlags::from_flags(&self.do_energy),
            species_enabled: PointFlags::from_flags(&self.do_species),
            fixed_mass_fractions,
            soret_enabled: self.do_soret,
            multicomponent: self.transport_mode == TransportMode::Multicomponent,
            viscosity_enabled: self.do_visc,
            fixed_point: self.fixed_point().map(|(location, temperature)| FixedPoint {
                location,
                temperature,
            }),
            fixed_temperature_profile,
            fixed_temperatures: self.fixed_temp.clone(),
            thermophoretic_coefficient: self.thermophoretic_coeff,
            excess_species: self.excess.policy,
            force_full_update: self.force_full_update,
            grid: self.grid.positions().to_vec(),
            components,
        })
    }

    pub fn serialize(&self, x: &[f64]) -> Result<serde_json::Value, FlowError> {
        Ok(serde_json::to_value(self.snapshot(x)?)?)
    }

    /// Rebuilds the domain from a document written by `serialize`. The grid (and so
    /// the length of `x`) is taken from the document.
    pub fn restore(&mut self, state: &serde_json::Value, x: &mut Vec<f64>) -> Result<(), FlowError> {
        let snapshot: FlowSnapshot = serde_json::from_value(state.clone())?;
        self.restore_snapshot(&snapshot, x)
    }

    /// Rebuilds the domain from `s`. The document is checked in full first: an invalid
    /// one leaves the domain and `x` untouched.
    pub fn restore_snapshot(&mut self, s: &FlowSnapshot, x: &mut Vec<f64>) -> Result<(), FlowError> {
        let flow_type = FlowType::from_name(&s.flow_type)?;
        let mut grid = Grid::uniform(0);
        grid.setup(&s.grid)?;
        let points = grid.points();
        for e in [s.emissivity_left, s.emissivity_right] {
            if !(0.0..=1.0).contains(&e) {
                return Err(FlowError::InvalidEmissivity(e));
            }
        }
        let do_energy = s.energy_enabled.expand(points)?;
        let do_species = s.species_enabled.expand(points)?;
        if s.fixed_temperatures.len() != points {
            return Err(FlowError::InvalidSnapshot(format!(
                "{} fixed temperatures for {} points",
                s.fixed_temperatures.len(),
                points
            )));
        }
        if let Some(p) = &s.fixed_temperature_profile {
            if p.z.len() != p.t.len() {
                return Err(FlowError::InvalidSnapshot(format!(
                    "fixed temperature profile has {} positions and {} temperatures",
                    p.z.len(),
                    p.t.len()
                )));
            }
        }
        if let ExcessSpeciesPolicy::Fixed(k) = s.excess_species {
            if k >= self.layout.n_species {
                return Err(FlowError::InvalidSnapshot(format!(
                    "excess species {} out of range ({} species)",
                    k, self.layout.n_species
                )));
            }
        }
        let mut columns = Vec::with_capacity(s.components.len());
        for (name, values) in &s.components {
            let n = match self.component_index(name) {
                Ok(n) => n,
                Err(_) => {
                    warn!("snapshot component '{}' is not part of this domain", name);
                    continue;
                }
            };
            if values.len() != points {
                return Err(FlowError::InvalidSnapshot(format!(
                    "component '{}' has {} values for {} points",
                    name,
                    values.len(),
                    points
                )));
            }
            columns.push((n, values));
        }

        match flow_type {
            FlowType::FreeFlow => self.set_free_flow(),
            FlowType::AxisymmetricStagnation => self.set_axisymmetric_flow(),
        }
        self.set_viscosity_flag(s.viscosity_enabled);
        self.set_pressure(s.pressure);
        if s.phase != self.thermo.name() {
            warn!("snapshot of phase '{}' restored into '{}'", s.phase, self.thermo.name());
        }
        if s.transport_model != self.transport.model_name() {
            warn!(
                "snapshot was computed with '{}' transport, domain uses '{}'",
                s.transport_model,
                self.transport.model_name()
            );
        }
        self.set_transport_mode(if s.multicomponent {
            TransportMode::Multicomponent
        } else {
            TransportMode::MixtureAveraged
        });

        self.setup_grid(&s.grid)?;
        x.clear();
        x.resize(self.layout.size(), 0.0);

        let nv = self.layout.n_components();
        let mut seen = vec![false; nv];
        for (n, values) in columns {
            for (j, v) in values.iter().enumerate() {
                x[self.layout.index(n, j)] = *v;
            }
            seen[n] = true;
        }
        for n in (0..nv).filter(|&n| !seen[n]) {
            warn!("component '{}' missing from snapshot, set to 0", self.component_name(n));
        }

        self.do_energy = do_energy;
        self.do_species = do_species;
        self.fixed_temp = s.fixed_temperatures.clone();
        self.fixed_y.fill(0.0);
        if let Some(fixed) = &s.fixed_mass_fractions {
            for (name, values) in fixed {
                let Some(k) = self.thermo.species_index(name) else {
                    warn!("fixed mass fractions of unknown species '{}' ignored", name);
                    continue;
                };
                for (j, v) in values.iter().take(points).enumerate() {
                    self.fixed_y[(k, j)] = *v;
                }
            }
        }

        self.enable_radiation(s.radiation_enabled);
        self.epsilon_left = s.emissivity_left;
        self.epsilon_right = s.emissivity_right;
        self.enable_soret(s.soret_enabled);
        self.thermophoretic_coeff = s.thermophoretic_coefficient;
        self.set_excess_species_policy(s.excess_species);
        self.set_force_full_update(s.force_full_update);
        match &s.fixed_point {
            Some(fp) => self.set_fixed_point(fp.location, fp.temperature),
            None => {
                self.zfixed = None;
                self.tfixed = None;
            }
        }
        match &s.fixed_temperature_profile {
            Some(p) => self.set_fixed_temp_profile(&p.z, &p.t),
            None => {
                self.zfix.clear();
                self.tfix.clear();
            }
        }
        self.needs_jacobian_update = true;
        info!("restored {} domain with {} points", s.flow_type, points);
        Ok(())
    }

    /// Solution of the active components, six per table.
    pub fn solution_table(&self, x: &[f64]) -> String {
        const BLOCK: usize = 6;
        let points = self.layout.points;
        let nv = self.layout.n_components();
        let mut out = format!("    Pressure:   {:10.4e} Pa\n", self.pressure);
        let active: Vec<usize> = (0..nv).filter(|&n| self.component_active(n)).collect();
        for chunk in active.chunks(BLOCK) {
            let mut table = Table::new();
            let mut header = vec![Cell::new("z")];
            header.extend(chunk.iter().map(|&n| Cell::new(&self.column_label(n))));
            table.add_row(Row::new(header));
            for j in 0..points {
                let mut row = vec![Cell::new(&format!("{:10.4e}", self.grid.z(j)))];
                row.extend(
                    chunk
                        .iter()
                        .map(|&n| Cell::new(&format!("{:10.4e}", x[self.layout.index(n, j)]))),
                );
                table.add_row(Row::new(row));
            }
            out.push_str(&table.to_string());
        }
        if self.do_radiation {
            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("z"),
                Cell::new("radiative heat loss, W/m3"),
            ]));
            for j in 0..points {
                table.add_row(Row::new(vec![
                    Cell::new(&format!("{:10.4e}", self.grid.z(j))),
                    Cell::new(&format!("{:10.4e}", self.props.qdot_radiation[j])),
                ]));
            }
            out.push_str(&table.to_string());
        }
        out
    }

    fn column_label(&self, n: usize) -> String {
        let name = self.component_name(n);
        let soot_offset = OFFSET_Y + self.layout.n_species;
        match &self.soot {
            Some(soot) if n >= soot_offset => match soot.moment_names().get(n - soot_offset) {
                Some(moment) => format!("{} ({})", name, moment),
                None => name,
            },
            _ => name,
        }
    }

    pub fn show_solution(&self, x: &[f64]) {
        println!("{}", self.solution_table(x));
    }
}
