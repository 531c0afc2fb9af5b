//! Ready-made flame setups: a methane/air mixture with constant-cp species, one-step
//! kinetics and Lennard-Jones transport, plus initial profiles for a counterflow and
//! a free flame. The builders are reused by the test suites.
use crate::Flow1D::StFlow::StFlow;
use crate::Flow1D::flow_api::{FlowError, TransportMode};
use crate::Flow1D::layout::{Component, OFFSET_L, OFFSET_T, OFFSET_U, OFFSET_V};
use crate::Flow1D::soot::TwoEquationSoot;
use crate::GasModels::NASAgas::{IdealGasMix, SpeciesThermo};
use crate::GasModels::arrhenius::{ArrheniusKinetics, InertKinetics};
use crate::GasModels::gas_api::GasError;
use crate::GasModels::transport::{TransportInput, TransportType, create_transport_model};
use log::info;
use serde_json::json;
use std::collections::HashMap;

pub const METHANE_AIR: [&str; 5] = ["CH4", "O2", "CO2", "H2O", "N2"];

pub fn methane_air_gas() -> Result<IdealGasMix, GasError> {
    IdealGasMix::new(
        "methane-air",
        vec![
            SpeciesThermo::constant_cp("CH4", 16.043, 6.0, -74.87e6),
            SpeciesThermo::constant_cp("O2", 31.998, 4.2, 0.0),
            SpeciesThermo::constant_cp("CO2", 44.009, 6.2, -393.5e6),
            SpeciesThermo::constant_cp("H2O", 18.015, 5.0, -241.8e6),
            SpeciesThermo::constant_cp("N2", 28.014, 4.0, 0.0),
        ],
    )
}

/// Lennard-Jones diameters (Å) and well depths (K); H2O is polar.
pub fn methane_air_transport_params() -> HashMap<String, TransportInput> {
    HashMap::from([
        ("CH4".to_string(), TransportInput::lennard_jones(2.0, 3.746, 141.4)),
        ("O2".to_string(), TransportInput::lennard_jones(1.0, 3.458, 107.4)),
        ("CO2".to_string(), TransportInput::lennard_jones(1.0, 3.763, 244.0)),
        (
            "H2O".to_string(),
            TransportInput::lennard_jones(2.0, 2.605, 572.4).with_dipole(1.844),
        ),
        ("N2".to_string(), TransportInput::lennard_jones(1.0, 3.621, 97.53)),
    ])
}

/// one-step methane oxidation with fractional orders
pub fn global_methane_kinetics(gas: &IdealGasMix) -> Result<ArrheniusKinetics, GasError> {
    ArrheniusKinetics::from_serde(
        gas,
        json!([{
            "eq": "CH4 + 2 O2 => CO2 + 2 H2O",
            "Arrenius": [1.1e10, 0.0, 2.0e5],
            "orders": {"CH4": 1.0, "O2": 0.5}
        }]),
    )
}

/// Methane/air domain on a uniform grid over `[0, length]`.
pub fn methane_air_flow(points: usize, length: f64) -> Result<StFlow, FlowError> {
    let gas = methane_air_gas()?;
    let kinetics = global_methane_kinetics(&gas)?;
    let transport = create_transport_model(TransportType::LennardJones {
        thermo: gas.clone(),
        params: methane_air_transport_params(),
    })?;
    let mut flow = StFlow::new(Box::new(gas), Box::new(kinetics), Box::new(transport), points)?;
    let z: Vec<f64> = (0..points)
        .map(|j| length * j as f64 / (points - 1).max(1) as f64)
        .collect();
    flow.setup_grid(&z)?;
    Ok(flow)
}

pub fn sooting_gas() -> Result<IdealGasMix, GasError> {
    IdealGasMix::new(
        "ethylene-products",
        vec![
            SpeciesThermo::constant_cp("C2H2", 26.038, 5.5, 226.7e6),
            SpeciesThermo::constant_cp("H2", 2.016, 3.6, 0.0),
            SpeciesThermo::constant_cp("O2", 31.998, 4.2, 0.0),
            SpeciesThermo::constant_cp("CO", 28.010, 4.0, -110.5e6),
            SpeciesThermo::constant_cp("N2", 28.014, 4.0, 0.0),
        ],
    )
}

/// Sooting mixture for the soot-coupling demo, inert gas chemistry.
pub fn sooting_flow(points: usize, length: f64) -> Result<StFlow, FlowError> {
    let gas = sooting_gas()?;
    let soot = TwoEquationSoot::new(&gas)?;
    let transport = create_transport_model(TransportType::Constant {
        n_species: 5,
        viscosity: 5e-5,
        conductivity: 0.08,
        diffusivity: 2e-4,
    })?;
    let mut flow = StFlow::with_soot(
        Box::new(gas),
        Box::new(InertKinetics),
        Box::new(transport),
        Box::new(soot),
        points,
    )?;
    let z: Vec<f64> = (0..points)
        .map(|j| length * j as f64 / (points - 1).max(1) as f64)
        .collect();
    flow.setup_grid(&z)?;
    Ok(flow)
}

/// Counterflow-like profile: fuel from the left, air from the right, a hot zone in
/// the middle, axial velocity changing sign at the stagnation plane.
pub fn counterflow_profile(flow: &StFlow) -> Vec<f64> {
    let layout = flow.layout();
    let grid = flow.grid();
    let points = layout.points;
    let length = grid.z(points - 1) - grid.z(0);
    let mut x = vec![0.0; layout.size()];
    for j in 0..points {
        let s = (grid.z(j) - grid.z(0)) / length;
        let hot = (-((s - 0.5) / 0.15).powi(2)).exp();
        x[layout.index(OFFSET_U, j)] = 0.4 * (1.0 - 2.0 * s) + 0.01;
        x[layout.index(OFFSET_V, j)] = 40.0 * (1.0 - (2.0 * s - 1.0).powi(2)) + 5.0;
        x[layout.index(OFFSET_T, j)] = 300.0 + 1500.0 * hot;
        x[layout.index(OFFSET_L, j)] = -250.0;
        let y = [
            0.2 * (1.0 - s) * (1.0 - 0.8 * hot),
            0.233 * s * (1.0 - 0.8 * hot),
            0.08 * hot,
            0.07 * hot,
        ];
        let n2 = 1.0 - y.iter().sum::<f64>();
        for (k, yk) in y.iter().chain(std::iter::once(&n2)).enumerate() {
            x[layout.index_of(Component::Species(k), j)] = *yk;
        }
    }
    x
}

/// Free-flame profile: cold premixed gas on the left, burnt gas on the right.
pub fn free_flame_profile(flow: &StFlow) -> Vec<f64> {
    let layout = flow.layout();
    let grid = flow.grid();
    let points = layout.points;
    let length = grid.z(points - 1) - grid.z(0);
    let mut x = vec![0.0; layout.size()];
    for j in 0..points {
        let s = (grid.z(j) - grid.z(0)) / length;
        let burnt = 0.5 * (1.0 + ((s - 0.4) / 0.08).tanh());
        let t = 300.0 + 1700.0 * burnt;
        x[layout.index(OFFSET_U, j)] = 0.4 * t / 300.0;
        x[layout.index(OFFSET_T, j)] = t;
        let y = [
            0.055 * (1.0 - burnt),
            0.22 * (1.0 - burnt) + 0.01 * burnt,
            0.15 * burnt,
            0.12 * burnt,
        ];
        let n2 = 1.0 - y.iter().sum::<f64>();
        for (k, yk) in y.iter().chain(std::iter::once(&n2)).enumerate() {
            x[layout.index_of(Component::Species(k), j)] = *yk;
        }
    }
    x
}

fn residual_norm(r: &[f64]) -> f64 {
    r.iter().map(|v| v * v).sum::<f64>().sqrt()
}

pub fn flame_examples(task: usize) {
    match task {
        0 => {
            // COUNTERFLOW FLAME: residual of a guessed profile
            let run = || -> Result<(), FlowError> {
                let mut flow = methane_air_flow(21, 0.02)?;
                flow.set_axisymmetric_flow();
                flow.solve_energy_eqn(None);
                flow.enable_radiation(true);
                flow.set_boundary_emissivities(0.0, 0.0)?;
                let x = counterflow_profile(&flow);
                flow.finalize(&x)?;
                let mut r = vec![0.0; x.len()];
                let mut mask = vec![false; x.len()];
                flow.eval(None, &x, &mut r, &mut mask, 0.0)?;
                flow.show_solution(&x);
                info!(
                    "counterflow residual norm {:.4e}, {} differential rows",
                    residual_norm(&r),
                    mask.iter().filter(|m| **m).count()
                );
                Ok(())
            };
            if let Err(e) = run() {
                println!("counterflow example failed: {}", e);
            }
        }
        1 => {
            // FREE FLAME: fixed point anchoring the flame, multicomponent diffusion
            let run = || -> Result<(), FlowError> {
                let mut flow = methane_air_flow(31, 0.03)?;
                flow.set_free_flow();
                flow.set_transport_mode(TransportMode::Multicomponent);
                flow.enable_soret(true);
                flow.solve_energy_eqn(None);
                let x = free_flame_profile(&flow);
                flow.set_fixed_point(0.0123, 900.0);
                flow.finalize(&x)?;
                info!("fixed point after finalize: {:?}", flow.fixed_point());
                let mut r = vec![0.0; x.len()];
                let mut mask = vec![false; x.len()];
                flow.eval(None, &x, &mut r, &mut mask, 0.0)?;
                flow.show_solution(&x);
                info!("free flame residual norm {:.4e}", residual_norm(&r));
                Ok(())
            };
            if let Err(e) = run() {
                println!("free flame example failed: {}", e);
            }
        }
        2 => {
            // SOOT MOMENTS carried through a hot acetylene layer
            let run = || -> Result<(), FlowError> {
                let mut flow = sooting_flow(11, 0.01)?;
                flow.set_axisymmetric_flow();
                flow.set_initial_gas(1600.0, &[0.05, 0.01, 0.02, 0.02, 0.90])?;
                flow.set_initial_soot(&[1e14, 1e-7]);
                let mut x = vec![0.0; flow.layout().size()];
                flow.get_initial_soln(&mut x);
                for j in 0..flow.n_points() {
                    let idx = flow.index(OFFSET_T, j);
                    x[idx] = 1400.0 + 40.0 * j as f64;
                }
                flow.finalize(&x)?;
                let mut r = vec![0.0; x.len()];
                let mut mask = vec![false; x.len()];
                flow.eval(None, &x, &mut r, &mut mask, 0.0)?;
                flow.show_solution(&x);
                for j in 0..flow.n_points() {
                    info!(
                        "z = {:.4e}: v_th = {:.4e} m/s, dM1/dt = {:.4e} kg/m3/s",
                        flow.grid().z(j),
                        flow.thermophoretic_velocity(j),
                        flow.soot_sources(1, j)
                    );
                }
                Ok(())
            };
            if let Err(e) = run() {
                println!("soot example failed: {}", e);
            }
        }
        3 => {
            // SNAPSHOT: serialize a counterflow domain and restore it into a new one
            let run = || -> Result<(), FlowError> {
                let mut flow = methane_air_flow(11, 0.02)?;
                flow.set_axisymmetric_flow();
                let x = counterflow_profile(&flow);
                let document = flow.serialize(&x)?;
                println!("{}", serde_json::to_string_pretty(&document)?);
                let mut restored = methane_air_flow(2, 1.0)?;
                let mut x2 = Vec::new();
                restored.restore(&document, &mut x2)?;
                info!("restored {} points", restored.n_points());
                Ok(())
            };
            if let Err(e) = run() {
                println!("snapshot example failed: {}", e);
            }
        }
        _ => {
            println!("no such example: {}", task);
        }
    }
}
