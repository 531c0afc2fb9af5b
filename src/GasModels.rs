//! # Gas-phase models
//!
//! Interfaces the flow kernel consumes (thermodynamics, kinetics, transport) together
//! with reference implementations good enough to drive it.
//!
//! | Module | Content |
//! |--------|---------|
//! | `gas_api` | `GasState` snapshot, `ThermoPhase`/`Kinetics`/`Transport` traits, `GasError`, physical constants |
//! | `NASAgas` | `IdealGasMix` of NASA-7 species |
//! | `arrhenius` | reaction mechanisms with modified Arrhenius rate constants |
//! | `transport` | Lennard-Jones kinetic-theory transport, constant transport, `TransportModel` factory |
pub mod gas_api;
#[allow(non_snake_case)]
pub mod NASAgas;
pub mod arrhenius;
pub mod transport;
