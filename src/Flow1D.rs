//! # One-dimensional flame domains
//!
//! Discretized physics of a quasi-one-dimensional reacting flow: axisymmetric
//! stagnation (counterflow, burner-stabilized) and freely propagating flames. The
//! domain turns a candidate solution vector into residuals and a differential /
//! algebraic row mask for an external damped-Newton / pseudo-transient solver.
//!
//! | Module | Content |
//! |--------|---------|
//! | `flow_api` | `FlowError`, `FlowType`, `TransportMode`, solution bounds |
//! | `layout` | per-point unknown layout `[U, V, T, Λ, Y.., S..]` |
//! | `grid` | positions, spacings, profile interpolation |
//! | `excess_species` | species closed by `1 − ΣY` at the boundaries |
//! | `StFlow` | the domain: configuration, flags, lifecycle |
//! | `properties` | thermo/transport cache refreshed over index windows |
//! | `fluxes` | species and soot-moment face fluxes |
//! | `residual` | residual rows, `eval`, continuity and boundary row groups |
//! | `radiation` | optically thin CO2/H2O radiation |
//! | `soot` | `SootRates` interface and a two-equation soot model |
//! | `flow_io` | serialize / restore, solution tables |
pub mod excess_species;
pub mod flow_api;
pub mod flow_io;
pub mod fluxes;
pub mod grid;
pub mod layout;
pub mod properties;
pub mod radiation;
pub mod residual;
pub mod soot;
#[allow(non_snake_case)]
pub mod StFlow;
mod flow_tests;
