//! Error type, flow configurations and transport modes of a flow domain.
use crate::GasModels::gas_api::GasError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("A flow domain needs at least one species")]
    NoSpecies,
    #[error("A flow domain needs at least one grid point")]
    NoPoints,
    #[error("Unknown flow type: call set_free_flow or set_axisymmetric_flow first")]
    UnknownFlowType,
    #[error("Grid points must be monotonically increasing: z[{index}] = {value}")]
    NonMonotonicGrid { index: usize, value: f64 },
    #[error("Invalid emissivity {0}: must lie in [0, 1]")]
    InvalidEmissivity(f64),
    #[error(
        "Thermal diffusion (the Soret effect) is enabled and requires multicomponent transport"
    )]
    SoretRequiresMulticomponent,
    #[error("Unknown component: {0}")]
    UnknownComponent(String),
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Gas(#[from] GasError),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Momentum/continuity formulation of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// freely propagating flame, inlet mass flux set by an internal fixed-temperature point
    FreeFlow,
    /// counterflow or burner-stabilized flame with prescribed inlet mass fluxes
    AxisymmetricStagnation,
}

impl FlowType {
    pub fn name(&self) -> &'static str {
        match self {
            FlowType::FreeFlow => "Free Flame",
            FlowType::AxisymmetricStagnation => "Axisymmetric Stagnation",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "Free Flame" | "free-flow" => Ok(FlowType::FreeFlow),
            "Axisymmetric Stagnation" | "axisymmetric-flow" => {
                Ok(FlowType::AxisymmetricStagnation)
            }
            _ => Err(FlowError::UnknownFlowType),
        }
    }
}

/// How species diffusion fluxes are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransportMode {
    #[default]
    #[serde(rename = "mixture-averaged")]
    MixtureAveraged,
    #[serde(rename = "multicomponent")]
    Multicomponent,
}

impl TransportMode {
    pub fn name(&self) -> &'static str {
        match self {
            TransportMode::MixtureAveraged => "mixture-averaged",
            TransportMode::Multicomponent => "multicomponent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mixture-averaged" | "Mix" => Some(TransportMode::MixtureAveraged),
            "multicomponent" | "Multi" => Some(TransportMode::Multicomponent),
            _ => None,
        }
    }
}

/// Default lower/upper bounds offered to the outer solver.
pub const VELOCITY_BOUNDS: (f64, f64) = (-1e20, 1e20);
pub const LAMBDA_BOUNDS: (f64, f64) = (-1e20, 1e20);
pub const MASS_FRACTION_BOUNDS: (f64, f64) = (-1e-7, 1e5);
pub const SOOT_BOUNDS: (f64, f64) = (-1e-7, 1e20);
pub const T_MIN: f64 = 200.0;
