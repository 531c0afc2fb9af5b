//! # Flow settings
//!
//! Configuration of a flow domain kept in a JSON document, so that a run can be
//! described in a file instead of a chain of setter calls:
//!
//! ```json
//! {
//!   "flow_type": "Axisymmetric Stagnation",
//!   "pressure": 101325.0,
//!   "transport": "multicomponent",
//!   "soret": true,
//!   "radiation": true,
//!   "emissivity_left": 0.0,
//!   "emissivity_right": 0.2
//! }
//! ```
//!
//! Every field except `flow_type` is optional; missing fields take the defaults of a
//! freshly constructed domain.
use crate::Flow1D::StFlow::{StFlow, THERMOPHORETIC_COEFF};
use crate::Flow1D::excess_species::ExcessSpeciesPolicy;
use crate::Flow1D::flow_api::{FlowError, FlowType, TransportMode};
use crate::GasModels::gas_api::ONE_ATM;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_pressure() -> f64 {
    ONE_ATM
}

fn default_transport() -> String {
    TransportMode::MixtureAveraged.name().to_string()
}

fn default_thermophoretic_coeff() -> f64 {
    THERMOPHORETIC_COEFF
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSettings {
    /// "Free Flame" or "Axisymmetric Stagnation"
    pub flow_type: String,
    /// Pa
    #[serde(default = "default_pressure")]
    pub pressure: f64,
    /// "mixture-averaged" or "multicomponent"
    #[serde(default = "default_transport")]
    pub transport: String,
    #[serde(default)]
    pub soret: bool,
    #[serde(default)]
    pub radiation: bool,
    #[serde(default)]
    pub emissivity_left: f64,
    #[serde(default)]
    pub emissivity_right: f64,
    /// overrides the viscosity flag implied by the flow type
    #[serde(default)]
    pub viscosity: Option<bool>,
    #[serde(default)]
    pub energy: bool,
    #[serde(default)]
    pub force_full_update: bool,
    #[serde(default = "default_thermophoretic_coeff")]
    pub thermophoretic_coefficient: f64,
    #[serde(default)]
    pub excess_species: ExcessSpeciesPolicy,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            flow_type: FlowType::AxisymmetricStagnation.name().to_string(),
            pressure: ONE_ATM,
            transport: default_transport(),
            soret: false,
            radiation: false,
            emissivity_left: 0.0,
            emissivity_right: 0.0,
            viscosity: None,
            energy: false,
            force_full_update: false,
            thermophoretic_coefficient: THERMOPHORETIC_COEFF,
            excess_species: ExcessSpeciesPolicy::LargestMassFraction,
        }
    }
}

impl FlowSettings {
    pub fn from_str(text: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FlowError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            FlowError::InvalidSettings(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let settings = Self::from_str(&text)?;
        info!("flow settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), FlowError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| {
            FlowError::InvalidSettings(format!("failed to write '{}': {}", path.display(), e))
        })
    }

    pub fn transport_mode(&self) -> Result<TransportMode, FlowError> {
        TransportMode::from_name(&self.transport).ok_or_else(|| {
            FlowError::InvalidSettings(format!("unknown transport mode '{}'", self.transport))
        })
    }

    /// Configures `flow`. Nothing is changed if the settings are invalid.
    pub fn apply_to(&self, flow: &mut StFlow) -> Result<(), FlowError> {
        let flow_type = FlowType::from_name(&self.flow_type)?;
        let mode = self.transport_mode()?;
        if !(self.pressure > 0.0) {
            return Err(FlowError::InvalidSettings(format!(
                "pressure must be positive, got {}",
                self.pressure
            )));
        }
        if let ExcessSpeciesPolicy::Fixed(k) = self.excess_species {
            if k >= flow.n_species() {
                return Err(FlowError::InvalidSettings(format!(
                    "excess species {} out of range ({} species)",
                    k,
                    flow.n_species()
                )));
            }
        }
        flow.set_boundary_emissivities(self.emissivity_left, self.emissivity_right)?;

        match flow_type {
            FlowType::FreeFlow => flow.set_free_flow(),
            FlowType::AxisymmetricStagnation => flow.set_axisymmetric_flow(),
        }
        if let Some(visc) = self.viscosity {
            flow.set_viscosity_flag(visc);
        }
        flow.set_pressure(self.pressure);
        flow.set_transport_mode(mode);
        flow.enable_soret(self.soret);
        flow.enable_radiation(self.radiation);
        if self.energy {
            flow.solve_energy_eqn(None);
        }
        flow.set_force_full_update(self.force_full_update);
        flow.set_thermophoretic_coeff(self.thermophoretic_coefficient);
        flow.set_excess_species_policy(self.excess_species);
        info!("flow settings applied: {} at {} Pa", self.flow_type, self.pressure);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Examples::flame_examples::methane_air_flow;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_minimal_document_uses_defaults() {
        let settings = FlowSettings::from_str(r#"{"flow_type": "Free Flame"}"#).unwrap();
        assert_eq!(settings.pressure, ONE_ATM);
        assert_eq!(settings.transport_mode().unwrap(), TransportMode::MixtureAveraged);
        assert_eq!(settings.thermophoretic_coefficient, THERMOPHORETIC_COEFF);
        assert_eq!(settings.excess_species, ExcessSpeciesPolicy::LargestMassFraction);
        assert!(!settings.radiation && !settings.soret);
    }

    #[test]
    fn test_apply_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "flow_type": "Axisymmetric Stagnation",
                "pressure": 50000.0,
                "transport": "multicomponent",
                "soret": true,
                "radiation": true,
                "emissivity_right": 0.4,
                "viscosity": false,
                "energy": true,
                "thermophoretic_coefficient": 0.6,
                "excess_species": {{"Fixed": 4}}
            }}"#
        )
        .unwrap();
        let settings = FlowSettings::from_file(file.path()).unwrap();
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        settings.apply_to(&mut flow).unwrap();
        assert_eq!(flow.flow_type().unwrap(), FlowType::AxisymmetricStagnation);
        assert_eq!(flow.pressure(), 50000.0);
        assert_eq!(flow.transport_mode(), TransportMode::Multicomponent);
        assert!(flow.with_soret());
        assert!(flow.radiation_enabled());
        assert_eq!(flow.right_emissivity(), 0.4);
        assert!(!flow.viscosity_enabled());
        assert!(flow.do_energy(3));
        assert_eq!(flow.thermophoretic_coeff(), 0.6);
        assert_eq!(flow.left_excess_species(), 4);
    }

    #[test]
    fn test_round_trip_through_file() {
        let settings = FlowSettings {
            flow_type: FlowType::FreeFlow.name().to_string(),
            radiation: true,
            emissivity_left: 0.3,
            ..FlowSettings::default()
        };
        let file = NamedTempFile::new().unwrap();
        settings.to_file(file.path()).unwrap();
        assert_eq!(FlowSettings::from_file(file.path()).unwrap(), settings);
    }

    #[test]
    fn test_invalid_settings_leave_domain_untouched() {
        let mut flow = methane_air_flow(5, 0.01).unwrap();
        let bad_transport = FlowSettings {
            transport: "ballistic".to_string(),
            ..FlowSettings::default()
        };
        assert!(matches!(
            bad_transport.apply_to(&mut flow),
            Err(FlowError::InvalidSettings(_))
        ));
        let bad_emissivity = FlowSettings {
            emissivity_left: 2.0,
            ..FlowSettings::default()
        };
        assert!(matches!(
            bad_emissivity.apply_to(&mut flow),
            Err(FlowError::InvalidEmissivity(_))
        ));
        let bad_type = FlowSettings {
            flow_type: "Plug Flow".to_string(),
            ..FlowSettings::default()
        };
        assert!(bad_type.apply_to(&mut flow).is_err());
        let bad_excess = FlowSettings {
            excess_species: ExcessSpeciesPolicy::Fixed(9),
            ..FlowSettings::default()
        };
        assert!(bad_excess.apply_to(&mut flow).is_err());
        assert!(flow.flow_type().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FlowSettings::from_file(dir.path().join("absent.json"));
        assert!(matches!(result, Err(FlowError::InvalidSettings(_))));
    }
}
