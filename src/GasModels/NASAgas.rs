//! # Ideal-gas mixture with NASA-7 species thermodynamics
//!
//! Every species carries its molecular weight and NASA format 7 coefficients in one
//! or two temperature ranges:
//!
//! ```text
//! Cp/R  = a1 + a2 T + a3 T² + a4 T³ + a5 T⁴
//! H/RT  = a1 + a2 T/2 + a3 T²/3 + a4 T³/4 + a5 T⁴/5 + a6/T
//! ```
//!
//! The data layout follows the `Cp` vectors of the NASA library files:
//! `[T_low, T_high, a1..a7]` for one range or `[T_low, T_mid, T_high, a1..a7, a1..a7]`
//! for two ranges (low range first).
//!
//! ```rust, ignore
//! let n2 = SpeciesThermo::constant_cp("N2", 28.014, 3.5, 0.0);
//! let gas = IdealGasMix::new("air", vec![n2, o2])?;
//! let rho = gas.density(&GasState::new(300.0, ONE_ATM, &[0.77, 0.23]));
//! ```

use super::gas_api::{GAS_CONSTANT, GasError, ThermoPhase};
use serde::{Deserialize, Serialize};

/// reference temperature of the standard enthalpy of formation, K
pub const T_REF: f64 = 298.15;

fn cp_r(t: f64, a: &[f64]) -> f64 {
    a[0] + a[1] * t + a[2] * t.powi(2) + a[3] * t.powi(3) + a[4] * t.powi(4)
}

fn h_rt(t: f64, a: &[f64]) -> f64 {
    a[0] + a[1] * t / 2.0
        + a[2] * t.powi(2) / 3.0
        + a[3] * t.powi(3) / 4.0
        + a[4] * t.powi(4) / 5.0
        + a[5] / t
}

/// Species record as it appears in a JSON species library.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SpeciesThermo {
    pub name: String,
    /// kg/kmol
    pub molar_mass: f64,
    /// NASA-7 data with temperature bounds, see the module docs
    #[serde(rename = "Cp")]
    pub cp: Vec<f64>,
}

impl SpeciesThermo {
    pub fn new(name: &str, molar_mass: f64, cp: Vec<f64>) -> Result<Self, GasError> {
        let species = Self {
            name: name.to_string(),
            molar_mass,
            cp,
        };
        species.check()?;
        Ok(species)
    }

    /// Species with a temperature-independent heat capacity `cp_r`·R and enthalpy of
    /// formation `h_formation` (J/kmol) at 298.15 K, valid from 200 to 6000 K.
    pub fn constant_cp(name: &str, molar_mass: f64, cp_r: f64, h_formation: f64) -> Self {
        let a6 = h_formation / GAS_CONSTANT - cp_r * T_REF;
        Self {
            name: name.to_string(),
            molar_mass,
            cp: vec![200.0, 6000.0, cp_r, 0.0, 0.0, 0.0, 0.0, a6, 0.0],
        }
    }

    fn check(&self) -> Result<(), GasError> {
        if !(self.molar_mass > 0.0) {
            return Err(GasError::ParseError(format!(
                "species {} has non-positive molar mass {}",
                self.name, self.molar_mass
            )));
        }
        match self.cp.len() {
            9 | 17 => Ok(()),
            n => Err(GasError::ParseError(format!(
                "species {}: NASA-7 record must hold 9 or 17 numbers, got {}",
                self.name, n
            ))),
        }
    }

    pub fn t_min(&self) -> f64 {
        self.cp[0]
    }

    pub fn t_max(&self) -> f64 {
        match self.cp.len() {
            17 => self.cp[2],
            _ => self.cp[1],
        }
    }

    /// Coefficients for temperature `t`. Outside the data range the nearest range
    /// is extrapolated: a Newton iterate may wander there temporarily.
    pub fn coefficients(&self, t: f64) -> &[f64] {
        match self.cp.len() {
            17 => {
                let t_mid = self.cp[1];
                if t <= t_mid {
                    &self.cp[3..10]
                } else {
                    &self.cp[10..17]
                }
            }
            _ => &self.cp[2..9],
        }
    }

    /// Strict lookup which refuses temperatures outside of the data range.
    pub fn coefficients_checked(&self, t: f64) -> Result<&[f64], GasError> {
        if t < self.t_min() || t > self.t_max() {
            return Err(GasError::NoCoefficientsFound {
                temperature: t,
                range: format!("{} - {}", self.t_min(), self.t_max()),
            });
        }
        Ok(self.coefficients(t))
    }

    pub fn cp_r(&self, t: f64) -> f64 {
        cp_r(t, self.coefficients(t))
    }

    pub fn enthalpy_rt(&self, t: f64) -> f64 {
        h_rt(t, self.coefficients(t))
    }
}

/// Ideal-gas mixture made of NASA-7 species.
#[derive(Debug, Clone)]
pub struct IdealGasMix {
    pub name: String,
    pub species: Vec<SpeciesThermo>,
    molecular_weights: Vec<f64>,
}

impl IdealGasMix {
    pub fn new(name: &str, species: Vec<SpeciesThermo>) -> Result<Self, GasError> {
        for s in &species {
            s.check()?;
        }
        let molecular_weights = species.iter().map(|s| s.molar_mass).collect();
        Ok(Self {
            name: name.to_string(),
            species,
            molecular_weights,
        })
    }

    /// takes serde Value (array of species records) and builds the mixture
    pub fn from_serde(name: &str, data: serde_json::Value) -> Result<Self, GasError> {
        let species: Vec<SpeciesThermo> = serde_json::from_value(data)?;
        Self::new(name, species)
    }

    pub fn species_names(&self) -> Vec<String> {
        self.species.iter().map(|s| s.name.clone()).collect()
    }
}

impl ThermoPhase for IdealGasMix {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_species(&self) -> usize {
        self.species.len()
    }

    fn species_name(&self, k: usize) -> &str {
        &self.species[k].name
    }

    fn molecular_weights(&self) -> &[f64] {
        &self.molecular_weights
    }

    fn max_temp(&self) -> f64 {
        self.species
            .iter()
            .map(|s| s.t_max())
            .fold(f64::INFINITY, f64::min)
    }

    fn enthalpy_rt_ref(&self, t: f64, out: &mut [f64]) {
        for (h, s) in out.iter_mut().zip(&self.species) {
            *h = s.enthalpy_rt(t);
        }
    }

    fn cp_r_ref(&self, t: f64, out: &mut [f64]) {
        for (c, s) in out.iter_mut().zip(&self.species) {
            *c = s.cp_r(t);
        }
    }
}
