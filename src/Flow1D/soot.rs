//! # Soot moment sources
//!
//! The flow domain transports soot moments like extra species (plus thermophoretic
//! drift) and asks a [`SootRates`] model for their sources at every interior point.
//! The model also returns the mass exchanged with the gas (kg/(m³·s) per species),
//! which enters the species equations.
//!
//! ## Two-equation model (Leung, Lindstedt, Jones 1991)
//!
//! Moments: `M0` particle number density (1/m³) and `M1` soot mass density (kg/m³).
//!
//! | step | rate, kmol/(m³·s) |
//! |------|-------------------|
//! | nucleation `C2H2 -> 2 C(s) + H2` | `1e4 exp(-21100/T) [C2H2]` |
//! | surface growth `C2H2 + n C(s) -> (n+2) C(s) + H2` | `6e3 exp(-12100/T) [C2H2] sqrt(A_s)` |
//! | oxidation `C(s) + 0.5 O2 -> CO` | `1e4 T^0.5 exp(-19680/T) [O2] A_s` |
//! | coagulation `n C(s) -> C(s)_n` | `2 C_a d^0.5 (6 k_B T / ρ_s)^0.5 M0²`, C_a = 9 |
//!
//! `A_s = π d² M0` is the soot surface per unit volume, `d = (6 M1 / (π ρ_s M0))^(1/3)`.
use crate::GasModels::gas_api::{AVOGADRO, BOLTZMANN, GasError, GasState, ThermoPhase};
use std::f64::consts::PI;

/// Local state handed to a soot model.
#[derive(Debug, Clone, Copy)]
pub struct SootLocalState<'a> {
    pub gas: GasState<'a>,
    /// kg/m³
    pub density: f64,
    /// Pa*s
    pub viscosity: f64,
    /// volumetric moments ρ·S_m
    pub moments: &'a [f64],
}

pub trait SootRates {
    fn n_moments(&self) -> usize;
    fn moment_names(&self) -> Vec<String>;
    /// Writes moment sources (moment units per m³·s) into `soot_out` and gas-phase
    /// mass sources (kg/(m³·s), one per species) into `gas_out`.
    fn source_terms(
        &self,
        local: &SootLocalState,
        soot_out: &mut [f64],
        gas_out: &mut [f64],
    ) -> Result<(), GasError>;
}

const W_CARBON: f64 = 12.011;
/// kg/m³
const RHO_SOOT: f64 = 1800.0;
/// carbon atoms in an incipient particle
const C_MIN: f64 = 100.0;
const C_A: f64 = 9.0;

#[derive(Debug, Clone)]
pub struct TwoEquationSoot {
    k_c2h2: usize,
    k_h2: usize,
    k_o2: usize,
    k_co: usize,
    molecular_weights: Vec<f64>,
}

impl TwoEquationSoot {
    pub fn new(thermo: &dyn ThermoPhase) -> Result<Self, GasError> {
        let index = |name: &str| {
            thermo
                .species_index(name)
                .ok_or_else(|| GasError::UnknownSpecies(name.to_string()))
        };
        Ok(Self {
            k_c2h2: index("C2H2")?,
            k_h2: index("H2")?,
            k_o2: index("O2")?,
            k_co: index("CO")?,
            molecular_weights: thermo.molecular_weights().to_vec(),
        })
    }

    /// particle diameter and surface area per unit volume
    fn geometry(m0: f64, m1: f64) -> (f64, f64) {
        if m0 <= 0.0 || m1 <= 0.0 {
            return (0.0, 0.0);
        }
        let d = (6.0 * m1 / (PI * RHO_SOOT * m0)).cbrt();
        (d, PI * d * d * m0)
    }
}

impl SootRates for TwoEquationSoot {
    fn n_moments(&self) -> usize {
        2
    }

    fn moment_names(&self) -> Vec<String> {
        vec!["M0".to_string(), "M1".to_string()]
    }

    fn source_terms(
        &self,
        local: &SootLocalState,
        soot_out: &mut [f64],
        gas_out: &mut [f64],
    ) -> Result<(), GasError> {
        let t = local.gas.temperature;
        if !(t > 0.0) {
            return Err(GasError::InvalidTemperature(t));
        }
        let w = &self.molecular_weights;
        let y = local.gas.mass_fractions;
        let conc = |k: usize| (local.density * y[k] / w[k]).max(0.0);
        let c_c2h2 = conc(self.k_c2h2);
        let c_o2 = conc(self.k_o2);
        let m0 = local.moments[0].max(0.0);
        let m1 = local.moments[1].max(0.0);
        let (d, area) = Self::geometry(m0, m1);

        let r_nuc = 1e4 * (-21100.0 / t).exp() * c_c2h2;
        let r_grow = 6e3 * (-12100.0 / t).exp() * c_c2h2 * area.sqrt();
        let r_ox = 1e4 * t.sqrt() * (-19680.0 / t).exp() * c_o2 * area;
        let coag = 2.0 * C_A * d.sqrt() * (6.0 * BOLTZMANN * t / RHO_SOOT).sqrt() * m0 * m0;

        soot_out[0] = 2.0 * r_nuc * AVOGADRO / C_MIN - coag;
        soot_out[1] = 2.0 * W_CARBON * (r_nuc + r_grow) - W_CARBON * r_ox;

        gas_out.iter_mut().for_each(|g| *g = 0.0);
        gas_out[self.k_c2h2] -= w[self.k_c2h2] * (r_nuc + r_grow);
        gas_out[self.k_h2] += w[self.k_h2] * (r_nuc + r_grow);
        gas_out[self.k_o2] -= 0.5 * w[self.k_o2] * r_ox;
        gas_out[self.k_co] += w[self.k_co] * r_ox;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GasModels::NASAgas::{IdealGasMix, SpeciesThermo};
    use crate::GasModels::gas_api::ONE_ATM;
    use approx::assert_relative_eq;

    fn sooting_gas() -> IdealGasMix {
        IdealGasMix::new(
            "sooting",
            vec![
                SpeciesThermo::constant_cp("C2H2", 2.0 * 12.011 + 2.016, 5.0, 226.7e6),
                SpeciesThermo::constant_cp("H2", 2.016, 3.5, 0.0),
                SpeciesThermo::constant_cp("O2", 31.998, 3.5, 0.0),
                SpeciesThermo::constant_cp("CO", 12.011 + 15.999, 3.5, -110.5e6),
                SpeciesThermo::constant_cp("N2", 28.014, 3.5, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_mass_exchange_is_conservative() {
        let gas = sooting_gas();
        let soot = TwoEquationSoot::new(&gas).unwrap();
        let y = [0.05, 0.01, 0.02, 0.02, 0.9];
        let state = GasState::new(1800.0, ONE_ATM, &y);
        let rho = gas.density(&state);
        let moments = [1e17, 1e-4];
        let local = SootLocalState {
            gas: state,
            density: rho,
            viscosity: 5e-5,
            moments: &moments,
        };
        let mut sdot = [0.0; 2];
        let mut sgdot = [0.0; 5];
        soot.source_terms(&local, &mut sdot, &mut sgdot).unwrap();
        let gas_total: f64 = sgdot.iter().sum();
        assert_relative_eq!(gas_total + sdot[1], 0.0, epsilon = 1e-9 * sdot[1].abs().max(1e-30));
        assert!(sgdot[0] < 0.0);
        assert!(sgdot[3] > 0.0);
        assert_eq!(sgdot[4], 0.0);
    }

    #[test]
    fn test_nucleation_only_without_particles() {
        let gas = sooting_gas();
        let soot = TwoEquationSoot::new(&gas).unwrap();
        let y = [0.05, 0.01, 0.0, 0.0, 0.94];
        let state = GasState::new(2000.0, ONE_ATM, &y);
        let rho = gas.density(&state);
        let moments = [0.0, 0.0];
        let local = SootLocalState {
            gas: state,
            density: rho,
            viscosity: 5e-5,
            moments: &moments,
        };
        let mut sdot = [0.0; 2];
        let mut sgdot = [0.0; 5];
        soot.source_terms(&local, &mut sdot, &mut sgdot).unwrap();
        let c_c2h2 = rho * 0.05 / gas.molecular_weights()[0];
        let r_nuc = 1e4 * (-21100.0_f64 / 2000.0).exp() * c_c2h2;
        assert_relative_eq!(sdot[0], 2.0 * r_nuc * AVOGADRO / C_MIN, max_relative = 1e-12);
        assert_relative_eq!(sdot[1], 2.0 * W_CARBON * r_nuc, max_relative = 1e-12);
    }

    #[test]
    fn test_requires_soot_species() {
        let gas = IdealGasMix::new(
            "air",
            vec![SpeciesThermo::constant_cp("N2", 28.014, 3.5, 0.0)],
        )
        .unwrap();
        assert!(matches!(
            TwoEquationSoot::new(&gas),
            Err(GasError::UnknownSpecies(_))
        ));
    }
}
