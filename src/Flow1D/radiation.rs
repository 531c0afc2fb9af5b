//! # Optically thin radiation
//!
//! Liu & Rogg (1991) model: CO2 and H2O emit with a Planck mean absorption
//! coefficient given by 5th-order polynomials in `1000/T`, and the boundaries
//! radiate back with their emissivities:
//!
//! `q_rad = 2 k_P (2 σ T⁴ − ε_L σ T_L⁴ − ε_R σ T_R⁴)`,
//! `k_P = Σ_i P X_i a_i(T) / P_ref`.
use super::StFlow::StFlow;
use super::layout::OFFSET_T;
use crate::GasModels::gas_api::{ONE_ATM, STEFAN_BOLTZ};

const C_CO2: [f64; 6] = [18.741, -121.310, 273.500, -194.050, 56.310, -5.8169];
const C_H2O: [f64; 6] = [-0.23093, -1.12390, 9.41530, -2.99880, 0.51382, -1.86840e-5];

/// Planck mean absorption coefficient per unit partial pressure, 1/(m·atm)
pub fn planck_coefficient(coeffs: &[f64; 6], t: f64) -> f64 {
    let theta = 1000.0 / t;
    coeffs.iter().rev().fold(0.0, |acc, c| acc * theta + c)
}

impl StFlow {
    /// Radiative loss at points `jmin ..= jmax`; zero when radiation is off.
    pub fn update_radiation(&mut self, x: &[f64], jmin: usize, jmax: usize) {
        if !self.do_radiation {
            for j in jmin..=jmax {
                self.props.qdot_radiation[j] = 0.0;
            }
            return;
        }
        let last = self.layout.points - 1;
        let t_left = x[self.layout.index(OFFSET_T, 0)];
        let t_right = x[self.layout.index(OFFSET_T, last)];
        let rad_left = self.epsilon_left * STEFAN_BOLTZ * t_left.powi(4);
        let rad_right = self.epsilon_right * STEFAN_BOLTZ * t_right.powi(4);
        let [k_co2, k_h2o] = self.k_radiating;

        for j in jmin..=jmax {
            let t = x[self.layout.index(OFFSET_T, j)];
            let mut k_p = 0.0;
            if let Some(k) = k_h2o {
                k_p += self.pressure * self.mole_fraction(x, k, j) * planck_coefficient(&C_H2O, t)
                    / ONE_ATM;
            }
            if let Some(k) = k_co2 {
                k_p += self.pressure * self.mole_fraction(x, k, j) * planck_coefficient(&C_CO2, t)
                    / ONE_ATM;
            }
            self.props.qdot_radiation[j] =
                2.0 * k_p * (2.0 * STEFAN_BOLTZ * t.powi(4) - rad_left - rad_right);
        }
    }
}
