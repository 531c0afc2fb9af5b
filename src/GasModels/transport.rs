//! # Mixture transport properties
//!
//! ## Aim
//! Transport models consumed by the flow kernel through the [`Transport`] trait.
//!
//! ## Main Data Structures and Logic
//! - `LennardJonesTransport`: kinetic theory of gases with Lennard-Jones 12-6 potential.
//!   Species viscosities from the collision integral Ω₂₂ (Hirschfelder), binary
//!   diffusion coefficients from Ω₁₁, mixture viscosity by the Wilke rule, species
//!   conductivities by the modified Eucken relation combined with the Mathur rule.
//!   Multicomponent coefficients are obtained by inverting the Stefan-Maxwell system.
//! - `ConstantTransport`: fixed μ, λ and one diffusivity for every species. Handy for
//!   tests and for pinning diffusion to zero.
//! - `TransportModel`: enum_dispatch wrapper, created by `create_transport_model`.
//!
//! ## Usage
//! ```rust, ignore
//! let mut params = HashMap::new();
//! params.insert("N2".to_string(), TransportInput::lennard_jones(1.0, 3.621, 97.53));
//! let trans = LennardJonesTransport::new(gas.clone(), &params)?;
//! let mu = trans.viscosity(&GasState::new(300.0, ONE_ATM, &y))?;
//! ```
use super::NASAgas::IdealGasMix;
use super::gas_api::{
    BOLTZMANN, GAS_CONSTANT, GasError, GasState, ONE_ATM, SMALL_MOLE_FRACTION, ThermoPhase,
    Transport, multicomponent_from_binary,
};
use enum_dispatch::enum_dispatch;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// thermal diffusion ratio factor of the simplified Soret model
const THERMAL_DIFFUSION_FACTOR: f64 = 0.29;

// Collision integral
// Hirschfelder. The Molecular Theory of Gases and Liquids
fn omega_22_calc(T: f64, e_k: f64, mu: f64, sigma_k: f64) -> f64 {
    let T1 = T / e_k;
    let a1 = 1.16145;
    let b1 = 0.14874;
    let c1 = 0.52487;
    let d1 = 0.77320;
    let e1 = 2.16178;
    let f1 = 2.43787;
    let delta = 1e-19 * mu.powi(2) / (2.0 * e_k * BOLTZMANN * sigma_k.powi(3));
    a1 / T1.powf(b1) + c1 / (d1 * T1).exp() + e1 / (f1 * T1).exp() + 0.2 * delta.powi(2) / T1
}

// collision integral for diffusion
fn omega_11_calc(T: f64, e_k: f64, mu: f64, sigma_k: f64) -> f64 {
    let a = 1.06036;
    let b = 0.15610;
    let c = 0.19300;
    let d = 0.47635;
    let e = 1.03587;
    let f = 1.52996;
    let g = 1.76474;
    let h = 3.89411;
    let T1 = T / e_k;
    let delta = 1e-19 * mu.powi(2) / (2.0 * e_k * BOLTZMANN * sigma_k.powi(3));
    a / T1.powf(b)
        + c / (d * T1).exp()
        + e / (f * T1).exp()
        + g / (h * T1).exp()
        + 0.19 * delta.powi(2) / T1
}

// Reid, Prausnitz, Sherwood. The properties of gases and liquids (p. 346)
// M in g/mol, result in Pa*s
fn visc(M: f64, T: f64, e_k: f64, sigma_k: f64, mu: f64) -> f64 {
    let omega_22 = omega_22_calc(T, e_k, mu, sigma_k);
    1e-7 * 26.69 * (M * T).sqrt() / (sigma_k.powi(2) * omega_22)
}

/// Lennard-Jones parameters of one species as they are stored in transport libraries.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TransportInput {
    #[serde(default)]
    pub Altname: Option<String>,
    /// Form of the molecule
    ///   Atom=0 Linear=1 Nonlinear=2
    pub Form: f64,
    ///  Lennard-Jones collision diameter in angstroms
    pub diam: f64,
    ///  dipole moment in Debye. Default: 0.0
    #[serde(default)]
    pub dipole: f64,
    ///  Polarizability in A^3. Default: 0.0
    #[serde(default)]
    pub polar: f64,
    ///  Number of rotational relaxation collisions at 298 K.  Dimensionless. Default: 0.0
    #[serde(default)]
    pub rot_relax: f64,
    /// Lennard-Jones well depth in Kelvin
    pub well_depth: f64,
}

impl TransportInput {
    pub fn lennard_jones(form: f64, diam: f64, well_depth: f64) -> Self {
        Self {
            Altname: None,
            Form: form,
            diam,
            dipole: 0.0,
            polar: 0.0,
            rot_relax: 0.0,
            well_depth,
        }
    }

    pub fn with_dipole(mut self, dipole: f64) -> Self {
        self.dipole = dipole;
        self
    }
}

/// Kinetic-theory transport of an ideal-gas mixture.
#[derive(Debug, Clone)]
pub struct LennardJonesTransport {
    thermo: IdealGasMix,
    params: Vec<TransportInput>,
}

impl LennardJonesTransport {
    pub fn new(
        thermo: IdealGasMix,
        params: &HashMap<String, TransportInput>,
    ) -> Result<Self, GasError> {
        let mut ordered = Vec::with_capacity(thermo.n_species());
        for k in 0..thermo.n_species() {
            let name = thermo.species_name(k);
            let p = params
                .get(name)
                .ok_or_else(|| GasError::UnknownSpecies(format!("{} (no transport data)", name)))?;
            if !(p.diam > 0.0) || !(p.well_depth > 0.0) {
                return Err(GasError::ParseError(format!(
                    "species {}: Lennard-Jones parameters must be positive",
                    name
                )));
            }
            ordered.push(p.clone());
        }
        Ok(Self {
            thermo,
            params: ordered,
        })
    }

    /// takes serde Value (map species name -> parameters)
    pub fn from_serde(thermo: IdealGasMix, data: serde_json::Value) -> Result<Self, GasError> {
        let params: HashMap<String, TransportInput> = serde_json::from_value(data)?;
        Self::new(thermo, &params)
    }

    /// pure-species viscosities, Pa*s
    pub fn species_viscosities(&self, t: f64) -> Vec<f64> {
        self.params
            .iter()
            .zip(self.thermo.molecular_weights())
            .map(|(p, &w)| visc(w, t, p.well_depth, p.diam, p.dipole))
            .collect()
    }

    /// binary diffusion coefficients 𝒟_ij at temperature `t` and pressure `p`, m²/s
    pub fn binary_diff_coeffs(&self, t: f64, p: f64) -> DMatrix<f64> {
        let n = self.params.len();
        let w = self.thermo.molecular_weights();
        let p_atm = p / ONE_ATM;
        DMatrix::from_fn(n, n, |i, j| {
            let (a, b) = (&self.params[i], &self.params[j]);
            let sigma = 0.5 * (a.diam + b.diam);
            let e_k = (a.well_depth * b.well_depth).sqrt();
            let mu = (a.dipole * b.dipole).sqrt();
            let omega_11 = omega_11_calc(t, e_k, mu, sigma);
            // cm²/s -> m²/s
            1e-4 * 0.0018583 * (t.powi(3) * (1.0 / w[i] + 1.0 / w[j])).sqrt()
                / (p_atm * sigma.powi(2) * omega_11)
        })
    }

    fn clipped_mole_fractions(&self, state: &GasState) -> Vec<f64> {
        let mut x = vec![0.0; self.thermo.n_species()];
        self.thermo.mole_fractions(state, &mut x);
        x.iter().map(|xk| xk.max(0.0)).collect()
    }
}

impl Transport for LennardJonesTransport {
    fn model_name(&self) -> &str {
        "Lennard-Jones"
    }

    fn viscosity(&self, state: &GasState) -> Result<f64, GasError> {
        state.validate(self.thermo.n_species())?;
        let t = state.temperature;
        let mu = self.species_viscosities(t);
        let w = self.thermo.molecular_weights();
        let x = self.clipped_mole_fractions(state);
        let n = mu.len();
        let mut mix = 0.0;
        // Wilke mixing rule
        for i in 0..n {
            let mut denom = 0.0;
            for j in 0..n {
                let phi = (1.0 + (mu[i] / mu[j]).sqrt() * (w[j] / w[i]).powf(0.25)).powi(2)
                    / (8.0 * (1.0 + w[i] / w[j])).sqrt();
                denom += x[j] * phi;
            }
            if denom > 0.0 {
                mix += x[i] * mu[i] / denom;
            }
        }
        Ok(mix)
    }

    fn thermal_conductivity(&self, state: &GasState) -> Result<f64, GasError> {
        state.validate(self.thermo.n_species())?;
        let t = state.temperature;
        let mu = self.species_viscosities(t);
        let w = self.thermo.molecular_weights();
        let mut cp_r = vec![0.0; mu.len()];
        self.thermo.cp_r_ref(t, &mut cp_r);
        let x = self.clipped_mole_fractions(state);
        let mut sum1 = 0.0;
        let mut sum2 = 0.0;
        for k in 0..mu.len() {
            // modified Eucken relation
            let lambda_k = mu[k] / w[k] * GAS_CONSTANT * (cp_r[k] + 1.25);
            sum1 += x[k] * lambda_k;
            sum2 += x[k] / lambda_k;
        }
        Ok(0.5 * (sum1 + 1.0 / sum2))
    }

    fn mix_diff_coeffs(&self, state: &GasState, out: &mut [f64]) -> Result<(), GasError> {
        state.validate(self.thermo.n_species())?;
        let d = self.binary_diff_coeffs(state.temperature, state.pressure);
        let n = out.len();
        if n == 1 {
            out[0] = d[(0, 0)];
            return Ok(());
        }
        let x = self.clipped_mole_fractions(state);
        let w = self.thermo.molecular_weights();
        let wtm = self.thermo.mean_molecular_weight(state);
        for k in 0..n {
            let sum: f64 = (0..n).filter(|&j| j != k).map(|j| x[j] / d[(k, j)]).sum();
            out[k] = if sum > 0.0 {
                (wtm - x[k] * w[k]) / (wtm * sum)
            } else {
                d[(k, k)]
            };
        }
        Ok(())
    }

    fn multi_diff_coeffs(&self, state: &GasState) -> Result<DMatrix<f64>, GasError> {
        state.validate(self.thermo.n_species())?;
        let binary = self.binary_diff_coeffs(state.temperature, state.pressure);
        let x = self.clipped_mole_fractions(state);
        multicomponent_from_binary(
            state.temperature,
            &x,
            self.thermo.molecular_weights(),
            &binary,
        )
    }

    fn thermal_diff_coeffs(&self, state: &GasState, out: &mut [f64]) -> Result<(), GasError> {
        state.validate(self.thermo.n_species())?;
        let mut dmix = vec![0.0; out.len()];
        self.mix_diff_coeffs(state, &mut dmix)?;
        let rho = self.thermo.density(state);
        let wtm = self.thermo.mean_molecular_weight(state);
        let w = self.thermo.molecular_weights();
        let y = state.mass_fractions;
        for k in 0..out.len() {
            let yk = y[k].max(SMALL_MOLE_FRACTION);
            out[k] = rho * dmix[k] * yk * THERMAL_DIFFUSION_FACTOR * (w[k] - wtm) / wtm;
        }
        // thermal diffusion fluxes must carry no net mass
        let total: f64 = out.iter().sum();
        let ysum: f64 = y.iter().map(|yk| yk.max(0.0)).sum();
        if ysum > 0.0 {
            for k in 0..out.len() {
                out[k] -= y[k].max(0.0) / ysum * total;
            }
        }
        Ok(())
    }
}

/// Constant transport properties, one diffusivity for every species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantTransport {
    pub n_species: usize,
    /// Pa*s
    pub viscosity: f64,
    /// W/(m*K)
    pub conductivity: f64,
    /// m²/s
    pub diffusivity: f64,
}

impl ConstantTransport {
    pub fn new(n_species: usize, viscosity: f64, conductivity: f64, diffusivity: f64) -> Self {
        Self {
            n_species,
            viscosity,
            conductivity,
            diffusivity,
        }
    }
}

impl Transport for ConstantTransport {
    fn model_name(&self) -> &str {
        "constant"
    }
    fn viscosity(&self, _state: &GasState) -> Result<f64, GasError> {
        Ok(self.viscosity)
    }
    fn thermal_conductivity(&self, _state: &GasState) -> Result<f64, GasError> {
        Ok(self.conductivity)
    }
    fn mix_diff_coeffs(&self, _state: &GasState, out: &mut [f64]) -> Result<(), GasError> {
        out.iter_mut().for_each(|d| *d = self.diffusivity);
        Ok(())
    }
    /// every binary pair diffuses with the same coefficient, D_kk = 0
    fn multi_diff_coeffs(&self, _state: &GasState) -> Result<DMatrix<f64>, GasError> {
        let n = self.n_species;
        Ok(DMatrix::from_fn(n, n, |k, m| {
            if k == m { 0.0 } else { self.diffusivity }
        }))
    }
    fn thermal_diff_coeffs(&self, _state: &GasState, out: &mut [f64]) -> Result<(), GasError> {
        out.iter_mut().for_each(|d| *d = 0.0);
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////////////
// FACTORY METHODS  ////////////////////////////////////////////////////////////////////
#[derive(Debug, Clone)]
#[enum_dispatch(Transport)]
pub enum TransportModel {
    LennardJones(LennardJonesTransport),
    Constant(ConstantTransport),
}

pub enum TransportType {
    LennardJones {
        thermo: IdealGasMix,
        params: HashMap<String, TransportInput>,
    },
    Constant {
        n_species: usize,
        viscosity: f64,
        conductivity: f64,
        diffusivity: f64,
    },
}

pub fn create_transport_model(model: TransportType) -> Result<TransportModel, GasError> {
    match model {
        TransportType::LennardJones { thermo, params } => Ok(TransportModel::LennardJones(
            LennardJonesTransport::new(thermo, &params)?,
        )),
        TransportType::Constant {
            n_species,
            viscosity,
            conductivity,
            diffusivity,
        } => Ok(TransportModel::Constant(ConstantTransport::new(
            n_species,
            viscosity,
            conductivity,
            diffusivity,
        ))),
    }
}
