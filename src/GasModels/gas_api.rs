//! # Gas-phase interfaces
//!
//! The flow kernel never owns a mutable "current gas state". Every thermodynamic,
//! kinetic or transport query receives an immutable [`GasState`] snapshot
//! (temperature, pressure and a borrowed slice of mass fractions), so properties of
//! different grid points can be evaluated independently of each other.
//!
//! | Trait | Provides |
//! |-------|----------|
//! | [`ThermoPhase`] | species names, molecular weights, ρ, W̄, c_p, h/RT, c_p/R |
//! | [`Kinetics`] | net molar production rates ω_k |
//! | [`Transport`] | μ, λ, mixture-averaged and multicomponent diffusion, thermal diffusion |
//!
//! Units are SI with kmol: molecular weights in kg/kmol, ω_k in kmol/(m³·s).

use enum_dispatch::enum_dispatch;
use nalgebra::DMatrix;
use thiserror::Error;

/// Universal gas constant, J/(kmol·K)
pub const GAS_CONSTANT: f64 = 8314.462618;
/// One standard atmosphere, Pa
pub const ONE_ATM: f64 = 101325.0;
/// Stefan-Boltzmann constant, W/(m²·K⁴)
pub const STEFAN_BOLTZ: f64 = 5.670374419e-8;
/// Avogadro number, 1/kmol
pub const AVOGADRO: f64 = 6.02214076e26;
/// Boltzmann constant, J/K
pub const BOLTZMANN: f64 = 1.380649e-23;

/// smallest mole fraction used where a property model divides by X_k
pub const SMALL_MOLE_FRACTION: f64 = 1e-12;

/// Failures of the property models. They are never retried by the flow kernel.
#[derive(Debug, Error)]
pub enum GasError {
    #[error("Invalid temperature: {0} K")]
    InvalidTemperature(f64),
    #[error("Invalid pressure: {0} Pa")]
    InvalidPressure(f64),
    #[error("Expected {expected} species values, got {got}")]
    SpeciesCountMismatch { expected: usize, got: usize },
    #[error("Unknown species: {0}")]
    UnknownSpecies(String),
    #[error("No coefficients found for temperature {temperature} K. Valid range: {range}")]
    NoCoefficientsFound { temperature: f64, range: String },
    #[error("Multicomponent diffusion matrix is singular at T = {0} K")]
    SingularDiffusionMatrix(f64),
    #[error("Failed to parse: {0}")]
    ParseError(String),
    #[error("Unsupported reaction: {0}")]
    UnsupportedReaction(String),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Immutable snapshot of the local gas: what `setGas` used to push into a shared
/// thermo object.
#[derive(Debug, Clone, Copy)]
pub struct GasState<'a> {
    /// K
    pub temperature: f64,
    /// Pa
    pub pressure: f64,
    /// not necessarily normalized
    pub mass_fractions: &'a [f64],
}

impl<'a> GasState<'a> {
    pub fn new(temperature: f64, pressure: f64, mass_fractions: &'a [f64]) -> Self {
        Self {
            temperature,
            pressure,
            mass_fractions,
        }
    }

    pub fn validate(&self, n_species: usize) -> Result<(), GasError> {
        if !(self.temperature > 0.0) {
            return Err(GasError::InvalidTemperature(self.temperature));
        }
        if !(self.pressure > 0.0) {
            return Err(GasError::InvalidPressure(self.pressure));
        }
        if self.mass_fractions.len() != n_species {
            return Err(GasError::SpeciesCountMismatch {
                expected: n_species,
                got: self.mass_fractions.len(),
            });
        }
        Ok(())
    }
}

/// Thermodynamic properties of an ideal-gas mixture.
pub trait ThermoPhase {
    fn name(&self) -> &str {
        "gas"
    }
    fn n_species(&self) -> usize;
    fn species_name(&self, k: usize) -> &str;
    fn species_index(&self, name: &str) -> Option<usize> {
        (0..self.n_species()).find(|&k| self.species_name(k) == name)
    }
    /// kg/kmol
    fn molecular_weights(&self) -> &[f64];
    /// upper end of the validity range of the thermo data, K
    fn max_temp(&self) -> f64;
    /// reference-state enthalpies h_k/(R T) of every species
    fn enthalpy_rt_ref(&self, t: f64, out: &mut [f64]);
    /// reference-state heat capacities c_p,k/R of every species
    fn cp_r_ref(&self, t: f64, out: &mut [f64]);

    /// W̄ = 1 / Σ(Y_k / W_k), kg/kmol
    fn mean_molecular_weight(&self, state: &GasState) -> f64 {
        let sum: f64 = state
            .mass_fractions
            .iter()
            .zip(self.molecular_weights())
            .map(|(y, w)| y / w)
            .sum();
        1.0 / sum
    }

    /// ideal-gas density ρ = P W̄ / (R T), kg/m³
    fn density(&self, state: &GasState) -> f64 {
        state.pressure * self.mean_molecular_weight(state) / (GAS_CONSTANT * state.temperature)
    }

    /// J/(kg·K)
    fn cp_mass(&self, state: &GasState) -> f64 {
        let mut cp_r = vec![0.0; self.n_species()];
        self.cp_r_ref(state.temperature, &mut cp_r);
        state
            .mass_fractions
            .iter()
            .zip(self.molecular_weights())
            .zip(&cp_r)
            .map(|((y, w), c)| GAS_CONSTANT * c * y / w)
            .sum()
    }

    fn mole_fractions(&self, state: &GasState, out: &mut [f64]) {
        let wtm = self.mean_molecular_weight(state);
        for ((x, y), w) in out
            .iter_mut()
            .zip(state.mass_fractions)
            .zip(self.molecular_weights())
        {
            *x = wtm * y / w;
        }
    }

    /// Clamps negative mass fractions to zero and renormalizes in place. A vector
    /// with no positive entry is left untouched.
    fn normalize_mass_fractions(&self, y: &mut [f64]) {
        for yk in y.iter_mut() {
            if *yk < 0.0 {
                *yk = 0.0;
            }
        }
        let sum: f64 = y.iter().sum();
        if sum > 0.0 {
            for yk in y.iter_mut() {
                *yk /= sum;
            }
        }
    }
}

/// Homogeneous chemistry.
pub trait Kinetics {
    /// net production rates of every species, kmol/(m³·s)
    fn net_production_rates(&self, state: &GasState, out: &mut [f64]) -> Result<(), GasError>;
}

/// Transport properties of a gas mixture.
#[enum_dispatch]
pub trait Transport {
    fn model_name(&self) -> &str;
    /// Pa·s
    fn viscosity(&self, state: &GasState) -> Result<f64, GasError>;
    /// W/(m·K)
    fn thermal_conductivity(&self, state: &GasState) -> Result<f64, GasError>;
    /// mixture-averaged diffusion coefficients D_km, m²/s
    fn mix_diff_coeffs(&self, state: &GasState, out: &mut [f64]) -> Result<(), GasError>;
    /// Multicomponent diffusion coefficients D_km, m²/s, in the convention
    /// `j_k = ρ W_k / W̄² Σ_m W_m D_km ∇X_m`.
    fn multi_diff_coeffs(&self, state: &GasState) -> Result<DMatrix<f64>, GasError>;
    /// thermal diffusion coefficients D^T_k, kg/(m·s)
    fn thermal_diff_coeffs(&self, state: &GasState, out: &mut [f64]) -> Result<(), GasError>;
}

/// Multicomponent diffusion coefficients from a matrix of binary diffusivities.
///
/// Solves the Stefan-Maxwell system in the symmetric form
/// `D = (Δ + α y yᵀ)⁻¹ − (1/α) 1 1ᵀ` with `Δ_ii = Σ_{l≠i} X_i X_l / 𝒟_il`,
/// `Δ_ij = −X_i X_j / 𝒟_ij`, which gives `V_i = −Σ_j D_ij ∇X_j`, and converts the
/// result to the `j_k = ρ W_k / W̄² Σ_m W_m D_km ∇X_m` convention.
pub fn multicomponent_from_binary(
    temperature: f64,
    mole_fractions: &[f64],
    molecular_weights: &[f64],
    binary: &DMatrix<f64>,
) -> Result<DMatrix<f64>, GasError> {
    let n = mole_fractions.len();
    let x: Vec<f64> = mole_fractions
        .iter()
        .map(|&xk| xk.max(SMALL_MOLE_FRACTION))
        .collect();
    let sum_x: f64 = x.iter().sum();
    let x: Vec<f64> = x.iter().map(|xk| xk / sum_x).collect();
    let wtm: f64 = x.iter().zip(molecular_weights).map(|(xk, w)| xk * w).sum();
    let y: Vec<f64> = x
        .iter()
        .zip(molecular_weights)
        .map(|(xk, w)| xk * w / wtm)
        .collect();

    let mut delta = DMatrix::<f64>::zeros(n, n);
    let mut mean_d = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let dij = binary[(i, j)];
                if !(dij > 0.0) {
                    return Err(GasError::SingularDiffusionMatrix(temperature));
                }
                let term = x[i] * x[j] / dij;
                delta[(i, j)] = -term;
                delta[(i, i)] += term;
                mean_d += dij;
            }
        }
    }
    if n == 1 {
        return Ok(DMatrix::zeros(1, 1));
    }
    mean_d /= (n * (n - 1)) as f64;
    let alpha = 1.0 / mean_d;
    for i in 0..n {
        for j in 0..n {
            delta[(i, j)] += alpha * y[i] * y[j];
        }
    }
    let inverse = delta
        .try_inverse()
        .ok_or(GasError::SingularDiffusionMatrix(temperature))?;

    let mut d = DMatrix::<f64>::zeros(n, n);
    for k in 0..n {
        for m in 0..n {
            let dkm = inverse[(k, m)] - 1.0 / alpha;
            d[(k, m)] = -x[k] * wtm * dkm / molecular_weights[m];
        }
    }
    Ok(d)
}
