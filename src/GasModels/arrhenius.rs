//! # Homogeneous kinetics with modified Arrhenius rate constants
//!
//! Every reaction is written as a string equation, e.g. `"CH4 + 2 O2 => CO2 + 2 H2O"`,
//! and carries the parameters `[A, n, E]` of `k = A T^n exp(-E / (R T))` with
//! `E` in J/mol (the same convention the kinetic libraries use) and `A` in
//! kmol-m³-s units. Reversible reactions (`<=>` or `=`) need explicit reverse parameters.
//!
//! Reaction orders default to the reactant stoichiometric coefficients and may be
//! overridden per species (global mechanisms such as one-step methane oxidation use
//! fractional orders).
use super::gas_api::{GAS_CONSTANT, GasError, GasState, Kinetics, ThermoPhase};
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// J/(mol·K), activation energies are per mole
const R: f64 = 8.314462618;

/// `A T^n exp(-E/(R T))`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ElementaryStruct {
    pub Arrenius: Vec<f64>,
}

impl ElementaryStruct {
    pub fn new(Arrenius: Vec<f64>) -> Self {
        Self { Arrenius }
    }
    pub fn K_const(&self, Temp: f64) -> f64 {
        let A = self.Arrenius[0];
        let n = self.Arrenius[1];
        let E = self.Arrenius[2];
        A * Temp.powf(n) * f64::exp(-E / (Temp * R))
    }
}

/// Reaction record as it appears in a JSON mechanism.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReactionData {
    pub eq: String,
    #[serde(flatten)]
    pub forward: ElementaryStruct,
    #[serde(default)]
    pub reverse: Option<Vec<f64>>,
    #[serde(default)]
    pub orders: Option<HashMap<String, f64>>,
}

/// stoichiometry resolved against species indices
#[derive(Debug, Clone)]
struct CompiledReaction {
    reactants: Vec<(usize, f64)>,
    products: Vec<(usize, f64)>,
    forward_orders: Vec<(usize, f64)>,
    forward: ElementaryStruct,
    reverse: Option<ElementaryStruct>,
}

/// Splits an equation into reactant and product sides with stoichiometric
/// coefficients. Returns `(reactants, products, reversible)`.
pub fn parse_equation(
    eq: &str,
) -> Result<(Vec<(String, f64)>, Vec<(String, f64)>, bool), GasError> {
    let (lhs, rhs, reversible) = if let Some((l, r)) = eq.split_once("<=>") {
        (l, r, true)
    } else if let Some((l, r)) = eq.split_once("=>") {
        (l, r, false)
    } else if let Some((l, r)) = eq.split_once('=') {
        (l, r, true)
    } else {
        return Err(GasError::ParseError(format!("no arrow in equation '{}'", eq)));
    };
    let term = Regex::new(r"^\s*(\d+(?:\.\d*)?)?\s*\*?\s*([A-Za-z][A-Za-z0-9_()\-]*)\s*$")
        .map_err(|e| GasError::ParseError(e.to_string()))?;
    let side = |s: &str| -> Result<Vec<(String, f64)>, GasError> {
        let mut terms: Vec<(String, f64)> = Vec::new();
        for part in s.split(" + ") {
            let cap = term
                .captures(part)
                .ok_or_else(|| GasError::ParseError(format!("bad term '{}' in '{}'", part, eq)))?;
            let coeff = match cap.get(1) {
                Some(c) => c
                    .as_str()
                    .parse::<f64>()
                    .map_err(|e| GasError::ParseError(e.to_string()))?,
                None => 1.0,
            };
            let name = cap[2].to_string();
            if name == "M" || name.starts_with("(+") {
                return Err(GasError::UnsupportedReaction(eq.to_string()));
            }
            match terms.iter_mut().find(|(n, _)| *n == name) {
                Some((_, c)) => *c += coeff,
                None => terms.push((name, coeff)),
            }
        }
        Ok(terms)
    };
    Ok((side(lhs)?, side(rhs)?, reversible))
}

/// Mechanism of elementary/global reactions over the species of a thermo phase.
#[derive(Debug, Clone)]
pub struct ArrheniusKinetics {
    n_species: usize,
    molecular_weights: Vec<f64>,
    reactions: Vec<CompiledReaction>,
    pub reaction_equations: Vec<String>,
}

impl ArrheniusKinetics {
    pub fn new(thermo: &dyn ThermoPhase, reactions: Vec<ReactionData>) -> Result<Self, GasError> {
        let index = |name: &str| -> Result<usize, GasError> {
            thermo
                .species_index(name)
                .ok_or_else(|| GasError::UnknownSpecies(name.to_string()))
        };
        let mut compiled = Vec::with_capacity(reactions.len());
        let mut equations = Vec::with_capacity(reactions.len());
        for r in reactions {
            if r.forward.Arrenius.len() != 3 {
                return Err(GasError::ParseError(format!(
                    "reaction '{}' needs 3 Arrhenius parameters",
                    r.eq
                )));
            }
            let (lhs, rhs, reversible) = parse_equation(&r.eq)?;
            let reverse = match (reversible, &r.reverse) {
                (true, Some(p)) if p.len() == 3 => Some(ElementaryStruct::new(p.clone())),
                (true, _) => return Err(GasError::UnsupportedReaction(r.eq.clone())),
                (false, _) => None,
            };
            let reactants = lhs
                .iter()
                .map(|(n, c)| Ok((index(n)?, *c)))
                .collect::<Result<Vec<_>, GasError>>()?;
            let products = rhs
                .iter()
                .map(|(n, c)| Ok((index(n)?, *c)))
                .collect::<Result<Vec<_>, GasError>>()?;
            let forward_orders = match &r.orders {
                Some(orders) => orders
                    .iter()
                    .map(|(n, o)| Ok((index(n)?, *o)))
                    .collect::<Result<Vec<_>, GasError>>()?,
                None => reactants.clone(),
            };
            equations.push(r.eq.clone());
            compiled.push(CompiledReaction {
                reactants,
                products,
                forward_orders,
                forward: r.forward,
                reverse,
            });
        }
        info!(
            "kinetics: {} reactions over {} species",
            compiled.len(),
            thermo.n_species()
        );
        Ok(Self {
            n_species: thermo.n_species(),
            molecular_weights: thermo.molecular_weights().to_vec(),
            reactions: compiled,
            reaction_equations: equations,
        })
    }

    /// takes serde Value (array of reaction records) and builds the mechanism
    pub fn from_serde(thermo: &dyn ThermoPhase, data: serde_json::Value) -> Result<Self, GasError> {
        let reactions: Vec<ReactionData> = serde_json::from_value(data)?;
        Self::new(thermo, reactions)
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// molar concentrations C_k = ρ Y_k / W_k, kmol/m³; negative values are clipped
    fn concentrations(&self, state: &GasState) -> Vec<f64> {
        let sum: f64 = state
            .mass_fractions
            .iter()
            .zip(&self.molecular_weights)
            .map(|(y, w)| y / w)
            .sum();
        let c_total = state.pressure / (GAS_CONSTANT * state.temperature);
        state
            .mass_fractions
            .iter()
            .zip(&self.molecular_weights)
            .map(|(y, w)| (c_total * (y / w) / sum).max(0.0))
            .collect()
    }

    /// rates of progress of every reaction, kmol/(m³·s)
    pub fn rates_of_progress(&self, state: &GasState) -> Result<Vec<f64>, GasError> {
        state.validate(self.n_species)?;
        let c = self.concentrations(state);
        let t = state.temperature;
        Ok(self
            .reactions
            .iter()
            .map(|r| {
                let fwd = r.forward.K_const(t)
                    * r.forward_orders
                        .iter()
                        .map(|&(k, o)| c[k].powf(o))
                        .product::<f64>();
                let rev = match &r.reverse {
                    Some(rev) => {
                        rev.K_const(t)
                            * r.products
                                .iter()
                                .map(|&(k, nu)| c[k].powf(nu))
                                .product::<f64>()
                    }
                    None => 0.0,
                };
                fwd - rev
            })
            .collect())
    }
}

impl Kinetics for ArrheniusKinetics {
    fn net_production_rates(&self, state: &GasState, out: &mut [f64]) -> Result<(), GasError> {
        let q = self.rates_of_progress(state)?;
        out.iter_mut().for_each(|w| *w = 0.0);
        for (r, qr) in self.reactions.iter().zip(q) {
            for &(k, nu) in &r.reactants {
                out[k] -= nu * qr;
            }
            for &(k, nu) in &r.products {
                out[k] += nu * qr;
            }
        }
        Ok(())
    }
}

/// No chemistry: every production rate is zero.
#[derive(Debug, Clone, Default)]
pub struct InertKinetics;

impl Kinetics for InertKinetics {
    fn net_production_rates(&self, _state: &GasState, out: &mut [f64]) -> Result<(), GasError> {
        out.iter_mut().for_each(|w| *w = 0.0);
        Ok(())
    }
}
