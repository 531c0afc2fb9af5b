//! # Boundary excess species
//!
//! At each boundary one species equation is replaced by the closure
//! `Y_excess = 1 − Σ(other Y)`. The excess species is the most abundant one
//! (lowest index on ties) unless a fixed species is configured. The choice is
//! refreshed only on full residual evaluations so that Jacobian columns see a stable
//! row structure.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExcessSpeciesPolicy {
    #[default]
    LargestMassFraction,
    Fixed(usize),
}

/// index of the first largest entry
pub fn largest_mass_fraction(y: &[f64]) -> usize {
    let mut kmax = 0;
    for (k, &yk) in y.iter().enumerate() {
        if yk > y[kmax] {
            kmax = k;
        }
    }
    kmax
}

/// Value the excess species must take for the mass fractions to sum to one.
pub fn excess_fraction(y: &[f64], k_excess: usize) -> f64 {
    let others: f64 = y
        .iter()
        .enumerate()
        .filter(|&(k, _)| k != k_excess)
        .map(|(_, yk)| yk)
        .sum();
    1.0 - others
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcessSpecies {
    pub policy: ExcessSpeciesPolicy,
    pub left: usize,
    pub right: usize,
}

impl ExcessSpecies {
    pub fn new(policy: ExcessSpeciesPolicy) -> Self {
        let k = match policy {
            ExcessSpeciesPolicy::Fixed(k) => k,
            ExcessSpeciesPolicy::LargestMassFraction => 0,
        };
        Self {
            policy,
            left: k,
            right: k,
        }
    }

    pub fn update(&mut self, y_left: &[f64], y_right: &[f64]) {
        match self.policy {
            ExcessSpeciesPolicy::LargestMassFraction => {
                self.left = largest_mass_fraction(y_left);
                self.right = largest_mass_fraction(y_right);
            }
            ExcessSpeciesPolicy::Fixed(k) => {
                self.left = k;
                self.right = k;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_largest_with_ties() {
        assert_eq!(largest_mass_fraction(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(largest_mass_fraction(&[0.4, 0.2, 0.4]), 0);
        assert_eq!(largest_mass_fraction(&[0.0, 0.5, 0.5]), 1);
    }

    #[test]
    fn test_excess_closure_sums_to_one() {
        let y = [0.05, 0.2, 0.7, 0.049];
        let k = largest_mass_fraction(&y);
        let excess = excess_fraction(&y, k);
        let total: f64 = y
            .iter()
            .enumerate()
            .map(|(i, &yi)| if i == k { excess } else { yi })
            .sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_policy() {
        let mut ex = ExcessSpecies::new(ExcessSpeciesPolicy::Fixed(2));
        ex.update(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_eq!((ex.left, ex.right), (2, 2));
        let mut ex = ExcessSpecies::new(ExcessSpeciesPolicy::default());
        ex.update(&[1.0, 0.0, 0.0], &[0.0, 0.3, 0.7]);
        assert_eq!((ex.left, ex.right), (0, 2));
    }
}
