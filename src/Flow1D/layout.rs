//! # Solution layout
//!
//! Every grid point owns a contiguous block of `nv = 4 + nsp + nsoot` unknowns:
//!
//! | offset | component | name |
//! |--------|-----------|------|
//! | 0 | U, axial mass-weighted velocity term | `velocity` |
//! | 1 | V, radial strain rate | `spread_rate` |
//! | 2 | T, temperature | `T` |
//! | 3 | Λ, (1/r) dP/dr eigenvalue | `lambda` |
//! | 4 .. 4+nsp | Y_k, mass fractions | species names |
//! | 4+nsp .. nv | S_m, soot moments per unit mass | `S0`, `S1`, ... |
//!
//! The unknown `c` of point `j` lives at `c + nv*j` of the flat solution vector.

pub const OFFSET_U: usize = 0;
pub const OFFSET_V: usize = 1;
pub const OFFSET_T: usize = 2;
pub const OFFSET_L: usize = 3;
pub const OFFSET_Y: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Velocity,
    SpreadRate,
    Temperature,
    Lambda,
    Species(usize),
    Soot(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolutionLayout {
    pub n_species: usize,
    pub n_soot: usize,
    pub points: usize,
}

impl SolutionLayout {
    pub fn new(n_species: usize, n_soot: usize, points: usize) -> Self {
        Self {
            n_species,
            n_soot,
            points,
        }
    }

    /// unknowns per grid point
    pub fn n_components(&self) -> usize {
        OFFSET_Y + self.n_species + self.n_soot
    }

    /// length of the solution vector
    pub fn size(&self) -> usize {
        self.n_components() * self.points
    }

    pub fn offset(&self, c: Component) -> usize {
        match c {
            Component::Velocity => OFFSET_U,
            Component::SpreadRate => OFFSET_V,
            Component::Temperature => OFFSET_T,
            Component::Lambda => OFFSET_L,
            Component::Species(k) => {
                assert!(k < self.n_species, "species index {} out of range", k);
                OFFSET_Y + k
            }
            Component::Soot(m) => {
                assert!(m < self.n_soot, "soot moment index {} out of range", m);
                OFFSET_Y + self.n_species + m
            }
        }
    }

    /// Inverse of [`offset`](Self::offset).
    pub fn component(&self, n: usize) -> Component {
        assert!(
            n < self.n_components(),
            "component {} out of range (nv = {})",
            n,
            self.n_components()
        );
        match n {
            OFFSET_U => Component::Velocity,
            OFFSET_V => Component::SpreadRate,
            OFFSET_T => Component::Temperature,
            OFFSET_L => Component::Lambda,
            _ if n < OFFSET_Y + self.n_species => Component::Species(n - OFFSET_Y),
            _ => Component::Soot(n - OFFSET_Y - self.n_species),
        }
    }

    /// flat position of component offset `n` at point `j`
    #[inline]
    pub fn index(&self, n: usize, j: usize) -> usize {
        assert!(
            n < self.n_components() && j < self.points,
            "index ({}, {}) outside of {} components x {} points",
            n,
            j,
            self.n_components(),
            self.points
        );
        n + self.n_components() * j
    }

    #[inline]
    pub fn index_of(&self, c: Component, j: usize) -> usize {
        self.index(self.offset(c), j)
    }

    /// range of the species block of point `j`
    pub fn species_range(&self, j: usize) -> std::ops::Range<usize> {
        let start = self.index(OFFSET_Y, j);
        start..start + self.n_species
    }
}
