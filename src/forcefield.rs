//! Lennard-Jones force-field tables.

use crate::error::GcmcError;
use nalgebra::DMatrix;
use std::collections::HashMap;

/// Per-species Lennard-Jones parameters (σ in Å, ε in K).
#[derive(Debug, Clone, PartialEq)]
pub struct LjParameters {
    pub species: String,
    pub sigma: f64,
    pub epsilon: f64,
}

/// Pairwise Lennard-Jones table with a spherical cutoff and a hard-overlap guard.
#[derive(Debug, Clone)]
pub struct ForceField {
    pub name: String,
    species: Vec<String>,
    index: HashMap<String, usize>,
    sigma_squared: DMatrix<f64>,
    epsilon: DMatrix<f64>,
    cutoff_radius_squared: f64,
    overlap_radius_squared: f64,
}

impl ForceField {
    /// Build the pair table from per-species parameters using Lorentz-Berthelot mixing.
    pub fn new(
        name: impl Into<String>,
        params: &[LjParameters],
        cutoff_radius: f64,
        overlap_radius: f64,
    ) -> Result<Self, GcmcError> {
        if cutoff_radius <= 0.0 {
            return Err(GcmcError::InvalidSettings(format!(
                "cutoff radius must be positive, got {}",
                cutoff_radius
            )));
        }
        if overlap_radius < 0.0 || overlap_radius >= cutoff_radius {
            return Err(GcmcError::InvalidSettings(format!(
                "overlap radius {} must lie in [0, cutoff)",
                overlap_radius
            )));
        }

        let n = params.len();
        let mut index = HashMap::with_capacity(n);
        for (i, p) in params.iter().enumerate() {
            if index.insert(p.species.clone(), i).is_some() {
                return Err(GcmcError::InvalidSettings(format!(
                    "species '{}' listed twice in force field",
                    p.species
                )));
            }
        }

        let sigma_squared = DMatrix::from_fn(n, n, |i, j| {
            let s = 0.5 * (params[i].sigma + params[j].sigma);
            s * s
        });
        let epsilon = DMatrix::from_fn(n, n, |i, j| (params[i].epsilon * params[j].epsilon).sqrt());

        Ok(Self {
            name: name.into(),
            species: params.iter().map(|p| p.species.clone()).collect(),
            index,
            sigma_squared,
            epsilon,
            cutoff_radius_squared: cutoff_radius * cutoff_radius,
            overlap_radius_squared: overlap_radius * overlap_radius,
        })
    }

    /// Index of `species` in the pair tables.
    pub fn species_index(&self, species: &str) -> Result<usize, GcmcError> {
        self.index
            .get(species)
            .copied()
            .ok_or_else(|| GcmcError::UnknownSpecies {
                species: species.to_string(),
                forcefield: self.name.clone(),
            })
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn species_name(&self, index: usize) -> &str {
        &self.species[index]
    }

    #[inline]
    pub fn sigma_squared(&self, a: usize, b: usize) -> f64 {
        self.sigma_squared[(a, b)]
    }

    #[inline]
    pub fn epsilon(&self, a: usize, b: usize) -> f64 {
        self.epsilon[(a, b)]
    }

    #[inline]
    pub fn cutoff_radius_squared(&self) -> f64 {
        self.cutoff_radius_squared
    }

    pub fn cutoff_radius(&self) -> f64 {
        self.cutoff_radius_squared.sqrt()
    }

    #[inline]
    pub fn overlap_radius_squared(&self) -> f64 {
        self.overlap_radius_squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> Vec<LjParameters> {
        vec![
            LjParameters { species: "C".into(), sigma: 3.4, epsilon: 52.8 },
            LjParameters { species: "O".into(), sigma: 3.0, epsilon: 79.0 },
        ]
    }

    #[test]
    fn test_lorentz_berthelot_mixing() {
        let ff = ForceField::new("toy", &params(), 12.5, 0.1).unwrap();
        let c = ff.species_index("C").unwrap();
        let o = ff.species_index("O").unwrap();
        assert_relative_eq!(ff.sigma_squared(c, o), 3.2 * 3.2, epsilon = 1e-12);
        assert_relative_eq!(ff.epsilon(c, o), (52.8f64 * 79.0).sqrt(), epsilon = 1e-12);
        assert_eq!(ff.sigma_squared(c, o), ff.sigma_squared(o, c));
        assert_relative_eq!(ff.cutoff_radius_squared(), 156.25, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_species() {
        let ff = ForceField::new("toy", &params(), 12.5, 0.1).unwrap();
        assert!(matches!(
            ff.species_index("Zn"),
            Err(GcmcError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn test_invalid_radii_rejected() {
        assert!(ForceField::new("toy", &params(), -1.0, 0.1).is_err());
        assert!(ForceField::new("toy", &params(), 5.0, 6.0).is_err());
    }
}
