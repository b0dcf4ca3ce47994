//! Rigid adsorbate molecules.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A Lennard-Jones interaction site. `species` indexes the force field's atom types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VdwSite {
    pub species: usize,
    pub position: Vector3<f64>,
}

/// A point charge. Carried with the molecule but not used by the vdW evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCharge {
    pub charge: f64,
    pub position: Vector3<f64>,
}

/// A rigid molecule. Cloning gives an independent deep copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub species: String,
    pub sites: Vec<VdwSite>,
    pub charges: Vec<PointCharge>,
    pub center_of_mass: Vector3<f64>,
}

impl Molecule {
    /// Create a molecule with an explicitly known centre of mass.
    pub fn new(
        species: impl Into<String>,
        sites: Vec<VdwSite>,
        charges: Vec<PointCharge>,
        center_of_mass: Vector3<f64>,
    ) -> Self {
        Self {
            species: species.into(),
            sites,
            charges,
            center_of_mass,
        }
    }

    /// Build a template centred on the origin.
    ///
    /// `site_masses` weights the vdW sites when locating the centre of mass; an
    /// empty slice (or one summing to zero) falls back to the geometric centre.
    pub fn template(
        species: impl Into<String>,
        sites: Vec<VdwSite>,
        charges: Vec<PointCharge>,
        site_masses: &[f64],
    ) -> Self {
        let total_mass: f64 = site_masses.iter().sum();
        let com = if site_masses.len() == sites.len() && total_mass > 0.0 {
            sites
                .iter()
                .zip(site_masses)
                .fold(Vector3::zeros(), |acc, (s, &m)| acc + s.position * m)
                / total_mass
        } else if !sites.is_empty() {
            sites
                .iter()
                .fold(Vector3::zeros(), |acc, s| acc + s.position)
                / sites.len() as f64
        } else {
            Vector3::zeros()
        };

        let mut molecule = Self::new(species, sites, charges, com);
        molecule.translate_to(&Vector3::zeros());
        molecule
    }

    /// Total number of interaction centres (vdW sites and point charges).
    pub fn n_sites(&self) -> usize {
        self.sites.len() + self.charges.len()
    }

    /// Rigidly shift every site, charge and the centre of mass.
    pub fn translate_by(&mut self, dx: &Vector3<f64>) {
        for site in &mut self.sites {
            site.position += dx;
        }
        for charge in &mut self.charges {
            charge.position += dx;
        }
        self.center_of_mass += dx;
    }

    /// Rigidly move the molecule so its centre of mass sits at `x`.
    pub fn translate_to(&mut self, x: &Vector3<f64>) {
        let dx = x - self.center_of_mass;
        self.translate_by(&dx);
    }

    /// Rotate about the centre of mass.
    pub fn rotate(&mut self, rotation: &UnitQuaternion<f64>) {
        let com = self.center_of_mass;
        for site in &mut self.sites {
            site.position = com + rotation * (site.position - com);
        }
        for charge in &mut self.charges {
            charge.position = com + rotation * (charge.position - com);
        }
    }

    /// Apply a rotation drawn uniformly from SO(3).
    pub fn rotate_randomly<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let rotation = random_rotation(rng);
        self.rotate(&rotation);
    }
}

/// Uniformly distributed unit quaternion (Shoemake's subgroup algorithm).
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> UnitQuaternion<f64> {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen();
    let u3: f64 = rng.gen();
    let (s1, s2) = ((1.0 - u1).sqrt(), u1.sqrt());
    let (t2, t3) = (2.0 * PI * u2, 2.0 * PI * u3);
    UnitQuaternion::from_quaternion(Quaternion::new(
        s2 * t3.cos(),
        s1 * t2.sin(),
        s1 * t2.cos(),
        s2 * t3.sin(),
    ))
}
