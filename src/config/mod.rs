//! Configuration management for GCMC runs
//!
//! The YAML file describes the framework, force field, adsorbate, thermodynamic
//! conditions and Markov chain parameters. Optional fields are filled in by
//! `with_defaults`, and the `build_*` methods turn the configuration into the
//! typed objects the simulation consumes.

mod args;

pub use args::Args;

use crate::error::GcmcError;
use crate::forcefield::{ForceField, LjParameters};
use crate::framework::{Framework, FrameworkAtom};
use crate::gcmc::GcmcSettings;
use crate::geometry::SimulationBox;
use crate::molecule::{Molecule, PointCharge, VdwSite};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub framework: FrameworkConfig,
    pub forcefield: ForceFieldConfig,
    pub adsorbate: AdsorbateConfig,
    /// Atomic masses (amu) by species
    #[serde(default)]
    pub atomic_masses: HashMap<String, f64>,
    pub conditions: ConditionsConfig,
    #[serde(default)]
    pub markov: MarkovParams,
}

/// Host crystal
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameworkConfig {
    pub name: String,
    pub cell: CellConfig,
    /// Atoms in fractional coordinates
    #[serde(default)]
    pub atoms: Vec<AtomConfig>,
}

/// Unit cell definition
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum CellConfig {
    /// Lengths in Å and angles in degrees
    #[serde(rename = "lattice_parameters")]
    LatticeParameters {
        a: f64,
        b: f64,
        c: f64,
        #[serde(default = "default_angle")]
        alpha: f64,
        #[serde(default = "default_angle")]
        beta: f64,
        #[serde(default = "default_angle")]
        gamma: f64,
    },
    /// Cell vectors a, b, c in Å
    #[serde(rename = "vectors")]
    Vectors { vectors: [[f64; 3]; 3] },
}

/// Atom position configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AtomConfig {
    pub species: String,
    pub coords: [f64; 3],
}

/// Lennard-Jones force field
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForceFieldConfig {
    pub name: String,
    /// Cutoff radius in Å
    pub cutoff: Option<f64>,
    /// Pairs closer than this (Å) are treated as an infinite-energy overlap
    pub overlap_radius: Option<f64>,
    pub atoms: Vec<LjAtomConfig>,
}

/// Per-species Lennard-Jones parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LjAtomConfig {
    pub species: String,
    /// σ in Å
    pub sigma: f64,
    /// ε/k_B in K
    pub epsilon: f64,
}

/// Rigid adsorbate geometry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdsorbateConfig {
    pub species: String,
    /// Cartesian site positions in Å
    pub sites: Vec<AtomConfig>,
    #[serde(default)]
    pub charges: Vec<ChargeConfig>,
}

/// Point charge of the adsorbate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChargeConfig {
    pub charge: f64,
    pub coords: [f64; 3],
}

/// Thermodynamic state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConditionsConfig {
    /// Temperature in K
    pub temperature: f64,
    /// Fugacities in Pa; one chain is run per value
    pub fugacities: Vec<f64>,
}

/// Markov chain parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkovParams {
    pub n_burn_cycles: Option<usize>,
    pub n_sample_cycles: Option<usize>,
    pub sample_frequency: Option<usize>,
    pub max_displacement: Option<f64>,
    pub energy_tolerance: Option<f64>,
    pub seed: Option<u64>,
    pub retain_molecules: Option<bool>,
}

impl Default for MarkovParams {
    fn default() -> Self {
        let settings = GcmcSettings::default();
        MarkovParams {
            n_burn_cycles: Some(settings.n_burn_cycles),
            n_sample_cycles: Some(settings.n_sample_cycles),
            sample_frequency: Some(settings.sample_frequency),
            max_displacement: Some(settings.max_displacement),
            energy_tolerance: Some(settings.energy_tolerance),
            seed: None,
            retain_molecules: Some(false),
        }
    }
}

impl MarkovParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.n_burn_cycles.is_none() {
            self.n_burn_cycles = defaults.n_burn_cycles;
        }
        if self.n_sample_cycles.is_none() {
            self.n_sample_cycles = defaults.n_sample_cycles;
        }
        if self.sample_frequency.is_none() {
            self.sample_frequency = defaults.sample_frequency;
        }
        if self.max_displacement.is_none() {
            self.max_displacement = defaults.max_displacement;
        }
        if self.energy_tolerance.is_none() {
            self.energy_tolerance = defaults.energy_tolerance;
        }
        if self.retain_molecules.is_none() {
            self.retain_molecules = defaults.retain_molecules;
        }
        self
    }
}

fn default_angle() -> f64 {
    90.0
}

const DEFAULT_CUTOFF: f64 = 12.5;
const DEFAULT_OVERLAP_RADIUS: f64 = 0.1;

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.markov = self.markov.with_defaults();
        if self.forcefield.cutoff.is_none() {
            self.forcefield.cutoff = Some(DEFAULT_CUTOFF);
        }
        if self.forcefield.overlap_radius.is_none() {
            self.forcefield.overlap_radius = Some(DEFAULT_OVERLAP_RADIUS);
        }
        self
    }

    /// Chain settings from the `markov` section.
    pub fn settings(&self) -> GcmcSettings {
        let defaults = GcmcSettings::default();
        let m = &self.markov;
        GcmcSettings {
            n_burn_cycles: m.n_burn_cycles.unwrap_or(defaults.n_burn_cycles),
            n_sample_cycles: m.n_sample_cycles.unwrap_or(defaults.n_sample_cycles),
            sample_frequency: m.sample_frequency.unwrap_or(defaults.sample_frequency),
            max_displacement: m.max_displacement.unwrap_or(defaults.max_displacement),
            energy_tolerance: m.energy_tolerance.unwrap_or(defaults.energy_tolerance),
            seed: m.seed,
            retain_molecules: m.retain_molecules.unwrap_or(defaults.retain_molecules),
            ..defaults
        }
    }

    pub fn build_forcefield(&self) -> Result<ForceField, GcmcError> {
        let ff = &self.forcefield;
        let params: Vec<LjParameters> = ff
            .atoms
            .iter()
            .map(|a| LjParameters {
                species: a.species.clone(),
                sigma: a.sigma,
                epsilon: a.epsilon,
            })
            .collect();
        ForceField::new(
            ff.name.clone(),
            &params,
            ff.cutoff.unwrap_or(DEFAULT_CUTOFF),
            ff.overlap_radius.unwrap_or(DEFAULT_OVERLAP_RADIUS),
        )
    }

    pub fn build_framework(&self) -> Result<Framework, GcmcError> {
        let cfg = &self.framework;
        let cell = match &cfg.cell {
            CellConfig::LatticeParameters {
                a,
                b,
                c,
                alpha,
                beta,
                gamma,
            } => SimulationBox::from_lattice_parameters(*a, *b, *c, *alpha, *beta, *gamma),
            CellConfig::Vectors { vectors } => {
                let columns: Vec<Vector3<f64>> =
                    vectors.iter().map(|v| Vector3::from(*v)).collect();
                SimulationBox::from_matrix(Matrix3::from_columns(&columns))
            }
        }
        .ok_or_else(|| {
            GcmcError::InvalidSettings(format!("degenerate unit cell for framework '{}'", cfg.name))
        })?;

        let atoms = cfg
            .atoms
            .iter()
            .map(|a| FrameworkAtom {
                species: a.species.clone(),
                frac: Vector3::from(a.coords),
            })
            .collect();
        Framework::new(cfg.name.clone(), cell, atoms, &self.atomic_masses)
    }

    /// The centred adsorbate template with species resolved against `forcefield`.
    pub fn build_template(&self, forcefield: &ForceField) -> Result<Molecule, GcmcError> {
        let cfg = &self.adsorbate;
        let sites = cfg
            .sites
            .iter()
            .map(|s| {
                Ok(VdwSite {
                    species: forcefield.species_index(&s.species)?,
                    position: Vector3::from(s.coords),
                })
            })
            .collect::<Result<Vec<_>, GcmcError>>()?;
        let charges = cfg
            .charges
            .iter()
            .map(|c| PointCharge {
                charge: c.charge,
                position: Vector3::from(c.coords),
            })
            .collect();
        let masses: Vec<f64> = cfg
            .sites
            .iter()
            .filter_map(|s| self.atomic_masses.get(&s.species).copied())
            .collect();
        Ok(Molecule::template(cfg.species.clone(), sites, charges, &masses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const YAML: &str = r#"
framework:
  name: toy-cubic
  cell:
    type: lattice_parameters
    a: 10.0
    b: 10.0
    c: 10.0
  atoms:
    - species: C
      coords: [0.0, 0.0, 0.0]
forcefield:
  name: toy-ff
  cutoff: 8.0
  atoms:
    - { species: C, sigma: 3.4, epsilon: 28.0 }
    - { species: O_co2, sigma: 3.05, epsilon: 79.0 }
    - { species: C_co2, sigma: 2.8, epsilon: 27.0 }
atomic_masses:
  C: 12.0
  O_co2: 16.0
  C_co2: 12.0
adsorbate:
  species: CO2
  sites:
    - { species: O_co2, coords: [-1.16, 0.0, 0.0] }
    - { species: C_co2, coords: [0.0, 0.0, 0.0] }
    - { species: O_co2, coords: [1.16, 0.0, 0.0] }
conditions:
  temperature: 298.0
  fugacities: [1.0e4, 1.0e5]
markov:
  n_burn_cycles: 10
  seed: 42
"#;

    fn config() -> Config {
        serde_yml::from_str::<Config>(YAML).unwrap().with_defaults()
    }

    #[test]
    fn test_defaults_applied() {
        let c = config();
        assert_eq!(c.forcefield.cutoff, Some(8.0));
        assert_eq!(c.forcefield.overlap_radius, Some(DEFAULT_OVERLAP_RADIUS));
        let s = c.settings();
        assert_eq!(s.n_burn_cycles, 10);
        assert_eq!(s.n_sample_cycles, GcmcSettings::default().n_sample_cycles);
        assert_eq!(s.seed, Some(42));
        assert_eq!(s.min_steps_per_cycle, 20);
    }

    #[test]
    fn test_build_domain_objects() {
        let c = config();
        let ff = c.build_forcefield().unwrap();
        let framework = c.build_framework().unwrap();
        let template = c.build_template(&ff).unwrap();

        assert_relative_eq!(framework.unit_cell.volume(), 1000.0, epsilon = 1e-9);
        assert_relative_eq!(framework.molar_mass(), 12.0);
        assert_eq!(template.sites.len(), 3);
        assert_eq!(template.sites[0].species, ff.species_index("O_co2").unwrap());
        assert_relative_eq!(template.center_of_mass, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_vectors_cell() {
        let yaml = YAML.replace(
            "    type: lattice_parameters\n    a: 10.0\n    b: 10.0\n    c: 10.0\n",
            "    type: vectors\n    vectors: [[10.0, 0.0, 0.0], [0.0, 12.0, 0.0], [0.0, 0.0, 14.0]]\n",
        );
        let c = serde_yml::from_str::<Config>(&yaml).unwrap().with_defaults();
        let framework = c.build_framework().unwrap();
        assert_relative_eq!(framework.unit_cell.volume(), 1680.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_adsorbate_species() {
        let yaml = YAML.replace("species: C_co2, coords", "species: N2, coords");
        let c = serde_yml::from_str::<Config>(&yaml).unwrap();
        let ff = c.build_forcefield().unwrap();
        assert!(matches!(
            c.build_template(&ff),
            Err(GcmcError::UnknownSpecies { .. })
        ));
    }
}
