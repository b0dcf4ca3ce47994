//! Rigid host framework.

use crate::error::GcmcError;
use crate::forcefield::ForceField;
use crate::geometry::SimulationBox;
use nalgebra::Vector3;
use std::collections::HashMap;

/// One host atom, in fractional coordinates of the primitive cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkAtom {
    pub species: String,
    pub frac: Vector3<f64>,
}

/// A crystal read once and never modified during a simulation.
#[derive(Debug, Clone)]
pub struct Framework {
    pub name: String,
    pub unit_cell: SimulationBox,
    pub atoms: Vec<FrameworkAtom>,
    molar_mass: f64,
}

impl Framework {
    /// Create a framework; the molar mass is summed from `atomic_masses` (amu).
    pub fn new(
        name: impl Into<String>,
        unit_cell: SimulationBox,
        atoms: Vec<FrameworkAtom>,
        atomic_masses: &HashMap<String, f64>,
    ) -> Result<Self, GcmcError> {
        let molar_mass = atoms
            .iter()
            .map(|a| {
                atomic_masses
                    .get(&a.species)
                    .copied()
                    .ok_or_else(|| GcmcError::MissingAtomicMass(a.species.clone()))
            })
            .sum::<Result<f64, _>>()?;

        Ok(Self {
            name: name.into(),
            unit_cell,
            atoms,
            molar_mass,
        })
    }

    /// Mass of one unit cell in amu (g/mol).
    pub fn molar_mass(&self) -> f64 {
        self.molar_mass
    }

    /// Unit-cell replications needed so that every perpendicular width of the
    /// simulation box is at least twice the force-field cutoff.
    pub fn replication_factors_for(&self, forcefield: &ForceField) -> [usize; 3] {
        let widths = self.unit_cell.perpendicular_widths();
        let diameter = 2.0 * forcefield.cutoff_radius();
        let mut factors = [1; 3];
        for (k, factor) in factors.iter_mut().enumerate() {
            *factor = ((diameter / widths[k]).ceil() as usize).max(1);
        }
        factors
    }

    /// The simulation box built from `factors` copies of the unit cell.
    pub fn simulation_box(&self, factors: [usize; 3]) -> SimulationBox {
        self.unit_cell.replicate(factors)
    }

    /// Cartesian positions of every host atom in the replicated simulation box,
    /// paired with its force-field species index.
    pub fn replicated_atoms(
        &self,
        factors: [usize; 3],
        forcefield: &ForceField,
    ) -> Result<Vec<(usize, Vector3<f64>)>, GcmcError> {
        let mut atoms = Vec::with_capacity(self.atoms.len() * factors.iter().product::<usize>());
        for atom in &self.atoms {
            let species = forcefield.species_index(&atom.species)?;
            for i in 0..factors[0] {
                for j in 0..factors[1] {
                    for k in 0..factors[2] {
                        let shift = Vector3::new(i as f64, j as f64, k as f64);
                        let cart = self.unit_cell.fractional_to_cartesian(&(atom.frac + shift));
                        atoms.push((species, cart));
                    }
                }
            }
        }
        Ok(atoms)
    }
}
