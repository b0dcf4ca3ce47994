//! Van der Waals energies: guest-guest and guest-host.
//!
//! All energies are in Kelvin (energy / k_B). A site pair closer than the
//! force field's overlap radius makes the whole evaluation `f64::INFINITY`,
//! which every acceptance test turns into a certain rejection.

use crate::error::GcmcError;
use crate::forcefield::ForceField;
use crate::framework::Framework;
use crate::geometry::SimulationBox;
use crate::molecule::{Molecule, VdwSite};
use itertools::iproduct;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// 12-6 Lennard-Jones energy at squared separation `r2`.
#[inline]
pub fn lennard_jones(r2: f64, sigma2: f64, epsilon: f64) -> f64 {
    let sr2 = sigma2 / r2;
    let sr6 = sr2 * sr2 * sr2;
    4.0 * epsilon * (sr6 * sr6 - sr6)
}

/// Sum of pair energies between one set of sites and another under minimum image.
/// Returns infinity as soon as any pair overlaps.
fn site_set_energy<'a>(
    sites: &[VdwSite],
    others: impl Iterator<Item = (usize, &'a Vector3<f64>)> + Clone,
    forcefield: &ForceField,
    sim_box: &SimulationBox,
) -> f64 {
    let rc2 = forcefield.cutoff_radius_squared();
    let overlap2 = forcefield.overlap_radius_squared();

    let mut energy = 0.0;
    for (site, (species, x)) in iproduct!(sites, others) {
        let r2 = sim_box.minimum_image(&(site.position - x)).norm_squared();
        if r2 < overlap2 {
            return f64::INFINITY;
        }
        if r2 < rc2 {
            energy += lennard_jones(
                r2,
                forcefield.sigma_squared(site.species, species),
                forcefield.epsilon(site.species, species),
            );
        }
    }
    energy
}

/// Interaction of molecule `index` with every other molecule in `molecules`.
pub fn guest_guest_vdw_energy(
    index: usize,
    molecules: &[Molecule],
    forcefield: &ForceField,
    sim_box: &SimulationBox,
) -> f64 {
    let target = &molecules[index];
    let mut energy = 0.0;
    for (j, other) in molecules.iter().enumerate() {
        if j == index {
            continue;
        }
        let others = other.sites.iter().map(|s| (s.species, &s.position));
        let e = site_set_energy(&target.sites, others, forcefield, sim_box);
        if e.is_infinite() {
            return f64::INFINITY;
        }
        energy += e;
    }
    energy
}

/// Total guest-guest energy; each pair is visited twice, hence the halving.
pub fn total_guest_guest_vdw_energy(
    molecules: &[Molecule],
    forcefield: &ForceField,
    sim_box: &SimulationBox,
) -> f64 {
    (0..molecules.len())
        .map(|i| guest_guest_vdw_energy(i, molecules, forcefield, sim_box))
        .sum::<f64>()
        / 2.0
}

/// Guest-host interaction provider.
pub trait HostInteraction {
    /// Van der Waals energy between `molecule` and the host.
    fn vdw_energy(&self, molecule: &Molecule) -> f64;
}

/// Sum of guest-host energies over a set of molecules.
pub fn total_guest_host_vdw_energy<H: HostInteraction + ?Sized>(
    host: &H,
    molecules: &[Molecule],
) -> f64 {
    molecules.iter().map(|m| host.vdw_energy(m)).sum()
}

/// A host with no atoms: U_gh ≡ 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHost;

impl HostInteraction for EmptyHost {
    fn vdw_energy(&self, _molecule: &Molecule) -> f64 {
        0.0
    }
}

/// Direct pairwise sum against the host atoms of the replicated simulation box.
#[derive(Debug, Clone)]
pub struct FrameworkInteraction {
    forcefield: ForceField,
    sim_box: SimulationBox,
    atoms: Vec<(usize, Vector3<f64>)>,
}

impl FrameworkInteraction {
    pub fn new(
        framework: &Framework,
        forcefield: &ForceField,
        replication: [usize; 3],
    ) -> Result<Self, GcmcError> {
        Ok(Self {
            forcefield: forcefield.clone(),
            sim_box: framework.simulation_box(replication),
            atoms: framework.replicated_atoms(replication, forcefield)?,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.atoms.len()
    }
}

impl HostInteraction for FrameworkInteraction {
    fn vdw_energy(&self, molecule: &Molecule) -> f64 {
        let atoms = self.atoms.iter().map(|(species, x)| (*species, x));
        site_set_energy(&molecule.sites, atoms, &self.forcefield, &self.sim_box)
    }
}

/// Guest-guest and guest-host energy pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemEnergy {
    pub guest_guest: f64,
    pub guest_host: f64,
}

impl SystemEnergy {
    pub fn new(guest_guest: f64, guest_host: f64) -> Self {
        Self {
            guest_guest,
            guest_host,
        }
    }

    pub fn total(&self) -> f64 {
        self.guest_guest + self.guest_host
    }
}

impl Add for SystemEnergy {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.guest_guest + rhs.guest_guest, self.guest_host + rhs.guest_host)
    }
}

impl Sub for SystemEnergy {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.guest_guest - rhs.guest_guest, self.guest_host - rhs.guest_host)
    }
}

impl AddAssign for SystemEnergy {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for SystemEnergy {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forcefield::LjParameters;
    use crate::framework::FrameworkAtom;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn forcefield(cutoff: f64) -> ForceField {
        ForceField::new(
            "toy",
            &[
                LjParameters { species: "A".into(), sigma: 3.0, epsilon: 100.0 },
                LjParameters { species: "B".into(), sigma: 3.6, epsilon: 40.0 },
            ],
            cutoff,
            0.1,
        )
        .unwrap()
    }

    fn molecule_at(species: &[usize], offsets: &[[f64; 3]], com: [f64; 3]) -> Molecule {
        let sites = species
            .iter()
            .zip(offsets)
            .map(|(&s, o)| VdwSite { species: s, position: Vector3::new(o[0], o[1], o[2]) })
            .collect();
        let mut m = Molecule::template("M", sites, vec![], &[]);
        m.translate_to(&Vector3::new(com[0], com[1], com[2]));
        m
    }

    fn brute_force_total(molecules: &[Molecule], ff: &ForceField, bx: &SimulationBox) -> f64 {
        let mut total = 0.0;
        for i in 0..molecules.len() {
            for j in (i + 1)..molecules.len() {
                for a in &molecules[i].sites {
                    for b in &molecules[j].sites {
                        let mut d = bx.cartesian_to_fractional(&(a.position - b.position));
                        for k in 0..3 {
                            d[k] -= d[k].round();
                        }
                        let r2 = bx.fractional_to_cartesian(&d).norm_squared();
                        if r2 < ff.cutoff_radius_squared() {
                            total += lennard_jones(
                                r2,
                                ff.sigma_squared(a.species, b.species),
                                ff.epsilon(a.species, b.species),
                            );
                        }
                    }
                }
            }
        }
        total
    }

    #[test]
    fn test_lennard_jones_minimum() {
        let sigma2: f64 = 9.0;
        let r_min2 = 2f64.powf(1.0 / 3.0) * sigma2;
        assert_relative_eq!(lennard_jones(r_min2, sigma2, 50.0), -50.0, epsilon = 1e-10);
        assert_relative_eq!(lennard_jones(sigma2, sigma2, 50.0), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_guest_guest_matches_brute_force() {
        let ff = forcefield(6.0);
        let bx = SimulationBox::from_lattice_parameters(14.0, 15.0, 16.0, 85.0, 92.0, 100.0)
            .unwrap();
        let molecules = vec![
            molecule_at(&[0], &[[0.0, 0.0, 0.0]], [1.0, 1.0, 1.0]),
            molecule_at(&[0, 1], &[[-0.6, 0.0, 0.0], [0.6, 0.0, 0.0]], [13.5, 2.0, 1.5]),
            molecule_at(&[1], &[[0.0, 0.0, 0.0]], [4.5, 3.0, 1.0]),
            molecule_at(&[0, 0, 1], &[[0.0, 0.0, -1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]], [2.0, 13.0, 14.0]),
            molecule_at(&[1], &[[0.0, 0.0, 0.0]], [7.0, 7.5, 8.0]),
        ];

        let expected = brute_force_total(&molecules, &ff, &bx);
        let total = total_guest_guest_vdw_energy(&molecules, &ff, &bx);
        assert!(expected != 0.0);
        assert_relative_eq!(total, expected, max_relative = 1e-10);

        // per-molecule energies sum to twice the pair total
        let per_molecule: f64 = (0..molecules.len())
            .map(|i| guest_guest_vdw_energy(i, &molecules, &ff, &bx))
            .sum();
        assert_relative_eq!(per_molecule, 2.0 * expected, max_relative = 1e-10);
    }

    #[test]
    fn test_interaction_across_boundary() {
        let ff = forcefield(6.0);
        let bx = SimulationBox::cuboid(20.0, 20.0, 20.0).unwrap();
        let molecules = vec![
            molecule_at(&[0], &[[0.0, 0.0, 0.0]], [0.5, 10.0, 10.0]),
            molecule_at(&[0], &[[0.0, 0.0, 0.0]], [19.0, 10.0, 10.0]),
        ];
        let e = guest_guest_vdw_energy(0, &molecules, &ff, &bx);
        assert_relative_eq!(e, lennard_jones(2.25, 9.0, 100.0), epsilon = 1e-9);
    }

    #[test]
    fn test_beyond_cutoff_is_zero() {
        let ff = forcefield(4.0);
        let bx = SimulationBox::cuboid(20.0, 20.0, 20.0).unwrap();
        let molecules = vec![
            molecule_at(&[0], &[[0.0, 0.0, 0.0]], [5.0, 5.0, 5.0]),
            molecule_at(&[0], &[[0.0, 0.0, 0.0]], [10.0, 5.0, 5.0]),
        ];
        assert_eq!(guest_guest_vdw_energy(0, &molecules, &ff, &bx), 0.0);
    }

    #[test]
    fn test_overlap_diverges() {
        let ff = forcefield(6.0);
        let bx = SimulationBox::cuboid(20.0, 20.0, 20.0).unwrap();
        let molecules = vec![
            molecule_at(&[0], &[[0.0, 0.0, 0.0]], [5.0, 5.0, 5.0]),
            molecule_at(&[1], &[[0.0, 0.0, 0.0]], [5.05, 5.0, 5.0]),
            molecule_at(&[1], &[[0.0, 0.0, 0.0]], [9.0, 5.0, 5.0]),
        ];
        assert_eq!(guest_guest_vdw_energy(0, &molecules, &ff, &bx), f64::INFINITY);
        assert_eq!(total_guest_guest_vdw_energy(&molecules, &ff, &bx), f64::INFINITY);
    }

    #[test]
    fn test_framework_interaction() {
        let ff = forcefield(6.0);
        let masses = HashMap::from([("B".to_string(), 12.0)]);
        let framework = Framework::new(
            "cubic",
            SimulationBox::cuboid(6.0, 6.0, 6.0).unwrap(),
            vec![FrameworkAtom { species: "B".into(), frac: Vector3::new(0.5, 0.5, 0.5) }],
            &masses,
        )
        .unwrap();
        let rep = framework.replication_factors_for(&ff);
        assert_eq!(rep, [2, 2, 2]);
        let host = FrameworkInteraction::new(&framework, &ff, rep).unwrap();
        assert_eq!(host.n_atoms(), 8);

        // sits between two host atoms along x, 3 Å from each, and further from the rest
        let m = molecule_at(&[0], &[[0.0, 0.0, 0.0]], [6.0, 3.0, 3.0]);
        let sigma2 = ff.sigma_squared(0, 1);
        let eps = ff.epsilon(0, 1);
        let mut expected = 0.0;
        for r2 in [9.0, 9.0, 45.0, 45.0, 45.0, 45.0, 81.0, 81.0] {
            if r2 < 36.0 {
                expected += lennard_jones(r2, sigma2, eps);
            }
        }
        assert_relative_eq!(host.vdw_energy(&m), expected, epsilon = 1e-9);
        assert_relative_eq!(
            total_guest_host_vdw_energy(&host, &[m.clone(), m]),
            2.0 * expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_empty_host() {
        let m = molecule_at(&[0], &[[0.0, 0.0, 0.0]], [1.0, 1.0, 1.0]);
        assert_eq!(EmptyHost.vdw_energy(&m), 0.0);
    }

    #[test]
    fn test_system_energy_arithmetic() {
        let mut e = SystemEnergy::new(-10.0, -200.0);
        e += SystemEnergy::new(-1.0, -2.0);
        assert_eq!(e, SystemEnergy::new(-11.0, -202.0));
        e -= SystemEnergy::new(-1.0, -2.0);
        assert_eq!(e.total(), -210.0);
    }
}
