//! Markov chain proposals: insertion, deletion and translation.

use crate::geometry::{wrap_fractional, SimulationBox};
use crate::molecule::Molecule;
use nalgebra::Vector3;
use rand::distributions::Standard;
use rand::prelude::*;
use rand_distr::Uniform;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three proposal kinds of the grand-canonical chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Insertion,
    Deletion,
    Translation,
}

impl MoveKind {
    pub const ALL: [MoveKind; 3] = [MoveKind::Insertion, MoveKind::Deletion, MoveKind::Translation];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            MoveKind::Insertion => 0,
            MoveKind::Deletion => 1,
            MoveKind::Translation => 2,
        }
    }
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveKind::Insertion => "insertion",
            MoveKind::Deletion => "deletion",
            MoveKind::Translation => "translation",
        };
        f.write_str(name)
    }
}

/// Move kinds are drawn with equal probability.
impl Distribution<MoveKind> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MoveKind {
        MoveKind::ALL[rng.gen_range(0..MoveKind::ALL.len())]
    }
}

/// A copy of `template` at a uniformly random point of the box, randomly
/// oriented when it has more than one site.
pub fn propose_insertion<R: Rng + ?Sized>(
    template: &Molecule,
    sim_box: &SimulationBox,
    rng: &mut R,
) -> Molecule {
    let frac = Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
    let mut molecule = template.clone();
    molecule.translate_to(&sim_box.fractional_to_cartesian(&frac));
    if molecule.n_sites() > 1 {
        molecule.rotate_randomly(rng);
    }
    molecule
}

/// Uniformly chosen molecule index, or `None` for an empty system.
pub fn choose_molecule<R: Rng + ?Sized>(n_molecules: usize, rng: &mut R) -> Option<usize> {
    if n_molecules == 0 {
        None
    } else {
        Some(rng.gen_range(0..n_molecules))
    }
}

/// Random displacement with each Cartesian component uniform in [-δ, δ].
pub fn random_displacement<R: Rng + ?Sized>(max_displacement: f64, rng: &mut R) -> Vector3<f64> {
    let dist = Uniform::new_inclusive(-max_displacement, max_displacement);
    Vector3::new(dist.sample(rng), dist.sample(rng), dist.sample(rng))
}

/// Displace a molecule rigidly and bring it back into the box.
pub fn translate_molecule<R: Rng + ?Sized>(
    molecule: &mut Molecule,
    max_displacement: f64,
    sim_box: &SimulationBox,
    rng: &mut R,
) {
    let dx = random_displacement(max_displacement, rng);
    molecule.translate_by(&dx);
    apply_periodic_boundary(molecule, sim_box);
}

/// Wrap the centre of mass into [0, 1)³ with one period of correction per axis,
/// moving all sites with it. Returns whether the molecule was moved.
pub fn apply_periodic_boundary(molecule: &mut Molecule, sim_box: &SimulationBox) -> bool {
    let frac = sim_box.cartesian_to_fractional(&molecule.center_of_mass);
    let wrapped = frac.map(wrap_fractional);
    if wrapped == frac {
        return false;
    }
    molecule.translate_to(&sim_box.fractional_to_cartesian(&wrapped));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{PointCharge, VdwSite};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;

    fn dimer() -> Molecule {
        Molecule::template(
            "X2",
            vec![
                VdwSite { species: 0, position: Vector3::new(-0.5, 0.0, 0.0) },
                VdwSite { species: 0, position: Vector3::new(0.5, 0.0, 0.0) },
            ],
            vec![],
            &[],
        )
    }

    #[test]
    fn test_move_kind_sampling_is_uniform() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut counts = [0usize; 3];
        for _ in 0..30_000 {
            let kind: MoveKind = rng.gen();
            counts[kind.index()] += 1;
        }
        for c in counts {
            assert!((c as f64 - 10_000.0).abs() < 500.0, "counts = {:?}", counts);
        }
    }

    #[test]
    fn test_insertion_lands_in_box() {
        let mut rng = StdRng::seed_from_u64(2);
        let bx = SimulationBox::from_lattice_parameters(20.0, 22.0, 24.0, 90.0, 110.0, 90.0)
            .unwrap();
        let template = dimer();
        for _ in 0..100 {
            let m = propose_insertion(&template, &bx, &mut rng);
            let frac = bx.cartesian_to_fractional(&m.center_of_mass);
            assert!(frac.iter().all(|&c| (0.0..1.0).contains(&c)));
            let bond = (m.sites[0].position - m.sites[1].position).norm();
            assert_relative_eq!(bond, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_single_site_insertion_not_rotated() {
        let mut rng = StdRng::seed_from_u64(3);
        let bx = SimulationBox::cuboid(10.0, 10.0, 10.0).unwrap();
        let template = Molecule::template(
            "Ar",
            vec![VdwSite { species: 0, position: Vector3::zeros() }],
            vec![],
            &[],
        );
        let m = propose_insertion(&template, &bx, &mut rng);
        assert_relative_eq!(m.sites[0].position, m.center_of_mass, epsilon = 1e-12);
    }

    #[test]
    fn test_charged_single_site_counts_as_multi_site() {
        let m = Molecule::template(
            "Ion",
            vec![VdwSite { species: 0, position: Vector3::zeros() }],
            vec![PointCharge { charge: 1.0, position: Vector3::new(0.3, 0.0, 0.0) }],
            &[],
        );
        assert_eq!(m.n_sites(), 2);
    }

    #[test]
    fn test_choose_molecule_empty() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(choose_molecule(0, &mut rng), None);
        assert!(choose_molecule(5, &mut rng).unwrap() < 5);
    }

    #[test]
    fn test_displacement_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..1000 {
            let dx = random_displacement(0.35, &mut rng);
            assert!(dx.iter().all(|&c| c.abs() <= 0.35));
        }
    }

    #[test]
    fn test_periodic_boundary_wraps_rigidly() {
        let bx = SimulationBox::cuboid(10.0, 10.0, 10.0).unwrap();
        let mut m = dimer();
        m.translate_to(&Vector3::new(10.2, 5.0, -0.1));
        assert!(apply_periodic_boundary(&mut m, &bx));
        assert_relative_eq!(m.center_of_mass, Vector3::new(0.2, 5.0, 9.9), epsilon = 1e-9);
        assert_relative_eq!(m.sites[0].position, Vector3::new(-0.3, 5.0, 9.9), epsilon = 1e-9);
        assert_relative_eq!(m.sites[1].position, Vector3::new(0.7, 5.0, 9.9), epsilon = 1e-9);
    }

    #[test]
    fn test_periodic_boundary_noop_inside() {
        let bx = SimulationBox::cuboid(10.0, 10.0, 10.0).unwrap();
        let mut m = dimer();
        m.translate_to(&Vector3::new(2.0, 3.0, 4.0));
        let before = m.clone();
        assert!(!apply_periodic_boundary(&mut m, &bx));
        assert_eq!(m, before);
    }

    #[test]
    fn test_translation_keeps_com_in_box() {
        let mut rng = StdRng::seed_from_u64(6);
        let bx = SimulationBox::cuboid(5.0, 5.0, 5.0).unwrap();
        let mut m = dimer();
        m.translate_to(&Vector3::new(0.1, 4.9, 2.5));
        for _ in 0..500 {
            translate_molecule(&mut m, 0.35, &bx, &mut rng);
            let frac = bx.cartesian_to_fractional(&m.center_of_mass);
            assert!(frac.iter().all(|&c| (0.0..1.0).contains(&c)));
        }
        let bond = (m.sites[0].position - m.sites[1].position).norm();
        assert_relative_eq!(bond, 1.0, epsilon = 1e-9);
    }
}
