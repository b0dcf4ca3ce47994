//! Metropolis-Hastings acceptance rules for the grand-canonical ensemble.
//!
//! Energies and temperatures are in Kelvin, fugacity in Pa, volume in Å³ and
//! `boltzmann` in Pa·Å³/K. The `*_ratio` functions return the unclamped
//! Metropolis ratio; the `*_probability` functions clamp it to 1.

use rand::Rng;

/// Grand-canonical thermodynamic state shared by all acceptance tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceContext {
    pub temperature: f64,
    pub fugacity: f64,
    pub volume: f64,
    pub boltzmann: f64,
}

impl AcceptanceContext {
    /// f·Ω / (k_B·T): the ideal-gas activity of the box.
    #[inline]
    fn activity(&self) -> f64 {
        self.fugacity * self.volume / (self.boltzmann * self.temperature)
    }

    /// Ratio for inserting a molecule with energy change `delta_energy`,
    /// giving `n_after` molecules.
    pub fn insertion_ratio(&self, n_after: usize, delta_energy: f64) -> f64 {
        self.activity() / n_after as f64 * (-delta_energy / self.temperature).exp()
    }

    /// Ratio for removing a molecule whose interaction energy is `energy`
    /// from a system of `n_before` molecules.
    pub fn deletion_ratio(&self, n_before: usize, energy: f64) -> f64 {
        n_before as f64 / self.activity() * (energy / self.temperature).exp()
    }

    /// Ratio for a move changing the energy by `delta_energy`.
    pub fn translation_ratio(&self, delta_energy: f64) -> f64 {
        (-delta_energy / self.temperature).exp()
    }

    pub fn insertion_probability(&self, n_after: usize, delta_energy: f64) -> f64 {
        clamp_probability(self.insertion_ratio(n_after, delta_energy))
    }

    pub fn deletion_probability(&self, n_before: usize, energy: f64) -> f64 {
        clamp_probability(self.deletion_ratio(n_before, energy))
    }

    pub fn translation_probability(&self, delta_energy: f64) -> f64 {
        clamp_probability(self.translation_ratio(delta_energy))
    }
}

#[inline]
fn clamp_probability(ratio: f64) -> f64 {
    // NaN only arises from ∞ - ∞ and means reject
    if ratio.is_nan() {
        0.0
    } else {
        ratio.min(1.0)
    }
}

/// One uniform draw in [0, 1) against `probability`.
#[inline]
pub fn metropolis_accept<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
    rng.gen::<f64>() < probability
}
