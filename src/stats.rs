//! Running moments over sampled states and the quantities derived from them.

use crate::constants::{kelvin_to_kj_per_mol, molecules_per_cell_to_mmol_per_gram};
use crate::energy::SystemEnergy;
use crate::error::GcmcError;
use crate::molecule::Molecule;
use crate::moves::MoveKind;
use serde::{Deserialize, Serialize};

/// Sums accumulated at sample points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GcmcStats {
    pub n_samples: u64,
    pub n: f64,
    pub n_squared: f64,
    pub guest_host: f64,
    pub guest_host_squared: f64,
    pub guest_guest: f64,
    pub guest_guest_squared: f64,
    /// Σ U_gg·U_gh
    pub guest_guest_times_guest_host: f64,
    /// Σ (U_gg + U_gh)·N
    pub energy_times_n: f64,
}

impl GcmcStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample of the chain state.
    pub fn record(&mut self, n_molecules: usize, energy: SystemEnergy) {
        let n = n_molecules as f64;
        let (gg, gh) = (energy.guest_guest, energy.guest_host);
        self.n_samples += 1;
        self.n += n;
        self.n_squared += n * n;
        self.guest_host += gh;
        self.guest_host_squared += gh * gh;
        self.guest_guest += gg;
        self.guest_guest_squared += gg * gg;
        self.guest_guest_times_guest_host += gg * gh;
        self.energy_times_n += (gg + gh) * n;
    }

    /// Ensemble averages and fluctuations at `temperature` (K).
    pub fn summarize(&self, temperature: f64) -> Result<EnsembleAverages, GcmcError> {
        if self.n_samples == 0 {
            return Err(GcmcError::NoSamples);
        }
        let count = self.n_samples as f64;

        let mean_n = self.n / count;
        let var_n = self.n_squared / count - mean_n * mean_n;

        let mean_guest_host = self.guest_host / count;
        let var_guest_host = self.guest_host_squared / count - mean_guest_host * mean_guest_host;
        let mean_guest_guest = self.guest_guest / count;
        let var_guest_guest =
            self.guest_guest_squared / count - mean_guest_guest * mean_guest_guest;

        let covariance_gg_gh =
            self.guest_guest_times_guest_host / count - mean_guest_guest * mean_guest_host;
        let mean_energy = mean_guest_guest + mean_guest_host;
        let var_energy = var_guest_guest + var_guest_host + 2.0 * covariance_gg_gh;

        let covariance_u_n = self.energy_times_n / count - mean_energy * mean_n;
        let isosteric_heat = if var_n > 0.0 {
            Some(temperature - covariance_u_n / var_n)
        } else {
            None
        };

        Ok(EnsembleAverages {
            n_samples: self.n_samples,
            mean_n,
            var_n,
            mean_guest_host,
            var_guest_host,
            mean_guest_guest,
            var_guest_guest,
            mean_energy,
            var_energy,
            isosteric_heat,
        })
    }
}

/// Derived ensemble quantities; energies in K, loading in molecules per simulation box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleAverages {
    pub n_samples: u64,
    pub mean_n: f64,
    pub var_n: f64,
    pub mean_guest_host: f64,
    pub var_guest_host: f64,
    pub mean_guest_guest: f64,
    pub var_guest_guest: f64,
    pub mean_energy: f64,
    pub var_energy: f64,
    /// Q_st in K; `None` when the loading never fluctuated.
    pub isosteric_heat: Option<f64>,
}

/// Proposed and accepted move counts by move kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkovCounts {
    proposed: [u64; 3],
    accepted: [u64; 3],
}

impl MarkovCounts {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_proposal(&mut self, kind: MoveKind) {
        self.proposed[kind.index()] += 1;
    }

    #[inline]
    pub fn record_acceptance(&mut self, kind: MoveKind) {
        self.accepted[kind.index()] += 1;
    }

    pub fn proposed(&self, kind: MoveKind) -> u64 {
        self.proposed[kind.index()]
    }

    pub fn accepted(&self, kind: MoveKind) -> u64 {
        self.accepted[kind.index()]
    }

    pub fn total_proposed(&self) -> u64 {
        self.proposed.iter().sum()
    }

    /// Fraction of proposals of `kind` that were accepted (0 if none were proposed).
    pub fn acceptance_fraction(&self, kind: MoveKind) -> f64 {
        let proposed = self.proposed(kind);
        if proposed == 0 {
            0.0
        } else {
            self.accepted(kind) as f64 / proposed as f64
        }
    }
}

/// Per-move-kind acceptance fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceSummary {
    pub insertion: f64,
    pub deletion: f64,
    pub translation: f64,
}

impl From<&MarkovCounts> for AcceptanceSummary {
    fn from(counts: &MarkovCounts) -> Self {
        Self {
            insertion: counts.acceptance_fraction(MoveKind::Insertion),
            deletion: counts.acceptance_fraction(MoveKind::Deletion),
            translation: counts.acceptance_fraction(MoveKind::Translation),
        }
    }
}

/// Everything a finished run reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcmcResults {
    pub crystal: String,
    pub adsorbate: String,
    pub forcefield: String,
    pub temperature: f64,
    pub fugacity: f64,
    pub n_burn_cycles: usize,
    pub n_sample_cycles: usize,
    pub sample_frequency: usize,
    pub replication: [usize; 3],
    pub markov_steps: u64,
    pub averages: EnsembleAverages,
    pub loading_per_unit_cell: f64,
    pub loading_per_unit_cell_std: f64,
    pub loading_mmol_per_g: f64,
    pub loading_mmol_per_g_std: f64,
    pub isosteric_heat_kj_per_mol: Option<f64>,
    pub counts: MarkovCounts,
    pub acceptance: AcceptanceSummary,
    pub final_energy: SystemEnergy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecules: Option<Vec<Molecule>>,
}

/// Loading per unit cell and per gram of framework from box-level averages.
pub(crate) struct LoadingUnits {
    pub per_unit_cell: f64,
    pub per_unit_cell_std: f64,
    pub mmol_per_g: f64,
    pub mmol_per_g_std: f64,
}

impl LoadingUnits {
    pub(crate) fn new(averages: &EnsembleAverages, replication: [usize; 3], framework_molar_mass: f64) -> Self {
        let n_cells = replication.iter().product::<usize>() as f64;
        let per_unit_cell = averages.mean_n / n_cells;
        let per_unit_cell_std = averages.var_n.max(0.0).sqrt() / n_cells;
        Self {
            per_unit_cell,
            per_unit_cell_std,
            mmol_per_g: molecules_per_cell_to_mmol_per_gram(per_unit_cell, framework_molar_mass),
            mmol_per_g_std: molecules_per_cell_to_mmol_per_gram(
                per_unit_cell_std,
                framework_molar_mass,
            ),
        }
    }
}

pub(crate) fn isosteric_heat_kj_per_mol(averages: &EnsembleAverages) -> Option<f64> {
    averages.isosteric_heat.map(kelvin_to_kj_per_mol)
}
