//! Grand-canonical Markov chain driver.
//!
//! A run is `n_burn_cycles + n_sample_cycles` outer cycles of `max(20, N)` inner
//! steps, with N read once at the start of each cycle. Every inner step draws one
//! of insertion, deletion or translation uniformly and immediately commits or
//! reverts it. The running guest-guest and guest-host energies are updated
//! incrementally and audited against a from-scratch recomputation at the end.

use crate::acceptance::{metropolis_accept, AcceptanceContext};
use crate::constants::BOLTZMANN_PA_A3_PER_K;
use crate::energy::{
    guest_guest_vdw_energy, total_guest_guest_vdw_energy, total_guest_host_vdw_energy,
    FrameworkInteraction, HostInteraction, SystemEnergy,
};
use crate::error::GcmcError;
use crate::forcefield::ForceField;
use crate::framework::Framework;
use crate::geometry::SimulationBox;
use crate::molecule::Molecule;
use crate::moves::{choose_molecule, propose_insertion, translate_molecule, MoveKind};
use crate::stats::{
    isosteric_heat_kj_per_mol, AcceptanceSummary, GcmcStats, GcmcResults, LoadingUnits,
    MarkovCounts,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

/// Immutable run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GcmcSettings {
    pub n_burn_cycles: usize,
    pub n_sample_cycles: usize,
    /// Record a sample every `sample_frequency` global Markov steps after burn-in.
    pub sample_frequency: usize,
    /// Maximum per-component translation δ in Å.
    pub max_displacement: f64,
    /// Lower bound on the number of inner steps per outer cycle.
    pub min_steps_per_cycle: usize,
    /// Boltzmann constant in Pa·Å³/K.
    pub boltzmann: f64,
    /// Absolute tolerance (K) for the end-of-run energy audit.
    pub energy_tolerance: f64,
    pub seed: Option<u64>,
    /// Keep the final adsorbate configuration in the results.
    pub retain_molecules: bool,
}

impl Default for GcmcSettings {
    fn default() -> Self {
        Self {
            n_burn_cycles: 5000,
            n_sample_cycles: 5000,
            sample_frequency: 5,
            max_displacement: 0.35,
            min_steps_per_cycle: 20,
            boltzmann: BOLTZMANN_PA_A3_PER_K,
            energy_tolerance: 0.01,
            seed: None,
            retain_molecules: false,
        }
    }
}

impl GcmcSettings {
    pub fn validate(&self) -> Result<(), GcmcError> {
        let invalid = |msg: &str| Err(GcmcError::InvalidSettings(msg.to_string()));
        if self.n_sample_cycles == 0 {
            return invalid("n_sample_cycles must be at least 1");
        }
        if self.sample_frequency == 0 {
            return invalid("sample_frequency must be at least 1");
        }
        if self.min_steps_per_cycle == 0 {
            return invalid("min_steps_per_cycle must be at least 1");
        }
        if !(self.max_displacement > 0.0) {
            return invalid("max_displacement must be positive");
        }
        if !(self.boltzmann > 0.0) {
            return invalid("boltzmann constant must be positive");
        }
        if !(self.energy_tolerance >= 0.0) {
            return invalid("energy_tolerance must be non-negative");
        }
        Ok(())
    }
}

/// State of one grand-canonical chain. Owns the molecule list and running totals.
pub struct MarkovChain<'a, H: HostInteraction + ?Sized> {
    template: &'a Molecule,
    forcefield: &'a ForceField,
    host: &'a H,
    settings: &'a GcmcSettings,
    sim_box: SimulationBox,
    context: AcceptanceContext,
    rng: StdRng,
    molecules: Vec<Molecule>,
    energy: SystemEnergy,
    counts: MarkovCounts,
    stats: GcmcStats,
    markov_steps: u64,
}

impl<'a, H: HostInteraction + ?Sized> MarkovChain<'a, H> {
    /// A chain with an empty simulation box.
    pub fn new(
        sim_box: SimulationBox,
        template: &'a Molecule,
        forcefield: &'a ForceField,
        host: &'a H,
        temperature: f64,
        fugacity: f64,
        settings: &'a GcmcSettings,
    ) -> Self {
        let context = AcceptanceContext {
            temperature,
            fugacity,
            volume: sim_box.volume(),
            boltzmann: settings.boltzmann,
        };
        let rng = settings
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            template,
            forcefield,
            host,
            settings,
            sim_box,
            context,
            rng,
            molecules: Vec::new(),
            energy: SystemEnergy::default(),
            counts: MarkovCounts::new(),
            stats: GcmcStats::new(),
            markov_steps: 0,
        }
    }

    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    /// Incrementally maintained guest-guest and guest-host energies.
    pub fn energy(&self) -> SystemEnergy {
        self.energy
    }

    pub fn counts(&self) -> &MarkovCounts {
        &self.counts
    }

    pub fn stats(&self) -> &GcmcStats {
        &self.stats
    }

    pub fn markov_steps(&self) -> u64 {
        self.markov_steps
    }

    /// Run every burn-in and sampling cycle, then audit the bookkeeping.
    pub fn run(&mut self) -> Result<(), GcmcError> {
        let n_burn = self.settings.n_burn_cycles;
        let n_cycles = n_burn + self.settings.n_sample_cycles;
        let sample_frequency = self.settings.sample_frequency as u64;
        let report_every = (n_cycles / 10).max(1);

        for cycle in 0..n_cycles {
            if cycle == n_burn {
                info!(
                    "Burn-in finished after {} cycles: N = {}, U_gg = {:.3} K, U_gh = {:.3} K",
                    n_burn,
                    self.molecules.len(),
                    self.energy.guest_guest,
                    self.energy.guest_host
                );
            }

            let n_steps = self.settings.min_steps_per_cycle.max(self.molecules.len());
            for _ in 0..n_steps {
                self.markov_steps += 1;
                self.step();

                if cycle >= n_burn && self.markov_steps % sample_frequency == 0 {
                    self.stats.record(self.molecules.len(), self.energy);
                }
            }

            if (cycle + 1) % report_every == 0 {
                debug!(
                    "Cycle {}/{}: N = {}, U = {:.3} K",
                    cycle + 1,
                    n_cycles,
                    self.molecules.len(),
                    self.energy.total()
                );
            }
        }

        self.audit()
    }

    /// One Markov step with a uniformly drawn move kind.
    pub fn step(&mut self) -> MoveKind {
        let kind: MoveKind = self.rng.gen();
        self.counts.record_proposal(kind);
        let accepted = match kind {
            MoveKind::Insertion => self.attempt_insertion(),
            MoveKind::Deletion => self.attempt_deletion(),
            MoveKind::Translation => self.attempt_translation(),
        };
        if accepted {
            self.counts.record_acceptance(kind);
        }
        kind
    }

    /// Energy of molecule `index` with the rest of the system.
    fn molecule_energy(&self, index: usize) -> SystemEnergy {
        let guest_guest =
            guest_guest_vdw_energy(index, &self.molecules, self.forcefield, &self.sim_box);
        if guest_guest.is_infinite() {
            return SystemEnergy::new(guest_guest, 0.0);
        }
        SystemEnergy::new(guest_guest, self.host.vdw_energy(&self.molecules[index]))
    }

    fn attempt_insertion(&mut self) -> bool {
        let molecule = propose_insertion(self.template, &self.sim_box, &mut self.rng);
        self.molecules.push(molecule);
        let delta = self.molecule_energy(self.molecules.len() - 1);

        let probability = self
            .context
            .insertion_probability(self.molecules.len(), delta.total());
        if metropolis_accept(probability, &mut self.rng) {
            self.energy += delta;
            true
        } else {
            self.molecules.pop();
            false
        }
    }

    fn attempt_deletion(&mut self) -> bool {
        let Some(index) = choose_molecule(self.molecules.len(), &mut self.rng) else {
            return false;
        };
        let energy = self.molecule_energy(index);

        let probability = self
            .context
            .deletion_probability(self.molecules.len(), energy.total());
        if metropolis_accept(probability, &mut self.rng) {
            self.molecules.remove(index);
            self.energy -= energy;
            true
        } else {
            false
        }
    }

    fn attempt_translation(&mut self) -> bool {
        let Some(index) = choose_molecule(self.molecules.len(), &mut self.rng) else {
            return false;
        };
        let old_energy = self.molecule_energy(index);
        let old_molecule = self.molecules[index].clone();

        translate_molecule(
            &mut self.molecules[index],
            self.settings.max_displacement,
            &self.sim_box,
            &mut self.rng,
        );
        let delta = self.molecule_energy(index) - old_energy;

        let probability = self.context.translation_probability(delta.total());
        if metropolis_accept(probability, &mut self.rng) {
            self.energy += delta;
            true
        } else {
            self.molecules[index] = old_molecule;
            false
        }
    }

    /// Compare the running energies with a from-scratch recomputation and the
    /// proposal count with the number of steps taken.
    pub fn audit(&self) -> Result<(), GcmcError> {
        let guest_guest =
            total_guest_guest_vdw_energy(&self.molecules, self.forcefield, &self.sim_box);
        let guest_host = total_guest_host_vdw_energy(self.host, &self.molecules);

        check_drift(
            "guest-guest",
            self.energy.guest_guest,
            guest_guest,
            self.settings.energy_tolerance,
        )?;
        check_drift(
            "guest-host",
            self.energy.guest_host,
            guest_host,
            self.settings.energy_tolerance,
        )?;

        let proposed = self.counts.total_proposed();
        if proposed != self.markov_steps {
            return Err(GcmcError::MoveCountMismatch {
                proposed,
                steps: self.markov_steps,
            });
        }

        debug!(
            "Energy audit passed: U_gg = {:.6} K, U_gh = {:.6} K",
            guest_guest, guest_host
        );
        Ok(())
    }
}

fn check_drift(
    term: &'static str,
    running: f64,
    recomputed: f64,
    tolerance: f64,
) -> Result<(), GcmcError> {
    if (running - recomputed).abs() > tolerance {
        Err(GcmcError::EnergyDrift {
            term,
            running,
            recomputed,
        })
    } else {
        Ok(())
    }
}

/// Simulate `template` adsorbing in `framework` at `temperature` (K) and `fugacity` (Pa).
pub fn run_gcmc_simulation(
    framework: &Framework,
    temperature: f64,
    fugacity: f64,
    template: &Molecule,
    forcefield: &ForceField,
    settings: &GcmcSettings,
) -> Result<GcmcResults, GcmcError> {
    settings.validate()?;
    if !(temperature > 0.0) {
        return Err(GcmcError::InvalidSettings(format!(
            "temperature must be positive, got {}",
            temperature
        )));
    }
    if !(fugacity > 0.0) {
        return Err(GcmcError::InvalidSettings(format!(
            "fugacity must be positive, got {}",
            fugacity
        )));
    }
    if let Some(site) = template
        .sites
        .iter()
        .find(|s| s.species >= forcefield.n_species())
    {
        return Err(GcmcError::InvalidSettings(format!(
            "adsorbate site species index {} is outside force field '{}'",
            site.species, forcefield.name
        )));
    }

    let replication = framework.replication_factors_for(forcefield);
    let sim_box = framework.simulation_box(replication);
    let host = FrameworkInteraction::new(framework, forcefield, replication)?;

    info!(
        "GCMC: {} in {} ({}), T = {} K, f = {:.4e} Pa",
        template.species, framework.name, forcefield.name, temperature, fugacity
    );
    info!(
        "Simulation box: {}x{}x{} unit cells, volume {:.2} Å^3, {} host atoms",
        replication[0],
        replication[1],
        replication[2],
        sim_box.volume(),
        host.n_atoms()
    );

    let mut chain = MarkovChain::new(
        sim_box,
        template,
        forcefield,
        &host,
        temperature,
        fugacity,
        settings,
    );
    chain.run()?;

    let averages = chain.stats.summarize(temperature)?;
    let loading = LoadingUnits::new(&averages, replication, framework.molar_mass());
    info!(
        "Finished {} Markov steps: <N> = {:.4} molecules/unit cell ({:.4} mmol/g)",
        chain.markov_steps, loading.per_unit_cell, loading.mmol_per_g
    );

    Ok(GcmcResults {
        crystal: framework.name.clone(),
        adsorbate: template.species.clone(),
        forcefield: forcefield.name.clone(),
        temperature,
        fugacity,
        n_burn_cycles: settings.n_burn_cycles,
        n_sample_cycles: settings.n_sample_cycles,
        sample_frequency: settings.sample_frequency,
        replication,
        markov_steps: chain.markov_steps,
        isosteric_heat_kj_per_mol: isosteric_heat_kj_per_mol(&averages),
        averages,
        loading_per_unit_cell: loading.per_unit_cell,
        loading_per_unit_cell_std: loading.per_unit_cell_std,
        loading_mmol_per_g: loading.mmol_per_g,
        loading_mmol_per_g_std: loading.mmol_per_g_std,
        acceptance: AcceptanceSummary::from(&chain.counts),
        counts: chain.counts.clone(),
        final_energy: chain.energy,
        molecules: settings.retain_molecules.then(|| chain.molecules.clone()),
    })
}

/// One independent chain per fugacity, run in parallel. Chain `i` is seeded
/// with `seed + i` when a seed is set.
pub fn run_isotherm(
    framework: &Framework,
    temperature: f64,
    fugacities: &[f64],
    template: &Molecule,
    forcefield: &ForceField,
    settings: &GcmcSettings,
) -> Result<Vec<GcmcResults>, GcmcError> {
    fugacities
        .par_iter()
        .enumerate()
        .map(|(i, &fugacity)| {
            let chain_settings = GcmcSettings {
                seed: settings.seed.map(|s| s.wrapping_add(i as u64)),
                ..settings.clone()
            };
            run_gcmc_simulation(
                framework,
                temperature,
                fugacity,
                template,
                forcefield,
                &chain_settings,
            )
        })
        .collect()
}
