use adsorb::GcmcResults;
use tracing::info;

/// Human-readable summary of one chain.
pub fn report_summary(results: &GcmcResults) {
    let avg = &results.averages;
    info!("\n=== GCMC Results: {} in {} ===", results.adsorbate, results.crystal);
    info!("Force field:          {}", results.forcefield);
    info!("Temperature:          {:.2} K", results.temperature);
    info!("Fugacity:             {:.4e} Pa", results.fugacity);
    info!(
        "Cycles:               {} burn-in + {} sampling, sample every {} steps",
        results.n_burn_cycles, results.n_sample_cycles, results.sample_frequency
    );
    info!(
        "Replication:          {} x {} x {}",
        results.replication[0], results.replication[1], results.replication[2]
    );
    info!(
        "Markov steps:         {} ({} samples)",
        results.markov_steps, avg.n_samples
    );
    info!(
        "Loading:              {:.4} ± {:.4} molecules/unit cell",
        results.loading_per_unit_cell, results.loading_per_unit_cell_std
    );
    info!(
        "                      {:.4} ± {:.4} mmol/g",
        results.loading_mmol_per_g, results.loading_mmol_per_g_std
    );
    info!(
        "<N> (simulation box): {:.4}, var(N) = {:.4}",
        avg.mean_n, avg.var_n
    );
    info!(
        "<U_gh>:               {:.4} K (var {:.4})",
        avg.mean_guest_host, avg.var_guest_host
    );
    info!(
        "<U_gg>:               {:.4} K (var {:.4})",
        avg.mean_guest_guest, avg.var_guest_guest
    );
    info!(
        "<U>:                  {:.4} K (var {:.4})",
        avg.mean_energy, avg.var_energy
    );
    match (avg.isosteric_heat, results.isosteric_heat_kj_per_mol) {
        (Some(q_k), Some(q_kj)) => {
            info!("Q_st:                 {:.4} K ({:.4} kJ/mol)", q_k, q_kj)
        }
        _ => info!("Q_st:                 undefined (loading did not fluctuate)"),
    }
    info!("Acceptance rates:");
    info!("  Insertion:   {:.2}%", 100.0 * results.acceptance.insertion);
    info!("  Deletion:    {:.2}%", 100.0 * results.acceptance.deletion);
    info!("  Translation: {:.2}%", 100.0 * results.acceptance.translation);
}
