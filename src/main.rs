//! GCMC adsorption command-line interface
//!
//! Reads a YAML configuration, runs one grand-canonical chain per fugacity and
//! reports the ensemble averages.

use adsorb::config::{Args, Config};
use adsorb::{run_isotherm, GcmcSettings};
use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use std::fs::{self, File};
use std::io::BufWriter;
use tracing::info;

mod io;

use io::{report_summary, setup_output, write_results, write_xyz};

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_output(args.output.as_ref());

    info!("Reading configuration from: {}", args.config_file);
    let config = load_config(&args)?;

    let forcefield = config
        .build_forcefield()
        .wrap_err("Invalid force field")?;
    let framework = config.build_framework().wrap_err("Invalid framework")?;
    let template = config
        .build_template(&forcefield)
        .wrap_err("Invalid adsorbate")?;
    let settings = resolve_settings(&args, &config);

    let temperature = args.temperature.unwrap_or(config.conditions.temperature);
    let fugacities = match args.fugacity {
        Some(f) => vec![f],
        None => config.conditions.fugacities.clone(),
    };
    if fugacities.is_empty() {
        return Err(eyre!("No fugacities given in the configuration"));
    }

    info!(
        "Running {} chain(s) of {} in {} at {} K",
        fugacities.len(),
        template.species,
        framework.name,
        temperature
    );
    let results = run_isotherm(
        &framework,
        temperature,
        &fugacities,
        &template,
        &forcefield,
        &settings,
    )
    .wrap_err("GCMC simulation failed")?;

    for r in &results {
        report_summary(r);
    }

    if let Some(ref path) = args.results {
        write_results(path, &results)?;
    }

    if let Some(ref path) = args.xyz {
        let last = results.last().and_then(|r| r.molecules.as_ref());
        match last {
            Some(molecules) => {
                let mut file = BufWriter::new(
                    File::create(path)
                        .wrap_err_with(|| format!("Unable to create XYZ file: {}", path))?,
                );
                let comment = format!(
                    "{} in {} at {} K, {:.4e} Pa",
                    template.species,
                    framework.name,
                    temperature,
                    fugacities[fugacities.len() - 1]
                );
                write_xyz(&mut file, molecules, &forcefield, &comment)?;
                info!("Final configuration written to: {}", path);
            }
            None => info!("No final configuration available; {} not written", path),
        }
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config_content = fs::read_to_string(&args.config_file)
        .wrap_err_with(|| format!("Unable to read configuration file: {}", args.config_file))?;

    let config = serde_yml::from_str::<Config>(&config_content)
        .wrap_err("Failed to parse configuration file")?
        .with_defaults();

    Ok(config)
}

/// Command-line overrides take precedence over the configuration file.
fn resolve_settings(args: &Args, config: &Config) -> GcmcSettings {
    let mut settings = config.settings();
    if let Some(n) = args.n_burn_cycles {
        info!("Overriding n_burn_cycles with: {}", n);
        settings.n_burn_cycles = n;
    }
    if let Some(n) = args.n_sample_cycles {
        info!("Overriding n_sample_cycles with: {}", n);
        settings.n_sample_cycles = n;
    }
    if let Some(n) = args.sample_frequency {
        info!("Overriding sample_frequency with: {}", n);
        settings.sample_frequency = n;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if args.xyz.is_some() {
        settings.retain_molecules = true;
    }
    settings
}
