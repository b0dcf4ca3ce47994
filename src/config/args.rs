//! Command-line argument parsing for GCMC runs

use clap::Parser;

/// Grand-canonical Monte Carlo adsorption with YAML configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Log file (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the result records to this YAML file
    #[arg(short, long)]
    pub results: Option<String>,

    /// Write the final adsorbate configuration of the last chain to this XYZ file
    #[arg(long)]
    pub xyz: Option<String>,

    /// Override temperature (K)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Override the fugacity list with a single fugacity (Pa)
    #[arg(long)]
    pub fugacity: Option<f64>,

    /// Override number of burn-in cycles
    #[arg(long)]
    pub n_burn_cycles: Option<usize>,

    /// Override number of sampling cycles
    #[arg(long)]
    pub n_sample_cycles: Option<usize>,

    /// Override sampling frequency (Markov steps)
    #[arg(long)]
    pub sample_frequency: Option<usize>,

    /// Override random seed
    #[arg(long)]
    pub seed: Option<u64>,
}
