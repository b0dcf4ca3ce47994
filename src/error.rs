use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcmcError {
    #[error("Unknown atom species '{species}' in force field '{forcefield}'")]
    UnknownSpecies { species: String, forcefield: String },

    #[error("No atomic mass known for species '{0}'")]
    MissingAtomicMass(String),

    #[error("Invalid simulation settings: {0}")]
    InvalidSettings(String),

    #[error("No samples were collected; increase n_sample_cycles or lower sample_frequency")]
    NoSamples,

    #[error(
        "Incremental {term} energy drifted from recomputed value: running {running:.6} K, recomputed {recomputed:.6} K"
    )]
    EnergyDrift {
        term: &'static str,
        running: f64,
        recomputed: f64,
    },

    #[error("Proposed move count {proposed} does not match the {steps} Markov steps taken")]
    MoveCountMismatch { proposed: u64, steps: u64 },
}
