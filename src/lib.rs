//! Grand-canonical Monte Carlo simulation of gas adsorption in rigid porous crystals.

pub mod acceptance;
pub mod config;
pub mod constants;
pub mod energy;
pub mod error;
pub mod forcefield;
pub mod framework;
pub mod gcmc;
pub mod geometry;
pub mod molecule;
pub mod moves;
pub mod stats;

pub use error::GcmcError;
pub use forcefield::ForceField;
pub use framework::Framework;
pub use gcmc::{run_gcmc_simulation, run_isotherm, GcmcSettings, MarkovChain};
pub use geometry::SimulationBox;
pub use molecule::Molecule;
pub use stats::GcmcResults;
