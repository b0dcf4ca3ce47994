//! Physical constants and unit conversions used by the simulation.

/// Boltzmann constant in Pa·Å³/K (1.380649e-23 J/K × 1e30 Å³/m³).
pub const BOLTZMANN_PA_A3_PER_K: f64 = 1.380649e7;

/// Avogadro's number (1/mol).
pub const AVOGADRO: f64 = 6.02214076e23;

/// Mass of one atomic mass unit in grams.
pub const AMU_TO_GRAMS: f64 = 1.66053906660e-24;

/// Universal gas constant in J/(mol·K).
pub const GAS_CONSTANT: f64 = 8.314462618;

/// Convert an energy expressed as a temperature (K) to kJ/mol.
pub fn kelvin_to_kj_per_mol(energy: f64) -> f64 {
    energy * GAS_CONSTANT / 1000.0
}

/// Convert a loading (molecules per unit cell) to mmol of adsorbate per gram of framework.
///
/// `framework_molar_mass` is the mass of one unit cell in amu.
pub fn molecules_per_cell_to_mmol_per_gram(loading: f64, framework_molar_mass: f64) -> f64 {
    let mmol = loading / AVOGADRO * 1000.0;
    let grams = framework_molar_mass * AMU_TO_GRAMS;
    mmol / grams
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mmol_per_gram_matches_molar_ratio() {
        // N_A * amu ≈ 1 g/mol, so mmol/g ≈ 1000 N / M
        let converted = molecules_per_cell_to_mmol_per_gram(2.0, 500.0);
        assert_relative_eq!(converted, 4.0, max_relative = 1e-6);
    }

    #[test]
    fn test_kelvin_to_kj_per_mol() {
        assert_relative_eq!(kelvin_to_kj_per_mol(1000.0), 8.314462618, epsilon = 1e-12);
    }
}
