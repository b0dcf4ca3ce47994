//! Output formatting and logging utilities

use adsorb::{ForceField, GcmcResults, Molecule};
use color_eyre::eyre::{Result, WrapErr};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup output logging to file or stdout
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => {
            if let Ok(log) = File::create(path) {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
                info!("Output will be written to: {}", path);
            } else {
                eprintln!("Could not create output file: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
        }
    }
}

/// Serialize result records to a YAML file
pub fn write_results(path: &str, results: &[GcmcResults]) -> Result<()> {
    let file =
        File::create(path).wrap_err_with(|| format!("Unable to create results file: {}", path))?;
    serde_yml::to_writer(BufWriter::new(file), results)
        .wrap_err("Failed to serialize results")?;
    info!("Results written to: {}", path);
    Ok(())
}

/// Write adsorbate vdW sites in XYZ format
pub fn write_xyz<W: Write>(
    writer: &mut W,
    molecules: &[Molecule],
    forcefield: &ForceField,
    comment: &str,
) -> Result<()> {
    let n_sites: usize = molecules.iter().map(|m| m.sites.len()).sum();
    writeln!(writer, "{}", n_sites)?;
    writeln!(writer, "{}", comment)?;
    for site in molecules.iter().flat_map(|m| &m.sites) {
        writeln!(
            writer,
            "{} {:.6} {:.6} {:.6}",
            forcefield.species_name(site.species),
            site.position.x,
            site.position.y,
            site.position.z
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsorb::forcefield::LjParameters;
    use adsorb::molecule::VdwSite;
    use nalgebra::Vector3;

    #[test]
    fn test_write_xyz() {
        let ff = ForceField::new(
            "toy",
            &[LjParameters { species: "Ar".into(), sigma: 3.4, epsilon: 120.0 }],
            12.0,
            0.1,
        )
        .unwrap();
        let mut m = Molecule::template(
            "Ar",
            vec![VdwSite { species: 0, position: Vector3::zeros() }],
            vec![],
            &[],
        );
        m.translate_to(&Vector3::new(1.0, 2.0, 3.0));

        let mut buffer = Vec::new();
        write_xyz(&mut buffer, &[m.clone(), m], &ff, "test").unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "2");
        assert_eq!(lines[1], "test");
        assert_eq!(lines[2], "Ar 1.000000 2.000000 3.000000");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_write_results_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.yaml");
        write_results(path.to_str().unwrap(), &[]).unwrap();
        assert!(path.exists());
    }
}
