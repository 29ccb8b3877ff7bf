use crate::core::hardware::HardwareProbe;
use crate::core::snapshot::merge_snapshot;
use crate::error::DiagError;
use crate::ui::{self, probe_formatters};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::fs;
use std::path::PathBuf;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let source = matches
        .get_one::<String>("source")
        .map(PathBuf::from)
        .context("Source report argument is required")?;
    let run_id = matches.get_one::<String>("run-id").map(String::as_str);

    if !source.is_file() {
        return Err(DiagError::SourceNotFound(source).into());
    }

    // Next to the source report unless told otherwise
    let output_dir = match matches.get_one::<String>("output-dir") {
        Some(dir) => PathBuf::from(dir),
        None => source
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    println!("Reading hardware sensors...");
    let snapshot = HardwareProbe::with_platform_defaults().run();
    println!("  Hardware probe: {}", probe_formatters::status_label(snapshot.status));

    let final_path = merge_snapshot(&source, &snapshot, &output_dir, run_id)?;
    ui::success(&format!("✓ Final snapshot written to {}", final_path.display()));

    Ok(())
}
