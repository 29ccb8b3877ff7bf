use crate::core::hardware::{HardwareProbe, ProbeStatus};
use crate::ui::{self, probe_formatters};
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::fs;
use std::path::Path;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let as_json = matches.get_flag("json");
    let output = matches.get_one::<String>("output");

    if !as_json {
        println!("Reading hardware sensors...");
    }

    let snapshot = HardwareProbe::with_platform_defaults().run();

    if let Some(path) = output {
        let data = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
        fs::write(Path::new(path), data + "\n")
            .with_context(|| format!("Failed to write snapshot to {}", path))?;
        if !as_json {
            ui::success(&format!("✓ Snapshot written to {}", path));
        }
    }

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?
        );
    } else {
        probe_formatters::format_snapshot(&snapshot);
    }

    if snapshot.status == ProbeStatus::Error {
        anyhow::bail!("hardware probe failed: {}", snapshot.errors.join("; "));
    }
    Ok(())
}
