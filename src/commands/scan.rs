use crate::core::hardware::HardwareProbe;
use crate::core::scan::{ScanOrchestrator, ScanSettings};
use crate::core::Config;
use crate::ui::probe_formatters;
use anyhow::{Context, Result};
use clap::ArgMatches;
use std::sync::Arc;
use std::time::Duration;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(script) = matches.get_one::<String>("script") {
        config.set_script_path(script.clone());
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.set_output_dir(dir.clone());
    }
    let mut settings = ScanSettings::from_config(&config)?;
    if let Some(secs) = matches.get_one::<u64>("timeout") {
        settings.timeout = Duration::from_secs(*secs);
    }
    let run_id = matches.get_one::<String>("run-id").cloned();

    println!(
        "Running health-check script {} (timeout {}s)...",
        settings.script_path.display(),
        settings.timeout.as_secs()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("scan-worker")
        .build()
        .context("Failed to start async runtime")?;

    let orchestrator = ScanOrchestrator::new(settings, Arc::new(HardwareProbe::with_platform_defaults()));
    let outcome = runtime.block_on(orchestrator.run(run_id))?;

    probe_formatters::format_scan_outcome(&outcome);
    Ok(())
}
