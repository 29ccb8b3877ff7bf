//! Launches the external health-check script and assembles the final snapshot.
//!
//! The script is only a boundary: it must write its JSON report to the path
//! passed through `{report}`. Its exit code and stderr are logged, never
//! interpreted. Once the report exists the hardware probe runs and both are
//! merged.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{info, warn};
use tokio::process::Command;

use crate::core::config::{Config, REPORT_PLACEHOLDER, SCRIPT_PLACEHOLDER};
use crate::core::hardware::{HardwareProbe, ProbeStatus};
use crate::core::snapshot::{merge_snapshot, sanitize_run_id};
use crate::error::{DiagError, Result};

/// Everything needed to run one scan
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub script_path: PathBuf,
    pub output_dir: PathBuf,
    pub timeout: Duration,
    pub interpreter: String,
    pub script_args: Vec<String>,
}

impl ScanSettings {
    /// Settings from the persisted configuration. Fails when no script is
    /// configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let script_path = config
            .get_script_path()
            .ok_or_else(|| DiagError::config("no health-check script configured"))?;
        let output_dir = config
            .resolved_output_dir()
            .map_err(|e| DiagError::config(e.to_string()))?;

        Ok(Self {
            script_path: PathBuf::from(script_path),
            output_dir,
            timeout: Duration::from_secs(config.timeout_secs),
            interpreter: config.interpreter.clone(),
            script_args: config.script_args.clone(),
        })
    }
}

/// Result of a completed scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub run_id: String,
    pub report_path: PathBuf,
    pub final_path: PathBuf,
    pub exit_code: Option<i32>,
    pub probe_status: ProbeStatus,
}

pub struct ScanOrchestrator {
    settings: ScanSettings,
    probe: Arc<HardwareProbe>,
}

impl ScanOrchestrator {
    pub fn new(settings: ScanSettings, probe: Arc<HardwareProbe>) -> Self {
        Self { settings, probe }
    }

    /// Run the script, probe the hardware and write the merged snapshot.
    pub async fn run(&self, run_id: Option<String>) -> Result<ScanOutcome> {
        let settings = &self.settings;
        let run_id = run_id
            .map(|id| sanitize_run_id(id.trim()))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Utc::now().format("%Y%m%d_%H%M%S").to_string());

        if !settings.script_path.is_file() {
            return Err(DiagError::script(format!(
                "script not found: {}",
                settings.script_path.display()
            )));
        }

        tokio::fs::create_dir_all(&settings.output_dir)
            .await
            .map_err(|e| DiagError::from_write_io(e, &settings.output_dir))?;

        let report_path = settings
            .output_dir
            .join(format!("Snapshot_{}.json", run_id));
        remove_stale_report(&report_path).await?;

        let exit_code = self.run_script(&report_path).await?;

        if !report_path.is_file() {
            return Err(DiagError::script(format!(
                "script exited with code {:?} without writing {}",
                exit_code,
                report_path.display()
            )));
        }

        let probe = Arc::clone(&self.probe);
        let snapshot = tokio::task::spawn_blocking(move || probe.run())
            .await
            .map_err(|e| DiagError::other(format!("hardware probe task failed: {}", e)))?;
        let probe_status = snapshot.status;

        let source = report_path.clone();
        let output_dir = settings.output_dir.clone();
        let id = run_id.clone();
        let final_path = tokio::task::spawn_blocking(move || {
            merge_snapshot(&source, &snapshot, &output_dir, Some(&id))
        })
        .await
        .map_err(|e| DiagError::other(format!("snapshot merge task failed: {}", e)))??;

        info!("Scan {} complete: {}", run_id, final_path.display());
        Ok(ScanOutcome {
            run_id,
            report_path,
            final_path,
            exit_code,
            probe_status,
        })
    }

    async fn run_script(&self, report_path: &Path) -> Result<Option<i32>> {
        let settings = &self.settings;
        let args = expand_args(&settings.script_args, &settings.script_path, report_path);

        info!(
            "Launching health-check script: {} {}",
            settings.interpreter,
            args.join(" ")
        );
        let child = Command::new(&settings.interpreter)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DiagError::script(format!("failed to launch {}: {}", settings.interpreter, e))
            })?;

        let output = match tokio::time::timeout(settings.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(DiagError::script(format!("failed waiting for script: {}", e)));
            }
            Err(_) => {
                warn!(
                    "Health-check script exceeded {}s and was killed",
                    settings.timeout.as_secs()
                );
                return Err(DiagError::ScriptTimeout(settings.timeout.as_secs()));
            }
        };

        let exit_code = output.status.code();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            info!("Health-check script exited successfully");
        } else {
            warn!("Health-check script exited with code {:?}", exit_code);
        }
        if !stderr.trim().is_empty() {
            warn!("Health-check script stderr: {}", stderr.trim());
        }

        Ok(exit_code)
    }
}

/// Substitute `{script}` and `{report}` in every argument.
pub fn expand_args(template: &[String], script: &Path, report: &Path) -> Vec<String> {
    let script = script.to_string_lossy();
    let report = report.to_string_lossy();
    template
        .iter()
        .map(|arg| {
            arg.replace(SCRIPT_PLACEHOLDER, &script)
                .replace(REPORT_PLACEHOLDER, &report)
        })
        .collect()
}

async fn remove_stale_report(report_path: &Path) -> Result<()> {
    match tokio::fs::remove_file(report_path).await {
        Ok(()) => {
            warn!("Removed stale report {}", report_path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DiagError::from_write_io(e, report_path)),
    }
}
