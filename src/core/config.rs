use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the health-check script path
pub const SCRIPT_PLACEHOLDER: &str = "{script}";
/// Placeholder replaced by the report path the script must write
pub const REPORT_PLACEHOLDER: &str = "{report}";

const DEFAULT_TIMEOUT_SECS: u64 = 900;
const DEFAULT_INTERPRETER: &str = "powershell.exe";

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

fn default_script_args() -> Vec<String> {
    [
        "-NoProfile",
        "-ExecutionPolicy",
        "Bypass",
        "-File",
        SCRIPT_PLACEHOLDER,
        "-OutputPath",
        REPORT_PLACEHOLDER,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Health-check script launched by `pcdiag scan`
    #[serde(default)]
    pub script_path: Option<String>,
    /// Directory receiving the script report and the final snapshot
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Interpreter arguments; `{script}` and `{report}` are expanded per run
    #[serde(default = "default_script_args")]
    pub script_args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_path: None,
            output_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            interpreter: default_interpreter(),
            script_args: default_script_args(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path. A missing, empty or corrupted file yields
    /// the default configuration.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!(
                "Ignoring unreadable config file {:?} ({}); using defaults",
                config_path,
                e
            );
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("pcdiag").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.timeout_secs > 0,
            "timeout_secs must be > 0, got {}",
            self.timeout_secs
        );
        anyhow::ensure!(
            !self.interpreter.trim().is_empty(),
            "interpreter must be non-empty"
        );
        anyhow::ensure!(
            self.script_args.iter().any(|a| a.contains(REPORT_PLACEHOLDER)),
            "script_args must contain the {} placeholder",
            REPORT_PLACEHOLDER
        );
        Ok(())
    }

    pub fn set_script_path(&mut self, path: String) {
        self.script_path = Some(path);
    }

    pub fn get_script_path(&self) -> Option<&String> {
        self.script_path.as_ref()
    }

    pub fn set_output_dir(&mut self, path: String) {
        self.output_dir = Some(path);
    }

    pub fn get_output_dir(&self) -> Option<&String> {
        self.output_dir.as_ref()
    }

    /// Output directory, defaulting to `<data dir>/pcdiag/snapshots`
    pub fn resolved_output_dir(&self) -> Result<PathBuf> {
        match &self.output_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => {
                let data_dir =
                    dirs::data_local_dir().with_context(|| "Could not determine data directory")?;
                Ok(data_dir.join("pcdiag").join("snapshots"))
            }
        }
    }
}
