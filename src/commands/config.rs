use crate::core::Config;
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Configuration keys exposed through `pcdiag set` / `pcdiag get`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigKey {
    Script,
    Output,
    Timeout,
    Interpreter,
}

impl ConfigKey {
    const ALL: [ConfigKey; 4] = [
        ConfigKey::Script,
        ConfigKey::Output,
        ConfigKey::Timeout,
        ConfigKey::Interpreter,
    ];

    fn from_command(name: &str) -> Option<Self> {
        match name {
            "script" => Some(ConfigKey::Script),
            "output" => Some(ConfigKey::Output),
            "timeout" => Some(ConfigKey::Timeout),
            "interpreter" => Some(ConfigKey::Interpreter),
            _ => None,
        }
    }

    fn command(&self) -> &'static str {
        match self {
            ConfigKey::Script => "script",
            ConfigKey::Output => "output",
            ConfigKey::Timeout => "timeout",
            ConfigKey::Interpreter => "interpreter",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ConfigKey::Script => "Health-check script",
            ConfigKey::Output => "Output directory",
            ConfigKey::Timeout => "Script timeout (seconds)",
            ConfigKey::Interpreter => "Script interpreter",
        }
    }

    fn example(&self) -> &'static str {
        match self {
            ConfigKey::Script => "C:\\Tools\\HealthCheck.ps1",
            ConfigKey::Output => "C:\\Diagnostics\\snapshots",
            ConfigKey::Timeout => "600",
            ConfigKey::Interpreter => "pwsh.exe",
        }
    }

    fn apply(&self, config: &mut Config, value: &str) -> Result<()> {
        match self {
            ConfigKey::Script => config.set_script_path(resolve_path(value)?),
            ConfigKey::Output => config.set_output_dir(resolve_path(value)?),
            ConfigKey::Timeout => {
                config.timeout_secs = value
                    .trim()
                    .parse()
                    .with_context(|| format!("'{}' is not a number of seconds", value))?;
            }
            ConfigKey::Interpreter => config.interpreter = value.trim().to_string(),
        }
        Ok(())
    }

    fn read(&self, config: &Config) -> Option<String> {
        match self {
            ConfigKey::Script => config.get_script_path().cloned(),
            ConfigKey::Output => config.get_output_dir().cloned(),
            ConfigKey::Timeout => Some(config.timeout_secs.to_string()),
            ConfigKey::Interpreter => Some(config.interpreter.clone()),
        }
    }
}

pub fn handle_set(matches: &clap::ArgMatches) -> Result<()> {
    let Some((name, sub_matches)) = matches.subcommand() else {
        println!("Use 'pcdiag set --help' for more information.");
        return Ok(());
    };
    let key = ConfigKey::from_command(name).context("Unknown configuration key")?;
    let value = sub_matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load()?;
    set_value(&mut config, key, value)?;
    config.save()?;

    let stored = key.read(&config).unwrap_or_default();
    println!(
        "{} {}",
        format!("✓ {} set to:", key.label()).green(),
        stored
    );
    Ok(())
}

fn set_value(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    if key == ConfigKey::Script && !Path::new(value).is_file() {
        ui::warn(&format!("Script '{}' does not exist", value));
        ui::dimmed("The path will be saved but scans fail until it is created.");
    }
    key.apply(config, value)?;
    config.validate()
}

pub fn handle_get(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    match matches.subcommand() {
        Some(("all", _)) => {
            for key in ConfigKey::ALL {
                print_value(&config, key);
            }
            let output = config.resolved_output_dir()?;
            if config.get_output_dir().is_none() {
                ui::dimmed(&format!("  (snapshots go to {})", output.display()));
            }
            Ok(())
        }
        Some((name, _)) => {
            let key = ConfigKey::from_command(name).context("Unknown configuration key")?;
            print_value(&config, key);
            Ok(())
        }
        None => {
            println!("Use 'pcdiag get --help' for more information.");
            Ok(())
        }
    }
}

fn print_value(config: &Config, key: ConfigKey) {
    match key.read(config) {
        Some(value) => {
            println!("{}", format!("{}:", key.label()).white());
            println!("  {}", value.cyan().bold());
        }
        None => {
            println!("{}", format!("{}: not configured", key.label()).yellow());
            println!(
                "  {}",
                format!("pcdiag set {} {}", key.command(), key.example()).dimmed()
            );
        }
    }
}

/// Absolute form of `value` when it exists, the raw string otherwise.
fn resolve_path(value: &str) -> Result<String> {
    let path = Path::new(value);
    if !path.exists() {
        return Ok(value.to_string());
    }
    let canonical = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve path: {}", e))?;
    let text = canonical.to_string_lossy().to_string();
    Ok(text
        .strip_prefix("\\\\?\\")
        .map(str::to_string)
        .unwrap_or(text))
}
