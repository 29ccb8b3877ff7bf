use crate::core::hardware::{HardwareSnapshot, ProbeStatus};
use crate::core::scan::ScanOutcome;
use colored::*;

pub fn format_snapshot(snapshot: &HardwareSnapshot) {
    println!("\n{}", "HARDWARE PROBE".bold().bright_cyan());
    println!("{}", "=".repeat(80));
    println!(
        "  Status: {}   ({})",
        status_label(snapshot.status),
        snapshot.timestamp_utc.format("%Y-%m-%d %H:%M:%S UTC")
    );

    print_section_header("Motherboard");
    println!("  Vendor: {}", text_or_na(snapshot.motherboard.vendor.as_deref()));
    println!("  Model: {}", text_or_na(snapshot.motherboard.model.as_deref()));
    println!("  Serial: {}", text_or_na(snapshot.motherboard.serial.as_deref()));

    print_section_header("CPU");
    println!("  Temperature: {}", format_temperature(snapshot.cpu.temperature_c));

    print_section_header("GPU");
    let gpu = &snapshot.gpu;
    println!("  Name: {}", text_or_na(gpu.name.as_deref()));
    println!("  Temperature: {}", format_temperature(gpu.temperature_c));
    println!(
        "  Load: {}",
        gpu.load_percent
            .map(|l| format!("{:.1}%", l))
            .unwrap_or_else(|| "N/A".dimmed().to_string())
    );
    println!("  VRAM: {}", format_vram(gpu.vram_used_mb, gpu.vram_total_mb));

    if !snapshot.storage.is_empty() {
        print_section_header("Storage");
        for drive in &snapshot.storage {
            println!(
                "  {}: {}",
                text_or_na(drive.model.as_deref()),
                format_temperature(drive.temperature_c)
            );
        }
    }

    if !snapshot.fans.is_empty() {
        print_section_header("Fans");
        for fan in &snapshot.fans {
            let rpm = fan
                .rpm
                .map(|r| format!("{} RPM", r))
                .unwrap_or_else(|| "N/A".dimmed().to_string());
            println!("  {}: {}", text_or_na(fan.name.as_deref()), rpm);
        }
    }

    if !snapshot.errors.is_empty() {
        print_section_header("Issues");
        for error in &snapshot.errors {
            println!("  {} {}", "!".yellow().bold(), error);
        }
    }

    println!();
}

pub fn format_scan_outcome(outcome: &ScanOutcome) {
    println!("\n{}", "SCAN COMPLETE".bold().bright_cyan());
    println!("{}", "=".repeat(80));
    println!("  Run: {}", outcome.run_id.cyan());
    println!(
        "  Script exit code: {}",
        outcome
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "terminated".to_string())
    );
    println!("  Hardware probe: {}", status_label(outcome.probe_status));
    println!("  Script report: {}", outcome.report_path.display());
    println!(
        "  Final snapshot: {}",
        outcome.final_path.display().to_string().green().bold()
    );
    println!();
}

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

pub fn status_label(status: ProbeStatus) -> ColoredString {
    match status {
        ProbeStatus::Ok => "OK".green().bold(),
        ProbeStatus::Warn => "WARN".yellow().bold(),
        ProbeStatus::Error => "ERROR".red().bold(),
    }
}

fn text_or_na(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".dimmed().to_string(),
    }
}

pub fn format_temperature(value: Option<f64>) -> String {
    match value {
        Some(t) => format!("{:.1} °C", t),
        None => "N/A".to_string(),
    }
}

pub fn format_vram(used: Option<u64>, total: Option<u64>) -> String {
    match (used, total) {
        (Some(used), Some(total)) => format!("{} / {} MB", used, total),
        (None, Some(total)) => format!("? / {} MB", total),
        (Some(used), None) => format!("{} MB used", used),
        (None, None) => "N/A".to_string(),
    }
}
