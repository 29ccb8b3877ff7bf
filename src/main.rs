use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use pcdiag::commands;
use pcdiag::ui;

fn config_key_commands(with_value: bool) -> Vec<Command> {
    let keys = [
        ("script", "Health-check script launched by 'pcdiag scan'"),
        ("output", "Directory receiving reports and final snapshots"),
        ("timeout", "Script timeout in seconds"),
        ("interpreter", "Program that runs the script (e.g. powershell.exe)"),
    ];

    keys.iter()
        .map(|(name, about)| {
            let cmd = Command::new(*name).about(*about);
            if with_value {
                cmd.arg(
                    Arg::new("value")
                        .help("New value")
                        .required(true)
                        .index(1),
                )
            } else {
                cmd
            }
        })
        .collect()
}

fn build_cli() -> Command {
    Command::new("pcdiag")
        .version(env!("CARGO_PKG_VERSION"))
        .about("PC diagnostics: hardware probe and health-check snapshot merger")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("probe")
                .about("Read hardware sensors and print a snapshot")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the snapshot as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("Also write the JSON snapshot to FILE"),
                ),
        )
        .subcommand(
            Command::new("merge")
                .about("Probe hardware and merge the result into an existing JSON report")
                .arg(
                    Arg::new("source")
                        .help("JSON report written by the health-check script")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('d')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Directory for Snapshot_Final_<run>.json (default: next to SOURCE)"),
                )
                .arg(
                    Arg::new("run-id")
                        .long("run-id")
                        .value_name("ID")
                        .help("Run identifier used in the output file name"),
                ),
        )
        .subcommand(
            Command::new("scan")
                .about("Run the health-check script, probe hardware and write the final snapshot")
                .arg(
                    Arg::new("script")
                        .short('s')
                        .long("script")
                        .value_name("FILE")
                        .help("Script to run instead of the configured one"),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('d')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Output directory instead of the configured one"),
                )
                .arg(
                    Arg::new("timeout")
                        .short('t')
                        .long("timeout")
                        .value_name("SECS")
                        .help("Script timeout in seconds")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("run-id")
                        .long("run-id")
                        .value_name("ID")
                        .help("Run identifier (default: current UTC timestamp)"),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Set configuration values (use 'pcdiag set --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommands(config_key_commands(true)),
        )
        .subcommand(
            Command::new("get")
                .about("Get configuration values (use 'pcdiag get --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommands(config_key_commands(false))
                .subcommand(Command::new("all").about("Show every configuration value")),
        )
        .subcommand(Command::new("version").about("Shows version information"))
}

fn run() -> Result<()> {
    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("probe", sub_matches)) => commands::probe(sub_matches),
        Some(("merge", sub_matches)) => commands::merge(sub_matches),
        Some(("scan", sub_matches)) => commands::scan(sub_matches),
        Some(("set", sub_matches)) => commands::config::handle_set(sub_matches),
        Some(("get", sub_matches)) => commands::config::handle_get(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => {
            println!("Use 'pcdiag --help' for more information.");
            Ok(())
        }
    }
}

fn main() {
    pcdiag::init_logging();

    if let Err(e) = run() {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
