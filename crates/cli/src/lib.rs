pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "stockbot",
    about = "Stockbot operator CLI",
    long_about = "Inspect configuration, check runtime readiness, and replay inventory command scripts.",
    after_help = "Examples:\n  stockbot doctor --json\n  stockbot config\n  stockbot replay commands.txt"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Read configuration from this file instead of stockbot.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, Slack token readiness, and run an inventory self-check")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run a file of console-format commands against a fresh inventory")]
    Replay {
        #[arg(help = "Path to a file with one command per line, e.g. `/add_product Widget 2 A1 A2`")]
        path: PathBuf,
        #[arg(long, help = "Reject serial numbers that are already recorded for the item")]
        enforce_unique_serials: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Command::Config => commands::config::run(config_path),
        Command::Doctor { json } => commands::doctor::run(config_path, json),
        Command::Replay { path, enforce_unique_serials } => {
            commands::replay::run(&path, enforce_unique_serials)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
