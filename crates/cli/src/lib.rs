pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "agentdir",
    about = "Agent directory operator CLI",
    long_about = "Apply migrations, seed categories, submit listings and inspect runtime readiness.",
    after_help = "Examples:\n  agentdir migrate\n  agentdir submit listing.json\n  agentdir doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Insert the default category set; existing categories are left untouched")]
    Seed,
    #[command(about = "Validate and persist an agent listing read from a JSON file")]
    Submit {
        #[arg(help = "Path to a JSON document in the submission payload shape")]
        path: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, DB connectivity and schema readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Submit { path } => commands::submit::run(&path),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
