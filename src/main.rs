use clap::Parser;

use ckg::cli::commands::{extract, init};
use ckg::cli::{Cli, Commands};
use ckg::config::Settings;

fn main() {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Init { .. }) {
        if let Err(warning) = Settings::check_init() {
            eprintln!("Warning: {warning}");
            eprintln!("Using default configuration for now.");
        }
    }

    match cli.command {
        Commands::Init { force } => init::run_init(force),

        Commands::Config => {
            let config = Settings::load().unwrap_or_else(|e| {
                eprintln!("Configuration error: {e}");
                Settings::default()
            });
            init::run_config(&config);
        }

        Commands::Extract { source, output, force, threads } => {
            extract::run_extract(&source, &output, force, threads);
        }
    }
}
