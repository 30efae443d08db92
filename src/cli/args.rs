//! CLI argument parsing using clap: the `Cli`/`Commands` surface spec.md §6
//! names (`init`, `extract`, `config`).

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Parser, Subcommand,
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(name = "ckg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Code knowledge graph extraction for C source trees")]
#[command(styles = clap_cargo_style())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a default .ckg/settings.toml
    Init {
        /// Force overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Extract, or incrementally update, a knowledge graph
    Extract {
        /// Root of the C source tree to scan
        source: PathBuf,

        /// Directory the graph snapshot is written to and read from
        output: PathBuf,

        /// Force a full extraction even if a prior snapshot exists
        #[arg(short, long)]
        force: bool,

        /// Number of parallel extraction threads (overrides config)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Show the effective, layered configuration
    Config,
}
