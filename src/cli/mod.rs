//! CLI interface for goldfeed
//!
//! Provides subcommands for:
//! - `run`: Stream quotes, score them and serve subscribers
//! - `decode`: Decode captured upstream messages offline
//! - `config`: Show the effective configuration

mod decode;
mod run;

pub use decode::{DecodeArgs, DecodeSummary};
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "goldfeed")]
#[command(about = "Live gold quote signals fanned out over WebSocket")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream quotes, score them and serve subscribers
    Run(RunArgs),
    /// Decode captured upstream messages (one per line)
    Decode(DecodeArgs),
    /// Show the effective configuration
    Config,
}
