pub mod check;
pub mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "credmap")]
#[command(about = "A deterministic planner for network-monitoring credentials.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a rules file into its final credential partition
    #[command(alias = "r")]
    Resolve { rules: PathBuf },
    /// Parse and dry-run a rules file without printing the full plan
    #[command(alias = "c")]
    Check { rules: PathBuf },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
