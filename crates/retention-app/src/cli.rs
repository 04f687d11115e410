// Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::report::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "retention")]
#[command(about = "Player retention grades for a recreational league season", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grade every player for the season
    Grade {
        /// Directory holding defaults/ and config/
        #[arg(long, env = "RETENTION_BASE_DIR", default_value = ".")]
        base_dir: PathBuf,

        /// Output format (defaults to the one in league.toml)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only report players on this team
        #[arg(long)]
        team: Option<String>,
    },

    /// Print the regular-season standings with tiebreakers applied
    Standings {
        /// Directory holding defaults/ and config/
        #[arg(long, env = "RETENTION_BASE_DIR", default_value = ".")]
        base_dir: PathBuf,
    },
}
