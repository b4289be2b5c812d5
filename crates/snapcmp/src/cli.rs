use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snapcmp::Precision;

#[derive(Parser)]
#[command(
    name = "snapcmp",
    about = "Compare captured UI snapshots against reference images"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .snapcmp/config.toml with default settings
    Init {
        /// Overwrite existing config and gitignore
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare two PNG files and write the difference artifacts (exit 0/1)
    Compare {
        /// Reference image (PNG)
        #[arg(long)]
        reference: PathBuf,
        /// Newly captured image (PNG)
        #[arg(long)]
        candidate: PathBuf,
        /// Fraction of bytes that must match (0.0–1.0, overrides config)
        #[arg(long)]
        precision: Option<Precision>,
        /// Directory to write reference/failure/difference PNGs to on mismatch
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare every captured snapshot with its reference (exit 0/1)
    Test {
        /// Only run snapshots whose name contains PATTERN (case-insensitive)
        #[arg(long, short = 'f')]
        filter: Option<String>,
        /// Fraction of bytes that must match (0.0–1.0, overrides config)
        #[arg(long)]
        precision: Option<Precision>,
        /// Overwrite references with the captured snapshots instead of comparing
        #[arg(long)]
        record: bool,
        /// Number of concurrent comparisons
        #[arg(long, short = 'p')]
        parallel: Option<usize>,
    },

    /// Promote failure/ snapshots to reference/
    Approve {
        /// Only approve snapshots whose name contains PATTERN (case-insensitive)
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Generate a visual review report (static HTML)
    Review {
        /// Open the report in the default browser
        #[arg(long)]
        open: bool,
    },
}
