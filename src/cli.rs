use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the segments a set of cut points would produce
    Plan {
        /// Source media file
        #[arg(short, long)]
        input: PathBuf,

        /// Cut points in seconds (comma-separated)
        #[arg(short = 't', long)]
        cuts: String,
    },

    /// Cut a source file into part files, reconciling earlier outputs
    Cut {
        /// Source media file
        #[arg(short, long)]
        input: PathBuf,

        /// Cut points in seconds (comma-separated)
        #[arg(short = 't', long)]
        cuts: String,

        /// Base name for part files (defaults to the source file stem)
        #[arg(short, long)]
        base_name: Option<String>,

        /// Confirm deletion of orphans and overwriting of existing parts
        #[arg(short, long)]
        yes: bool,
    },

    /// Report subtitle completeness per language
    Status {
        /// Directory containing the part files
        #[arg(short, long)]
        dir: PathBuf,

        /// Base name of the part files
        #[arg(short, long)]
        base_name: String,
    },

    /// Merge per-segment subtitles into one file per language
    Merge {
        /// Directory containing the part files
        #[arg(short, long)]
        dir: PathBuf,

        /// Base name of the part files
        #[arg(short, long)]
        base_name: String,

        /// Languages to merge (comma-separated; defaults to configuration)
        #[arg(short, long)]
        langs: Option<String>,

        /// Confirm overwriting of existing merged files
        #[arg(short, long)]
        yes: bool,
    },
}
