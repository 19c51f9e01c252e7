use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recsplit")]
#[command(about = "Splits multi-record PDFs into renamed per-record files with a CSV summary")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split every page into its own PDF named from the page's fields
    #[command(alias = "burst")]
    Split {
        /// PDF files or directories to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Merge pages sharing a name and identifier into one PDF per record
    Group {
        /// PDF files or directories to process
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// List the PDF files a run would process, in order
    Ls {
        /// PDF files or directories to inspect
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}
