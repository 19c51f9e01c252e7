mod cli;
mod commands;
mod fields;
mod ledger;
mod pdf;
mod sanitize;
mod splitter;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split { inputs, output_dir } => {
            commands::split::run(&inputs, &output_dir)?;
        }
        Commands::Group { inputs, output_dir } => {
            commands::group::run(&inputs, &output_dir)?;
        }
        Commands::Ls { inputs } => {
            commands::ls::run(&inputs)?;
        }
    }

    Ok(())
}
