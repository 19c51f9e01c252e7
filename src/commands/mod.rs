pub mod group;
pub mod ls;
pub mod split;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::splitter::{self, SplitMode};

/// Shared shell for both split modes: expand the input selection, drive a
/// progress bar from the core's page counter, and report the outcome.
fn run_with_progress(inputs: &[PathBuf], output_dir: &Path, mode: SplitMode) -> Result<()> {
    let paths = splitter::collect_input_paths(inputs)?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")?
            .progress_chars("=> "),
    );

    let summary = splitter::run(&paths, output_dir, mode, |done, total| {
        if bar.length() != Some(u64::from(total)) {
            bar.set_length(u64::from(total));
        }
        bar.set_position(u64::from(done));
    })?;
    bar.finish_and_clear();

    println!(
        "Processed {} page(s) into {}",
        summary.pages_processed,
        output_dir.display()
    );
    println!("Ledger written to {}", summary.ledger_path.display());

    Ok(())
}
