use crate::splitter::SplitMode;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn run(inputs: &[PathBuf], output_dir: &Path) -> Result<()> {
    super::run_with_progress(inputs, output_dir, SplitMode::PerPage)
}
