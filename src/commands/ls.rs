use crate::splitter;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(inputs: &[PathBuf]) -> Result<()> {
    for path in splitter::collect_input_paths(inputs)? {
        println!("{}", path.display());
    }
    Ok(())
}
