use anyhow::{Context, Result};
use std::path::Path;

/// Extract the text of every page of a PDF, one string per page.
pub fn extract_page_texts<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))
}
