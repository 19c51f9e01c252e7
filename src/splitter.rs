use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::fields::{self, PageRecord};
use crate::ledger::{self, GroupRow, PageRow};
use crate::pdf::{self, OutputDocument, PdfDocument};
use crate::sanitize::sanitize;

/// Aggregation policy: one output per page, or one output per
/// (name, identifier) pair spanning every page that matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    PerPage,
    Grouped,
}

#[derive(Debug)]
pub struct RunSummary {
    pub pages_processed: u32,
    pub ledger_path: PathBuf,
}

/// Expand the user's selection into concrete PDF paths: files pass through
/// untouched, directories are walked in file-name order for `.pdf` entries.
pub fn collect_input_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory: {}", input.display()))?;
                if entry.file_type().is_file() && is_pdf(entry.path()) {
                    paths.push(entry.into_path());
                }
            }
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Process every page of every input in order, write one renamed PDF per
/// record to `output_dir`, and finish with the CSV ledger. `progress` is
/// advisory: called with (pages done, total pages) after each page.
pub fn run(
    inputs: &[PathBuf],
    output_dir: &Path,
    mode: SplitMode,
    mut progress: impl FnMut(u32, u32),
) -> Result<RunSummary> {
    if inputs.is_empty() {
        anyhow::bail!("No input PDFs selected");
    }
    if output_dir.as_os_str().is_empty() {
        anyhow::bail!("No destination directory selected");
    }

    // Open everything up front: unreadable inputs fail the run before any
    // output exists, and the page total gives the progress ceiling.
    let sources = inputs
        .iter()
        .map(|path| SourceDocument::open(path))
        .collect::<Result<Vec<_>>>()?;
    let total_pages: u32 = sources.iter().map(SourceDocument::page_count).sum();

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let ledger_path = output_dir.join(ledger::LEDGER_FILE);
    let pages_processed = match mode {
        SplitMode::PerPage => {
            let (rows, processed) =
                split_per_page(&sources, output_dir, total_pages, &mut progress)?;
            ledger::write_page_ledger(&ledger_path, &rows)?;
            processed
        }
        SplitMode::Grouped => {
            let (rows, processed) =
                split_grouped(&sources, output_dir, total_pages, &mut progress)?;
            ledger::write_group_ledger(&ledger_path, &rows)?;
            processed
        }
    };

    Ok(RunSummary {
        pages_processed,
        ledger_path,
    })
}

/// An input PDF together with its per-page text. `texts` may be shorter than
/// the page count when the text extractor disagrees with the page tree;
/// missing entries read as empty text and extract to an all-defaults record.
struct SourceDocument {
    pdf: PdfDocument,
    texts: Vec<String>,
}

impl SourceDocument {
    fn open(path: &Path) -> Result<Self> {
        let pdf = PdfDocument::open(path)?;
        let texts = pdf::text::extract_page_texts(path)?;
        Ok(SourceDocument { pdf, texts })
    }

    fn page_count(&self) -> u32 {
        self.pdf.page_count()
    }

    fn page_text(&self, page: u32) -> &str {
        self.texts
            .get((page - 1) as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn extract_page(&self, page: u32) -> Result<lopdf::Document> {
        self.pdf.extract_pages(&[page])
    }
}

fn page_filename(record: &PageRecord, description: &str) -> String {
    format!(
        "{}__{}__{}_{}__{}.pdf",
        sanitize(&record.name),
        sanitize(&record.identifier),
        record.date,
        record.time,
        sanitize(description)
    )
}

fn group_filename(name: &str, identifier: &str, start: &str, end: &str) -> String {
    format!(
        "{}__{}__{}_a_{}.pdf",
        sanitize(name),
        sanitize(identifier),
        start,
        end
    )
}

fn split_per_page(
    sources: &[SourceDocument],
    output_dir: &Path,
    total_pages: u32,
    progress: &mut impl FnMut(u32, u32),
) -> Result<(Vec<PageRow>, u32)> {
    let mut rows = Vec::new();
    let mut processed = 0;

    for source in sources {
        for page in 1..=source.page_count() {
            let text = source.page_text(page);
            let record = fields::extract_record(text);
            let description = fields::extract_description(text);

            let filename = page_filename(&record, &description);
            let mut output = OutputDocument::new();
            output.append(source.extract_page(page)?);
            output.save(output_dir.join(&filename))?;

            rows.push(PageRow::new(&record, &description, filename));
            processed += 1;
            progress(processed, total_pages);
        }
    }

    Ok((rows, processed))
}

/// Accumulator for one (name, identifier) key. The page count always equals
/// the number of pages appended to the document.
#[derive(Default)]
struct OutputGroup {
    document: OutputDocument,
    dates: Vec<String>,
    page_count: u32,
}

impl OutputGroup {
    fn append(&mut self, page: lopdf::Document, date: String) {
        self.document.append(page);
        self.dates.push(date);
        self.page_count += 1;
    }

    /// Earliest and latest date seen. Lexicographic order is chronological
    /// because dates are normalized to `YYYY-MM-DD` on extraction.
    fn date_range(&self) -> (String, String) {
        let mut dates = self.dates.clone();
        dates.sort();
        let start = dates
            .first()
            .cloned()
            .unwrap_or_else(|| "0000-00-00".to_string());
        let end = dates
            .last()
            .cloned()
            .unwrap_or_else(|| "0000-00-00".to_string());
        (start, end)
    }
}

fn split_grouped(
    sources: &[SourceDocument],
    output_dir: &Path,
    total_pages: u32,
    progress: &mut impl FnMut(u32, u32),
) -> Result<(Vec<GroupRow>, u32)> {
    // Keyed by the raw (pre-sanitization) name and identifier. A later input
    // may still extend any group, so nothing is finalized until the full
    // pass is done. BTreeMap keeps the finalization order deterministic.
    let mut groups: BTreeMap<(String, String), OutputGroup> = BTreeMap::new();
    let mut processed = 0;

    for source in sources {
        for page in 1..=source.page_count() {
            let record = fields::extract_record(source.page_text(page));
            let key = (record.name, record.identifier);

            let group = groups.entry(key).or_default();
            group.append(source.extract_page(page)?, record.date);
            processed += 1;
            progress(processed, total_pages);
        }
    }

    let mut rows = Vec::with_capacity(groups.len());
    for ((name, identifier), group) in groups {
        let (start, end) = group.date_range();
        let filename = group_filename(&name, &identifier, &start, &end);

        group.document.save(output_dir.join(&filename))?;
        rows.push(GroupRow::new(
            &name,
            &identifier,
            start,
            end,
            group.page_count,
            filename,
        ));
    }

    Ok((rows, processed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::document::fixture_document;

    fn source(texts: &[&str]) -> SourceDocument {
        SourceDocument {
            pdf: PdfDocument {
                doc: fixture_document(texts.len() as u32),
                path: "fixture.pdf".to_string(),
            },
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("recsplit_{}_{}", name, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn saved_pdfs(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".pdf"))
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_page_filename_shape() {
        let record = fields::extract_record("Eu, Maria Silva, matricula 48213, 12/03/2024 09:15");
        let name = page_filename(&record, "limpeza do setor");
        assert_eq!(
            name,
            "Maria_Silva__48213__2024-03-12_09-15__limpeza_do_setor.pdf"
        );
    }

    #[test]
    fn test_group_filename_shape() {
        let name = group_filename("José Único", "12", "2024-01-02", "2024-02-01");
        assert_eq!(name, "Jose_Unico__12__2024-01-02_a_2024-02-01.pdf");
    }

    #[test]
    fn test_per_page_one_output_per_page() {
        let dir = scratch_dir("per_page");
        let sources = vec![source(&[
            "Eu, Ana Lima com matricula 1, em 01/01/2024 08:00",
            "Eu, Bia Reis com matricula 2, em 02/01/2024 09:30",
            "Eu, Caio Luz com matricula 3, em 03/01/2024 10:45",
        ])];

        let mut calls = Vec::new();
        let (rows, processed) =
            split_per_page(&sources, &dir, 3, &mut |done, total| calls.push((done, total)))
                .unwrap();

        assert_eq!(processed, 3);
        assert_eq!(rows.len(), 3);
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(saved_pdfs(&dir).len(), 3);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_grouped_merges_across_documents() {
        let dir = scratch_dir("grouped_merge");
        let sources = vec![
            source(&["Eu, Ana Lima com matricula 1, em 12/03/2024 09:15"]),
            source(&["Eu, Ana Lima com matricula 1, em 01/02/2024 07:00"]),
        ];

        let (rows, processed) = split_grouped(&sources, &dir, 2, &mut |_, _| {}).unwrap();

        assert_eq!(processed, 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_paginas, 2);
        assert_eq!(rows[0].data_inicio, "2024-02-01");
        assert_eq!(rows[0].data_fim, "2024-03-12");
        assert_eq!(rows[0].nome, "Ana Lima com matricula 1");
        assert_eq!(
            saved_pdfs(&dir),
            vec!["Ana_Lima_com_matricula_1__1__2024-02-01_a_2024-03-12.pdf".to_string()]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_grouped_distinct_keys_degenerate_to_one_group_per_page() {
        let dir = scratch_dir("grouped_distinct");
        let sources = vec![source(&[
            "Eu, Ana Lima, matricula 1, 01/01/2024 08:00",
            "Eu, Bia Reis, matricula 2, 02/01/2024 09:00",
        ])];

        let (rows, _) = split_grouped(&sources, &dir, 2, &mut |_, _| {}).unwrap();

        assert_eq!(rows.len(), 2);
        let names = saved_pdfs(&dir);
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.contains("_a_")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_group_accumulator_invariant() {
        let mut group = OutputGroup::default();
        let doc = PdfDocument {
            doc: fixture_document(2),
            path: "fixture.pdf".to_string(),
        };
        group.append(doc.extract_pages(&[1]).unwrap(), "2024-05-01".to_string());
        group.append(doc.extract_pages(&[2]).unwrap(), "2024-04-30".to_string());

        assert_eq!(group.page_count, 2);
        assert_eq!(group.page_count, group.document.page_count());
        assert_eq!(
            group.date_range(),
            ("2024-04-30".to_string(), "2024-05-01".to_string())
        );
    }

    #[test]
    fn test_run_rejects_empty_inputs_before_io() {
        let dir = std::env::temp_dir().join(format!("recsplit_untouched_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        let result = run(&[], &dir, SplitMode::PerPage, |_, _| {});
        assert!(result.is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn test_run_rejects_empty_destination() {
        let result = run(
            &[PathBuf::from("somewhere.pdf")],
            Path::new(""),
            SplitMode::Grouped,
            |_, _| {},
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_run_fails_on_unreadable_input() {
        let dir = std::env::temp_dir().join(format!("recsplit_unreadable_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        let missing = PathBuf::from("/nonexistent/recsplit/input.pdf");
        let result = run(&[missing], &dir, SplitMode::PerPage, |_, _| {});
        assert!(result.is_err());
        // Failed before the destination was created
        assert!(!dir.exists());
    }

    #[test]
    fn test_collect_input_paths_walks_directories() {
        let dir = scratch_dir("collect");
        std::fs::write(dir.join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.join("a.PDF"), b"x").unwrap();
        std::fs::write(dir.join("notes.txt"), b"x").unwrap();

        let found = collect_input_paths(&[dir.clone()]).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_collect_input_paths_passes_files_through() {
        let input = PathBuf::from("reports/january.pdf");
        let found = collect_input_paths(&[input.clone()]).unwrap();
        assert_eq!(found, vec![input]);
    }
}
