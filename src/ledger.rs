use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::path::Path;

use crate::fields::PageRecord;

/// Name of the summary file written next to the output PDFs.
pub const LEDGER_FILE: &str = "resumo_das_paginas.csv";

const PAGE_HEADER: [&str; 6] = ["Nome", "Matrícula", "Data", "Hora", "Descrição", "Arquivo"];
const GROUP_HEADER: [&str; 6] = [
    "Nome",
    "Matrícula",
    "Data Início",
    "Data Fim",
    "Total de Páginas",
    "Arquivo",
];

/// One per-page ledger row. Display fields restore the characters the
/// filename pipeline flattened: underscores back to spaces, hyphens in the
/// time back to colons.
#[derive(Debug, Clone, Serialize)]
pub struct PageRow {
    pub nome: String,
    pub matricula: String,
    pub data: String,
    pub hora: String,
    pub descricao: String,
    pub arquivo: String,
}

impl PageRow {
    pub fn new(record: &PageRecord, description: &str, filename: String) -> Self {
        PageRow {
            nome: record.name.replace('_', " "),
            matricula: record.identifier.clone(),
            data: record.date.clone(),
            hora: record.time.replace('-', ":"),
            descricao: description.replace('_', " "),
            arquivo: filename,
        }
    }
}

/// One per-group ledger row, emitted after the group's document is saved.
#[derive(Debug, Clone, Serialize)]
pub struct GroupRow {
    pub nome: String,
    pub matricula: String,
    pub data_inicio: String,
    pub data_fim: String,
    pub total_paginas: u32,
    pub arquivo: String,
}

impl GroupRow {
    pub fn new(
        name: &str,
        identifier: &str,
        start: String,
        end: String,
        total_pages: u32,
        filename: String,
    ) -> Self {
        GroupRow {
            nome: name.replace('_', " "),
            matricula: identifier.to_string(),
            data_inicio: start,
            data_fim: end,
            total_paginas: total_pages,
            arquivo: filename,
        }
    }
}

pub fn write_page_ledger<P: AsRef<Path>>(path: P, rows: &[PageRow]) -> Result<()> {
    write_ledger(path.as_ref(), &PAGE_HEADER, rows)
}

pub fn write_group_ledger<P: AsRef<Path>>(path: P, rows: &[GroupRow]) -> Result<()> {
    write_ledger(path.as_ref(), &GROUP_HEADER, rows)
}

fn write_ledger<R: Serialize>(path: &Path, header: &[&str], rows: &[R]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create ledger: {}", path.display()))?;

    // Header is written even when there are no rows
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write ledger: {}", path.display()))?;
    Ok(())
}
