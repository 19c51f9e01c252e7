use regex::Regex;
use std::sync::OnceLock;

/// Fields extracted from one page of text. Every field has a default, so
/// extraction is total: a page that matches nothing still yields a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Declarant name with internal spaces replaced by underscores,
    /// `"desconhecido"` when absent.
    pub name: String,
    /// Registration number digits, `"sem_matricula"` when absent.
    pub identifier: String,
    /// `YYYY-MM-DD`, `"0000-00-00"` when absent.
    pub date: String,
    /// `HH-MM`, `"00-00"` when absent.
    pub time: String,
}

pub fn extract_record(text: &str) -> PageRecord {
    static NAME: OnceLock<Regex> = OnceLock::new();
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    static STAMP: OnceLock<Regex> = OnceLock::new();

    let name_re = NAME.get_or_init(|| Regex::new(r"Eu, ([A-Za-zÀ-ÿ0-9 ]+)").unwrap());
    let identifier_re = IDENTIFIER.get_or_init(|| Regex::new(r"(?i)matricula\s+(\d+)").unwrap());
    let stamp_re =
        STAMP.get_or_init(|| Regex::new(r"\b(\d{2}/\d{2}/\d{4})\s+(\d{2}:\d{2})").unwrap());

    let name = name_re
        .captures(text)
        .map(|c| c[1].trim().replace(' ', "_"))
        .unwrap_or_else(|| "desconhecido".to_string());

    let identifier = identifier_re
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "sem_matricula".to_string());

    let (date, time) = match stamp_re.captures(text) {
        Some(c) => (format_date(&c[1]), c[2].replace(':', "-")),
        None => ("0000-00-00".to_string(), "00-00".to_string()),
    };

    PageRecord {
        name,
        identifier,
        date,
        time,
    }
}

/// Reorder `DD/MM/YYYY` into `YYYY-MM-DD` so dates sort chronologically.
fn format_date(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('/').collect();
    match parts.as_slice() {
        [day, month, year] => format!("{year}-{month}-{day}"),
        _ => raw.to_string(),
    }
}

/// Capture the free-text block following a "Descrição" line: every trimmed
/// line until a blank line or a line starting with three digits, joined with
/// underscores. `"sem_descricao"` when the block is missing or empty.
pub fn extract_description(text: &str) -> String {
    static STOP: OnceLock<Regex> = OnceLock::new();
    let stop_re = STOP.get_or_init(|| Regex::new(r"^\d{3}").unwrap());

    let mut captured = Vec::new();
    let mut capture = false;
    for line in text.lines() {
        if !capture {
            if line.contains("Descrição") {
                capture = true;
            }
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || stop_re.is_match(trimmed) {
            break;
        }
        captured.push(trimmed.replace(' ', "_"));
    }

    if captured.is_empty() {
        "sem_descricao".to_string()
    } else {
        captured.join("_")
    }
}
