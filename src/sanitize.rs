use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

const MAX_LEN: usize = 150;

/// Turn arbitrary text into a filename-safe token: ASCII-transliterate by
/// NFKD decomposition, replace anything outside `[A-Za-z0-9_-]` with an
/// underscore, and cap the length at 150.
pub fn sanitize(text: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_re = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap());

    // NFKD splits accented letters into base + combining mark; keeping only
    // ASCII drops the marks (and anything with no ASCII decomposition).
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();

    let mut safe = unsafe_re.replace_all(&ascii, "_").into_owned();
    // All ASCII by now, so the byte cap cannot split a character.
    safe.truncate(MAX_LEN);
    safe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_accents() {
        assert_eq!(sanitize("João Conceição"), "Joao_Conceicao");
    }

    #[test]
    fn test_replaces_unsafe_chars() {
        assert_eq!(sanitize("a/b\\c:d e.pdf"), "a_b_c_d_e_pdf");
    }

    #[test]
    fn test_keeps_safe_chars() {
        assert_eq!(sanitize("Maria_Silva-123"), "Maria_Silva-123");
    }

    #[test]
    fn test_caps_length() {
        let long = "x".repeat(400);
        assert_eq!(sanitize(&long).len(), 150);
    }

    #[test]
    fn test_idempotent() {
        for input in ["Maria Silva", "josé!", "já__sanitized-1", "", "ação: 12/03"] {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_output_charset() {
        for input in ["çãü é", "tab\there", "emoji 🙂 end", "trailing…"] {
            let out = sanitize(input);
            assert!(out.len() <= 150);
            assert!(out
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
        }
    }
}
