//! OCR transcript model and text matching helpers.
//!
//! Extraction operates on an ordered sequence of lines; order matters because
//! context-window rules scan the lines after an anchor. All signature and
//! keyword matching happens on a diacritic-folded, uppercased view so that
//! OCR output with or without accents matches the same rule tables.

use serde::{Deserialize, Serialize};

/// The OCR transcript of one document image.
///
/// Immutable input to the pipeline; produced by the external OCR collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawText {
    lines: Vec<String>,
}

impl RawText {
    /// Build from pre-split lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Ordered lines of the transcript.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whole transcript joined with newlines.
    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    /// True when no line contains any non-whitespace character.
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Line count.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        Self {
            lines: text.lines().map(|l| l.to_string()).collect(),
        }
    }
}

/// Fold a string for rule matching: uppercase ASCII with accents stripped.
///
/// Only the Latin-1 accented letters that occur in Brazilian documents are
/// mapped; anything else passes through uppercased.
pub fn fold_for_match(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'ê' | 'è' | 'ë' | 'É' | 'Ê' | 'È' | 'Ë' => 'E',
            'í' | 'î' | 'ì' | 'ï' | 'Í' | 'Î' | 'Ì' | 'Ï' => 'I',
            'ó' | 'ô' | 'õ' | 'ò' | 'ö' | 'Ó' | 'Ô' | 'Õ' | 'Ò' | 'Ö' => 'O',
            'ú' | 'û' | 'ù' | 'ü' | 'Ú' | 'Û' | 'Ù' | 'Ü' => 'U',
            'ç' | 'Ç' => 'C',
            'ñ' | 'Ñ' => 'N',
            _ => c.to_ascii_uppercase(),
        })
        .collect()
}

/// True when the folded haystack contains the folded needle.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_for_match(haystack).contains(&fold_for_match(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_preserves_order() {
        let text = RawText::from("REGISTRO GERAL\nNome\nMaria");
        assert_eq!(text.len(), 3);
        assert_eq!(text.lines()[0], "REGISTRO GERAL");
        assert_eq!(text.lines()[2], "Maria");
    }

    #[test]
    fn test_fold_strips_diacritics() {
        assert_eq!(fold_for_match("Saúde"), "SAUDE");
        assert_eq!(fold_for_match("república"), "REPUBLICA");
        assert_eq!(fold_for_match("SulAmérica"), "SULAMERICA");
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Bradesco Saúde", "SAUDE"));
        assert!(contains_folded("SECRETARIA DE SEGURANCA", "Segurança"));
        assert!(!contains_folded("texto qualquer", "UNIMED"));
    }

    #[test]
    fn test_blank_detection() {
        assert!(RawText::from("  \n\t\n").is_blank());
        assert!(!RawText::from("x").is_blank());
    }
}
