//! Legacy monolithic extraction strategy.
//!
//! A single pass over the transcript with coarse, historically tuned
//! heuristics. It predates the modular pipeline and survives as the fallback
//! when the modern strategy reports low confidence: its rules are cruder but
//! occasionally salvage documents the pattern tables miss, such as
//! transcripts with no recognizable boilerplate at all.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::ExtractionStrategy;
use crate::models::record::{DocumentType, ExtractedRecord, ExtractionMethod, Sex};
use crate::rules::validate_cpf;
use crate::text::{fold_for_match, RawText};

lazy_static! {
    static ref LEGACY_DATE: Regex = Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").unwrap();
    static ref LEGACY_SEX: Regex = Regex::new(r"SEXO\s*[:.]?\s*([MF])\b").unwrap();
    static ref LEGACY_PLAN: Regex = Regex::new(r"PLANO\s*[:.]?\s*(.{3,40})").unwrap();
}

/// Identity keywords the legacy pass recognizes.
const LEGACY_IDENTITY_KEYWORDS: &[&str] = &["REGISTRO GERAL", "IDENTIDADE"];

/// Issuer keywords, mapped to the names the old code reported.
const LEGACY_ISSUER_KEYWORDS: &[(&str, &str)] = &[
    ("UNIMED", "Unimed"),
    ("BRADESCO", "Bradesco Saúde"),
    ("AMIL", "Amil"),
    ("SULAMERICA", "SulAmérica"),
    ("HAPVIDA", "Hapvida"),
    ("INTERMEDICA", "NotreDame Intermédica"),
];

/// Tokens that disqualify a line from being read as a person's name.
const LEGACY_NAME_STOPWORDS: &[&str] = &[
    "REGISTRO", "IDENTIDADE", "SECRETARIA", "REPUBLICA", "NASCIMENTO", "NATURALIDADE",
    "FILIACAO", "VALIDADE", "PLANO", "BENEFICIARIO", "UNIMED", "BRADESCO", "AMIL",
    "SULAMERICA", "HAPVIDA", "INTERMEDICA", "SAUDE",
];

pub struct LegacyStrategy;

impl ExtractionStrategy for LegacyStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn run(&self, text: &RawText) -> ExtractedRecord {
        let mut record = ExtractedRecord::default();
        record.method = ExtractionMethod::Legacy;

        let folded_all = fold_for_match(&text.joined());

        if LEGACY_IDENTITY_KEYWORDS.iter().any(|kw| folded_all.contains(kw)) {
            record.document_type = DocumentType::Identity;
        } else if let Some((_, issuer)) = LEGACY_ISSUER_KEYWORDS
            .iter()
            .find(|(kw, _)| folded_all.contains(kw))
        {
            record.document_type = DocumentType::InsuranceCard;
            record.issuer_name = Some(issuer.to_string());
        }

        for line in text.lines() {
            let folded = fold_for_match(line);
            let digits: String = line.chars().filter(|c| c.is_ascii_digit()).collect();

            if record.national_id.is_none() && digits.len() == 11 && validate_cpf(&digits) {
                record.national_id = Some(digits.clone());
            }

            if record.card_number.is_none() && (15..=20).contains(&digits.len()) {
                record.card_number = Some(digits.clone());
            }

            if record.birth_date.is_none() {
                if let Some(caps) = LEGACY_DATE.captures(line) {
                    let day = caps[1].parse().unwrap_or(0);
                    let month = caps[2].parse().unwrap_or(0);
                    let year = caps[3].parse().unwrap_or(0);
                    record.birth_date = NaiveDate::from_ymd_opt(year, month, day);
                }
            }

            if record.sex == Sex::Unknown {
                if let Some(caps) = LEGACY_SEX.captures(&folded) {
                    record.sex = Sex::from_token(&caps[1]).unwrap_or(Sex::Unknown);
                }
            }

            if record.plan_name.is_none() {
                if let Some(caps) = LEGACY_PLAN.captures(&folded) {
                    record.plan_name = Some(caps[1].trim().to_string());
                }
            }

            if record.full_name.is_none() && looks_like_shouted_name(line, &folded) {
                record.full_name = Some(line.trim().to_string());
            }
        }

        record.confidence = legacy_confidence(&record);
        debug!(confidence = record.confidence, "legacy pass finished");
        record
    }
}

/// The old name heuristic: an all-uppercase alphabetic line of at least two
/// tokens that carries none of the stopwords.
fn looks_like_shouted_name(line: &str, folded: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() < 8 || trimmed.split_whitespace().count() < 2 {
        return false;
    }
    if trimmed
        .chars()
        .any(|c| !c.is_alphabetic() && !c.is_whitespace())
    {
        return false;
    }
    if trimmed.chars().filter(|c| c.is_alphabetic()).any(|c| !c.is_uppercase()) {
        return false;
    }
    !LEGACY_NAME_STOPWORDS.iter().any(|kw| folded.contains(kw))
}

/// Tuned constants carried over from the old implementation.
fn legacy_confidence(record: &ExtractedRecord) -> f32 {
    let has_id = record.national_id.is_some() || record.card_number.is_some();
    match (record.full_name.is_some(), has_id) {
        (true, true) => 0.8,
        (true, false) | (false, true) => 0.4,
        (false, false) => {
            if record.birth_date.is_some() || record.sex != Sex::Unknown {
                0.2
            } else {
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> ExtractedRecord {
        LegacyStrategy.run(&RawText::from(text))
    }

    #[test]
    fn test_salvages_unclassifiable_document() {
        let record = run("JOAO CARLOS PEREIRA\n390.533.447-05\n12/11/1990");

        assert_eq!(record.method, ExtractionMethod::Legacy);
        assert_eq!(record.full_name.as_deref(), Some("JOAO CARLOS PEREIRA"));
        assert_eq!(record.national_id.as_deref(), Some("39053344705"));
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1990, 11, 12));
        assert_eq!(record.confidence, 0.8);
    }

    #[test]
    fn test_issuer_keyword_sets_card_type() {
        let record = run("HAPVIDA\n1234567890123456");
        assert_eq!(record.document_type, DocumentType::InsuranceCard);
        assert_eq!(record.issuer_name.as_deref(), Some("Hapvida"));
        assert_eq!(record.card_number.as_deref(), Some("1234567890123456"));
        assert_eq!(record.confidence, 0.4);
    }

    #[test]
    fn test_stopword_lines_are_not_names() {
        let record = run("SECRETARIA DE SEGURANCA PUBLICA\nREGISTRO GERAL");
        assert!(record.full_name.is_none());
        assert_eq!(record.document_type, DocumentType::Identity);
    }

    #[test]
    fn test_empty_input_zero_confidence() {
        let record = run("");
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.document_type, DocumentType::Unknown);
        assert!(record.is_blank());
    }

    #[test]
    fn test_lowercase_prose_is_ignored() {
        let record = run("o rato roeu a roupa do rei de roma");
        assert!(record.full_name.is_none());
        assert_eq!(record.confidence, 0.0);
    }
}
