//! Pipeline orchestration: strategy selection and fault containment.
//!
//! The orchestrator runs the modern modular strategy first and falls back to
//! the legacy monolithic heuristic when confidence lands below the configured
//! threshold. Callers always receive a record; no failure mode escapes as a
//! panic or error, because the consumer is a best-effort form pre-fill where
//! a missing field beats a crashed request.

mod legacy;

pub use legacy::LegacyStrategy;

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::error::ExtractionError;
use crate::extract;
use crate::models::config::PipelineConfig;
use crate::models::record::{DocumentType, ExtractedRecord, ExtractionMethod};
use crate::normalize::Normalizer;
use crate::text::RawText;

/// A complete extraction pipeline: classification, extraction, and
/// normalization behind one call.
pub trait ExtractionStrategy {
    /// Label used in logs and fault messages.
    fn name(&self) -> &'static str;

    /// Produce a record for the transcript. Total for any input.
    fn run(&self, text: &RawText) -> ExtractedRecord;
}

/// The modular classify -> extract -> normalize pipeline.
pub struct ModernStrategy {
    config: PipelineConfig,
}

impl ModernStrategy {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }
}

impl ExtractionStrategy for ModernStrategy {
    fn name(&self) -> &'static str {
        "modern"
    }

    fn run(&self, text: &RawText) -> ExtractedRecord {
        let context = classify(text);

        if context.document_type == DocumentType::Unknown {
            debug!("unknown document type, skipping extraction");
            return ExtractedRecord::empty(DocumentType::Unknown);
        }

        let candidates = extract::extract(text, &context, &self.config);
        let mut record = Normalizer::new(&self.config).normalize(candidates, &context);
        record.method = ExtractionMethod::Modern;
        record
    }
}

/// Sequences the strategies and guarantees a record is always returned.
pub struct Orchestrator {
    config: PipelineConfig,
    modern: ModernStrategy,
    legacy: Option<LegacyStrategy>,
}

impl Orchestrator {
    pub fn new(config: PipelineConfig) -> Self {
        let legacy = config.enable_legacy_fallback.then_some(LegacyStrategy);
        Self {
            modern: ModernStrategy::new(config.clone()),
            config,
            legacy,
        }
    }

    /// Process one transcript.
    ///
    /// Never panics and never returns an error: internal faults degrade to a
    /// zero-confidence record with the fault message in `errors`.
    pub fn process(&self, text: &RawText) -> ExtractedRecord {
        if text.is_blank() {
            warn!("blank transcript handed to the pipeline");
        }

        let mut record = self.run_contained(&self.modern, text);

        if record.confidence < self.config.fallback_threshold {
            if let Some(legacy) = &self.legacy {
                info!(
                    confidence = record.confidence,
                    threshold = self.config.fallback_threshold,
                    "confidence below threshold, trying legacy strategy"
                );
                let mut fallback = self.run_contained(legacy, text);

                if fallback.confidence > record.confidence {
                    fallback.errors.push(format!(
                        "legacy fallback: modern strategy confidence {:.2} below threshold {:.2}",
                        record.confidence, self.config.fallback_threshold
                    ));
                    return fallback;
                }

                record
                    .errors
                    .push("legacy fallback attempted without improvement".to_string());
            }
        }

        record
    }

    fn run_contained(&self, strategy: &dyn ExtractionStrategy, text: &RawText) -> ExtractedRecord {
        match catch_unwind(AssertUnwindSafe(|| strategy.run(text))) {
            Ok(record) => record,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(strategy = strategy.name(), %message, "strategy faulted");
                ExtractedRecord::fault(
                    ExtractionError::PipelineFault(format!(
                        "{} strategy: {}",
                        strategy.name(),
                        message
                    ))
                    .to_string(),
                )
            }
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Sex;
    use chrono::NaiveDate;

    fn process(text: &str) -> ExtractedRecord {
        Orchestrator::default().process(&RawText::from(text))
    }

    #[test]
    fn test_identity_document_end_to_end() {
        let record = process(
            "REGISTRO GERAL 45.229.385-0\n\
             Sexo F\n\
             filiação anotada\n\
             Nome Maria Silva Santos\n\
             CPF 390.533.447-05\n\
             Data de Nascimento 03/07/1985",
        );

        assert_eq!(record.document_type, DocumentType::Identity);
        assert_eq!(record.full_name.as_deref(), Some("Maria Silva Santos"));
        assert_eq!(record.sex, Sex::Female);
        assert_eq!(record.national_id.as_deref(), Some("39053344705"));
        assert_eq!(record.identity_number.as_deref(), Some("452293850"));
        assert_eq!(record.birth_date, NaiveDate::from_ymd_opt(1985, 7, 3));
        assert_eq!(record.method, ExtractionMethod::Modern);
        assert_eq!(record.confidence, 1.0);
    }

    #[test]
    fn test_unlabeled_card_number_generic_rule() {
        let record = process("UNIMED\n123456789012345");

        assert_eq!(record.document_type, DocumentType::InsuranceCard);
        assert_eq!(record.issuer_name.as_deref(), Some("Unimed"));
        assert_eq!(record.card_number.as_deref(), Some("123456789012345"));
        assert_eq!(record.confidence, 1.0);
    }

    #[test]
    fn test_random_prose_yields_unknown() {
        let record = process("o rato roeu a roupa do rei de roma\nnada a declarar");

        assert_eq!(record.document_type, DocumentType::Unknown);
        assert_eq!(record.confidence, 0.0);
        assert!(record.is_blank());
    }

    #[test]
    fn test_issuer_without_matching_rules() {
        let record = process("SULAMERICA SAUDE");

        assert_eq!(record.document_type, DocumentType::InsuranceCard);
        assert_eq!(record.issuer_name.as_deref(), Some("SulAmérica"));
        assert!(record.card_number.is_none());
        assert!(record.plan_name.is_none());
        assert!(record.confidence < 0.5);
        assert!(!record.errors.is_empty());
    }

    #[test]
    fn test_nine_digit_cpf_dropped() {
        let record = process("REGISTRO GERAL\nCPF 390.533.447");

        assert!(record.national_id.is_none());
        assert!(record.errors.iter().any(|e| e.contains("national_id")));
    }

    #[test]
    fn test_legacy_fallback_is_labeled() {
        // No classifier signature, but fields the legacy pass can salvage
        let record = process("JOAO CARLOS PEREIRA\n390.533.447-05");

        assert_eq!(record.method, ExtractionMethod::Legacy);
        assert!(record.confidence > 0.0);
        assert!(record.errors.iter().any(|e| e.contains("legacy fallback")));
        assert_eq!(record.national_id.as_deref(), Some("39053344705"));
    }

    #[test]
    fn test_modern_result_not_silently_replaced() {
        // Legacy cannot improve on this; the modern record is kept
        let record = process("UNIMED\ncarteirinha ilegível");

        assert_eq!(record.method, ExtractionMethod::Modern);
        assert!(record
            .errors
            .iter()
            .any(|e| e.contains("without improvement")));
    }

    #[test]
    fn test_totality_on_degenerate_inputs() {
        for text in ["", "\n\n\n", "   ", "\u{0000}", "123", "SEXO"] {
            let record = process(text);
            assert_eq!(record.document_type, DocumentType::Unknown);
        }
    }

    #[test]
    fn test_determinism() {
        let text = "REGISTRO GERAL\nNome Maria Silva Santos\nSexo F";
        let a = process(text);
        let b = process(text);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
