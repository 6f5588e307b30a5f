//! Core library for Brazilian patient-document data extraction.
//!
//! This crate provides:
//! - Document classification (identity document vs. health-insurance card)
//! - Rule-based field extraction (name, CPF, RG, card number, plan, dates, sex)
//! - Value normalization into a canonical `ExtractedRecord`
//! - Pipeline orchestration with a legacy-heuristic fallback strategy
//!
//! The pipeline consumes OCR transcripts produced elsewhere; it never performs
//! OCR, I/O, or persistence itself.

pub mod classify;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod rules;
pub mod text;

pub use classify::classify;
pub use error::{DocbrError, ExtractionError, Result};
pub use models::config::PipelineConfig;
pub use models::record::{
    DocumentContext, DocumentType, ExtractedRecord, ExtractionMethod, Sex,
};
pub use pipeline::{ExtractionStrategy, LegacyStrategy, ModernStrategy, Orchestrator};
pub use rules::{FieldCandidate, FieldName, RuleTier};
pub use text::RawText;
