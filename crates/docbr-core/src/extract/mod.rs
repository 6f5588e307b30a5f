//! Per-document-type field extractors.
//!
//! Each field has an ordered rule cascade; the first rule with a non-empty
//! match wins that field, with no blending across rules. Extractors are pure
//! functions over the transcript and classification context, and "field not
//! found" is represented by the absence of a candidate, never by an error.

pub mod identity;
pub mod insurance;
pub mod issuers;

use crate::models::config::PipelineConfig;
use crate::models::record::{DocumentContext, DocumentType};
use crate::rules::{fixture_candidates, FieldCandidate, FieldName};
use crate::text::RawText;

/// Run the extractor matching the classified document type.
///
/// The fixture tier runs last and only for fields no pattern or context rule
/// resolved.
pub fn extract(
    text: &RawText,
    context: &DocumentContext,
    config: &PipelineConfig,
) -> Vec<FieldCandidate> {
    let mut candidates = match context.document_type {
        DocumentType::Identity => identity::extract(text, config),
        DocumentType::InsuranceCard => insurance::extract(text, context, config),
        DocumentType::Unknown => Vec::new(),
    };

    if config.enable_fixture_tier && context.document_type != DocumentType::Unknown {
        let resolved: Vec<FieldName> = candidates.iter().map(|c| c.field).collect();
        candidates.extend(fixture_candidates(text, context, &resolved));
    }

    candidates
}
