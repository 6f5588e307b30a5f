//! Fixture tier: literal rules for known sample documents.
//!
//! These rules memorize specific training/sample documents rather than
//! generalizable patterns, so they live in a data file instead of the rule
//! logic, run only after every pattern and context rule has failed, and are
//! capped at the lowest confidence tier.

use lazy_static::lazy_static;
use serde::Deserialize;
use tracing::warn;

use super::{FieldCandidate, FieldName, RuleTier};
use crate::models::record::{DocumentContext, DocumentType};
use crate::text::{fold_for_match, RawText};

/// One literal fixture rule loaded from the embedded table.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureRule {
    pub rule_id: String,
    pub document_type: DocumentType,
    /// Issuer the fixture belongs to, for insurance-card samples.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Exact substring (diacritic-folded comparison) identifying the sample.
    pub literal: String,
    pub field: FieldName,
    pub value: String,
}

static FIXTURES_JSON: &str = include_str!("fixtures.json");

lazy_static! {
    static ref FIXTURES: Vec<FixtureRule> = serde_json::from_str(FIXTURES_JSON)
        .map_err(|e| warn!("fixture table failed to parse: {e}"))
        .unwrap_or_default();
}

/// Candidates from the fixture tier for fields not yet resolved.
///
/// `resolved` lists fields that already have a candidate from a higher tier;
/// fixtures never compete with pattern or context matches.
pub fn fixture_candidates(
    text: &RawText,
    context: &DocumentContext,
    resolved: &[FieldName],
) -> Vec<FieldCandidate> {
    let folded = fold_for_match(&text.joined());

    FIXTURES
        .iter()
        .filter(|f| f.document_type == context.document_type)
        .filter(|f| match (&f.issuer, &context.issuer) {
            (Some(want), Some(have)) => want == have,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .filter(|f| !resolved.contains(&f.field))
        .filter(|f| folded.contains(&fold_for_match(&f.literal)))
        .map(|f| FieldCandidate::new(f.field, f.value.clone(), f.rule_id.clone(), RuleTier::Fixture))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_table_parses() {
        assert!(!FIXTURES.is_empty());
        assert!(FIXTURES.iter().all(|f| !f.literal.is_empty()));
    }

    #[test]
    fn test_fixture_matches_exact_literal_only() {
        let ctx = DocumentContext::identity();
        let text = RawText::from("REGISTRO GERAL\nESPECIME DE TREINAMENTO 0034");
        let hits = fixture_candidates(&text, &ctx, &[]);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|c| c.tier == RuleTier::Fixture));

        // A near-miss literal does not fire
        let text = RawText::from("REGISTRO GERAL\nESPECIME DE TREINAMENTO 0035");
        assert!(fixture_candidates(&text, &ctx, &[]).is_empty());
    }

    #[test]
    fn test_fixture_skips_resolved_fields() {
        let ctx = DocumentContext::identity();
        let text = RawText::from("ESPECIME DE TREINAMENTO 0034");
        let hits = fixture_candidates(&text, &ctx, &[FieldName::FullName]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].field, FieldName::IdentityNumber);
    }

    #[test]
    fn test_fixture_respects_issuer() {
        let text = RawText::from("VIA DE AMOSTRA 0 994 000000000000 1");
        let unimed = DocumentContext::insurance_card(Some("Unimed".to_string()));
        assert_eq!(fixture_candidates(&text, &unimed, &[]).len(), 1);

        let amil = DocumentContext::insurance_card(Some("Amil".to_string()));
        assert!(fixture_candidates(&text, &amil, &[]).is_empty());
    }
}
