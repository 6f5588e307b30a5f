//! Candidate normalization into the canonical `ExtractedRecord`.
//!
//! A field appears in the output only when normalization succeeded; a
//! candidate that matched a rule but fails here is dropped and recorded in
//! `errors`, never guessed.

use chrono::NaiveDate;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::PipelineConfig;
use crate::models::record::{DocumentContext, DocumentType, ExtractedRecord, Sex};
use crate::rules::patterns::DATE_DMY;
use crate::rules::{validate_cpf, FieldCandidate, FieldName, RuleTier, NAME_BLACKLIST};
use crate::text::fold_for_match;

/// Lowercased in the middle of a normalized name.
const NAME_PARTICLES: &[&str] = &["da", "de", "do", "das", "dos", "e"];

/// Turns raw candidates into a canonical record.
pub struct Normalizer {
    infer_sex_from_name: bool,
}

impl Normalizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            infer_sex_from_name: config.infer_sex_from_name,
        }
    }

    /// Normalize candidates for one extraction call.
    ///
    /// Conflict resolution: the first candidate per field wins; later ones
    /// are logged as superseded. Unresolved fields expected for the document
    /// type are logged too.
    pub fn normalize(
        &self,
        candidates: Vec<FieldCandidate>,
        context: &DocumentContext,
    ) -> ExtractedRecord {
        let mut record = ExtractedRecord::empty(context.document_type);
        record.issuer_name = context.issuer.clone();

        let mut resolved: Vec<(FieldName, RuleTier)> = Vec::new();
        let mut errors = Vec::new();

        for candidate in candidates {
            if resolved.iter().any(|(f, _)| *f == candidate.field) {
                errors.push(
                    ExtractionError::Superseded {
                        field: candidate.field.as_str().to_string(),
                        value: candidate.raw_value,
                    }
                    .to_string(),
                );
                continue;
            }

            match self.apply(&candidate, context, &mut record) {
                Ok(()) => resolved.push((candidate.field, candidate.tier)),
                Err(err) => {
                    debug!(field = candidate.field.as_str(), %err, "candidate dropped");
                    errors.push(err.to_string());
                }
            }
        }

        // Documented last-resort heuristic, identity documents only
        if record.sex == Sex::Unknown
            && self.infer_sex_from_name
            && context.document_type == DocumentType::Identity
        {
            if let Some(sex) = infer_sex_from_name(record.full_name.as_deref()) {
                record.sex = sex;
                resolved.push((FieldName::Sex, RuleTier::Heuristic));
                errors.push("sex inferred from name ending (low-confidence heuristic)".to_string());
            }
        }

        for field in expected_fields(context.document_type) {
            if !resolved.iter().any(|(f, _)| f == field) {
                errors.push(format!("field not resolved: {}", field.as_str()));
            }
        }

        record.confidence = confidence(&resolved);
        record.errors = errors;
        record
    }

    fn apply(
        &self,
        candidate: &FieldCandidate,
        context: &DocumentContext,
        record: &mut ExtractedRecord,
    ) -> Result<(), ExtractionError> {
        let raw = candidate.raw_value.trim();
        let fail = |reason: String| ExtractionError::Normalization {
            field: candidate.field.as_str().to_string(),
            reason,
        };

        match candidate.field {
            FieldName::FullName => {
                let name = normalize_name(raw);
                let folded = fold_for_match(&name);
                if NAME_BLACKLIST.iter().any(|kw| folded.contains(kw)) {
                    return Err(fail(format!("structural keyword captured as name: {raw}")));
                }
                if name.split_whitespace().count() < 2 {
                    return Err(fail(format!("not a full name: {raw}")));
                }
                record.full_name = Some(name);
            }
            FieldName::NationalId => {
                let digits = digits_of(raw);
                if digits.len() != 11 {
                    return Err(fail(format!("expected 11 digits, got {}", digits.len())));
                }
                if !validate_cpf(&digits) {
                    return Err(fail(format!("checksum failed: {raw}")));
                }
                record.national_id = Some(digits);
            }
            FieldName::IdentityNumber => {
                let digits = digits_of(raw);
                if !(5..=10).contains(&digits.len()) {
                    return Err(fail(format!(
                        "expected 5-10 digits for an identity number, got {}",
                        digits.len()
                    )));
                }
                record.identity_number = Some(digits);
            }
            FieldName::CardNumber => {
                // Formats vary per issuer; strip whitespace only
                let value: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                if value.is_empty() {
                    return Err(fail("empty card number".to_string()));
                }
                record.card_number = Some(value);
            }
            FieldName::BirthDate => {
                record.birth_date = Some(parse_birth_date(raw).map_err(fail)?);
            }
            FieldName::Sex => {
                record.sex = Sex::from_token(raw).ok_or_else(|| ExtractionError::Parse {
                    field: candidate.field.as_str().to_string(),
                    value: raw.to_string(),
                })?;
            }
            FieldName::PlanName => {
                let plan = collapse_whitespace(raw);
                if plan.is_empty() {
                    return Err(fail("empty plan name".to_string()));
                }
                // Context may hand us the issuer's own name as a plan
                if let Some(issuer) = &context.issuer {
                    if fold_for_match(&plan) == fold_for_match(issuer) {
                        return Err(fail(format!("plan name is the issuer name: {raw}")));
                    }
                }
                record.plan_name = Some(plan);
            }
        }
        Ok(())
    }
}

/// Fields a document of this type is expected to carry; their absence is
/// logged, not fatal.
fn expected_fields(document_type: DocumentType) -> &'static [FieldName] {
    match document_type {
        DocumentType::Identity => &[
            FieldName::FullName,
            FieldName::IdentityNumber,
            FieldName::NationalId,
            FieldName::BirthDate,
            FieldName::Sex,
        ],
        DocumentType::InsuranceCard => &[
            FieldName::FullName,
            FieldName::CardNumber,
            FieldName::PlanName,
        ],
        DocumentType::Unknown => &[],
    }
}

/// Overall confidence from the resolved fields and their rule tiers.
///
/// Key fields resolved by a document/issuer-specific rule score full
/// confidence; context-window and fixture matches stay in the low band, and
/// the heuristic tier never contributes.
fn confidence(resolved: &[(FieldName, RuleTier)]) -> f32 {
    let key_tier = resolved
        .iter()
        .filter(|(f, _)| f.is_key())
        .map(|(_, t)| *t)
        .max();

    match key_tier {
        Some(RuleTier::Primary) => 1.0,
        Some(RuleTier::Context) => 0.6,
        Some(RuleTier::Fixture) => 0.3,
        _ => {
            let other_tier = resolved
                .iter()
                .filter(|(f, _)| !f.is_key())
                .map(|(_, t)| *t)
                .max();
            match other_tier {
                Some(RuleTier::Primary) | Some(RuleTier::Context) => 0.5,
                Some(RuleTier::Fixture) => 0.3,
                _ => 0.0,
            }
        }
    }
}

/// Collapse internal whitespace and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Digits only.
pub fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Canonical name capitalization: each token capitalized, Portuguese
/// particles lowercased except in first position.
pub fn normalize_name(raw: &str) -> String {
    collapse_whitespace(raw)
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            let lower = token.to_lowercase();
            if i > 0 && NAME_PARTICLES.contains(&lower.as_str()) {
                lower
            } else {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a `DD/MM/YYYY`-shaped date with basic range validation.
fn parse_birth_date(raw: &str) -> Result<NaiveDate, String> {
    let caps = DATE_DMY
        .captures(raw)
        .ok_or_else(|| format!("not a DD/MM/YYYY date: {raw}"))?;

    let day: u32 = caps[1].parse().map_err(|_| format!("bad day in {raw}"))?;
    let month: u32 = caps[2].parse().map_err(|_| format!("bad month in {raw}"))?;
    let year: i32 = caps[3].parse().map_err(|_| format!("bad year in {raw}"))?;

    if !(1900..=2100).contains(&year) {
        return Err(format!("year out of range: {year}"));
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| format!("invalid calendar date: {raw}"))
}

/// Last-resort inference from the first name's gendered ending. Kept behind a
/// config flag and reported separately from rule-based matches.
fn infer_sex_from_name(full_name: Option<&str>) -> Option<Sex> {
    let first = full_name?.split_whitespace().next()?;
    let last_char = first.chars().last()?.to_lowercase().next()?;
    match last_char {
        'a' => Some(Sex::Female),
        'o' => Some(Sex::Male),
        _ => None,
    }
}
