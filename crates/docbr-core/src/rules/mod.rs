//! Rule primitives shared by the per-document field extractors.

pub mod cpf;
pub mod fixtures;
pub mod patterns;

pub use cpf::{extract_cpf, format_cpf, validate_cpf};
pub use fixtures::{fixture_candidates, FixtureRule};

use serde::{Deserialize, Serialize};

use crate::text::fold_for_match;

/// Field a rule produces a candidate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    FullName,
    NationalId,
    IdentityNumber,
    CardNumber,
    BirthDate,
    Sex,
    PlanName,
}

impl FieldName {
    /// Stable name used in error messages and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FullName => "full_name",
            FieldName::NationalId => "national_id",
            FieldName::IdentityNumber => "identity_number",
            FieldName::CardNumber => "card_number",
            FieldName::BirthDate => "birth_date",
            FieldName::Sex => "sex",
            FieldName::PlanName => "plan_name",
        }
    }

    /// Key fields drive the confidence score; the rest only fill the record.
    pub fn is_key(&self) -> bool {
        matches!(
            self,
            FieldName::FullName
                | FieldName::NationalId
                | FieldName::IdentityNumber
                | FieldName::CardNumber
        )
    }
}

/// Priority tier of the rule that produced a candidate.
///
/// Tiers are ordered: a `Primary` match is generalizable, a `Context` match
/// depends on line adjacency, a `Fixture` match memorizes one known sample
/// document, and `Heuristic` marks the name-based sex inference. Confidence
/// scoring never lets a lower tier masquerade as a higher one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTier {
    Heuristic,
    Fixture,
    Context,
    Primary,
}

/// One raw field candidate with provenance.
///
/// Ephemeral: owned by a single extraction call. Multiple candidates per
/// field are possible; the normalizer picks exactly one or drops the field.
#[derive(Debug, Clone)]
pub struct FieldCandidate {
    pub field: FieldName,
    pub raw_value: String,
    /// Identifier of the rule that matched, e.g. `identity:name-labeled`.
    pub rule_id: String,
    /// Line the match came from, when the rule is line-scoped.
    pub line_index: Option<usize>,
    pub tier: RuleTier,
}

impl FieldCandidate {
    pub fn new(
        field: FieldName,
        raw_value: impl Into<String>,
        rule_id: impl Into<String>,
        tier: RuleTier,
    ) -> Self {
        Self {
            field,
            raw_value: raw_value.into(),
            rule_id: rule_id.into(),
            line_index: None,
            tier,
        }
    }

    pub fn at_line(mut self, index: usize) -> Self {
        self.line_index = Some(index);
        self
    }
}

/// Structural keywords that a context-window rule may capture by mistake.
/// A name-shaped line matching any of these is rejected.
pub const NAME_BLACKLIST: &[&str] = &[
    "REGISTRO GERAL",
    "CARTEIRA DE IDENTIDADE",
    "SECRETARIA",
    "REPUBLICA FEDERATIVA",
    "INSTITUTO DE IDENTIFICACAO",
    "DATA DE NASCIMENTO",
    "NATURALIDADE",
    "FILIACAO",
    "ASSINATURA",
    "VALIDADE",
    "PLANO DE SAUDE",
    "BENEFICIARIO",
    "UNIMED",
    "BRADESCO",
    "AMIL",
    "SULAMERICA",
    "HAPVIDA",
    "NOTREDAME",
    "INTERMEDICA",
];

/// Shape predicate for "looks like a person's name": at least two capitalized
/// tokens, no digits, minimum length, not a structural keyword.
pub fn looks_like_person_name(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.len() < 5 || trimmed.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let folded = fold_for_match(trimmed);
    if NAME_BLACKLIST.iter().any(|kw| folded.contains(kw)) {
        return false;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 2 {
        return false;
    }

    tokens.iter().all(|t| {
        t.chars()
            .all(|c| c.is_alphabetic() || c == '\'' || c == '-' || c == '.')
    }) && tokens
        .iter()
        .filter(|t| t.chars().next().is_some_and(|c| c.is_uppercase()))
        .count()
        >= 2
}

/// Scan a bounded window of lines after an anchor for the first line
/// satisfying `predicate`. The window is capped to guarantee termination.
pub fn scan_window<'a>(
    lines: &'a [String],
    anchor: usize,
    window: usize,
    predicate: impl Fn(&str) -> bool,
) -> Option<(usize, &'a str)> {
    let window = window.min(4);
    lines
        .iter()
        .enumerate()
        .skip(anchor + 1)
        .take(window)
        .map(|(i, l)| (i, l.as_str()))
        .find(|(_, l)| predicate(l))
}

/// Index of the first line whose folded text contains the folded keyword.
pub fn find_anchor(lines: &[String], keyword: &str) -> Option<usize> {
    let needle = fold_for_match(keyword);
    lines
        .iter()
        .position(|l| fold_for_match(l).contains(&needle))
}
