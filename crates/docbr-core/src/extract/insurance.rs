//! Field extractor for health-insurance cards.
//!
//! When the classifier identified an issuer, that issuer's rule set is tried
//! first within each field; the generic card rules are the fallback.

use tracing::debug;

use super::issuers;
use crate::models::config::PipelineConfig;
use crate::models::record::DocumentContext;
use crate::rules::patterns::{
    ACCOMMODATION, BIRTH_DATE_LABELED, CARD_GENERIC, CARD_LABELED, DATE_DMY, NAME_LABELED,
    PLAN_LABELED,
};
use crate::rules::{
    extract_cpf, find_anchor, looks_like_person_name, scan_window, FieldCandidate, FieldName,
    RuleTier,
};
use crate::text::{contains_folded, RawText};

/// Extract raw field candidates from an insurance-card transcript.
pub fn extract(
    text: &RawText,
    context: &DocumentContext,
    config: &PipelineConfig,
) -> Vec<FieldCandidate> {
    let lines = text.lines();
    let window = config.bounded_window();
    let issuer_rules = context.issuer.as_deref().and_then(issuers::rules_for);

    let mut candidates = Vec::new();
    candidates.extend(card_number(lines, issuer_rules));
    candidates.extend(plan_name(lines, issuer_rules));
    candidates.extend(holder_name(lines, context.issuer.as_deref(), window));
    candidates.extend(national_id(lines));
    candidates.extend(birth_date(lines));

    debug!(
        count = candidates.len(),
        issuer = context.issuer.as_deref().unwrap_or("-"),
        "insurance extraction produced candidates"
    );
    candidates
}

fn card_number(
    lines: &[String],
    issuer_rules: Option<&issuers::IssuerRuleSet>,
) -> Option<FieldCandidate> {
    // Issuer-specific shapes first
    if let Some(rules) = issuer_rules {
        for (rule_id, re) in &rules.card_rules {
            for (i, line) in lines.iter().enumerate() {
                if let Some(caps) = re.captures(line) {
                    return Some(
                        FieldCandidate::new(
                            FieldName::CardNumber,
                            caps[1].trim(),
                            *rule_id,
                            RuleTier::Primary,
                        )
                        .at_line(i),
                    );
                }
            }
        }
    }

    // Generic: labeled, then an unlabeled long digit run
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = CARD_LABELED.captures(line) {
            return Some(
                FieldCandidate::new(FieldName::CardNumber, caps[1].trim(), "card:labeled", RuleTier::Primary)
                    .at_line(i),
            );
        }
    }

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = CARD_GENERIC.captures(line) {
            let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
            if (15..=20).contains(&digits.len()) {
                return Some(
                    FieldCandidate::new(FieldName::CardNumber, caps[1].trim(), "card:generic", RuleTier::Primary)
                        .at_line(i),
                );
            }
        }
    }

    None
}

fn plan_name(
    lines: &[String],
    issuer_rules: Option<&issuers::IssuerRuleSet>,
) -> Option<FieldCandidate> {
    if let Some(rules) = issuer_rules {
        for (rule_id, re) in &rules.plan_rules {
            for (i, line) in lines.iter().enumerate() {
                if let Some(caps) = re.captures(line) {
                    return Some(
                        FieldCandidate::new(FieldName::PlanName, caps[1].trim(), *rule_id, RuleTier::Primary)
                            .at_line(i),
                    );
                }
            }
        }
    }

    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = PLAN_LABELED.captures(line) {
            return Some(
                FieldCandidate::new(FieldName::PlanName, caps[1].trim(), "card:plan-labeled", RuleTier::Primary)
                    .at_line(i),
            );
        }
    }

    // Accommodation keyword standing in for the plan name
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = ACCOMMODATION.captures(line) {
            return Some(
                FieldCandidate::new(
                    FieldName::PlanName,
                    caps[1].trim(),
                    "card:plan-accommodation",
                    RuleTier::Context,
                )
                .at_line(i),
            );
        }
    }

    None
}

fn holder_name(lines: &[String], issuer: Option<&str>, window: usize) -> Option<FieldCandidate> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = NAME_LABELED.captures(line) {
            let value = caps[1].trim();
            if looks_like_person_name(value) {
                return Some(
                    FieldCandidate::new(FieldName::FullName, value, "card:name-labeled", RuleTier::Primary)
                        .at_line(i),
                );
            }
        }
    }

    // Holder name printed below an anchor keyword
    for anchor_kw in issuers::name_anchors_for(issuer) {
        if let Some(anchor) = find_anchor(lines, anchor_kw) {
            if let Some((i, line)) = scan_window(lines, anchor, window, looks_like_person_name) {
                return Some(
                    FieldCandidate::new(FieldName::FullName, line.trim(), "card:name-window", RuleTier::Context)
                        .at_line(i),
                );
            }
        }
    }

    None
}

fn national_id(lines: &[String]) -> Option<FieldCandidate> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(m) = extract_cpf(line) {
            return Some(
                FieldCandidate::new(FieldName::NationalId, m.digits, m.rule_id, RuleTier::Primary)
                    .at_line(i),
            );
        }
    }
    None
}

fn birth_date(lines: &[String]) -> Option<FieldCandidate> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = BIRTH_DATE_LABELED.captures(line) {
            if let Some(date) = DATE_DMY.find(&caps[1]) {
                return Some(
                    FieldCandidate::new(FieldName::BirthDate, date.as_str(), "card:birth-labeled", RuleTier::Primary)
                        .at_line(i),
                );
            }
        }
    }

    for (i, line) in lines.iter().enumerate() {
        // Cards print expiry dates too; only an unambiguous line qualifies
        if contains_folded(line, "VALIDADE") || contains_folded(line, "VIGENCIA") {
            continue;
        }
        if let Some(date) = DATE_DMY.find(line) {
            return Some(
                FieldCandidate::new(FieldName::BirthDate, date.as_str(), "card:date-first", RuleTier::Primary)
                    .at_line(i),
            );
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_for(text: &str, issuer: Option<&str>) -> Vec<FieldCandidate> {
        let ctx = DocumentContext::insurance_card(issuer.map(|s| s.to_string()));
        extract(&RawText::from(text), &ctx, &PipelineConfig::default())
    }

    #[test]
    fn test_issuer_card_rule_precedes_generic() {
        let candidates = extract_for("UNIMED\n0 046 110123456789 0", Some("Unimed"));
        let card = candidates.iter().find(|c| c.field == FieldName::CardNumber).unwrap();
        assert_eq!(card.rule_id, "issuer:unimed:card-grouped");
        assert_eq!(card.raw_value, "0 046 110123456789 0");
    }

    #[test]
    fn test_generic_card_fallback() {
        // 15 contiguous digits match no Unimed shape; the generic rule fires
        let candidates = extract_for("UNIMED\n123456789012345", Some("Unimed"));
        let card = candidates.iter().find(|c| c.field == FieldName::CardNumber).unwrap();
        assert_eq!(card.rule_id, "card:generic");
        assert_eq!(card.raw_value, "123456789012345");
    }

    #[test]
    fn test_plan_from_accommodation_keyword() {
        let candidates = extract_for("Hapvida\nacomodação ENFERMARIA", Some("Hapvida"));
        let plan = candidates.iter().find(|c| c.field == FieldName::PlanName).unwrap();
        assert_eq!(plan.raw_value, "ENFERMARIA");
        assert_eq!(plan.tier, RuleTier::Context);
    }

    #[test]
    fn test_holder_name_below_anchor() {
        let candidates = extract_for("BENEFICIÁRIO\nAna Beatriz Costa\nPlano Especial", None);
        let name = candidates.iter().find(|c| c.field == FieldName::FullName).unwrap();
        assert_eq!(name.raw_value, "Ana Beatriz Costa");
        assert_eq!(name.rule_id, "card:name-window");
    }

    #[test]
    fn test_no_rules_match_yields_nothing() {
        let candidates = extract_for("SULAMERICA SAUDE", Some("SulAmérica"));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_birth_date_skips_expiry() {
        let candidates = extract_for("AMIL\nValidade 01/01/2030\nNasc. 12/11/1990", Some("Amil"));
        let birth = candidates.iter().find(|c| c.field == FieldName::BirthDate).unwrap();
        assert_eq!(birth.raw_value, "12/11/1990");
    }
}
