//! Per-issuer rule sets for insurance cards.
//!
//! Each issuer may define its own card-number shapes, plan-name patterns, and
//! holder-name anchors. Issuer rules are layered before the generic card
//! rules: within a field, issuer rules are tried first and the generic rules
//! are the fallback.

use lazy_static::lazy_static;
use regex::Regex;

/// Rule set for one insurance issuer.
pub struct IssuerRuleSet {
    /// Canonical issuer name, matching the classifier's table.
    pub issuer: &'static str,
    /// Card-number shapes, ordered. The first capture group is the candidate.
    pub card_rules: Vec<(&'static str, Regex)>,
    /// Plan-name patterns, ordered.
    pub plan_rules: Vec<(&'static str, Regex)>,
    /// Anchor keywords whose following lines may hold the holder's name.
    pub name_anchors: &'static [&'static str],
}

const DEFAULT_NAME_ANCHORS: &[&str] = &["BENEFICIARIO", "NOME"];

lazy_static! {
    static ref ISSUER_RULES: Vec<IssuerRuleSet> = vec![
        IssuerRuleSet {
            issuer: "Unimed",
            card_rules: vec![
                // 17 digits grouped 0 999 999999999999 9
                (
                    "issuer:unimed:card-grouped",
                    Regex::new(r"\b(0[ .]\d{3}[ .]\d{12}[ .]\d)\b").unwrap(),
                ),
                ("issuer:unimed:card-contiguous", Regex::new(r"\b(\d{17})\b").unwrap()),
            ],
            plan_rules: vec![(
                "issuer:unimed:plan-family",
                Regex::new(r"(?i)\b(UNIMAX|UNIPLAN|UNIFLEX|UNIPART)\b").unwrap(),
            )],
            name_anchors: &["BENEFICIARIO", "NOME", "CLIENTE"],
        },
        IssuerRuleSet {
            issuer: "Bradesco Saúde",
            card_rules: vec![(
                "issuer:bradesco:card",
                Regex::new(r"\b(\d{6}[ .-]?\d{9})\b").unwrap(),
            )],
            plan_rules: vec![(
                "issuer:bradesco:plan-family",
                Regex::new(r"(?i)\b(NACIONAL\s+FLEX|TOP\s+NACIONAL|EFETIVO|PREFERENCIAL)\b")
                    .unwrap(),
            )],
            name_anchors: DEFAULT_NAME_ANCHORS,
        },
        IssuerRuleSet {
            issuer: "Amil",
            card_rules: vec![(
                "issuer:amil:card-labeled",
                Regex::new(r"(?i)(?:MATR[IÍ]CULA|CARTEIRA)[\s:nº°.]*(\d{9})").unwrap(),
            )],
            plan_rules: vec![(
                "issuer:amil:plan-family",
                Regex::new(r"(?i)\b(AMIL\s+(?:ONE|F[AÁ]CIL|[0-9]{3}))\b").unwrap(),
            )],
            name_anchors: DEFAULT_NAME_ANCHORS,
        },
        IssuerRuleSet {
            issuer: "SulAmérica",
            card_rules: vec![(
                "issuer:sulamerica:card",
                Regex::new(r"\b(\d{5}[ .]?\d{4}[ .]?\d{4}[ .]?\d{4})\b").unwrap(),
            )],
            plan_rules: vec![(
                "issuer:sulamerica:plan-family",
                Regex::new(r"(?i)\b(EXATO|CL[AÁ]SSICO|ESPECIAL\s*100|EXECUTIVO)\b").unwrap(),
            )],
            name_anchors: &["SEGURADO", "BENEFICIARIO", "NOME"],
        },
        IssuerRuleSet {
            issuer: "Hapvida",
            card_rules: vec![(
                "issuer:hapvida:card",
                Regex::new(r"\b(\d{16})\b").unwrap(),
            )],
            plan_rules: vec![(
                "issuer:hapvida:plan-family",
                Regex::new(r"(?i)\b(MAIS\s+SIMPLES|PLENO|AMBULATORIAL)\b").unwrap(),
            )],
            name_anchors: DEFAULT_NAME_ANCHORS,
        },
        IssuerRuleSet {
            issuer: "NotreDame Intermédica",
            card_rules: vec![(
                "issuer:notredame:card",
                Regex::new(r"\b(\d{14})\b").unwrap(),
            )],
            plan_rules: vec![(
                "issuer:notredame:plan-family",
                Regex::new(r"(?i)\b(SMART|ADVANCE|PREMIUM\s+900)\b").unwrap(),
            )],
            name_anchors: DEFAULT_NAME_ANCHORS,
        },
    ];
}

/// Rule set for a canonical issuer name, when one is defined.
pub fn rules_for(issuer: &str) -> Option<&'static IssuerRuleSet> {
    ISSUER_RULES.iter().find(|r| r.issuer == issuer)
}

/// Name anchors to use for a card: the issuer's own, or the defaults.
pub fn name_anchors_for(issuer: Option<&str>) -> &'static [&'static str] {
    issuer
        .and_then(rules_for)
        .map(|r| r.name_anchors)
        .unwrap_or(DEFAULT_NAME_ANCHORS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_classifier_issuer_resolves_or_defaults() {
        // Not every issuer needs bespoke rules, but lookups must not panic
        for issuer in crate::classify::known_issuers() {
            let _ = rules_for(issuer);
            assert!(!name_anchors_for(Some(issuer)).is_empty());
        }
    }

    #[test]
    fn test_unimed_grouped_card_shape() {
        let rules = rules_for("Unimed").unwrap();
        let (_, re) = &rules.card_rules[0];
        let caps = re.captures("0 046 110123456789 0").unwrap();
        assert_eq!(&caps[1], "0 046 110123456789 0");
        assert!(re.captures("123456789012345").is_none());
    }

    #[test]
    fn test_amil_card_requires_label() {
        let rules = rules_for("Amil").unwrap();
        let (_, re) = &rules.card_rules[0];
        assert!(re.captures("Matrícula: 123456789").is_some());
        // A bare 9-digit run could be an RG; the label is required
        assert!(re.captures("documento 123456789").is_none());
    }

    #[test]
    fn test_unknown_issuer_uses_default_anchors() {
        assert_eq!(name_anchors_for(None), DEFAULT_NAME_ANCHORS);
        assert_eq!(name_anchors_for(Some("Porto Seguro")), DEFAULT_NAME_ANCHORS);
    }
}
