//! Document classification from OCR transcripts.
//!
//! An ordered list of signature predicates is evaluated against the
//! diacritic-folded text; the first document type whose predicate matches
//! wins. Identity-document boilerplate is checked before the insurance-card
//! tables, so a card that happens to quote registry phrasing still resolves
//! as an identity document. Classification is pure: same text, same context.

use tracing::debug;

use crate::models::record::DocumentContext;
use crate::text::{fold_for_match, RawText};

/// Boilerplate phrases printed on Brazilian identity documents. Any one of
/// them is a sufficient signature.
const IDENTITY_SIGNATURES: &[&str] = &[
    "REGISTRO GERAL",
    "CARTEIRA DE IDENTIDADE",
    "SECRETARIA DE SEGURANCA",
    "INSTITUTO DE IDENTIFICACAO",
    "REPUBLICA FEDERATIVA DO BRASIL",
];

/// Generic insurance-card phrases, used when no issuer keyword matched.
const CARD_SIGNATURES: &[&str] = &[
    "PLANO DE SAUDE",
    "CARTAO DO BENEFICIARIO",
    "CARTEIRA DO BENEFICIARIO",
    "CONVENIO",
    "REGISTRO ANS",
];

/// Ordered issuer table. Each entry is the canonical issuer name plus keyword
/// groups; a group matches when every keyword in it is present, and the first
/// issuer with a matching group wins.
const ISSUER_TABLE: &[(&str, &[&[&str]])] = &[
    ("Unimed", &[&["UNIMED"]]),
    ("Bradesco Saúde", &[&["BRADESCO", "SAUDE"], &["BRADESCO SEGUROS"]]),
    ("Amil", &[&["AMIL"]]),
    ("SulAmérica", &[&["SULAMERICA"], &["SUL AMERICA"]]),
    ("Hapvida", &[&["HAPVIDA"]]),
    (
        "NotreDame Intermédica",
        &[&["NOTREDAME"], &["NOTRE DAME"], &["INTERMEDICA"]],
    ),
];

/// Classify a transcript into a document-type/issuer context.
///
/// `Unknown` is a valid terminal outcome, not an error.
pub fn classify(text: &RawText) -> DocumentContext {
    let folded = fold_for_match(&text.joined());

    if IDENTITY_SIGNATURES.iter().any(|sig| folded.contains(sig)) {
        debug!("classified as identity document");
        return DocumentContext::identity();
    }

    if let Some(issuer) = match_issuer(&folded) {
        debug!(issuer, "classified as insurance card");
        return DocumentContext::insurance_card(Some(issuer.to_string()));
    }

    if CARD_SIGNATURES.iter().any(|sig| folded.contains(sig)) {
        debug!("classified as insurance card without issuer");
        return DocumentContext::insurance_card(None);
    }

    debug!("no signature matched, classification unknown");
    DocumentContext::unknown()
}

/// Match the folded text against the ordered issuer table.
pub fn match_issuer(folded: &str) -> Option<&'static str> {
    for (name, groups) in ISSUER_TABLE {
        for group in *groups {
            if group.iter().all(|kw| folded.contains(kw)) {
                return Some(name);
            }
        }
    }
    None
}

/// Canonical issuer names, in table order.
pub fn known_issuers() -> impl Iterator<Item = &'static str> {
    ISSUER_TABLE.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::DocumentType;

    #[test]
    fn test_identity_signature() {
        let text = RawText::from("REGISTRO GERAL\n45.229.385-0\nNome Maria Silva");
        let ctx = classify(&text);
        assert_eq!(ctx.document_type, DocumentType::Identity);
        assert!(ctx.issuer.is_none());
    }

    #[test]
    fn test_identity_signature_with_diacritics() {
        let text = RawText::from("Secretaria de Segurança Pública\nCarteira de Identidade");
        assert_eq!(classify(&text).document_type, DocumentType::Identity);
    }

    #[test]
    fn test_issuer_match() {
        let text = RawText::from("UNIMED CAMPINAS\nPlano Apartamento");
        let ctx = classify(&text);
        assert_eq!(ctx.document_type, DocumentType::InsuranceCard);
        assert_eq!(ctx.issuer.as_deref(), Some("Unimed"));
    }

    #[test]
    fn test_issuer_keyword_group_requires_all() {
        // "BRADESCO" alone is a bank, not the insurer
        let folded = fold_for_match("Banco Bradesco S.A.");
        assert_eq!(match_issuer(&folded), None);

        let folded = fold_for_match("Bradesco Saúde S.A.");
        assert_eq!(match_issuer(&folded), Some("Bradesco Saúde"));
    }

    #[test]
    fn test_generic_card_without_issuer() {
        let text = RawText::from("PLANO DE SAÚDE\nBeneficiário: José");
        let ctx = classify(&text);
        assert_eq!(ctx.document_type, DocumentType::InsuranceCard);
        assert!(ctx.issuer.is_none());
    }

    #[test]
    fn test_identity_wins_over_issuer() {
        // Both plausible: registry boilerplate takes precedence
        let text = RawText::from("CARTEIRA DE IDENTIDADE\nconvênio Unimed anotado no verso");
        assert_eq!(classify(&text).document_type, DocumentType::Identity);
    }

    #[test]
    fn test_unknown_for_noise() {
        let text = RawText::from("lorem ipsum dolor sit amet\n12345");
        let ctx = classify(&text);
        assert_eq!(ctx.document_type, DocumentType::Unknown);
        assert!(ctx.issuer.is_none());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let text = RawText::from("HAPVIDA\ncartão 123456789012345");
        let first = classify(&text);
        let second = classify(&text);
        assert_eq!(first, second);
    }
}
