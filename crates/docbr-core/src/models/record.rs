//! Canonical output record and classification context.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of document the classifier recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// National identity document (RG / carteira de identidade).
    Identity,
    /// Health-insurance card (carteirinha de convênio).
    InsuranceCard,
    /// No signature matched; a valid terminal outcome, not a failure.
    Unknown,
}

impl Default for DocumentType {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Sex as printed on identity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Default for Sex {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Which strategy produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// The modular classify/extract/normalize pipeline.
    Modern,
    /// The monolithic single-pass heuristic, used as a fallback.
    Legacy,
}

impl Default for ExtractionMethod {
    fn default() -> Self {
        Self::Modern
    }
}

/// Classification result: document type plus, for cards, the issuer.
///
/// Lifetime is one extraction call; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContext {
    pub document_type: DocumentType,
    /// Canonical issuer name, when an issuer signature matched.
    pub issuer: Option<String>,
}

impl DocumentContext {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn identity() -> Self {
        Self {
            document_type: DocumentType::Identity,
            issuer: None,
        }
    }

    pub fn insurance_card(issuer: Option<String>) -> Self {
        Self {
            document_type: DocumentType::InsuranceCard,
            issuer,
        }
    }
}

/// Canonical extraction output handed to the caller.
///
/// Every field is independently optional; partial records are valid and
/// expected. Consumers only overwrite a form field when the value here is
/// present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Person's full name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// CPF, digits only (11), checksum-validated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,

    /// RG identity number, digits only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,

    /// Insurance card number; format varies per issuer, whitespace stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,

    /// Birth date (ISO on the wire).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,

    /// Sex; `Unknown` unless a rule or the flagged name heuristic applied.
    #[serde(default)]
    pub sex: Sex,

    /// Canonical insurer name for insurance cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,

    /// Plan name printed on the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,

    /// Classified document type; never absent in a completed record.
    pub document_type: DocumentType,

    /// Overall confidence (0.0 - 1.0), drives the fallback decision.
    pub confidence: f32,

    /// Strategy that produced this record.
    pub method: ExtractionMethod,

    /// Unresolved fields, superseded candidates, fallback reasons, faults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ExtractedRecord {
    /// Empty record for a given classification outcome.
    pub fn empty(document_type: DocumentType) -> Self {
        Self {
            document_type,
            ..Self::default()
        }
    }

    /// Zero-confidence record describing an internal fault.
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }

    /// True when no document field resolved.
    pub fn is_blank(&self) -> bool {
        self.full_name.is_none()
            && self.national_id.is_none()
            && self.identity_number.is_none()
            && self.card_number.is_none()
            && self.birth_date.is_none()
            && self.sex == Sex::Unknown
            && self.plan_name.is_none()
    }
}

impl Sex {
    /// Map a printed token (`M`, `F`, `MASCULINO`, `FEMININO`) to the enum.
    pub fn from_token(token: &str) -> Option<Self> {
        match crate::text::fold_for_match(token.trim()).as_str() {
            "M" | "MASC" | "MASCULINO" => Some(Sex::Male),
            "F" | "FEM" | "FEMININO" => Some(Sex::Female),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_token_mapping() {
        assert_eq!(Sex::from_token("M"), Some(Sex::Male));
        assert_eq!(Sex::from_token("f"), Some(Sex::Female));
        assert_eq!(Sex::from_token("Feminino"), Some(Sex::Female));
        assert_eq!(Sex::from_token("masculino"), Some(Sex::Male));
        assert_eq!(Sex::from_token("X"), None);
    }

    #[test]
    fn test_empty_record_is_blank() {
        let record = ExtractedRecord::empty(DocumentType::Unknown);
        assert!(record.is_blank());
        assert_eq!(record.confidence, 0.0);
        assert_eq!(record.document_type, DocumentType::Unknown);
    }

    #[test]
    fn test_record_serializes_partial() {
        let record = ExtractedRecord {
            full_name: Some("Maria Silva Santos".to_string()),
            document_type: DocumentType::Identity,
            confidence: 1.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"full_name\""));
        assert!(!json.contains("\"card_number\""));
        assert!(json.contains("\"document_type\":\"identity\""));
    }
}
