//! Common regex patterns for Brazilian document extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // CPF patterns (Brazilian national tax ID, 11 digits)
    pub static ref CPF_LABELED: Regex = Regex::new(
        r"(?i)(?:CPF|C\.P\.F\.?)[\s:nº°.]*(\d{3}[.\s]?\d{3}[.\s]?\d{3}[-.\s]?\d{2})"
    ).unwrap();

    pub static ref CPF_SHAPE: Regex = Regex::new(
        r"\b(\d{3})[.\s]?(\d{3})[.\s]?(\d{3})[-.\s]?(\d{2})\b"
    ).unwrap();

    // RG patterns (identity register number, 7-10 digits, may end in X)
    pub static ref RG_LABELED: Regex = Regex::new(
        r"(?i)(?:REGISTRO\s+GERAL|\bRG\b)[\s:nº°.]*([\d][\d.\s-]{5,13}[\dXx])"
    ).unwrap();

    pub static ref RG_SHAPE: Regex = Regex::new(
        r"\b(\d{1,2}\.?\d{3}\.?\d{3}-?[\dXx])\b"
    ).unwrap();

    // Date patterns (DD/MM/YYYY, also . and - separators)
    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})\b"
    ).unwrap();

    pub static ref BIRTH_DATE_LABELED: Regex = Regex::new(
        r"(?i)(?:DATA\s+DE\s+NASC\w*|NASCIMENTO|NASC\.?)[\s:]*(.+?)(?:\n|$)"
    ).unwrap();

    // Sex marker: "SEXO F", "Sexo: M", "SEXO: FEMININO"
    pub static ref SEX_LABELED: Regex = Regex::new(
        r"(?i)SEXO[\s:.]*([MF])(?:ASC\w*|EM\w*)?\b"
    ).unwrap();

    // Name label on the same line: "Nome Maria Silva Santos"
    pub static ref NAME_LABELED: Regex = Regex::new(
        r"(?i)\bNOME\b[\s:.]*([A-Za-zÀ-ÖØ-öø-ÿ][A-Za-zÀ-ÖØ-öø-ÿ'. -]{3,})"
    ).unwrap();

    // Insurance card numbers: generic unlabeled digit run (15-20 digits,
    // optionally space/dot grouped)
    pub static ref CARD_GENERIC: Regex = Regex::new(
        r"\b(\d[\d .]{13,23}\d)\b"
    ).unwrap();

    pub static ref CARD_LABELED: Regex = Regex::new(
        r"(?i)(?:CART(?:AO|ÃO)|CARTEIRINHA|MATRICULA|MATRÍCULA)[\s:nº°.]*([\d][\d .-]{10,24}\d)"
    ).unwrap();

    // Plan name: "Plano: Apartamento", "PLANO ESPECIAL II"
    pub static ref PLAN_LABELED: Regex = Regex::new(
        r"(?i)\bPLANO\b[\s:.]*([A-Za-z0-9À-ÖØ-öø-ÿ][A-Za-z0-9À-ÖØ-öø-ÿ ]{2,})"
    ).unwrap();

    // Accommodation keywords double as plan names on many cards
    pub static ref ACCOMMODATION: Regex = Regex::new(
        r"(?i)\b(APARTAMENTO|ENFERMARIA|QUARTO\s+COLETIVO)\b"
    ).unwrap();

    // ANS registry number printed on regulated insurance cards
    pub static ref ANS_REGISTRY: Regex = Regex::new(
        r"(?i)ANS[\s:nº°.-]*(\d{6})"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpf_labeled() {
        let caps = CPF_LABELED.captures("CPF: 390.533.447-05").unwrap();
        assert_eq!(&caps[1], "390.533.447-05");
        assert!(CPF_LABELED.captures("CPF 39053344705").is_some());
    }

    #[test]
    fn test_rg_labeled() {
        let caps = RG_LABELED.captures("Registro Geral 45.229.385-0").unwrap();
        assert_eq!(&caps[1], "45.229.385-0");
        assert!(RG_LABELED.captures("RG: 12.345.678-X").is_some());
    }

    #[test]
    fn test_date_dmy() {
        let caps = DATE_DMY.captures("nascida em 03/07/1985 em Recife").unwrap();
        assert_eq!(&caps[1], "03");
        assert_eq!(&caps[3], "1985");
        assert!(DATE_DMY.is_match("03.07.1985"));
        assert!(!DATE_DMY.is_match("03/07/85"));
    }

    #[test]
    fn test_sex_labeled() {
        assert_eq!(&SEX_LABELED.captures("Sexo F").unwrap()[1], "F");
        assert_eq!(&SEX_LABELED.captures("SEXO: MASCULINO").unwrap()[1], "M");
        assert!(SEX_LABELED.captures("SEXO ?").is_none());
    }

    #[test]
    fn test_name_labeled() {
        let caps = NAME_LABELED.captures("Nome Maria Silva Santos").unwrap();
        assert_eq!(caps[1].trim(), "Maria Silva Santos");
    }

    #[test]
    fn test_card_generic_length_bounds() {
        assert!(CARD_GENERIC.is_match("123456789012345"));
        assert!(CARD_GENERIC.is_match("0 046 110123456789 0"));
        assert!(!CARD_GENERIC.is_match("1234567890"));
    }

    #[test]
    fn test_plan_and_accommodation() {
        assert_eq!(
            PLAN_LABELED.captures("Plano: Especial II").unwrap()[1].trim(),
            "Especial II"
        );
        assert_eq!(&ACCOMMODATION.captures("acomodação APARTAMENTO").unwrap()[1], "APARTAMENTO");
    }
}
