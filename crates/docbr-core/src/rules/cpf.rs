//! CPF (Brazilian national tax ID) extraction and validation.

use super::patterns::{CPF_LABELED, CPF_SHAPE};

/// One CPF match with the id of the rule that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpfMatch {
    /// Digits only, 11 characters.
    pub digits: String,
    pub rule_id: &'static str,
}

/// Extract the first checksum-valid CPF from a line of text.
///
/// The labeled pattern is tried first; an unlabeled CPF-shaped number is
/// accepted only when its verification digits hold, so ordinary 11-digit
/// runs (phone numbers, card fragments) are not misread as CPFs.
pub fn extract_cpf(text: &str) -> Option<CpfMatch> {
    for caps in CPF_LABELED.captures_iter(text) {
        let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
        if validate_cpf(&digits) {
            return Some(CpfMatch {
                digits,
                rule_id: "cpf:labeled",
            });
        }
    }

    for caps in CPF_SHAPE.captures_iter(text) {
        let digits = format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4]);
        if validate_cpf(&digits) {
            return Some(CpfMatch {
                digits,
                rule_id: "cpf:shape",
            });
        }
    }

    None
}

/// Validate a CPF using the modulo-11 double check digit.
///
/// The input may contain punctuation; only digits are considered. CPFs with
/// all eleven digits equal pass the arithmetic but are defined as invalid.
pub fn validate_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = cpf
        .chars()
        .filter(|c| c.is_ascii_digit())
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }

    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    let check = |count: usize| -> u32 {
        let sum: u32 = digits
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, d)| d * (count as u32 + 1 - i as u32))
            .sum();
        let rem = (sum * 10) % 11;
        if rem == 10 { 0 } else { rem }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// Format a CPF with punctuation (XXX.XXX.XXX-XX).
pub fn format_cpf(cpf: &str) -> String {
    let digits: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 11 {
        return cpf.to_string();
    }

    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}
