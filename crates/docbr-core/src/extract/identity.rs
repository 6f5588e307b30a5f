//! Field extractor for national identity documents (RG).

use tracing::debug;

use crate::models::config::PipelineConfig;
use crate::rules::patterns::{
    BIRTH_DATE_LABELED, DATE_DMY, NAME_LABELED, RG_LABELED, RG_SHAPE, SEX_LABELED,
};
use crate::rules::{
    extract_cpf, find_anchor, looks_like_person_name, scan_window, validate_cpf, FieldCandidate,
    FieldName, RuleTier,
};
use crate::models::record::Sex;
use crate::text::{contains_folded, RawText};

/// Extract raw field candidates from an identity-document transcript.
pub fn extract(text: &RawText, config: &PipelineConfig) -> Vec<FieldCandidate> {
    let lines = text.lines();
    let window = config.bounded_window();

    let mut candidates = Vec::new();
    candidates.extend(full_name(lines, window));
    candidates.extend(national_id(lines));
    candidates.extend(identity_number(lines, window));
    candidates.extend(birth_date(lines));
    candidates.extend(sex(lines, window));

    debug!(count = candidates.len(), "identity extraction produced candidates");
    candidates
}

fn full_name(lines: &[String], window: usize) -> Option<FieldCandidate> {
    // Labeled on the same line: "Nome Maria Silva Santos"
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = NAME_LABELED.captures(line) {
            let value = caps[1].trim();
            if looks_like_person_name(value) {
                return Some(
                    FieldCandidate::new(
                        FieldName::FullName,
                        value,
                        "identity:name-labeled",
                        RuleTier::Primary,
                    )
                    .at_line(i),
                );
            }
        }
    }

    // Label on its own line, value within the window below
    let anchor = find_anchor(lines, "NOME")?;
    scan_window(lines, anchor, window, looks_like_person_name).map(|(i, line)| {
        FieldCandidate::new(
            FieldName::FullName,
            line.trim(),
            "identity:name-window",
            RuleTier::Context,
        )
        .at_line(i)
    })
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

fn identity_number(lines: &[String], window: usize) -> Option<FieldCandidate> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = RG_LABELED.captures(line) {
            let value = caps[1].trim();
            // An 11-digit checksum-valid number is a CPF, not an RG
            if !validate_cpf(value) {
                return Some(
                    FieldCandidate::new(
                        FieldName::IdentityNumber,
                        value,
                        "identity:rg-labeled",
                        RuleTier::Primary,
                    )
                    .at_line(i),
                );
            }
        }
    }

    // Registry header line, number within the window below
    let anchor = find_anchor(lines, "REGISTRO GERAL")?;
    let hit = scan_window(lines, anchor, window, |l| {
        RG_SHAPE.is_match(l) && !validate_cpf(l)
    })?;
    let (i, line) = hit;
    RG_SHAPE.captures(line).map(|caps| {
        FieldCandidate::new(
            FieldName::IdentityNumber,
            caps[1].trim(),
            "identity:rg-window",
            RuleTier::Context,
        )
        .at_line(i)
    })
}

fn birth_date(lines: &[String]) -> Option<FieldCandidate> {
    // Labeled: "Data de Nascimento: 03/07/1985"
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = BIRTH_DATE_LABELED.captures(line) {
            if let Some(date) = DATE_DMY.find(&caps[1]) {
                return Some(
                    FieldCandidate::new(
                        FieldName::BirthDate,
                        date.as_str(),
                        "identity:birth-labeled",
                        RuleTier::Primary,
                    )
                    .at_line(i),
                );
            }
        }
    }

    // First unlabeled date, skipping issue/expiry lines
    for (i, line) in lines.iter().enumerate() {
        if contains_folded(line, "EXPEDICAO")
            || contains_folded(line, "EMISSAO")
            || contains_folded(line, "VALIDADE")
        {
            continue;
        }
        if let Some(date) = DATE_DMY.find(line) {
            return Some(
                FieldCandidate::new(
                    FieldName::BirthDate,
                    date.as_str(),
                    "identity:date-first",
                    RuleTier::Primary,
                )
                .at_line(i),
            );
        }
    }

    None
}

fn sex(lines: &[String], window: usize) -> Option<FieldCandidate> {
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = SEX_LABELED.captures(line) {
            return Some(
                FieldCandidate::new(FieldName::Sex, &caps[1], "identity:sex-labeled", RuleTier::Primary)
                    .at_line(i),
            );
        }
    }

    // Marker on its own line, single-letter value below
    let anchor = find_anchor(lines, "SEXO")?;
    scan_window(lines, anchor, window, |l| Sex::from_token(l).is_some()).map(|(i, line)| {
        FieldCandidate::new(FieldName::Sex, line.trim(), "identity:sex-window", RuleTier::Context)
            .at_line(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn test_labeled_fields() {
        let text = RawText::from(
            "REGISTRO GERAL 45.229.385-0\n\
             Nome Maria Silva Santos\n\
             CPF 390.533.447-05\n\
             Data de Nascimento 03/07/1985\n\
             Sexo F",
        );
        let candidates = extract(&text, &config());

        let by_field = |f: FieldName| candidates.iter().find(|c| c.field == f);
        assert_eq!(by_field(FieldName::FullName).unwrap().raw_value, "Maria Silva Santos");
        assert_eq!(by_field(FieldName::NationalId).unwrap().raw_value, "39053344705");
        assert_eq!(by_field(FieldName::IdentityNumber).unwrap().raw_value, "45.229.385-0");
        assert_eq!(by_field(FieldName::BirthDate).unwrap().raw_value, "03/07/1985");
        assert_eq!(by_field(FieldName::Sex).unwrap().raw_value, "F");
        assert!(candidates.iter().all(|c| c.tier == RuleTier::Primary));
    }

    #[test]
    fn test_name_from_window_below_label() {
        let text = RawText::from("CARTEIRA DE IDENTIDADE\nNOME\nJoão Pedro Albuquerque\n12.345.678-9");
        let candidates = extract(&text, &config());
        let name = candidates.iter().find(|c| c.field == FieldName::FullName).unwrap();
        assert_eq!(name.raw_value, "João Pedro Albuquerque");
        assert_eq!(name.rule_id, "identity:name-window");
        assert_eq!(name.tier, RuleTier::Context);
        assert_eq!(name.line_index, Some(2));
    }

    #[test]
    fn test_rg_window_skips_cpf() {
        let text = RawText::from("REGISTRO GERAL\n390.533.447-05\n45.229.385-0");
        let candidates = extract(&text, &config());
        let rg = candidates.iter().find(|c| c.field == FieldName::IdentityNumber).unwrap();
        assert_eq!(rg.raw_value, "45.229.385-0");
    }

    #[test]
    fn test_birth_date_skips_issue_date() {
        let text = RawText::from(
            "REGISTRO GERAL\nData de Expedição 10/02/2019\nNascimento 03/07/1985",
        );
        let candidates = extract(&text, &config());
        let birth = candidates.iter().find(|c| c.field == FieldName::BirthDate).unwrap();
        assert_eq!(birth.raw_value, "03/07/1985");
        assert_eq!(birth.rule_id, "identity:birth-labeled");
    }

    #[test]
    fn test_absent_fields_produce_no_candidates() {
        let text = RawText::from("REGISTRO GERAL");
        let candidates = extract(&text, &config());
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_field_independence() {
        // Removing a line irrelevant to the name must not change the name
        let with = RawText::from("REGISTRO GERAL\nNome Maria Silva Santos\nSexo F");
        let without = RawText::from("REGISTRO GERAL\nNome Maria Silva Santos");
        let name_of = |t: &RawText| {
            extract(t, &config())
                .into_iter()
                .find(|c| c.field == FieldName::FullName)
                .map(|c| c.raw_value)
        };
        assert_eq!(name_of(&with), name_of(&without));
    }
}
