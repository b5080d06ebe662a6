// src/analyze/salary.rs
//! Best-effort salary/stipend extraction from free text (Brazilian formats).

use once_cell::sync::Lazy;
use regex::Regex;

/// Values at or below this are hourly rates or noise, not a monthly figure.
pub const MIN_MONTHLY_VALUE: f64 = 300.0;

static SALARY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "bolsa auxílio: R$ 1.200", "salário de 2.500,00", "remuneração mensal 1800"
        r"(?:sal[aá]rio|bolsa|remunera[cç][aã]o)(?:\s+(?:aux[ií]lio|mensal|est[aá]gio))?\s*:?\s*(?:de\s*)?(?:r\$\s*)?([\d.,]{3,})",
        // bare currency: "R$ 1.500,00"
        r"r\$\s*([\d.,]{3,})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("salary regex"))
    .collect()
});

/// Returns `"R$ <value as written>"` for the first plausible monthly figure.
pub fn extract_salary(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    for re in SALARY_PATTERNS.iter() {
        for caps in re.captures_iter(&lower) {
            let Some(m) = caps.get(1) else { continue };
            let value = m.as_str().trim_end_matches(['.', ',']);
            if let Some(num) = parse_brl(value) {
                if num > MIN_MONTHLY_VALUE {
                    return Some(format!("R$ {value}"));
                }
            }
        }
    }
    None
}

/// `1.500,00` -> 1500.0 (dot = thousands, comma = decimal).
pub fn parse_brl(value: &str) -> Option<f64> {
    let clean = value.replace('.', "").replace(',', ".");
    clean.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bolsa_with_currency() {
        assert_eq!(
            extract_salary("Bolsa: R$ 1.500,00 mensal"),
            Some("R$ 1.500,00".to_string())
        );
    }

    #[test]
    fn below_floor_is_discarded() {
        assert_eq!(extract_salary("R$ 50"), None);
        assert_eq!(extract_salary("Bolsa de R$ 300,00"), None);
        assert_eq!(extract_salary("valor hora R$ 25,50"), None);
    }

    #[test]
    fn keyword_without_currency_symbol() {
        assert_eq!(
            extract_salary("Salário de 2.800 + benefícios"),
            Some("R$ 2.800".to_string())
        );
        assert_eq!(
            extract_salary("bolsa auxílio 1200"),
            Some("R$ 1200".to_string())
        );
    }

    #[test]
    fn later_match_used_when_first_is_implausible() {
        assert_eq!(
            extract_salary("VR R$ 25,00/dia e bolsa R$ 1.900,00"),
            Some("R$ 1.900,00".to_string())
        );
    }

    #[test]
    fn trailing_punctuation_trimmed() {
        assert_eq!(
            extract_salary("Remuneração: R$ 3.000."),
            Some("R$ 3.000".to_string())
        );
    }

    #[test]
    fn no_mention() {
        assert_eq!(extract_salary("Estágio em TI - Acme"), None);
        assert_eq!(extract_salary(""), None);
    }

    #[test]
    fn brl_parsing() {
        assert_eq!(parse_brl("1.500,00"), Some(1500.0));
        assert_eq!(parse_brl("980"), Some(980.0));
        assert_eq!(parse_brl("..."), None);
    }
}
