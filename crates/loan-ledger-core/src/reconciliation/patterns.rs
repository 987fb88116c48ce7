use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SCHEDULED_PAYMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcuota\s+pr[eé]stamo\s+(?P<name>.+?)\s*#\s*(?P<number>\d+)")
        .expect("Invalid regex pattern")
});

static EXTRA_PAYMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bamortizaci[oó]n\s+(?:anticipada\s+)?(?P<name>.+?)\s*$")
        .expect("Invalid regex pattern")
});

/// What a transaction description says about a loan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoanTransactionInfo {
    /// `"Cuota préstamo {name} #{n}"`
    Scheduled { loan_name: String, payment_number: u32 },
    /// `"Amortización [anticipada] {name}"`
    Extra { loan_name: String },
}

impl LoanTransactionInfo {
    pub fn loan_name(&self) -> &str {
        match self {
            LoanTransactionInfo::Scheduled { loan_name, .. } => loan_name,
            LoanTransactionInfo::Extra { loan_name } => loan_name,
        }
    }
}

/// Recognize a loan payment in a transaction description.
///
/// `None` means "no known relation", not a failure.
pub fn detect_loan_transaction(description: &str) -> Option<LoanTransactionInfo> {
    if let Some(caps) = SCHEDULED_PAYMENT.captures(description) {
        let loan_name = caps["name"].trim().to_string();
        let payment_number = caps["number"].parse::<u32>().ok()?;
        if loan_name.is_empty() || payment_number == 0 {
            return None;
        }
        return Some(LoanTransactionInfo::Scheduled {
            loan_name,
            payment_number,
        });
    }

    if let Some(caps) = EXTRA_PAYMENT.captures(description) {
        let loan_name = caps["name"].trim().to_string();
        // "Amortización anticipada" with nothing after it names no loan
        if loan_name.is_empty() || loan_name.eq_ignore_ascii_case("anticipada") {
            return None;
        }
        return Some(LoanTransactionInfo::Extra { loan_name });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{extra_description, scheduled_description};

    #[test]
    fn test_detect_scheduled() {
        assert_eq!(
            detect_loan_transaction("Cuota préstamo Coche #3"),
            Some(LoanTransactionInfo::Scheduled {
                loan_name: "Coche".into(),
                payment_number: 3
            })
        );
    }

    #[test]
    fn test_detect_unrelated_is_none() {
        assert_eq!(detect_loan_transaction("Compra en el super"), None);
        assert_eq!(detect_loan_transaction(""), None);
    }

    #[test]
    fn test_detect_is_case_and_accent_tolerant() {
        assert_eq!(
            detect_loan_transaction("CUOTA PRESTAMO Casa Playa # 12"),
            Some(LoanTransactionInfo::Scheduled {
                loan_name: "Casa Playa".into(),
                payment_number: 12
            })
        );
    }

    #[test]
    fn test_detect_extra_with_and_without_qualifier() {
        assert_eq!(
            detect_loan_transaction("Amortización anticipada Coche"),
            Some(LoanTransactionInfo::Extra {
                loan_name: "Coche".into()
            })
        );
        assert_eq!(
            detect_loan_transaction("amortizacion Hipoteca"),
            Some(LoanTransactionInfo::Extra {
                loan_name: "Hipoteca".into()
            })
        );
        assert_eq!(detect_loan_transaction("Amortización anticipada"), None);
    }

    #[test]
    fn test_canonical_descriptions_round_trip() {
        let info = detect_loan_transaction(&scheduled_description("Moto", 7)).unwrap();
        assert_eq!(info.loan_name(), "Moto");
        assert!(matches!(
            info,
            LoanTransactionInfo::Scheduled {
                payment_number: 7,
                ..
            }
        ));

        let info = detect_loan_transaction(&extra_description("Moto")).unwrap();
        assert_eq!(
            info,
            LoanTransactionInfo::Extra {
                loan_name: "Moto".into()
            }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let info = detect_loan_transaction("Cuota préstamo Coche #3").unwrap();
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], "scheduled");
        assert_eq!(value["loan_name"], "Coche");
        assert_eq!(value["payment_number"], 3);
    }
}
