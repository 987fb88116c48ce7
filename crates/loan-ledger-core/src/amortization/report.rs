//! Schedule report: the amortization engine wrapped in the standard
//! computation envelope for CLI and binding callers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::engine::{total_payment, LoanTerms, ScheduleRow};
use crate::error::LoanLedgerError;
use crate::types::{checked_sum, round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::LoanLedgerResult;

/// Terms beyond this many months get a warning; 40 years covers real mortgages.
const LONG_TERM_WARNING_MONTHS: u32 = 480;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    pub principal: Money,
    /// Annual rate in percent.
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub monthly_payment: Money,
    pub total_payment: Money,
    pub total_interest: Money,
    pub end_date: NaiveDate,
    pub schedule: Vec<ScheduleRow>,
}

impl From<&AmortizationInput> for LoanTerms {
    fn from(input: &AmortizationInput) -> Self {
        LoanTerms {
            principal: input.principal,
            annual_rate: input.annual_rate,
            term_months: input.term_months,
            start_date: input.start_date,
        }
    }
}

/// Build the full schedule with totals, rounded to cents for display.
pub fn amortize(input: &AmortizationInput) -> LoanLedgerResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = LoanTerms::from(input);
    let rows = terms.schedule()?;
    let payment = terms.monthly_payment()?;

    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: principal amortizes linearly".into());
    }
    if input.term_months > LONG_TERM_WARNING_MONTHS {
        warnings.push(format!(
            "Term of {} months exceeds {} months",
            input.term_months, LONG_TERM_WARNING_MONTHS
        ));
    }

    let total_interest = checked_sum(rows.iter().map(|r| r.interest)).ok_or_else(|| {
        LoanLedgerError::invalid_terms(
            "principal",
            format!(
                "Interest on {} over {} months is out of range",
                input.principal, input.term_months
            ),
        )
    })?;
    let total_payment = total_payment(input.principal, input.annual_rate, input.term_months)?;

    log::debug!(
        "amortized {} over {} months at {}%: payment {}",
        input.principal,
        input.term_months,
        input.annual_rate,
        payment
    );

    let output = AmortizationOutput {
        monthly_payment: round_money(payment),
        total_payment: round_money(total_payment),
        total_interest: round_money(total_interest),
        end_date: terms.end_date(),
        schedule: rows.iter().map(ScheduleRow::rounded).collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French amortization (constant annuity payment, monthly compounding)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanLedgerError;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn input(rate: Decimal) -> AmortizationInput {
        AmortizationInput {
            principal: dec!(12000),
            annual_rate: rate,
            term_months: 12,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_amortize_zero_rate_warns_and_totals() {
        let out = amortize(&input(dec!(0))).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(1000));
        assert_eq!(out.result.total_interest, dec!(0));
        assert_eq!(out.result.total_payment, dec!(12000));
        assert_eq!(out.result.schedule.len(), 12);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_amortize_end_date() {
        let out = amortize(&input(dec!(6))).unwrap();
        assert_eq!(
            out.result.end_date,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_amortize_rejects_bad_terms() {
        let mut bad = input(dec!(6));
        bad.term_months = 0;
        assert!(amortize(&bad).is_err());
    }

    #[test]
    fn test_amortize_totals_out_of_range_are_invalid_terms() {
        let huge = AmortizationInput {
            principal: dec!(10000000000000000000000000000),
            annual_rate: dec!(100),
            term_months: 120,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let err = amortize(&huge).unwrap_err();
        assert!(matches!(
            err,
            LoanLedgerError::InvalidTerms { ref field, .. } if field == "principal"
        ));
    }
}
