//! The derived loan view.
//!
//! A pure function of (terms, ledger): recomputed on every read, never
//! cached and never written back. Extra payments lower the remaining balance
//! but leave the end date where the original terms put it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::model::{Loan, LoanStatus};
use crate::calendar::add_months;
use crate::types::{round_money, Money};
use crate::LoanLedgerResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: String,
    pub name: String,
    pub status: LoanStatus,
    pub monthly_payment: Money,
    pub paid_months: u32,
    pub remaining_months: u32,
    /// Baseline balance after `paid_months`, less all extra payments; never negative.
    pub remaining_balance: Money,
    /// Share of the term serviced, capped at 100.
    pub progress_percent: Decimal,
    pub next_payment_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_interest_paid_to_date: Money,
    pub total_extra_paid: Money,
    pub total_paid: Money,
    /// Interest over the full baseline schedule.
    pub total_interest: Money,
    /// Advisory only: status is never changed because of it.
    pub is_paid_off: bool,
}

/// Combine a loan's terms and ledger into its current view.
pub fn compute_view(loan: &Loan) -> LoanLedgerResult<LoanView> {
    let terms = loan.terms();
    let paid_months = loan.ledger.paid_months();

    let monthly_payment = terms.monthly_payment()?;
    let base_balance = terms.balance_after(paid_months)?;
    let total_extra = loan.ledger.total_extra()?;
    let remaining_balance = round_money((base_balance - total_extra).max(Decimal::ZERO));

    let progress = Decimal::from(paid_months) / Decimal::from(terms.term_months) * dec!(100);
    let progress_percent = progress.min(dec!(100)).round_dp(2);

    let total_interest_paid_to_date = terms.total_interest_paid(paid_months)?;
    let total_interest = terms.total_interest_paid(terms.term_months)?;

    if paid_months > terms.term_months {
        log::warn!(
            "loan {} has {} payments recorded against a {}-month term",
            loan.id,
            paid_months,
            terms.term_months
        );
    }

    Ok(LoanView {
        loan_id: loan.id.clone(),
        name: loan.name.clone(),
        status: loan.status,
        monthly_payment: round_money(monthly_payment),
        paid_months,
        remaining_months: terms.term_months.saturating_sub(paid_months),
        remaining_balance,
        progress_percent,
        next_payment_date: add_months(terms.start_date, paid_months + 1),
        end_date: terms.end_date(),
        total_interest_paid_to_date: round_money(total_interest_paid_to_date),
        total_extra_paid: round_money(total_extra),
        total_paid: round_money(loan.ledger.total_paid()?),
        total_interest: round_money(total_interest),
        is_paid_off: remaining_balance.is_zero(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanLedgerError;
    use crate::loan::model::{LoanType, NewLoan};

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn car_loan() -> Loan {
        Loan::originate(
            "owner",
            NewLoan {
                name: "Coche".into(),
                loan_type: LoanType::Auto,
                principal: dec!(12000),
                annual_rate: dec!(0),
                term_months: 12,
                start_date: jan(1),
                description: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_view_of_fresh_loan() {
        let view = compute_view(&car_loan()).unwrap();
        assert_eq!(view.paid_months, 0);
        assert_eq!(view.remaining_balance, dec!(12000));
        assert_eq!(view.progress_percent, dec!(0));
        assert_eq!(view.next_payment_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(view.end_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(!view.is_paid_off);
    }

    #[test]
    fn test_view_after_six_payments() {
        let mut loan = car_loan();
        for _ in 0..6 {
            loan.ledger = loan.ledger.append_payment(dec!(1000), jan(2)).unwrap();
        }
        let view = compute_view(&loan).unwrap();
        assert_eq!(view.remaining_balance, dec!(6000));
        assert_eq!(view.progress_percent, dec!(50));
        assert_eq!(view.remaining_months, 6);
        assert_eq!(view.next_payment_date, NaiveDate::from_ymd_opt(2024, 8, 1).unwrap());
        assert_eq!(view.total_paid, dec!(6000));
    }

    #[test]
    fn test_extra_payment_lowers_balance_not_end_date() {
        let mut loan = car_loan();
        loan.ledger = loan.ledger.append_extra_payment(dec!(2500), jan(5)).unwrap();
        let view = compute_view(&loan).unwrap();
        assert_eq!(view.remaining_balance, dec!(9500));
        assert_eq!(view.end_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(view.total_extra_paid, dec!(2500));
    }

    #[test]
    fn test_balance_clamped_and_status_untouched() {
        let mut loan = car_loan();
        loan.ledger = loan.ledger.append_extra_payment(dec!(20000), jan(5)).unwrap();
        let view = compute_view(&loan).unwrap();
        assert_eq!(view.remaining_balance, Decimal::ZERO);
        assert!(view.is_paid_off);
        assert_eq!(view.status, LoanStatus::Active);
    }

    #[test]
    fn test_progress_capped_past_term() {
        let mut loan = car_loan();
        for _ in 0..14 {
            loan.ledger = loan.ledger.append_payment(dec!(1000), jan(2)).unwrap();
        }
        let view = compute_view(&loan).unwrap();
        assert_eq!(view.progress_percent, dec!(100));
        assert_eq!(view.remaining_months, 0);
        assert_eq!(view.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_paid_total_out_of_range_is_an_error() {
        let mut loan = car_loan();
        for _ in 0..2 {
            loan.ledger = loan
                .ledger
                .append_payment(dec!(50000000000000000000000000000), jan(2))
                .unwrap();
        }
        let err = compute_view(&loan).unwrap_err();
        assert!(matches!(err, LoanLedgerError::InvalidAmount { .. }));
    }
}
