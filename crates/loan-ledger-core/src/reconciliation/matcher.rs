//! Locating the loan and ledger position a transaction refers to.

use chrono::NaiveDate;

use crate::calendar::days_apart;
use crate::ledger::LedgerEntry;
use crate::loan::Loan;
use crate::types::Money;

use super::reconciler::ReconcilerConfig;

/// Case-insensitive exact match on the display name.
pub fn find_loan_by_name<'a>(loans: &'a [Loan], name: &str) -> Option<&'a Loan> {
    let wanted = name.trim().to_lowercase();
    loans.iter().find(|l| l.name.trim().to_lowercase() == wanted)
}

/// Position of the payment recorded as period `payment_number`.
///
/// Matches on the stored sequence number, not the position: after a delete
/// the two differ.
pub fn find_payment_index_by_number(loan: &Loan, payment_number: u32) -> Option<usize> {
    loan.ledger
        .payments
        .iter()
        .position(|p| p.sequence_number == payment_number)
}

/// First scheduled payment with the same amount (within the configured
/// epsilon) dated within the configured tolerance of `date`.
pub fn find_payment_index_by_amount_and_date(
    loan: &Loan,
    amount: Money,
    date: NaiveDate,
    config: &ReconcilerConfig,
) -> Option<usize> {
    find_by_amount_and_date(&loan.ledger.payments, amount, date, config)
}

/// Same as [`find_payment_index_by_amount_and_date`] for extra payments.
pub fn find_extra_payment_index_by_amount_and_date(
    loan: &Loan,
    amount: Money,
    date: NaiveDate,
    config: &ReconcilerConfig,
) -> Option<usize> {
    find_by_amount_and_date(&loan.ledger.extra_payments, amount, date, config)
}

fn find_by_amount_and_date<T: LedgerEntry>(
    entries: &[T],
    amount: Money,
    date: NaiveDate,
    config: &ReconcilerConfig,
) -> Option<usize> {
    // transactions carry the sign of the cash flow; ledger amounts do not
    let amount = amount.abs();
    entries.iter().position(|e| {
        (e.amount() - amount).abs() < config.amount_epsilon
            && days_apart(e.date(), date) <= config.tolerance_days
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerCollection;
    use crate::loan::NewLoan;
    use rust_decimal_macros::dec;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn loan_with_payments() -> Loan {
        let mut loan = Loan::originate(
            "owner",
            NewLoan {
                name: "Coche".into(),
                loan_type: Default::default(),
                principal: dec!(12000),
                annual_rate: dec!(0),
                term_months: 12,
                start_date: d(1, 1),
                description: None,
            },
        )
        .unwrap();
        loan.ledger = loan
            .ledger
            .append_payment(dec!(1000), d(2, 1))
            .and_then(|l| l.append_payment(dec!(1000), d(3, 1)))
            .and_then(|l| l.append_payment(dec!(1000), d(4, 1)))
            .unwrap();
        loan
    }

    #[test]
    fn test_find_loan_by_name_ignores_case() {
        let loans = vec![loan_with_payments()];
        assert!(find_loan_by_name(&loans, "coche").is_some());
        assert!(find_loan_by_name(&loans, " COCHE ").is_some());
        assert!(find_loan_by_name(&loans, "Coches").is_none());
    }

    #[test]
    fn test_find_by_number_uses_sequence_not_position() {
        let mut loan = loan_with_payments();
        loan.ledger = loan.ledger.delete_entry(LedgerCollection::Payments, 0).unwrap();
        assert_eq!(find_payment_index_by_number(&loan, 3), Some(1));
        assert_eq!(find_payment_index_by_number(&loan, 1), None);
    }

    #[test]
    fn test_find_by_amount_and_date_within_tolerance() {
        let loan = loan_with_payments();
        let config = ReconcilerConfig::default();
        assert_eq!(
            find_payment_index_by_amount_and_date(&loan, dec!(-1000), d(3, 3), &config),
            Some(1)
        );
        assert_eq!(
            find_payment_index_by_amount_and_date(&loan, dec!(1000.005), d(2, 27), &config),
            Some(1)
        );
        assert_eq!(
            find_payment_index_by_amount_and_date(&loan, dec!(1000), d(3, 5), &config),
            None
        );
        assert_eq!(
            find_payment_index_by_amount_and_date(&loan, dec!(1000.02), d(3, 1), &config),
            None
        );
    }
}
