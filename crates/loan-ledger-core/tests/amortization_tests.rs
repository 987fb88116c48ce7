use chrono::NaiveDate;
use loan_ledger_core::amortization::{
    amortize, balance_after, monthly_payment, schedule, total_interest, total_interest_paid,
    AmortizationInput, LoanTerms,
};
use loan_ledger_core::LoanLedgerError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ===========================================================================
// Payment
// ===========================================================================

#[test]
fn test_reference_payment_ten_thousand_at_twelve_percent() {
    let payment = monthly_payment(dec!(10000), dec!(12), 12).unwrap();
    assert_eq!(payment.round_dp(2), dec!(888.49));
}

#[test]
fn test_zero_rate_is_linear() {
    let payment = monthly_payment(dec!(12000), Decimal::ZERO, 12).unwrap();
    assert_eq!(payment, dec!(1000));
    assert_eq!(total_interest(dec!(12000), Decimal::ZERO, 12).unwrap(), Decimal::ZERO);
}

#[test]
fn test_invalid_terms_are_rejected() {
    for (principal, rate, months) in [
        (Decimal::ZERO, dec!(5), 12),
        (dec!(-100), dec!(5), 12),
        (dec!(1000), dec!(-1), 12),
        (dec!(1000), dec!(5), 0),
    ] {
        let err = monthly_payment(principal, rate, months).unwrap_err();
        assert!(
            matches!(err, LoanLedgerError::InvalidTerms { .. }),
            "{principal} {rate} {months} gave {err:?}"
        );
    }
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn test_schedule_dates_follow_start_date() {
    let rows = schedule(dec!(1200), Decimal::ZERO, 3, date(2024, 1, 31)).unwrap();
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    assert_eq!(
        dates,
        vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]
    );
    assert_eq!(rows.iter().map(|r| r.month).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_schedule_ends_at_zero() {
    let rows = schedule(dec!(10000), dec!(12), 12, date(2024, 1, 1)).unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(rows.last().unwrap().balance.round_dp(2), Decimal::ZERO);
    // First month: 1% of 10000 is interest
    assert_eq!(rows[0].interest, dec!(100));
}

#[test]
fn test_balance_after_bounds() {
    assert_eq!(balance_after(dec!(5000), dec!(6), 24, 0).unwrap(), dec!(5000));
    assert_eq!(balance_after(dec!(5000), dec!(6), 24, 24).unwrap(), Decimal::ZERO);
    assert_eq!(balance_after(dec!(5000), dec!(6), 24, 30).unwrap(), Decimal::ZERO);
}

#[test]
fn test_total_interest_paid_matches_schedule_prefix() {
    let rows = schedule(dec!(20000), dec!(7.5), 48, date(2023, 6, 15)).unwrap();
    let prefix: Decimal = rows.iter().take(10).map(|r| r.interest).sum();
    assert_eq!(total_interest_paid(dec!(20000), dec!(7.5), 48, 10).unwrap(), prefix);
}

#[test]
fn test_amortize_report_rounds_and_totals() {
    let input = AmortizationInput {
        principal: dec!(10000),
        annual_rate: dec!(12),
        term_months: 12,
        start_date: date(2024, 1, 1),
    };
    let output = amortize(&input).unwrap();
    let report = &output.result;

    assert_eq!(report.monthly_payment, dec!(888.49));
    assert_eq!(report.schedule.len(), 12);
    assert_eq!(report.end_date, date(2025, 1, 1));
    assert_eq!(report.total_payment - report.total_interest, dec!(10000));
    assert!(output.warnings.is_empty());
}

#[test]
fn test_amortize_warns_on_zero_rate() {
    let input = AmortizationInput {
        principal: dec!(1200),
        annual_rate: Decimal::ZERO,
        term_months: 12,
        start_date: date(2024, 1, 1),
    };
    let output = amortize(&input).unwrap();
    assert!(!output.warnings.is_empty());
}

#[test]
fn test_loan_terms_end_date() {
    let terms = LoanTerms {
        principal: dec!(1000),
        annual_rate: dec!(3),
        term_months: 36,
        start_date: date(2024, 3, 15),
    };
    assert_eq!(terms.end_date(), date(2027, 3, 15));
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_principal_portions_repay_principal(
        principal in 100u32..1_000_000,
        rate_bp in 0u32..2500,
        months in 1u32..360,
    ) {
        let principal = Decimal::from(principal);
        let rate = Decimal::new(rate_bp as i64, 2);
        let rows = schedule(principal, rate, months, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        let repaid: Decimal = rows.iter().map(|r| r.principal).sum();
        prop_assert!((repaid - principal).abs() < dec!(0.01));
        prop_assert_eq!(rows.len() as u32, months);
    }

    #[test]
    fn prop_balance_never_increases(
        principal in 100u32..500_000,
        rate_bp in 0u32..2500,
        months in 1u32..240,
    ) {
        let rows = schedule(
            Decimal::from(principal),
            Decimal::new(rate_bp as i64, 2),
            months,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ).unwrap();
        let mut previous = Decimal::from(principal);
        for row in &rows {
            prop_assert!(row.balance <= previous);
            prop_assert!(row.balance >= Decimal::ZERO);
            previous = row.balance;
        }
    }

    #[test]
    fn prop_balance_endpoints(
        principal in 1u32..1_000_000,
        rate_bp in 0u32..3000,
        months in 1u32..480,
    ) {
        let principal = Decimal::from(principal);
        let rate = Decimal::new(rate_bp as i64, 2);
        prop_assert_eq!(balance_after(principal, rate, months, 0).unwrap(), principal);
        prop_assert_eq!(balance_after(principal, rate, months, months).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn prop_zero_rate_payment_is_principal_over_months(
        principal in 1u32..1_000_000,
        months in 1u32..480,
    ) {
        let principal = Decimal::from(principal);
        prop_assert_eq!(
            monthly_payment(principal, Decimal::ZERO, months).unwrap(),
            principal / Decimal::from(months)
        );
    }
}
