#![cfg(feature = "simulation")]

use chrono::NaiveDate;
use loan_ledger_core::loan::{LoanType, NewLoan};
use loan_ledger_core::service::LoanService;
use loan_ledger_core::store::InMemoryLoanStore;
use loan_ledger_core::LoanLedgerError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const OWNER: &str = "owner-1";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup(rate: Decimal) -> (LoanService<InMemoryLoanStore>, String) {
    let svc = LoanService::new(Arc::new(InMemoryLoanStore::new()));
    let loan = svc
        .create_loan(
            OWNER,
            NewLoan {
                name: "Reforma".into(),
                loan_type: LoanType::Personal,
                principal: dec!(12000),
                annual_rate: rate,
                term_months: 12,
                start_date: date(2024, 1, 1),
                description: None,
            },
        )
        .unwrap();
    (svc, loan.id)
}

#[test]
fn test_zero_rate_extra_payment_saves_whole_months() {
    let (svc, id) = setup(Decimal::ZERO);
    let sim = svc.simulate_extra_payment(OWNER, &id, dec!(3000)).unwrap().result;

    assert_eq!(sim.current_balance, dec!(12000));
    assert_eq!(sim.new_balance, dec!(9000));
    assert_eq!(sim.remaining_months, 12);
    assert_eq!(sim.new_remaining_months, 9);
    assert_eq!(sim.months_saved, 3);
    assert_eq!(sim.interest_saved, Decimal::ZERO);
    assert_eq!(sim.current_end_date, date(2025, 1, 1));
    assert_eq!(sim.new_end_date, date(2024, 10, 1));
}

#[test]
fn test_simulation_accounts_for_recorded_payments() {
    let (svc, id) = setup(Decimal::ZERO);
    for month in 2..=4 {
        svc.mark_payment(OWNER, &id, None, date(2024, month, 1)).unwrap();
    }
    let sim = svc.simulate_extra_payment(OWNER, &id, dec!(1000)).unwrap().result;
    assert_eq!(sim.current_balance, dec!(9000));
    assert_eq!(sim.new_remaining_months, 8);
    assert_eq!(sim.months_saved, 1);
    assert_eq!(sim.new_end_date, date(2024, 12, 1));
}

#[test]
fn test_paying_the_full_balance_ends_the_loan_now() {
    let (svc, id) = setup(dec!(6));
    let balance = svc.loan_view(OWNER, &id).unwrap().remaining_balance;
    let sim = svc.simulate_extra_payment(OWNER, &id, balance).unwrap().result;
    assert_eq!(sim.new_balance, Decimal::ZERO);
    assert_eq!(sim.new_remaining_months, 0);
    assert_eq!(sim.months_saved, 12);
    assert!(sim.interest_saved > Decimal::ZERO);
}

#[test]
fn test_interest_bearing_loan_saves_interest() {
    let (svc, id) = setup(dec!(12));
    let output = svc.simulate_extra_payment(OWNER, &id, dec!(4000)).unwrap();
    let sim = output.result;
    assert!(sim.months_saved >= 4);
    assert!(sim.interest_saved > Decimal::ZERO);
    assert!(!output.warnings.is_empty());
}

#[test]
fn test_simulation_is_read_only() {
    let (svc, id) = setup(dec!(5));
    let before = svc.get_loan(OWNER, &id).unwrap();
    svc.simulate_extra_payment(OWNER, &id, dec!(100)).unwrap();
    assert_eq!(svc.get_loan(OWNER, &id).unwrap(), before);
}

#[test]
fn test_out_of_range_extra_is_rejected() {
    let (svc, id) = setup(dec!(5));
    for extra in [Decimal::ZERO, dec!(-5), dec!(12000.01)] {
        let err = svc.simulate_extra_payment(OWNER, &id, extra).unwrap_err();
        assert!(matches!(err, LoanLedgerError::InvalidAmount { .. }), "{extra}");
    }
}
