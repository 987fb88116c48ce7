//! Extra payment preview.
//!
//! Projects the effect of a hypothetical principal-only payment on the
//! remaining term. The loan keeps its monthly payment; the balance is walked
//! forward month by month from the reduced amount, bounded by the months
//! that were left before the extra payment.
//!
//! `interest_saved` is approximated as the payments no longer due minus the
//! principal brought forward. It is not a difference of two full schedules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::monthly_rate;
use crate::calendar::add_months;
use crate::error::LoanLedgerError;
use crate::loan::{compute_view, Loan};
use crate::types::{round_money, with_metadata, ComputationOutput, Money};
use crate::LoanLedgerResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraPaymentSimulation {
    pub extra_amount: Money,
    pub current_balance: Money,
    pub new_balance: Money,
    pub remaining_months: u32,
    pub new_remaining_months: u32,
    pub months_saved: u32,
    pub interest_saved: Money,
    pub current_end_date: NaiveDate,
    pub new_end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct SimulationAssumptions<'a> {
    loan_id: &'a str,
    extra_amount: Money,
    monthly_payment: Money,
    annual_rate: Decimal,
}

/// Preview a principal-only payment of `extra_amount` against `loan`.
///
/// Refused with `InvalidAmount` unless `0 < extra_amount <= remaining balance`.
pub fn simulate_extra_payment(
    loan: &Loan,
    extra_amount: Money,
) -> LoanLedgerResult<ComputationOutput<ExtraPaymentSimulation>> {
    let start = Instant::now();

    let view = compute_view(loan)?;
    let current_balance = view.remaining_balance;

    if extra_amount <= Decimal::ZERO {
        return Err(LoanLedgerError::invalid_amount(
            "extra_amount",
            format!("Extra payment must be greater than zero, got {extra_amount}"),
        ));
    }
    if extra_amount > current_balance {
        return Err(LoanLedgerError::invalid_amount(
            "extra_amount",
            format!("Extra payment {extra_amount} exceeds the remaining balance {current_balance}"),
        ));
    }

    let payment = loan.monthly_payment()?;
    let rate = monthly_rate(loan.annual_rate);
    let new_balance = (current_balance - extra_amount).max(Decimal::ZERO);
    let remaining_months = view.remaining_months;
    let new_remaining_months = months_to_repay(new_balance, payment, rate, remaining_months);

    let months_saved = remaining_months - new_remaining_months;
    let principal_brought_forward = current_balance - new_balance;
    let interest_saved = Decimal::from(months_saved)
        .checked_mul(payment)
        .map(|saved| (saved - principal_brought_forward).max(Decimal::ZERO))
        .ok_or_else(|| {
            LoanLedgerError::invalid_terms(
                "principal",
                format!("Payments over {months_saved} saved months are out of range"),
            )
        })?;

    let new_end_date = add_months(loan.start_date, view.paid_months + new_remaining_months);

    log::debug!(
        "simulated extra {} on loan {}: {} months saved",
        extra_amount,
        loan.id,
        months_saved
    );

    let result = ExtraPaymentSimulation {
        extra_amount,
        current_balance,
        new_balance: round_money(new_balance),
        remaining_months,
        new_remaining_months,
        months_saved,
        interest_saved: round_money(interest_saved),
        current_end_date: view.end_date,
        new_end_date,
    };

    let warnings = vec![
        "interest_saved is approximated as months_saved × monthly_payment − principal brought forward"
            .to_string(),
    ];
    let assumptions = SimulationAssumptions {
        loan_id: &loan.id,
        extra_amount,
        monthly_payment: round_money(payment),
        annual_rate: loan.annual_rate,
    };

    Ok(with_metadata(
        "Constant-payment forward walk from the reduced balance",
        &assumptions,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    ))
}

/// Months of `payment` needed to clear `balance`, capped at `limit`.
///
/// The cap keeps a payment that does not cover interest from looping forever.
fn months_to_repay(balance: Money, payment: Money, rate: Decimal, limit: u32) -> u32 {
    let mut balance = balance;
    let mut months = 0;
    while balance > Decimal::ZERO && months < limit {
        let interest = balance * rate;
        balance -= payment - interest;
        months += 1;
    }
    months
}
