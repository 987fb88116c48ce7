//! Pure amortization math. No state, no I/O: every function is a deterministic
//! function of (principal, annual rate, term, start date).
//!
//! Annual rates are percentages (`12` = 12% a year). The monthly rate is
//! `annual / 100 / 12`. A zero rate amortizes linearly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::error::LoanLedgerError;
use crate::types::{checked_sum, round_money, Money, Rate};
use crate::LoanLedgerResult;

const PERCENT: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The static terms a loan is originated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual interest rate in percent.
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
}

/// One period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period number.
    pub month: u32,
    pub date: NaiveDate,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    /// Outstanding balance after this period's payment.
    pub balance: Money,
}

impl ScheduleRow {
    /// Copy of the row with every amount rounded to cents.
    pub fn rounded(&self) -> ScheduleRow {
        ScheduleRow {
            month: self.month,
            date: self.date,
            payment: round_money(self.payment),
            principal: round_money(self.principal),
            interest: round_money(self.interest),
            balance: round_money(self.balance),
        }
    }
}

/// Lazily generated schedule rows.
///
/// Lookups that only need the first `k` periods (balance after `k` payments,
/// interest paid so far) walk just those rows instead of building the whole
/// table.
#[derive(Debug, Clone)]
pub struct ScheduleRows {
    payment: Money,
    rate: Rate,
    balance: Money,
    month: u32,
    months: u32,
    start_date: NaiveDate,
}

impl Iterator for ScheduleRows {
    type Item = ScheduleRow;

    fn next(&mut self) -> Option<ScheduleRow> {
        if self.month >= self.months {
            return None;
        }
        self.month += 1;

        let interest = self.balance * self.rate;
        let principal = self.payment - interest;
        self.balance -= principal;
        // absorb floating drift on the final periods
        if self.balance < Decimal::ZERO {
            self.balance = Decimal::ZERO;
        }

        Some(ScheduleRow {
            month: self.month,
            date: add_months(self.start_date, self.month),
            payment: self.payment,
            principal,
            interest,
            balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.months - self.month) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ScheduleRows {}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Monthly rate as a plain decimal from an annual percentage.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / PERCENT / MONTHS_PER_YEAR
}

/// Reject terms no schedule can be produced for.
pub fn validate_terms(principal: Money, annual_rate: Rate, months: u32) -> LoanLedgerResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanLedgerError::invalid_terms(
            "principal",
            format!("Principal must be positive, got {principal}"),
        ));
    }
    if annual_rate < Decimal::ZERO {
        return Err(LoanLedgerError::invalid_terms(
            "annual_rate",
            format!("Annual rate cannot be negative, got {annual_rate}"),
        ));
    }
    if months == 0 {
        return Err(LoanLedgerError::invalid_terms(
            "term_months",
            "Term must be at least 1 month",
        ));
    }
    Ok(())
}

/// Constant monthly payment that fully repays `principal` over `months`.
///
/// Linear (`principal / months`) at a zero rate, the annuity formula
/// `P·r·(1+r)^n / ((1+r)^n − 1)` otherwise.
pub fn monthly_payment(principal: Money, annual_rate: Rate, months: u32) -> LoanLedgerResult<Money> {
    validate_terms(principal, annual_rate, months)?;

    let n = Decimal::from(months);
    if annual_rate.is_zero() {
        return Ok(principal / n);
    }

    let r = monthly_rate(annual_rate);
    let factor = (Decimal::ONE + r).checked_powu(months as u64).ok_or_else(|| {
        LoanLedgerError::invalid_terms(
            "annual_rate",
            format!("Compounding {annual_rate}% over {months} months overflows"),
        )
    })?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        // rate too small to register at 28 digits: indistinguishable from linear
        return Ok(principal / n);
    }

    r.checked_mul(factor)
        .map(|scaled| scaled / denominator)
        .and_then(|multiplier| principal.checked_mul(multiplier))
        .ok_or_else(|| {
            LoanLedgerError::invalid_terms(
                "principal",
                format!("Monthly payment on {principal} at {annual_rate}% is out of range"),
            )
        })
}

/// Lazy schedule iterator; validates terms up front.
pub fn schedule_rows(
    principal: Money,
    annual_rate: Rate,
    months: u32,
    start_date: NaiveDate,
) -> LoanLedgerResult<ScheduleRows> {
    let payment = monthly_payment(principal, annual_rate, months)?;
    Ok(ScheduleRows {
        payment,
        rate: monthly_rate(annual_rate),
        balance: principal,
        month: 0,
        months,
        start_date,
    })
}

/// Full amortization schedule, one row per month `1..=months`.
pub fn schedule(
    principal: Money,
    annual_rate: Rate,
    months: u32,
    start_date: NaiveDate,
) -> LoanLedgerResult<Vec<ScheduleRow>> {
    Ok(schedule_rows(principal, annual_rate, months, start_date)?.collect())
}

/// Outstanding balance once `paid_months` scheduled payments have been made.
///
/// `principal` when nothing is paid, zero once the term is fully serviced
/// (or overrun), otherwise the schedule balance after period `paid_months`.
pub fn balance_after(
    principal: Money,
    annual_rate: Rate,
    months: u32,
    paid_months: u32,
) -> LoanLedgerResult<Money> {
    validate_terms(principal, annual_rate, months)?;
    if paid_months == 0 {
        return Ok(principal);
    }
    if paid_months >= months {
        return Ok(Decimal::ZERO);
    }

    // start date does not affect balances
    let rows = schedule_rows(principal, annual_rate, months, NaiveDate::MIN)?;
    Ok(rows
        .take(paid_months as usize)
        .last()
        .map(|row| row.balance)
        .unwrap_or(principal))
}

/// Interest contained in the first `paid_months` scheduled payments.
pub fn total_interest_paid(
    principal: Money,
    annual_rate: Rate,
    months: u32,
    paid_months: u32,
) -> LoanLedgerResult<Money> {
    validate_terms(principal, annual_rate, months)?;
    if paid_months == 0 {
        return Ok(Decimal::ZERO);
    }
    let rows = schedule_rows(principal, annual_rate, months, NaiveDate::MIN)?;
    checked_sum(rows.take(paid_months as usize).map(|row| row.interest))
        .ok_or_else(|| interest_overflow(principal, months))
}

/// Constant payment times the term.
pub fn total_payment(principal: Money, annual_rate: Rate, months: u32) -> LoanLedgerResult<Money> {
    monthly_payment(principal, annual_rate, months)?
        .checked_mul(Decimal::from(months))
        .ok_or_else(|| {
            LoanLedgerError::invalid_terms(
                "principal",
                format!("Total repaid on {principal} over {months} months is out of range"),
            )
        })
}

fn interest_overflow(principal: Money, months: u32) -> LoanLedgerError {
    LoanLedgerError::invalid_terms(
        "principal",
        format!("Interest on {principal} over {months} months is out of range"),
    )
}

/// Interest over the whole baseline schedule.
pub fn total_interest(principal: Money, annual_rate: Rate, months: u32) -> LoanLedgerResult<Money> {
    total_interest_paid(principal, annual_rate, months, months)
}

impl LoanTerms {
    pub fn validate(&self) -> LoanLedgerResult<()> {
        validate_terms(self.principal, self.annual_rate, self.term_months)
    }

    pub fn monthly_payment(&self) -> LoanLedgerResult<Money> {
        monthly_payment(self.principal, self.annual_rate, self.term_months)
    }

    pub fn schedule(&self) -> LoanLedgerResult<Vec<ScheduleRow>> {
        schedule(
            self.principal,
            self.annual_rate,
            self.term_months,
            self.start_date,
        )
    }

    pub fn balance_after(&self, paid_months: u32) -> LoanLedgerResult<Money> {
        balance_after(
            self.principal,
            self.annual_rate,
            self.term_months,
            paid_months,
        )
    }

    pub fn total_interest_paid(&self, paid_months: u32) -> LoanLedgerResult<Money> {
        total_interest_paid(
            self.principal,
            self.annual_rate,
            self.term_months,
            paid_months,
        )
    }

    /// Date of the final scheduled payment.
    pub fn end_date(&self) -> NaiveDate {
        add_months(self.start_date, self.term_months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_monthly_payment_zero_rate_is_linear() {
        let pmt = monthly_payment(dec!(12000), dec!(0), 12).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_monthly_payment_annuity_reference() {
        // 10,000 at 12% over 12 months: textbook 888.49
        let pmt = monthly_payment(dec!(10000), dec!(12), 12).unwrap();
        assert!((pmt - dec!(888.49)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_monthly_payment_30y_mortgage() {
        // 250,000 at 5% over 360 months ≈ 1342.05
        let pmt = monthly_payment(dec!(250000), dec!(5), 360).unwrap();
        assert!((pmt - dec!(1342.05)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_invalid_terms_rejected() {
        assert!(matches!(
            monthly_payment(dec!(0), dec!(5), 12),
            Err(LoanLedgerError::InvalidTerms { ref field, .. }) if field == "principal"
        ));
        assert!(matches!(
            monthly_payment(dec!(1000), dec!(-1), 12),
            Err(LoanLedgerError::InvalidTerms { ref field, .. }) if field == "annual_rate"
        ));
        assert!(matches!(
            schedule(dec!(1000), dec!(5), 0, start()),
            Err(LoanLedgerError::InvalidTerms { ref field, .. }) if field == "term_months"
        ));
    }

    #[test]
    fn test_schedule_rows_are_dated_monthly() {
        let rows = schedule(dec!(12000), dec!(0), 12, start()).unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(rows[11].date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(rows[11].balance, Decimal::ZERO);
    }

    #[test]
    fn test_schedule_first_row_split() {
        let rows = schedule(dec!(10000), dec!(12), 12, start()).unwrap();
        // first month interest = 10,000 * 1% = 100
        assert_eq!(rows[0].interest, dec!(100));
        assert_eq!(rows[0].principal, rows[0].payment - dec!(100));
    }

    #[test]
    fn test_balance_after_endpoints() {
        assert_eq!(balance_after(dec!(5000), dec!(7), 24, 0).unwrap(), dec!(5000));
        assert_eq!(balance_after(dec!(5000), dec!(7), 24, 24).unwrap(), Decimal::ZERO);
        assert_eq!(balance_after(dec!(5000), dec!(7), 24, 30).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_balance_after_zero_rate_midway() {
        assert_eq!(balance_after(dec!(12000), dec!(0), 12, 6).unwrap(), dec!(6000));
    }

    #[test]
    fn test_total_interest_paid_first_month() {
        let paid = total_interest_paid(dec!(10000), dec!(12), 12, 1).unwrap();
        assert_eq!(paid, dec!(100));
        assert_eq!(
            total_interest_paid(dec!(10000), dec!(12), 12, 0).unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_total_interest_matches_payments_minus_principal() {
        let pmt = monthly_payment(dec!(10000), dec!(12), 12).unwrap();
        let interest = total_interest(dec!(10000), dec!(12), 12).unwrap();
        let expected = pmt * dec!(12) - dec!(10000);
        assert!((interest - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn test_loan_terms_end_date() {
        let terms = LoanTerms {
            principal: dec!(1000),
            annual_rate: dec!(3),
            term_months: 18,
            start_date: start(),
        };
        assert_eq!(terms.end_date(), NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
    }
}
