//! Amortization mathematics: annuity payment, schedule generation and
//! balance / interest lookups at a given number of serviced months.

pub mod engine;
pub mod report;

pub use engine::{
    balance_after, monthly_payment, monthly_rate, schedule, schedule_rows, total_interest,
    total_interest_paid, total_payment, validate_terms, LoanTerms, ScheduleRow, ScheduleRows,
};
pub use report::{amortize, AmortizationInput, AmortizationOutput};
