pub mod amortization;
pub mod calendar;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod service;
pub mod store;
pub mod types;

#[cfg(feature = "simulation")]
pub mod simulation;

#[cfg(feature = "reconciliation")]
pub mod reconciliation;

pub use error::LoanLedgerError;
pub use types::*;

/// Standard result type for all loan-ledger operations
pub type LoanLedgerResult<T> = Result<T, LoanLedgerError>;
