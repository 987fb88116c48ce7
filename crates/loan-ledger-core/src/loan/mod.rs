//! Loans: static terms plus the ledger they own, the derived view computed
//! from both, and the persisted record shape.

pub mod aggregate;
pub mod model;
pub mod record;

pub use aggregate::{compute_view, LoanView};
pub use model::{Loan, LoanDetailsUpdate, LoanStatus, LoanType, NewLoan};
pub use record::{ExtraPaymentRecord, LoanRecord, PaymentRecord};
