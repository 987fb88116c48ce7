//! Advisory links between free-text transactions and loan ledgers.
//!
//! Transactions and ledger entries share no key. The only relation is the
//! description text the app writes when a payment is recorded, so matching is
//! heuristic and every outcome is a suggestion the user confirms. Failing to
//! find a match is not an error.

pub mod matcher;
pub mod patterns;
pub mod reconciler;

pub use matcher::{
    find_extra_payment_index_by_amount_and_date, find_loan_by_name,
    find_payment_index_by_amount_and_date, find_payment_index_by_number,
};
pub use patterns::{detect_loan_transaction, LoanTransactionInfo};
pub use reconciler::{
    can_reconcile, deletion_warning, reconcile, ReconcilerConfig, ReconciliationHint,
    Suggestion, Transaction, TransactionEvent,
};
