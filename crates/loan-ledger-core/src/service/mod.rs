//! Loan operations over a [`LoanStore`](crate::store::LoanStore).

pub mod loan_service;

pub use loan_service::{LedgerMutation, LoanService};
