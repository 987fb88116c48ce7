use thiserror::Error;

use crate::ledger::LedgerCollection;
use crate::loan::LoanStatus;

#[derive(Debug, Error)]
pub enum LoanLedgerError {
    #[error("Invalid loan terms: {field} — {reason}")]
    InvalidTerms { field: String, reason: String },

    #[error("Invalid amount: {field} — {reason}")]
    InvalidAmount { field: String, reason: String },

    #[error("Invalid index {index} for {collection}: valid positions are 0..{len}")]
    InvalidIndex {
        collection: LedgerCollection,
        index: usize,
        len: usize,
    },

    #[error("No {collection} entry with id {entry_id}")]
    EntryNotFound {
        collection: LedgerCollection,
        entry_id: String,
    },

    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    #[error("Invalid status transition: {from} -> {to} (only active loans can be completed or cancelled)")]
    InvalidStatusTransition { from: LoanStatus, to: LoanStatus },

    #[error("Version conflict on loan {loan_id}: expected revision {expected}, store has {actual}; reload and retry")]
    VersionConflict {
        loan_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LoanLedgerError {
    pub(crate) fn invalid_terms(field: &str, reason: impl Into<String>) -> Self {
        LoanLedgerError::InvalidTerms {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_amount(field: &str, reason: impl Into<String>) -> Self {
        LoanLedgerError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanLedgerError {
    fn from(e: serde_json::Error) -> Self {
        LoanLedgerError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for LoanLedgerError {
    fn from(e: std::io::Error) -> Self {
        LoanLedgerError::Persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_index_message_names_bounds() {
        let err = LoanLedgerError::InvalidIndex {
            collection: LedgerCollection::Payments,
            index: 7,
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "Invalid index 7 for payments: valid positions are 0..3"
        );
    }

    #[test]
    fn test_invalid_amount_message_names_field() {
        let err = LoanLedgerError::invalid_amount("extra_amount", "must be greater than zero");
        assert!(err.to_string().contains("extra_amount"));
    }
}
