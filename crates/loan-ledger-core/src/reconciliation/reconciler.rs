use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::matcher::{
    find_extra_payment_index_by_amount_and_date, find_loan_by_name,
    find_payment_index_by_amount_and_date, find_payment_index_by_number,
};
use super::patterns::{detect_loan_transaction, LoanTransactionInfo};
use crate::loan::Loan;
use crate::types::Money;

/// Matching knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Maximum distance in days between a transaction and a ledger entry.
    pub tolerance_days: i64,
    /// Amounts closer than this are equal.
    pub amount_epsilon: Money,
    /// A description must contain one of these (case-insensitive) before any
    /// matching runs.
    pub keywords: Vec<String>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        ReconcilerConfig {
            tolerance_days: 3,
            amount_epsilon: dec!(0.01),
            keywords: ["cuota", "préstamo", "prestamo", "amortización", "amortizacion"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// The read-only view of a transaction the reconciler needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    /// Signed cash flow; only the magnitude is compared.
    pub amount: Money,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionEvent {
    Created,
    /// The transaction is about to be deleted.
    Deleting,
}

/// What the user could do to the loan ledger. Never applied automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Suggestion {
    RecordPayment { amount: Money, date: NaiveDate },
    RecordExtraPayment { amount: Money, date: NaiveDate },
    RemovePayment { index: usize, entry_id: String },
    RemoveExtraPayment { index: usize, entry_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationHint {
    pub transaction_id: String,
    pub loan_id: String,
    pub loan_name: String,
    pub detected: LoanTransactionInfo,
    pub suggestion: Suggestion,
    pub message: String,
}

/// Cheap gate run before any pattern matching, so unrelated transactions
/// never produce hints.
pub fn can_reconcile(transaction: &Transaction, config: &ReconcilerConfig) -> bool {
    let description = transaction.description.to_lowercase();
    config
        .keywords
        .iter()
        .any(|k| !k.is_empty() && description.contains(&k.to_lowercase()))
}

/// Prompt asking whether the ledger entry behind a deleted transaction
/// should go too.
pub fn deletion_warning(info: &LoanTransactionInfo) -> String {
    match info {
        LoanTransactionInfo::Scheduled {
            loan_name,
            payment_number,
        } => format!(
            "This transaction is payment #{payment_number} of loan \"{loan_name}\". \
             Do you also want to remove that payment from the loan's history?"
        ),
        LoanTransactionInfo::Extra { loan_name } => format!(
            "This transaction is an extra payment on loan \"{loan_name}\". \
             Do you also want to remove it from the loan's history?"
        ),
    }
}

/// Suggest the ledger change matching a transaction event, if any.
pub fn reconcile(
    event: TransactionEvent,
    transaction: &Transaction,
    loans: &[Loan],
    config: &ReconcilerConfig,
) -> Option<ReconciliationHint> {
    if !can_reconcile(transaction, config) {
        return None;
    }
    let detected = detect_loan_transaction(&transaction.description)?;
    let loan = find_loan_by_name(loans, detected.loan_name())?;
    let amount = transaction.amount.abs();
    let date = transaction.date;

    let (suggestion, message) = match (event, &detected) {
        (TransactionEvent::Created, LoanTransactionInfo::Scheduled { payment_number, .. }) => {
            let recorded = find_payment_index_by_number(loan, *payment_number).is_some()
                || find_payment_index_by_amount_and_date(loan, amount, date, config).is_some();
            if recorded {
                return None;
            }
            (
                Suggestion::RecordPayment { amount, date },
                format!(
                    "Record payment #{payment_number} of {amount} in the history of loan \"{}\"?",
                    loan.name
                ),
            )
        }
        (TransactionEvent::Created, LoanTransactionInfo::Extra { .. }) => {
            if amount <= Decimal::ZERO
                || find_extra_payment_index_by_amount_and_date(loan, amount, date, config)
                    .is_some()
            {
                return None;
            }
            (
                Suggestion::RecordExtraPayment { amount, date },
                format!(
                    "Record an extra payment of {amount} in the history of loan \"{}\"?",
                    loan.name
                ),
            )
        }
        (TransactionEvent::Deleting, LoanTransactionInfo::Scheduled { payment_number, .. }) => {
            let index = find_payment_index_by_number(loan, *payment_number)
                .or_else(|| find_payment_index_by_amount_and_date(loan, amount, date, config))?;
            (
                Suggestion::RemovePayment {
                    index,
                    entry_id: loan.ledger.payments[index].id.to_string(),
                },
                deletion_warning(&detected),
            )
        }
        (TransactionEvent::Deleting, LoanTransactionInfo::Extra { .. }) => {
            let index = find_extra_payment_index_by_amount_and_date(loan, amount, date, config)?;
            (
                Suggestion::RemoveExtraPayment {
                    index,
                    entry_id: loan.ledger.extra_payments[index].id.to_string(),
                },
                deletion_warning(&detected),
            )
        }
    };

    log::debug!(
        "transaction {} maps to loan {}: {:?}",
        transaction.id,
        loan.id,
        suggestion
    );

    Some(ReconciliationHint {
        transaction_id: transaction.id.clone(),
        loan_id: loan.id.clone(),
        loan_name: loan.name.clone(),
        detected,
        suggestion,
        message,
    })
}
