use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::LoanLedgerError;
use crate::types::Money;
use crate::LoanLedgerResult;

/// Which of the two ledger collections an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerCollection {
    Payments,
    ExtraPayments,
}

impl fmt::Display for LedgerCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerCollection::Payments => write!(f, "payments"),
            LedgerCollection::ExtraPayments => write!(f, "extra_payments"),
        }
    }
}

/// A realized scheduled payment. `sequence_number` is assigned at append
/// time and never rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: Uuid,
    pub sequence_number: u32,
    pub date: NaiveDate,
    pub amount: Money,
}

/// A principal-only payment outside the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraPaymentEvent {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: Money,
}

/// Partial update of a ledger entry. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.amount.is_none()
    }
}

/// Common surface of both event kinds, so edits and deletes are written once.
pub trait LedgerEntry {
    const COLLECTION: LedgerCollection;

    fn id(&self) -> Uuid;
    fn date(&self) -> NaiveDate;
    fn amount(&self) -> Money;

    /// Reject amounts this kind of entry cannot hold.
    fn check_amount(amount: Money) -> LoanLedgerResult<()>;

    fn apply(&mut self, patch: &EntryPatch) -> LoanLedgerResult<()>;
}

impl LedgerEntry for PaymentEvent {
    const COLLECTION: LedgerCollection = LedgerCollection::Payments;

    fn id(&self) -> Uuid {
        self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn check_amount(amount: Money) -> LoanLedgerResult<()> {
        if amount < Decimal::ZERO {
            return Err(LoanLedgerError::invalid_amount(
                "amount",
                format!("Payment amount cannot be negative, got {amount}"),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, patch: &EntryPatch) -> LoanLedgerResult<()> {
        if let Some(amount) = patch.amount {
            Self::check_amount(amount)?;
            self.amount = amount;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        Ok(())
    }
}

impl LedgerEntry for ExtraPaymentEvent {
    const COLLECTION: LedgerCollection = LedgerCollection::ExtraPayments;

    fn id(&self) -> Uuid {
        self.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn check_amount(amount: Money) -> LoanLedgerResult<()> {
        if amount <= Decimal::ZERO {
            return Err(LoanLedgerError::invalid_amount(
                "amount",
                format!("Extra payment must be greater than zero, got {amount}"),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, patch: &EntryPatch) -> LoanLedgerResult<()> {
        if let Some(amount) = patch.amount {
            Self::check_amount(amount)?;
            self.amount = amount;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        Ok(())
    }
}
