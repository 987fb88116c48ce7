//! Ledger mutations.
//!
//! Every operation takes the current ledger by reference and returns a new
//! one; callers persist the returned ledger as a whole. A failed operation
//! leaves the original untouched.
//!
//! Entries can be addressed by position (as the stored arrays are) or by the
//! stable id assigned at append time. Deleting a payment never renumbers the
//! `sequence_number` of the payments after it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{EntryPatch, ExtraPaymentEvent, LedgerCollection, LedgerEntry, PaymentEvent};
use crate::error::LoanLedgerError;
use crate::types::{checked_sum, Money};
use crate::LoanLedgerResult;

/// The two ordered event collections owned by a loan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanLedger {
    #[serde(default)]
    pub payments: Vec<PaymentEvent>,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPaymentEvent>,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of serviced periods. The payment collection is the only source
    /// of truth for this; there is no separate counter.
    pub fn paid_months(&self) -> u32 {
        self.payments.len() as u32
    }

    pub fn total_extra(&self) -> LoanLedgerResult<Money> {
        checked_sum(self.extra_payments.iter().map(|e| e.amount))
            .ok_or_else(|| total_overflow("extra"))
    }

    pub fn total_scheduled_paid(&self) -> LoanLedgerResult<Money> {
        checked_sum(self.payments.iter().map(|p| p.amount))
            .ok_or_else(|| total_overflow("scheduled"))
    }

    pub fn total_paid(&self) -> LoanLedgerResult<Money> {
        self.total_scheduled_paid()?
            .checked_add(self.total_extra()?)
            .ok_or_else(|| total_overflow("combined"))
    }

    pub fn len(&self, collection: LedgerCollection) -> usize {
        match collection {
            LedgerCollection::Payments => self.payments.len(),
            LedgerCollection::ExtraPayments => self.extra_payments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty() && self.extra_payments.is_empty()
    }

    /// Position of the entry with `id` in `collection`, if any.
    pub fn index_of(&self, collection: LedgerCollection, id: Uuid) -> Option<usize> {
        match collection {
            LedgerCollection::Payments => position_of(&self.payments, id),
            LedgerCollection::ExtraPayments => position_of(&self.extra_payments, id),
        }
    }

    /// Record a realized scheduled payment as period `len + 1`.
    pub fn append_payment(&self, amount: Money, date: NaiveDate) -> LoanLedgerResult<LoanLedger> {
        PaymentEvent::check_amount(amount)?;
        let mut next = self.clone();
        let sequence_number = next.payments.len() as u32 + 1;
        next.payments.push(PaymentEvent {
            id: Uuid::new_v4(),
            sequence_number,
            date,
            amount,
        });
        Ok(next)
    }

    /// Record a principal-only payment. Must be strictly positive.
    pub fn append_extra_payment(
        &self,
        amount: Money,
        date: NaiveDate,
    ) -> LoanLedgerResult<LoanLedger> {
        if amount <= Decimal::ZERO {
            return Err(LoanLedgerError::invalid_amount(
                "amount",
                format!("Extra payment must be greater than zero, got {amount}"),
            ));
        }
        let mut next = self.clone();
        next.extra_payments.push(ExtraPaymentEvent {
            id: Uuid::new_v4(),
            date,
            amount,
        });
        Ok(next)
    }

    /// Replace the date and/or amount of the entry at `index`.
    pub fn edit_entry(
        &self,
        collection: LedgerCollection,
        index: usize,
        patch: &EntryPatch,
    ) -> LoanLedgerResult<LoanLedger> {
        let mut next = self.clone();
        match collection {
            LedgerCollection::Payments => edit_at(&mut next.payments, index, patch)?,
            LedgerCollection::ExtraPayments => edit_at(&mut next.extra_payments, index, patch)?,
        }
        Ok(next)
    }

    /// Remove the entry at `index`. Later sequence numbers are left as they are.
    pub fn delete_entry(
        &self,
        collection: LedgerCollection,
        index: usize,
    ) -> LoanLedgerResult<LoanLedger> {
        let mut next = self.clone();
        match collection {
            LedgerCollection::Payments => {
                remove_at(&mut next.payments, index)?;
            }
            LedgerCollection::ExtraPayments => {
                remove_at(&mut next.extra_payments, index)?;
            }
        }
        Ok(next)
    }

    pub fn edit_entry_by_id(
        &self,
        collection: LedgerCollection,
        id: Uuid,
        patch: &EntryPatch,
    ) -> LoanLedgerResult<LoanLedger> {
        let index = self.require_index(collection, id)?;
        self.edit_entry(collection, index, patch)
    }

    pub fn delete_entry_by_id(
        &self,
        collection: LedgerCollection,
        id: Uuid,
    ) -> LoanLedgerResult<LoanLedger> {
        let index = self.require_index(collection, id)?;
        self.delete_entry(collection, index)
    }

    fn require_index(&self, collection: LedgerCollection, id: Uuid) -> LoanLedgerResult<usize> {
        self.index_of(collection, id)
            .ok_or_else(|| LoanLedgerError::EntryNotFound {
                collection,
                entry_id: id.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn position_of<T: LedgerEntry>(entries: &[T], id: Uuid) -> Option<usize> {
    entries.iter().position(|e| e.id() == id)
}

fn out_of_bounds<T: LedgerEntry>(index: usize, len: usize) -> LoanLedgerError {
    LoanLedgerError::InvalidIndex {
        collection: T::COLLECTION,
        index,
        len,
    }
}

fn total_overflow(kind: &str) -> LoanLedgerError {
    LoanLedgerError::invalid_amount("amount", format!("Total of {kind} payments is out of range"))
}

fn edit_at<T: LedgerEntry>(entries: &mut [T], index: usize, patch: &EntryPatch) -> LoanLedgerResult<()> {
    let len = entries.len();
    let entry = entries
        .get_mut(index)
        .ok_or_else(|| out_of_bounds::<T>(index, len))?;
    entry.apply(patch)
}

fn remove_at<T: LedgerEntry>(entries: &mut Vec<T>, index: usize) -> LoanLedgerResult<T> {
    if index >= entries.len() {
        return Err(out_of_bounds::<T>(index, entries.len()));
    }
    Ok(entries.remove(index))
}
