//! Loan service.
//!
//! Ledger mutations are read-modify-write: the loan is loaded, the ledger is
//! changed in memory and the whole ledger is written back with the revision
//! that was read. A concurrent writer makes the write fail with
//! `VersionConflict`; nothing is retried here and a failed write leaves the
//! stored loan as it was.
//!
//! Recording a payment does not create the matching transaction. The
//! mutation result carries the description that transaction should use, and
//! the reconciler works from that description when transactions change.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::amortization::ScheduleRow;
use crate::error::LoanLedgerError;
use crate::ledger::{
    extra_description, scheduled_description, EntryPatch, LedgerCollection, LoanLedger,
};
use crate::loan::{compute_view, Loan, LoanDetailsUpdate, LoanStatus, LoanView, NewLoan};
use crate::store::LoanStore;
use crate::types::{round_money, Money};
use crate::LoanLedgerResult;

#[cfg(feature = "reconciliation")]
use crate::reconciliation::{
    reconcile, ReconcilerConfig, ReconciliationHint, Transaction, TransactionEvent,
};
#[cfg(feature = "simulation")]
use crate::simulation::{simulate_extra_payment, ExtraPaymentSimulation};
#[cfg(feature = "simulation")]
use crate::types::ComputationOutput;

/// Outcome of a ledger write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerMutation {
    pub loan: Loan,
    pub view: LoanView,
    /// Description for the transaction that should accompany a new entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_description: Option<String>,
}

pub struct LoanService<S: LoanStore> {
    store: Arc<S>,
    #[cfg(feature = "reconciliation")]
    reconciler: ReconcilerConfig,
}

impl<S: LoanStore> LoanService<S> {
    pub fn new(store: Arc<S>) -> Self {
        LoanService {
            store,
            #[cfg(feature = "reconciliation")]
            reconciler: ReconcilerConfig::default(),
        }
    }

    #[cfg(feature = "reconciliation")]
    pub fn with_reconciler_config(mut self, config: ReconcilerConfig) -> Self {
        self.reconciler = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Loans
    // -----------------------------------------------------------------------

    pub fn create_loan(&self, owner_id: &str, new_loan: NewLoan) -> LoanLedgerResult<Loan> {
        let loan = Loan::originate(owner_id, new_loan)?;
        let loan = self.store.insert(loan)?;
        log::info!(
            "created loan {} ({}) for {}: {} over {} months at {}%",
            loan.id,
            loan.name,
            owner_id,
            loan.principal,
            loan.term_months,
            loan.annual_rate
        );
        Ok(loan)
    }

    pub fn list_loans(&self, owner_id: &str) -> LoanLedgerResult<Vec<Loan>> {
        self.store.list(owner_id)
    }

    pub fn get_loan(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<Loan> {
        self.store.get(owner_id, loan_id)
    }

    pub fn loan_view(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<LoanView> {
        compute_view(&self.store.get(owner_id, loan_id)?)
    }

    pub fn list_views(&self, owner_id: &str) -> LoanLedgerResult<Vec<LoanView>> {
        self.store.list(owner_id)?.iter().map(compute_view).collect()
    }

    pub fn schedule(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<Vec<ScheduleRow>> {
        self.store.get(owner_id, loan_id)?.schedule()
    }

    pub fn update_details(
        &self,
        owner_id: &str,
        loan_id: &str,
        update: &LoanDetailsUpdate,
    ) -> LoanLedgerResult<Loan> {
        let loan = self.store.get(owner_id, loan_id)?;
        self.store.update(&loan.with_details(update)?)
    }

    /// Manual status change. Reaching a zero balance never does this.
    pub fn set_status(
        &self,
        owner_id: &str,
        loan_id: &str,
        status: LoanStatus,
    ) -> LoanLedgerResult<Loan> {
        let mut loan = self.store.get(owner_id, loan_id)?;
        if !loan.status.can_transition_to(status) {
            return Err(LoanLedgerError::InvalidStatusTransition {
                from: loan.status,
                to: status,
            });
        }
        loan.status = status;
        let loan = self.store.update(&loan)?;
        log::info!("loan {} marked {}", loan.id, loan.status);
        Ok(loan)
    }

    pub fn delete_loan(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<()> {
        self.store.delete(owner_id, loan_id)?;
        log::info!("deleted loan {loan_id} and its ledger");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Ledger
    // -----------------------------------------------------------------------

    /// Record the next scheduled payment. `amount` defaults to the loan's
    /// monthly payment rounded to cents.
    pub fn mark_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        amount: Option<Money>,
        date: NaiveDate,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.mutate_ledger(owner_id, loan_id, |loan| {
            let amount = match amount {
                Some(amount) => amount,
                None => round_money(loan.monthly_payment()?),
            };
            let ledger = loan.ledger.append_payment(amount, date)?;
            let number = ledger.paid_months();
            if number > loan.term_months {
                log::warn!(
                    "payment #{} recorded past the {}-month term of loan {}",
                    number,
                    loan.term_months,
                    loan.id
                );
            }
            Ok((ledger, Some(scheduled_description(&loan.name, number))))
        })
    }

    /// Record a principal-only payment of at most the remaining balance.
    pub fn add_extra_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        amount: Money,
        date: NaiveDate,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.mutate_ledger(owner_id, loan_id, |loan| {
            let remaining = compute_view(loan)?.remaining_balance;
            if amount > remaining {
                return Err(LoanLedgerError::invalid_amount(
                    "amount",
                    format!("Extra payment {amount} exceeds the remaining balance {remaining}"),
                ));
            }
            let ledger = loan.ledger.append_extra_payment(amount, date)?;
            Ok((ledger, Some(extra_description(&loan.name))))
        })
    }

    pub fn edit_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        index: usize,
        patch: &EntryPatch,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.edit_entry(owner_id, loan_id, LedgerCollection::Payments, index, patch)
    }

    pub fn edit_extra_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        index: usize,
        patch: &EntryPatch,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.edit_entry(owner_id, loan_id, LedgerCollection::ExtraPayments, index, patch)
    }

    pub fn delete_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        index: usize,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.delete_entry(owner_id, loan_id, LedgerCollection::Payments, index)
    }

    pub fn delete_extra_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        index: usize,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.delete_entry(owner_id, loan_id, LedgerCollection::ExtraPayments, index)
    }

    pub fn edit_entry(
        &self,
        owner_id: &str,
        loan_id: &str,
        collection: LedgerCollection,
        index: usize,
        patch: &EntryPatch,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.mutate_ledger(owner_id, loan_id, |loan| {
            if collection == LedgerCollection::ExtraPayments {
                check_extra_edit(loan, index, patch)?;
            }
            Ok((loan.ledger.edit_entry(collection, index, patch)?, None))
        })
    }

    pub fn delete_entry(
        &self,
        owner_id: &str,
        loan_id: &str,
        collection: LedgerCollection,
        index: usize,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.mutate_ledger(owner_id, loan_id, |loan| {
            Ok((loan.ledger.delete_entry(collection, index)?, None))
        })
    }

    pub fn edit_entry_by_id(
        &self,
        owner_id: &str,
        loan_id: &str,
        collection: LedgerCollection,
        entry_id: Uuid,
        patch: &EntryPatch,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.mutate_ledger(owner_id, loan_id, |loan| {
            if collection == LedgerCollection::ExtraPayments {
                if let Some(index) = loan.ledger.index_of(collection, entry_id) {
                    check_extra_edit(loan, index, patch)?;
                }
            }
            Ok((loan.ledger.edit_entry_by_id(collection, entry_id, patch)?, None))
        })
    }

    pub fn delete_entry_by_id(
        &self,
        owner_id: &str,
        loan_id: &str,
        collection: LedgerCollection,
        entry_id: Uuid,
    ) -> LoanLedgerResult<LedgerMutation> {
        self.mutate_ledger(owner_id, loan_id, |loan| {
            Ok((loan.ledger.delete_entry_by_id(collection, entry_id)?, None))
        })
    }

    // -----------------------------------------------------------------------
    // Advisory
    // -----------------------------------------------------------------------

    #[cfg(feature = "simulation")]
    pub fn simulate_extra_payment(
        &self,
        owner_id: &str,
        loan_id: &str,
        extra_amount: Money,
    ) -> LoanLedgerResult<ComputationOutput<ExtraPaymentSimulation>> {
        simulate_extra_payment(&self.store.get(owner_id, loan_id)?, extra_amount)
    }

    /// Hint for the ledger change a transaction event implies, if any.
    #[cfg(feature = "reconciliation")]
    pub fn reconcile_transaction(
        &self,
        owner_id: &str,
        event: TransactionEvent,
        transaction: &Transaction,
    ) -> LoanLedgerResult<Option<ReconciliationHint>> {
        let loans = self.store.list(owner_id)?;
        Ok(reconcile(event, transaction, &loans, &self.reconciler))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn mutate_ledger<F>(
        &self,
        owner_id: &str,
        loan_id: &str,
        mutate: F,
    ) -> LoanLedgerResult<LedgerMutation>
    where
        F: FnOnce(&Loan) -> LoanLedgerResult<(LoanLedger, Option<String>)>,
    {
        let loan = self.store.get(owner_id, loan_id)?;
        let (ledger, transaction_description) = mutate(&loan)?;
        // a ledger whose view cannot be computed is never stored
        let view = compute_view(&Loan {
            ledger: ledger.clone(),
            ..loan.clone()
        })?;
        let loan = self
            .store
            .replace_ledger(owner_id, loan_id, loan.revision, ledger)?;

        log::info!(
            "ledger of loan {} now at revision {}: {} payments, {} extra (paid {})",
            loan.id,
            loan.revision,
            loan.ledger.payments.len(),
            loan.ledger.extra_payments.len(),
            view.total_paid
        );

        Ok(LedgerMutation {
            loan,
            view,
            transaction_description,
        })
    }
}

/// An edited extra payment may cover at most what is still owed with the
/// entry's current amount added back.
fn check_extra_edit(loan: &Loan, index: usize, patch: &EntryPatch) -> LoanLedgerResult<()> {
    let (Some(amount), Some(entry)) = (patch.amount, loan.ledger.extra_payments.get(index)) else {
        return Ok(());
    };
    let remaining = compute_view(loan)?.remaining_balance;
    let bound = remaining.checked_add(entry.amount).unwrap_or(Decimal::MAX);
    if amount > bound {
        return Err(LoanLedgerError::invalid_amount(
            "amount",
            format!("Extra payment {amount} exceeds the remaining balance {bound}"),
        ));
    }
    Ok(())
}
