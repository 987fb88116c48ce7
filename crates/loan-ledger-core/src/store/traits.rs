use chrono::Utc;

use crate::error::LoanLedgerError;
use crate::ledger::LoanLedger;
use crate::loan::Loan;
use crate::LoanLedgerResult;

/// Per-owner loan storage.
///
/// Every write is a compare-and-swap on [`Loan::revision`]: the caller passes
/// the loan as it read it, and the write is refused with
/// [`LoanLedgerError::VersionConflict`] if another writer got there first.
/// Successful writes return the stored loan with its revision bumped.
pub trait LoanStore: Send + Sync {
    fn list(&self, owner_id: &str) -> LoanLedgerResult<Vec<Loan>>;

    /// Fails with [`LoanLedgerError::LoanNotFound`] when the owner has no such loan.
    fn get(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<Loan>;

    fn insert(&self, loan: Loan) -> LoanLedgerResult<Loan>;

    /// Overwrite the whole loan, ledger included, if `loan.revision` is current.
    fn update(&self, loan: &Loan) -> LoanLedgerResult<Loan>;

    /// Delete the loan and, with it, its ledger.
    fn delete(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<()>;

    /// Whole-array ledger write guarded by `expected_revision`.
    fn replace_ledger(
        &self,
        owner_id: &str,
        loan_id: &str,
        expected_revision: u64,
        ledger: LoanLedger,
    ) -> LoanLedgerResult<Loan> {
        let mut loan = self.get(owner_id, loan_id)?;
        check_revision(&loan.id, expected_revision, loan.revision)?;
        loan.ledger = ledger;
        self.update(&loan)
    }
}

pub(crate) fn check_revision(loan_id: &str, expected: u64, actual: u64) -> LoanLedgerResult<()> {
    if expected != actual {
        log::warn!(
            "stale write to loan {loan_id}: expected revision {expected}, store has {actual}"
        );
        return Err(LoanLedgerError::VersionConflict {
            loan_id: loan_id.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// The copy a store persists for a successful write.
pub(crate) fn next_revision(loan: &Loan) -> Loan {
    let mut stored = loan.clone();
    stored.revision = loan.revision + 1;
    stored.updated_at = Utc::now();
    stored
}
