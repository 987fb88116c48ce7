use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{check_revision, next_revision, LoanStore};
use crate::error::LoanLedgerError;
use crate::loan::Loan;
use crate::LoanLedgerResult;

type LoanKey = (String, String);

/// Process-local store; loans are keyed by (owner, id).
#[derive(Debug, Default)]
pub struct InMemoryLoanStore {
    loans: RwLock<HashMap<LoanKey, Loan>>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(owner_id: &str, loan_id: &str) -> LoanKey {
    (owner_id.to_string(), loan_id.to_string())
}

fn poisoned<T>(_: T) -> LoanLedgerError {
    LoanLedgerError::Persistence("loan store lock poisoned".into())
}

impl LoanStore for InMemoryLoanStore {
    fn list(&self, owner_id: &str) -> LoanLedgerResult<Vec<Loan>> {
        let loans = self.loans.read().map_err(poisoned)?;
        let mut owned: Vec<Loan> = loans
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }

    fn get(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<Loan> {
        let loans = self.loans.read().map_err(poisoned)?;
        loans
            .get(&key(owner_id, loan_id))
            .cloned()
            .ok_or_else(|| LoanLedgerError::LoanNotFound(loan_id.to_string()))
    }

    fn insert(&self, loan: Loan) -> LoanLedgerResult<Loan> {
        let mut loans = self.loans.write().map_err(poisoned)?;
        let k = key(&loan.owner_id, &loan.id);
        if loans.contains_key(&k) {
            return Err(LoanLedgerError::Persistence(format!(
                "loan {} already exists",
                loan.id
            )));
        }
        loans.insert(k, loan.clone());
        Ok(loan)
    }

    fn update(&self, loan: &Loan) -> LoanLedgerResult<Loan> {
        let mut loans = self.loans.write().map_err(poisoned)?;
        let current = loans
            .get_mut(&key(&loan.owner_id, &loan.id))
            .ok_or_else(|| LoanLedgerError::LoanNotFound(loan.id.clone()))?;
        check_revision(&loan.id, loan.revision, current.revision)?;
        *current = next_revision(loan);
        Ok(current.clone())
    }

    fn delete(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<()> {
        let mut loans = self.loans.write().map_err(poisoned)?;
        loans
            .remove(&key(owner_id, loan_id))
            .map(|_| ())
            .ok_or_else(|| LoanLedgerError::LoanNotFound(loan_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::NewLoan;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn loan(owner: &str) -> Loan {
        Loan::originate(
            owner,
            NewLoan {
                name: "Personal".into(),
                loan_type: Default::default(),
                principal: dec!(5000),
                annual_rate: dec!(8),
                term_months: 24,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                description: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_loans_are_scoped_by_owner() {
        let store = InMemoryLoanStore::new();
        let mine = store.insert(loan("alice")).unwrap();
        store.insert(loan("bob")).unwrap();

        assert_eq!(store.list("alice").unwrap().len(), 1);
        assert!(matches!(
            store.get("bob", &mine.id),
            Err(LoanLedgerError::LoanNotFound(_))
        ));
    }

    #[test]
    fn test_stale_update_is_rejected() {
        let store = InMemoryLoanStore::new();
        let original = store.insert(loan("alice")).unwrap();

        let first = store.update(&original).unwrap();
        assert_eq!(first.revision, 1);

        let err = store.update(&original).unwrap_err();
        assert!(matches!(
            err,
            LoanLedgerError::VersionConflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_replace_ledger_checks_revision() {
        let store = InMemoryLoanStore::new();
        let stored = store.insert(loan("alice")).unwrap();
        let ledger = stored
            .ledger
            .append_payment(dec!(226.14), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .unwrap();

        let updated = store
            .replace_ledger("alice", &stored.id, 0, ledger.clone())
            .unwrap();
        assert_eq!(updated.paid_months(), 1);
        assert!(store.replace_ledger("alice", &stored.id, 0, ledger).is_err());
    }

    #[test]
    fn test_delete_cascades() {
        let store = InMemoryLoanStore::new();
        let stored = store.insert(loan("alice")).unwrap();
        store.delete("alice", &stored.id).unwrap();
        assert!(store.list("alice").unwrap().is_empty());
        assert!(store.delete("alice", &stored.id).is_err());
    }
}
