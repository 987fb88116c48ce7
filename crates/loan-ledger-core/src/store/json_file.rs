//! A single JSON document holding every owner's loan records.
//!
//! Each operation reads the document, and each write rewrites it whole
//! through a temporary file and a rename. Writers inside one process are
//! serialized by a mutex; writers in different processes are caught by the
//! revision check, not by file locking.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{check_revision, next_revision, LoanStore};
use crate::error::LoanLedgerError;
use crate::loan::{Loan, LoanRecord};
use crate::LoanLedgerResult;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    loans: Vec<Value>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> LoanLedgerResult<Vec<Loan>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            LoanLedgerError::Persistence(format!(
                "Failed to read '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let document: StoreDocument = serde_json::from_str(&contents)?;
        document
            .loans
            .into_iter()
            .map(|value| LoanRecord::from_value(value).map(LoanRecord::into_loan))
            .collect()
    }

    fn save(&self, loans: &[Loan]) -> LoanLedgerResult<()> {
        let document = StoreDocument {
            loans: loans
                .iter()
                .map(|loan| serde_json::to_value(LoanRecord::from(loan)))
                .collect::<Result<_, _>>()?,
        };
        let body = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("wrote {} loans to {}", loans.len(), self.path.display());
        Ok(())
    }

    fn lock(&self) -> LoanLedgerResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| LoanLedgerError::Persistence("loan store lock poisoned".into()))
    }
}

fn position(loans: &[Loan], owner_id: &str, loan_id: &str) -> Option<usize> {
    loans
        .iter()
        .position(|l| l.owner_id == owner_id && l.id == loan_id)
}

impl LoanStore for JsonFileStore {
    fn list(&self, owner_id: &str) -> LoanLedgerResult<Vec<Loan>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|l| l.owner_id == owner_id)
            .collect())
    }

    fn get(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<Loan> {
        self.load()?
            .into_iter()
            .find(|l| l.owner_id == owner_id && l.id == loan_id)
            .ok_or_else(|| LoanLedgerError::LoanNotFound(loan_id.to_string()))
    }

    fn insert(&self, loan: Loan) -> LoanLedgerResult<Loan> {
        let _guard = self.lock()?;
        let mut loans = self.load()?;
        if position(&loans, &loan.owner_id, &loan.id).is_some() {
            return Err(LoanLedgerError::Persistence(format!(
                "loan {} already exists",
                loan.id
            )));
        }
        loans.push(loan.clone());
        self.save(&loans)?;
        Ok(loan)
    }

    fn update(&self, loan: &Loan) -> LoanLedgerResult<Loan> {
        let _guard = self.lock()?;
        let mut loans = self.load()?;
        let idx = position(&loans, &loan.owner_id, &loan.id)
            .ok_or_else(|| LoanLedgerError::LoanNotFound(loan.id.clone()))?;
        check_revision(&loan.id, loan.revision, loans[idx].revision)?;
        let stored = next_revision(loan);
        loans[idx] = stored.clone();
        self.save(&loans)?;
        Ok(stored)
    }

    fn delete(&self, owner_id: &str, loan_id: &str) -> LoanLedgerResult<()> {
        let _guard = self.lock()?;
        let mut loans = self.load()?;
        let idx = position(&loans, owner_id, loan_id)
            .ok_or_else(|| LoanLedgerError::LoanNotFound(loan_id.to_string()))?;
        loans.remove(idx);
        self.save(&loans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::NewLoan;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn new_loan() -> NewLoan {
        NewLoan {
            name: "Coche".into(),
            loan_type: Default::default(),
            principal: dec!(12000),
            annual_rate: dec!(0),
            term_months: 12,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            description: Some("financed at the dealer".into()),
        }
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("loans.json"));
        assert!(store.list("me").unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("loans.json");

        let store = JsonFileStore::new(&path);
        let loan = store.insert(Loan::originate("me", new_loan()).unwrap()).unwrap();
        let ledger = loan
            .ledger
            .append_payment(dec!(1000), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
            .unwrap();
        store.replace_ledger("me", &loan.id, 0, ledger).unwrap();

        let reopened = JsonFileStore::new(&path);
        let reloaded = reopened.get("me", &loan.id).unwrap();
        assert_eq!(reloaded.revision, 1);
        assert_eq!(reloaded.paid_months(), 1);
        assert_eq!(reloaded.description.as_deref(), Some("financed at the dealer"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_reads_legacy_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loans.json");
        fs::write(
            &path,
            r#"{"loans":[{"id":"l1","user_id":"me","nombre":"Hipoteca","monto_total":100000,
                "tasa_interes":2.5,"plazo_meses":300,"fecha_inicio":"2020-01-01",
                "pagos_realizados":[{"fecha":"2020-02-01","monto":448.62}]}]}"#,
        )
        .unwrap();
        let store = JsonFileStore::new(&path);
        let loans = store.list("me").unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].name, "Hipoteca");
        assert_eq!(loans[0].paid_months(), 1);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loans.json");
        fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.list("me"),
            Err(LoanLedgerError::Serialization(_))
        ));
    }
}
