use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::amortization::{LoanTerms, ScheduleRow};
use crate::error::LoanLedgerError;
use crate::ledger::LoanLedger;
use crate::types::{Money, Rate};
use crate::LoanLedgerResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    #[serde(alias = "activo")]
    Active,
    #[serde(alias = "completado", alias = "pagado")]
    Completed,
    #[serde(alias = "cancelado")]
    Cancelled,
}

impl LoanStatus {
    /// Status only ever moves out of `Active`, and only by explicit request.
    pub fn can_transition_to(self, to: LoanStatus) -> bool {
        matches!(
            (self, to),
            (LoanStatus::Active, LoanStatus::Completed) | (LoanStatus::Active, LoanStatus::Cancelled)
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "active"),
            LoanStatus::Completed => write!(f, "completed"),
            LoanStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    #[default]
    Personal,
    #[serde(alias = "hipoteca")]
    Mortgage,
    #[serde(alias = "coche", alias = "vehiculo")]
    Auto,
    #[serde(alias = "estudios")]
    Student,
    #[serde(alias = "tarjeta")]
    CreditCard,
    #[serde(alias = "otro")]
    Other,
}

/// Input for originating a loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLoan {
    pub name: String,
    #[serde(default)]
    pub loan_type: LoanType,
    pub principal: Money,
    /// Annual rate in percent.
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// Editable free-text fields. Terms are fixed at origination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanDetailsUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub loan_type: Option<LoanType>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A debt obligation: fixed terms, an owned ledger and a store revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub loan_type: LoanType,
    pub principal: Money,
    /// Annual rate in percent.
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub description: Option<String>,
    pub status: LoanStatus,
    pub ledger: LoanLedger,
    /// Bumped by the store on every successful write.
    pub revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Originate a loan for `owner_id`. Terms are validated by the engine.
    pub fn originate(owner_id: &str, new_loan: NewLoan) -> LoanLedgerResult<Loan> {
        if new_loan.name.trim().is_empty() {
            return Err(LoanLedgerError::invalid_terms(
                "name",
                "Loan name cannot be empty",
            ));
        }
        let now = Utc::now();
        let loan = Loan {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: new_loan.name.trim().to_string(),
            loan_type: new_loan.loan_type,
            principal: new_loan.principal,
            annual_rate: new_loan.annual_rate,
            term_months: new_loan.term_months,
            start_date: new_loan.start_date,
            description: new_loan.description,
            status: LoanStatus::Active,
            ledger: LoanLedger::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        };
        loan.terms().validate()?;
        Ok(loan)
    }

    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_rate: self.annual_rate,
            term_months: self.term_months,
            start_date: self.start_date,
        }
    }

    pub fn monthly_payment(&self) -> LoanLedgerResult<Money> {
        self.terms().monthly_payment()
    }

    pub fn schedule(&self) -> LoanLedgerResult<Vec<ScheduleRow>> {
        self.terms().schedule()
    }

    pub fn paid_months(&self) -> u32 {
        self.ledger.paid_months()
    }

    /// Apply a details update, returning the edited copy.
    pub fn with_details(&self, update: &LoanDetailsUpdate) -> LoanLedgerResult<Loan> {
        let mut next = self.clone();
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(LoanLedgerError::invalid_terms(
                    "name",
                    "Loan name cannot be empty",
                ));
            }
            next.name = name.trim().to_string();
        }
        if let Some(loan_type) = update.loan_type {
            next.loan_type = loan_type;
        }
        if update.description.is_some() {
            next.description = update.description.clone();
        }
        Ok(next)
    }
}
