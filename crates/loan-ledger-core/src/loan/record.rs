//! Persisted loan record.
//!
//! The stored document keeps the two ledger arrays embedded in the loan and
//! writes amounts as JSON numbers and dates as ISO-8601 strings. Older
//! documents carry Spanish field names, sometimes next to the English ones;
//! [`LoanRecord::from_value`] folds those onto the canonical names before
//! anything else sees the record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::model::{Loan, LoanStatus, LoanType};
use crate::ledger::{ExtraPaymentEvent, LedgerCollection, LoanLedger, PaymentEvent};
use crate::types::{Money, Rate};
use crate::LoanLedgerResult;

/// Canonical field name followed by the legacy names it replaces.
const LOAN_FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("owner_id", &["user_id", "usuario_id"]),
    ("name", &["nombre"]),
    ("loan_type", &["tipo", "tipo_prestamo"]),
    ("principal_amount", &["monto_total", "initial_amount", "monto_inicial"]),
    ("annual_interest_rate", &["tasa_interes", "interest_rate"]),
    ("term_months", &["plazo_meses", "plazo"]),
    ("start_date", &["fecha_inicio"]),
    ("description", &["descripcion"]),
    ("status", &["estado"]),
    ("realized_payments", &["pagos_realizados"]),
    ("extra_payments", &["pagos_extra", "amortizaciones"]),
];

const ENTRY_FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("sequence_number", &["numero_cuota", "numero"]),
    ("date", &["fecha"]),
    ("amount", &["monto", "importe"]),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Money,
    #[serde(default)]
    pub sequence_number: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentRecord {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub loan_type: LoanType,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub principal_amount: Money,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub annual_interest_rate: Rate,
    pub term_months: u32,
    #[serde(with = "iso_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: LoanStatus,
    #[serde(default)]
    pub realized_payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub extra_payments: Vec<ExtraPaymentRecord>,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LoanRecord {
    /// Parse a stored document, accepting legacy field names.
    pub fn from_value(mut value: Value) -> LoanLedgerResult<LoanRecord> {
        if let Value::Object(map) = &mut value {
            fold_aliases(map, LOAN_FIELD_ALIASES);
            for key in ["realized_payments", "extra_payments"] {
                if let Some(Value::Array(entries)) = map.get_mut(key) {
                    for entry in entries.iter_mut() {
                        if let Value::Object(entry) = entry {
                            fold_aliases(entry, ENTRY_FIELD_ALIASES);
                        }
                    }
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_loan(self) -> Loan {
        let loan_id = self.id.clone();
        let payments = self
            .realized_payments
            .into_iter()
            .enumerate()
            .map(|(i, p)| PaymentEvent {
                id: p
                    .id
                    .unwrap_or_else(|| legacy_entry_id(&loan_id, LedgerCollection::Payments, i)),
                sequence_number: p.sequence_number.unwrap_or(i as u32 + 1),
                date: p.date,
                amount: p.amount,
            })
            .collect();
        let extra_payments = self
            .extra_payments
            .into_iter()
            .enumerate()
            .map(|(i, e)| ExtraPaymentEvent {
                id: e
                    .id
                    .unwrap_or_else(|| legacy_entry_id(&loan_id, LedgerCollection::ExtraPayments, i)),
                date: e.date,
                amount: e.amount,
            })
            .collect();

        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Loan {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            loan_type: self.loan_type,
            principal: self.principal_amount,
            annual_rate: self.annual_interest_rate,
            term_months: self.term_months,
            start_date: self.start_date,
            description: self.description,
            status: self.status,
            ledger: LoanLedger {
                payments,
                extra_payments,
            },
            revision: self.revision,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

impl From<&Loan> for LoanRecord {
    fn from(loan: &Loan) -> Self {
        LoanRecord {
            id: loan.id.clone(),
            owner_id: loan.owner_id.clone(),
            name: loan.name.clone(),
            loan_type: loan.loan_type,
            principal_amount: loan.principal,
            annual_interest_rate: loan.annual_rate,
            term_months: loan.term_months,
            start_date: loan.start_date,
            description: loan.description.clone(),
            status: loan.status,
            realized_payments: loan
                .ledger
                .payments
                .iter()
                .map(|p| PaymentRecord {
                    id: Some(p.id),
                    date: p.date,
                    amount: p.amount,
                    sequence_number: Some(p.sequence_number),
                })
                .collect(),
            extra_payments: loan
                .ledger
                .extra_payments
                .iter()
                .map(|e| ExtraPaymentRecord {
                    id: Some(e.id),
                    date: e.date,
                    amount: e.amount,
                })
                .collect(),
            revision: loan.revision,
            created_at: Some(loan.created_at),
            updated_at: Some(loan.updated_at),
        }
    }
}

/// Move legacy keys onto their canonical name. When both are present the
/// canonical value wins and the legacy key is dropped.
fn fold_aliases(map: &mut Map<String, Value>, aliases: &[(&str, &[&str])]) {
    for (canonical, legacy_names) in aliases {
        for legacy in *legacy_names {
            if let Some(value) = map.remove(*legacy) {
                if !map.contains_key(*canonical) && !value.is_null() {
                    map.insert((*canonical).to_string(), value);
                }
            }
        }
    }
}

/// ISO-8601 dates. Full timestamps are accepted on read and truncated to
/// their calendar date.
mod iso_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid ISO-8601 date: {raw}"))
        })
    }

    pub(super) fn parse(raw: &str) -> Option<NaiveDate> {
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Some(date);
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.date());
        }
        None
    }
}

/// Id for a stored entry that predates entry ids. Derived from the loan,
/// collection and position so every load of the same record agrees.
fn legacy_entry_id(loan_id: &str, collection: LedgerCollection, position: usize) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("{loan_id}/{collection}/{position}").as_bytes(),
    )
}
