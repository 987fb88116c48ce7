//! Node bindings. Every function takes and returns JSON strings; loans travel
//! as stored loan documents, so callers keep persistence on their side.

use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use chrono::NaiveDate;
use loan_ledger_core::amortization::{amortize, AmortizationInput};
use loan_ledger_core::ledger::{EntryPatch, LedgerCollection};
use loan_ledger_core::loan::{compute_view, Loan, LoanRecord, LoanView};
use loan_ledger_core::reconciliation::{ReconcilerConfig, Transaction, TransactionEvent};
use loan_ledger_core::service::{LedgerMutation, LoanService};
use loan_ledger_core::store::{InMemoryLoanStore, LoanStore};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_loan(loan_json: &str) -> NapiResult<Loan> {
    let value: Value = serde_json::from_str(loan_json).map_err(to_napi_error)?;
    Ok(LoanRecord::from_value(value)
        .map_err(to_napi_error)?
        .into_loan())
}

/// A one-loan service over a scratch store, so ledger rules are the same
/// ones the persisted path applies.
fn scratch_service(loan: Loan) -> NapiResult<LoanService<InMemoryLoanStore>> {
    let service = LoanService::new(Arc::new(InMemoryLoanStore::new()));
    service.store().insert(loan).map_err(to_napi_error)?;
    Ok(service)
}

#[derive(Serialize)]
struct MutationOutput {
    loan: LoanRecord,
    view: LoanView,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_description: Option<String>,
}

fn mutation_json(mutation: LedgerMutation) -> NapiResult<String> {
    let output = MutationOutput {
        loan: LoanRecord::from(&mutation.loan),
        view: mutation.view,
        transaction_description: mutation.transaction_description,
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortize(&input).map_err(to_napi_error)?;
    let summary = serde_json::json!({
        "monthly_payment": output.result.monthly_payment,
        "total_payment": output.result.total_payment,
        "total_interest": output.result.total_interest,
        "end_date": output.result.end_date,
    });
    serde_json::to_string(&summary).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortize(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan state
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_view(loan_json: String) -> NapiResult<String> {
    let loan = parse_loan(&loan_json)?;
    let view = compute_view(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&view).map_err(to_napi_error)
}

#[napi]
pub fn simulate_extra_payment(loan_json: String, extra_amount: String) -> NapiResult<String> {
    let loan = parse_loan(&loan_json)?;
    let extra: Decimal = extra_amount.trim().parse().map_err(to_napi_error)?;
    let output =
        loan_ledger_core::simulation::simulate_extra_payment(&loan, extra).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PaymentInput {
    #[serde(default)]
    amount: Option<Decimal>,
    date: NaiveDate,
}

#[derive(Deserialize)]
struct EntryEditInput {
    collection: LedgerCollection,
    index: usize,
    #[serde(flatten)]
    patch: EntryPatch,
}

#[derive(Deserialize)]
struct EntryDeleteInput {
    collection: LedgerCollection,
    index: usize,
}

/// `payment_json`: `{ "date": "YYYY-MM-DD", "amount"?: "…" }`. Without an
/// amount the loan's monthly payment is recorded.
#[napi]
pub fn append_payment(loan_json: String, payment_json: String) -> NapiResult<String> {
    let loan = parse_loan(&loan_json)?;
    let input: PaymentInput = serde_json::from_str(&payment_json).map_err(to_napi_error)?;
    let (owner, id) = (loan.owner_id.clone(), loan.id.clone());
    let mutation = scratch_service(loan)?
        .mark_payment(&owner, &id, input.amount, input.date)
        .map_err(to_napi_error)?;
    mutation_json(mutation)
}

#[napi]
pub fn append_extra_payment(loan_json: String, payment_json: String) -> NapiResult<String> {
    let loan = parse_loan(&loan_json)?;
    let input: PaymentInput = serde_json::from_str(&payment_json).map_err(to_napi_error)?;
    let amount = input
        .amount
        .ok_or_else(|| to_napi_error("amount is required for an extra payment"))?;
    let (owner, id) = (loan.owner_id.clone(), loan.id.clone());
    let mutation = scratch_service(loan)?
        .add_extra_payment(&owner, &id, amount, input.date)
        .map_err(to_napi_error)?;
    mutation_json(mutation)
}

#[napi]
pub fn edit_ledger_entry(loan_json: String, edit_json: String) -> NapiResult<String> {
    let loan = parse_loan(&loan_json)?;
    let input: EntryEditInput = serde_json::from_str(&edit_json).map_err(to_napi_error)?;
    let (owner, id) = (loan.owner_id.clone(), loan.id.clone());
    let mutation = scratch_service(loan)?
        .edit_entry(&owner, &id, input.collection, input.index, &input.patch)
        .map_err(to_napi_error)?;
    mutation_json(mutation)
}

#[napi]
pub fn delete_ledger_entry(loan_json: String, delete_json: String) -> NapiResult<String> {
    let loan = parse_loan(&loan_json)?;
    let input: EntryDeleteInput = serde_json::from_str(&delete_json).map_err(to_napi_error)?;
    let (owner, id) = (loan.owner_id.clone(), loan.id.clone());
    let mutation = scratch_service(loan)?
        .delete_entry(&owner, &id, input.collection, input.index)
        .map_err(to_napi_error)?;
    mutation_json(mutation)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ReconcileInput {
    event: TransactionEvent,
    transaction: Transaction,
    loans: Vec<Value>,
    #[serde(default)]
    config: ReconcilerConfig,
}

/// Returns the detected relation, or `null`.
#[napi]
pub fn detect_loan_transaction(description: String) -> NapiResult<String> {
    let detected = loan_ledger_core::reconciliation::detect_loan_transaction(&description);
    serde_json::to_string(&detected).map_err(to_napi_error)
}

/// Returns a reconciliation hint, or `null`.
#[napi]
pub fn reconcile_transaction(input_json: String) -> NapiResult<String> {
    let input: ReconcileInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let loans = input
        .loans
        .into_iter()
        .map(|value| LoanRecord::from_value(value).map(LoanRecord::into_loan))
        .collect::<Result<Vec<_>, _>>()
        .map_err(to_napi_error)?;
    let hint = loan_ledger_core::reconciliation::reconcile(
        input.event,
        &input.transaction,
        &loans,
        &input.config,
    );
    serde_json::to_string(&hint).map_err(to_napi_error)
}
