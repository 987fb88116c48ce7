pub mod advisory;
pub mod calculator;
pub mod ledger;
pub mod loans;

use loan_ledger_core::service::LoanService;
use loan_ledger_core::store::JsonFileStore;

/// What every stored-loan command needs.
pub struct Context {
    pub service: LoanService<JsonFileStore>,
    pub owner: String,
}
