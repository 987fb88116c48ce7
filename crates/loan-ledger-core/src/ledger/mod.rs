//! The per-loan payment ledger: realized scheduled payments and extra
//! (principal-only) payments, each an ordered collection of events.

pub mod descriptions;
pub mod events;
pub mod payment_ledger;

pub use descriptions::{extra_description, scheduled_description};
pub use events::{EntryPatch, ExtraPaymentEvent, LedgerCollection, LedgerEntry, PaymentEvent};
pub use payment_ledger::LoanLedger;
