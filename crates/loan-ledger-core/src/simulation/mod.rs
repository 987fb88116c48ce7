//! What-if projections that never touch the ledger.

pub mod extra_payment;

pub use extra_payment::{simulate_extra_payment, ExtraPaymentSimulation};
