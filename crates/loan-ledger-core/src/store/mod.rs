//! The persistence contract the core needs, and two implementations of it.

pub mod json_file;
pub mod memory;
pub mod traits;

pub use json_file::JsonFileStore;
pub use memory::InMemoryLoanStore;
pub use traits::LoanStore;
