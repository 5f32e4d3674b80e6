//! Service layer.

mod transaction_runner;

pub use transaction_runner::run_transaction;
