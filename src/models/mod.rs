//! The domain models for the transaction tracker.

mod transaction;

pub use transaction::{Transaction, TransactionDraft, TransactionKind, iso_date};

/// Alias for the integer type used for backend-assigned record ids.
pub type DatabaseId = i64;
