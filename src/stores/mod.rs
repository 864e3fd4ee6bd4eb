//! Contains the storage trait and the three interchangeable backends that
//! persist [transactions](crate::models::Transaction).

mod json_file;
mod remote;
mod sqlite;

pub use json_file::JsonFileStore;
pub use remote::RemoteStore;
pub use sqlite::SqliteStore;

use crate::{
    Error,
    models::{DatabaseId, Transaction, TransactionDraft},
};

/// Handles the persistence and retrieval of transactions.
///
/// A backend is selected once at startup and used for the lifetime of the
/// process. The required capability set is `{list, add, remove}`; the
/// optional capabilities `categories` and `clear` default to an empty result
/// and a no-op so callers never need to probe which backend they hold.
pub trait TransactionStore {
    /// Retrieve all known records. Order is unspecified by this contract;
    /// backends may return insertion order or storage-natural order.
    ///
    /// # Errors
    /// Returns [Error::Unavailable] if the underlying medium cannot be
    /// reached, and [Error::Unauthenticated] for the remote backend without
    /// a session.
    fn list(&self) -> Result<Vec<Transaction>, Error>;

    /// Persist one record and return it with its assigned id.
    ///
    /// # Errors
    /// Returns [Error::Validation] if required fields are missing or
    /// malformed, and [Error::Unauthenticated] for the remote backend
    /// without a session.
    fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, Error>;

    /// Delete one record by its stable id.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no record has the given id.
    fn remove(&mut self, id: DatabaseId) -> Result<(), Error>;

    /// The names of all known categories.
    ///
    /// Backends without a category registry return an empty list rather than
    /// failing.
    fn categories(&self) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }

    /// Delete every record.
    ///
    /// Backends without a bulk-delete capability treat this as a no-op.
    fn clear(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

impl<S: TransactionStore + ?Sized> TransactionStore for Box<S> {
    fn list(&self) -> Result<Vec<Transaction>, Error> {
        (**self).list()
    }

    fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        (**self).add(draft)
    }

    fn remove(&mut self, id: DatabaseId) -> Result<(), Error> {
        (**self).remove(id)
    }

    fn categories(&self) -> Result<Vec<String>, Error> {
        (**self).categories()
    }

    fn clear(&mut self) -> Result<(), Error> {
        (**self).clear()
    }
}
