//! Implements a transaction store backed by a single JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    models::{DatabaseId, Transaction, TransactionDraft, TransactionKind, iso_date},
    stores::TransactionStore,
};

/// Stores transactions as one JSON array that is the entire store.
///
/// Every `add`/`remove` rewrites the whole file, which is acceptable only
/// because data volumes are small. There is no protection against concurrent
/// writers; two sessions against the same file can clobber each other, so
/// deployment assumes a single user and a single session.
///
/// A missing, unreadable, or corrupt file reads as an empty store rather than
/// an error, to keep the application usable.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    records: Vec<Transaction>,
    next_id: DatabaseId,
}

/// A record as stored on disk.
///
/// Files written by earlier versions carry no `id` key; ids are assigned on
/// load and written back on the next mutation.
#[derive(Deserialize)]
struct StoredRecord {
    #[serde(default)]
    id: Option<DatabaseId>,
    #[serde(with = "iso_date")]
    date: Date,
    #[serde(default)]
    description: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: TransactionKind,
    #[serde(default)]
    category: String,
}

impl JsonFileStore {
    /// Open the store at `path`, reading any records already there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored = read_records(&path);

        let mut next_id = stored
            .iter()
            .filter_map(|record| record.id)
            .max()
            .unwrap_or(0)
            + 1;

        let records = stored
            .into_iter()
            .map(|record| {
                let id = record.id.unwrap_or_else(|| {
                    let id = next_id;
                    next_id += 1;
                    id
                });

                Transaction {
                    id,
                    date: record.date,
                    description: record.description,
                    amount: record.amount,
                    kind: record.kind,
                    category: record.category,
                }
            })
            .collect();

        Self {
            path,
            records,
            next_id,
        }
    }

    /// Rewrite the whole file from the in-memory list.
    fn flush(&self) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|error| Error::Unavailable(error.to_string()))?;

        fs::write(&self.path, json)?;

        Ok(())
    }
}

fn read_records(path: &Path) -> Vec<StoredRecord> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(error) => {
            tracing::warn!("could not read data file {}: {error}", path.display());
            return Vec::new();
        }
    };

    match serde_json::from_str(&text) {
        Ok(records) => records,
        Err(error) => {
            tracing::warn!(
                "data file {} is corrupt, starting with empty operations: {error}",
                path.display()
            );
            Vec::new()
        }
    }
}

impl TransactionStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Transaction>, Error> {
        Ok(self.records.clone())
    }

    fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        let transaction = Transaction {
            id: self.next_id,
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            kind: draft.kind,
            category: draft.category,
        };

        self.next_id += 1;
        self.records.push(transaction.clone());
        self.flush()?;

        Ok(transaction)
    }

    fn remove(&mut self, id: DatabaseId) -> Result<(), Error> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or(Error::NotFound)?;

        self.records.remove(index);
        self.flush()
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.records.clear();
        self.flush()
    }
}
