//! Implements a SQLite backed transaction store.

use std::path::Path;

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    models::{DatabaseId, Transaction, TransactionDraft, TransactionKind},
    stores::TransactionStore,
};

/// Stores transactions in a SQLite database.
///
/// The schema is three tables: `users`, `categories`, and `budget` (the
/// entries). Amounts are stored signed, negative for expenses, and the kind
/// is re-derived from the sign on read. Categories are looked up or created
/// inside the same SQL transaction as the entry insert, so a failed insert
/// never leaves a half-written row behind.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
    user_id: DatabaseId,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns [Error::Unavailable] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let connection = Connection::open(path).map_err(|error| {
            Error::Unavailable(format!("could not open database {}: {error}", path.display()))
        })?;

        Self::from_connection(connection)
    }

    /// Build a store around an existing SQLite `connection`, creating the
    /// schema and the default user if they do not exist yet.
    pub fn from_connection(connection: Connection) -> Result<Self, Error> {
        connection.pragma_update(None, "foreign_keys", true)?;
        initialize(&connection)?;
        let user_id = ensure_default_user(&connection)?;

        Ok(Self {
            connection,
            user_id,
        })
    }

    /// Build a store on an in-memory database, useful for tests and demos.
    pub fn open_in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;

        Self::from_connection(connection)
    }
}

fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            currency TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            category_id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_name TEXT NOT NULL UNIQUE,
            category_description TEXT
        )",
        (),
    )?;

    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
            usr_id INTEGER NOT NULL,
            entry_date TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            FOREIGN KEY(usr_id) REFERENCES users(user_id),
            FOREIGN KEY(category_id) REFERENCES categories(category_id)
        )",
        (),
    )?;

    Ok(())
}

/// Get the id of the local user row, creating it on first use.
///
/// The deployment assumption is a single local user per database file.
fn ensure_default_user(connection: &Connection) -> Result<DatabaseId, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO users (username, currency, email, password)
         VALUES ('local', '€', 'local@spendly', '')",
        (),
    )?;

    let user_id = connection.query_row(
        "SELECT user_id FROM users ORDER BY user_id LIMIT 1",
        [],
        |row| row.get(0),
    )?;

    Ok(user_id)
}

fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let amount: f64 = row.get(3)?;
    let kind = if amount < 0.0 {
        TransactionKind::Expense
    } else {
        TransactionKind::Income
    };

    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        amount: amount.abs(),
        kind,
        category: row.get(4)?,
    })
}

/// Look up the id for `name`, creating the category on first use.
fn category_id_or_create(
    tx: &rusqlite::Transaction,
    name: &str,
) -> Result<DatabaseId, Error> {
    let existing = tx.query_row(
        "SELECT category_id FROM categories WHERE category_name = ?1",
        [name],
        |row| row.get(0),
    );

    match existing {
        Ok(id) => Ok(id),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let id = tx.query_row(
                "INSERT INTO categories (category_name, category_description)
                 VALUES (?1, ?2)
                 RETURNING category_id",
                (name, format!("Category for {name}")),
                |row| row.get(0),
            )?;

            Ok(id)
        }
        Err(error) => Err(error.into()),
    }
}

impl TransactionStore for SqliteStore {
    fn list(&self) -> Result<Vec<Transaction>, Error> {
        self.connection
            .prepare(
                "SELECT b.entry_id, b.entry_date, b.description, b.amount, c.category_name
                 FROM budget b
                 INNER JOIN categories c ON c.category_id = b.category_id
                 WHERE b.usr_id = ?1",
            )?
            .query_map([self.user_id], |row| map_row_to_transaction(row))?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
            .collect()
    }

    fn add(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        if draft.category.is_empty() {
            return Err(Error::Validation(
                "a category is required to persist an entry".to_owned(),
            ));
        }

        let user_id = self.user_id;
        let tx = self.connection.transaction()?;

        let category_id = category_id_or_create(&tx, &draft.category)?;

        let entry_id = tx.query_row(
            "INSERT INTO budget (usr_id, entry_date, description, category_id, amount)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING entry_id",
            params![
                user_id,
                draft.date,
                draft.description,
                category_id,
                draft.signed_amount()
            ],
            |row| row.get(0),
        )?;

        tx.commit()?;

        Ok(Transaction {
            id: entry_id,
            date: draft.date,
            description: draft.description,
            amount: draft.amount,
            kind: draft.kind,
            category: draft.category,
        })
    }

    fn remove(&mut self, id: DatabaseId) -> Result<(), Error> {
        let deleted = self.connection.execute(
            "DELETE FROM budget WHERE entry_id = ?1 AND usr_id = ?2",
            params![id, self.user_id],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    fn categories(&self) -> Result<Vec<String>, Error> {
        self.connection
            .prepare("SELECT category_name FROM categories ORDER BY category_name")?
            .query_map([], |row| row.get(0))?
            .map(|maybe_name| maybe_name.map_err(Error::from))
            .collect()
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.connection
            .execute("DELETE FROM budget WHERE usr_id = ?1", [self.user_id])?;

        Ok(())
    }
}
