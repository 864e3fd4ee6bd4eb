//! The error type shared across the storage backends and the data manager.

/// The errors that may occur while storing, retrieving, or importing
/// transactions.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The storage medium (file, database, or remote endpoint) could not be
    /// reached.
    ///
    /// The file backend recovers from a corrupt store by reading it as empty,
    /// so this variant mostly surfaces from the database and remote backends.
    #[error("the storage backend is unavailable: {0}")]
    Unavailable(String),

    /// A record was rejected on write because a required field was missing or
    /// malformed.
    #[error("invalid transaction data: {0}")]
    Validation(String),

    /// The requested record could not be found.
    ///
    /// Callers should check that the id is correct and that the record has
    /// not already been deleted.
    #[error("a transaction with the given id could not be found")]
    NotFound,

    /// The remote backend was called without a session.
    ///
    /// A successful login is required before any other remote call.
    #[error("not authenticated, log in first")]
    Unauthenticated,

    /// The CSV had issues that prevented it from being parsed.
    #[error("could not parse the CSV file: {0}")]
    InvalidCsv(String),

    /// There was an error loading the application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(error, Some(_)) if error.extended_code == 787 => {
                Error::Validation("a referenced row does not exist".to_owned())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {error}");
                Error::Sql(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Unavailable(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Unavailable(value.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(value: config::ConfigError) -> Self {
        Error::Config(value.to_string())
    }
}
