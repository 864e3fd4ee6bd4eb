//! Spendly is a personal finance tracker: record income and expense
//! operations, view balances, and browse simple aggregate reports.
//!
//! The library is a thin data layer under a presentation surface. A
//! [storage backend](stores::TransactionStore) persists
//! [transactions](models::Transaction) in a JSON file, a SQLite database,
//! or on a remote HTTP API, and the [DataManager](manager::DataManager)
//! facade combines the selected backend with the pure
//! [balance aggregation](balance) functions. Everything is synchronous:
//! one blocking call per user interaction, no background work, no caching.
//!
//! The backend is picked once at startup through [config::AppConfig]; it is
//! not swappable within a session. The file backend assumes a single user
//! and a single session, since concurrent writers can clobber each other's
//! data.

#![warn(missing_docs)]

pub mod balance;
pub mod config;
pub mod export;
pub mod filter;
pub mod import;
pub mod manager;
pub mod models;
pub mod session;
pub mod stores;

mod error;

pub use error::Error;
