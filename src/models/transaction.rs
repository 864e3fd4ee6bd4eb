//! This file defines the type `Transaction`, the core type of the tracker,
//! along with the direction enum and the draft type used to create records.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, models::DatabaseId};

/// Serde adapter keeping dates in `YYYY-MM-DD` form on every wire format.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    /// Serialize `date` as a `YYYY-MM-DD` string.
    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date.format(&FORMAT).map_err(S::Error::custom)?;

        serializer.serialize_str(&text)
    }

    /// Deserialize a `YYYY-MM-DD` string into a [Date].
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;

        Date::parse(&text, &FORMAT).map_err(D::Error::custom)
    }
}

/// The direction of a transaction: money earned or money spent.
///
/// The sign of an amount is carried by this enum at the interface boundary;
/// amounts themselves are always non-negative magnitudes. Backends that store
/// signed amounts internally re-derive the kind from the sign on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned, counted positively towards the balance.
    Income,
    /// Money spent, counted negatively towards the balance.
    Expense,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(Error::Validation(format!(
                "'{other}' is not a transaction kind, expected 'income' or 'expense'"
            ))),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Instances come from a [store](crate::stores::TransactionStore): the store
/// assigns the id on [add](crate::stores::TransactionStore::add) and returns
/// records from [list](crate::stores::TransactionStore::list). To describe a
/// record that has not been persisted yet, use [TransactionDraft].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The stable, backend-assigned id of the record.
    pub id: DatabaseId,
    /// The calendar date the transaction happened, with no time of day.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// A text description of what the transaction was for, may be empty.
    pub description: String,
    /// The non-negative amount of money spent or earned.
    pub amount: f64,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A label grouping related transactions, e.g. 'Food' or 'Salary'.
    pub category: String,
}

impl Transaction {
    /// The amount with the direction applied: positive for income, negative
    /// for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// A transaction that has not been persisted yet, so it has no id.
///
/// Finalize a draft by passing it to a store's
/// [add](crate::stores::TransactionStore::add).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDraft {
    /// The calendar date the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// A text description of what the transaction was for, may be empty.
    pub description: String,
    /// The non-negative amount of money spent or earned.
    pub amount: f64,
    /// Whether the amount was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A label grouping related transactions.
    pub category: String,
}

impl TransactionDraft {
    /// Create a draft for `amount` in the direction `kind`, dated today.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `amount` is negative or not finite.
    pub fn new(amount: f64, kind: TransactionKind) -> Result<Self, Error> {
        if !amount.is_finite() {
            return Err(Error::Validation(format!(
                "'{amount}' is not a valid amount"
            )));
        }

        if amount < 0.0 {
            return Err(Error::Validation(format!(
                "amounts must not be negative, got '{amount}'; \
                 the direction is carried by the transaction kind"
            )));
        }

        Ok(Self {
            date: OffsetDateTime::now_utc().date(),
            description: String::new(),
            amount,
            kind,
            category: String::new(),
        })
    }

    /// Set the date for the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// The amount with the direction applied: positive for income, negative
    /// for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}


#[cfg(test)]
mod transaction_draft_tests {
    use time::macros::date;

    use crate::Error;

    use super::{TransactionDraft, TransactionKind};

    #[test]
    fn new_rejects_negative_amount() {
        let result = TransactionDraft::new(-1.0, TransactionKind::Expense);

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn new_rejects_non_finite_amount() {
        assert!(TransactionDraft::new(f64::NAN, TransactionKind::Income).is_err());
        assert!(TransactionDraft::new(f64::INFINITY, TransactionKind::Income).is_err());
    }

    #[test]
    fn builder_sets_all_fields() {
        let draft = TransactionDraft::new(12.5, TransactionKind::Expense)
            .unwrap()
            .date(date!(2024 - 01 - 02))
            .description("Lunch")
            .category("Food");

        assert_eq!(draft.date, date!(2024 - 01 - 02));
        assert_eq!(draft.description, "Lunch");
        assert_eq!(draft.amount, 12.5);
        assert_eq!(draft.kind, TransactionKind::Expense);
        assert_eq!(draft.category, "Food");
    }

    #[test]
    fn signed_amount_negates_expenses() {
        let expense = TransactionDraft::new(40.0, TransactionKind::Expense).unwrap();
        let income = TransactionDraft::new(100.0, TransactionKind::Income).unwrap();

        assert_eq!(expense.signed_amount(), -40.0);
        assert_eq!(income.signed_amount(), 100.0);
    }
}

#[cfg(test)]
mod transaction_serde_tests {
    use time::macros::date;

    use super::{Transaction, TransactionKind};

    fn sample() -> Transaction {
        Transaction {
            id: 1,
            date: date!(2024 - 01 - 01),
            description: "Paycheck".to_string(),
            amount: 100.0,
            kind: TransactionKind::Income,
            category: "Salary".to_string(),
        }
    }

    #[test]
    fn serializes_with_the_file_format_keys() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["description"], "Paycheck");
        assert_eq!(json["amount"], 100.0);
        assert_eq!(json["type"], "income");
        assert_eq!(json["category"], "Salary");
    }

    #[test]
    fn deserializes_from_the_file_format() {
        let json = r#"{
            "id": 7,
            "date": "2024-02-29",
            "description": "Groceries",
            "amount": 54.3,
            "type": "expense",
            "category": "Food"
        }"#;

        let transaction: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.id, 7);
        assert_eq!(transaction.date, date!(2024 - 02 - 29));
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.signed_amount(), -54.3);
    }
}
