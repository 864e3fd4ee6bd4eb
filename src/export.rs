//! Serializes the full record list as a CSV report.

use std::io::Write;

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    models::{Transaction, TransactionKind, iso_date},
};

/// One CSV row; the columns are `date, description, amount, type, category`.
#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(with = "iso_date")]
    date: Date,
    description: &'a str,
    amount: f64,
    #[serde(rename = "type")]
    kind: TransactionKind,
    category: &'a str,
}

/// Write `operations` to `writer` as CSV, headers included.
///
/// # Errors
/// Returns [Error::Unavailable] if writing fails.
pub fn write_operations<W: Write>(writer: W, operations: &[Transaction]) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written by hand so an empty record list still exports the header row.
    csv_writer
        .write_record(["date", "description", "amount", "type", "category"])
        .map_err(|error| Error::Unavailable(error.to_string()))?;

    for operation in operations {
        csv_writer
            .serialize(ExportRow {
                date: operation.date,
                description: &operation.description,
                amount: operation.amount,
                kind: operation.kind,
                category: &operation.category,
            })
            .map_err(|error| Error::Unavailable(error.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|error| Error::Unavailable(error.to_string()))?;

    Ok(())
}

/// Render `operations` as a CSV string.
pub fn to_csv_string(operations: &[Transaction]) -> Result<String, Error> {
    let mut buffer = Vec::new();
    write_operations(&mut buffer, operations)?;

    String::from_utf8(buffer).map_err(|error| Error::Unavailable(error.to_string()))
}

#[cfg(test)]
mod export_tests {
    use time::macros::date;

    use crate::models::{Transaction, TransactionKind};

    use super::to_csv_string;

    fn operations() -> Vec<Transaction> {
        vec![
            Transaction {
                id: 1,
                date: date!(2024 - 01 - 01),
                description: "Paycheck".to_string(),
                amount: 100.0,
                kind: TransactionKind::Income,
                category: "Salary".to_string(),
            },
            Transaction {
                id: 2,
                date: date!(2024 - 01 - 02),
                description: "Supermarket, downtown".to_string(),
                amount: 40.0,
                kind: TransactionKind::Expense,
                category: "Food".to_string(),
            },
        ]
    }

    #[test]
    fn writes_the_documented_columns_in_order() {
        let csv = to_csv_string(&operations()).unwrap();

        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("date,description,amount,type,category")
        );
        assert_eq!(lines.next(), Some("2024-01-01,Paycheck,100.0,income,Salary"));
    }

    #[test]
    fn quotes_fields_containing_commas() {
        let csv = to_csv_string(&operations()).unwrap();

        assert!(csv.contains("\"Supermarket, downtown\""));
    }

    #[test]
    fn an_empty_list_exports_headers_only() {
        let csv = to_csv_string(&[]).unwrap();

        assert_eq!(csv.trim(), "date,description,amount,type,category");
    }
}
