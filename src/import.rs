//! Parses CSV bank statements into transaction drafts.
//!
//! The accepted statement layout has the columns `Date` (`DD/MM/YYYY`),
//! `Operation`, `Category`, `Amount Deducted`, `Gains`, `Balance`, and
//! `Month`. A row becomes an expense when `Amount Deducted` is negative,
//! an income when `Gains` is positive, and is skipped otherwise (balance
//! carry-over rows).

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    models::{TransactionDraft, TransactionKind},
};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[day]/[month]/[year]");

const REQUIRED_COLUMNS: [&str; 7] = [
    "Date",
    "Operation",
    "Category",
    "Amount Deducted",
    "Gains",
    "Balance",
    "Month",
];

struct ColumnIndexes {
    date: usize,
    operation: usize,
    category: usize,
    amount_deducted: usize,
    gains: usize,
}

/// Parses CSV statement data into drafts ready to be added to a store.
///
/// Expects `text` to contain a header row with the columns listed in the
/// module docs. Returns the drafts in row order; skipped rows are logged at
/// the debug level.
///
/// # Errors
/// Returns [Error::InvalidCsv] if a required column is missing or a row
/// cannot be parsed.
pub fn parse_statement(text: &str) -> Result<Vec<TransactionDraft>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidCsv(error.to_string()))?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .copied()
        .collect();

    if !missing.is_empty() {
        return Err(Error::InvalidCsv(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let column = |name: &str| headers.iter().position(|header| header == name).unwrap();
    let indexes = ColumnIndexes {
        date: column("Date"),
        operation: column("Operation"),
        category: column("Category"),
        amount_deducted: column("Amount Deducted"),
        gains: column("Gains"),
    };

    let mut drafts = Vec::new();

    // Line 1 is the header row.
    for (index, record) in reader.records().enumerate() {
        let line_number = index + 2;
        let record = record.map_err(|error| {
            Error::InvalidCsv(format!("could not read line {line_number}: {error}"))
        })?;

        if let Some(draft) = parse_row(&record, &indexes, line_number)? {
            drafts.push(draft);
        }
    }

    Ok(drafts)
}

fn parse_row(
    record: &csv::StringRecord,
    indexes: &ColumnIndexes,
    line_number: usize,
) -> Result<Option<TransactionDraft>, Error> {
    let field = |index: usize| record.get(index).unwrap_or_default();

    let amount_deducted = parse_number(field(indexes.amount_deducted), line_number)?;
    let gains = parse_number(field(indexes.gains), line_number)?;

    // Rows that neither deduct nor gain do not represent a transaction.
    let (kind, amount) = if amount_deducted < 0.0 {
        (TransactionKind::Expense, amount_deducted.abs())
    } else if gains > 0.0 {
        (TransactionKind::Income, gains)
    } else {
        tracing::debug!("skipping line {line_number}: no deduction and no gain");
        return Ok(None);
    };

    let date = Date::parse(field(indexes.date), &DATE_FORMAT).map_err(|error| {
        Error::InvalidCsv(format!(
            "could not parse '{}' as a date on line {line_number}: {error}",
            field(indexes.date)
        ))
    })?;

    let draft = TransactionDraft::new(amount, kind)?
        .date(date)
        .description(field(indexes.operation))
        .category(field(indexes.category));

    Ok(Some(draft))
}

fn parse_number(text: &str, line_number: usize) -> Result<f64, Error> {
    text.parse().map_err(|error| {
        Error::InvalidCsv(format!(
            "could not parse '{text}' as a number on line {line_number}: {error}"
        ))
    })
}

#[cfg(test)]
mod parse_statement_tests {
    use time::macros::date;

    use crate::{Error, models::TransactionKind};

    use super::parse_statement;

    const HEADER: &str = "Date,Operation,Category,Amount Deducted,Gains,Balance,Month";

    #[test]
    fn negative_deduction_becomes_an_expense() {
        let text = format!("{HEADER}\n01/03/2024,Groceries,Food,-20,0,980,March");

        let drafts = parse_statement(&text).unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].date, date!(2024 - 03 - 01));
        assert_eq!(drafts[0].description, "Groceries");
        assert_eq!(drafts[0].category, "Food");
        assert_eq!(drafts[0].amount, 20.0);
        assert_eq!(drafts[0].kind, TransactionKind::Expense);
    }

    #[test]
    fn positive_gains_become_income() {
        let text = format!("{HEADER}\n15/01/2024,Paycheck,Salary,0,1500.50,2480.50,January");

        let drafts = parse_statement(&text).unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, TransactionKind::Income);
        assert_eq!(drafts[0].amount, 1500.50);
    }

    #[test]
    fn rows_with_neither_deduction_nor_gain_are_skipped() {
        let text = format!(
            "{HEADER}\n\
             01/03/2024,Opening balance,Other,0,0,1000,March\n\
             02/03/2024,Groceries,Food,-20,0,980,March"
        );

        let drafts = parse_statement(&text).unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].description, "Groceries");
    }

    #[test]
    fn deduction_wins_when_a_row_has_both_fields_set() {
        let text = format!("{HEADER}\n01/03/2024,Odd row,Other,-5,10,1005,March");

        let drafts = parse_statement(&text).unwrap();

        assert_eq!(drafts[0].kind, TransactionKind::Expense);
        assert_eq!(drafts[0].amount, 5.0);
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let text = "Date,Operation,Category\n01/03/2024,Groceries,Food";

        let result = parse_statement(text);

        match result {
            Err(Error::InvalidCsv(message)) => {
                assert!(message.contains("Amount Deducted"));
                assert!(message.contains("Gains"));
            }
            other => panic!("expected InvalidCsv, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_dates_are_reported_with_their_line_number() {
        let text = format!("{HEADER}\n2024-03-01,Groceries,Food,-20,0,980,March");

        let result = parse_statement(&text);

        match result {
            Err(Error::InvalidCsv(message)) => assert!(message.contains("line 2")),
            other => panic!("expected InvalidCsv, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_amounts_are_reported_with_their_line_number() {
        let text = format!("{HEADER}\n01/03/2024,Groceries,Food,lots,0,980,March");

        let result = parse_statement(&text);

        match result {
            Err(Error::InvalidCsv(message)) => assert!(message.contains("line 2")),
            other => panic!("expected InvalidCsv, got {other:?}"),
        }
    }

    #[test]
    fn quoted_descriptions_keep_their_commas() {
        let text = format!("{HEADER}\n01/03/2024,\"Cafe, downtown\",Food,-8.5,0,991.5,March");

        let drafts = parse_statement(&text).unwrap();

        assert_eq!(drafts[0].description, "Cafe, downtown");
    }

    #[test]
    fn an_empty_statement_yields_no_drafts() {
        let drafts = parse_statement(HEADER).unwrap();

        assert!(drafts.is_empty());
    }
}
