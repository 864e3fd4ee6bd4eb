//! Balance aggregation over in-memory transaction lists.
//!
//! Provides pure functions computing the total balance, per-category totals,
//! summary statistics, and the per-month/running series the analytics views
//! are built from. All of them are single-pass folds with no ordering
//! dependency beyond what their output requires.

use std::collections::HashMap;

use time::Date;

use crate::models::{Transaction, TransactionKind};

/// The signed sum of all records: income counts positively, expenses
/// negatively.
pub fn total_balance(operations: &[Transaction]) -> f64 {
    operations
        .iter()
        .map(Transaction::signed_amount)
        .sum()
}

/// The net amount per category, with the same signed-sum rule as
/// [total_balance].
///
/// One entry per distinct category seen; the values sum to the total balance.
pub fn category_totals(operations: &[Transaction]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();

    for operation in operations {
        *totals.entry(operation.category.clone()).or_insert(0.0) +=
            operation.signed_amount();
    }

    totals
}

/// The total spent per category, counting expenses only.
///
/// This is the category breakdown the analytics view charts; income rows are
/// ignored and the returned magnitudes are positive.
pub fn expense_category_totals(operations: &[Transaction]) -> HashMap<String, f64> {
    let mut totals = HashMap::new();

    for operation in operations {
        if operation.kind == TransactionKind::Expense {
            *totals.entry(operation.category.clone()).or_insert(0.0) += operation.amount;
        }
    }

    totals
}

/// Headline figures for the reports view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    /// Sum of all income amounts.
    pub total_income: f64,
    /// Sum of all expense amounts, as a positive magnitude.
    pub total_expenses: f64,
    /// `total_income - total_expenses`, equal to the total balance.
    pub net_balance: f64,
    /// The number of records summarized.
    pub count: usize,
}

/// Compute the [Summary] for a record list.
pub fn summarize(operations: &[Transaction]) -> Summary {
    let mut summary = Summary {
        count: operations.len(),
        ..Summary::default()
    };

    for operation in operations {
        match operation.kind {
            TransactionKind::Income => summary.total_income += operation.amount,
            TransactionKind::Expense => summary.total_expenses += operation.amount,
        }
    }

    summary.net_balance = summary.total_income - summary.total_expenses;
    summary
}

/// Income and expense totals for one month.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyTotals {
    /// Sum of the month's income amounts.
    pub income: f64,
    /// Sum of the month's expense amounts, as a positive magnitude.
    pub expenses: f64,
}

/// Aggregates income and expense totals by month.
///
/// # Returns
/// HashMap mapping each month (as a Date with day=1) to its totals.
pub fn monthly_totals(operations: &[Transaction]) -> HashMap<Date, MonthlyTotals> {
    let mut totals: HashMap<Date, MonthlyTotals> = HashMap::new();

    for operation in operations {
        let month = operation.date.replace_day(1).unwrap();
        let entry = totals.entry(month).or_default();

        match operation.kind {
            TransactionKind::Income => entry.income += operation.amount,
            TransactionKind::Expense => entry.expenses += operation.amount,
        }
    }

    totals
}

/// The cumulative signed balance after each transaction, in date order.
///
/// Records sharing a date keep their relative input order. The final entry's
/// balance equals [total_balance].
pub fn running_balance(operations: &[Transaction]) -> Vec<(Date, f64)> {
    let mut sorted: Vec<&Transaction> = operations.iter().collect();
    sorted.sort_by_key(|operation| operation.date);

    let mut cumulative = 0.0;
    sorted
        .into_iter()
        .map(|operation| {
            cumulative += operation.signed_amount();
            (operation.date, cumulative)
        })
        .collect()
}
