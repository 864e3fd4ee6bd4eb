//! In-memory filtering for the operations browser.

use std::ops::RangeInclusive;

use time::Date;

use crate::models::{Transaction, TransactionKind};

/// Defines which operations the browser views should keep.
///
/// All criteria are optional; an empty filter keeps everything. Filtering
/// happens in memory over a fetched record list, so it composes with every
/// storage backend.
#[derive(Debug, Default)]
pub struct OperationFilter {
    /// Keep operations within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Keep only operations of this kind.
    pub kind: Option<TransactionKind>,
    /// Keep only operations with this exact category.
    pub category: Option<String>,
    /// Keep only operations whose description contains this text,
    /// case-insensitively.
    pub search: Option<String>,
}

impl OperationFilter {
    /// Whether `operation` satisfies every set criterion.
    pub fn matches(&self, operation: &Transaction) -> bool {
        if let Some(date_range) = &self.date_range {
            if !date_range.contains(&operation.date) {
                return false;
            }
        }

        if let Some(kind) = self.kind {
            if operation.kind != kind {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if &operation.category != category {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let matches_search = operation
                .description
                .to_lowercase()
                .contains(&search.to_lowercase());

            if !matches_search {
                return false;
            }
        }

        true
    }

    /// Keep the operations that satisfy every set criterion.
    pub fn apply(&self, operations: Vec<Transaction>) -> Vec<Transaction> {
        operations
            .into_iter()
            .filter(|operation| self.matches(operation))
            .collect()
    }
}
