//! The facade uniting a storage backend with the balance aggregator.

use crate::{
    Error,
    balance::total_balance,
    models::{DatabaseId, Transaction, TransactionDraft},
    stores::TransactionStore,
};

/// Exposes a uniform CRUD surface over whichever storage backend was selected
/// at startup.
///
/// This is intentionally a thin pass-through, not a business-rule layer. No
/// validation happens here beyond what the backend enforces and backend
/// errors propagate untranslated. Nothing is cached: the balance is
/// recomputed from a fresh `list` on every call so it always reflects the
/// latest persisted state.
#[derive(Debug)]
pub struct DataManager<S: TransactionStore> {
    store: S,
}

impl<S: TransactionStore> DataManager<S> {
    /// Create a manager around `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The signed sum of all persisted operations.
    pub fn current_balance(&self) -> Result<f64, Error> {
        Ok(total_balance(&self.operations()?))
    }

    /// Persist one operation and return it with its assigned id.
    pub fn add_operation(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        self.store.add(draft)
    }

    /// Persist many operations, e.g. rows parsed from a CSV statement.
    ///
    /// Stops at the first failure; operations added before the failure stay
    /// persisted.
    pub fn import_operations(
        &mut self,
        drafts: Vec<TransactionDraft>,
    ) -> Result<Vec<Transaction>, Error> {
        drafts
            .into_iter()
            .map(|draft| self.store.add(draft))
            .collect()
    }

    /// Delete one operation by its stable id.
    pub fn delete_operation(&mut self, id: DatabaseId) -> Result<(), Error> {
        self.store.remove(id)
    }

    /// All persisted operations.
    pub fn operations(&self) -> Result<Vec<Transaction>, Error> {
        self.store.list()
    }

    /// The names of all known categories; empty for backends without a
    /// category registry.
    pub fn categories(&self) -> Result<Vec<String>, Error> {
        self.store.categories()
    }

    /// Delete every operation, where the backend supports it.
    pub fn clear_all(&mut self) -> Result<(), Error> {
        self.store.clear()
    }
}

#[cfg(test)]
mod data_manager_tests {
    use time::macros::date;

    use crate::{
        Error,
        models::{TransactionDraft, TransactionKind},
        stores::JsonFileStore,
    };

    use super::DataManager;

    fn manager_in(dir: &tempfile::TempDir) -> DataManager<JsonFileStore> {
        DataManager::new(JsonFileStore::open(dir.path().join("operations.json")))
    }

    fn draft(amount: f64, kind: TransactionKind, category: &str) -> TransactionDraft {
        TransactionDraft::new(amount, kind)
            .unwrap()
            .date(date!(2024 - 01 - 01))
            .category(category)
    }

    #[test]
    fn balance_reflects_the_latest_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);

        assert_eq!(manager.current_balance(), Ok(0.0));

        manager
            .add_operation(draft(100.0, TransactionKind::Income, "Salary"))
            .unwrap();
        manager
            .add_operation(draft(40.0, TransactionKind::Expense, "Food"))
            .unwrap();

        assert_eq!(manager.current_balance(), Ok(60.0));
    }

    #[test]
    fn listing_twice_without_writes_returns_equal_record_sets() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);

        manager
            .add_operation(draft(100.0, TransactionKind::Income, "Salary"))
            .unwrap();

        assert_eq!(manager.operations(), manager.operations());
    }

    #[test]
    fn added_operations_come_back_from_list_unchanged_except_for_the_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);

        let draft = draft(40.0, TransactionKind::Expense, "Food").description("Supermarket");
        let added = manager.add_operation(draft.clone()).unwrap();

        let listed = manager.operations().unwrap();

        assert_eq!(listed, vec![added.clone()]);
        assert_eq!(added.date, draft.date);
        assert_eq!(added.description, draft.description);
        assert_eq!(added.amount, draft.amount);
        assert_eq!(added.kind, draft.kind);
        assert_eq!(added.category, draft.category);
    }

    #[test]
    fn deleting_a_just_added_operation_removes_exactly_that_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);

        let keep = manager
            .add_operation(draft(100.0, TransactionKind::Income, "Salary"))
            .unwrap();
        let target = manager
            .add_operation(draft(40.0, TransactionKind::Expense, "Food"))
            .unwrap();

        manager.delete_operation(target.id).unwrap();

        assert_eq!(manager.operations(), Ok(vec![keep]));
        assert_eq!(manager.delete_operation(target.id), Err(Error::NotFound));
    }

    #[test]
    fn import_persists_every_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);

        let imported = manager
            .import_operations(vec![
                draft(100.0, TransactionKind::Income, "Salary"),
                draft(40.0, TransactionKind::Expense, "Food"),
            ])
            .unwrap();

        assert_eq!(imported.len(), 2);
        assert_eq!(manager.current_balance(), Ok(60.0));
    }

    #[test]
    fn categories_are_empty_for_backends_without_a_registry() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(manager_in(&dir).categories(), Ok(vec![]));
    }

    #[test]
    fn clear_all_resets_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = manager_in(&dir);

        manager
            .add_operation(draft(100.0, TransactionKind::Income, "Salary"))
            .unwrap();
        manager.clear_all().unwrap();

        assert_eq!(manager.operations(), Ok(vec![]));
        assert_eq!(manager.current_balance(), Ok(0.0));
    }

    #[test]
    fn works_through_a_boxed_store() {
        let dir = tempfile::tempdir().unwrap();
        let store: Box<dyn crate::stores::TransactionStore> =
            Box::new(JsonFileStore::open(dir.path().join("operations.json")));
        let mut manager = DataManager::new(store);

        manager
            .add_operation(draft(5.0, TransactionKind::Income, "Other"))
            .unwrap();

        assert_eq!(manager.current_balance(), Ok(5.0));
    }
}
