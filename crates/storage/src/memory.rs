//! Volatile store, used when no database is configured and in tests.

use std::{marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use indexmap::IndexMap;
use model::{custom_table::CustomTable, quick_links::QuickLinks, row::Row, WithId};
use tokio::sync::Mutex;
use utility::{id::Id, let_also::LetAlso};

use crate::database::{
    CustomTableRepo, Database, DatabaseAutocommit, DatabaseError, DatabaseOperations,
    DatabaseTransaction, QuickLinksRepo, Result, RowRepo,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    rows: IndexMap<String, Row>,
    custom_tables: IndexMap<String, CustomTable>,
    quick_links: Option<QuickLinks>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
pub struct Auto;

#[derive(Debug)]
pub struct Snapshot;

/// A write made inside a transaction, replayed on the shared state when the
/// transaction commits.
#[derive(Debug, Clone)]
enum Change {
    PutRow(String, Row),
    DeleteRow(String),
    PutCustomTable(String, CustomTable),
    DeleteCustomTable(String),
    PutQuickLinks(QuickLinks),
}

impl Change {
    fn apply(self, state: &mut MemoryState) {
        match self {
            Change::PutRow(id, row) => {
                state.rows.insert(id, row);
            }
            Change::DeleteRow(id) => {
                state.rows.shift_remove(&id);
            }
            Change::PutCustomTable(id, table) => {
                state.custom_tables.insert(id, table);
            }
            Change::DeleteCustomTable(id) => {
                state.custom_tables.shift_remove(&id);
            }
            Change::PutQuickLinks(links) => state.quick_links = Some(links),
        }
    }
}

/// Access to a [`MemoryDatabase`]. An autocommit session works on the
/// shared state directly. A transaction reads a snapshot taken when it
/// began and keeps a journal of its writes; only the journal reaches the
/// shared state on commit.
#[derive(Debug)]
pub struct MemorySession<K> {
    shared: Arc<Mutex<MemoryState>>,
    snapshot: Option<MemoryState>,
    journal: Vec<Change>,
    kind: PhantomData<K>,
}

impl<K> MemorySession<K> {
    fn new(shared: Arc<Mutex<MemoryState>>, snapshot: Option<MemoryState>) -> Self {
        Self {
            shared,
            snapshot,
            journal: vec![],
            kind: PhantomData,
        }
    }

    async fn with_state<R, F>(&mut self, action: F) -> R
    where
        F: FnOnce(&mut MemoryState) -> R,
    {
        match &mut self.snapshot {
            Some(snapshot) => action(snapshot),
            None => action(&mut *self.shared.lock().await),
        }
    }

    /// Writes `change` to the state this session sees.
    async fn write(&mut self, change: Change) {
        if self.snapshot.is_some() {
            self.journal.push(change.clone());
        }
        self.with_state(|state| change.apply(state)).await;
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Transaction = MemorySession<Snapshot>;
    type Autocommit = MemorySession<Auto>;

    async fn transaction(&self) -> Result<Self::Transaction> {
        let snapshot = self.state.lock().await.clone();
        Ok(MemorySession::new(self.state.clone(), Some(snapshot)))
    }

    fn auto(&self) -> Self::Autocommit {
        MemorySession::new(self.state.clone(), None)
    }
}

#[async_trait]
impl DatabaseTransaction for MemorySession<Snapshot> {
    async fn commit(self) -> Result<()> {
        let mut shared = self.shared.lock().await;
        for change in self.journal {
            change.apply(&mut shared);
        }
        Ok(())
    }
}

impl DatabaseAutocommit for MemorySession<Auto> {}

impl<K: Send> DatabaseOperations for MemorySession<K> {}

fn with_id<T>(id: &str, content: &T) -> WithId<T>
where
    T: utility::id::HasId<IdType = String> + Clone,
{
    WithId::new(Id::new(id.to_owned()), content.clone())
}

#[async_trait]
impl<K: Send> RowRepo for MemorySession<K> {
    async fn rows(&mut self) -> Result<Vec<WithId<Row>>> {
        self.with_state(|state| {
            state
                .rows
                .iter()
                .map(|(id, row)| with_id(id, row))
                .collect::<Vec<_>>()
        })
        .await
        .let_owned(Ok)
    }

    async fn row(&mut self, id: &Id<Row>) -> Result<WithId<Row>> {
        self.with_state(|state| {
            state
                .rows
                .get(id.raw_ref::<str>())
                .map(|row| with_id(id.raw_ref(), row))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn rows_by_ids(&mut self, ids: &[Id<Row>]) -> Result<Vec<WithId<Row>>> {
        self.with_state(|state| {
            ids.iter()
                .filter_map(|id| {
                    state
                        .rows
                        .get(id.raw_ref::<str>())
                        .map(|row| with_id(id.raw_ref(), row))
                })
                .collect::<Vec<_>>()
        })
        .await
        .let_owned(Ok)
    }

    async fn put_row(&mut self, row: WithId<Row>) -> Result<WithId<Row>> {
        self.write(Change::PutRow(row.id.raw(), row.content.clone()))
            .await;
        Ok(row)
    }

    async fn delete_row(&mut self, id: &Id<Row>) -> Result<WithId<Row>> {
        let row = self.row(id).await?;
        self.write(Change::DeleteRow(id.raw())).await;
        Ok(row)
    }
}

#[async_trait]
impl<K: Send> CustomTableRepo for MemorySession<K> {
    async fn custom_tables(&mut self) -> Result<Vec<WithId<CustomTable>>> {
        let mut tables = self
            .with_state(|state| {
                state
                    .custom_tables
                    .iter()
                    .map(|(id, table)| with_id(id, table))
                    .collect::<Vec<_>>()
            })
            .await;
        tables.sort_by(|a, b| b.content.created_at.cmp(&a.content.created_at));
        Ok(tables)
    }

    async fn custom_table(&mut self, id: &Id<CustomTable>) -> Result<WithId<CustomTable>> {
        self.with_state(|state| {
            state
                .custom_tables
                .get(id.raw_ref::<str>())
                .map(|table| with_id(id.raw_ref(), table))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn custom_table_by_share_id(
        &mut self,
        share_id: &str,
    ) -> Result<WithId<CustomTable>> {
        self.with_state(|state| {
            state
                .custom_tables
                .iter()
                .find(|(_, table)| table.share_id == share_id)
                .map(|(id, table)| with_id(id, table))
                .ok_or(DatabaseError::NotFound)
        })
        .await
    }

    async fn put_custom_table(
        &mut self,
        table: WithId<CustomTable>,
    ) -> Result<WithId<CustomTable>> {
        self.write(Change::PutCustomTable(table.id.raw(), table.content.clone()))
            .await;
        Ok(table)
    }

    async fn delete_custom_table(
        &mut self,
        id: &Id<CustomTable>,
    ) -> Result<WithId<CustomTable>> {
        let table = self.custom_table(id).await?;
        self.write(Change::DeleteCustomTable(id.raw())).await;
        Ok(table)
    }
}

#[async_trait]
impl<K: Send> QuickLinksRepo for MemorySession<K> {
    async fn quick_links(&mut self) -> Result<Option<QuickLinks>> {
        Ok(self.with_state(|state| state.quick_links.clone()).await)
    }

    async fn put_quick_links(&mut self, links: QuickLinks) -> Result<QuickLinks> {
        self.write(Change::PutQuickLinks(links.clone())).await;
        Ok(links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::ExampleData;

    fn row(id: &str) -> WithId<Row> {
        WithId::new(Id::new(id.to_owned()), Row::example_data())
    }

    #[tokio::test]
    async fn autocommit_writes_through() {
        let database = MemoryDatabase::new();
        database.auto().put_row(row("a")).await.unwrap();
        database.auto().put_row(row("b")).await.unwrap();

        let rows = database.auto().rows().await.unwrap();
        assert_eq!(
            rows.iter().map(|row| row.id.raw()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
    }

    #[tokio::test]
    async fn transaction_is_isolated_until_commit() {
        let database = MemoryDatabase::new();
        let mut tx = database.transaction().await.unwrap();
        tx.put_row(row("a")).await.unwrap();
        assert!(database.auto().rows().await.unwrap().is_empty());
        assert_eq!(tx.rows().await.unwrap().len(), 1);

        tx.commit().await.unwrap();
        assert_eq!(database.auto().rows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_transaction_is_discarded() {
        let database = MemoryDatabase::new();
        {
            let mut tx = database.transaction().await.unwrap();
            tx.put_row(row("a")).await.unwrap();
        }
        assert!(database.auto().rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_keeps_concurrent_autocommit_writes() {
        let database = MemoryDatabase::new();
        database.auto().put_row(row("kept")).await.unwrap();
        database.auto().put_row(row("removed")).await.unwrap();

        let mut tx = database.transaction().await.unwrap();
        database.auto().put_row(row("created-meanwhile")).await.unwrap();
        database
            .auto()
            .delete_row(&Id::new("removed".to_owned()))
            .await
            .unwrap();
        database
            .auto()
            .put_quick_links(QuickLinks::default())
            .await
            .unwrap();
        tx.put_row(row("in-tx")).await.unwrap();
        tx.commit().await.unwrap();

        let ids = database
            .auto()
            .rows()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.id.raw())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["kept", "created-meanwhile", "in-tx"]);
        assert_eq!(
            database.auto().quick_links().await.unwrap(),
            Some(QuickLinks::default())
        );
    }

    #[tokio::test]
    async fn transaction_deletes_reach_shared_state() {
        let database = MemoryDatabase::new();
        database.auto().put_row(row("a")).await.unwrap();

        let mut tx = database.transaction().await.unwrap();
        tx.delete_row(&Id::new("a".to_owned())).await.unwrap();
        assert!(tx.row(&Id::new("a".to_owned())).await.is_err());
        assert_eq!(database.auto().rows().await.unwrap().len(), 1);

        tx.commit().await.unwrap();
        assert!(database.auto().rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_keeps_order_and_reports_missing() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        for id in ["a", "b", "c"] {
            auto.put_row(row(id)).await.unwrap();
        }
        auto.delete_row(&Id::new("b".to_owned())).await.unwrap();
        let ids = auto
            .rows()
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.id.raw())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(matches!(
            auto.delete_row(&Id::new("b".to_owned())).await,
            Err(DatabaseError::NotFound)
        ));
        assert!(matches!(
            auto.row(&Id::new("b".to_owned())).await,
            Err(DatabaseError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rows_by_ids_skips_unknown() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        auto.put_row(row("a")).await.unwrap();
        let found = auto
            .rows_by_ids(&[Id::new("missing".to_owned()), Id::new("a".to_owned())])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn custom_tables_by_share_id_and_age() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        let older = CustomTable::example_data();
        let mut newer = CustomTable::example_data();
        newer.created_at = older.created_at + chrono::Duration::days(1);
        newer.share_id = "abc123".to_owned();
        auto.put_custom_table(WithId::new(Id::new("old".to_owned()), older))
            .await
            .unwrap();
        auto.put_custom_table(WithId::new(Id::new("new".to_owned()), newer))
            .await
            .unwrap();

        let ids = auto
            .custom_tables()
            .await
            .unwrap()
            .into_iter()
            .map(|table| table.id.raw())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(
            auto.custom_table_by_share_id("abc123").await.unwrap().id.raw(),
            "new"
        );
        assert!(auto.custom_table_by_share_id("zzzzzz").await.is_err());
    }

    #[tokio::test]
    async fn quick_links_start_unset() {
        let database = MemoryDatabase::new();
        let mut auto = database.auto();
        assert_eq!(auto.quick_links().await.unwrap(), None);
        auto.put_quick_links(QuickLinks::default()).await.unwrap();
        assert_eq!(auto.quick_links().await.unwrap(), Some(QuickLinks::default()));
    }
}
