use std::{error, fmt, result};

use async_trait::async_trait;
use model::{
    custom_table::CustomTable, quick_links::QuickLinks, row::Row, WithId,
};
use utility::id::Id;

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::NotFound => write!(f, "not found"),
            DatabaseError::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for DatabaseError {}

pub type Result<T> = result::Result<T, DatabaseError>;

#[async_trait]
pub trait RowRepo {
    /// All rows in store order.
    async fn rows(&mut self) -> Result<Vec<WithId<Row>>>;

    async fn row(&mut self, id: &Id<Row>) -> Result<WithId<Row>>;

    /// The rows among `ids` that exist, in no particular order.
    async fn rows_by_ids(&mut self, ids: &[Id<Row>]) -> Result<Vec<WithId<Row>>>;

    /// Inserts the row or replaces the row with the same id.
    async fn put_row(&mut self, row: WithId<Row>) -> Result<WithId<Row>>;

    /// Removes a row and returns it. Custom tables keep referring to it.
    async fn delete_row(&mut self, id: &Id<Row>) -> Result<WithId<Row>>;
}

#[async_trait]
pub trait CustomTableRepo {
    /// All custom tables, newest first.
    async fn custom_tables(&mut self) -> Result<Vec<WithId<CustomTable>>>;

    async fn custom_table(
        &mut self,
        id: &Id<CustomTable>,
    ) -> Result<WithId<CustomTable>>;

    async fn custom_table_by_share_id(
        &mut self,
        share_id: &str,
    ) -> Result<WithId<CustomTable>>;

    /// Inserts the table or replaces the table with the same id, including
    /// its membership.
    async fn put_custom_table(
        &mut self,
        table: WithId<CustomTable>,
    ) -> Result<WithId<CustomTable>>;

    async fn delete_custom_table(
        &mut self,
        id: &Id<CustomTable>,
    ) -> Result<WithId<CustomTable>>;
}

#[async_trait]
pub trait QuickLinksRepo {
    /// The stored quick links, if they were ever saved.
    async fn quick_links(&mut self) -> Result<Option<QuickLinks>>;

    async fn put_quick_links(&mut self, links: QuickLinks) -> Result<QuickLinks>;
}

pub trait DatabaseOperations: RowRepo + CustomTableRepo + QuickLinksRepo {}

#[async_trait]
pub trait DatabaseTransaction: DatabaseOperations {
    async fn commit(self) -> Result<()>;
}

pub trait DatabaseAutocommit: DatabaseOperations {}

/// A store for rows, custom tables and quick links.
/// multiple concurrent accesses should be possible by e.g. cloning the database object.
#[async_trait]
pub trait Database: Clone + Send + Sync + Sized {
    type Transaction: DatabaseTransaction + Send;
    type Autocommit: DatabaseAutocommit + Send;

    async fn transaction(&self) -> Result<Self::Transaction>;

    fn auto(&self) -> Self::Autocommit;
}
