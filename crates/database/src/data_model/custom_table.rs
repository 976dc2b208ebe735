use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{custom_table::CustomTable, WithId};
use sqlx::prelude::FromRow;
use storage::database::{CustomTableRepo, Result};
use utility::id::{Id, IdWrapper};

use crate::queries::{
    convert_error,
    custom_table::{delete, get, get_all, get_by_share_id, put},
};
use crate::{PgDatabaseAutocommit, PgDatabaseTransaction};

use super::DatabaseRow;

/// A custom table joined with its ordered membership.
#[derive(Debug, Clone, FromRow)]
pub struct CustomTableRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub share_id: String,
    pub row_ids: Vec<String>,
}

impl DatabaseRow for CustomTableRow {
    type Model = CustomTable;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id.clone())
    }

    fn to_model(self) -> Self::Model {
        CustomTable {
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            row_ids: self.row_ids.into_iter().map(Id::new).collect(),
            share_id: self.share_id,
        }
    }

    fn from_model(table: WithId<CustomTable>) -> Self {
        Self {
            id: table.id.raw(),
            name: table.content.name,
            description: table.content.description,
            created_at: table.content.created_at,
            share_id: table.content.share_id,
            row_ids: table.content.row_ids.raw(),
        }
    }
}

#[async_trait]
impl CustomTableRepo for PgDatabaseAutocommit {
    async fn custom_tables(&mut self) -> Result<Vec<WithId<CustomTable>>> {
        get_all(&self.pool).await
    }

    async fn custom_table(&mut self, id: &Id<CustomTable>) -> Result<WithId<CustomTable>> {
        get(&self.pool, id).await
    }

    async fn custom_table_by_share_id(
        &mut self,
        share_id: &str,
    ) -> Result<WithId<CustomTable>> {
        get_by_share_id(&self.pool, share_id).await
    }

    async fn put_custom_table(
        &mut self,
        table: WithId<CustomTable>,
    ) -> Result<WithId<CustomTable>> {
        let mut tx = self.pool.begin().await.map_err(convert_error)?;
        let result = put(&mut tx, table).await?;
        tx.commit().await.map_err(convert_error)?;
        Ok(result)
    }

    async fn delete_custom_table(
        &mut self,
        id: &Id<CustomTable>,
    ) -> Result<WithId<CustomTable>> {
        let mut tx = self.pool.begin().await.map_err(convert_error)?;
        let result = delete(&mut tx, id).await?;
        tx.commit().await.map_err(convert_error)?;
        Ok(result)
    }
}

#[async_trait]
impl<'a> CustomTableRepo for PgDatabaseTransaction<'a> {
    async fn custom_tables(&mut self) -> Result<Vec<WithId<CustomTable>>> {
        get_all(&mut *self.tx).await
    }

    async fn custom_table(&mut self, id: &Id<CustomTable>) -> Result<WithId<CustomTable>> {
        get(&mut *self.tx, id).await
    }

    async fn custom_table_by_share_id(
        &mut self,
        share_id: &str,
    ) -> Result<WithId<CustomTable>> {
        get_by_share_id(&mut *self.tx, share_id).await
    }

    async fn put_custom_table(
        &mut self,
        table: WithId<CustomTable>,
    ) -> Result<WithId<CustomTable>> {
        put(&mut self.tx, table).await
    }

    async fn delete_custom_table(
        &mut self,
        id: &Id<CustomTable>,
    ) -> Result<WithId<CustomTable>> {
        delete(&mut self.tx, id).await
    }
}
