use async_trait::async_trait;
use model::{
    row::{DeliveryAlt, Row},
    WithId,
};
use sqlx::prelude::FromRow;
use storage::database::{Result, RowRepo};
use utility::id::Id;

use crate::queries::row::{delete, get, get_all, get_by_ids, put};
use crate::{PgDatabaseAutocommit, PgDatabaseTransaction};

use super::DatabaseRow;

#[derive(Debug, Clone, FromRow)]
pub struct RowRow {
    pub id: String,
    pub route: String,
    pub code: String,
    pub location: String,
    pub delivery: String,
    pub delivery_alt: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub info: String,
    pub active: bool,
    pub marker_color: Option<String>,
    pub qr_code: Option<String>,
}

impl DatabaseRow for RowRow {
    type Model = Row;

    fn get_id(&self) -> Id<Self::Model> {
        Id::new(self.id.clone())
    }

    fn to_model(self) -> Self::Model {
        let delivery_alt = self.delivery_alt.parse().unwrap_or_else(|why| {
            log::warn!("row {}: {}, treating it as normal", self.id, why);
            DeliveryAlt::Normal
        });
        Row {
            route: self.route,
            code: self.code,
            location: self.location,
            delivery: self.delivery,
            delivery_alt,
            latitude: self.latitude,
            longitude: self.longitude,
            info: self.info,
            active: self.active,
            marker_color: self.marker_color,
            qr_code: self.qr_code,
        }
    }

    fn from_model(row: WithId<Row>) -> Self {
        Self {
            id: row.id.raw(),
            route: row.content.route,
            code: row.content.code,
            location: row.content.location,
            delivery: row.content.delivery,
            delivery_alt: row.content.delivery_alt.as_str().to_owned(),
            latitude: row.content.latitude,
            longitude: row.content.longitude,
            info: row.content.info,
            active: row.content.active,
            marker_color: row.content.marker_color,
            qr_code: row.content.qr_code,
        }
    }
}

#[async_trait]
impl RowRepo for PgDatabaseAutocommit {
    async fn rows(&mut self) -> Result<Vec<WithId<Row>>> {
        get_all(&self.pool).await
    }

    async fn row(&mut self, id: &Id<Row>) -> Result<WithId<Row>> {
        get(&self.pool, id).await
    }

    async fn rows_by_ids(&mut self, ids: &[Id<Row>]) -> Result<Vec<WithId<Row>>> {
        get_by_ids(&self.pool, ids).await
    }

    async fn put_row(&mut self, row: WithId<Row>) -> Result<WithId<Row>> {
        put(&self.pool, row).await
    }

    async fn delete_row(&mut self, id: &Id<Row>) -> Result<WithId<Row>> {
        delete(&self.pool, id).await
    }
}

#[async_trait]
impl<'a> RowRepo for PgDatabaseTransaction<'a> {
    async fn rows(&mut self) -> Result<Vec<WithId<Row>>> {
        get_all(&mut *self.tx).await
    }

    async fn row(&mut self, id: &Id<Row>) -> Result<WithId<Row>> {
        get(&mut *self.tx, id).await
    }

    async fn rows_by_ids(&mut self, ids: &[Id<Row>]) -> Result<Vec<WithId<Row>>> {
        get_by_ids(&mut *self.tx, ids).await
    }

    async fn put_row(&mut self, row: WithId<Row>) -> Result<WithId<Row>> {
        put(&mut *self.tx, row).await
    }

    async fn delete_row(&mut self, id: &Id<Row>) -> Result<WithId<Row>> {
        delete(&mut *self.tx, id).await
    }
}
