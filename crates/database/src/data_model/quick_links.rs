use async_trait::async_trait;
use model::quick_links::QuickLinks;
use sqlx::prelude::FromRow;
use storage::database::{QuickLinksRepo, Result};

use crate::queries::quick_links::{get, put};
use crate::{PgDatabaseAutocommit, PgDatabaseTransaction};

#[derive(Debug, Clone, FromRow)]
pub struct QuickLinksRow {
    pub share_url: String,
    pub custom_url: String,
}

impl QuickLinksRow {
    pub fn to_model(self) -> QuickLinks {
        QuickLinks {
            share_url: self.share_url,
            custom_url: self.custom_url,
        }
    }
}

#[async_trait]
impl QuickLinksRepo for PgDatabaseAutocommit {
    async fn quick_links(&mut self) -> Result<Option<QuickLinks>> {
        get(&self.pool).await
    }

    async fn put_quick_links(&mut self, links: QuickLinks) -> Result<QuickLinks> {
        put(&self.pool, links).await
    }
}

#[async_trait]
impl<'a> QuickLinksRepo for PgDatabaseTransaction<'a> {
    async fn quick_links(&mut self) -> Result<Option<QuickLinks>> {
        get(&mut *self.tx).await
    }

    async fn put_quick_links(&mut self, links: QuickLinks) -> Result<QuickLinks> {
        put(&mut *self.tx, links).await
    }
}
