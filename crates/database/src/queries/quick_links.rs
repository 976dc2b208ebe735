use model::quick_links::QuickLinks;
use sqlx::{Executor, Postgres};
use storage::database::Result;

use crate::data_model::quick_links::QuickLinksRow;

use super::convert_error;

pub async fn get<'c, E>(executor: E) -> Result<Option<QuickLinks>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as("SELECT share_url, custom_url FROM quick_links WHERE id;")
        .fetch_optional(executor)
        .await
        .map(|row: Option<QuickLinksRow>| row.map(QuickLinksRow::to_model))
        .map_err(|why| convert_error(why))
}

pub async fn put<'c, E>(executor: E, links: QuickLinks) -> Result<QuickLinks>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        INSERT INTO quick_links(id, share_url, custom_url)
        VALUES (TRUE, $1, $2)
        ON CONFLICT (id)
        DO UPDATE SET
            share_url = EXCLUDED.share_url,
            custom_url = EXCLUDED.custom_url
        RETURNING share_url, custom_url;
        ",
    )
    .bind(links.share_url)
    .bind(links.custom_url)
    .fetch_one(executor)
    .await
    .map(QuickLinksRow::to_model)
    .map_err(|why| convert_error(why))
}
