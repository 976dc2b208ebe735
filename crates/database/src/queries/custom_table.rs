use model::{custom_table::CustomTable, WithId};
use sqlx::{Executor, PgConnection, Postgres};
use storage::database::Result;
use utility::{id::Id, let_also::LetAlso};

use crate::data_model::{custom_table::CustomTableRow, with_id, with_ids, DatabaseRow};

use super::convert_error;

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<CustomTable>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT t.id, t.name, t.description, t.created_at, t.share_id,
            COALESCE(
                ARRAY_AGG(m.row_id ORDER BY m.position)
                    FILTER (WHERE m.row_id IS NOT NULL),
                '{}'
            ) AS row_ids
        FROM custom_tables t
        LEFT JOIN custom_table_rows m ON m.table_id = t.id
        GROUP BY t.id
        ORDER BY t.created_at DESC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(|why| convert_error(why))?
    .let_owned(|tables: Vec<CustomTableRow>| Ok(with_ids(tables)))
}

pub async fn get<'c, E>(executor: E, id: &Id<CustomTable>) -> Result<WithId<CustomTable>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT t.id, t.name, t.description, t.created_at, t.share_id,
            COALESCE(
                ARRAY_AGG(m.row_id ORDER BY m.position)
                    FILTER (WHERE m.row_id IS NOT NULL),
                '{}'
            ) AS row_ids
        FROM custom_tables t
        LEFT JOIN custom_table_rows m ON m.table_id = t.id
        WHERE t.id = $1
        GROUP BY t.id;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|table: CustomTableRow| with_id(table))
    .map_err(|why| convert_error(why))
}

pub async fn get_by_share_id<'c, E>(
    executor: E,
    share_id: &str,
) -> Result<WithId<CustomTable>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT t.id, t.name, t.description, t.created_at, t.share_id,
            COALESCE(
                ARRAY_AGG(m.row_id ORDER BY m.position)
                    FILTER (WHERE m.row_id IS NOT NULL),
                '{}'
            ) AS row_ids
        FROM custom_tables t
        LEFT JOIN custom_table_rows m ON m.table_id = t.id
        WHERE t.share_id = $1
        GROUP BY t.id;
        ",
    )
    .bind(share_id)
    .fetch_one(executor)
    .await
    .map(|table: CustomTableRow| with_id(table))
    .map_err(|why| convert_error(why))
}

/// Upserts the table and replaces its membership. Runs several statements,
/// so it needs a connection inside a transaction.
pub async fn put(
    connection: &mut PgConnection,
    table: WithId<CustomTable>,
) -> Result<WithId<CustomTable>> {
    let row = CustomTableRow::from_model(table.clone());

    sqlx::query(
        "
        INSERT INTO custom_tables(
            id,
            name,
            description,
            created_at,
            share_id
        )
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id)
        DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            share_id = EXCLUDED.share_id;
        ",
    )
    .bind(&row.id)
    .bind(&row.name)
    .bind(&row.description)
    .bind(row.created_at)
    .bind(&row.share_id)
    .execute(&mut *connection)
    .await
    .map_err(|why| convert_error(why))?;

    sqlx::query("DELETE FROM custom_table_rows WHERE table_id = $1;")
        .bind(&row.id)
        .execute(&mut *connection)
        .await
        .map_err(|why| convert_error(why))?;

    sqlx::query(
        "
        INSERT INTO custom_table_rows(table_id, position, row_id)
        SELECT $1, member.position - 1, member.row_id
        FROM UNNEST($2::TEXT[]) WITH ORDINALITY AS member(row_id, position);
        ",
    )
    .bind(&row.id)
    .bind(&row.row_ids)
    .execute(&mut *connection)
    .await
    .map_err(|why| convert_error(why))?;

    Ok(table)
}

/// Deletes the table; its membership goes with it.
pub async fn delete(
    connection: &mut PgConnection,
    id: &Id<CustomTable>,
) -> Result<WithId<CustomTable>> {
    let table = get(&mut *connection, id).await?;
    sqlx::query("DELETE FROM custom_tables WHERE id = $1;")
        .bind(id.raw())
        .execute(&mut *connection)
        .await
        .map_err(|why| convert_error(why))?;
    Ok(table)
}
