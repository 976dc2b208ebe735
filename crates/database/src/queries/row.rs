use model::{row::Row, WithId};
use sqlx::{Executor, Postgres};
use storage::database::Result;
use utility::{
    id::{Id, IdWrapper},
    let_also::LetAlso,
};

use crate::data_model::{row::RowRow, with_id, with_ids, DatabaseRow};

use super::convert_error;

pub async fn get_all<'c, E>(executor: E) -> Result<Vec<WithId<Row>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, route, code, location, delivery, delivery_alt, latitude,
            longitude, info, active, marker_color, qr_code
        FROM table_rows
        ORDER BY seq ASC;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(|why| convert_error(why))?
    .let_owned(|rows: Vec<RowRow>| Ok(with_ids(rows)))
}

pub async fn get<'c, E>(executor: E, id: &Id<Row>) -> Result<WithId<Row>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, route, code, location, delivery, delivery_alt, latitude,
            longitude, info, active, marker_color, qr_code
        FROM table_rows
        WHERE id = $1;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|row: RowRow| with_id(row))
    .map_err(|why| convert_error(why))
}

pub async fn get_by_ids<'c, E>(executor: E, ids: &[Id<Row>]) -> Result<Vec<WithId<Row>>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        SELECT id, route, code, location, delivery, delivery_alt, latitude,
            longitude, info, active, marker_color, qr_code
        FROM table_rows
        WHERE id = ANY($1);
        ",
    )
    .bind(ids.raw())
    .fetch_all(executor)
    .await
    .map_err(|why| convert_error(why))?
    .let_owned(|rows: Vec<RowRow>| Ok(with_ids(rows)))
}

pub async fn put<'c, E>(executor: E, row: WithId<Row>) -> Result<WithId<Row>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row = RowRow::from_model(row);
    sqlx::query_as(
        "
        INSERT INTO table_rows(
            id,
            route,
            code,
            location,
            delivery,
            delivery_alt,
            latitude,
            longitude,
            info,
            active,
            marker_color,
            qr_code
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ON CONFLICT (id)
        DO UPDATE SET
            route = EXCLUDED.route,
            code = EXCLUDED.code,
            location = EXCLUDED.location,
            delivery = EXCLUDED.delivery,
            delivery_alt = EXCLUDED.delivery_alt,
            latitude = EXCLUDED.latitude,
            longitude = EXCLUDED.longitude,
            info = EXCLUDED.info,
            active = EXCLUDED.active,
            marker_color = EXCLUDED.marker_color,
            qr_code = EXCLUDED.qr_code
        RETURNING id, route, code, location, delivery, delivery_alt, latitude,
            longitude, info, active, marker_color, qr_code;
        ",
    )
    .bind(row.id)
    .bind(row.route)
    .bind(row.code)
    .bind(row.location)
    .bind(row.delivery)
    .bind(row.delivery_alt)
    .bind(row.latitude)
    .bind(row.longitude)
    .bind(row.info)
    .bind(row.active)
    .bind(row.marker_color)
    .bind(row.qr_code)
    .fetch_one(executor)
    .await
    .map(|row: RowRow| with_id(row))
    .map_err(|why| convert_error(why))
}

pub async fn delete<'c, E>(executor: E, id: &Id<Row>) -> Result<WithId<Row>>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query_as(
        "
        DELETE FROM table_rows
        WHERE id = $1
        RETURNING id, route, code, location, delivery, delivery_alt, latitude,
            longitude, info, active, marker_color, qr_code;
        ",
    )
    .bind(id.raw())
    .fetch_one(executor)
    .await
    .map(|row: RowRow| with_id(row))
    .map_err(|why| convert_error(why))
}
