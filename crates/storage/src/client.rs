use std::collections::HashMap;

use chrono::{Utc, Weekday};
use model::{
    custom_table::{CustomTable, NewCustomTable},
    ordering::OrderingPolicy,
    quick_links::QuickLinks,
    row::{Row, RowUpdate},
    view::{custom_table_view, selection_view, table_view, RowQuery, TableView},
    WithId,
};
use utility::{id::Id, let_also::LetAlso};

use crate::{
    database::{
        CustomTableRepo, Database, DatabaseTransaction, QuickLinksRepo, RowRepo,
    },
    not_found_to_none, RequestError, RequestResult,
};

/// Attempts at drawing a share token that no other table uses.
const SHARE_TOKEN_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct Client<D>
where
    D: Database,
{
    pub database: D,
    policy: OrderingPolicy,
}

impl<D> Client<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self::with_policy(database, OrderingPolicy::default())
    }

    pub fn with_policy(database: D, policy: OrderingPolicy) -> Self {
        Self { database, policy }
    }

    pub fn policy(&self) -> &OrderingPolicy {
        &self.policy
    }
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_rows(&self) -> RequestResult<Vec<WithId<Row>>> {
        Ok(self.database.auto().rows().await?)
    }

    pub async fn get_row(&self, id: &Id<Row>) -> RequestResult<WithId<Row>> {
        Ok(self.database.auto().row(id).await?)
    }

    pub async fn create_row(&self, row: Row) -> RequestResult<WithId<Row>> {
        let row = self
            .database
            .auto()
            .put_row(WithId::new(Id::random(), row))
            .await?;
        log::info!("created row {} ({})", row.id, row.content.location);
        Ok(row)
    }

    pub async fn update_row(
        &self,
        id: &Id<Row>,
        update: RowUpdate,
    ) -> RequestResult<WithId<Row>> {
        let mut tx = self.database.transaction().await?;
        let current = tx.row(id).await?;
        let result = tx
            .put_row(WithId::new(current.id, update.apply(current.content)))
            .await?;
        tx.commit().await?;
        log::info!("updated row {}", result.id);
        Ok(result)
    }

    pub async fn delete_row(&self, id: &Id<Row>) -> RequestResult<WithId<Row>> {
        let row = self.database.auto().delete_row(id).await?;
        log::info!("deleted row {}", row.id);
        Ok(row)
    }

    /// The main table for `today`.
    pub async fn row_view(
        &self,
        query: &RowQuery,
        today: Weekday,
    ) -> RequestResult<TableView> {
        self.get_rows()
            .await?
            .let_ref(|rows| table_view(rows, query, today, &self.policy))
            .let_owned(Ok)
    }

    /// Rows to choose from when building a custom table.
    pub async fn row_selection(
        &self,
        query: &RowQuery,
    ) -> RequestResult<Vec<WithId<Row>>> {
        self.get_rows()
            .await?
            .let_ref(|rows| selection_view(rows, query))
            .let_owned(Ok)
    }
}

/// Resolves membership ids in membership order. Ids of deleted rows are
/// skipped.
fn resolve_members(
    table_id: &Id<CustomTable>,
    row_ids: &[Id<Row>],
    found: Vec<WithId<Row>>,
) -> Vec<WithId<Row>> {
    let mut found = found
        .into_iter()
        .map(|row| (row.id.raw(), row))
        .collect::<HashMap<_, _>>();
    row_ids
        .iter()
        .filter_map(|id| {
            let row = found.remove(id.raw_ref::<str>());
            if row.is_none() {
                log::warn!(
                    "custom table {} refers to missing row {}",
                    table_id,
                    id
                );
            }
            row
        })
        .collect()
}

impl<D> Client<D>
where
    D: Database,
{
    pub async fn get_custom_tables(&self) -> RequestResult<Vec<WithId<CustomTable>>> {
        Ok(self.database.auto().custom_tables().await?)
    }

    pub async fn get_custom_table(
        &self,
        id: &Id<CustomTable>,
    ) -> RequestResult<WithId<CustomTable>> {
        Ok(self.database.auto().custom_table(id).await?)
    }

    pub async fn get_custom_table_by_share_id(
        &self,
        share_id: &str,
    ) -> RequestResult<WithId<CustomTable>> {
        Ok(self
            .database
            .auto()
            .custom_table_by_share_id(share_id)
            .await?)
    }

    pub async fn create_custom_table(
        &self,
        input: NewCustomTable,
    ) -> RequestResult<WithId<CustomTable>> {
        let mut table = CustomTable::create(input, Utc::now())?;

        let mut tx = self.database.transaction().await?;
        for _ in 0..SHARE_TOKEN_ATTEMPTS {
            let taken = not_found_to_none(
                tx.custom_table_by_share_id(&table.share_id)
                    .await
                    .map_err(RequestError::from),
            )?;
            if taken.is_none() {
                let result = tx.put_custom_table(WithId::new(Id::random(), table)).await?;
                tx.commit().await?;
                log::info!(
                    "created custom table {} '{}' shared as {}",
                    result.id,
                    result.content.name,
                    result.content.share_id
                );
                return Ok(result);
            }
            table.share_id = utility::token::share_token();
        }
        Err(RequestError::other(ShareTokensExhausted))
    }

    /// Replaces name, description and membership of a table.
    pub async fn replace_custom_table(
        &self,
        id: &Id<CustomTable>,
        input: NewCustomTable,
    ) -> RequestResult<WithId<CustomTable>> {
        let mut tx = self.database.transaction().await?;
        let mut table = tx.custom_table(id).await?;
        table.content.update(input)?;
        let result = tx.put_custom_table(table).await?;
        tx.commit().await?;
        log::info!(
            "updated custom table {} with {} rows",
            result.id,
            result.content.row_ids.len()
        );
        Ok(result)
    }

    pub async fn delete_custom_table(
        &self,
        id: &Id<CustomTable>,
    ) -> RequestResult<WithId<CustomTable>> {
        let table = self.database.auto().delete_custom_table(id).await?;
        log::info!("deleted custom table {}", table.id);
        Ok(table)
    }

    /// Member rows of a table in membership order.
    pub async fn get_custom_table_rows(
        &self,
        id: &Id<CustomTable>,
    ) -> RequestResult<Vec<WithId<Row>>> {
        let mut auto = self.database.auto();
        let table = auto.custom_table(id).await?;
        let found = auto.rows_by_ids(&table.content.row_ids).await?;
        Ok(resolve_members(&table.id, &table.content.row_ids, found))
    }

    /// The composed view behind a share link.
    pub async fn share_view(
        &self,
        share_id: &str,
        query: &RowQuery,
        today: Weekday,
        temp_order: Option<&[Id<Row>]>,
    ) -> RequestResult<(WithId<CustomTable>, TableView)> {
        let mut auto = self.database.auto();
        let table = auto.custom_table_by_share_id(share_id).await?;
        let all_rows = auto.rows().await?;
        let members = all_rows
            .iter()
            .filter(|row| table.content.row_ids.contains(&row.id))
            .cloned()
            .collect::<Vec<_>>();
        let members = resolve_members(&table.id, &table.content.row_ids, members);
        let view = custom_table_view(
            &all_rows,
            members,
            query,
            today,
            &self.policy,
            temp_order,
        );
        Ok((table, view))
    }
}

impl<D> Client<D>
where
    D: Database,
{
    /// The stored quick links, or the defaults if they were never saved.
    pub async fn get_quick_links(&self) -> RequestResult<QuickLinks> {
        Ok(self
            .database
            .auto()
            .quick_links()
            .await?
            .unwrap_or_default())
    }

    pub async fn put_quick_links(&self, links: QuickLinks) -> RequestResult<QuickLinks> {
        let links = self.database.auto().put_quick_links(links.validate()?).await?;
        log::info!(
            "quick links set to {} and {}",
            links.share_url,
            links.custom_url
        );
        Ok(links)
    }
}

#[derive(Debug)]
struct ShareTokensExhausted;

impl std::fmt::Display for ShareTokensExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not draw an unused share token")
    }
}

impl std::error::Error for ShareTokensExhausted {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDatabase;
    use model::{
        distance::Kilometer, error::ValidationError, row::ORIGIN_LOCATION, ExampleData,
    };

    fn client() -> Client<MemoryDatabase> {
        Client::new(MemoryDatabase::new())
    }

    fn located(code: &str, location: &str, latitude: f64, longitude: f64) -> Row {
        Row {
            code: code.to_owned(),
            location: location.to_owned(),
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
            ..Row::example_data()
        }
    }

    #[tokio::test]
    async fn row_lifecycle() {
        let client = client();
        let created = client.create_row(Row::example_data()).await.unwrap();
        assert_eq!(created.id.raw().len(), 36);

        let updated = client
            .update_row(
                &created.id,
                RowUpdate {
                    location: Some("Menara Dua".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content.location, "Menara Dua");
        assert_eq!(client.get_row(&created.id).await.unwrap(), updated);

        client.delete_row(&created.id).await.unwrap();
        assert!(matches!(
            client.get_row(&created.id).await,
            Err(RequestError::NotFound)
        ));
        assert!(matches!(
            client
                .update_row(&created.id, RowUpdate::default())
                .await,
            Err(RequestError::NotFound)
        ));
    }

    #[tokio::test]
    async fn custom_table_validation() {
        let client = client();
        let result = client
            .create_custom_table(NewCustomTable {
                name: " ".to_owned(),
                ..NewCustomTable::example_data()
            })
            .await;
        assert!(matches!(
            result,
            Err(RequestError::Invalid(ValidationError::EmptyName))
        ));
        assert!(client.get_custom_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn membership_skips_deleted_rows() {
        let client = client();
        let a = client.create_row(located("1", "A", 0.0, 1.0)).await.unwrap();
        let b = client.create_row(located("2", "B", 0.0, 2.0)).await.unwrap();
        let table = client
            .create_custom_table(NewCustomTable {
                name: "North".to_owned(),
                description: None,
                row_ids: vec![b.id.clone(), a.id.clone()],
            })
            .await
            .unwrap();

        let members = client.get_custom_table_rows(&table.id).await.unwrap();
        assert_eq!(members, vec![b.clone(), a.clone()]);

        client.delete_row(&b.id).await.unwrap();
        let members = client.get_custom_table_rows(&table.id).await.unwrap();
        assert_eq!(members, vec![a]);
        assert_eq!(
            client
                .get_custom_table(&table.id)
                .await
                .unwrap()
                .content
                .row_ids
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn share_view_includes_origin() {
        let client = client();
        client
            .create_row(located("0", ORIGIN_LOCATION, 0.0, 0.0))
            .await
            .unwrap();
        let a = client.create_row(located("1", "A", 0.0, 1.0)).await.unwrap();
        let table = client
            .create_custom_table(NewCustomTable {
                name: "North".to_owned(),
                description: None,
                row_ids: vec![a.id.clone()],
            })
            .await
            .unwrap();

        let (found, view) = client
            .share_view(
                &table.content.share_id,
                &RowQuery::default(),
                Weekday::Mon,
                None,
            )
            .await
            .unwrap();
        assert_eq!(found.id, table.id);
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows[0].row.content.is_origin());
        assert_eq!(view.rows[0].kilometer, Kilometer::Distance(0.0));
        assert!(view.rows[1].kilometer.value().unwrap() > 100.0);

        assert!(matches!(
            client
                .share_view("nope00", &RowQuery::default(), Weekday::Mon, None)
                .await,
            Err(RequestError::NotFound)
        ));
    }

    #[tokio::test]
    async fn replace_keeps_share_id() {
        let client = client();
        let table = client
            .create_custom_table(NewCustomTable::example_data())
            .await
            .unwrap();
        let replaced = client
            .replace_custom_table(
                &table.id,
                NewCustomTable {
                    name: "South".to_owned(),
                    description: Some("new".to_owned()),
                    row_ids: vec![Id::new("x".to_owned())],
                },
            )
            .await
            .unwrap();
        assert_eq!(replaced.content.share_id, table.content.share_id);
        assert_eq!(replaced.content.name, "South");

        client.delete_custom_table(&table.id).await.unwrap();
        assert!(client.get_custom_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn quick_links_default_and_validate() {
        let client = client();
        assert_eq!(client.get_quick_links().await.unwrap(), QuickLinks::default());

        let saved = client
            .put_quick_links(QuickLinks {
                share_url: " https://example.com/share/x ".to_owned(),
                custom_url: "/custom/y".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(saved.share_url, "https://example.com/share/x");
        assert_eq!(client.get_quick_links().await.unwrap(), saved);

        assert!(matches!(
            client
                .put_quick_links(QuickLinks {
                    share_url: String::new(),
                    custom_url: "/custom/y".to_owned(),
                })
                .await,
            Err(RequestError::Invalid(_))
        ));
        assert_eq!(client.get_quick_links().await.unwrap(), saved);
    }

    #[tokio::test]
    async fn row_view_orders_for_the_day() {
        let client = client();
        client
            .create_row(Row {
                delivery_alt: model::row::DeliveryAlt::Alt2,
                ..located("1", "A", 0.0, 1.0)
            })
            .await
            .unwrap();
        client
            .create_row(Row {
                delivery_alt: model::row::DeliveryAlt::Alt1,
                ..located("2", "B", 0.0, 2.0)
            })
            .await
            .unwrap();

        let monday = client.row_view(&RowQuery::default(), Weekday::Mon).await.unwrap();
        let codes = |view: &TableView| {
            view.rows
                .iter()
                .map(|row| row.row.content.code.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(codes(&monday), vec!["2", "1"]);
        let tuesday = client.row_view(&RowQuery::default(), Weekday::Tue).await.unwrap();
        assert_eq!(codes(&tuesday), vec!["1", "2"]);

        let selection = client.row_selection(&RowQuery::default()).await.unwrap();
        assert_eq!(selection.len(), 2);
    }
}
