use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::Method,
    routing::{get, on},
    Extension, Json, Router,
};
use model::{
    custom_table::{CustomTable, NewCustomTable},
    links::share_path,
    row::Row,
    view::TableView,
    WithId,
};
use schemars::JsonSchema;
use serde::Serialize;
use storage::database::Database;
use utility::{id::Id, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema, schema_no_example, HateoasResult, RouteErrorResponse,
        VecResponse, METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

use super::{rows::row_hateoas, ViewParams};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/custom-tables{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .route("/schema", get(schema::<CustomTable>))
        .route("/share/view/schema", get(schema_no_example::<ShareViewDto>))
        .route("/share/:share_id/view", get(get_share_view::<D>))
        .route("/share/:share_id", get(get_custom_table_by_share_id::<D>))
        .route(
            "/:id/rows",
            get(get_custom_table_rows::<D>).put(replace_custom_table::<D>),
        )
        .route(
            "/:id",
            get(get_custom_table::<D>).delete(delete_custom_table::<D>),
        )
        .route("/", get(get_custom_tables::<D>).post(create_custom_table::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// A shared table together with its composed view.
#[derive(Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ShareViewDto {
    table: hateoas::Response<WithId<CustomTable>>,
    preview: bool,
    #[serde(flatten)]
    view: TableView,
}

async fn get_custom_tables<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<CustomTable>>>> {
    client
        .get_custom_tables()
        .await
        .map(|tables| {
            tables
                .into_iter()
                .map(|table| custom_table_hateoas(table, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_custom_table<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<CustomTable>> {
    client
        .get_custom_table(&Id::new(id))
        .await
        .map(|table| custom_table_hateoas(table, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_custom_table_by_share_id<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(share_id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<CustomTable>> {
    client
        .get_custom_table_by_share_id(&share_id)
        .await
        .map(|table| custom_table_hateoas(table, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn create_custom_table<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(input): Json<NewCustomTable>,
) -> HateoasResult<WithId<CustomTable>> {
    client
        .create_custom_table(input)
        .await
        .map(|table| custom_table_hateoas(table, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn replace_custom_table<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(input): Json<NewCustomTable>,
) -> HateoasResult<WithId<CustomTable>> {
    client
        .replace_custom_table(&Id::new(id), input)
        .await
        .map(|table| custom_table_hateoas(table, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::PUT)
                .with_uri(original_uri.path())
        })
}

async fn delete_custom_table<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<CustomTable>> {
    client
        .delete_custom_table(&Id::new(id))
        .await
        .map(|table| custom_table_hateoas(table, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}

async fn get_custom_table_rows<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Row>>>> {
    client
        .get_custom_table_rows(&Id::new(id))
        .await
        .map(|rows| {
            rows.into_iter()
                .map(|row| row_hateoas(row, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

/// The view behind a share link. Without `preview` the table is shown as
/// stored: filters and temporary order only apply in preview mode.
async fn get_share_view<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(share_id): Path<String>,
    Query(params): Query<ViewParams>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<ShareViewDto> {
    let preview = params.preview();
    let query = if preview {
        params.query()
    } else {
        Default::default()
    };
    let temp_order = if preview { params.temp_order() } else { vec![] };

    client
        .share_view(&share_id, &query, params.today(), Some(temp_order.as_slice()))
        .await
        .map(|(table, view)| {
            let dto = ShareViewDto {
                table: custom_table_hateoas(table, base_url.clone()),
                preview,
                view,
            };
            hateoas::Response::builder(dto, base_url)
                .link("self", resource!("/share/{}/view", share_id))
                .debug_info("filtersActive", query.is_active())
                .build()
                .json()
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

pub(crate) fn custom_table_hateoas(
    table: WithId<CustomTable>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<CustomTable>> {
    let id = table.id.raw();
    let share_id = table.content.share_id.clone();
    hateoas::Response::builder(table, base_url)
        .link("self", resource!("/{}", id))
        .link("rows", resource!("/{}/rows", id))
        .link("view", resource!("/share/{}/view", share_id))
        .link("share", share_path(&share_id, false))
        .link("preview", share_path(&share_id, true))
        .build()
}
