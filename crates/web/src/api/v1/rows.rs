use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::Method,
    routing::{get, on},
    Extension, Json, Router,
};
use model::{
    links::{checklist_url, google_maps_directions, normalize_url, waze_navigation},
    row::{Row, RowUpdate},
    view::TableView,
    WithId,
};
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

use super::ViewParams;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/rows{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .route("/schema", get(schema::<Row>))
        .route("/view/schema", get(schema_no_example::<TableView>))
        .route("/view", get(get_row_view::<D>))
        .route("/selection", get(get_row_selection::<D>))
        .route(
            "/:id",
            get(get_row::<D>).put(update_row::<D>).delete(delete_row::<D>),
        )
        .route("/", get(get_rows::<D>).post(create_row::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_rows<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Row>>>> {
    client
        .get_rows()
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

async fn get_row<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Row>> {
    client
        .get_row(&Id::new(id))
        .await
        .map(|row| row_hateoas(row, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn create_row<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(row): Json<Row>,
) -> HateoasResult<WithId<Row>> {
    client
        .create_row(row)
        .await
        .map(|row| row_hateoas(row, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::POST)
                .with_uri(original_uri.path())
        })
}

async fn update_row<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(update): Json<RowUpdate>,
) -> HateoasResult<WithId<Row>> {
    client
        .update_row(&Id::new(id), update)
        .await
        .map(|row| row_hateoas(row, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::PUT)
                .with_uri(original_uri.path())
        })
}

async fn delete_row<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<String>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Row>> {
    client
        .delete_row(&Id::new(id))
        .await
        .map(|row| row_hateoas(row, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}

async fn get_row_view<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Query(params): Query<ViewParams>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<TableView> {
    let query = params.query();
    client
        .row_view(&query, params.today())
        .await
        .map(|view| {
            hateoas::Response::builder(view, base_url)
                .link("self", resource!("/view"))
                .link("selection", resource!("/selection"))
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

async fn get_row_selection<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    Query(params): Query<ViewParams>,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Row>>>> {
    client
        .row_selection(&params.query())
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

/// A row with its own link, the navigation and checklist actions and the
/// url stored in its info.
pub(crate) fn row_hateoas(
    row: WithId<Row>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Row>> {
    let directions = google_maps_directions(&row.content);
    let waze = waze_navigation(&row.content);
    let checklist = checklist_url(&row.content.code);
    let website = Some(row.content.info_parts().url)
        .filter(|url| !url.trim().is_empty())
        .map(|url| normalize_url(&url));
    let id = row.id.raw();
    hateoas::Response::builder(row, base_url)
        .link("self", resource!("/{}", id))
        .link_extern_option("directions", directions)
        .link_extern_option("waze", waze)
        .link_extern("checklist", checklist)
        .link_extern_option("website", website)
        .build()
}
