use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on},
    Extension, Json, Router,
};
use model::quick_links::QuickLinks;
use storage::database::Database;

use crate::{
    common::{route_not_found, schema, HateoasResult, RouteErrorResponse, METHOD_FILTER_ALL},
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/quick-links{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .route("/schema", get(schema::<QuickLinks>))
        .route("/", get(get_quick_links::<D>).put(put_quick_links::<D>))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_quick_links<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<QuickLinks> {
    client
        .get_quick_links()
        .await
        .map(|links| quick_links_hateoas(links, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn put_quick_links<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(links): Json<QuickLinks>,
) -> HateoasResult<QuickLinks> {
    client
        .put_quick_links(links)
        .await
        .map(|links| quick_links_hateoas(links, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::PUT)
                .with_uri(original_uri.path())
        })
}

fn quick_links_hateoas(
    links: QuickLinks,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<QuickLinks> {
    // relative links point into the frontend
    let resolve = |url: &str| {
        if url.starts_with('/') {
            base_url.full_url(url)
        } else {
            url.to_owned()
        }
    };
    let share = resolve(&links.share_url);
    let custom = resolve(&links.custom_url);
    hateoas::Response::builder(links, base_url)
        .link("self", resource!(""))
        .link_extern("share", share)
        .link_extern("custom", custom)
        .build()
}
