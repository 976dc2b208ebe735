use axum::{
    extract::Query,
    routing::{get, on},
    Json, Router,
};
use model::quick_links::ViewerSession;
use schemars::JsonSchema;
use serde::Serialize;

use crate::common::{route_not_found, schema_no_example, METHOD_FILTER_ALL};

/// How long the loading screen stays up for a viewer, and the session
/// state to keep once loading finished.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct LoadingDto {
    loading_delay_ms: u64,
    session: ViewerSession,
}

pub(crate) fn routes() -> Router {
    Router::new()
        .route("/loading/schema", get(schema_no_example::<LoadingDto>))
        .route("/loading", get(loading))
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn loading(Query(session): Query<ViewerSession>) -> Json<LoadingDto> {
    Json(LoadingDto {
        loading_delay_ms: session.loading_delay().as_millis() as u64,
        session: session.loaded(),
    })
}
