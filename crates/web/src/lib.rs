pub use crate::common::RouteResult;

use axum::Router;
use storage::{client::Client, database::Database};
use tokio::net::TcpListener;
use tower_http::services::{ServeDir, ServeFile};

pub mod api;
pub mod common;
pub mod config;
pub mod hateoas;
pub mod middleware;

use config::WebConfig;

#[derive(Debug, Clone)]
pub struct WebState<D>
where
    D: Database,
{
    pub client: Client<D>,
}

impl<D> WebState<D>
where
    D: Database,
{
    pub fn new(database: D) -> Self {
        Self {
            client: Client::new(database),
        }
    }
}

/// The api under `/api` and the static frontend for everything else.
pub fn app<D>(config: &WebConfig, state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .nest_service("/api", api::routes(state))
        .fallback_service(static_content_router(config))
}

pub async fn start_web_server<D>(config: WebConfig, state: WebState<D>) -> std::io::Result<()>
where
    D: Database + 'static,
{
    let routes = app(&config, state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    log::info!("listening on {}", config.bind_address);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

fn static_content_router(config: &WebConfig) -> Router {
    Router::new().fallback_service(
        ServeDir::new(&config.static_dir)
            .not_found_service(ServeFile::new(config.not_found_page())),
    )
}
