use axum::{
    routing::{get, on},
    Router,
};
use chrono::{Datelike, Local, Weekday};
use itertools::Itertools;
use model::{row::Row, view::RowQuery};
use serde::Deserialize;
use storage::database::Database;
use utility::{id::Id, serde::weekday};

use crate::{
    common::{route_not_found, route_not_implemented, METHOD_FILTER_ALL},
    middleware::base_url::base_url_middleware,
    WebState,
};

mod custom_tables;
mod info;
mod quick_links;
mod rows;
mod session;

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::resource!("/v1{}", format_args!($($arg)*))
    };
}
pub(crate) use resource;

pub(crate) fn routes<D>(state: WebState<D>) -> Router
where
    D: Database + 'static,
{
    Router::new()
        .route("/", get(route_not_implemented))
        .nest_service("/rows", rows::routes(state.clone()))
        .nest_service("/custom-tables", custom_tables::routes(state.clone()))
        .nest_service("/quick-links", quick_links::routes(state.clone()))
        .nest_service("/info", info::routes())
        .nest_service("/session", session::routes())
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

/// Query parameters of the table views. List parameters are comma
/// separated, `day` counts from `0` for sunday.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ViewParams {
    search: Option<String>,
    route: Option<String>,
    hide: Option<String>,
    order: Option<String>,
    preview: bool,
    #[serde(deserialize_with = "weekday::deserialize_option")]
    day: Option<Weekday>,
}

/// Trimmed comma separated values, without blanks and repeats.
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .unique()
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

impl ViewParams {
    pub(crate) fn query(&self) -> RowQuery {
        RowQuery {
            search: self.search.clone().unwrap_or_default(),
            routes: split_list(self.route.as_deref()),
            hidden_deliveries: split_list(self.hide.as_deref()),
        }
    }

    pub(crate) fn preview(&self) -> bool {
        self.preview
    }

    pub(crate) fn today(&self) -> Weekday {
        self.day.unwrap_or_else(|| Local::now().weekday())
    }

    pub(crate) fn temp_order(&self) -> Vec<Id<Row>> {
        split_list(self.order.as_deref())
            .into_iter()
            .map(Id::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_comma_separated() {
        assert_eq!(split_list(Some("A, B,,C ,A")), vec!["A", "B", "C"]);
        assert!(split_list(Some("")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn params_to_query() {
        let params = ViewParams {
            search: Some("tower".to_owned()),
            route: Some("KL1,KL2".to_owned()),
            hide: Some("Daily".to_owned()),
            day: Some(Weekday::Tue),
            ..Default::default()
        };
        let query = params.query();
        assert_eq!(query.search, "tower");
        assert_eq!(query.routes, vec!["KL1", "KL2"]);
        assert_eq!(query.hidden_deliveries, vec!["Daily"]);
        assert_eq!(params.today(), Weekday::Tue);
    }
}
