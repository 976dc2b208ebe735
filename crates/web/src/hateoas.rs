//! Response envelope: the content, flattened, plus `links` to related
//! resources and actions and optional `debugInfo`.

use std::{collections::BTreeMap, sync::Arc};

use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::middleware::base_url::BaseUrl;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Link {
    #[serde(rename = "rel")]
    pub relation: String,

    #[serde(rename = "href")]
    pub hypertext_reference: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub debug_info: BTreeMap<String, Value>,
    pub links: Vec<Link>,
}

impl<T> Response<T> {
    pub fn new(content: T) -> Self {
        Self {
            content,
            debug_info: BTreeMap::new(),
            links: vec![],
        }
    }

    pub fn builder(content: T, base_url: Arc<BaseUrl>) -> ResponseBuilder<T> {
        ResponseBuilder {
            response: Response::new(content),
            base_url,
        }
    }

    pub fn json(self) -> Json<Self> {
        Json(self)
    }
}

pub struct ResponseBuilder<T> {
    response: Response<T>,
    base_url: Arc<BaseUrl>,
}

impl<T> ResponseBuilder<T> {
    pub fn debug_info<V: Serialize>(mut self, key: impl Into<String>, value: V) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.response.debug_info.insert(key.into(), value);
            }
            Err(why) => log::warn!("dropping unserializable debug info: {}", why),
        }
        self
    }

    /// Link to a path on this server.
    pub fn link(self, relation: impl Into<String>, path: impl Into<String>) -> Self {
        let url = self.base_url.full_url(path);
        self.link_extern(relation, url)
    }

    /// Link to an absolute url.
    pub fn link_extern(
        mut self,
        relation: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        self.response.links.push(Link {
            relation: relation.into(),
            hypertext_reference: url.into(),
        });
        self
    }

    pub fn link_extern_option(
        self,
        relation: impl Into<String>,
        url: Option<impl Into<String>>,
    ) -> Self {
        match url {
            Some(url) => self.link_extern(relation, url),
            None => self,
        }
    }

    pub fn build(self) -> Response<T> {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use serde_json::json;

    use super::*;

    fn base_url() -> Arc<BaseUrl> {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("delivery.test"));
        Arc::new(BaseUrl::from_headers(&headers))
    }

    #[test]
    fn envelope() {
        let response = Response::builder(json!({"name": "North"}), base_url())
            .link("self", "/api/v1/custom-tables/1")
            .link_extern_option("waze", None::<String>)
            .link_extern("checklist", "https://example.com/M0001")
            .build();
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({
                "name": "North",
                "links": [
                    {"rel": "self", "href": "http://delivery.test/api/v1/custom-tables/1"},
                    {"rel": "checklist", "href": "https://example.com/M0001"}
                ]
            })
        );
    }

    #[test]
    fn debug_info_is_listed_when_set() {
        let response = Response::builder(json!({}), base_url())
            .debug_info("filtersActive", true)
            .build();
        assert_eq!(serde_json::to_value(response).unwrap()["debugInfo"]["filtersActive"], true);
    }
}
