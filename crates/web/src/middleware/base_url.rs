use std::sync::Arc;

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

/// Scheme, host and path prefix under which clients reach this server,
/// honoring the `x-forwarded-*` headers of a reverse proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let proto = header(headers, "x-forwarded-proto").unwrap_or("http");
        let host = header(headers, "x-forwarded-host")
            .or_else(|| header(headers, "host"))
            .unwrap_or("localhost");
        let prefix = header(headers, "x-forwarded-prefix")
            .unwrap_or("")
            .trim_end_matches('/');

        BaseUrl {
            proto: proto.to_owned(),
            host: host.to_owned(),
            prefix: prefix.to_owned(),
        }
    }

    /// Absolute url of a path on this server. `path` starts with `/`.
    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!("{}://{}{}{}", self.proto, self.host, self.prefix, path.into())
    }
}

pub async fn base_url_middleware(mut req: Request, next: Next) -> Response {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn plain_host() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("delivery.test:8080"));
        assert_eq!(
            BaseUrl::from_headers(&headers).full_url("/custom/ko58de"),
            "http://delivery.test:8080/custom/ko58de"
        );
    }

    #[test]
    fn behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("internal:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("routes.example.com"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/vending/"));
        assert_eq!(
            BaseUrl::from_headers(&headers).full_url("/api/v1/rows"),
            "https://routes.example.com/vending/api/v1/rows"
        );
    }

    #[test]
    fn no_headers() {
        assert_eq!(
            BaseUrl::from_headers(&HeaderMap::new()).full_url("/"),
            "http://localhost/"
        );
    }
}
