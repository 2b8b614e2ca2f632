//! Remote resource catalog — URL composition and the HTTP client seam.
//!
//! [`CatalogClient`] is the only thing the controllers know about the
//! network.  [`HttpCatalog`] is the reqwest-backed implementation used by the
//! binary; tests substitute canned replies.

use std::future::Future;
use std::time::Duration;

use url::form_urlencoded;

use super::error::DialogError;
use super::form::FORM_CONTENT_TYPE;

/// Query parameter every search request carries.
const STREAM_PARAM: &str = "stream";
const STREAM_VALUE: &str = "data";

/// Status and body of a finished HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Read and write access to the catalog.
pub trait CatalogClient {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpReply, DialogError>> + Send;

    /// POST a form-urlencoded body.
    fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<HttpReply, DialogError>> + Send;
}

// ───────────────────────────────────────── urls ──────────────

/// `<base_url>&stream=data` — the `&` is appended as-is, the base URL is
/// expected to already carry a query string.
pub fn search_url(base_url: &str) -> String {
    let value: String = form_urlencoded::byte_serialize(STREAM_VALUE.as_bytes()).collect();
    format!("{base_url}&{STREAM_PARAM}={value}")
}

/// Compose the base URL a selector search runs against:
/// `<selector>?type=<type>&terms=<terms>`.
pub fn selector_query_url(selector: &str, resource_type: Option<&str>, terms: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(resource_type) = resource_type {
        query.append_pair("type", resource_type);
    }
    query.append_pair("terms", terms);
    let sep = if selector.contains('?') { '&' } else { '?' };
    format!("{selector}{sep}{}", query.finish())
}

// ───────────────────────────────────────── http ──────────────

/// reqwest-backed catalog client.  Cheap to clone; clones share the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
}

impl HttpCatalog {
    /// Build a client.  `timeout` of `None` means requests may take forever,
    /// which is the historical behaviour.
    pub fn new(timeout: Option<Duration>) -> Result<Self, DialogError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl CatalogClient for HttpCatalog {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpReply, DialogError>> + Send {
        let request = self.client.get(url);
        async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpReply { status, body })
        }
    }

    fn post_form(
        &self,
        url: &str,
        body: String,
    ) -> impl Future<Output = Result<HttpReply, DialogError>> + Send {
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpReply { status, body })
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Catalog that answers every request with the same canned reply and
    /// remembers what it was asked.
    pub struct CannedCatalog {
        reply: HttpReply,
        requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl CannedCatalog {
        pub fn new(status: u16, body: &str) -> Self {
            Self {
                reply: HttpReply::new(status, body),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<(String, Option<String>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl CatalogClient for CannedCatalog {
        fn get(&self, url: &str) -> impl Future<Output = Result<HttpReply, DialogError>> + Send {
            self.requests.lock().unwrap().push((url.to_string(), None));
            let reply = self.reply.clone();
            async move { Ok(reply) }
        }

        fn post_form(
            &self,
            url: &str,
            body: String,
        ) -> impl Future<Output = Result<HttpReply, DialogError>> + Send {
            self.requests.lock().unwrap().push((url.to_string(), Some(body)));
            let reply = self.reply.clone();
            async move { Ok(reply) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_url_appends_stream_param() {
        assert_eq!(
            search_url("http://host/sp/1/selector?type=req&terms=brake"),
            "http://host/sp/1/selector?type=req&terms=brake&stream=data"
        );
    }

    #[test]
    fn selector_query_encodes_terms() {
        assert_eq!(
            selector_query_url("http://host/selector", Some("Specification"), "a b&c"),
            "http://host/selector?type=Specification&terms=a+b%26c"
        );
    }

    #[test]
    fn selector_query_without_type_and_existing_query() {
        assert_eq!(
            selector_query_url("http://host/selector?x=1", None, ""),
            "http://host/selector?x=1&terms="
        );
    }
}
