//! API client boundary
//!
//! [`ApiClient`] is the thin layer typed clients build on: it turns a path,
//! method, parameters and headers into an [`OutgoingRequest`] and binds it to
//! the client's loader as an [`HttpTask`].
//!
//! ```rust,ignore
//! impl BlogApi {
//!     fn post(&self, id: u64) -> Result<HttpTask<Post>> {
//!         Ok(self
//!             .request(UrlPath::join(["posts", &id.to_string()]), Method::GET, None, None)?
//!             .decoding_value_as::<Post>())
//!     }
//! }
//! ```

use crate::error::{Error, Result};
use crate::loader::SharedLoader;
use crate::request::{OutgoingRequest, RequestBuilder, UrlPath};
use crate::task::HttpTask;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use serde_json::Value;
use std::sync::Arc;

/// How [`RequestParameters`] are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterEncoding {
    /// JSON object in the body.
    Json,
    /// Query string for `GET`, `HEAD` and `DELETE`; form body otherwise.
    Url,
}

/// Named request parameters. `null` values are dropped when encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParameters {
    values: Value,
    encoding: ParameterEncoding,
}

impl RequestParameters {
    pub fn new(values: Value, encoding: ParameterEncoding) -> Self {
        Self { values, encoding }
    }

    pub fn json(values: Value) -> Self {
        Self::new(values, ParameterEncoding::Json)
    }

    pub fn url(values: Value) -> Self {
        Self::new(values, ParameterEncoding::Url)
    }

    pub fn encoding(&self) -> ParameterEncoding {
        self.encoding
    }

    /// Encode the parameters into `builder`.
    pub fn encode(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let Value::Object(values) = &self.values else {
            return Err(Error::InvalidRequest(format!(
                "request parameters must be a JSON object, found {}",
                self.values
            )));
        };
        let values: serde_json::Map<String, Value> = values
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        match self.encoding {
            ParameterEncoding::Json => {
                let body = serde_json::to_vec(&values)
                    .map_err(|e| Error::InvalidRequest(format!("could not encode parameters: {}", e)))?;
                let builder = if builder.has_header(&CONTENT_TYPE) {
                    builder
                } else {
                    builder.headers(content_type("application/json"))
                };
                Ok(builder.body(body))
            }
            ParameterEncoding::Url => {
                let mut pairs = Vec::new();
                for (key, value) in &values {
                    query_components(key.clone(), value, &mut pairs);
                }
                let encoded = serde_urlencoded::to_string(&pairs)
                    .map_err(|e| Error::InvalidRequest(format!("could not encode parameters: {}", e)))?;

                if encodes_into_query(builder.method()) {
                    Ok(builder.query(&encoded))
                } else {
                    let builder = if builder.has_header(&CONTENT_TYPE) {
                        builder
                    } else {
                        builder.headers(content_type("application/x-www-form-urlencoded; charset=utf-8"))
                    };
                    Ok(builder.body(encoded))
                }
            }
        }
    }
}

fn encodes_into_query(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

fn content_type(value: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
    headers
}

// Nested values use bracket keys: `a[b]=1`, `list[]=1&list[]=2`.
fn query_components(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => out.push((key, if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => out.push((key, number.to_string())),
        Value::String(text) => out.push((key, text.clone())),
        Value::Array(items) => {
            for item in items {
                query_components(format!("{}[]", key), item, out);
            }
        }
        Value::Object(fields) => {
            for (field, item) in fields {
                query_components(format!("{}[{}]", key, field), item, out);
            }
        }
    }
}

/// A typed API client bound to one loader.
pub trait ApiClient {
    fn base_url(&self) -> &str;

    /// The loader every task of this client is bound to.
    fn loader(&self) -> SharedLoader;

    fn default_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    /// The absolute URL of `path` relative to [`ApiClient::base_url`].
    fn request_url(&self, path: &UrlPath) -> String {
        let base = self.base_url().trim_end_matches('/');
        let path = path.as_str().trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    /// Default headers merged with `headers`; per-call headers win.
    fn request_headers(&self, headers: Option<HeaderMap>) -> HeaderMap {
        let mut merged = self.default_headers();
        if let Some(headers) = headers {
            merged.extend(headers);
        }
        merged
    }

    /// Bind an already built request to this client's loader.
    fn task(&self, request: OutgoingRequest) -> HttpTask<Bytes> {
        HttpTask::from_loader(self.loader(), Arc::new(request))
    }

    /// Build a request and bind it to this client's loader.
    fn request(
        &self,
        path: impl Into<UrlPath>,
        method: Method,
        parameters: Option<RequestParameters>,
        headers: Option<HeaderMap>,
    ) -> Result<HttpTask<Bytes>> {
        let url = self.request_url(&path.into());
        let mut builder = OutgoingRequest::builder(method, url).headers(self.request_headers(headers));
        if let Some(parameters) = parameters {
            builder = parameters.encode(builder)?;
        }
        Ok(self.task(builder.build()?))
    }
}
