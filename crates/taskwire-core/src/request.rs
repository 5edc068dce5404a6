//! Outgoing request description
//!
//! An [`OutgoingRequest`] is immutable once built. Loaders and tasks share it
//! through an `Arc` and never mutate it.

use crate::error::{Error, Result};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri};
use std::fmt;

/// A single HTTP call: method, target URI, headers and an optional body.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl OutgoingRequest {
    /// Start building a request.
    pub fn builder(method: Method, uri: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, uri)
    }

    /// Shortcut for a body-less `GET`.
    pub fn get(uri: impl Into<String>) -> Result<Self> {
        Self::builder(Method::GET, uri).build()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The URI path, without the query.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn host(&self) -> Option<&str> {
        self.uri.host()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The body as shared bytes. Cloning does not copy the payload.
    pub fn body_bytes(&self) -> Option<Bytes> {
        self.body.clone()
    }

    /// Decoded query pairs, in the order they appear in the URI.
    ///
    /// Returns an empty list when the URI has no query or it cannot be decoded.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.uri
            .query()
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for OutgoingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}

/// Builder for [`OutgoingRequest`].
///
/// Header names and values are validated in [`RequestBuilder::build`], so the
/// chain itself never fails.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    raw_headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl RequestBuilder {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: HeaderMap::new(),
            raw_headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header by name and value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.raw_headers.push((name.into(), value.into()));
        self
    }

    /// Merge an already typed header map. Existing values for the same names
    /// are replaced.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Append already encoded query pairs to the URI.
    pub fn query(mut self, encoded: &str) -> Self {
        if encoded.is_empty() {
            return self;
        }
        let separator = if self.uri.contains('?') { '&' } else { '?' };
        self.uri.push(separator);
        self.uri.push_str(encoded);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn has_header(&self, name: &HeaderName) -> bool {
        self.headers.contains_key(name)
            || self
                .raw_headers
                .iter()
                .any(|(raw, _)| raw.eq_ignore_ascii_case(name.as_str()))
    }

    pub fn build(self) -> Result<OutgoingRequest> {
        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("invalid uri `{}`: {}", self.uri, e)))?;

        let mut headers = self.headers;
        for (name, value) in self.raw_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidRequest(format!("invalid header name `{}`: {}", name, e)))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|e| Error::InvalidRequest(format!("invalid value for header `{}`: {}", name, e)))?;
            headers.append(header_name, header_value);
        }

        Ok(OutgoingRequest {
            method: self.method,
            uri,
            headers,
            body: self.body,
        })
    }
}

/// A path relative to an API base URL, such as `posts/12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlPath(String);

impl UrlPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Join segments with `/`, e.g. `UrlPath::join(["posts", "12"])`.
    pub fn join<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        let joined = segments
            .into_iter()
            .map(|segment| segment.to_string())
            .collect::<Vec<_>>()
            .join("/");
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UrlPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for UrlPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
