use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use taskwire_core::{Error, HttpResponse, OutgoingRequest, ResponseHead, Result};

/// A canned response
///
/// A stub with an `error` is observed by the caller as a failed call even
/// though no network error happened.
#[derive(Debug, Clone)]
pub struct ResponseStub {
    pub status: StatusCode,
    pub headers: Option<HeaderMap>,
    pub body: Bytes,
    pub error: Option<Error>,
}

impl ResponseStub {
    pub fn new(status: StatusCode, body: StubBody) -> Self {
        Self {
            status,
            headers: None,
            body: body.into_bytes(),
            error: None,
        }
    }

    /// `200 OK` with `body`
    pub fn success(body: StubBody) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// A failed call with the given status, error and body
    pub fn failure(status: StatusCode, error: Option<Error>, body: StubBody) -> Self {
        Self {
            error: Some(error.unwrap_or(Error::Stubbed { status })),
            ..Self::new(status, body)
        }
    }

    /// A failed `404 Not Found` with an empty body
    pub fn not_found() -> Self {
        Self::failure(StatusCode::NOT_FOUND, None, StubBody::empty())
    }

    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.get_or_insert_with(HeaderMap::new).append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// The outcome a caller observes for this stub
    pub fn result(&self) -> Result<Bytes> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(self.body.clone()),
        }
    }

    /// Materialize the stub as the response to `request`
    pub fn into_response(self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes> {
        let result = self.result();
        let head = ResponseHead::new(self.status).with_headers(self.headers.unwrap_or_default());
        HttpResponse {
            request: Some(request),
            head: Some(head),
            data: Some(self.body),
            metrics: None,
            result,
        }
    }
}

/// Body of a [`ResponseStub`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StubBody(Bytes);

impl StubBody {
    pub fn empty() -> Self {
        Self(Bytes::new())
    }

    pub fn bytes(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }

    /// Any JSON value, fragments included
    pub fn json(value: serde_json::Value) -> Result<Self> {
        serde_json::to_vec(&value)
            .map(|data| Self(data.into()))
            .map_err(|e| Error::transform::<serde_json::Value, Bytes>(e.to_string()))
    }

    /// Contents of `<dir>/<name>.<ext>`
    pub fn resource(name: &str, ext: &str, dir: impl AsRef<Path>) -> Result<Self> {
        let file_name = format!("{}.{}", name, ext);
        let path = dir.as_ref().join(&file_name);
        if !path.is_file() {
            return Err(Error::ResourceNotFound(file_name));
        }
        std::fs::read(&path)
            .map(|data| Self(data.into()))
            .map_err(|e| Error::ResourceNotFound(format!("{} ({})", file_name, e)))
    }

    /// A value serialized as JSON
    pub fn encodable<T: Serialize + ?Sized>(model: &T) -> Result<Self> {
        serde_json::to_vec(model)
            .map(|data| Self(data.into()))
            .map_err(|e| Error::transform::<T, Bytes>(e.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}
