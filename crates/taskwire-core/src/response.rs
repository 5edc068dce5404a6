//! Typed responses
//!
//! An [`HttpResponse`] pairs the outcome of a call with whatever metadata is
//! known about it. A response synthesized without a transport round-trip has
//! no [`ResponseHead`] and no [`Metrics`].

use crate::error::{Error, Result};
use crate::request::OutgoingRequest;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Status line and headers of a received (or stubbed) response.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Timing of a live round-trip.
#[derive(Debug, Clone, Copy)]
pub struct Metrics {
    pub started_at: SystemTime,
    pub duration: Duration,
}

/// Outcome of loading a request, plus its diagnostics.
#[derive(Debug, Clone)]
pub struct HttpResponse<T> {
    /// The request that produced this response, if known.
    pub request: Option<Arc<OutgoingRequest>>,
    /// Present only when a response (real or stubbed) was received.
    pub head: Option<ResponseHead>,
    /// Raw body bytes as received, before any transform.
    pub data: Option<Bytes>,
    pub metrics: Option<Metrics>,
    pub result: Result<T>,
}

impl<T> HttpResponse<T> {
    /// A synthetic failure response.
    ///
    /// When the request is known a `404` head is attached, mirroring what a
    /// transport reports for an unroutable call.
    pub fn failure(request: Option<Arc<OutgoingRequest>>, error: Error) -> Self {
        Self::failure_with_status(request, StatusCode::NOT_FOUND, error)
    }

    pub fn failure_with_status(
        request: Option<Arc<OutgoingRequest>>,
        status: StatusCode,
        error: Error,
    ) -> Self {
        let head = request.as_ref().map(|_| ResponseHead::new(status));
        Self {
            request,
            head,
            data: None,
            metrics: None,
            result: Err(error),
        }
    }

    /// A failure for which no round-trip happened at all: no head, no data,
    /// no metrics.
    pub fn unhandled(request: Arc<OutgoingRequest>, error: Error) -> Self {
        Self {
            request: Some(request),
            head: None,
            data: None,
            metrics: None,
            result: Err(error),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.head.as_ref().map(|head| head.status)
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        self.head.as_ref().map(|head| &head.headers)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&Error> {
        self.result.as_ref().err()
    }

    /// Borrow the success value.
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn into_result(self) -> Result<T> {
        self.result
    }

    /// Same metadata, different outcome.
    pub fn with_result<U>(&self, result: Result<U>) -> HttpResponse<U> {
        HttpResponse {
            request: self.request.clone(),
            head: self.head.clone(),
            data: self.data.clone(),
            metrics: self.metrics,
            result,
        }
    }

    /// Transform the success value, keeping failures as they are.
    pub fn map<U, F>(self, f: F) -> HttpResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        HttpResponse {
            request: self.request,
            head: self.head,
            data: self.data,
            metrics: self.metrics,
            result: self.result.map(f),
        }
    }

    /// Transform the success value with a fallible function.
    pub fn try_map<U, F>(self, f: F) -> HttpResponse<U>
    where
        F: FnOnce(T) -> Result<U>,
    {
        HttpResponse {
            request: self.request,
            head: self.head,
            data: self.data,
            metrics: self.metrics,
            result: self.result.and_then(f),
        }
    }
}

impl HttpResponse<Bytes> {
    /// A successful response carrying `body`.
    pub fn success(request: Arc<OutgoingRequest>, head: Option<ResponseHead>, body: Bytes) -> Self {
        Self {
            request: Some(request),
            head,
            data: Some(body.clone()),
            metrics: None,
            result: Ok(body),
        }
    }
}
