//! Network transport
//!
//! The [`Transport`] trait is the only place where bytes leave the process.
//!
//! - [`ReqwestTransport`] is the default. It speaks HTTP and HTTPS through
//!   `reqwest` with rustls.
//! - [`HyperTransport`] is a plain-HTTP client on the `hyper-util` legacy
//!   client, for local services.

use crate::error::BoxError;
use crate::request::OutgoingRequest;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

/// Status, headers and body of a completed round-trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes a request on the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &OutgoingRequest) -> Result<RawResponse, BoxError>;
}

/// [`Transport`] backed by a pooled `reqwest` client with rustls.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client, e.g. one with timeouts or a proxy.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &OutgoingRequest) -> Result<RawResponse, BoxError> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.uri().to_string())
            .headers(request.headers().clone());
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// [`Transport`] backed by a pooled hyper client over plain HTTP.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    pub fn new() -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn execute(&self, request: &OutgoingRequest) -> Result<RawResponse, BoxError> {
        let mut builder = http::Request::builder()
            .method(request.method().clone())
            .uri(request.uri().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        let body = Full::new(request.body_bytes().unwrap_or_default());

        let response = self.client.request(builder.body(body)?).await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();

        Ok(RawResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
