use super::RequestLoader;
use crate::error::Error;
use crate::request::OutgoingRequest;
use crate::response::{HttpResponse, Metrics, ResponseHead};
use crate::transport::{ReqwestTransport, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// A loader which sends every request over the network.
///
/// Transport failures are reported through the response's failure channel.
/// Non-2xx statuses are not failures at this level.
#[derive(Debug, Clone, Default)]
pub struct LiveLoader<T = ReqwestTransport> {
    transport: T,
}

impl LiveLoader {
    /// A live loader over the default `reqwest` transport (HTTP and HTTPS).
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }
}

impl<T: Transport> LiveLoader<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> RequestLoader for LiveLoader<T> {
    async fn load(&self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes> {
        let started_at = SystemTime::now();
        let start = Instant::now();
        let outcome = self.transport.execute(&request).await;
        let metrics = Metrics {
            started_at,
            duration: start.elapsed(),
        };

        match outcome {
            Ok(raw) => {
                tracing::debug!(
                    method = %request.method(),
                    uri = %request.uri(),
                    status = raw.status.as_u16(),
                    duration_ms = metrics.duration.as_millis() as u64,
                    "Request completed"
                );
                HttpResponse {
                    request: Some(request),
                    head: Some(ResponseHead::new(raw.status).with_headers(raw.headers)),
                    data: Some(raw.body.clone()),
                    metrics: Some(metrics),
                    result: Ok(raw.body),
                }
            }
            Err(err) => {
                tracing::warn!(
                    method = %request.method(),
                    uri = %request.uri(),
                    error = %err,
                    "Transport failure"
                );
                HttpResponse {
                    request: Some(request),
                    head: None,
                    data: None,
                    metrics: Some(metrics),
                    result: Err(Error::transport(err)),
                }
            }
        }
    }
}
