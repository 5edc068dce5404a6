use super::RequestLoader;
use crate::request::OutgoingRequest;
use crate::response::HttpResponse;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A loader which returns an empty successful response for every request.
///
/// Meant as a placeholder wherever a loader is required but never used. Do not
/// use it in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyLoader;

impl DummyLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RequestLoader for DummyLoader {
    async fn load(&self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes> {
        HttpResponse::success(request, None, Bytes::new())
    }
}
