use super::{RequestLoader, SharedLoader};
use crate::error::Error;
use crate::request::OutgoingRequest;
use crate::response::HttpResponse;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Chain loaders by priority. The first loader in the list wins.
///
/// ```rust,ignore
/// let loader = combine_loaders([stubs.clone() as SharedLoader, Arc::new(LiveLoader::new())]);
/// ```
pub fn combine_loaders<I>(loaders: I) -> CompositeLoader
where
    I: IntoIterator<Item = SharedLoader>,
{
    CompositeLoader::new(loaders)
}

/// Loads each request with the first child loader that can respond to it.
///
/// If no child accepts, the response fails with
/// [`Error::UnableToLoadRequest`] and carries no head, data or metrics.
#[derive(Clone, Default)]
pub struct CompositeLoader {
    loaders: Vec<SharedLoader>,
}

impl CompositeLoader {
    pub fn new<I>(loaders: I) -> Self
    where
        I: IntoIterator<Item = SharedLoader>,
    {
        Self {
            loaders: loaders.into_iter().collect(),
        }
    }

    /// Append a loader with the lowest priority so far.
    pub fn push(mut self, loader: SharedLoader) -> Self {
        self.loaders.push(loader);
        self
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

impl std::fmt::Debug for CompositeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeLoader")
            .field("loaders", &self.loaders.len())
            .finish()
    }
}

#[async_trait]
impl RequestLoader for CompositeLoader {
    // Only the children know; the chain itself never declines.
    fn can_respond(&self, _request: &OutgoingRequest) -> bool {
        true
    }

    async fn load(&self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes> {
        let selected = self
            .loaders
            .iter()
            .enumerate()
            .find(|(_, loader)| loader.can_respond(&request));

        match selected {
            Some((index, loader)) => {
                tracing::debug!(
                    method = %request.method(),
                    uri = %request.uri(),
                    loader = index,
                    "Loader selected"
                );
                loader.load(request).await
            }
            None => {
                tracing::warn!(
                    method = %request.method(),
                    uri = %request.uri(),
                    loaders = self.loaders.len(),
                    "No loader accepted the request"
                );
                let error = Error::UnableToLoadRequest {
                    method: request.method().clone(),
                    uri: request.uri().clone(),
                };
                HttpResponse::unhandled(request, error)
            }
        }
    }
}
