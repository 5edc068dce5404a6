//! Request loaders
//!
//! A [`RequestLoader`] decides whether it can fulfil a request and, when asked
//! to, produces a response for it. Loaders never return errors out of band:
//! every failure is carried in the response.
//!
//! - [`LiveLoader`] sends the request through a [`Transport`](crate::Transport).
//! - [`DummyLoader`] answers everything with an empty body.
//! - [`CompositeLoader`] delegates to the first child that accepts.

mod composite;
mod dummy;
mod live;

pub use composite::{combine_loaders, CompositeLoader};
pub use dummy::DummyLoader;
pub use live::LiveLoader;

use crate::request::OutgoingRequest;
use crate::response::HttpResponse;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// Shared handle to any loader.
pub type SharedLoader = Arc<dyn RequestLoader>;

/// Strategy that fulfils (or declines) outgoing requests.
#[async_trait]
pub trait RequestLoader: Send + Sync {
    /// True if this loader is willing to load `request`. Must not have side
    /// effects. Accepts everything by default.
    fn can_respond(&self, request: &OutgoingRequest) -> bool {
        let _ = request;
        true
    }

    /// Load `request` and produce a raw response.
    async fn load(&self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes>;
}
