//! # Taskwire
//!
//! A pluggable HTTP execution layer.
//!
//! An API client describes *what* to request. Each call returns an
//! [`HttpTask`]: a lazy recipe that loads the request through a swappable
//! [`RequestLoader`] every time it is observed, then runs a chain of
//! transforms on the result. Pick the loader to pick the behavior: the live
//! network, canned stubs, or a chain that tries stubs first.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use taskwire::prelude::*;
//!
//! #[derive(Deserialize)]
//! struct BlogPost {
//!     id: u64,
//!     title: String,
//! }
//!
//! struct BlogApi {
//!     loader: SharedLoader,
//! }
//!
//! impl ApiClient for BlogApi {
//!     fn base_url(&self) -> &str {
//!         "https://jsonplaceholder.typicode.com"
//!     }
//!
//!     fn loader(&self) -> SharedLoader {
//!         self.loader.clone()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = BlogApi { loader: Arc::new(LiveLoader::new()) };
//!     let posts = api
//!         .request("posts", Method::GET, None, None)?
//!         .decoding_value_as::<Vec<BlogPost>>();
//!
//!     for post in posts.value().await? {
//!         println!("{}: {}", post.id, post.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `testing` (default) - request matchers, stub providers, response
//!   schedulers and the stub loader from `taskwire-testing`
//!
//! ```toml
//! [dependencies]
//! taskwire = { version = "0.1", default-features = false }
//! ```

// Re-export core functionality
pub use taskwire_core::*;

// Re-export stubbing (feature-gated)
#[cfg(feature = "testing")]
pub use taskwire_testing as testing;
#[cfg(feature = "testing")]
pub use taskwire_testing::{
    DelayedScheduler, ImmediateScheduler, InMemoryStubProvider, RequestMatcher, ResponseFuture,
    ResponseScheduler, ResponseStub, StubBody, StubLoader, StubLoaderConfig, StubProvider,
    SuspendedScheduler,
};

/// Prelude module - import everything you need with `use taskwire::prelude::*`
pub mod prelude {
    pub use std::sync::Arc;

    pub use taskwire_core::{
        combine_loaders,
        // Client boundary
        ApiClient,
        Bytes,
        ClientConfig,
        CompositeLoader,
        DecodeExt,
        DummyLoader,
        // Error handling
        Error,
        HttpResponse,
        // Tasks
        HttpTask,
        LiveLoader,
        OutgoingRequest,
        // Loaders
        RequestLoader,
        RequestParameters,
        Result,
        SharedLoader,
        Transform,
        UrlPath,
    };

    pub use taskwire_core::http::{HeaderMap, Method, StatusCode};

    // Stubbing types (feature-gated)
    #[cfg(feature = "testing")]
    pub use taskwire_testing::{
        DelayedScheduler, ImmediateScheduler, InMemoryStubProvider, RequestMatcher,
        ResponseScheduler, ResponseStub, StubBody, StubLoader, StubLoaderConfig, StubProvider,
        SuspendedScheduler,
    };

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::json;
    pub use tracing::{debug, error, info, trace, warn};
}
