//! # taskwire-testing
//!
//! Stubbing for Taskwire clients.
//!
//! Register canned [`ResponseStub`]s under [`RequestMatcher`]s, then put a
//! [`StubLoader`] in place of (or in front of) the live loader:
//!
//! ```rust,ignore
//! use taskwire_testing::*;
//!
//! let provider = Arc::new(InMemoryStubProvider::new());
//! provider.add_stub(
//!     ResponseStub::success(StubBody::json(json!([{"id": 1}]))?),
//!     RequestMatcher::path_equals("posts").and(RequestMatcher::method_equals(Method::GET)),
//! );
//!
//! let stubs: SharedLoader = Arc::new(StubLoader::new(provider));
//! let loader = combine_loaders([stubs, Arc::new(LiveLoader::new())]);
//! ```
//!
//! A [`ResponseScheduler`] on the loader decides when the stubbed response
//! reaches the caller. [`SuspendedScheduler`] holds every response until the
//! test calls [`SuspendedScheduler::resume`].

pub mod loader;
pub mod matcher;
pub mod provider;
pub mod scheduler;
pub mod stub;

pub use loader::{StubLoader, StubLoaderConfig};
pub use matcher::RequestMatcher;
pub use provider::{InMemoryStubProvider, StubProvider};
pub use scheduler::{
    DelayedScheduler, ImmediateScheduler, ResponseFuture, ResponseScheduler, SuspendedScheduler,
};
pub use stub::{ResponseStub, StubBody};
