//! # taskwire-core
//!
//! The execution layer behind Taskwire API clients.
//!
//! A client call produces an [`HttpTask`]: a request plus a lazy recipe that,
//! each time it is observed, sends the request through the [`RequestLoader`]
//! bound at construction and runs the task's transform pipeline on the result.
//! Swapping the loader swaps how requests are fulfilled (live network, stubs,
//! or a [`CompositeLoader`] chaining both) without touching client code.
//!
//! Failures never escape as panics or out-of-band errors. Each stage writes
//! them into the [`HttpResponse`] failure channel, and only
//! [`HttpTask::value`] surfaces them as an `Err`.
//!
//! ## Modules
//!
//! - [`request`] - immutable outgoing requests
//! - [`response`] - typed responses and their metadata
//! - [`loader`] - the loader trait and its live, dummy and composite variants
//! - [`task`] - lazy, re-executable tasks
//! - [`transform`] - named fallible conversions and JSON decoding
//! - [`client`] - the thin API client boundary
//! - [`transport`] - the network collaborator
//! - [`config`] - client configuration

pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod request;
pub mod response;
pub mod task;
pub mod transform;
pub mod transport;

pub use client::{ApiClient, ParameterEncoding, RequestParameters};
pub use config::ClientConfig;
pub use error::{BoxError, Error, Result};
pub use loader::{combine_loaders, CompositeLoader, DummyLoader, LiveLoader, RequestLoader, SharedLoader};
pub use request::{OutgoingRequest, RequestBuilder, UrlPath};
pub use response::{HttpResponse, Metrics, ResponseHead};
pub use task::HttpTask;
pub use transform::{DecodeExt, Decoder, JsonDecoder, Transform};
pub use transport::{HyperTransport, RawResponse, ReqwestTransport, Transport};

// Re-exported so downstream crates name the same types.
pub use bytes::Bytes;
pub use http;
