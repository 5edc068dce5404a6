//! Error types for Taskwire
//!
//! Every failure produced while loading or decoding a request ends up in the
//! failure channel of an [`HttpResponse`](crate::HttpResponse). Only
//! [`HttpTask::value`](crate::HttpTask::value) hands it back to the caller as
//! an `Err`.

use http::{Method, StatusCode, Uri};
use std::any::type_name;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error returned by transports.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for Taskwire operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure channel of every response.
///
/// Cloneable so that registered stubs can carry one and hand out copies.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The live call failed at the network layer.
    #[error("transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// A stub loader was asked to load while disabled.
    #[error("stubbing is not enabled")]
    StubbingDisabled,

    /// No registered matcher covers the request.
    #[error("no response stub registered for {method} {uri}")]
    NoStubFound { method: Method, uri: Uri },

    /// No loader in a chain accepted the request.
    #[error("no request loader could load {method} {uri}")]
    UnableToLoadRequest { method: Method, uri: Uri },

    /// A decoding or mapping stage failed.
    #[error("unable to transform {source_type} into {destination_type}: {message}")]
    Transform {
        source_type: &'static str,
        destination_type: &'static str,
        message: String,
    },

    /// A named fixture resource could not be located.
    #[error("could not find resource {0}")]
    ResourceNotFound(String),

    /// Generic failure carried by a failure stub.
    #[error("stubbed failure with status {status}")]
    Stubbed { status: StatusCode },

    /// A suspended delivery was abandoned before it was resumed.
    #[error("response delivery was cancelled")]
    Cancelled,

    /// The outgoing request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a transport level error.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(Arc::from(err.into()))
    }

    /// Create a transform failure describing the `S -> D` conversion.
    pub fn transform<S: ?Sized, D: ?Sized>(message: impl Into<String>) -> Self {
        Error::Transform {
            source_type: type_name::<S>(),
            destination_type: type_name::<D>(),
            message: message.into(),
        }
    }

    /// True if the failure came from the network layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// True if the failure came from a transform stage.
    pub fn is_transform(&self) -> bool {
        matches!(self, Error::Transform { .. })
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::InvalidRequest(err.to_string())
    }
}

impl From<envy::Error> for Error {
    fn from(err: envy::Error) -> Self {
        Error::Config(err.to_string())
    }
}
