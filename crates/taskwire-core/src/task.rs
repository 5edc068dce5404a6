//! Lazy, re-executable HTTP tasks
//!
//! An [`HttpTask`] is a recipe, not a future: every observation
//! ([`response`](HttpTask::response), [`result`](HttpTask::result),
//! [`value`](HttpTask::value)) runs the whole pipeline again, starting with
//! the loader call. Nothing is cached between observations.
//!
//! ```rust,ignore
//! let posts: Vec<Post> = api
//!     .request("posts", Method::GET, None, None)?
//!     .decoding_value_as::<Vec<Post>>()
//!     .value()
//!     .await?;
//! ```

use crate::error::Result;
use crate::loader::SharedLoader;
use crate::request::OutgoingRequest;
use crate::response::HttpResponse;
use crate::transform::{Decoder, JsonDecoder, Transform};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type Perform<T> = Arc<dyn Fn() -> BoxFuture<'static, HttpResponse<T>> + Send + Sync>;

/// A request plus a deferred computation producing its typed response.
pub struct HttpTask<T> {
    request: Arc<OutgoingRequest>,
    perform: Perform<T>,
}

impl<T> Clone for HttpTask<T> {
    fn clone(&self) -> Self {
        Self {
            request: Arc::clone(&self.request),
            perform: Arc::clone(&self.perform),
        }
    }
}

impl<T> fmt::Debug for HttpTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTask")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl HttpTask<Bytes> {
    /// A task that loads `request` through `loader`.
    ///
    /// The loader is bound now; later observations always use it.
    pub fn from_loader(loader: SharedLoader, request: Arc<OutgoingRequest>) -> Self {
        let bound = Arc::clone(&request);
        HttpTask::new(request, move || {
            let loader = Arc::clone(&loader);
            let request = Arc::clone(&bound);
            async move { loader.load(request).await }
        })
    }

    /// Decode the payload as JSON into `U`.
    pub fn decoding_value_as<U>(self) -> HttpTask<U>
    where
        U: DeserializeOwned + Send + 'static,
    {
        self.decoding_value_with(JsonDecoder)
    }

    /// Decode the payload into `U` with an injected decoder.
    pub fn decoding_value_with<U, C>(self, decoder: C) -> HttpTask<U>
    where
        U: DeserializeOwned + Send + 'static,
        C: Decoder,
    {
        self.decoding_value(Transform::decodable(decoder))
    }
}

impl<T: Send + 'static> HttpTask<T> {
    pub fn new<F, Fut>(request: Arc<OutgoingRequest>, perform: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResponse<T>> + Send + 'static,
    {
        let perform: Perform<T> = Arc::new(move || -> BoxFuture<'static, HttpResponse<T>> {
            Box::pin(perform())
        });
        Self { request, perform }
    }

    /// The request this task executes.
    pub fn request(&self) -> &OutgoingRequest {
        &self.request
    }

    pub fn underlying_request(&self) -> Arc<OutgoingRequest> {
        Arc::clone(&self.request)
    }

    /// Run the task and return the full response.
    pub async fn response(&self) -> HttpResponse<T> {
        (self.perform)().await
    }

    /// Run the task and return its outcome.
    pub async fn result(&self) -> Result<T> {
        self.response().await.result
    }

    /// Run the task and return the success value, for use with `?`.
    pub async fn value(&self) -> Result<T> {
        self.result().await
    }

    /// Transform the whole response.
    pub fn map<U, F>(self, f: F) -> HttpTask<U>
    where
        U: Send + 'static,
        F: Fn(HttpResponse<T>) -> HttpResponse<U> + Send + Sync + 'static,
    {
        self.chain(f)
    }

    /// Transform the success value only.
    pub fn map_value<U, F>(self, f: F) -> HttpTask<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.chain(move |response| response.map(&f))
    }

    /// Apply a response level transform.
    ///
    /// If the transform fails, the result keeps the original request, head,
    /// data and metrics and carries the transform error.
    pub fn decoding<U>(self, transform: Transform<HttpResponse<T>, HttpResponse<U>>) -> HttpTask<U>
    where
        U: Send + 'static,
    {
        self.chain(move |response| {
            let fallback = response.with_result::<()>(Ok(()));
            match transform.apply(response) {
                Ok(decoded) => decoded,
                Err(error) => fallback.with_result(Err(error)),
            }
        })
    }

    /// Apply a value level transform on success; failures pass through.
    pub fn decoding_value<U>(self, transform: Transform<T, U>) -> HttpTask<U>
    where
        U: Send + 'static,
    {
        self.chain(move |response| response.try_map(|value| transform.apply(value)))
    }

    fn chain<U, F>(self, stage: F) -> HttpTask<U>
    where
        U: Send + 'static,
        F: Fn(HttpResponse<T>) -> HttpResponse<U> + Send + Sync + 'static,
    {
        let perform = self.perform;
        let stage = Arc::new(stage);
        HttpTask::new(self.request, move || {
            let perform = Arc::clone(&perform);
            let stage = Arc::clone(&stage);
            async move { stage(perform().await) }
        })
    }
}
