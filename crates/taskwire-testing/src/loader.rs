use crate::matcher::RequestMatcher;
use crate::provider::StubProvider;
use crate::scheduler::{DelayedScheduler, ImmediateScheduler, ResponseFuture, ResponseScheduler};
use crate::stub::ResponseStub;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use taskwire_core::{ClientConfig, Error, HttpResponse, OutgoingRequest, RequestLoader};

/// Settings for a [`StubLoader`]
#[derive(Clone)]
pub struct StubLoaderConfig {
    pub enabled: bool,
    pub scheduler: Arc<dyn ResponseScheduler>,
}

impl Default for StubLoaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scheduler: Arc::new(ImmediateScheduler),
        }
    }
}

impl StubLoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stubbing switch and delay taken from a client configuration
    pub fn from_client(config: &ClientConfig) -> Self {
        Self::delayed_from_client(config).0
    }

    /// Like [`StubLoaderConfig::from_client`], also returning the delayed
    /// scheduler so the delay can be changed later. Without a configured
    /// delay the scheduler delivers immediately until one is set.
    pub fn delayed_from_client(config: &ClientConfig) -> (Self, Arc<DelayedScheduler>) {
        let scheduler = Arc::new(DelayedScheduler::new(config.stub_delay()));
        let loader_config = Self {
            enabled: config.stubs_enabled,
            scheduler: scheduler.clone(),
        };
        (loader_config, scheduler)
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn ResponseScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }
}

impl fmt::Debug for StubLoaderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubLoaderConfig")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Answers requests from a [`StubProvider`]
///
/// The loader only accepts requests while enabled and while the provider
/// holds a matching stub, so it can sit in front of a live loader in a
/// [`CompositeLoader`](taskwire_core::CompositeLoader). A direct `load` on a
/// disabled loader still fails with [`Error::StubbingDisabled`].
pub struct StubLoader {
    provider: Arc<dyn StubProvider>,
    enabled: AtomicBool,
    scheduler: Arc<dyn ResponseScheduler>,
}

impl StubLoader {
    pub fn new(provider: Arc<dyn StubProvider>) -> Self {
        Self::with_config(provider, StubLoaderConfig::default())
    }

    pub fn with_config(provider: Arc<dyn StubProvider>, config: StubLoaderConfig) -> Self {
        Self {
            provider,
            enabled: AtomicBool::new(config.enabled),
            scheduler: config.scheduler,
        }
    }

    pub fn provider(&self) -> &Arc<dyn StubProvider> {
        &self.provider
    }

    pub fn scheduler(&self) -> &Arc<dyn ResponseScheduler> {
        &self.scheduler
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Shorthand for registering on the underlying provider
    pub fn add_stub(&self, stub: ResponseStub, matcher: RequestMatcher) {
        self.provider.add_stub(stub, matcher);
    }
}

impl fmt::Debug for StubLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubLoader")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestLoader for StubLoader {
    fn can_respond(&self, request: &OutgoingRequest) -> bool {
        self.is_enabled() && self.provider.has_stub(request)
    }

    async fn load(&self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes> {
        if !self.is_enabled() {
            tracing::warn!(method = %request.method(), uri = %request.uri(), "stubbing is disabled");
            return HttpResponse::failure(None, Error::StubbingDisabled);
        }

        let provider = self.provider.clone();
        let work: ResponseFuture = Box::pin(async move {
            match provider.stub(&request) {
                Ok(stub) => stub.into_response(request),
                Err(error) => {
                    tracing::debug!(method = %request.method(), uri = %request.uri(), "no stub for request");
                    HttpResponse::failure(Some(request), error)
                }
            }
        });
        self.scheduler.schedule(work).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryStubProvider;
    use crate::scheduler::SuspendedScheduler;
    use crate::stub::StubBody;
    use http::{Method, StatusCode};
    use std::time::Duration;

    fn request(uri: &str) -> Arc<OutgoingRequest> {
        Arc::new(OutgoingRequest::get(uri).unwrap())
    }

    fn provider_with_posts() -> Arc<InMemoryStubProvider> {
        let provider = Arc::new(InMemoryStubProvider::new());
        provider.add_stub(
            ResponseStub::success(StubBody::bytes(r#"[{"id":1}]"#)),
            RequestMatcher::path_equals("posts").and(RequestMatcher::method_equals(Method::GET)),
        );
        provider
    }

    #[tokio::test]
    async fn loads_matching_stub() {
        let loader = StubLoader::new(provider_with_posts());
        let request = request("https://example.com/posts");

        assert!(loader.can_respond(&request));
        let response = loader.load(request).await;

        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.value().map(|b| &b[..]), Some(&br#"[{"id":1}]"#[..]));
    }

    #[tokio::test]
    async fn missing_stub_fails_with_request_context() {
        let loader = StubLoader::new(provider_with_posts());
        let request = request("https://example.com/posts/12");

        assert!(!loader.can_respond(&request));
        let response = loader.load(request).await;

        assert!(matches!(response.error(), Some(Error::NoStubFound { .. })));
        assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
        assert!(response.request.is_some());
    }

    #[tokio::test]
    async fn disabled_loader_declines_and_fails() {
        let loader = StubLoader::with_config(
            provider_with_posts(),
            StubLoaderConfig::new().enabled(false),
        );
        let request = request("https://example.com/posts");

        assert!(!loader.can_respond(&request));
        let response = loader.load(request.clone()).await;
        assert!(matches!(response.error(), Some(Error::StubbingDisabled)));
        assert!(response.request.is_none());

        loader.set_enabled(true);
        assert!(loader.can_respond(&request));
    }

    #[tokio::test]
    async fn failure_stub_is_delivered_as_failure() {
        let provider = Arc::new(InMemoryStubProvider::new());
        let loader = StubLoader::new(provider);
        loader.add_stub(ResponseStub::not_found(), RequestMatcher::path_contains("users"));

        let response = loader.load(request("https://example.com/users/3")).await;
        assert!(matches!(
            response.error(),
            Some(Error::Stubbed { status }) if *status == StatusCode::NOT_FOUND
        ));
        assert_eq!(response.data.as_deref(), Some(&b""[..]));
    }

    #[tokio::test]
    async fn suspended_scheduler_holds_delivery() {
        let scheduler = Arc::new(SuspendedScheduler::new());
        let loader = Arc::new(StubLoader::with_config(
            provider_with_posts(),
            StubLoaderConfig::new().scheduler(scheduler.clone()),
        ));

        let handle = {
            let loader = loader.clone();
            tokio::spawn(async move { loader.load(request("https://example.com/posts")).await })
        };
        while scheduler.pending() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!handle.is_finished());

        scheduler.resume();
        assert!(handle.await.unwrap().is_success());
    }

    #[test]
    fn config_from_client() {
        let config = ClientConfig::new("https://example.com")
            .with_stubs(true)
            .with_stub_delay(Duration::from_millis(10));
        let loader_config = StubLoaderConfig::from_client(&config);
        assert!(loader_config.enabled);

        let config = ClientConfig::new("https://example.com");
        assert!(!StubLoaderConfig::from_client(&config).enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn configured_delay_can_be_changed_at_runtime() {
        let config = ClientConfig::new("https://example.com")
            .with_stubs(true)
            .with_stub_delay(Duration::from_millis(100));
        let (loader_config, delayed) = StubLoaderConfig::delayed_from_client(&config);
        assert_eq!(delayed.delay(), Some(Duration::from_millis(100)));
        let loader = StubLoader::with_config(provider_with_posts(), loader_config);

        let started = tokio::time::Instant::now();
        assert!(loader.load(request("https://example.com/posts")).await.is_success());
        assert!(started.elapsed() >= Duration::from_millis(100));

        delayed.set_delay(Some(Duration::from_secs(3)));
        let started = tokio::time::Instant::now();
        loader.load(request("https://example.com/posts")).await;
        assert!(started.elapsed() >= Duration::from_secs(3));

        delayed.set_delay(None);
        let started = tokio::time::Instant::now();
        loader.load(request("https://example.com/posts")).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
