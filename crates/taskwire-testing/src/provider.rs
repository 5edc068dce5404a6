use crate::matcher::RequestMatcher;
use crate::stub::ResponseStub;
use std::sync::{PoisonError, RwLock};
use taskwire_core::{Error, OutgoingRequest, Result};

/// Registry of stubs keyed by matcher
pub trait StubProvider: Send + Sync {
    /// Whether any registered matcher accepts `request`
    fn has_stub(&self, request: &OutgoingRequest) -> bool;

    /// The stub of the first registered matcher that accepts `request`
    fn stub(&self, request: &OutgoingRequest) -> Result<ResponseStub>;

    /// Register `stub` under `matcher`, replacing any stub already held by
    /// a matcher with the same id.
    fn add_stub(&self, stub: ResponseStub, matcher: RequestMatcher);
}

/// In-memory [`StubProvider`]
///
/// Lookup walks matchers in the order their ids were first registered.
/// Replacing a stub keeps the matcher's original position.
#[derive(Debug, Default)]
pub struct InMemoryStubProvider {
    stubs: RwLock<Vec<(RequestMatcher, ResponseStub)>>,
}

impl InMemoryStubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stubs<I>(stubs: I) -> Self
    where
        I: IntoIterator<Item = (RequestMatcher, ResponseStub)>,
    {
        let provider = Self::new();
        for (matcher, stub) in stubs {
            provider.add_stub(stub, matcher);
        }
        provider
    }

    pub fn len(&self) -> usize {
        self.stubs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registered stub
    pub fn clear(&self) {
        self.stubs.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Copy of the registry. Matchers run on the copy with the lock released,
    /// so a predicate may call back into the provider.
    fn snapshot(&self) -> Vec<(RequestMatcher, ResponseStub)> {
        self.stubs.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl StubProvider for InMemoryStubProvider {
    fn has_stub(&self, request: &OutgoingRequest) -> bool {
        self.snapshot()
            .iter()
            .any(|(matcher, _)| matcher.matches(request))
    }

    fn stub(&self, request: &OutgoingRequest) -> Result<ResponseStub> {
        self.snapshot()
            .into_iter()
            .find(|(matcher, _)| matcher.matches(request))
            .map(|(matcher, stub)| {
                tracing::debug!(matcher = matcher.id(), request = %request, "stub matched");
                stub
            })
            .ok_or_else(|| Error::NoStubFound {
                method: request.method().clone(),
                uri: request.uri().clone(),
            })
    }

    fn add_stub(&self, stub: ResponseStub, matcher: RequestMatcher) {
        let mut stubs = self.stubs.write().unwrap_or_else(PoisonError::into_inner);
        match stubs.iter_mut().find(|(existing, _)| *existing == matcher) {
            Some(entry) => {
                tracing::debug!(matcher = matcher.id(), "replacing stub");
                *entry = (matcher, stub);
            }
            None => {
                tracing::debug!(matcher = matcher.id(), "registering stub");
                stubs.push((matcher, stub));
            }
        }
    }
}
