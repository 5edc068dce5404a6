use http::{HeaderMap, Method};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use taskwire_core::OutgoingRequest;
use uuid::Uuid;

type Predicate = dyn Fn(&OutgoingRequest) -> bool + Send + Sync;

/// A named predicate over outgoing requests.
///
/// Equality and hashing use the id only. Matchers built from parameters
/// (`path_equals`, `method_equals`, ...) derive their id from those parameters,
/// so registering the same matcher twice collapses into one registry entry.
/// Matchers built from closures get a fresh random id and are never equal to
/// any other matcher.
#[derive(Clone)]
pub struct RequestMatcher {
    id: Arc<str>,
    predicate: Arc<Predicate>,
}

impl RequestMatcher {
    /// Create a matcher with an explicit id
    pub fn new<F>(id: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&OutgoingRequest) -> bool + Send + Sync + 'static,
    {
        let id: String = id.into();
        Self {
            id: Arc::from(id),
            predicate: Arc::new(predicate),
        }
    }

    /// Create a matcher with a random id
    pub fn anonymous<F>(predicate: F) -> Self
    where
        F: Fn(&OutgoingRequest) -> bool + Send + Sync + 'static,
    {
        Self::new(Uuid::new_v4().to_string(), predicate)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check if the matcher matches a request
    pub fn matches(&self, request: &OutgoingRequest) -> bool {
        (self.predicate)(request)
    }

    /// Match only if every matcher matches. Ids are joined with `&`.
    pub fn combine<I>(matchers: I) -> Self
    where
        I: IntoIterator<Item = RequestMatcher>,
    {
        let matchers: Vec<RequestMatcher> = matchers.into_iter().collect();
        let id = matchers
            .iter()
            .map(|matcher| matcher.id())
            .collect::<Vec<_>>()
            .join("&");
        Self::new(id, move |request| matchers.iter().all(|matcher| matcher.matches(request)))
    }

    /// Shorthand for `combine([self, other])`
    pub fn and(self, other: RequestMatcher) -> Self {
        Self::combine([self, other])
    }

    /// Match a path containing `component`
    pub fn path_contains(component: impl Into<String>) -> Self {
        let component = component.into();
        Self::new(format!("path-contains:{}", component), move |request| {
            request.path().contains(component.as_str())
        })
    }

    /// Match a specific path. Leading and trailing `/` are ignored.
    pub fn path_equals(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(format!("path-equals:{}", path), move |request| {
            trim_slashes(request.path()) == trim_slashes(&path)
        })
    }

    /// Match a specific HTTP method
    pub fn method_equals(method: Method) -> Self {
        Self::new(format!("method-equals:{}", method), move |request| {
            *request.method() == method
        })
    }

    /// Match a specific host
    pub fn host_equals(host: impl Into<String>) -> Self {
        let host = host.into();
        Self::new(format!("host-equals:{}", host), move |request| {
            request.host() == Some(host.as_str())
        })
    }

    /// Match requests whose headers are exactly `headers`.
    ///
    /// Names compare case-insensitively, values exactly. Repeated headers are
    /// compared in order.
    pub fn headers_equal<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut expected: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in headers {
            expected
                .entry(name.as_ref().to_ascii_lowercase())
                .or_default()
                .push(value.as_ref().to_string());
        }
        let id = if expected.is_empty() {
            "<none>".to_string()
        } else {
            expected
                .iter()
                .map(|(name, values)| format!("{}={}", name, values.join(",")))
                .collect::<Vec<_>>()
                .join("&")
        };
        Self::new(format!("headers-equals:{}", id), move |request| {
            header_table(request.headers()).as_ref() == Some(&expected)
        })
    }

    /// Match headers with a custom predicate. Always gets a random id.
    pub fn headers_matching<F>(predicate: F) -> Self
    where
        F: Fn(&HeaderMap) -> bool + Send + Sync + 'static,
    {
        Self::new(format!("headers-matches:{}", Uuid::new_v4()), move |request| {
            predicate(request.headers())
        })
    }

    /// Match decoded query pairs with a custom predicate. Always gets a random id.
    pub fn query_matching<F>(predicate: F) -> Self
    where
        F: Fn(&[(String, String)]) -> bool + Send + Sync + 'static,
    {
        Self::new(format!("query-matches:{}", Uuid::new_v4()), move |request| {
            predicate(&request.query_pairs())
        })
    }

    /// Match the body with a custom predicate. Always gets a random id.
    pub fn body_matching<F>(predicate: F) -> Self
    where
        F: Fn(Option<&[u8]>) -> bool + Send + Sync + 'static,
    {
        Self::new(format!("body-matches:{}", Uuid::new_v4()), move |request| {
            predicate(request.body())
        })
    }
}

fn trim_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

// None if any value is not visible ASCII; such requests never match.
fn header_table(headers: &HeaderMap) -> Option<BTreeMap<String, Vec<String>>> {
    let mut table: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.to_str().ok()?;
        table
            .entry(name.as_str().to_string())
            .or_default()
            .push(value.to_string());
    }
    Some(table)
}

impl PartialEq for RequestMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RequestMatcher {}

impl Hash for RequestMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for RequestMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestMatcher").field("id", &self.id).finish()
    }
}
