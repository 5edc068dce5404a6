//! Client configuration
//!
//! [`ClientConfig`] can be built in code or read from `TASKWIRE_*`
//! environment variables:
//!
//! ```text
//! TASKWIRE_BASE_URL=https://jsonplaceholder.typicode.com
//! TASKWIRE_DEFAULT_HEADERS=Content-Type: application/json,X-Client: blog
//! TASKWIRE_STUBS_ENABLED=true
//! TASKWIRE_STUB_DELAY_MS=250
//! ```

use crate::error::{Error, Result};
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use serde::Deserialize;
use std::time::Duration;

/// Settings shared by a client and its loaders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Headers as `Name: value` entries.
    #[serde(default)]
    pub default_headers: Vec<String>,
    #[serde(default)]
    pub stubs_enabled: bool,
    #[serde(default)]
    pub stub_delay_ms: Option<u64>,
}

impl ClientConfig {
    pub const ENV_PREFIX: &'static str = "TASKWIRE_";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: Vec::new(),
            stubs_enabled: false,
            stub_delay_ms: None,
        }
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Ok(envy::prefixed(Self::ENV_PREFIX).from_env()?)
    }

    /// Load from explicit `(name, value)` pairs using the same variable names
    /// as [`ClientConfig::from_env`].
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(Self::ENV_PREFIX).from_iter(vars)?)
    }

    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.push(format!("{}: {}", name, value));
        self
    }

    pub fn with_stubs(mut self, enabled: bool) -> Self {
        self.stubs_enabled = enabled;
        self
    }

    pub fn with_stub_delay(mut self, delay: Duration) -> Self {
        self.stub_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    pub fn stub_delay(&self) -> Option<Duration> {
        self.stub_delay_ms.map(Duration::from_millis)
    }

    /// Parse [`ClientConfig::default_headers`] into a header map.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for entry in &self.default_headers {
            let (name, value) = entry
                .split_once(':')
                .ok_or_else(|| Error::Config(format!("header `{}` is not `Name: value`", entry)))?;
            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name in `{}`: {}", entry, e)))?;
            let value = HeaderValue::from_str(value.trim())
                .map_err(|e| Error::Config(format!("invalid header value in `{}`: {}", entry, e)))?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}
