//! Named, fallible conversions
//!
//! A [`Transform`] turns a `Source` into a `Destination` or fails with an
//! [`Error`]. Transforms are cheap to clone and compose with
//! [`Transform::map`].
//!
//! ```rust,ignore
//! use taskwire_core::Transform;
//!
//! let ids: Transform<Bytes, Vec<u64>> = Transform::<Bytes, Vec<Post>>::json()
//!     .map(|posts| Ok(posts.into_iter().map(|post| post.id).collect()));
//! ```

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type ApplyFn<S, D> = dyn Fn(S) -> Result<D> + Send + Sync;

/// A named function `Source -> Result<Destination>`.
pub struct Transform<S, D> {
    name: Cow<'static, str>,
    apply: Arc<ApplyFn<S, D>>,
}

impl<S: 'static, D: 'static> Transform<S, D> {
    /// Create a transform named after its source and destination types.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(S) -> Result<D> + Send + Sync + 'static,
    {
        let name = format!("{} -> {}", type_name::<S>(), type_name::<D>());
        Self::named(name, f)
    }

    pub fn named<F>(name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(S) -> Result<D> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            apply: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: S) -> Result<D> {
        (self.apply)(value)
    }

    /// Chain another conversion after this one.
    pub fn map<N, F>(self, f: F) -> Transform<S, N>
    where
        N: 'static,
        F: Fn(D) -> Result<N> + Send + Sync + 'static,
    {
        let name = format!("{} -> {}", self.name, type_name::<N>());
        let first = self.apply;
        Transform::named(name, move |value| f(first(value)?))
    }
}

impl<D: DeserializeOwned + 'static> Transform<Bytes, D> {
    /// Decode JSON bytes into `D` with the default [`JsonDecoder`].
    pub fn json() -> Self {
        Self::decodable(JsonDecoder)
    }

    /// Decode bytes into `D` with the given decoder.
    pub fn decodable<C: Decoder>(decoder: C) -> Self {
        Self::new(move |bytes: Bytes| decoder.decode::<D>(&bytes))
    }
}

impl Transform<Bytes, Value> {
    /// Parse any JSON document, fragments included.
    pub fn json_value() -> Self {
        Self::new(|bytes: Bytes| {
            serde_json::from_slice(&bytes).map_err(|e| Error::transform::<Bytes, Value>(e.to_string()))
        })
    }
}

impl Transform<Bytes, Map<String, Value>> {
    /// Parse a JSON document that must be an object.
    pub fn json_object() -> Self {
        Transform::<Bytes, Value>::json_value().map(|value| match value {
            Value::Object(map) => Ok(map),
            other => Err(Error::transform::<Bytes, Map<String, Value>>(format!(
                "expected a JSON object, found {}",
                other
            ))),
        })
    }
}

impl<S, D> Clone for Transform<S, D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<S, D> fmt::Debug for Transform<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform").field("name", &self.name).finish()
    }
}

/// Turns raw bytes into structured values.
pub trait Decoder: Send + Sync + 'static {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// [`Decoder`] backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| Error::transform::<[u8], T>(e.to_string()))
    }
}

/// Decoding helpers on raw payloads.
pub trait DecodeExt {
    fn decode_with<T: 'static>(&self, transform: &Transform<Bytes, T>) -> Result<T>;

    fn decode_json<T: DeserializeOwned>(&self) -> Result<T>;
}

impl DecodeExt for Bytes {
    fn decode_with<T: 'static>(&self, transform: &Transform<Bytes, T>) -> Result<T> {
        transform.apply(self.clone())
    }

    fn decode_json<T: DeserializeOwned>(&self) -> Result<T> {
        JsonDecoder.decode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Post {
        id: u64,
        title: String,
    }

    #[test]
    fn json_decodes_structured_value() {
        let bytes = Bytes::from_static(br#"[{"id":1,"title":"first"}]"#);
        let posts = Transform::<Bytes, Vec<Post>>::json().apply(bytes).unwrap();
        assert_eq!(
            posts,
            vec![Post {
                id: 1,
                title: "first".into()
            }]
        );
    }

    #[test]
    fn json_failure_is_a_transform_error() {
        let err = Transform::<Bytes, Vec<Post>>::json()
            .apply(Bytes::from_static(b"not json"))
            .unwrap_err();
        assert!(err.is_transform());
    }

    #[test]
    fn map_chains_and_renames() {
        let ids = Transform::<Bytes, Vec<Post>>::json()
            .map(|posts| Ok(posts.into_iter().map(|post| post.id).collect::<Vec<_>>()));
        assert!(ids.name().ends_with("Vec<u64>"));

        let bytes = Bytes::from_static(br#"[{"id":4,"title":"a"},{"id":9,"title":"b"}]"#);
        assert_eq!(ids.apply(bytes).unwrap(), vec![4, 9]);
    }

    #[test]
    fn map_propagates_first_failure() {
        let transform = Transform::<u32, u32>::new(|_| Err(Error::transform::<u32, u32>("first")))
            .map(|value| Ok(value + 1));
        let err = transform.apply(1).unwrap_err();
        assert!(err.to_string().ends_with("first"));
    }

    #[test]
    fn json_object_rejects_arrays() {
        let err = Transform::<Bytes, Map<String, Value>>::json_object()
            .apply(Bytes::from_static(b"[1,2]"))
            .unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));

        let map = Transform::<Bytes, Map<String, Value>>::json_object()
            .apply(Bytes::from_static(br#"{"id":1}"#))
            .unwrap();
        assert_eq!(map["id"], 1);
    }

    #[test]
    fn json_value_accepts_fragments() {
        let value = Transform::<Bytes, Value>::json_value()
            .apply(Bytes::from_static(b"42"))
            .unwrap();
        assert_eq!(value, Value::from(42));
    }

    #[test]
    fn decode_ext_on_bytes() {
        let bytes = Bytes::from_static(br#"{"id":2,"title":"x"}"#);
        let post: Post = bytes.decode_json().unwrap();
        assert_eq!(post.id, 2);

        let title = bytes
            .decode_with(&Transform::<Bytes, Post>::json().map(|post| Ok(post.title)))
            .unwrap();
        assert_eq!(title, "x");
    }
}
