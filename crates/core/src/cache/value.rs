//! The value codec used between callers and the store.
//!
//! The store only holds strings. Callers hand the facade either plain
//! scalars, which are stored verbatim, or structured JSON, which is stored
//! as its compact encoding. Reads reverse this: anything that parses as JSON
//! comes back structured, everything else comes back as the raw string.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{CacheError, Result};

/// A value as written to or read from the cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// A plain string (numbers are carried in their decimal form).
    Scalar(String),
    /// A JSON document, stored as its compact encoding.
    Structured(Value),
}

impl CacheValue {
    /// Builds a structured value from anything serializable.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Structured)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Decodes a raw stored string.
    ///
    /// Strings that parse as JSON become [`CacheValue::Structured`]; note that
    /// this includes bare numbers and `true`/`false`/`null`. Anything else is
    /// kept as [`CacheValue::Scalar`].
    pub fn decode(raw: String) -> Self {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Self::Structured(value),
            Err(_) => Self::Scalar(raw),
        }
    }

    /// Wraps a raw stored string without attempting to decode it.
    pub fn raw(raw: String) -> Self {
        Self::Scalar(raw)
    }

    /// Encodes the value into the string the store will hold.
    pub fn encode(&self) -> Result<String> {
        match self {
            Self::Scalar(s) => Ok(s.clone()),
            Self::Structured(value) => {
                serde_json::to_string(value).map_err(|e| CacheError::Serialization(e.to_string()))
            }
        }
    }

    /// Returns the string if this is a scalar, or a structured JSON string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Structured(Value::String(s)) => Some(s),
            Self::Structured(_) => None,
        }
    }

    /// Returns the JSON document if this is a structured value.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Scalar(_) => None,
            Self::Structured(value) => Some(value),
        }
    }

    /// Converts into a JSON value, wrapping scalars as JSON strings.
    pub fn into_json(self) -> Value {
        match self {
            Self::Scalar(s) => Value::String(s),
            Self::Structured(value) => value,
        }
    }

    /// Deserializes the value into a typed structure.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.clone().into_json())
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Value> for CacheValue {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

macro_rules! scalar_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for CacheValue {
                fn from(value: $t) -> Self {
                    Self::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_number!(i32, i64, u32, u64, usize, f64);

impl std::fmt::Display for CacheValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(s) => f.write_str(s),
            Self::Structured(value) => write!(f, "{}", value),
        }
    }
}
