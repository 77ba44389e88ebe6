//! # Canonical Serialization — JCS Canonicalization
//!
//! This module defines [`CanonicalBytes`], the sole construction path for the
//! bytes that get signed or digested anywhere in the engine.
//!
//! ## Security Invariant
//!
//! The inner `Vec<u8>` is private. The only way to construct `CanonicalBytes`
//! is through [`CanonicalBytes::new()`], which applies the type coercion
//! pipeline below and then serializes per JCS (RFC 8785). Proof generation and
//! proof verification therefore cannot disagree about what was signed: both
//! are forced through this one function, and a single field reordered or
//! re-rendered differently between the two would otherwise break every
//! signature in the system.
//!
//! ## Coercion Rules
//!
//! 1. Reject floats — they do not render identically across serializers.
//! 2. Normalize any string that parses as RFC 3339 to UTC ISO 8601 with `Z`
//!    suffix, truncated to seconds.
//! 3. Recurse into objects and arrays; booleans and null pass through.
//!
//! JCS then sorts object keys and emits compact separators with ES6 number
//! formatting.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization with the engine's type
/// coercion rules.
///
/// The inner `Vec<u8>` is private — downstream code cannot construct
/// `CanonicalBytes` except through [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// Applies the coercion pipeline and then JCS serialization. This is the
    /// ONLY way to construct `CanonicalBytes`; all signing and digesting in
    /// the engine flows through this constructor.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizationError::FloatRejected`] if the value contains
    /// a float, or [`CanonicalizationError::SerializationFailed`] on a
    /// serialization failure.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value)?;
        let bytes = serde_jcs::to_vec(&coerced)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for signing or digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the inner byte vector.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively coerce JSON values according to the canonicalization rules.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if n.is_f64() && !n.is_i64() && !n.is_u64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(Value::Number(n))
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
        Value::String(s) => {
            // Datetime normalization: any string that parses as RFC 3339 is
            // rendered as UTC with Z suffix, truncated to seconds. The same
            // instant must never canonicalize two different ways.
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                let utc = dt.with_timezone(&chrono::Utc);
                Ok(Value::String(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string()))
            } else {
                Ok(Value::String(s))
            }
        }
        // Bool and Null pass through unchanged.
        other => Ok(other),
    }
}
