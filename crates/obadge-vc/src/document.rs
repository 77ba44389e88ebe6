//! # AnyCredential — Tagged Union Over Both Formats
//!
//! The two document generations are distinct shapes with distinct rules.
//! Rather than one loosely-typed object and duck-typed field probing,
//! consumers get a sum type and branch on the tag. Classification of raw
//! JSON inspects the declared `type` — the format a document *claims* to be
//! decides which rules it is held to.

use obadge_core::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credential::{VerifiableCredential, TYPE_VERIFIABLE_CREDENTIAL};
use crate::legacy::Assertion;

/// Which document generation a credential is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialFormat {
    /// OB2 hosted assertion — no embedded proof.
    Legacy,
    /// OB3 verifiable credential — embedded proof and status linkage.
    Verifiable,
}

impl std::fmt::Display for CredentialFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Legacy => "ob2",
            Self::Verifiable => "ob3",
        })
    }
}

/// A credential document in either format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyCredential {
    /// OB3 verifiable credential.
    Verifiable(VerifiableCredential),
    /// OB2 hosted assertion.
    Legacy(Assertion),
}

impl AnyCredential {
    /// The format tag of this document.
    pub fn format(&self) -> CredentialFormat {
        match self {
            Self::Verifiable(_) => CredentialFormat::Verifiable,
            Self::Legacy(_) => CredentialFormat::Legacy,
        }
    }

    /// Render as a `serde_json::Value` for signing or transport.
    ///
    /// # Errors
    ///
    /// Serialization failures only, which for these types means a bug.
    pub fn to_value(&self) -> Result<Value, ValidationError> {
        serde_json::to_value(self).map_err(|e| ValidationError::MalformedField {
            field: "document".into(),
            reason: e.to_string(),
        })
    }
}

/// Classify a raw document by its declared `type`.
///
/// A `type` containing `"VerifiableCredential"` (string or array) is OB3;
/// `"Assertion"` is OB2. Anything else is unrecognized — including documents
/// with no `type` at all.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownFormat`] naming what was found.
pub fn classify(document: &Value) -> Result<CredentialFormat, ValidationError> {
    let declared = match document.get("type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => vec![],
    };

    if declared.contains(&TYPE_VERIFIABLE_CREDENTIAL) {
        Ok(CredentialFormat::Verifiable)
    } else if declared.contains(&"Assertion") {
        Ok(CredentialFormat::Legacy)
    } else {
        Err(ValidationError::UnknownFormat(format!(
            "declared type {declared:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_verifiable() {
        let doc = json!({"type": ["VerifiableCredential", "OpenBadgeCredential"]});
        assert_eq!(classify(&doc).unwrap(), CredentialFormat::Verifiable);
    }

    #[test]
    fn test_classify_legacy() {
        let doc = json!({"type": "Assertion"});
        assert_eq!(classify(&doc).unwrap(), CredentialFormat::Legacy);
    }

    #[test]
    fn test_classify_unknown() {
        assert!(classify(&json!({"type": "Diploma"})).is_err());
        assert!(classify(&json!({})).is_err());
        assert!(classify(&json!({"type": 7})).is_err());
    }

    #[test]
    fn test_format_display() {
        assert_eq!(CredentialFormat::Legacy.to_string(), "ob2");
        assert_eq!(CredentialFormat::Verifiable.to_string(), "ob3");
    }
}
