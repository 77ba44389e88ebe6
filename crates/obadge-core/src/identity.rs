//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers in the engine. These prevent
//! accidental identifier confusion — you cannot pass an `AchievementId` where
//! an `IssuerId` is expected, and a `StatusIndex` is not just a number.
//!
//! Issuer and credential identifiers are URLs or DIDs, per the Open Badges
//! conventions; constructors validate the scheme rather than accepting bare
//! strings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Identifier for an issuing organization: an HTTPS URL or a DID.
///
/// An issuer's id doubles as the base of its key's `verificationMethod`
/// reference (`{id}#key-0`) and of its status list URL, so the invariant that
/// it is a resolvable URI matters beyond cosmetics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuerId(String);

/// Identifier for a badge template (achievement / badge class).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(String);

/// Identifier for an issued credential (assertion).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

/// A credential's position in its issuer's revocation bitstring.
///
/// Allocated monotonically per issuer and never reused, even after
/// revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusIndex(u64);

fn require_uri(kind: &'static str, s: &str) -> Result<(), ValidationError> {
    let ok = s.starts_with("https://") || s.starts_with("http://") || s.starts_with("did:");
    if s.is_empty() || !ok {
        return Err(ValidationError::MalformedField {
            field: kind.into(),
            reason: format!("expected an http(s) URL or DID, got {s:?}"),
        });
    }
    Ok(())
}

impl IssuerId {
    /// Validate and wrap an issuer identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or is neither an http(s) URL
    /// nor a DID.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        require_uri("issuer.id", &s)?;
        Ok(Self(s))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AchievementId {
    /// Validate and wrap an achievement identifier.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        require_uri("achievement.id", &s)?;
        Ok(Self(s))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CredentialId {
    /// Validate and wrap a credential identifier.
    ///
    /// Credential ids additionally admit `urn:` identifiers (commonly
    /// `urn:uuid:…` for credentials that are not hosted at a URL).
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.starts_with("urn:") {
            return Ok(Self(s));
        }
        require_uri("credential.id", &s)?;
        Ok(Self(s))
    }

    /// Generate a fresh `urn:uuid:` credential identifier.
    pub fn new_urn() -> Self {
        Self(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl StatusIndex {
    /// Wrap a raw index.
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// The raw index value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for IssuerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for AchievementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for StatusIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
