//! # Storage Records
//!
//! The records the storage collaborator persists: issuers (with their sealed
//! key material), achievements (badge templates), and issued credentials.
//! These are the engine's inputs; the documents in [`crate::legacy`] and
//! [`crate::credential`] are projections of them.
//!
//! An `AchievementRecord` is immutable once any credential references it. A
//! `CredentialRecord` mutates only through revocation — it is never deleted,
//! so the verifiability of past issuances survives.

use obadge_core::{hash_identity, AchievementId, CredentialId, IssuerId, StatusIndex, Timestamp};
use obadge_crypto::SealedKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An issuing organization and its key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerRecord {
    /// The issuer identifier (URL or DID).
    pub id: IssuerId,

    /// Organization name.
    pub name: String,

    /// Organization homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// The active public key, Multikey-encoded. `None` until the first
    /// signing operation provisions a key pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    /// The active private key, sealed under the process master key. Never
    /// present without `public_key_multibase`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sealed_key: Option<SealedKey>,
}

impl IssuerRecord {
    /// A new issuer with no key material yet.
    pub fn new(id: IssuerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: None,
            email: None,
            public_key_multibase: None,
            sealed_key: None,
        }
    }

    /// The `verificationMethod` reference proofs use for this issuer's key.
    ///
    /// Stable for the life of the key: the issuer id plus a `#key-0`
    /// fragment, so a verifier can strip the fragment and resolve this
    /// record.
    pub fn verification_method(&self) -> String {
        format!("{}#key-0", self.id)
    }
}

/// A badge template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementRecord {
    /// The achievement identifier (URL).
    pub id: AchievementId,

    /// The issuer that owns this template.
    pub issuer: IssuerId,

    /// Display name.
    pub name: String,

    /// What the achievement represents.
    pub description: String,

    /// URL of a criteria page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_url: Option<String>,

    /// Narrative criteria.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_narrative: Option<String>,

    /// Badge image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Optional tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// How a credential's recipient is identified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientIdentity {
    /// The identity kind, e.g. `"email"`.
    pub identity_type: String,

    /// The stored identity value: plaintext, or `sha256$…` when hashed.
    pub identity: String,

    /// Whether `identity` is a salted hash.
    pub hashed: bool,

    /// The salt, when hashed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl RecipientIdentity {
    /// An openly-stated identity.
    pub fn plaintext(identity_type: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            identity_type: identity_type.into(),
            identity: identity.into(),
            hashed: false,
            salt: None,
        }
    }

    /// A salted-hashed identity; the plaintext is discarded here and only
    /// the hash is stored.
    pub fn hashed(
        identity_type: impl Into<String>,
        identity: &str,
        salt: impl Into<String>,
    ) -> Self {
        let salt = salt.into();
        Self {
            identity_type: identity_type.into(),
            identity: hash_identity(identity, &salt),
            hashed: true,
            salt: Some(salt),
        }
    }
}

/// An issued credential (assertion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// The credential identifier.
    pub id: CredentialId,

    /// The issuing organization.
    pub issuer: IssuerId,

    /// The achievement this credential asserts.
    pub achievement: AchievementId,

    /// Who earned it.
    pub recipient: RecipientIdentity,

    /// When it was awarded.
    pub issued_on: Timestamp,

    /// Optional expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<Timestamp>,

    /// Whether the credential is currently revoked.
    pub revoked: bool,

    /// Why, when revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,

    /// The credential's slot in the issuer's status list. Assigned at most
    /// once; `(issuer, index)` is never reused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_index: Option<StatusIndex>,

    /// The document as issued (signed, for the verifiable format), so the
    /// credential can be re-served and verified by reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}
