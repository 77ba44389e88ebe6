//! # Legacy Assertions (OB2)
//!
//! The hosted-verification badge format: a flat JSON-LD `Assertion` with the
//! `BadgeClass` and issuer `Profile` embedded. The format carries no
//! embedded proof and no status-list linkage: a verifier trusts the document
//! because it is served from the issuer's own endpoint, and revocation lives
//! on the hosted record.

use obadge_core::Timestamp;
use serde::{Deserialize, Serialize};

/// JSON-LD context for OB2 documents.
pub const CONTEXT_OB_V2: &str = "https://w3id.org/openbadges/v2";

/// An issued badge in the legacy hosted format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    /// The JSON-LD context URI.
    #[serde(rename = "@context")]
    pub context: String,

    /// The assertion identifier (the URL it is hosted at, or a URN).
    pub id: String,

    /// Always `"Assertion"`.
    #[serde(rename = "type")]
    pub assertion_type: String,

    /// Who earned the badge.
    pub recipient: RecipientObject,

    /// The badge template, embedded.
    pub badge: BadgeClass,

    /// How a consumer verifies this assertion.
    pub verification: VerificationObject,

    /// When the badge was awarded.
    pub issued_on: Timestamp,

    /// Optional expiry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<Timestamp>,

    /// Set on assertions the issuer has revoked. Absent means not revoked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked: Option<bool>,

    /// Why the assertion was revoked, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
}

/// The recipient of an assertion, identified openly or as a salted hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientObject {
    /// The identity property type, e.g. `"email"`.
    #[serde(rename = "type")]
    pub recipient_type: String,

    /// Whether `identity` is a salted hash (`sha256$…`) or plaintext.
    pub hashed: bool,

    /// The identity value, hashed or plaintext per `hashed`.
    pub identity: String,

    /// The salt used when `hashed` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

/// A badge template in the legacy format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeClass {
    /// The badge class identifier (URL).
    pub id: String,

    /// Always `"BadgeClass"`.
    #[serde(rename = "type")]
    pub badge_type: String,

    /// Display name of the badge.
    pub name: String,

    /// What the badge represents.
    pub description: String,

    /// Image URL for the badge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// How the badge is earned.
    pub criteria: Criteria,

    /// The issuing organization, embedded.
    pub issuer: Profile,

    /// Optional tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Criteria for earning a badge: a URL, a narrative, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    /// URL of a criteria page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Markdown narrative describing the criteria.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// The issuing organization's profile in the legacy format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// The issuer identifier (URL or DID).
    pub id: String,

    /// Always `"Issuer"`.
    #[serde(rename = "type")]
    pub profile_type: String,

    /// Organization name.
    pub name: String,

    /// Organization homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Contact address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// How an assertion is verified. The legacy engine supports hosted
/// verification only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationObject {
    /// The verification type, `"hosted"` for documents this engine builds.
    #[serde(rename = "type")]
    pub verification_type: String,
}

impl VerificationObject {
    /// The hosted-verification marker.
    pub fn hosted() -> Self {
        Self {
            verification_type: "hosted".to_string(),
        }
    }
}
