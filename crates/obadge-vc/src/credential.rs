//! # Verifiable Credentials (OB3)
//!
//! The W3C Verifiable-Credential badge format: a typed credential envelope
//! wrapping an `AchievementSubject`, carrying an embedded
//! `DataIntegrityProof` and a `credentialStatus` entry that points at the
//! issuer's bitstring status list.
//!
//! The envelope structure is rigid; `credentialSubject.achievement` carries
//! the open-ended achievement description.

use obadge_core::Timestamp;
use serde::{Deserialize, Serialize};

use crate::legacy::Criteria;
use crate::proof::Proof;

/// JSON-LD context of the W3C VC Data Model v2.
pub const CONTEXT_VC_V2: &str = "https://www.w3.org/ns/credentials/v2";

/// JSON-LD context of Open Badges v3.
pub const CONTEXT_OB_V3: &str = "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.3.json";

/// Base credential type.
pub const TYPE_VERIFIABLE_CREDENTIAL: &str = "VerifiableCredential";

/// Badge credential type.
pub const TYPE_OPEN_BADGE_CREDENTIAL: &str = "OpenBadgeCredential";

/// The `credentialStatus.type` for bitstring status list entries.
pub const TYPE_STATUS_LIST_ENTRY: &str = "BitstringStatusListEntry";

/// An issued badge as a W3C Verifiable Credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// The JSON-LD context URIs, VC Data Model first.
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The credential identifier (URL or URN).
    pub id: String,

    /// The credential types, `["VerifiableCredential", "OpenBadgeCredential"]`.
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,

    /// The issuing organization.
    pub issuer: IssuerProfile,

    /// When the credential becomes valid (the issuance instant).
    pub valid_from: Timestamp,

    /// When the credential ceases to be valid, if it expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<Timestamp>,

    /// The subject the badge is about.
    pub credential_subject: AchievementSubject,

    /// Revocation linkage into the issuer's status list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<CredentialStatus>,

    /// The embedded proof. Absent only between building and signing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// The issuing organization's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerProfile {
    /// The issuer identifier (URL or DID); base of the proof's
    /// `verificationMethod`.
    pub id: String,

    /// Always `"Profile"`.
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

/// The credential subject: who earned what.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementSubject {
    /// The subject's own identifier (a DID), when they have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always contains `"AchievementSubject"`.
    #[serde(rename = "type")]
    pub subject_type: Vec<String>,

    /// Recipient identity descriptors, possibly hashed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<IdentityObject>,

    /// The achievement being asserted.
    pub achievement: Achievement,
}

/// A recipient identity descriptor, openly stated or salted-hashed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityObject {
    /// Always `"IdentityObject"`.
    #[serde(rename = "type")]
    pub identity_object_type: String,

    /// Whether `identity_hash` is a salted hash or plaintext.
    pub hashed: bool,

    /// The identity value, `sha256$…` when hashed.
    pub identity_hash: String,

    /// The kind of identity, e.g. `"emailAddress"`.
    pub identity_type: String,

    /// The salt used when `hashed` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

/// The achievement (badge template) in OB3 form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// The achievement identifier (URL).
    pub id: String,

    /// Always contains `"Achievement"`.
    #[serde(rename = "type")]
    pub achievement_type: Vec<String>,

    /// Display name.
    pub name: String,

    /// What the achievement represents.
    pub description: String,

    /// How it is earned.
    pub criteria: Criteria,

    /// Badge image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    /// Optional tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// An image reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Image URL.
    pub id: String,

    /// Always `"Image"`.
    #[serde(rename = "type")]
    pub image_type: String,
}

/// A `BitstringStatusListEntry`: where in which list this credential's
/// revocation bit lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    /// Entry identifier: the list credential URL with the index as fragment.
    pub id: String,

    /// Always [`TYPE_STATUS_LIST_ENTRY`].
    #[serde(rename = "type")]
    pub status_type: String,

    /// The purpose of the bit, `"revocation"` for this engine.
    pub status_purpose: String,

    /// The credential's bit position, serialized as a string per the
    /// Bitstring Status List specification.
    pub status_list_index: String,

    /// URL of the wrapping status list credential.
    pub status_list_credential: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VerifiableCredential {
        VerifiableCredential {
            context: vec![CONTEXT_VC_V2.to_string(), CONTEXT_OB_V3.to_string()],
            id: "urn:uuid:0b0f…".to_string(),
            credential_type: vec![
                TYPE_VERIFIABLE_CREDENTIAL.to_string(),
                TYPE_OPEN_BADGE_CREDENTIAL.to_string(),
            ],
            issuer: IssuerProfile {
                id: "https://badges.example.edu/issuer".to_string(),
                profile_type: "Profile".to_string(),
                name: "Example University".to_string(),
                url: None,
                email: None,
            },
            valid_from: Timestamp::parse("2026-02-01T09:00:00Z").unwrap(),
            valid_until: None,
            credential_subject: AchievementSubject {
                id: None,
                subject_type: vec!["AchievementSubject".to_string()],
                identifier: vec![IdentityObject {
                    identity_object_type: "IdentityObject".to_string(),
                    hashed: true,
                    identity_hash: "sha256$abc".to_string(),
                    identity_type: "emailAddress".to_string(),
                    salt: Some("s4lt".to_string()),
                }],
                achievement: Achievement {
                    id: "https://badges.example.edu/badges/gold-star".to_string(),
                    achievement_type: vec!["Achievement".to_string()],
                    name: "Gold Star".to_string(),
                    description: "Awarded for excellence".to_string(),
                    criteria: Criteria {
                        id: None,
                        narrative: Some("Complete all modules".to_string()),
                    },
                    image: None,
                    tags: vec![],
                },
            },
            credential_status: Some(CredentialStatus {
                id: "https://badges.example.edu/status/issuer#0".to_string(),
                status_type: TYPE_STATUS_LIST_ENTRY.to_string(),
                status_purpose: "revocation".to_string(),
                status_list_index: "0".to_string(),
                status_list_credential: "https://badges.example.edu/status/issuer".to_string(),
            }),
            proof: None,
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["@context"][0], CONTEXT_VC_V2);
        assert_eq!(value["type"][0], TYPE_VERIFIABLE_CREDENTIAL);
        assert_eq!(value["validFrom"], "2026-02-01T09:00:00Z");
        assert_eq!(value["credentialStatus"]["type"], TYPE_STATUS_LIST_ENTRY);
        assert_eq!(value["credentialStatus"]["statusListIndex"], "0");
        assert_eq!(
            value["credentialSubject"]["achievement"]["name"],
            "Gold Star"
        );
    }

    #[test]
    fn test_unsigned_credential_has_no_proof_key() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("proof").is_none());
    }

    #[test]
    fn test_roundtrip() {
        let vc = sample();
        let json = serde_json::to_string(&vc).unwrap();
        let parsed: VerifiableCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, vc.id);
        assert_eq!(
            parsed.credential_status.unwrap().status_list_index,
            "0"
        );
    }
}
