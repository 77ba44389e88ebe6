//! # Credential Builder
//!
//! Maps a stored credential record plus its achievement and issuer records
//! into the requested document format. The two projections are semantically
//! equivalent — same achievement, same recipient, same issuance time — and
//! differ only in envelope: the legacy form has no proof and no status
//! linkage, the verifiable form has both.
//!
//! The builder is pure: it allocates nothing and signs nothing. Status-list
//! index allocation happens upstream (the verifiable format cannot be built
//! without an assigned entry), and proof attachment happens downstream.

use obadge_core::error::ValidationError;
use obadge_core::StatusIndex;

use crate::credential::{
    Achievement, AchievementSubject, CredentialStatus, Image, IssuerProfile,
    VerifiableCredential, CONTEXT_OB_V3, CONTEXT_VC_V2, TYPE_OPEN_BADGE_CREDENTIAL,
    TYPE_STATUS_LIST_ENTRY, TYPE_VERIFIABLE_CREDENTIAL,
};
use crate::document::{AnyCredential, CredentialFormat};
use crate::legacy::{
    Assertion, BadgeClass, Criteria, Profile, RecipientObject, VerificationObject, CONTEXT_OB_V2,
};
use crate::records::{AchievementRecord, CredentialRecord, IssuerRecord};

/// The status-list placement a verifiable credential is built against.
#[derive(Debug, Clone)]
pub struct StatusEntryParams {
    /// The credential's bit position in the issuer's list.
    pub index: StatusIndex,
    /// URL of the wrapping status list credential.
    pub list_credential: String,
}

/// Build a credential document in the requested format.
///
/// # Errors
///
/// - [`ValidationError::MalformedField`] if the records disagree about
///   ownership (the achievement or credential belongs to a different
///   issuer).
/// - [`ValidationError::MissingField`] if the verifiable format is requested
///   without a status entry — the status linkage is mandatory there.
pub fn build(
    record: &CredentialRecord,
    achievement: &AchievementRecord,
    issuer: &IssuerRecord,
    format: CredentialFormat,
    status: Option<&StatusEntryParams>,
) -> Result<AnyCredential, ValidationError> {
    if achievement.issuer != issuer.id {
        return Err(ValidationError::MalformedField {
            field: "achievement.issuer".into(),
            reason: format!(
                "achievement {} belongs to {}, not {}",
                achievement.id, achievement.issuer, issuer.id
            ),
        });
    }
    if record.issuer != issuer.id {
        return Err(ValidationError::MalformedField {
            field: "credential.issuer".into(),
            reason: format!(
                "credential {} belongs to {}, not {}",
                record.id, record.issuer, issuer.id
            ),
        });
    }

    match format {
        CredentialFormat::Legacy => Ok(AnyCredential::Legacy(build_legacy(
            record,
            achievement,
            issuer,
        ))),
        CredentialFormat::Verifiable => {
            let status = status.ok_or(ValidationError::MissingField {
                document: "OpenBadgeCredential",
                field: "credentialStatus",
            })?;
            Ok(AnyCredential::Verifiable(build_verifiable(
                record,
                achievement,
                issuer,
                status,
            )))
        }
    }
}

fn criteria(achievement: &AchievementRecord) -> Criteria {
    Criteria {
        id: achievement.criteria_url.clone(),
        narrative: achievement.criteria_narrative.clone(),
    }
}

fn build_legacy(
    record: &CredentialRecord,
    achievement: &AchievementRecord,
    issuer: &IssuerRecord,
) -> Assertion {
    Assertion {
        context: CONTEXT_OB_V2.to_string(),
        id: record.id.as_str().to_string(),
        assertion_type: "Assertion".to_string(),
        recipient: RecipientObject {
            recipient_type: record.recipient.identity_type.clone(),
            hashed: record.recipient.hashed,
            identity: record.recipient.identity.clone(),
            salt: record.recipient.salt.clone(),
        },
        badge: BadgeClass {
            id: achievement.id.as_str().to_string(),
            badge_type: "BadgeClass".to_string(),
            name: achievement.name.clone(),
            description: achievement.description.clone(),
            image: achievement.image.clone(),
            criteria: criteria(achievement),
            issuer: Profile {
                id: issuer.id.as_str().to_string(),
                profile_type: "Issuer".to_string(),
                name: issuer.name.clone(),
                url: issuer.url.clone(),
                email: issuer.email.clone(),
            },
            tags: achievement.tags.clone(),
        },
        verification: VerificationObject::hosted(),
        issued_on: record.issued_on,
        expires: record.expires,
        revoked: record.revoked.then_some(true),
        revocation_reason: record.revocation_reason.clone(),
    }
}

fn build_verifiable(
    record: &CredentialRecord,
    achievement: &AchievementRecord,
    issuer: &IssuerRecord,
    status: &StatusEntryParams,
) -> VerifiableCredential {
    // Map the recipient into OB3's identifier convention.
    let identity_type = match record.recipient.identity_type.as_str() {
        "email" => "emailAddress".to_string(),
        other => other.to_string(),
    };

    VerifiableCredential {
        context: vec![CONTEXT_VC_V2.to_string(), CONTEXT_OB_V3.to_string()],
        id: record.id.as_str().to_string(),
        credential_type: vec![
            TYPE_VERIFIABLE_CREDENTIAL.to_string(),
            TYPE_OPEN_BADGE_CREDENTIAL.to_string(),
        ],
        issuer: IssuerProfile {
            id: issuer.id.as_str().to_string(),
            profile_type: "Profile".to_string(),
            name: issuer.name.clone(),
            url: issuer.url.clone(),
            email: issuer.email.clone(),
        },
        valid_from: record.issued_on,
        valid_until: record.expires,
        credential_subject: AchievementSubject {
            id: None,
            subject_type: vec!["AchievementSubject".to_string()],
            identifier: vec![crate::credential::IdentityObject {
                identity_object_type: "IdentityObject".to_string(),
                hashed: record.recipient.hashed,
                identity_hash: record.recipient.identity.clone(),
                identity_type,
                salt: record.recipient.salt.clone(),
            }],
            achievement: Achievement {
                id: achievement.id.as_str().to_string(),
                achievement_type: vec!["Achievement".to_string()],
                name: achievement.name.clone(),
                description: achievement.description.clone(),
                criteria: criteria(achievement),
                image: achievement.image.clone().map(|id| Image {
                    id,
                    image_type: "Image".to_string(),
                }),
                tags: achievement.tags.clone(),
            },
        },
        credential_status: Some(CredentialStatus {
            id: format!("{}#{}", status.list_credential, status.index),
            status_type: TYPE_STATUS_LIST_ENTRY.to_string(),
            status_purpose: "revocation".to_string(),
            status_list_index: status.index.to_string(),
            status_list_credential: status.list_credential.clone(),
        }),
        proof: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obadge_core::{AchievementId, CredentialId, IssuerId, Timestamp};
    use crate::records::RecipientIdentity;

    fn fixtures() -> (CredentialRecord, AchievementRecord, IssuerRecord) {
        let issuer_id = IssuerId::new("https://badges.example.edu/issuer").unwrap();
        let achievement_id =
            AchievementId::new("https://badges.example.edu/badges/gold-star").unwrap();
        let issuer = IssuerRecord::new(issuer_id.clone(), "Example University");
        let achievement = AchievementRecord {
            id: achievement_id.clone(),
            issuer: issuer_id.clone(),
            name: "Gold Star".to_string(),
            description: "Awarded for excellence".to_string(),
            criteria_url: None,
            criteria_narrative: Some("Complete all modules".to_string()),
            image: Some("https://badges.example.edu/badges/gold-star.png".to_string()),
            tags: vec!["excellence".to_string()],
        };
        let record = CredentialRecord {
            id: CredentialId::new("https://badges.example.edu/assertions/42").unwrap(),
            issuer: issuer_id,
            achievement: achievement_id,
            recipient: RecipientIdentity::hashed("email", "alice@example.org", "s4lt"),
            issued_on: Timestamp::parse("2026-02-01T09:00:00Z").unwrap(),
            expires: None,
            revoked: false,
            revocation_reason: None,
            status_index: Some(StatusIndex::new(0)),
            document: None,
        };
        (record, achievement, issuer)
    }

    fn status() -> StatusEntryParams {
        StatusEntryParams {
            index: StatusIndex::new(0),
            list_credential: "https://badges.example.edu/status/issuer".to_string(),
        }
    }

    #[test]
    fn test_legacy_build() {
        let (record, achievement, issuer) = fixtures();
        let doc = build(&record, &achievement, &issuer, CredentialFormat::Legacy, None).unwrap();
        let AnyCredential::Legacy(assertion) = doc else {
            panic!("expected legacy assertion");
        };
        assert_eq!(assertion.context, CONTEXT_OB_V2);
        assert_eq!(assertion.badge.name, "Gold Star");
        assert_eq!(assertion.verification.verification_type, "hosted");
        assert!(assertion.revoked.is_none());
    }

    #[test]
    fn test_verifiable_build() {
        let (record, achievement, issuer) = fixtures();
        let doc = build(
            &record,
            &achievement,
            &issuer,
            CredentialFormat::Verifiable,
            Some(&status()),
        )
        .unwrap();
        let AnyCredential::Verifiable(vc) = doc else {
            panic!("expected verifiable credential");
        };
        assert_eq!(vc.credential_type[1], TYPE_OPEN_BADGE_CREDENTIAL);
        let cs = vc.credential_status.unwrap();
        assert_eq!(cs.status_list_index, "0");
        assert_eq!(cs.id, "https://badges.example.edu/status/issuer#0");
        assert!(vc.proof.is_none());
    }

    #[test]
    fn test_formats_project_same_record() {
        let (record, achievement, issuer) = fixtures();
        let legacy = build(&record, &achievement, &issuer, CredentialFormat::Legacy, None).unwrap();
        let verifiable = build(
            &record,
            &achievement,
            &issuer,
            CredentialFormat::Verifiable,
            Some(&status()),
        )
        .unwrap();
        let (AnyCredential::Legacy(a), AnyCredential::Verifiable(vc)) = (legacy, verifiable)
        else {
            panic!("format mismatch");
        };
        assert_eq!(a.badge.name, vc.credential_subject.achievement.name);
        assert_eq!(a.issued_on, vc.valid_from);
        assert_eq!(
            a.recipient.identity,
            vc.credential_subject.identifier[0].identity_hash
        );
    }

    #[test]
    fn test_verifiable_requires_status_entry() {
        let (record, achievement, issuer) = fixtures();
        let err = build(
            &record,
            &achievement,
            &issuer,
            CredentialFormat::Verifiable,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field, .. } if field == "credentialStatus"));
    }

    #[test]
    fn test_cross_issuer_achievement_rejected() {
        let (record, mut achievement, issuer) = fixtures();
        achievement.issuer = IssuerId::new("https://other.example/issuer").unwrap();
        let err =
            build(&record, &achievement, &issuer, CredentialFormat::Legacy, None).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedField { .. }));
    }
}
