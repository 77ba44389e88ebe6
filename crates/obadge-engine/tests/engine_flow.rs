//! # End-to-End Engine Flows
//!
//! Exercises the full issue → verify → revoke → re-verify lifecycle across
//! both document formats against the in-memory store, the way a deployment
//! drives the engine behind its transport layer.

use serde_json::json;

use obadge_core::{AchievementId, IssuerId, StatusIndex};
use obadge_crypto::MasterKey;
use obadge_engine::{
    BadgeEngine, BadgeStore, EngineConfig, IssueRequest, MemoryStore, ProofEngine,
};
use obadge_vc::{AchievementRecord, CredentialFormat, IssuerRecord, RecipientIdentity};

const BASE_URL: &str = "https://badges.example.edu/status";

fn issuer_id() -> IssuerId {
    IssuerId::new("https://badges.example.edu/issuer").unwrap()
}

fn achievement_id() -> AchievementId {
    AchievementId::new("https://badges.example.edu/badges/gold-star").unwrap()
}

/// An engine seeded with one issuer and one achievement.
fn engine() -> BadgeEngine<MemoryStore> {
    let store = MemoryStore::new();
    let mut issuer = IssuerRecord::new(issuer_id(), "Example University");
    issuer.url = Some("https://example.edu".to_string());
    store.put_issuer(&issuer).unwrap();
    store
        .put_achievement(&AchievementRecord {
            id: achievement_id(),
            issuer: issuer_id(),
            name: "Gold Star".to_string(),
            description: "Awarded for excellence".to_string(),
            criteria_url: None,
            criteria_narrative: Some("Complete all modules".to_string()),
            image: Some("https://badges.example.edu/badges/gold-star.png".to_string()),
            tags: vec![],
        })
        .unwrap();

    BadgeEngine::new(
        store,
        EngineConfig {
            master_key: MasterKey::generate(),
            status_list_base_url: BASE_URL.to_string(),
        },
    )
}

fn request(format: CredentialFormat) -> IssueRequest {
    IssueRequest {
        credential_id: None,
        achievement: achievement_id(),
        recipient: RecipientIdentity::hashed("email", "alice@example.org", "s4lt"),
        expires: None,
        format,
    }
}

// Scenario 1: issue a verifiable credential — index 0, signed, verifies.
#[test]
fn test_issue_verifiable_credential_verifies() {
    let engine = engine();
    let issued = engine.issue(request(CredentialFormat::Verifiable)).unwrap();

    assert_eq!(issued.record.status_index, Some(StatusIndex::new(0)));
    assert_eq!(
        issued.document["credentialStatus"]["statusListIndex"],
        json!("0")
    );
    assert_eq!(issued.document["proof"]["cryptosuite"], "eddsa-jcs-2022");

    let report = engine.verify_value(&issued.document);
    assert!(report.valid, "errors: {:?}", report.errors);
    assert!(report.checks.structure);
    assert!(report.checks.signature);
    assert!(report.checks.revocation);
    assert!(report.errors.is_empty());

    // Verification by reference reaches the same stored document.
    let by_id = engine.verify_by_id(&issued.record.id);
    assert!(by_id.valid, "errors: {:?}", by_id.errors);
}

// Scenario 2: a post-signature mutation flips the signature check.
#[test]
fn test_tampered_credential_fails_signature_only() {
    let engine = engine();
    let issued = engine.issue(request(CredentialFormat::Verifiable)).unwrap();

    let mut tampered = issued.document.clone();
    tampered["credentialSubject"]["achievement"]["name"] = json!("Platinum Star");

    let report = engine.verify_value(&tampered);
    assert!(!report.valid);
    assert!(report.checks.structure);
    assert!(!report.checks.signature);
    assert!(report.checks.revocation);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].starts_with("signature:"));
}

// Scenario 3: revocation flips the bit, re-signs the list, and the new
// list itself verifies.
#[test]
fn test_revocation_updates_and_resigns_status_list() {
    let engine = engine();
    let issued = engine.issue(request(CredentialFormat::Verifiable)).unwrap();
    let index = issued.record.status_index.unwrap();

    let list_before = engine.status_list_credential(&issuer_id()).unwrap();
    assert!(!engine.is_revoked(&issuer_id(), index).unwrap());

    engine
        .revoke(&issued.record.id, Some("policy violation"))
        .unwrap();

    assert!(engine.is_revoked(&issuer_id(), index).unwrap());
    let record = engine.store().credential(&issued.record.id).unwrap().unwrap();
    assert!(record.revoked);
    assert_eq!(record.revocation_reason.as_deref(), Some("policy violation"));

    let list_after = engine.status_list_credential(&issuer_id()).unwrap();
    assert_ne!(
        list_before["proof"]["proofValue"],
        list_after["proof"]["proofValue"]
    );
    let report = engine.verify_value(&list_after);
    assert!(report.checks.signature, "errors: {:?}", report.errors);

    // The revoked credential now fails exactly the revocation check.
    let report = engine.verify_value(&issued.document);
    assert!(!report.valid);
    assert!(report.checks.structure);
    assert!(report.checks.signature);
    assert!(!report.checks.revocation);
    assert!(report.errors[0].starts_with("revocation:"));
}

// Scenario 4: the next issuance gets the next index, unrevoked.
#[test]
fn test_second_issuance_gets_next_index() {
    let engine = engine();
    let first = engine.issue(request(CredentialFormat::Verifiable)).unwrap();
    engine.revoke(&first.record.id, None).unwrap();

    let second = engine.issue(request(CredentialFormat::Verifiable)).unwrap();
    assert_eq!(second.record.status_index, Some(StatusIndex::new(1)));
    assert!(!engine.is_revoked(&issuer_id(), StatusIndex::new(1)).unwrap());
    assert!(engine.is_revoked(&issuer_id(), StatusIndex::new(0)).unwrap());

    let report = engine.verify_value(&second.document);
    assert!(report.valid, "errors: {:?}", report.errors);
}

// Scenario 5: the same record in the legacy format — no proof, signature
// trivially true.
#[test]
fn test_legacy_issuance_has_no_proof_and_verifies() {
    let engine = engine();
    let issued = engine.issue(request(CredentialFormat::Legacy)).unwrap();

    assert!(issued.document.get("proof").is_none());
    assert!(issued.document.get("credentialStatus").is_none());
    assert!(issued.record.status_index.is_none());
    assert_eq!(issued.document["verification"]["type"], "hosted");

    let report = engine.verify_value(&issued.document);
    assert!(report.valid, "errors: {:?}", report.errors);
    assert!(report.checks.signature);
}

#[test]
fn test_legacy_revocation_via_hosted_record() {
    let engine = engine();
    let issued = engine.issue(request(CredentialFormat::Legacy)).unwrap();
    engine.revoke(&issued.record.id, Some("issued in error")).unwrap();

    // The re-served document now carries the revocation flag.
    let record = engine.store().credential(&issued.record.id).unwrap().unwrap();
    let document = record.document.unwrap();
    assert_eq!(document["revoked"], json!(true));
    assert_eq!(document["revocationReason"], json!("issued in error"));

    // Verifying the originally issued (pre-revocation) document still fails
    // revocation: the stored record is authoritative for hosted assertions.
    let report = engine.verify_value(&issued.document);
    assert!(!report.valid);
    assert!(!report.checks.revocation);
    assert!(report.errors[0].contains("issued in error"));

    engine.reinstate(&issued.record.id).unwrap();
    let report = engine.verify_value(&issued.document);
    assert!(report.valid, "errors: {:?}", report.errors);
}

#[test]
fn test_both_formats_project_same_record() {
    let engine = engine();
    let legacy = engine.issue(request(CredentialFormat::Legacy)).unwrap();
    let verifiable = engine.issue(request(CredentialFormat::Verifiable)).unwrap();

    assert_eq!(
        legacy.document["badge"]["name"],
        verifiable.document["credentialSubject"]["achievement"]["name"]
    );
    assert_eq!(
        legacy.document["recipient"]["identity"],
        verifiable.document["credentialSubject"]["identifier"][0]["identityHash"]
    );
}

#[test]
fn test_issuers_do_not_share_status_lists() {
    let engine = engine();
    let other_issuer = IssuerId::new("https://other.example/issuer").unwrap();
    let other_achievement = AchievementId::new("https://other.example/badges/star").unwrap();
    engine
        .store()
        .put_issuer(&IssuerRecord::new(other_issuer.clone(), "Other College"))
        .unwrap();
    engine
        .store()
        .put_achievement(&AchievementRecord {
            id: other_achievement.clone(),
            issuer: other_issuer.clone(),
            name: "Star".to_string(),
            description: "A star".to_string(),
            criteria_url: None,
            criteria_narrative: None,
            image: None,
            tags: vec![],
        })
        .unwrap();

    let a = engine.issue(request(CredentialFormat::Verifiable)).unwrap();
    let b = engine
        .issue(IssueRequest {
            credential_id: None,
            achievement: other_achievement,
            recipient: RecipientIdentity::plaintext("email", "bob@example.org"),
            expires: None,
            format: CredentialFormat::Verifiable,
        })
        .unwrap();

    // Independent counters: both issuers start at index 0.
    assert_eq!(a.record.status_index, Some(StatusIndex::new(0)));
    assert_eq!(b.record.status_index, Some(StatusIndex::new(0)));

    // Revoking one issuer's credential does not touch the other's list.
    engine.revoke(&a.record.id, None).unwrap();
    assert!(engine.is_revoked(&issuer_id(), StatusIndex::new(0)).unwrap());
    assert!(!engine.is_revoked(&other_issuer, StatusIndex::new(0)).unwrap());

    let report = engine.verify_value(&b.document);
    assert!(report.valid, "errors: {:?}", report.errors);
}

#[test]
fn test_cross_engine_verification_shares_storage_not_keys() {
    // A verifier process with the same store but a different master key can
    // still verify: verification touches only public material.
    let engine = engine();
    let issued = engine.issue(request(CredentialFormat::Verifiable)).unwrap();

    let store = engine.store();
    let other_master = MasterKey::generate();
    let proofs = ProofEngine::new(store, &other_master);
    assert!(proofs.verify(&issued.document));
}
