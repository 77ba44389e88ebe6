//! # Verification Orchestrator
//!
//! Runs the three independent checks — structural, signature, revocation —
//! over a presented credential and aggregates the results. All three always
//! run: a verifier gets every failure named, not just the first, and the
//! orchestrator never returns an error — completely malformed input still
//! yields a definitive report.

use serde_json::Value;
use tracing::warn;

use obadge_core::{CredentialId, IssuerId, StatusIndex};
use obadge_crypto::MasterKey;
use obadge_vc::document::{classify, CredentialFormat};

use crate::proof::ProofEngine;
use crate::status::StatusListManager;
use crate::store::BadgeStore;

/// The outcome of each independent check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct VerificationChecks {
    /// Required context, type, and fields for the declared format.
    pub structure: bool,
    /// Embedded proof validity (trivially true for hosted documents).
    pub signature: bool,
    /// Not revoked per the issuer's status list (or local record).
    pub revocation: bool,
}

/// The aggregated verification result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VerificationReport {
    /// True iff every check passed.
    pub valid: bool,
    /// The individual check outcomes.
    pub checks: VerificationChecks,
    /// One human-readable entry per failing check, naming the specific
    /// missing or mismatched field.
    pub errors: Vec<String>,
}

impl VerificationReport {
    /// A report that failed before any check could run (e.g. the credential
    /// reference did not resolve).
    pub(crate) fn unresolvable(error: String) -> Self {
        Self {
            valid: false,
            checks: VerificationChecks {
                structure: false,
                signature: false,
                revocation: false,
            },
            errors: vec![error],
        }
    }
}

pub(crate) fn verify_document<S: BadgeStore>(
    store: &S,
    master: &MasterKey,
    base_url: &str,
    document: &Value,
) -> VerificationReport {
    let mut errors = Vec::new();

    let format = match classify(document) {
        Ok(format) => Some(format),
        Err(e) => {
            errors.push(format!("structure: {e}"));
            None
        }
    };

    let structure = match format {
        Some(CredentialFormat::Legacy) => check_legacy_structure(document, &mut errors),
        Some(CredentialFormat::Verifiable) => check_verifiable_structure(document, &mut errors),
        None => false,
    };

    // The hosted format has no embedded proof: its signature check is
    // structural validity, with trust delegated to the hosting endpoint.
    // Everything else must carry a verifiable embedded proof.
    let signature = match format {
        Some(CredentialFormat::Legacy) => {
            if structure {
                true
            } else {
                errors.push(
                    "signature: hosted verification requires a structurally valid assertion"
                        .to_string(),
                );
                false
            }
        }
        _ => match ProofEngine::new(store, master).check(document) {
            Ok(()) => true,
            Err(e) => {
                errors.push(format!("signature: {e}"));
                false
            }
        },
    };

    let revocation = check_revocation(store, master, base_url, document, format, &mut errors);

    let valid = structure && signature && revocation;
    if !valid {
        warn!(?errors, "credential failed verification");
    }
    VerificationReport {
        valid,
        checks: VerificationChecks {
            structure,
            signature,
            revocation,
        },
        errors,
    }
}

// ---------------------------------------------------------------------------
// Structural checks
// ---------------------------------------------------------------------------

fn push_missing(errors: &mut Vec<String>, document: &str, missing: &[&str]) -> bool {
    if missing.is_empty() {
        return true;
    }
    errors.push(format!(
        "structure: {document} missing required field(s) {}",
        missing.join(", ")
    ));
    false
}

fn check_legacy_structure(document: &Value, errors: &mut Vec<String>) -> bool {
    let mut missing = Vec::new();

    match document.get("@context").and_then(Value::as_str) {
        None => missing.push("@context"),
        Some(context) if context != obadge_vc::legacy::CONTEXT_OB_V2 => {
            errors.push(format!(
                "structure: Assertion @context is {context:?}, expected {:?}",
                obadge_vc::legacy::CONTEXT_OB_V2
            ));
            return false;
        }
        Some(_) => {}
    }
    if document.get("id").and_then(Value::as_str).is_none() {
        missing.push("id");
    }
    if document
        .get("recipient")
        .and_then(|r| r.get("identity"))
        .and_then(Value::as_str)
        .is_none()
    {
        missing.push("recipient.identity");
    }
    if document
        .get("badge")
        .map(|b| !b.is_object() && !b.is_string())
        .unwrap_or(true)
    {
        missing.push("badge");
    }
    if document.get("verification").is_none() {
        missing.push("verification");
    }
    if document.get("issuedOn").and_then(Value::as_str).is_none() {
        missing.push("issuedOn");
    }

    push_missing(errors, "Assertion", &missing)
}

fn check_verifiable_structure(document: &Value, errors: &mut Vec<String>) -> bool {
    let mut missing = Vec::new();

    let has_vc_context = document
        .get("@context")
        .and_then(Value::as_array)
        .map(|contexts| {
            contexts
                .iter()
                .any(|c| c.as_str() == Some(obadge_vc::credential::CONTEXT_VC_V2))
        })
        .unwrap_or(false);
    if !has_vc_context {
        missing.push("@context (credentials/v2)");
    }
    if document.get("id").and_then(Value::as_str).is_none() {
        missing.push("id");
    }
    if issuer_reference(document).is_none() {
        missing.push("issuer");
    }
    if document.get("validFrom").and_then(Value::as_str).is_none() {
        missing.push("validFrom");
    }
    if !document
        .get("credentialSubject")
        .map(Value::is_object)
        .unwrap_or(false)
    {
        missing.push("credentialSubject");
    }
    if !document
        .get("credentialStatus")
        .map(Value::is_object)
        .unwrap_or(false)
    {
        missing.push("credentialStatus");
    }

    push_missing(errors, "OpenBadgeCredential", &missing)
}

/// The issuer reference of a verifiable credential: a string, or an object
/// with an `id`.
fn issuer_reference(document: &Value) -> Option<&str> {
    match document.get("issuer") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Object(o)) => o.get("id").and_then(Value::as_str),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Revocation check
// ---------------------------------------------------------------------------

fn check_revocation<S: BadgeStore>(
    store: &S,
    master: &MasterKey,
    base_url: &str,
    document: &Value,
    format: Option<CredentialFormat>,
    errors: &mut Vec<String>,
) -> bool {
    match format {
        Some(CredentialFormat::Verifiable) => {
            // A missing status entry is a structural defect (flagged above);
            // for the revocation check itself it reads as not revoked.
            let Some(status) = document.get("credentialStatus") else {
                return true;
            };
            let index = status
                .get("statusListIndex")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<u64>().ok());
            let issuer = issuer_reference(document)
                .and_then(|s| IssuerId::new(s).ok());

            let (Some(index), Some(issuer)) = (index, issuer) else {
                errors.push(
                    "revocation: credentialStatus has no resolvable issuer and statusListIndex"
                        .to_string(),
                );
                return false;
            };

            let manager = StatusListManager::new(store, master, base_url);
            match manager.is_revoked(&issuer, StatusIndex::new(index)) {
                Ok(false) => true,
                Ok(true) => {
                    errors.push(format!(
                        "revocation: credential is revoked at status list index {index}"
                    ));
                    false
                }
                Err(e) => {
                    errors.push(format!("revocation: {e}"));
                    false
                }
            }
        }
        Some(CredentialFormat::Legacy) => {
            // No status list in the hosted format. The stored record is
            // authoritative when this engine holds it; an unknown assertion
            // reads as not revoked.
            let Some(id) = document
                .get("id")
                .and_then(Value::as_str)
                .and_then(|s| CredentialId::new(s).ok())
            else {
                return true;
            };
            match store.credential(&id) {
                Ok(Some(record)) if record.revoked => {
                    let reason = record
                        .revocation_reason
                        .as_deref()
                        .unwrap_or("no reason recorded");
                    errors.push(format!("revocation: assertion revoked ({reason})"));
                    false
                }
                Ok(_) => true,
                Err(e) => {
                    errors.push(format!("revocation: {e}"));
                    false
                }
            }
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn setup() -> (MemoryStore, MasterKey) {
        (MemoryStore::new(), MasterKey::generate())
    }

    fn report(store: &MemoryStore, master: &MasterKey, document: &Value) -> VerificationReport {
        verify_document(store, master, "https://badges.example.edu/status", document)
    }

    #[test]
    fn test_unknown_format_runs_all_checks() {
        let (store, master) = setup();
        let result = report(&store, &master, &json!({"hello": "world"}));

        assert!(!result.valid);
        assert!(!result.checks.structure);
        assert!(!result.checks.signature);
        // Nothing marks the document revoked.
        assert!(result.checks.revocation);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_structurally_invalid_unsigned_unrevoked() {
        // Declares the verifiable type but carries nothing else: structure
        // and signature fail with one error each, revocation passes.
        let (store, master) = setup();
        let result = report(&store, &master, &json!({"type": ["VerifiableCredential"]}));

        assert!(!result.valid);
        assert!(!result.checks.structure);
        assert!(!result.checks.signature);
        assert!(result.checks.revocation);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_legacy_minimal_valid() {
        let (store, master) = setup();
        let document = json!({
            "@context": "https://w3id.org/openbadges/v2",
            "id": "https://badges.example.edu/assertions/42",
            "type": "Assertion",
            "recipient": {"type": "email", "hashed": false, "identity": "alice@example.org"},
            "badge": {"id": "https://badges.example.edu/badges/gold-star"},
            "verification": {"type": "hosted"},
            "issuedOn": "2026-02-01T09:00:00Z",
        });
        let result = report(&store, &master, &document);

        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(result.checks.structure);
        // Hosted format: signature is trivially true when structurally valid.
        assert!(result.checks.signature);
        assert!(result.checks.revocation);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_legacy_missing_fields_named() {
        let (store, master) = setup();
        let document = json!({
            "@context": "https://w3id.org/openbadges/v2",
            "type": "Assertion",
            "badge": {"id": "https://badges.example.edu/badges/gold-star"},
        });
        let result = report(&store, &master, &document);

        assert!(!result.checks.structure);
        let structure_error = result
            .errors
            .iter()
            .find(|e| e.starts_with("structure:"))
            .unwrap();
        assert!(structure_error.contains("recipient.identity"));
        assert!(structure_error.contains("issuedOn"));
    }

    #[test]
    fn test_legacy_wrong_context_mismatch_named() {
        let (store, master) = setup();
        let document = json!({
            "@context": "https://w3id.org/openbadges/v1",
            "id": "https://badges.example.edu/assertions/42",
            "type": "Assertion",
            "recipient": {"identity": "alice@example.org"},
            "badge": {"id": "x"},
            "verification": {"type": "hosted"},
            "issuedOn": "2026-02-01T09:00:00Z",
        });
        let result = report(&store, &master, &document);
        assert!(!result.checks.structure);
        assert!(result.errors.iter().any(|e| e.contains("openbadges/v1")));
    }

    #[test]
    fn test_verifiable_missing_status_is_structural() {
        let (store, master) = setup();
        let document = json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "id": "urn:uuid:x",
            "type": ["VerifiableCredential", "OpenBadgeCredential"],
            "issuer": "https://badges.example.edu/issuer",
            "validFrom": "2026-02-01T09:00:00Z",
            "credentialSubject": {"name": "Alice"},
        });
        let result = report(&store, &master, &document);

        assert!(!result.checks.structure);
        assert!(result
            .errors
            .iter()
            .any(|e| e.contains("credentialStatus")));
        // The revocation check itself treats the absent entry as unrevoked.
        assert!(result.checks.revocation);
    }

    #[test]
    fn test_verifiable_unreadable_status_list_fails_revocation() {
        let (store, master) = setup();
        // A status entry pointing at an issuer with no list.
        let document = json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "id": "urn:uuid:x",
            "type": ["VerifiableCredential"],
            "issuer": "https://badges.example.edu/issuer",
            "validFrom": "2026-02-01T09:00:00Z",
            "credentialSubject": {"name": "Alice"},
            "credentialStatus": {
                "type": "BitstringStatusListEntry",
                "statusPurpose": "revocation",
                "statusListIndex": "0",
                "statusListCredential": "https://badges.example.edu/status/x",
            },
        });
        let result = report(&store, &master, &document);
        assert!(!result.checks.revocation);
        assert!(result.errors.iter().any(|e| e.starts_with("revocation:")));
    }
}
