//! # obadge-engine — Credential Signing, Verification & Revocation
//!
//! The stateful heart of the Open Badge engine, tying the document model and
//! cryptographic primitives to a storage collaborator:
//!
//! - **`store`**: the [`BadgeStore`] trait a deployment implements, plus the
//!   in-memory [`MemoryStore`] for tests and examples.
//! - **`keys`**: issuer key lifecycle — Ed25519 keypairs sealed at rest,
//!   unsealed only inside a scoped signing closure.
//! - **`proof`**: `eddsa-jcs-2022` proof generation and verification.
//! - **`status`**: per-issuer bitstring revocation lists, re-signed on every
//!   change under the per-issuer critical section.
//! - **`issue`** / **`verify`**: the issuance flow and the verification
//!   orchestrator.
//!
//! [`BadgeEngine`] bundles them behind one facade.
//!
//! ## Concurrency
//!
//! The engine is a stateless library, safe to call from many workers at
//! once. The only shared mutable state — per-issuer status lists and
//! first-time key provisioning — is serialized through the storage
//! collaborator's per-issuer critical section, never through in-process
//! globals.
//!
//! ## Error Policy
//!
//! Issuance-side operations (`issue`, `revoke`, `ensure_issuer_key`) return
//! typed errors and never produce partial output. Verification returns a
//! [`VerificationReport`] for any input whatsoever.

pub mod issue;
pub mod keys;
pub mod proof;
pub mod status;
pub mod store;
pub mod verify;

use serde_json::Value;

use obadge_core::error::{EngineError, StorageError};
use obadge_core::{CredentialId, IssuerId, StatusIndex};
use obadge_crypto::MasterKey;
use obadge_vc::document::classify;
use obadge_vc::{AnyCredential, CredentialFormat};

pub use issue::{IssueRequest, IssuedCredential};
pub use keys::{IssuerKey, KeyManager};
pub use proof::ProofEngine;
pub use status::StatusListManager;
pub use store::{BadgeStore, MemoryStore};
pub use verify::{VerificationChecks, VerificationReport};

/// Engine configuration supplied by the deployment.
pub struct EngineConfig {
    /// The process-wide master key issuer keys are sealed under.
    pub master_key: MasterKey,
    /// Base URL under which status list credentials are published.
    pub status_list_base_url: String,
}

/// The engine facade: issuance, revocation, and verification over one
/// storage collaborator.
pub struct BadgeEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: BadgeStore> BadgeEngine<S> {
    /// An engine over the given store and configuration.
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store, for record administration.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the issuer's active key, provisioning one if none exists.
    pub fn ensure_issuer_key(&self, issuer_id: &IssuerId) -> Result<IssuerKey, EngineError> {
        KeyManager::new(&self.store, &self.config.master_key).ensure_key(issuer_id)
    }

    /// Issue a credential in the requested format.
    pub fn issue(&self, request: IssueRequest) -> Result<IssuedCredential, EngineError> {
        issue::issue(
            &self.store,
            &self.config.master_key,
            &self.config.status_list_base_url,
            request,
        )
    }

    /// Revoke a credential, recording the reason and flipping its status
    /// bit (which re-signs the issuer's status list).
    pub fn revoke(
        &self,
        credential_id: &CredentialId,
        reason: Option<&str>,
    ) -> Result<(), EngineError> {
        self.set_revocation(credential_id, true, reason)
    }

    /// Clear a credential's revocation.
    pub fn reinstate(&self, credential_id: &CredentialId) -> Result<(), EngineError> {
        self.set_revocation(credential_id, false, None)
    }

    /// Read a credential's revocation bit from its issuer's status list.
    pub fn is_revoked(
        &self,
        issuer_id: &IssuerId,
        index: StatusIndex,
    ) -> Result<bool, EngineError> {
        self.status_manager().is_revoked(issuer_id, index)
    }

    /// The issuer's signed status list credential, for publication.
    pub fn status_list_credential(&self, issuer_id: &IssuerId) -> Result<Value, EngineError> {
        self.status_manager().list_credential(issuer_id)
    }

    /// Verify a raw credential document. Never fails — every problem is
    /// reported inside the result.
    pub fn verify_value(&self, document: &Value) -> VerificationReport {
        verify::verify_document(
            &self.store,
            &self.config.master_key,
            &self.config.status_list_base_url,
            document,
        )
    }

    /// Verify a typed credential document.
    pub fn verify(&self, credential: &AnyCredential) -> VerificationReport {
        match credential.to_value() {
            Ok(value) => self.verify_value(&value),
            Err(e) => VerificationReport::unresolvable(format!("structure: {e}")),
        }
    }

    /// Verify a stored credential by reference: the document is the one
    /// persisted at issuance time.
    pub fn verify_by_id(&self, credential_id: &CredentialId) -> VerificationReport {
        match self.store.credential(credential_id) {
            Ok(Some(record)) => match record.document {
                Some(document) => self.verify_value(&document),
                None => VerificationReport::unresolvable(format!(
                    "credential {credential_id} has no stored document"
                )),
            },
            Ok(None) => VerificationReport::unresolvable(format!(
                "credential {credential_id} not found"
            )),
            Err(e) => VerificationReport::unresolvable(format!("storage: {e}")),
        }
    }

    fn status_manager(&self) -> StatusListManager<'_, S> {
        StatusListManager::new(
            &self.store,
            &self.config.master_key,
            &self.config.status_list_base_url,
        )
    }

    fn set_revocation(
        &self,
        credential_id: &CredentialId,
        revoked: bool,
        reason: Option<&str>,
    ) -> Result<(), EngineError> {
        let mut record = self
            .store
            .credential(credential_id)?
            .ok_or_else(|| StorageError::NotFound {
                kind: "credential",
                id: credential_id.to_string(),
            })?;

        // Verifiable credentials flip their status bit; hosted assertions
        // carry the flag on the record and its served document only.
        if let Some(index) = record.status_index {
            self.status_manager()
                .set_revoked(&record.issuer, index, revoked, reason)?;
        }

        record.revoked = revoked;
        record.revocation_reason = if revoked {
            reason.map(str::to_string)
        } else {
            None
        };

        if let Some(document) = record.document.as_mut() {
            update_hosted_revocation(document, revoked, record.revocation_reason.as_deref());
        }

        self.store.put_credential(&record)?;
        Ok(())
    }
}

/// Reflect revocation on a stored hosted assertion, so re-serving it shows
/// the current state. Signed verifiable documents are left as issued —
/// their revocation lives in the status list.
fn update_hosted_revocation(document: &mut Value, revoked: bool, reason: Option<&str>) {
    if !matches!(classify(document), Ok(CredentialFormat::Legacy)) {
        return;
    }
    let Some(object) = document.as_object_mut() else {
        return;
    };
    if revoked {
        object.insert("revoked".to_string(), Value::Bool(true));
        if let Some(reason) = reason {
            object.insert(
                "revocationReason".to_string(),
                Value::String(reason.to_string()),
            );
        }
    } else {
        object.remove("revoked");
        object.remove("revocationReason");
    }
}
