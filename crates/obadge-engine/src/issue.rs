//! # Issuance Flow
//!
//! Ties the collaborators together to mint a credential: resolve the
//! achievement and issuer records, allocate a status index (verifiable
//! format only), build the document, sign it, and persist the credential
//! record. All-or-nothing from the caller's perspective — a failure at any
//! step surfaces as a typed error and no document is returned.

use serde_json::Value;
use tracing::info;

use obadge_core::error::{EngineError, StorageError};
use obadge_core::{AchievementId, CredentialId, Timestamp};
use obadge_crypto::MasterKey;
use obadge_vc::builder::{self, StatusEntryParams};
use obadge_vc::{CredentialFormat, CredentialRecord, RecipientIdentity};

use crate::keys::KeyManager;
use crate::proof::ProofEngine;
use crate::status::StatusListManager;
use crate::store::BadgeStore;

/// What to issue.
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Credential identifier; a fresh `urn:uuid:` is generated when absent.
    pub credential_id: Option<CredentialId>,

    /// The achievement being awarded.
    pub achievement: AchievementId,

    /// Who earned it.
    pub recipient: RecipientIdentity,

    /// Optional expiry.
    pub expires: Option<Timestamp>,

    /// Which document generation to render.
    pub format: CredentialFormat,
}

/// A freshly issued credential: the persisted record and the document as
/// rendered (signed, for the verifiable format).
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// The stored record.
    pub record: CredentialRecord,
    /// The issued document.
    pub document: Value,
}

pub(crate) fn issue<S: BadgeStore>(
    store: &S,
    master: &MasterKey,
    base_url: &str,
    request: IssueRequest,
) -> Result<IssuedCredential, EngineError> {
    let achievement =
        store
            .achievement(&request.achievement)?
            .ok_or_else(|| StorageError::NotFound {
                kind: "achievement",
                id: request.achievement.to_string(),
            })?;
    let issuer = store
        .issuer(&achievement.issuer)?
        .ok_or_else(|| StorageError::NotFound {
            kind: "issuer",
            id: achievement.issuer.to_string(),
        })?;

    let mut record = CredentialRecord {
        id: request
            .credential_id
            .unwrap_or_else(CredentialId::new_urn),
        issuer: issuer.id.clone(),
        achievement: achievement.id.clone(),
        recipient: request.recipient,
        issued_on: Timestamp::now(),
        expires: request.expires,
        revoked: false,
        revocation_reason: None,
        status_index: None,
        document: None,
    };

    let document = match request.format {
        CredentialFormat::Legacy => {
            builder::build(&record, &achievement, &issuer, request.format, None)?.to_value()?
        }
        CredentialFormat::Verifiable => {
            // Key first: the status manager re-signs under the issuer lock
            // and must find the key already provisioned.
            KeyManager::new(store, master).ensure_key(&issuer.id)?;

            let status = StatusListManager::new(store, master, base_url);
            let index = status.allocate_index(&issuer.id)?;
            record.status_index = Some(index);

            let entry = StatusEntryParams {
                index,
                list_credential: status.list_url(&issuer.id),
            };
            let unsigned =
                builder::build(&record, &achievement, &issuer, request.format, Some(&entry))?
                    .to_value()?;
            ProofEngine::new(store, master).sign(&unsigned, &issuer.id)?
        }
    };

    record.document = Some(document.clone());
    store.put_credential(&record)?;
    info!(
        credential = %record.id,
        issuer = %record.issuer,
        format = %request.format,
        "issued credential"
    );

    Ok(IssuedCredential { record, document })
}
