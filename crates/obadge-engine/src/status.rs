//! # Status List Manager
//!
//! Owns the per-issuer revocation state: the index allocation counter and
//! the bitstring, plus the signed wrapping credential verifiers fetch.
//!
//! `allocate_index` and `set_revoked` are read-modify-write sequences and
//! run inside the storage collaborator's per-issuer critical section — two
//! concurrent revocations must not clobber each other's bitstring, and two
//! concurrent issuances must not receive the same index. `is_revoked` reads
//! the latest committed state without the lock.
//!
//! Every bit change regenerates and re-signs the wrapping credential in the
//! same critical section. A published list whose signature predates its
//! bitstring is a defect, not a transitional state.

use serde_json::Value;
use tracing::{debug, info};

use obadge_core::error::{EngineError, RevocationError};
use obadge_core::{IssuerId, StatusIndex, Timestamp};
use obadge_crypto::MasterKey;
use obadge_status::{build_list_document, list_credential_url, StatusListRecord};

use crate::keys::KeyManager;
use crate::proof::ProofEngine;
use crate::store::BadgeStore;

/// Manages one status list per issuer.
pub struct StatusListManager<'a, S> {
    store: &'a S,
    master: &'a MasterKey,
    base_url: &'a str,
}

impl<'a, S: BadgeStore> StatusListManager<'a, S> {
    /// A manager over the given store, master key, and publication base URL.
    pub fn new(store: &'a S, master: &'a MasterKey, base_url: &'a str) -> Self {
        Self {
            store,
            master,
            base_url,
        }
    }

    /// The publication URL of this issuer's status list credential.
    pub fn list_url(&self, issuer_id: &IssuerId) -> String {
        list_credential_url(self.base_url, issuer_id)
    }

    /// Allocate the next status index for an issuer, creating the list on
    /// first use.
    ///
    /// Monotonic and never reused: the counter and its persistence happen
    /// inside the per-issuer critical section.
    pub fn allocate_index(&self, issuer_id: &IssuerId) -> Result<StatusIndex, EngineError> {
        self.store.with_issuer_lock(issuer_id, |store| {
            let mut record = match store.status_list(issuer_id)? {
                Some(record) => record,
                None => StatusListRecord::new(issuer_id.clone())?,
            };
            let index = record.allocate();
            store.put_status_list(&record)?;
            debug!(issuer = %issuer_id, index = %index, "allocated status index");
            Ok(index)
        })
    }

    /// Flip the revocation bit for `index` and re-sign the wrapping
    /// credential, atomically with respect to other writers for the issuer.
    ///
    /// # Errors
    ///
    /// [`RevocationError::NoStatusList`] if the issuer has never allocated
    /// an index; storage, key, and signing failures as their own types.
    pub fn set_revoked(
        &self,
        issuer_id: &IssuerId,
        index: StatusIndex,
        revoked: bool,
        reason: Option<&str>,
    ) -> Result<(), EngineError> {
        // The re-sign happens inside the critical section, and first-time
        // key provisioning takes the same lock; provision before entering.
        KeyManager::new(self.store, self.master).ensure_key(issuer_id)?;

        self.store.with_issuer_lock(issuer_id, |store| {
            let mut record = store
                .status_list(issuer_id)?
                .ok_or_else(|| RevocationError::NoStatusList(issuer_id.to_string()))?;

            let mut bits = record.bitstring()?;
            bits.set(index.as_u64(), revoked)?;
            record.store_bitstring(&bits)?;

            let signed = self.sign_list_document(store, issuer_id, &record)?;
            record.credential = Some(signed);
            store.put_status_list(&record)?;

            info!(
                issuer = %issuer_id,
                index = %index,
                revoked,
                reason = reason.unwrap_or(""),
                "status list updated"
            );
            Ok(())
        })
    }

    /// Read the revocation bit for `index` from the latest committed list.
    ///
    /// Pure read; indices beyond the encoded length read as unrevoked.
    pub fn is_revoked(&self, issuer_id: &IssuerId, index: StatusIndex) -> Result<bool, EngineError> {
        let record = self
            .store
            .status_list(issuer_id)?
            .ok_or_else(|| RevocationError::NoStatusList(issuer_id.to_string()))?;
        Ok(record.bitstring()?.get(index.as_u64()))
    }

    /// The signed wrapping credential for publication.
    ///
    /// Signed lazily on first fetch (a list that has only allocated indices
    /// has never been signed); thereafter the stored credential is returned
    /// as-is until the next bit change replaces it.
    pub fn list_credential(&self, issuer_id: &IssuerId) -> Result<Value, EngineError> {
        let record = self
            .store
            .status_list(issuer_id)?
            .ok_or_else(|| RevocationError::NoStatusList(issuer_id.to_string()))?;
        if let Some(credential) = record.credential {
            return Ok(credential);
        }

        KeyManager::new(self.store, self.master).ensure_key(issuer_id)?;
        self.store.with_issuer_lock(issuer_id, |store| {
            let mut record = store
                .status_list(issuer_id)?
                .ok_or_else(|| RevocationError::NoStatusList(issuer_id.to_string()))?;
            if let Some(credential) = record.credential.clone() {
                return Ok(credential);
            }
            let signed = self.sign_list_document(store, issuer_id, &record)?;
            record.credential = Some(signed.clone());
            store.put_status_list(&record)?;
            Ok(signed)
        })
    }

    fn sign_list_document(
        &self,
        store: &S,
        issuer_id: &IssuerId,
        record: &StatusListRecord,
    ) -> Result<Value, EngineError> {
        let url = self.list_url(issuer_id);
        let document =
            build_list_document(issuer_id, &url, &record.encoded_list, Timestamp::now());
        ProofEngine::new(store, self.master).sign(&document, issuer_id)
    }
}
