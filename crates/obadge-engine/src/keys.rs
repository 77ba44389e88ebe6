//! # Key Manager — Issuer Key Lifecycle
//!
//! Provisions and retrieves an issuer's Ed25519 signing keypair. The private
//! key is stored only sealed (AES-256-GCM under the process master key) on
//! the issuer record; it is unsealed transiently, inside
//! [`KeyManager::with_signing_key()`], and the plaintext never escapes that
//! scope.
//!
//! First-time provisioning for an issuer runs inside the storage
//! collaborator's per-issuer critical section — two concurrent first signers
//! must not mint competing keypairs. Reads of an existing key are lock-free.

use tracing::info;

use obadge_core::error::{EngineError, KeyError, StorageError};
use obadge_core::IssuerId;
use obadge_crypto::{decode_public_key, Ed25519KeyPair, Ed25519PublicKey, MasterKey, SealedKey};
use obadge_vc::IssuerRecord;

use crate::store::BadgeStore;

/// An issuer's active key, public half only.
#[derive(Debug, Clone)]
pub struct IssuerKey {
    /// The public key.
    pub public_key: Ed25519PublicKey,
    /// The Multikey rendering carried on the issuer record.
    pub public_key_multibase: String,
    /// The `verificationMethod` reference proofs cite for this key.
    pub verification_method: String,
}

/// Provisions and opens issuer keys against a storage collaborator.
pub struct KeyManager<'a, S> {
    store: &'a S,
    master: &'a MasterKey,
}

impl<'a, S: BadgeStore> KeyManager<'a, S> {
    /// A key manager over the given store and master key.
    pub fn new(store: &'a S, master: &'a MasterKey) -> Self {
        Self { store, master }
    }

    /// Return the issuer's active key, provisioning one if none exists.
    ///
    /// The fast path is a plain read. Provisioning re-checks under the
    /// per-issuer critical section, so a racing provisioner finds the key
    /// already present and returns it instead of overwriting.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the issuer record does not exist —
    ///   issuers are created administratively, not here.
    /// - [`KeyError`] if stored key material is unusable.
    pub fn ensure_key(&self, issuer_id: &IssuerId) -> Result<IssuerKey, EngineError> {
        let record = self.load_issuer(issuer_id)?;
        if let Some(key) = issuer_key_of(&record)? {
            return Ok(key);
        }

        self.store.with_issuer_lock(issuer_id, |store| {
            let mut record = store
                .issuer(issuer_id)?
                .ok_or_else(|| not_found(issuer_id))?;
            // Another writer may have provisioned while we waited.
            if let Some(key) = issuer_key_of(&record)? {
                return Ok(key);
            }

            let keypair = Ed25519KeyPair::generate();
            record.sealed_key = Some(SealedKey::seal(self.master, &keypair)?);
            record.public_key_multibase = Some(keypair.public_key().to_multibase());
            store.put_issuer(&record)?;
            info!(issuer = %issuer_id, "provisioned signing key");

            Ok(IssuerKey {
                public_key: keypair.public_key(),
                public_key_multibase: keypair.public_key().to_multibase(),
                verification_method: record.verification_method(),
            })
        })
    }

    /// Run `f` with the issuer's unsealed signing key.
    ///
    /// The key pair is reconstructed from the sealed record, handed to `f`
    /// by reference, and dropped (seed zeroized) before this function
    /// returns. No caller holds private key material beyond the closure.
    ///
    /// # Errors
    ///
    /// - [`KeyError::NotProvisioned`] if the issuer has no sealed key —
    ///   callers that can tolerate that should call
    ///   [`KeyManager::ensure_key()`] first.
    /// - [`KeyError::Unsealable`] if decryption fails.
    pub fn with_signing_key<T>(
        &self,
        issuer_id: &IssuerId,
        f: impl FnOnce(&Ed25519KeyPair) -> T,
    ) -> Result<T, EngineError> {
        let record = self.load_issuer(issuer_id)?;
        let sealed = record
            .sealed_key
            .as_ref()
            .ok_or_else(|| KeyError::NotProvisioned(issuer_id.to_string()))?;
        let keypair = sealed.unseal(self.master, issuer_id.as_str())?;
        Ok(f(&keypair))
    }

    fn load_issuer(&self, issuer_id: &IssuerId) -> Result<IssuerRecord, EngineError> {
        self.store
            .issuer(issuer_id)?
            .ok_or_else(|| not_found(issuer_id))
    }
}

fn not_found(issuer_id: &IssuerId) -> EngineError {
    StorageError::NotFound {
        kind: "issuer",
        id: issuer_id.to_string(),
    }
    .into()
}

/// Project the key handle out of an issuer record, if one is provisioned.
///
/// A record with a public key but no sealed key (or the reverse) is corrupt
/// key material, not an unprovisioned issuer.
fn issuer_key_of(record: &IssuerRecord) -> Result<Option<IssuerKey>, EngineError> {
    match (&record.public_key_multibase, &record.sealed_key) {
        (Some(multibase), Some(_)) => {
            let public_key = decode_public_key(multibase)?;
            Ok(Some(IssuerKey {
                public_key,
                public_key_multibase: multibase.clone(),
                verification_method: record.verification_method(),
            }))
        }
        (None, None) => Ok(None),
        _ => Err(KeyError::InvalidKeyMaterial(format!(
            "issuer {} has partial key material",
            record.id
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn issuer_id() -> IssuerId {
        IssuerId::new("https://badges.example.edu/issuer").unwrap()
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .put_issuer(&IssuerRecord::new(issuer_id(), "Example University"))
            .unwrap();
        store
    }

    #[test]
    fn test_ensure_key_provisions_once() {
        let store = seeded_store();
        let master = MasterKey::generate();
        let km = KeyManager::new(&store, &master);

        let first = km.ensure_key(&issuer_id()).unwrap();
        let second = km.ensure_key(&issuer_id()).unwrap();
        assert_eq!(first.public_key_multibase, second.public_key_multibase);
        assert_eq!(
            first.verification_method,
            "https://badges.example.edu/issuer#key-0"
        );

        let record = store.issuer(&issuer_id()).unwrap().unwrap();
        assert!(record.sealed_key.is_some());
        assert_eq!(
            record.public_key_multibase.as_deref(),
            Some(first.public_key_multibase.as_str())
        );
    }

    #[test]
    fn test_ensure_key_unknown_issuer() {
        let store = MemoryStore::new();
        let master = MasterKey::generate();
        let km = KeyManager::new(&store, &master);
        let err = km.ensure_key(&issuer_id()).unwrap_err();
        assert!(matches!(err, EngineError::Storage(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_with_signing_key_matches_public_key() {
        let store = seeded_store();
        let master = MasterKey::generate();
        let km = KeyManager::new(&store, &master);
        let key = km.ensure_key(&issuer_id()).unwrap();

        let public = km
            .with_signing_key(&issuer_id(), |kp| kp.public_key())
            .unwrap();
        assert_eq!(public, key.public_key);
    }

    #[test]
    fn test_with_signing_key_unprovisioned() {
        let store = seeded_store();
        let master = MasterKey::generate();
        let km = KeyManager::new(&store, &master);
        let err = km.with_signing_key(&issuer_id(), |_| ()).unwrap_err();
        assert!(matches!(err, EngineError::Key(KeyError::NotProvisioned(_))));
    }

    #[test]
    fn test_wrong_master_key_is_key_error() {
        let store = seeded_store();
        let master = MasterKey::generate();
        KeyManager::new(&store, &master)
            .ensure_key(&issuer_id())
            .unwrap();

        // A different process master key cannot open the sealed record.
        let other = MasterKey::generate();
        let err = KeyManager::new(&store, &other)
            .with_signing_key(&issuer_id(), |_| ())
            .unwrap_err();
        assert!(matches!(err, EngineError::Key(KeyError::Unsealable { .. })));
    }

    #[test]
    fn test_key_errors_do_not_cross_issuers() {
        let store = seeded_store();
        let other_id = IssuerId::new("https://other.example/issuer").unwrap();
        store
            .put_issuer(&IssuerRecord::new(other_id.clone(), "Other College"))
            .unwrap();

        let master = MasterKey::generate();
        let km = KeyManager::new(&store, &master);
        km.ensure_key(&issuer_id()).unwrap();

        // Corrupt the first issuer's sealed key.
        let mut record = store.issuer(&issuer_id()).unwrap().unwrap();
        if let Some(sealed) = record.sealed_key.as_mut() {
            sealed.ciphertext[0] ^= 0xff;
        }
        store.put_issuer(&record).unwrap();

        assert!(km.with_signing_key(&issuer_id(), |_| ()).is_err());
        // The other issuer provisions and signs untouched.
        km.ensure_key(&other_id).unwrap();
        assert!(km.with_signing_key(&other_id, |_| ()).is_ok());
    }

    #[test]
    fn test_partial_key_material_is_error() {
        let store = seeded_store();
        let master = MasterKey::generate();
        let km = KeyManager::new(&store, &master);
        km.ensure_key(&issuer_id()).unwrap();

        let mut record = store.issuer(&issuer_id()).unwrap().unwrap();
        record.sealed_key = None;
        store.put_issuer(&record).unwrap();

        let err = km.ensure_key(&issuer_id()).unwrap_err();
        assert!(matches!(err, EngineError::Key(KeyError::InvalidKeyMaterial(_))));
    }
}
