//! # Storage Collaborator
//!
//! The engine does not own persistence. [`BadgeStore`] is the contract a
//! deployment implements over its database; [`MemoryStore`] is the in-memory
//! implementation used by tests and examples.
//!
//! ## Concurrency Contract
//!
//! `with_issuer_lock` is the per-issuer critical section. Index allocation,
//! revocation updates, and first-time key provisioning are read-modify-write
//! sequences against per-issuer state and run inside it; plain reads
//! (`is_revoked`, signature verification) never take it. A database-backed
//! implementation maps it onto a transaction or row lock so the discipline
//! holds across processes, not just threads.
//!
//! The critical section is not reentrant: the closure must not call back
//! into `with_issuer_lock` for the same issuer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use obadge_core::error::{EngineError, StorageError};
use obadge_core::{AchievementId, CredentialId, IssuerId};
use obadge_status::StatusListRecord;
use obadge_vc::{AchievementRecord, CredentialRecord, IssuerRecord};

/// Durable storage for issuers, achievements, credentials, and status lists.
pub trait BadgeStore: Send + Sync {
    /// Fetch an issuer record.
    fn issuer(&self, id: &IssuerId) -> Result<Option<IssuerRecord>, StorageError>;

    /// Persist an issuer record.
    fn put_issuer(&self, record: &IssuerRecord) -> Result<(), StorageError>;

    /// Fetch an achievement record.
    fn achievement(&self, id: &AchievementId) -> Result<Option<AchievementRecord>, StorageError>;

    /// Persist an achievement record.
    fn put_achievement(&self, record: &AchievementRecord) -> Result<(), StorageError>;

    /// Fetch a credential record.
    fn credential(&self, id: &CredentialId) -> Result<Option<CredentialRecord>, StorageError>;

    /// Persist a credential record.
    fn put_credential(&self, record: &CredentialRecord) -> Result<(), StorageError>;

    /// Fetch an issuer's status list record.
    fn status_list(&self, issuer: &IssuerId) -> Result<Option<StatusListRecord>, StorageError>;

    /// Persist an issuer's status list record.
    fn put_status_list(&self, record: &StatusListRecord) -> Result<(), StorageError>;

    /// Run `f` inside the per-issuer critical section.
    ///
    /// All writes to the issuer's status list or key material happen inside
    /// `f`; the implementation guarantees no other writer for the same
    /// issuer runs concurrently.
    fn with_issuer_lock<T>(
        &self,
        issuer: &IssuerId,
        f: impl FnOnce(&Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError>
    where
        Self: Sized;
}

/// In-memory [`BadgeStore`] for tests and examples.
///
/// Record maps sit behind `RwLock`s; the per-issuer critical section is one
/// `Mutex` per issuer, created on first use.
#[derive(Default)]
pub struct MemoryStore {
    issuers: RwLock<HashMap<String, IssuerRecord>>,
    achievements: RwLock<HashMap<String, AchievementRecord>>,
    credentials: RwLock<HashMap<String, CredentialRecord>>,
    status_lists: RwLock<HashMap<String, StatusListRecord>>,
    issuer_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn issuer_lock(&self, issuer: &IssuerId) -> Arc<Mutex<()>> {
        let mut locks = self
            .issuer_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(issuer.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Recover a read guard from a poisoned lock; the data is plain records, so
/// a panicked writer cannot have left them torn.
fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BadgeStore for MemoryStore {
    fn issuer(&self, id: &IssuerId) -> Result<Option<IssuerRecord>, StorageError> {
        Ok(read(&self.issuers).get(id.as_str()).cloned())
    }

    fn put_issuer(&self, record: &IssuerRecord) -> Result<(), StorageError> {
        write(&self.issuers).insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn achievement(&self, id: &AchievementId) -> Result<Option<AchievementRecord>, StorageError> {
        Ok(read(&self.achievements).get(id.as_str()).cloned())
    }

    fn put_achievement(&self, record: &AchievementRecord) -> Result<(), StorageError> {
        write(&self.achievements).insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn credential(&self, id: &CredentialId) -> Result<Option<CredentialRecord>, StorageError> {
        Ok(read(&self.credentials).get(id.as_str()).cloned())
    }

    fn put_credential(&self, record: &CredentialRecord) -> Result<(), StorageError> {
        write(&self.credentials).insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn status_list(&self, issuer: &IssuerId) -> Result<Option<StatusListRecord>, StorageError> {
        Ok(read(&self.status_lists).get(issuer.as_str()).cloned())
    }

    fn put_status_list(&self, record: &StatusListRecord) -> Result<(), StorageError> {
        write(&self.status_lists).insert(record.issuer.as_str().to_string(), record.clone());
        Ok(())
    }

    fn with_issuer_lock<T>(
        &self,
        issuer: &IssuerId,
        f: impl FnOnce(&Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let lock = self.issuer_lock(issuer);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(self)
    }
}
