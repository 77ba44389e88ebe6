//! # Status List Records
//!
//! The per-issuer status list: a monotonic index allocation counter, the
//! encoded bitstring, and the signed wrapping credential verifiers fetch.
//! The counter and the bitstring are one atomically-updated unit — a gap or
//! a reused index would point two credentials at the same revocation bit.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use obadge_core::{IssuerId, StatusIndex, Timestamp};

use crate::bitstring::StatusBitstring;

/// The one status purpose this engine tracks.
pub const STATUS_PURPOSE_REVOCATION: &str = "revocation";

/// The wrapping credential's subject type.
pub const TYPE_BITSTRING_STATUS_LIST: &str = "BitstringStatusList";

/// The wrapping credential's credential type.
pub const TYPE_STATUS_LIST_CREDENTIAL: &str = "BitstringStatusListCredential";

/// The stored status list for one issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusListRecord {
    /// The owning issuer.
    pub issuer: IssuerId,

    /// The next unallocated index. Monotonic; never decremented.
    pub next_index: u64,

    /// The current bitstring in its encoded form.
    pub encoded_list: String,

    /// The signed wrapping credential over `encoded_list`. `None` only
    /// before the first signing; regenerated on every bit change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<Value>,
}

impl StatusListRecord {
    /// A fresh list for an issuer: empty bitstring, counter at zero, no
    /// wrapping credential yet.
    pub fn new(issuer: IssuerId) -> Result<Self, obadge_core::RevocationError> {
        Ok(Self {
            issuer,
            next_index: 0,
            encoded_list: StatusBitstring::new().encode()?,
            credential: None,
        })
    }

    /// Take the next index. The caller persists this record in the same
    /// critical section, which is what makes the counter monotonic across
    /// writers.
    pub fn allocate(&mut self) -> StatusIndex {
        let index = StatusIndex::new(self.next_index);
        self.next_index += 1;
        index
    }

    /// Decode the current bitstring.
    pub fn bitstring(&self) -> Result<StatusBitstring, obadge_core::RevocationError> {
        StatusBitstring::decode(&self.encoded_list)
    }

    /// Store a new bitstring state. Invalidates the wrapping credential —
    /// the caller re-signs before persisting.
    pub fn store_bitstring(
        &mut self,
        bits: &StatusBitstring,
    ) -> Result<(), obadge_core::RevocationError> {
        self.encoded_list = bits.encode()?;
        self.credential = None;
        Ok(())
    }
}

/// The publication URL for an issuer's status list credential.
///
/// Issuer ids are arbitrary URIs, so the path segment is a stable digest of
/// the id rather than the id itself.
pub fn list_credential_url(base_url: &str, issuer: &IssuerId) -> String {
    let digest = Sha256::digest(issuer.as_str().as_bytes());
    let slug: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
    format!("{}/{}", base_url.trim_end_matches('/'), slug)
}

/// Build the unsigned wrapping credential for an encoded bitstring.
///
/// The caller signs the result with the issuer's key before publishing; an
/// unsigned list credential is never stored.
pub fn build_list_document(
    issuer: &IssuerId,
    list_url: &str,
    encoded_list: &str,
    valid_from: Timestamp,
) -> Value {
    json!({
        "@context": ["https://www.w3.org/ns/credentials/v2"],
        "id": list_url,
        "type": ["VerifiableCredential", TYPE_STATUS_LIST_CREDENTIAL],
        "issuer": issuer.as_str(),
        "validFrom": valid_from.to_iso8601(),
        "credentialSubject": {
            "id": format!("{list_url}#list"),
            "type": TYPE_BITSTRING_STATUS_LIST,
            "statusPurpose": STATUS_PURPOSE_REVOCATION,
            "encodedList": encoded_list,
        },
    })
}
