//! # Proof — DataIntegrityProof Block
//!
//! The cryptographic proof structure embedded in OB3 credentials and in the
//! status list's wrapping credential. Field names and semantics follow the
//! W3C Data Integrity model; the one cryptosuite this engine produces is
//! `eddsa-jcs-2022`.

use obadge_core::Timestamp;
use serde::{Deserialize, Serialize};

/// The `type` value of every proof this engine produces.
pub const PROOF_TYPE_DATA_INTEGRITY: &str = "DataIntegrityProof";

/// The cryptosuite this engine implements: JCS canonicalization, SHA-256
/// hashing, Ed25519 signatures.
pub const CRYPTOSUITE_EDDSA_JCS_2022: &str = "eddsa-jcs-2022";

/// The reason a proof exists. Acts as a safeguard against a proof created
/// for one purpose being presented for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the credential's claims.
    AssertionMethod,
    /// Authentication of the holder.
    Authentication,
}

/// A `DataIntegrityProof` attached to a credential document.
///
/// `proof_value` is `None` only transiently: the same structure, minus the
/// value, is the *proof configuration* that gets canonicalized and hashed
/// into the signed message. An embedded proof always carries a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Always [`PROOF_TYPE_DATA_INTEGRITY`] for proofs this engine emits.
    #[serde(rename = "type")]
    pub proof_type: String,

    /// The cryptosuite that produced this proof.
    pub cryptosuite: String,

    /// When the proof was created.
    pub created: Timestamp,

    /// Reference to the signing key: the issuer id with a `#key-0` fragment,
    /// resolvable back to the issuer record's public key.
    pub verification_method: String,

    /// The purpose of this proof.
    pub proof_purpose: ProofPurpose,

    /// The signature, multibase base58-btc encoded. Absent only in the
    /// proof-configuration form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

impl Proof {
    /// Build a proof configuration (no value yet) for signing.
    pub fn config(verification_method: impl Into<String>, created: Timestamp) -> Self {
        Self {
            proof_type: PROOF_TYPE_DATA_INTEGRITY.to_string(),
            cryptosuite: CRYPTOSUITE_EDDSA_JCS_2022.to_string(),
            created,
            verification_method: verification_method.into(),
            proof_purpose: ProofPurpose::AssertionMethod,
            proof_value: None,
        }
    }

    /// Attach the computed signature value, completing the proof.
    pub fn with_value(mut self, proof_value: String) -> Self {
        self.proof_value = Some(proof_value);
        self
    }

    /// Whether the declared type and cryptosuite are ones this engine can
    /// verify.
    pub fn is_supported(&self) -> bool {
        self.proof_type == PROOF_TYPE_DATA_INTEGRITY
            && self.cryptosuite == CRYPTOSUITE_EDDSA_JCS_2022
    }
}
