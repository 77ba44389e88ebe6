//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Each concern (canonicalization, validation, keys, signatures, revocation,
//!   storage) gets its own enum; [`EngineError`] rolls them up with `#[from]`
//!   conversions so `?` composes across crate boundaries.
//! - Signing and provisioning paths surface these errors to the caller.
//!   Verification paths never do — every failure collapses into a `false`
//!   check plus a human-readable entry in the verification report.
//! - Error messages name the specific field, issuer, or index involved.
//!   They never carry key material or recipient plaintext.

use thiserror::Error;

/// Top-level error type for the Open Badge engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A document is missing or malforms a required field.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Issuer key material is missing or unusable.
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    /// Proof generation or verification failed.
    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    /// The status list is unreadable or corrupt.
    #[error("revocation error: {0}")]
    Revocation(#[from] RevocationError),

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations — they do
    /// not round-trip identically across serializers, so a signed document
    /// containing one could fail verification elsewhere.
    #[error("float values are not permitted in canonical documents: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A document is missing or malforms a required field.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A required field is absent.
    #[error("{document}: missing required field `{field}`")]
    MissingField {
        /// The document kind being validated (e.g. "Assertion",
        /// "OpenBadgeCredential").
        document: &'static str,
        /// The absent field, in its serialized name.
        field: &'static str,
    },

    /// A field is present but malformed.
    #[error("malformed field `{field}`: {reason}")]
    MalformedField {
        /// The offending field, in its serialized name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The document's declared `type` matches neither supported format.
    #[error("unrecognized credential format: {0}")]
    UnknownFormat(String),
}

/// Issuer key material is missing or unusable.
///
/// A `KeyError` is fatal for the affected issuer only — other issuers' keys
/// are independent records.
#[derive(Error, Debug)]
pub enum KeyError {
    /// The issuer record exists but carries no sealed key.
    #[error("issuer {0} has no provisioned signing key")]
    NotProvisioned(String),

    /// The sealed private key failed to decrypt under the process master key.
    #[error("sealed key for issuer {issuer} cannot be opened: {reason}")]
    Unsealable {
        /// The affected issuer.
        issuer: String,
        /// Decryption failure detail.
        reason: String,
    },

    /// Stored key bytes do not form a valid Ed25519 key.
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

/// Proof generation or verification failed.
#[derive(Error, Debug)]
pub enum SignatureError {
    /// The document carries no `proof` property.
    #[error("document has no proof")]
    MissingProof,

    /// The proof block is present but structurally unusable.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The proof's `verificationMethod` does not resolve to a known issuer
    /// key.
    #[error("unresolvable verification method: {0}")]
    UnresolvableMethod(String),

    /// The proof declares a cryptosuite this engine does not implement.
    #[error("unsupported cryptosuite: {0}")]
    UnsupportedSuite(String),

    /// The signature does not match the canonicalized document bytes.
    #[error("signature mismatch")]
    Mismatch,
}

/// The status list is unreadable or corrupt.
#[derive(Error, Debug)]
pub enum RevocationError {
    /// No status list record exists for the issuer.
    #[error("issuer {0} has no status list")]
    NoStatusList(String),

    /// The encoded bitstring failed to decode or decompress.
    #[error("corrupt status list: {0}")]
    CorruptList(String),
}

/// The storage collaborator failed.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store could not be reached or returned an I/O failure.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A referenced record does not exist.
    #[error("{kind} record not found: {id}")]
    NotFound {
        /// Record kind (e.g. "issuer", "achievement").
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },
}
