//! # Ed25519 Signing and Verification
//!
//! Ed25519 key generation, signing, and verification for credential proofs.
//!
//! ## Security Invariant
//!
//! - Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes.
//!   Every signature in the engine is therefore over data that went through
//!   the one canonicalization path, and signing and verification cannot
//!   disagree about serialization.
//! - Private keys are never serialized or logged. [`Ed25519KeyPair`] does not
//!   implement `Serialize`, and its `Debug` output is redacted. The seed is
//!   reachable only through [`Ed25519KeyPair::to_seed()`], which hands back a
//!   zeroizing buffer for the sealing path.
//!
//! ## Text Encoding
//!
//! Public keys and signatures render as Multikey / multibase strings — see
//! [`crate::multikey`]. There is no hex form in this engine; documents carry
//! multibase exclusively.

use ed25519_dalek::{Signer, Verifier};
use obadge_core::error::{KeyError, SignatureError};
use obadge_core::CanonicalBytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

/// An Ed25519 public key (32 bytes) for signature verification.
///
/// Serializes as a Multikey string (`z6Mk…`) for document interoperability.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
///
/// Serializes as a multibase base58-btc string, the form carried in a proof's
/// `proofValue`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// An Ed25519 key pair for signing operations.
///
/// Does not implement `Serialize` — private keys must not be accidentally
/// serialized into records, documents, or logs. At-rest persistence goes
/// through [`crate::sealed`] exclusively.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519PublicKey impls
// ---------------------------------------------------------------------------

impl Ed25519PublicKey {
    /// Create a public key from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a Multikey string (`z6Mk…`).
    pub fn to_multibase(&self) -> String {
        crate::multikey::encode_public_key(self)
    }

    /// Convert to an `ed25519_dalek::VerifyingKey`.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, KeyError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| KeyError::InvalidKeyMaterial(format!("invalid public key: {e}")))
    }
}

impl Serialize for Ed25519PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_multibase())
    }
}

impl<'de> Deserialize<'de> for Ed25519PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::multikey::decode_public_key(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519PublicKey({})", self.to_multibase())
    }
}

impl std::fmt::Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_multibase())
    }
}

// ---------------------------------------------------------------------------
// Ed25519Signature impls
// ---------------------------------------------------------------------------

impl Ed25519Signature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Render as a multibase base58-btc string (`z…`), the `proofValue` form.
    pub fn to_multibase(&self) -> String {
        crate::multikey::encode_signature(self)
    }
}

impl Serialize for Ed25519Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_multibase())
    }
}

impl<'de> Deserialize<'de> for Ed25519Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::multikey::decode_signature(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mb = self.to_multibase();
        write!(f, "Ed25519Signature({}…)", &mb[..mb.len().min(12)])
    }
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Reconstruct a key pair from a raw 32-byte private key seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Return the private seed in a zeroizing buffer.
    ///
    /// The only consumer is the sealing path, which encrypts the seed at rest
    /// and drops the buffer inside the same call.
    pub fn to_seed(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// The public half of this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    ///
    /// The signing input MUST be `&CanonicalBytes`; raw `&[u8]` is not
    /// accepted, so a non-canonical serialization can never be signed.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        let sig = self.signing_key.sign(data.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }

    /// Sign a precomputed digest pipeline output.
    ///
    /// The `eddsa-jcs-2022` cryptosuite signs the concatenation of two
    /// SHA-256 digests rather than document bytes directly; this entry point
    /// exists for that path. Callers outside the proof engine should use
    /// [`Ed25519KeyPair::sign()`].
    pub fn sign_hash_data(&self, hash_data: &[u8; 64]) -> Ed25519Signature {
        let sig = self.signing_key.sign(hash_data);
        Ed25519Signature(sig.to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an Ed25519 signature over canonical bytes.
///
/// Returns `Ok(())` if valid, `Err(SignatureError::Mismatch)` otherwise.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), SignatureError> {
    verify_hash_data(data.as_bytes(), signature, public_key)
}

/// Verify an Ed25519 signature over raw hash data.
///
/// Counterpart of [`Ed25519KeyPair::sign_hash_data()`] for the
/// `eddsa-jcs-2022` digest pipeline.
pub fn verify_hash_data(
    message: &[u8],
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), SignatureError> {
    let vk = public_key
        .to_verifying_key()
        .map_err(|e| SignatureError::MalformedProof(e.to_string()))?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(message, &sig).map_err(|_| SignatureError::Mismatch)
}
