//! # Multikey Text Encoding
//!
//! Self-describing text encodings for key material and signatures, following
//! the W3C Controlled Identifiers / Multikey conventions:
//!
//! - A public key is the two-byte Ed25519 multicodec prefix (`0xed 0x01`)
//!   followed by the 32 raw key bytes, multibase-encoded with base58-btc.
//!   The result always begins `z6Mk`.
//! - A signature (`proofValue`) is the 64 raw signature bytes multibase-encoded
//!   with base58-btc, no multicodec prefix, per the EdDSA cryptosuites.

use multibase::Base;
use obadge_core::error::{KeyError, SignatureError};

use crate::ed25519::{Ed25519PublicKey, Ed25519Signature};

/// Multicodec prefix identifying an Ed25519 public key.
const ED25519_CODEC: [u8; 2] = [0xed, 0x01];

/// Encode a public key as a Multikey string (`z6Mk…`).
pub fn encode_public_key(key: &Ed25519PublicKey) -> String {
    let mut multi_bytes = Vec::with_capacity(2 + 32);
    multi_bytes.extend_from_slice(&ED25519_CODEC);
    multi_bytes.extend_from_slice(key.as_bytes());
    multibase::encode(Base::Base58Btc, &multi_bytes)
}

/// Decode a Multikey string into an Ed25519 public key.
///
/// # Errors
///
/// Returns [`KeyError::InvalidKeyMaterial`] if the string is not valid
/// multibase, does not carry the Ed25519 multicodec prefix, or has the wrong
/// length.
pub fn decode_public_key(multikey: &str) -> Result<Ed25519PublicKey, KeyError> {
    let (_, bytes) = multibase::decode(multikey)
        .map_err(|e| KeyError::InvalidKeyMaterial(format!("multibase decode failed: {e}")))?;

    if bytes.len() != 2 + 32 {
        return Err(KeyError::InvalidKeyMaterial(format!(
            "multikey must be 34 bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0..2] != ED25519_CODEC {
        return Err(KeyError::InvalidKeyMaterial(
            "multikey does not carry the Ed25519 multicodec prefix".into(),
        ));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes[2..]);
    Ok(Ed25519PublicKey::from_bytes(key))
}

/// Encode a signature as a multibase base58-btc string for `proofValue`.
pub fn encode_signature(signature: &Ed25519Signature) -> String {
    multibase::encode(Base::Base58Btc, signature.as_bytes())
}

/// Decode a `proofValue` string into an Ed25519 signature.
///
/// # Errors
///
/// Returns [`SignatureError::MalformedProof`] if the string is not valid
/// multibase or the decoded payload is not 64 bytes.
pub fn decode_signature(proof_value: &str) -> Result<Ed25519Signature, SignatureError> {
    let (_, bytes) = multibase::decode(proof_value)
        .map_err(|e| SignatureError::MalformedProof(format!("multibase decode failed: {e}")))?;

    if bytes.len() != 64 {
        return Err(SignatureError::MalformedProof(format!(
            "signature must be 64 bytes, got {}",
            bytes.len()
        )));
    }

    let mut sig = [0u8; 64];
    sig.copy_from_slice(&bytes);
    Ok(Ed25519Signature::from_bytes(sig))
}
