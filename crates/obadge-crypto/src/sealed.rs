//! # Key Sealing — Private Keys Encrypted at Rest
//!
//! An issuer's Ed25519 private key seed is never stored in the clear. It is
//! sealed with AES-256-GCM under a single process-wide [`MasterKey`] and
//! persisted as a [`SealedKey`] (nonce + ciphertext) on the issuer record.
//!
//! The nonce is randomly generated per seal and stored alongside the
//! ciphertext. Unsealing reconstructs the key pair inside the caller's scope;
//! the plaintext seed lives in a zeroizing buffer and is discarded when the
//! scope ends.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use obadge_core::error::KeyError;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::ed25519::Ed25519KeyPair;

/// AES-GCM standard nonce size.
const NONCE_SIZE: usize = 12;

/// The process-wide master key under which all issuer keys are sealed.
///
/// Supplied by the deployment (environment, secret manager) as 32 bytes of
/// key material. Does not implement `Serialize`; `Debug` output is redacted.
pub struct MasterKey(Zeroizing<[u8; 32]>);

impl MasterKey {
    /// Wrap raw 32-byte key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Parse a master key from a 64-character hex string, the form typically
    /// carried in an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] on wrong length or non-hex
    /// input.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(KeyError::InvalidKeyMaterial(format!(
                "master key hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            let pos = i * 2;
            *chunk = u8::from_str_radix(&hex[pos..pos + 2], 16).map_err(|e| {
                KeyError::InvalidKeyMaterial(format!("invalid hex at position {pos}: {e}"))
            })?;
        }
        Ok(Self(Zeroizing::new(bytes)))
    }

    /// Generate a random master key.
    ///
    /// Intended for tests and first-run provisioning; production deployments
    /// supply the key externally so it survives restarts.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(bytes))
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterKey(<secret>)")
    }
}

/// A sealed private key: nonce + AES-256-GCM ciphertext of the Ed25519 seed.
///
/// This is the only form in which private key material touches storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealedKey {
    /// Per-seal random nonce.
    pub nonce: [u8; NONCE_SIZE],
    /// Ciphertext of the 32-byte seed, GCM tag included.
    pub ciphertext: Vec<u8>,
}

impl SealedKey {
    /// Seal a key pair's private seed under the master key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyMaterial`] if cipher initialization or
    /// encryption fails.
    pub fn seal(master: &MasterKey, keypair: &Ed25519KeyPair) -> Result<Self, KeyError> {
        let cipher = Aes256Gcm::new_from_slice(&*master.0)
            .map_err(|e| KeyError::InvalidKeyMaterial(format!("cipher init failed: {e}")))?;

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let seed = keypair.to_seed();
        let ciphertext = cipher
            .encrypt(nonce, seed.as_slice())
            .map_err(|e| KeyError::InvalidKeyMaterial(format!("seal failed: {e}")))?;

        Ok(Self {
            nonce: nonce_bytes,
            ciphertext,
        })
    }

    /// Unseal the key pair for the given issuer.
    ///
    /// The plaintext seed is held in a zeroizing buffer and dropped before
    /// this function returns; only the reconstructed key pair escapes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Unsealable`] if decryption fails (wrong master
    /// key, corrupt record) or the plaintext is not a 32-byte seed.
    pub fn unseal(&self, master: &MasterKey, issuer: &str) -> Result<Ed25519KeyPair, KeyError> {
        let cipher = Aes256Gcm::new_from_slice(&*master.0).map_err(|e| KeyError::Unsealable {
            issuer: issuer.to_string(),
            reason: format!("cipher init failed: {e}"),
        })?;

        let nonce = Nonce::from_slice(&self.nonce);
        let plaintext = Zeroizing::new(cipher.decrypt(nonce, self.ciphertext.as_ref()).map_err(
            |_| KeyError::Unsealable {
                issuer: issuer.to_string(),
                reason: "decryption failed".into(),
            },
        )?);

        let seed: &[u8; 32] =
            plaintext
                .as_slice()
                .try_into()
                .map_err(|_| KeyError::Unsealable {
                    issuer: issuer.to_string(),
                    reason: format!("unsealed seed must be 32 bytes, got {}", plaintext.len()),
                })?;

        Ok(Ed25519KeyPair::from_seed(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUER: &str = "https://badges.example.edu/issuer";

    #[test]
    fn test_seal_unseal_roundtrip() {
        let master = MasterKey::generate();
        let kp = Ed25519KeyPair::generate();
        let sealed = SealedKey::seal(&master, &kp).unwrap();
        let restored = sealed.unseal(&master, ISSUER).unwrap();
        assert_eq!(kp.public_key(), restored.public_key());
    }

    #[test]
    fn test_wrong_master_key_fails() {
        let kp = Ed25519KeyPair::generate();
        let sealed = SealedKey::seal(&MasterKey::generate(), &kp).unwrap();
        let err = sealed.unseal(&MasterKey::generate(), ISSUER).unwrap_err();
        assert!(matches!(err, KeyError::Unsealable { .. }));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let master = MasterKey::generate();
        let kp = Ed25519KeyPair::generate();
        let mut sealed = SealedKey::seal(&master, &kp).unwrap();
        sealed.ciphertext[0] ^= 0xff;
        assert!(sealed.unseal(&master, ISSUER).is_err());
    }

    #[test]
    fn test_nonces_differ_across_seals() {
        let master = MasterKey::generate();
        let kp = Ed25519KeyPair::generate();
        let s1 = SealedKey::seal(&master, &kp).unwrap();
        let s2 = SealedKey::seal(&master, &kp).unwrap();
        assert_ne!(s1.nonce, s2.nonce);
    }

    #[test]
    fn test_master_key_from_hex() {
        let hex = "aa".repeat(32);
        assert!(MasterKey::from_hex(&hex).is_ok());
        assert!(MasterKey::from_hex("aabb").is_err());
        assert!(MasterKey::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_master_key_debug_redacted() {
        let master = MasterKey::generate();
        assert_eq!(format!("{master:?}"), "MasterKey(<secret>)");
    }

    #[test]
    fn test_sealed_key_serde_roundtrip() {
        let master = MasterKey::from_bytes([7u8; 32]);
        let kp = Ed25519KeyPair::generate();
        let sealed = SealedKey::seal(&master, &kp).unwrap();
        let json = serde_json::to_string(&sealed).unwrap();
        let parsed: SealedKey = serde_json::from_str(&json).unwrap();
        let restored = parsed.unseal(&master, ISSUER).unwrap();
        assert_eq!(kp.public_key(), restored.public_key());
    }
}
