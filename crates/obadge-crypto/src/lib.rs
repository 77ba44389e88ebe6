//! # obadge-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the Open Badge engine:
//!
//! - **Ed25519** signing and verification for credential proofs. Signing
//!   input is `&CanonicalBytes` only — you cannot sign raw bytes, so every
//!   signature in the system is provably over canonicalized data.
//! - **Multikey** text encoding: multibase base58-btc public keys with the
//!   Ed25519 multicodec prefix (`z6Mk…`), and multibase signature values for
//!   `proofValue`.
//! - **Key sealing**: AES-256-GCM envelope encryption of an issuer's private
//!   key seed under the process-wide master key. Private keys exist in
//!   plaintext only inside a scoped unseal-use-discard window.
//!
//! ## Crate Policy
//!
//! - Depends only on `obadge-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   `CanonicalBytes`, real Ed25519, real AES-GCM.
//! - Private key types implement neither `Serialize` nor `Debug`-with-content.

pub mod ed25519;
pub mod multikey;
pub mod sealed;

pub use ed25519::{verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use multikey::{decode_public_key, decode_signature, encode_public_key, encode_signature};
pub use sealed::{MasterKey, SealedKey};
