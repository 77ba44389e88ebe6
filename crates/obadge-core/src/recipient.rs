//! # Recipient Identity Hashing
//!
//! Badge recipients may be identified in the open (`"alice@example.org"`) or
//! as a salted hash, so that a published assertion does not leak the
//! recipient's address while the recipient can still prove it is theirs.
//!
//! The hashed form follows the Open Badges convention: the algorithm name,
//! a `$` separator, and the lowercase hex digest of the identity string
//! concatenated with the salt — `sha256$2f77f0…`.

use sha2::{Digest, Sha256};

/// Prefix tag for SHA-256 hashed identities.
const SHA256_PREFIX: &str = "sha256$";

/// Hash a recipient identity with a salt.
///
/// Returns the self-describing hashed form `sha256$<hex>`. The salt must be
/// stored (or published) alongside the assertion for later matching.
pub fn hash_identity(identity: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("{SHA256_PREFIX}{hex}")
}

/// Check whether a stored identity value matches a plaintext identity.
///
/// Handles both forms: a hashed value (`sha256$…`) is re-derived with the
/// given salt and compared, a plaintext value is compared directly. Unknown
/// hash prefixes never match.
pub fn matches_identity(stored: &str, identity: &str, salt: &str) -> bool {
    if let Some(hex) = stored.strip_prefix(SHA256_PREFIX) {
        let derived = hash_identity(identity, salt);
        // Compare against the rederived full form to keep one code path.
        derived.strip_prefix(SHA256_PREFIX) == Some(hex)
    } else if stored.contains('$') {
        false
    } else {
        stored == identity
    }
}
