//! # obadge-core — Foundational Types for the Open Badge Engine
//!
//! This crate is the bedrock of the engine. It defines the type-system
//! primitives that enforce correctness guarantees at compile time. Every other
//! crate in the workspace depends on `obadge-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `IssuerId`, `AchievementId`,
//!    `CredentialId`, `StatusIndex` — all newtypes with validated
//!    constructors. No bare strings for identifiers.
//!
//! 2. **`CanonicalBytes` newtype.** ALL signature and digest computation flows
//!    through `CanonicalBytes::new()`. No raw `serde_json::to_vec()` on a
//!    signing path. Ever. A signature produced over one serialization and
//!    verified over another is the defining failure mode of this domain, and
//!    the private inner buffer makes it unrepresentable.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with `Z`
//!    suffix and seconds precision — matching the canonicalization rules, so
//!    a timestamp can never render two different ways in signed output.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `obadge-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize` where they appear in documents or records.

pub mod canonical;
pub mod error;
pub mod identity;
pub mod recipient;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{
    CanonicalizationError, EngineError, KeyError, RevocationError, SignatureError, StorageError,
    ValidationError,
};
pub use identity::{AchievementId, CredentialId, IssuerId, StatusIndex};
pub use recipient::{hash_identity, matches_identity};
pub use temporal::Timestamp;
