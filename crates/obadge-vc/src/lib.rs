//! # obadge-vc — Open Badge Document Model
//!
//! Implements the two document generations the engine issues and verifies:
//!
//! - **Legacy / OB2** (`legacy.rs`): flat JSON-LD `Assertion` with embedded
//!   `BadgeClass` and issuer `Profile`, hosted verification, no embedded
//!   proof.
//! - **Verifiable Credential / OB3** (`credential.rs`): W3C VC envelope
//!   wrapping an `AchievementSubject`, with `credentialStatus` linkage into
//!   the issuer's bitstring status list.
//! - **Proof** (`proof.rs`): the `DataIntegrityProof` block
//!   (`eddsa-jcs-2022`).
//! - **`AnyCredential`** (`document.rs`): the tagged union over both formats,
//!   with classification of raw JSON by its declared `type` — consumers
//!   branch on the tag, never on duck-typed field presence.
//! - **Records** (`records.rs`): the stored issuer/achievement/credential
//!   records the storage collaborator persists.
//! - **Builder** (`builder.rs`): maps records into either document format.
//!
//! ## Crate Policy
//!
//! - Envelope structure is rigid; only the achievement subject is extensible.
//! - No cryptography here beyond the sealed-key type carried on records —
//!   signing and verification live in `obadge-engine`.

pub mod builder;
pub mod credential;
pub mod document;
pub mod legacy;
pub mod proof;
pub mod records;

pub use builder::{build, StatusEntryParams};
pub use credential::{
    AchievementSubject, CredentialStatus, IssuerProfile, VerifiableCredential,
};
pub use document::{AnyCredential, CredentialFormat};
pub use legacy::Assertion;
pub use proof::{Proof, ProofPurpose};
pub use records::{AchievementRecord, CredentialRecord, IssuerRecord, RecipientIdentity};
