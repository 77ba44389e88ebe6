//! # obadge-status — Bitstring Revocation Lists
//!
//! One compact bitstring per issuer signals revocation for every credential
//! that issuer has ever minted: bit `i` is 1 iff the credential holding
//! status index `i` is currently revoked. Follows
//! [Bitstring Status List v1.0](https://www.w3.org/TR/vc-bitstring-status-list/):
//! MSB-first bit packing (index 0 is the left-most bit), a 16 KB uncompressed
//! floor so small deployments stay unlinkable, GZIP compression, and a
//! multibase base64url-no-pad (`u`) text encoding.
//!
//! The bitstring is published inside a *wrapping credential* — itself a
//! verifiable credential, signed by the issuer — so a verifier can check
//! revocation offline from one fetched artifact. This crate builds the
//! unsigned wrapper; signing and the read-modify-write discipline live in
//! `obadge-engine`.

pub mod bitstring;
pub mod list;

pub use bitstring::{StatusBitstring, MIN_ENTRIES};
pub use list::{build_list_document, list_credential_url, StatusListRecord};
