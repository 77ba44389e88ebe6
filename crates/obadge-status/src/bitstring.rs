//! # Status Bitstring Codec
//!
//! The growable bit arena behind an issuer's status list, and its wire
//! encoding: GZIP over the packed bytes, multibase base64url-no-pad text.
//!
//! Index 0 is the left-most bit of the uncompressed bitstring (MSB-first
//! within each byte). The uncompressed size never falls below 16 KB
//! (131 072 entries) — with only a handful of revocations the compressed
//! form is a few hundred bytes regardless. A reader must tolerate a list
//! that has grown since it was encoded: indices beyond the encoded length
//! read as unrevoked.

use std::io::{Read, Write};

use bitvec::order::Msb0;
use bitvec::vec::BitVec;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use multibase::Base;
use obadge_core::error::RevocationError;

/// Minimum number of entries in a status list (16 KB uncompressed), the
/// floor required by Bitstring Status List v1.0 for herd privacy.
pub const MIN_ENTRIES: usize = 131_072;

/// A growable revocation bitstring, one bit per issued credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBitstring {
    bits: BitVec<u8, Msb0>,
}

impl StatusBitstring {
    /// A fresh all-zero bitstring of the minimum size.
    pub fn new() -> Self {
        Self {
            bits: BitVec::repeat(false, MIN_ENTRIES),
        }
    }

    /// Number of entries currently represented.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the bitstring holds no entries. Never true for lists built by
    /// this engine (the minimum size applies), but part of the contract.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Read the bit at `index`. Indices beyond the current length read as
    /// `false` — a list that grew since encoding defaults new entries to
    /// unrevoked.
    pub fn get(&self, index: u64) -> bool {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.bits.get(i).map(|b| *b))
            .unwrap_or(false)
    }

    /// Set the bit at `index`, growing the arena (in whole bytes, and never
    /// below the minimum size) if the index lies beyond it.
    pub fn set(&mut self, index: u64, value: bool) -> Result<(), RevocationError> {
        let i = usize::try_from(index).map_err(|_| {
            RevocationError::CorruptList(format!("status index {index} exceeds addressable range"))
        })?;
        if i >= self.bits.len() {
            let new_len = (i + 1).next_multiple_of(8).max(MIN_ENTRIES);
            self.bits.resize(new_len, false);
        }
        self.bits.set(i, value);
        Ok(())
    }

    /// Indices of all set bits. Primarily for diagnostics and tests.
    pub fn set_indices(&self) -> Vec<u64> {
        self.bits.iter_ones().map(|i| i as u64).collect()
    }

    /// Encode: GZIP the packed bytes, then multibase base64url-no-pad.
    ///
    /// # Errors
    ///
    /// Returns [`RevocationError::CorruptList`] on a compression failure.
    pub fn encode(&self) -> Result<String, RevocationError> {
        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(self.bits.as_raw_slice())
            .map_err(|e| RevocationError::CorruptList(format!("gzip failed: {e}")))?;
        let compressed = encoder
            .finish()
            .map_err(|e| RevocationError::CorruptList(format!("gzip failed: {e}")))?;
        Ok(multibase::encode(Base::Base64Url, compressed))
    }

    /// Decode an encoded list back into a bitstring.
    ///
    /// # Errors
    ///
    /// Returns [`RevocationError::CorruptList`] if the text is not multibase,
    /// the payload is not valid GZIP, or decompression overruns the maximum
    /// expected size.
    pub fn decode(encoded: &str) -> Result<Self, RevocationError> {
        let (_, compressed) = multibase::decode(encoded)
            .map_err(|e| RevocationError::CorruptList(format!("multibase decode failed: {e}")))?;

        let mut bytes = Vec::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut bytes)
            .map_err(|e| RevocationError::CorruptList(format!("gunzip failed: {e}")))?;

        Ok(Self {
            bits: BitVec::from_vec(bytes),
        })
    }
}

impl Default for StatusBitstring {
    fn default() -> Self {
        Self::new()
    }
}
