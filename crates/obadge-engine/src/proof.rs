//! # Proof Engine — eddsa-jcs-2022
//!
//! Builds and validates `DataIntegrityProof` blocks per the
//! [`eddsa-jcs-2022`](https://www.w3.org/TR/vc-di-eddsa/) cryptosuite:
//!
//! 1. Remove any `proof` from the document; JCS-canonicalize the remainder.
//! 2. JCS-canonicalize the proof configuration (the proof fields minus
//!    `proofValue`, sharing the document's `@context`).
//! 3. The signed message is `SHA-256(config) || SHA-256(document)` — 64
//!    bytes, signed directly with Ed25519.
//!
//! Signing and verification call the identical canonicalization path (both
//! are forced through `CanonicalBytes`); a divergence there would make every
//! freshly-signed credential fail verification, so there is exactly one code
//! path for the hash data, shared by both directions.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::debug;

use obadge_core::error::{CanonicalizationError, EngineError, SignatureError};
use obadge_core::{CanonicalBytes, IssuerId, Timestamp};
use obadge_crypto::{decode_public_key, decode_signature, MasterKey};
use obadge_vc::proof::{CRYPTOSUITE_EDDSA_JCS_2022, PROOF_TYPE_DATA_INTEGRITY};
use obadge_vc::Proof;

use crate::keys::KeyManager;
use crate::store::BadgeStore;

/// Signs documents and validates embedded proofs.
pub struct ProofEngine<'a, S> {
    store: &'a S,
    master: &'a MasterKey,
}

impl<'a, S: BadgeStore> ProofEngine<'a, S> {
    /// A proof engine over the given store and master key.
    pub fn new(store: &'a S, master: &'a MasterKey) -> Self {
        Self { store, master }
    }

    /// Sign a document with the issuer's key, returning the document with an
    /// embedded proof.
    ///
    /// Any existing `proof` property is discarded and replaced. Provisions
    /// the issuer's key on first use.
    ///
    /// # Errors
    ///
    /// Typed errors for every failure — no partially-signed document is ever
    /// returned.
    pub fn sign(&self, document: &Value, issuer_id: &IssuerId) -> Result<Value, EngineError> {
        let object = document.as_object().ok_or_else(|| {
            SignatureError::MalformedProof("document to sign is not a JSON object".into())
        })?;

        let keys = KeyManager::new(self.store, self.master);
        let key = keys.ensure_key(issuer_id)?;

        let mut unsigned = object.clone();
        unsigned.remove("proof");
        let unsigned = Value::Object(unsigned);

        let proof = Proof::config(key.verification_method, Timestamp::now());
        let config = proof_config(&proof, &unsigned)?;
        let hash_data = hash_data(&unsigned, &config)?;

        let signature = keys.with_signing_key(issuer_id, |kp| kp.sign_hash_data(&hash_data))?;
        let complete = proof.with_value(signature.to_multibase());

        let mut signed = object.clone();
        signed.insert(
            "proof".to_string(),
            serde_json::to_value(&complete).map_err(CanonicalizationError::from)?,
        );
        debug!(issuer = %issuer_id, "signed document");
        Ok(Value::Object(signed))
    }

    /// Verify a document's embedded proof. Never panics; `false` covers
    /// every failure mode.
    pub fn verify(&self, document: &Value) -> bool {
        self.check(document).is_ok()
    }

    /// Verify a document's embedded proof, reporting the failure cause.
    ///
    /// # Errors
    ///
    /// [`SignatureError`] variants for the proof-level failures the
    /// verification report names; storage failures propagate as themselves.
    pub fn check(&self, document: &Value) -> Result<(), EngineError> {
        let object = document
            .as_object()
            .ok_or_else(|| SignatureError::MalformedProof("document is not a JSON object".into()))?;

        // A document may carry one proof or an array; this engine emits one
        // and verifies against the first.
        let raw_proof = match object.get("proof") {
            Some(Value::Object(p)) => p.clone(),
            Some(Value::Array(items)) => match items.first() {
                Some(Value::Object(p)) => p.clone(),
                _ => return Err(SignatureError::MissingProof.into()),
            },
            _ => return Err(SignatureError::MissingProof.into()),
        };

        let proof: Proof = serde_json::from_value(Value::Object(raw_proof.clone()))
            .map_err(|e| SignatureError::MalformedProof(e.to_string()))?;

        if proof.proof_type != PROOF_TYPE_DATA_INTEGRITY {
            return Err(SignatureError::UnsupportedSuite(proof.proof_type).into());
        }
        if proof.cryptosuite != CRYPTOSUITE_EDDSA_JCS_2022 {
            return Err(SignatureError::UnsupportedSuite(proof.cryptosuite).into());
        }
        let proof_value = proof
            .proof_value
            .as_deref()
            .ok_or_else(|| SignatureError::MalformedProof("proof has no proofValue".into()))?;
        let signature = decode_signature(proof_value)?;

        let public_key = self.resolve_verification_method(&proof.verification_method)?;

        let mut unsigned = object.clone();
        unsigned.remove("proof");
        let unsigned = Value::Object(unsigned);

        // Rebuild the proof configuration exactly as signed: the embedded
        // proof minus its value, under the document's @context.
        let mut config = raw_proof;
        config.remove("proofValue");
        let config = attach_context(config, &unsigned);

        let hash_data = hash_data(&unsigned, &config)?;
        obadge_crypto::ed25519::verify_hash_data(&hash_data, &signature, &public_key)?;
        Ok(())
    }

    /// Resolve a `verificationMethod` back to the issuer record it names.
    ///
    /// The reference is the issuer id plus a `#key-0` fragment; anything
    /// that does not round-trip through a stored issuer's own
    /// `verification_method()` is unresolvable.
    fn resolve_verification_method(
        &self,
        method: &str,
    ) -> Result<obadge_crypto::Ed25519PublicKey, EngineError> {
        let unresolvable = || SignatureError::UnresolvableMethod(method.to_string());

        let issuer_str = method.split('#').next().unwrap_or_default();
        let issuer_id = IssuerId::new(issuer_str).map_err(|_| unresolvable())?;
        let record = self.store.issuer(&issuer_id)?.ok_or_else(unresolvable)?;
        if record.verification_method() != method {
            return Err(unresolvable().into());
        }
        let multibase = record.public_key_multibase.as_deref().ok_or_else(unresolvable)?;
        let public_key = decode_public_key(multibase)
            .map_err(|e| SignatureError::MalformedProof(e.to_string()))?;
        Ok(public_key)
    }
}

/// The proof configuration for signing: the typed proof (no value yet)
/// under the document's `@context`.
fn proof_config(proof: &Proof, document: &Value) -> Result<Value, EngineError> {
    let config = serde_json::to_value(proof)
        .map_err(CanonicalizationError::from)?
        .as_object()
        .cloned()
        .unwrap_or_default();
    Ok(attach_context(config, document))
}

fn attach_context(mut config: Map<String, Value>, document: &Value) -> Value {
    match document.get("@context") {
        Some(context) => {
            config.insert("@context".to_string(), context.clone());
        }
        None => {
            config.remove("@context");
        }
    }
    Value::Object(config)
}

/// The 64-byte signed message: `SHA-256(config) || SHA-256(document)`.
///
/// The one code path shared by signing and verification.
fn hash_data(unsigned_document: &Value, proof_config: &Value) -> Result<[u8; 64], EngineError> {
    let config_hash = Sha256::digest(CanonicalBytes::new(proof_config)?.as_bytes());
    let document_hash = Sha256::digest(CanonicalBytes::new(unsigned_document)?.as_bytes());

    let mut data = [0u8; 64];
    data[..32].copy_from_slice(&config_hash);
    data[32..].copy_from_slice(&document_hash);
    Ok(data)
}
