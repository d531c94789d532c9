// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Narrow contract towards the cryptographic primitive engine.
//!
//! The trust store and chain validator never interpret key material
//! themselves: every signature check goes through [`CryptoProvider`], and
//! CSR/certificate issuance signs through [`SigningContext`]. Callers pass
//! the provider they need into each call; no artifact keeps its producing
//! provider alive.

use crate::{Error, Result};
use const_oid::ObjectIdentifier;
use ed25519_dalek::{Signer, Verifier};
use sha2::{Digest, Sha256};

/// ASN.1 object identifier for Ed25519 (RFC 8410).
pub const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// An opaque, externally-verifiable public key handle.
///
/// The `key` bytes are the raw subjectPublicKey BIT STRING contents; only
/// the [`CryptoProvider`] matching `algorithm` can interpret them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PublicKeyDescriptor {
    /// Key algorithm identifier.
    pub algorithm: ObjectIdentifier,
    /// Raw public key bytes.
    pub key: Vec<u8>,
}

/// Signature verification and digest computation contract.
pub trait CryptoProvider {
    /// Computes the provider's standing digest of the given bytes.
    fn digest(&self, data: &[u8]) -> Vec<u8>;

    /// Verifies `signature` over `message` against the given public key.
    ///
    /// Returns `Ok(false)` for a well-formed but invalid signature and
    /// `Err(UnknownIdentifier)` when the algorithm is not supported.
    fn verify_signature(
        &self,
        key: &PublicKeyDescriptor,
        message: &[u8],
        signature: &[u8],
        algorithm: ObjectIdentifier,
    ) -> Result<bool>;
}

/// Signing contract used by CSR and certificate issuance only.
pub trait SigningContext {
    /// Signature algorithm identifier this context produces.
    fn algorithm(&self) -> ObjectIdentifier;

    /// Public key descriptor matching the signing key.
    fn public_key(&self) -> PublicKeyDescriptor;

    /// Signs the given message bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Ed25519-backed crypto provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Provider;

impl CryptoProvider for Ed25519Provider {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        Sha256::digest(data).to_vec()
    }

    fn verify_signature(
        &self,
        key: &PublicKeyDescriptor,
        message: &[u8],
        signature: &[u8],
        algorithm: ObjectIdentifier,
    ) -> Result<bool> {
        if algorithm != ED25519_OID || key.algorithm != ED25519_OID {
            return Err(Error::UnknownIdentifier {
                details: format!("unsupported signature algorithm {algorithm}"),
            });
        }
        let key_bytes: [u8; 32] = key
            .key
            .as_slice()
            .try_into()
            .map_err(|_| Error::invalid("Ed25519 public key must be 32 bytes"))?;
        let verifying = match ed25519_dalek::VerifyingKey::from_bytes(&key_bytes) {
            Ok(key) => key,
            Err(_) => return Ok(false),
        };
        let signature = match ed25519_dalek::Signature::from_slice(signature) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        Ok(verifying.verify(message, &signature).is_ok())
    }
}

/// Ed25519 signing context.
#[derive(Clone)]
pub struct Ed25519Signer {
    inner: ed25519_dalek::SigningKey,
}

impl Ed25519Signer {
    /// Creates a new signing context seeded from OS randomness.
    pub fn generate() -> Result<Self> {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed).map_err(|_| Error::RuntimeFault {
            details: "entropy source unavailable".into(),
        })?;
        Ok(Self::from_bytes(&seed))
    }

    /// Creates a signing context from a 32-byte seed.
    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        Self {
            inner: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }
}

impl SigningContext for Ed25519Signer {
    fn algorithm(&self) -> ObjectIdentifier {
        ED25519_OID
    }

    fn public_key(&self) -> PublicKeyDescriptor {
        PublicKeyDescriptor {
            algorithm: ED25519_OID,
            key: self.inner.verifying_key().to_bytes().to_vec(),
        }
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        Ok(self.inner.sign(message).to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies that a signed message verifies under the matching key only.
    #[test]
    fn test_sign_verify() {
        let signer = Ed25519Signer::generate().unwrap();
        let wrong = Ed25519Signer::generate().unwrap();
        let provider = Ed25519Provider;

        let msg = b"to-be-signed";
        let sig = signer.sign(msg).unwrap();

        assert!(
            provider
                .verify_signature(&signer.public_key(), msg, &sig, ED25519_OID)
                .unwrap()
        );
        assert!(
            !provider
                .verify_signature(&wrong.public_key(), msg, &sig, ED25519_OID)
                .unwrap()
        );
        assert!(
            !provider
                .verify_signature(&signer.public_key(), b"tampered", &sig, ED25519_OID)
                .unwrap()
        );
    }

    /// Verifies that an unsupported algorithm id is an error, not a false.
    #[test]
    fn test_unknown_algorithm() {
        let signer = Ed25519Signer::generate().unwrap();
        let provider = Ed25519Provider;
        let rsa_oid = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
        let result = provider.verify_signature(&signer.public_key(), b"m", &[0u8; 64], rsa_oid);
        assert!(matches!(result, Err(Error::UnknownIdentifier { .. })));
    }
}
