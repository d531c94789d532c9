// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! PKCS #10 certificate signing requests, see RFC 2986.

use super::{BasicCertInfo, RawExtension};
use crate::name::DistinguishedName;
use crate::provider::{CryptoProvider, PublicKeyDescriptor, SigningContext};
use crate::{Error, Result, pem};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, BitString, OctetString, PrintableStringRef, SetOfVec, Utf8StringRef};
use der::{Decode, Encode, Tag, Tagged};
use std::collections::HashSet;
use x509_cert::attr::Attribute;
use x509_cert::ext::Extension;
use x509_cert::request::{CertReq, CertReqInfo, Version};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

/// PKCS #9 extensionRequest attribute (1.2.840.113549.1.9.14).
const OID_EXTENSION_REQUEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.14");
/// PKCS #9 challengePassword attribute (1.2.840.113549.1.9.7).
const OID_CHALLENGE_PASSWORD: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.7");

/// Processing state a stored signing request moves through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PendingStatus {
    /// Saved but not yet picked up by an authority.
    #[default]
    New,
    /// Handed to an authority, awaiting issuance or rejection.
    Pending,
}

/// A parsed PKCS #10 certificate signing request.
///
/// The raw DER is retained alongside the decoded fields so the request can
/// be re-serialized byte for byte.
#[derive(Clone, Debug)]
pub struct CertSignRequest {
    der: Vec<u8>,
    info_der: Vec<u8>,
    subject: DistinguishedName,
    public_key: PublicKeyDescriptor,
    requested_extensions: Vec<RawExtension>,
    challenge_password: Option<String>,
    signature_algorithm: ObjectIdentifier,
    signature: Vec<u8>,
}

impl CertSignRequest {
    /// Parses a DER-encoded PKCS #10 request.
    ///
    /// The proof-of-possession signature is NOT checked here; call
    /// [`CertSignRequest::verify`] with a provider for that.
    pub fn parse_der(der: &[u8]) -> Result<Self> {
        let req = CertReq::from_der(der)?;
        if req.info.version != Version::V1 {
            return Err(Error::invalid("unsupported CSR version"));
        }

        let subject = DistinguishedName::parse_der(&req.info.subject.to_der()?)?;
        if subject.attrs.is_empty() {
            return Err(Error::invalid("CSR subject DN must not be empty"));
        }
        if subject.has_wildcard() {
            return Err(Error::invalid("CSR subject DN must not contain wildcards"));
        }

        let key_bytes = req
            .info
            .public_key
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| Error::invalid("CSR public key has unused bits"))?;
        let public_key = PublicKeyDescriptor {
            algorithm: req.info.public_key.algorithm.oid,
            key: key_bytes.to_vec(),
        };

        let mut requested_extensions = Vec::new();
        let mut challenge_password = None;
        let mut seen_attrs = HashSet::new();
        for attr in req.info.attributes.iter() {
            if !seen_attrs.insert(attr.oid) {
                return Err(Error::invalid(format!(
                    "duplicate CSR attribute {}",
                    attr.oid
                )));
            }
            match attr.oid {
                OID_EXTENSION_REQUEST => {
                    let value = single_attribute_value(attr)?;
                    let extensions = Vec::<Extension>::from_der(&value.to_der()?)?;
                    let mut seen_oids = HashSet::new();
                    for ext in extensions {
                        if !seen_oids.insert(ext.extn_id) {
                            return Err(Error::invalid(format!(
                                "duplicate requested extension {}",
                                ext.extn_id
                            )));
                        }
                        requested_extensions.push(RawExtension {
                            oid: ext.extn_id,
                            critical: ext.critical,
                            value: ext.extn_value.as_bytes().to_vec(),
                        });
                    }
                }
                OID_CHALLENGE_PASSWORD => {
                    challenge_password = Some(decode_directory_string(single_attribute_value(
                        attr,
                    )?)?);
                }
                // Unknown attributes are carried in the DER but not surfaced.
                _ => {}
            }
        }

        let signature = req
            .signature
            .as_bytes()
            .ok_or_else(|| Error::invalid("CSR signature has unused bits"))?
            .to_vec();

        Ok(Self {
            der: der.to_vec(),
            info_der: req.info.to_der()?,
            subject,
            public_key,
            requested_extensions,
            challenge_password,
            signature_algorithm: req.algorithm.oid,
            signature,
        })
    }

    /// Parses a PEM-encoded (`CERTIFICATE REQUEST`) request.
    pub fn parse_pem(data: &str) -> Result<Self> {
        Self::parse_der(&pem::decode_kind(data.as_bytes(), pem::KIND_CERT_REQUEST)?)
    }

    /// Builds and signs a new request for the given subject and the
    /// context's own key.
    pub fn create(
        subject: &DistinguishedName,
        signer: &dyn SigningContext,
        requested_extensions: &[RawExtension],
        challenge_password: Option<&str>,
    ) -> Result<Self> {
        if subject.attrs.is_empty() {
            return Err(Error::invalid("CSR subject DN must not be empty"));
        }
        if subject.has_wildcard() {
            return Err(Error::invalid("CSR subject DN must not contain wildcards"));
        }

        let mut attributes = SetOfVec::<Attribute>::new();
        if !requested_extensions.is_empty() {
            let mut extensions = Vec::with_capacity(requested_extensions.len());
            let mut seen_oids = HashSet::new();
            for ext in requested_extensions {
                if !seen_oids.insert(ext.oid) {
                    return Err(Error::invalid(format!(
                        "duplicate requested extension {}",
                        ext.oid
                    )));
                }
                extensions.push(Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                });
            }
            let mut values = SetOfVec::new();
            values.insert(Any::from_der(&extensions.to_der()?)?)?;
            attributes.insert(Attribute {
                oid: OID_EXTENSION_REQUEST,
                values,
            })?;
        }
        if let Some(password) = challenge_password {
            let mut values = SetOfVec::new();
            values.insert(Any::new(Tag::Utf8String, password.as_bytes())?)?;
            attributes.insert(Attribute {
                oid: OID_CHALLENGE_PASSWORD,
                values,
            })?;
        }

        let key = signer.public_key();
        let info = CertReqInfo {
            version: Version::V1,
            subject: subject.to_x509_name()?,
            public_key: SubjectPublicKeyInfoOwned {
                algorithm: AlgorithmIdentifierOwned {
                    oid: key.algorithm,
                    parameters: None,
                },
                subject_public_key: BitString::from_bytes(&key.key)?,
            },
            attributes,
        };

        let info_der = info.to_der()?;
        let signature = signer.sign(&info_der)?;
        let req = CertReq {
            info,
            algorithm: AlgorithmIdentifierOwned {
                oid: signer.algorithm(),
                parameters: None,
            },
            signature: BitString::from_bytes(&signature)?,
        };

        Self::parse_der(&req.to_der()?)
    }

    /// Checks the proof-of-possession signature against the embedded key.
    pub fn verify(&self, provider: &dyn CryptoProvider) -> Result<bool> {
        provider.verify_signature(
            &self.public_key,
            &self.info_der,
            &self.signature,
            self.signature_algorithm,
        )
    }

    /// Requested subject distinguished name.
    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    /// Public key the requester wants certified.
    pub fn public_key(&self) -> &PublicKeyDescriptor {
        &self.public_key
    }

    /// Extensions the requester asked for, in request order.
    pub fn requested_extensions(&self) -> &[RawExtension] {
        &self.requested_extensions
    }

    /// Challenge password attribute, if present.
    pub fn challenge_password(&self) -> Option<&str> {
        self.challenge_password.as_deref()
    }
}

impl BasicCertInfo for CertSignRequest {
    fn signature_algorithm(&self) -> ObjectIdentifier {
        self.signature_algorithm
    }

    fn signed_bytes(&self) -> &[u8] {
        &self.info_der
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn to_der(&self) -> Vec<u8> {
        self.der.clone()
    }

    fn to_pem(&self) -> String {
        pem::encode(pem::KIND_CERT_REQUEST, &self.der)
    }
}

/// Extracts the single value of a PKCS #9 attribute.
fn single_attribute_value(attr: &Attribute) -> Result<&Any> {
    if attr.values.len() != 1 {
        return Err(Error::invalid(format!(
            "CSR attribute {} must carry exactly one value",
            attr.oid
        )));
    }
    attr.values
        .get(0)
        .ok_or_else(|| Error::invalid("empty CSR attribute"))
}

/// Decodes a challengePassword value (UTF8String or PrintableString).
fn decode_directory_string(value: &Any) -> Result<String> {
    let der = value.to_der()?;
    match value.tag() {
        Tag::Utf8String => Ok(Utf8StringRef::from_der(&der)?.as_str().to_owned()),
        Tag::PrintableString => Ok(PrintableStringRef::from_der(&der)?.as_str().to_owned()),
        tag => Err(Error::invalid(format!(
            "unsupported challengePassword encoding {tag}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Ed25519Provider, Ed25519Signer, SigningContext};

    fn sample_subject() -> DistinguishedName {
        DistinguishedName::new().cn("unit.device.example")
    }

    /// Verifies that a created request round-trips through DER and carries
    /// the subject, key and attributes it was built with.
    #[test]
    fn test_create_and_parse_roundtrip() {
        let signer = Ed25519Signer::generate().unwrap();
        let ext = RawExtension {
            oid: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.62253.9.2"),
            critical: false,
            value: vec![0x04, 0x02, 0xAB, 0xCD],
        };
        let csr = CertSignRequest::create(
            &sample_subject(),
            &signer,
            std::slice::from_ref(&ext),
            Some("factory-floor-7"),
        )
        .unwrap();

        let parsed = CertSignRequest::parse_der(&csr.to_der()).unwrap();
        assert_eq!(parsed.subject(), &sample_subject());
        assert_eq!(parsed.public_key(), &signer.public_key());
        assert_eq!(parsed.requested_extensions(), &[ext]);
        assert_eq!(parsed.challenge_password(), Some("factory-floor-7"));
    }

    /// Verifies that proof-of-possession verification accepts a genuine
    /// request and rejects a tampered one.
    #[test]
    fn test_verify_proof_of_possession() {
        let signer = Ed25519Signer::generate().unwrap();
        let csr = CertSignRequest::create(&sample_subject(), &signer, &[], None).unwrap();
        let provider = Ed25519Provider;
        assert!(csr.verify(&provider).unwrap());

        let mut tampered = csr.clone();
        tampered.info_der[10] ^= 0xFF;
        assert!(!tampered.verify(&provider).unwrap());
    }

    /// Verifies that wildcard subjects are rejected for signing requests.
    #[test]
    fn test_rejects_wildcard_subject() {
        let signer = Ed25519Signer::generate().unwrap();
        let subject = DistinguishedName::parse_str("CN=*").unwrap();
        assert!(CertSignRequest::create(&subject, &signer, &[], None).is_err());
    }

    /// Verifies that PEM round-tripping preserves the request bytes.
    #[test]
    fn test_pem_roundtrip() {
        let signer = Ed25519Signer::generate().unwrap();
        let csr = CertSignRequest::create(&sample_subject(), &signer, &[], None).unwrap();
        let parsed = CertSignRequest::parse_pem(&csr.to_pem()).unwrap();
        assert_eq!(parsed.to_der(), csr.to_der());
    }
}
