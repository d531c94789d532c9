// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! X.509 identity artifacts: certificates, signing requests and attribute
//! certificates.
//!
//! https://datatracker.ietf.org/doc/html/rfc5280
//!
//! All artifacts are immutable after parsing except the cached verification
//! status, which is only ever written by the chain validator and the
//! revocation checker.

mod attribute;
mod csr;
pub mod issue;

pub use attribute::{AttrCertStatus, AttributeCertificate};
pub use csr::{CertSignRequest, PendingStatus};

use crate::name::DistinguishedName;
use crate::provider::PublicKeyDescriptor;
use crate::{Error, Result, pem};
use const_oid::ObjectIdentifier;
use x509_cert::ext::pkix::{KeyUsage, KeyUsages};
use x509_parser::extensions::ParsedExtension;

/// Verification status of a certificate.
///
/// A status is a normal outcome, never an error: the error channel is
/// reserved for malformed input and API misuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Not yet validated.
    Unknown,
    /// Validated successfully.
    Valid,
    /// Signature or structural verification failed.
    Invalid,
    /// No issuer could be located and the certificate is not a root of trust.
    NoTrust,
    /// The validity window has elapsed at the reference time.
    Expired,
    /// The validity window has not yet begun at the reference time.
    Future,
    /// Revoked by CRL or OCSP.
    Revoked,
}

/// Where a certificate currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageLocation {
    /// Parsed but not imported into any store partition.
    Unassigned,
    /// Imported into the process-lifetime partition.
    Volatile,
    /// Imported into the durable partition.
    Persistent,
}

/// Capabilities shared by every signed identity artifact.
pub trait BasicCertInfo {
    /// Signature algorithm identifier.
    fn signature_algorithm(&self) -> ObjectIdentifier;
    /// The to-be-signed byte range covered by the signature.
    fn signed_bytes(&self) -> &[u8];
    /// Raw signature bytes.
    fn signature(&self) -> &[u8];
    /// Serializes the artifact back to DER.
    fn to_der(&self) -> Vec<u8>;
    /// Serializes the artifact to PEM.
    fn to_pem(&self) -> String;
}

/// A raw X.509 extension as it appeared in the certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawExtension {
    /// Extension OID.
    pub oid: ObjectIdentifier,
    /// Whether the extension is marked critical.
    pub critical: bool,
    /// DER payload inside the OCTET STRING.
    pub value: Vec<u8>,
}

/// Unique identity of a certificate within a trust store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CertKey {
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// Serial number bytes, canonical DER INTEGER content.
    pub serial: Vec<u8>,
}

/// A parsed X.509 certificate.
#[derive(Clone, Debug)]
pub struct Certificate {
    der: Vec<u8>,
    tbs: Vec<u8>,
    version: u32,
    serial: Vec<u8>,
    subject: DistinguishedName,
    issuer: DistinguishedName,
    not_before: u64,
    not_after: u64,
    public_key: PublicKeyDescriptor,
    signature_algorithm: ObjectIdentifier,
    signature: Vec<u8>,
    is_ca: bool,
    path_len: Option<u8>,
    key_usage: Option<KeyUsage>,
    subject_key_id: Option<Vec<u8>>,
    authority_key_id: Option<Vec<u8>>,
    extensions: Vec<RawExtension>,
    status: Status,
    location: StorageLocation,
    label: Option<String>,
}

impl Certificate {
    /// Parses a DER-encoded certificate.
    ///
    /// Parsing never assigns a verification status other than `Unknown`.
    pub fn parse_der(der: &[u8]) -> Result<Certificate> {
        let (rem, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| Error::invalid(format!("malformed certificate: {e}")))?;
        if !rem.is_empty() {
            return Err(Error::invalid("trailing data after DER certificate"));
        }

        let serial = cert.tbs_certificate.raw_serial().to_vec();
        validate_serial_encoding(&serial)?;

        let not_before = unix_ts_to_u64(cert.tbs_certificate.validity.not_before.timestamp())?;
        let not_after = unix_ts_to_u64(cert.tbs_certificate.validity.not_after.timestamp())?;
        if not_before >= not_after {
            return Err(Error::invalid(
                "invalid validity window: notBefore must precede notAfter",
            ));
        }

        // The signature algorithm must agree at both encoding levels.
        let outer_sig_alg = cert.signature_algorithm.algorithm.to_id_string();
        let tbs_sig_alg = cert.tbs_certificate.signature.algorithm.to_id_string();
        if outer_sig_alg != tbs_sig_alg {
            return Err(Error::invalid(
                "certificate and TBSCertificate disagree on the signature algorithm",
            ));
        }
        let signature_algorithm = ObjectIdentifier::new(outer_sig_alg.as_str())?;

        let mut is_ca = false;
        let mut path_len = None;
        let mut key_usage = None;
        let mut subject_key_id = None;
        let mut authority_key_id = None;
        let mut extensions = Vec::new();
        for ext in cert.tbs_certificate.extensions() {
            let oid = ObjectIdentifier::new(ext.oid.to_id_string().as_str())?;
            if extensions.iter().any(|e: &RawExtension| e.oid == oid) {
                return Err(Error::invalid(format!(
                    "certificate contains duplicate extension {oid}"
                )));
            }
            match ext.parsed_extension() {
                ParsedExtension::BasicConstraints(bc) => {
                    is_ca = bc.ca;
                    path_len = convert_path_len(bc.path_len_constraint)?;
                }
                ParsedExtension::KeyUsage(ku) => {
                    key_usage = Some(parse_key_usage_flags(ku.flags)?);
                }
                ParsedExtension::SubjectKeyIdentifier(keyid) => {
                    subject_key_id = Some(keyid.0.to_vec());
                }
                ParsedExtension::AuthorityKeyIdentifier(akid) => {
                    authority_key_id = akid.key_identifier.as_ref().map(|kid| kid.0.to_vec());
                }
                _ => {}
            }
            extensions.push(RawExtension {
                oid,
                critical: ext.critical,
                value: ext.value.to_vec(),
            });
        }
        if !is_ca && path_len.is_some() {
            return Err(Error::invalid(
                "pathLenConstraint requires basicConstraints ca=true",
            ));
        }
        // A non-CA certificate must never claim keyCertSign.
        if !is_ca
            && key_usage
                .as_ref()
                .is_some_and(|ku: &KeyUsage| ku.0.contains(KeyUsages::KeyCertSign))
        {
            return Err(Error::invalid(
                "non-CA certificate must not assert keyCertSign usage",
            ));
        }

        let public_key = PublicKeyDescriptor {
            algorithm: ObjectIdentifier::new(
                cert.tbs_certificate
                    .subject_pki
                    .algorithm
                    .algorithm
                    .to_id_string()
                    .as_str(),
            )?,
            key: cert
                .tbs_certificate
                .subject_pki
                .subject_public_key
                .data
                .to_vec(),
        };

        Ok(Certificate {
            der: der.to_vec(),
            tbs: cert.tbs_certificate.as_ref().to_vec(),
            version: cert.tbs_certificate.version.0,
            serial,
            subject: DistinguishedName::from_x509_name(&cert.tbs_certificate.subject)?,
            issuer: DistinguishedName::from_x509_name(&cert.tbs_certificate.issuer)?,
            not_before,
            not_after,
            public_key,
            signature_algorithm,
            signature: cert.signature_value.data.to_vec(),
            is_ca,
            path_len,
            key_usage,
            subject_key_id,
            authority_key_id,
            extensions,
            status: Status::Unknown,
            location: StorageLocation::Unassigned,
            label: None,
        })
    }

    /// Parses a PEM-encoded certificate (single `CERTIFICATE` block).
    pub fn parse_pem(pem_data: &str) -> Result<Certificate> {
        let der = pem::decode_kind(pem_data.as_bytes(), pem::KIND_CERTIFICATE)?;
        Self::parse_der(&der)
    }

    /// X.509 version number (2 means v3).
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Serial number bytes.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    /// Subject distinguished name.
    pub fn subject(&self) -> &DistinguishedName {
        &self.subject
    }

    /// Issuer distinguished name.
    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    /// Validity window start, UNIX seconds.
    pub fn not_before(&self) -> u64 {
        self.not_before
    }

    /// Validity window end, UNIX seconds.
    pub fn not_after(&self) -> u64 {
        self.not_after
    }

    /// Whether the reference time falls inside the validity window.
    pub fn valid_at(&self, at: u64) -> bool {
        at >= self.not_before && at <= self.not_after
    }

    /// Subject public key descriptor.
    pub fn public_key(&self) -> &PublicKeyDescriptor {
        &self.public_key
    }

    /// Whether basicConstraints marks this certificate as a CA.
    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// pathLenConstraint when present.
    pub fn path_len(&self) -> Option<u8> {
        self.path_len
    }

    /// keyUsage extension when present.
    pub fn key_usage(&self) -> Option<&KeyUsage> {
        self.key_usage.as_ref()
    }

    /// subjectKeyIdentifier bytes when present.
    pub fn subject_key_id(&self) -> Option<&[u8]> {
        self.subject_key_id.as_deref()
    }

    /// authorityKeyIdentifier key id bytes when present.
    pub fn authority_key_id(&self) -> Option<&[u8]> {
        self.authority_key_id.as_deref()
    }

    /// All extensions as they appeared, including unrecognized ones.
    pub fn extensions(&self) -> &[RawExtension] {
        &self.extensions
    }

    /// Last cached verification status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Current storage partition.
    pub fn location(&self) -> StorageLocation {
        self.location
    }

    /// Store label, when imported with one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Store identity: (issuer DN, serial).
    pub fn key(&self) -> CertKey {
        CertKey {
            issuer: self.issuer.clone(),
            serial: self.serial.clone(),
        }
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub(crate) fn set_location(&mut self, location: StorageLocation) {
        self.location = location;
    }

    pub(crate) fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

impl BasicCertInfo for Certificate {
    fn signature_algorithm(&self) -> ObjectIdentifier {
        self.signature_algorithm
    }

    fn signed_bytes(&self) -> &[u8] {
        &self.tbs
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn to_der(&self) -> Vec<u8> {
        self.der.clone()
    }

    fn to_pem(&self) -> String {
        pem::encode(pem::KIND_CERTIFICATE, &self.der)
    }
}

/// Converts parsed pathLenConstraint into the storage width used here.
pub(crate) fn convert_path_len(path_len: Option<u32>) -> Result<Option<u8>> {
    match path_len {
        Some(v) if v > u8::MAX as u32 => Err(Error::invalid("pathLenConstraint exceeds u8::MAX")),
        Some(v) => Ok(Some(v as u8)),
        None => Ok(None),
    }
}

/// Converts a parsed timestamp to `u64`, rejecting pre-UNIX values.
pub(crate) fn unix_ts_to_u64(ts: i64) -> Result<u64> {
    u64::try_from(ts).map_err(|_| Error::invalid("pre-UNIX timestamp in validity window"))
}

/// Validates DER INTEGER canonicality constraints for serial numbers.
pub(crate) fn validate_serial_encoding(serial: &[u8]) -> Result<()> {
    if serial.is_empty() {
        return Err(Error::invalid("certificate serial must not be empty"));
    }
    if serial[0] & 0x80 != 0 {
        return Err(Error::invalid("certificate serial must be positive"));
    }
    if serial.len() > 1 && serial[0] == 0x00 && serial[1] & 0x80 == 0 {
        return Err(Error::invalid(
            "certificate serial must use canonical DER INTEGER encoding",
        ));
    }
    if serial.iter().all(|b| *b == 0) {
        return Err(Error::invalid("certificate serial must be non-zero"));
    }
    Ok(())
}

fn parse_key_usage_flags(flags: u16) -> Result<KeyUsage> {
    const ALL_KNOWN_BITS: u16 = (1 << 9) - 1;
    if flags & !ALL_KNOWN_BITS != 0 {
        return Err(Error::invalid("keyUsage contains unknown flag bits"));
    }
    let mut parsed = der::flagset::FlagSet::<KeyUsages>::default();
    let mapping = [
        KeyUsages::DigitalSignature,
        KeyUsages::NonRepudiation,
        KeyUsages::KeyEncipherment,
        KeyUsages::DataEncipherment,
        KeyUsages::KeyAgreement,
        KeyUsages::KeyCertSign,
        KeyUsages::CRLSign,
        KeyUsages::EncipherOnly,
        KeyUsages::DecipherOnly,
    ];
    for (bit, usage) in mapping.into_iter().enumerate() {
        if flags & (1 << bit) != 0 {
            parsed |= usage;
        }
    }
    Ok(KeyUsage(parsed))
}
