// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! X.509 attribute certificates, see RFC 5755.
//!
//! Only the v2 profile with a `baseCertificateID` holder and a `v2Form`
//! issuer name is supported; that is the shape provisioning authorities
//! emit for device role assertions.

use super::BasicCertInfo;
use crate::name::DistinguishedName;
use crate::{Error, Result, pem};
use const_oid::ObjectIdentifier;
use der::asn1::{BitString, GeneralizedTime};
use der::{Decode, Encode, Sequence};
use x509_cert::attr::Attribute;
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::name::{GeneralName, GeneralNames};
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::AlgorithmIdentifierOwned;

/// Validation outcome for an attribute certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrCertStatus {
    /// Not yet validated.
    Unknown,
    /// Validated successfully against holder and issuer.
    Valid,
    /// Signature verification failed.
    Invalid,
    /// The referenced holder certificate is not in the store.
    NoHolder,
    /// The asserted issuer is not in the store.
    NoIssuer,
    /// The validity window has elapsed at the reference time.
    Expired,
    /// The validity window has not yet begun at the reference time.
    Future,
}

/// IssuerSerial from RFC 5755 section 4.1.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct IssuerSerial {
    pub issuer: GeneralNames,
    pub serial: SerialNumber,
}

/// Holder from RFC 5755 section 4.1, restricted to the fields we emit.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct Holder {
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    pub base_certificate_id: Option<IssuerSerial>,
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    pub entity_name: Option<GeneralNames>,
}

/// V2Form from RFC 5755 section 4.1, issuer name only.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct V2Form {
    #[asn1(optional = "true")]
    pub issuer_name: Option<GeneralNames>,
}

/// AttCertValidityPeriod from RFC 5755 section 4.1.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub struct AttCertValidityPeriod {
    pub not_before_time: GeneralizedTime,
    pub not_after_time: GeneralizedTime,
}

/// AttributeCertificateInfo from RFC 5755 section 4.1.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct AttributeCertificateInfo {
    pub version: u8,
    pub holder: Holder,
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT")]
    pub issuer: V2Form,
    pub signature: AlgorithmIdentifierOwned,
    pub serial_number: SerialNumber,
    pub validity: AttCertValidityPeriod,
    pub attributes: Vec<Attribute>,
    #[asn1(optional = "true")]
    pub extensions: Option<Vec<Extension>>,
}

/// Outer AttributeCertificate SEQUENCE.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct RawAttributeCertificate {
    pub acinfo: AttributeCertificateInfo,
    pub signature_algorithm: AlgorithmIdentifierOwned,
    pub signature: BitString,
}

/// A parsed attribute certificate with decoded holder and issuer linkage.
#[derive(Clone, Debug)]
pub struct AttributeCertificate {
    der: Vec<u8>,
    acinfo_der: Vec<u8>,
    holder_issuer: DistinguishedName,
    holder_serial: Vec<u8>,
    issuer: DistinguishedName,
    serial: Vec<u8>,
    not_before: u64,
    not_after: u64,
    signature_algorithm: ObjectIdentifier,
    signature: Vec<u8>,
    critical_extensions: Vec<ObjectIdentifier>,
    status: AttrCertStatus,
}

impl AttributeCertificate {
    /// Parses a DER-encoded attribute certificate.
    ///
    /// The holder must be identified by `baseCertificateID` and the issuer
    /// by a `v2Form` directory name; other RFC 5755 holder and issuer forms
    /// are rejected.
    pub fn parse_der(der: &[u8]) -> Result<Self> {
        let raw = RawAttributeCertificate::from_der(der)?;
        if raw.acinfo.version != 1 {
            return Err(Error::invalid("attribute certificate must be v2"));
        }
        if raw.acinfo.signature != raw.signature_algorithm {
            return Err(Error::invalid(
                "attribute certificate signature algorithm mismatch",
            ));
        }

        let base_id = raw
            .acinfo
            .holder
            .base_certificate_id
            .as_ref()
            .ok_or_else(|| Error::invalid("holder must carry baseCertificateID"))?;
        let holder_issuer = directory_name(&base_id.issuer)
            .ok_or_else(|| Error::invalid("holder issuer must be a directory name"))?;
        let holder_serial = base_id.serial.as_bytes().to_vec();
        super::validate_serial_encoding(&holder_serial)?;

        let issuer_names = raw
            .acinfo
            .issuer
            .issuer_name
            .as_ref()
            .ok_or_else(|| Error::invalid("v2Form issuer name missing"))?;
        let issuer = directory_name(issuer_names)
            .ok_or_else(|| Error::invalid("issuer must be a directory name"))?;

        let serial = raw.acinfo.serial_number.as_bytes().to_vec();
        super::validate_serial_encoding(&serial)?;

        let not_before = raw.acinfo.validity.not_before_time.to_unix_duration().as_secs();
        let not_after = raw.acinfo.validity.not_after_time.to_unix_duration().as_secs();
        if not_before >= not_after {
            return Err(Error::invalid(
                "attribute certificate validity window is empty",
            ));
        }

        let signature = raw
            .signature
            .as_bytes()
            .ok_or_else(|| Error::invalid("signature has unused bits"))?
            .to_vec();

        let critical_extensions = raw
            .acinfo
            .extensions
            .iter()
            .flatten()
            .filter(|ext| ext.critical)
            .map(|ext| ext.extn_id)
            .collect();

        Ok(Self {
            der: der.to_vec(),
            acinfo_der: raw.acinfo.to_der()?,
            holder_issuer,
            holder_serial,
            issuer,
            serial,
            not_before,
            not_after,
            signature_algorithm: raw.signature_algorithm.oid,
            signature,
            critical_extensions,
            status: AttrCertStatus::Unknown,
        })
    }

    /// Parses a PEM-encoded (`ATTRIBUTE CERTIFICATE`) attribute certificate.
    pub fn parse_pem(data: &str) -> Result<Self> {
        Self::parse_der(&pem::decode_kind(data.as_bytes(), pem::KIND_ATTRIBUTE_CERT)?)
    }

    /// Issuer DN of the referenced holder certificate.
    pub fn holder_issuer(&self) -> &DistinguishedName {
        &self.holder_issuer
    }

    /// Serial of the referenced holder certificate.
    pub fn holder_serial(&self) -> &[u8] {
        &self.holder_serial
    }

    /// DN of the attribute authority that signed this certificate.
    pub fn issuer(&self) -> &DistinguishedName {
        &self.issuer
    }

    /// Serial number of the attribute certificate itself.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    /// Start of the validity window, UNIX seconds.
    pub fn not_before(&self) -> u64 {
        self.not_before
    }

    /// End of the validity window, UNIX seconds.
    pub fn not_after(&self) -> u64 {
        self.not_after
    }

    /// Whether `at` falls inside the validity window.
    pub fn valid_at(&self, at: u64) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// OIDs of the extensions marked critical, in certificate order.
    pub fn critical_extensions(&self) -> &[ObjectIdentifier] {
        &self.critical_extensions
    }

    /// Last validation outcome recorded on this object.
    pub fn status(&self) -> AttrCertStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: AttrCertStatus) {
        self.status = status;
    }

    /// Checks whether the given certificate is the referenced holder.
    pub fn is_holder(&self, issuer: &DistinguishedName, serial: &[u8]) -> bool {
        self.holder_issuer == *issuer && self.holder_serial == serial
    }
}

impl BasicCertInfo for AttributeCertificate {
    fn signature_algorithm(&self) -> ObjectIdentifier {
        self.signature_algorithm
    }

    fn signed_bytes(&self) -> &[u8] {
        &self.acinfo_der
    }

    fn signature(&self) -> &[u8] {
        &self.signature
    }

    fn to_der(&self) -> Vec<u8> {
        self.der.clone()
    }

    fn to_pem(&self) -> String {
        pem::encode(pem::KIND_ATTRIBUTE_CERT, &self.der)
    }
}

/// Extracts the first directory name from a GeneralNames list.
fn directory_name(names: &GeneralNames) -> Option<DistinguishedName> {
    names.iter().find_map(|name| match name {
        GeneralName::DirectoryName(dn) => dn
            .to_der()
            .ok()
            .and_then(|der| DistinguishedName::parse_der(&der).ok()),
        _ => None,
    })
}
