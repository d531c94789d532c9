// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Issuance of certificates, CRLs and OCSP responses through a
//! [`SigningContext`].
//!
//! The trust store itself never signs anything; these builders exist for
//! provisioning flows and for constructing real signed material in tests.

use super::attribute::{AttCertValidityPeriod, AttributeCertificateInfo, Holder, IssuerSerial,
                       RawAttributeCertificate, V2Form};
use super::{Certificate, RawExtension};
use crate::name::DistinguishedName;
use crate::provider::{PublicKeyDescriptor, SigningContext};
use crate::{Error, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, BitString, GeneralizedTime, OctetString, UtcTime};
use der::{Decode, Encode, Tag};
use sha1::{Digest, Sha1};
use std::collections::HashSet;
use std::time::Duration;
use x509_cert::certificate::{CertificateInner, TbsCertificateInner, Version};
use x509_cert::crl::{CertificateList, RevokedCert, TbsCertList};
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::ext::pkix::{
    AuthorityKeyIdentifier, BasicConstraints, KeyUsage, KeyUsages, SubjectKeyIdentifier,
};
use x509_cert::ext::{AsExtension, Extension};
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};
use x509_ocsp::{BasicOcspResponse, CertId, CertStatus, OcspGeneralizedTime, OcspResponse,
                ResponderId, ResponseBytes, ResponseData, RevokedInfo, SingleResponse};

/// OID for the CRLNumber extension (2.5.29.20).
const OID_CRL_NUMBER: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.20");
/// OID for the DeltaCRLIndicator extension (2.5.29.27).
const OID_DELTA_CRL_INDICATOR: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.27");
/// OID for the reasonCode CRL entry extension (2.5.29.21).
const OID_REASON_CODE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.21");
/// OID for SHA-1, used by OCSP CertID hashes (1.3.14.3.2.26).
pub(crate) const OID_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
/// id-pkix-ocsp-basic response type (1.3.6.1.5.5.7.48.1.1).
const OID_OCSP_BASIC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1.1");

/// Subject role requested for an issued certificate.
#[derive(Clone, Debug, Default)]
pub enum Role {
    /// End-entity certificate.
    #[default]
    Leaf,
    /// CA certificate, with optional path length constraint.
    Authority { path_len: Option<u8> },
}

/// Certificate issuance template.
#[derive(Clone, Debug, Default)]
pub struct CertTemplate {
    /// Subject distinguished name.
    pub subject: DistinguishedName,
    /// Issuer distinguished name.
    pub issuer: DistinguishedName,
    /// NotBefore UNIX timestamp (seconds).
    pub not_before: u64,
    /// NotAfter UNIX timestamp (seconds).
    pub not_after: u64,
    /// End-entity or CA role.
    pub role: Role,
    /// Explicit serial bytes; random when omitted.
    pub serial: Option<Vec<u8>>,
    /// Explicit keyUsage; role-derived defaults when omitted.
    pub key_usage: Option<KeyUsage>,
    /// Non-standard extensions to append.
    pub extensions: Vec<RawExtension>,
}

/// Issues a DER-encoded X.509 v3 certificate binding `subject_key` to the
/// template's subject, signed through the issuer's signing context.
pub fn issue_certificate(
    subject_key: &PublicKeyDescriptor,
    signer: &dyn SigningContext,
    template: &CertTemplate,
) -> Result<Vec<u8>> {
    if template.subject.attrs.is_empty() {
        return Err(Error::invalid("certificate subject DN must not be empty"));
    }
    if template.issuer.attrs.is_empty() {
        return Err(Error::invalid("certificate issuer DN must not be empty"));
    }
    if template.not_before >= template.not_after {
        return Err(Error::invalid(
            "invalid validity window: notBefore must precede notAfter",
        ));
    }

    let serial_number: SerialNumber = match &template.serial {
        Some(bytes) => {
            super::validate_serial_encoding(bytes)?;
            SerialNumber::new(bytes)?
        }
        None => SerialNumber::new(&random_serial()?)?,
    };

    let signature_alg = AlgorithmIdentifierOwned {
        oid: signer.algorithm(),
        parameters: None,
    };
    let subject_name = template.subject.to_x509_name()?;
    let issuer_name = template.issuer.to_x509_name()?;

    // Tracking extension OIDs so custom ones cannot collide with the
    // mandatory set or each other.
    let mut extensions = Vec::<Extension>::new();
    let mut extension_oids = HashSet::new();

    let (is_ca, path_len) = match &template.role {
        Role::Leaf => (false, None),
        Role::Authority { path_len } => (true, *path_len),
    };
    let bc = BasicConstraints {
        ca: is_ca,
        path_len_constraint: path_len,
    };
    let bc_ext = bc.to_extension(&subject_name, extensions.as_slice())?;
    extension_oids.insert(bc_ext.extn_id.to_string());
    extensions.push(bc_ext);

    let key_usage = template.key_usage.clone().unwrap_or(match &template.role {
        Role::Authority { .. } => KeyUsage(KeyUsages::KeyCertSign | KeyUsages::CRLSign),
        Role::Leaf => KeyUsage(KeyUsages::DigitalSignature.into()),
    });
    let ku_ext = key_usage.to_extension(&subject_name, extensions.as_slice())?;
    extension_oids.insert(ku_ext.extn_id.to_string());
    extensions.push(ku_ext);

    let ski = SubjectKeyIdentifier(OctetString::new(key_identifier(&subject_key.key))?);
    let ski_ext = ski.to_extension(&subject_name, extensions.as_slice())?;
    extension_oids.insert(ski_ext.extn_id.to_string());
    extensions.push(ski_ext);

    let aki = AuthorityKeyIdentifier {
        key_identifier: Some(OctetString::new(key_identifier(
            &signer.public_key().key,
        ))?),
        authority_cert_issuer: None,
        authority_cert_serial_number: None,
    };
    let aki_ext = aki.to_extension(&subject_name, extensions.as_slice())?;
    extension_oids.insert(aki_ext.extn_id.to_string());
    extensions.push(aki_ext);

    for custom in &template.extensions {
        let oid = custom.oid.to_string();
        if oid.starts_with("2.5.29.") {
            return Err(Error::invalid(format!(
                "custom extension OID {oid} is reserved"
            )));
        }
        if !extension_oids.insert(oid.clone()) {
            return Err(Error::invalid(format!("duplicate extension OID {oid}")));
        }
        extensions.push(Extension {
            extn_id: custom.oid,
            critical: custom.critical,
            extn_value: OctetString::new(custom.value.clone())?,
        });
    }

    let tbs_certificate = TbsCertificateInner {
        version: Version::V3,
        serial_number,
        signature: signature_alg.clone(),
        issuer: issuer_name,
        validity: Validity {
            not_before: unix_time(template.not_before)?,
            not_after: unix_time(template.not_after)?,
        },
        subject: subject_name,
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: subject_key.algorithm,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&subject_key.key)?,
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };

    let tbs_der = tbs_certificate.to_der()?;
    let signature = signer.sign(&tbs_der)?;

    Ok(CertificateInner {
        tbs_certificate,
        signature_algorithm: signature_alg,
        signature: BitString::from_bytes(&signature)?,
    }
    .to_der()?)
}

/// One revocation entry for CRL issuance.
#[derive(Clone, Debug)]
pub struct CrlEntry {
    /// Serial number of the revoked certificate.
    pub serial: Vec<u8>,
    /// Revocation time, UNIX seconds.
    pub revocation_time: u64,
    /// Delta-CRL removal marker (reasonCode removeFromCRL).
    pub remove: bool,
}

/// Issues a DER-encoded (delta) CRL over the given entries.
///
/// `delta_base` turns the list into a delta CRL referring to the base CRL
/// with that CRLNumber.
pub fn issue_crl(
    signer: &dyn SigningContext,
    issuer: &DistinguishedName,
    entries: &[CrlEntry],
    this_update: u64,
    next_update: Option<u64>,
    crl_number: u64,
    delta_base: Option<u64>,
) -> Result<Vec<u8>> {
    let signature_alg = AlgorithmIdentifierOwned {
        oid: signer.algorithm(),
        parameters: None,
    };

    let mut revoked = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry_extensions = if entry.remove {
            // removeFromCRL(8), only meaningful inside a delta CRL
            let reason = Any::new(Tag::Enumerated, vec![8u8])?;
            Some(vec![Extension {
                extn_id: OID_REASON_CODE,
                critical: false,
                extn_value: OctetString::new(reason.to_der()?)?,
            }])
        } else {
            None
        };
        revoked.push(RevokedCert {
            serial_number: SerialNumber::new(&entry.serial)?,
            revocation_date: unix_time(entry.revocation_time)?,
            crl_entry_extensions: entry_extensions,
        });
    }

    let mut crl_extensions = vec![Extension {
        extn_id: OID_CRL_NUMBER,
        critical: false,
        extn_value: OctetString::new(crl_number.to_der()?)?,
    }];
    if let Some(base) = delta_base {
        crl_extensions.push(Extension {
            extn_id: OID_DELTA_CRL_INDICATOR,
            critical: true,
            extn_value: OctetString::new(base.to_der()?)?,
        });
    }

    let tbs_cert_list = TbsCertList {
        version: Version::V2,
        signature: signature_alg.clone(),
        issuer: issuer.to_x509_name()?,
        this_update: unix_time(this_update)?,
        next_update: next_update.map(unix_time).transpose()?,
        revoked_certificates: if revoked.is_empty() {
            None
        } else {
            Some(revoked)
        },
        crl_extensions: Some(crl_extensions),
    };

    let tbs_der = tbs_cert_list.to_der()?;
    let signature = signer.sign(&tbs_der)?;

    Ok(CertificateList {
        tbs_cert_list,
        signature_algorithm: signature_alg,
        signature: BitString::from_bytes(&signature)?,
    }
    .to_der()?)
}

/// One single-certificate assertion for OCSP response issuance.
#[derive(Clone, Debug)]
pub struct OcspEntry {
    /// Serial number of the asserted certificate.
    pub serial: Vec<u8>,
    /// Revocation time when the certificate is revoked, `None` when good.
    pub revoked_at: Option<u64>,
}

/// How an issued OCSP response names its responder.
#[derive(Clone, Copy, Debug, Default)]
pub enum ResponderKind {
    /// byName: the issuer's subject DN.
    #[default]
    Name,
    /// byKey: SHA-1 hash of the responder public key.
    Key,
}

/// Issues a DER-encoded, signed OCSP response asserting the status of the
/// given serials under `issuer`.
///
/// When `responder_cert_der` is given it is embedded so verifiers can locate
/// the responder key.
pub fn issue_ocsp_response(
    signer: &dyn SigningContext,
    issuer: &Certificate,
    entries: &[OcspEntry],
    produced_at: u64,
    responder: ResponderKind,
    responder_cert_der: Option<&[u8]>,
) -> Result<Vec<u8>> {
    let issuer_name_hash = Sha1::digest(issuer.subject().to_der()?).to_vec();
    let issuer_key_hash = Sha1::digest(&issuer.public_key().key).to_vec();
    let produced = generalized_time(produced_at)?;

    let mut responses = Vec::with_capacity(entries.len());
    for entry in entries {
        let cert_status = match entry.revoked_at {
            Some(at) => CertStatus::Revoked(RevokedInfo {
                revocation_time: OcspGeneralizedTime(generalized_time(at)?),
                revocation_reason: None,
            }),
            None => CertStatus::Good(der::asn1::Null),
        };
        responses.push(SingleResponse {
            cert_id: CertId {
                hash_algorithm: AlgorithmIdentifierOwned {
                    oid: OID_SHA1,
                    parameters: None,
                },
                issuer_name_hash: OctetString::new(issuer_name_hash.clone())?,
                issuer_key_hash: OctetString::new(issuer_key_hash.clone())?,
                serial_number: SerialNumber::new(&entry.serial)?,
            },
            cert_status,
            this_update: OcspGeneralizedTime(produced),
            next_update: None,
            single_extensions: None,
        });
    }

    let responder_id = match responder {
        ResponderKind::Name => ResponderId::ByName(issuer.subject().to_x509_name()?),
        ResponderKind::Key => ResponderId::ByKey(OctetString::new(
            Sha1::digest(&signer.public_key().key).to_vec(),
        )?),
    };

    let tbs_response_data = ResponseData {
        version: x509_ocsp::Version::V1,
        responder_id,
        produced_at: OcspGeneralizedTime(produced),
        responses,
        response_extensions: None,
    };

    let tbs_der = tbs_response_data.to_der()?;
    let signature = signer.sign(&tbs_der)?;

    let certs = responder_cert_der
        .map(|der| -> Result<Vec<CertificateInner>> {
            Ok(vec![CertificateInner::from_der(der)?])
        })
        .transpose()?;

    let basic = BasicOcspResponse {
        tbs_response_data,
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: signer.algorithm(),
            parameters: None,
        },
        signature: BitString::from_bytes(&signature)?,
        certs,
    };

    Ok(OcspResponse {
        response_status: x509_ocsp::OcspResponseStatus::Successful,
        response_bytes: Some(ResponseBytes {
            response_type: OID_OCSP_BASIC,
            response: OctetString::new(basic.to_der()?)?,
        }),
    }
    .to_der()?)
}

/// Issues a DER-encoded attribute certificate referring to the given holder
/// certificate, signed through the attribute authority's signing context.
pub fn issue_attribute_cert(
    signer: &dyn SigningContext,
    holder: &Certificate,
    issuer: &DistinguishedName,
    not_before: u64,
    not_after: u64,
    serial: Option<Vec<u8>>,
) -> Result<Vec<u8>> {
    if not_before >= not_after {
        return Err(Error::invalid(
            "invalid validity window: notBefore must precede notAfter",
        ));
    }
    let serial = match serial {
        Some(bytes) => {
            super::validate_serial_encoding(&bytes)?;
            bytes
        }
        None => random_serial()?.to_vec(),
    };

    let acinfo = AttributeCertificateInfo {
        version: 1, // v2
        holder: Holder {
            base_certificate_id: Some(IssuerSerial {
                issuer: vec![GeneralName::DirectoryName(holder.issuer().to_x509_name()?)],
                serial: SerialNumber::new(holder.serial())?,
            }),
            entity_name: None,
        },
        issuer: V2Form {
            issuer_name: Some(vec![GeneralName::DirectoryName(issuer.to_x509_name()?)]),
        },
        signature: AlgorithmIdentifierOwned {
            oid: signer.algorithm(),
            parameters: None,
        },
        serial_number: SerialNumber::new(&serial)?,
        validity: AttCertValidityPeriod {
            not_before_time: generalized_time(not_before)?,
            not_after_time: generalized_time(not_after)?,
        },
        attributes: Vec::new(),
        extensions: None,
    };

    let acinfo_der = acinfo.to_der()?;
    let signature = signer.sign(&acinfo_der)?;

    Ok(RawAttributeCertificate {
        acinfo,
        signature_algorithm: AlgorithmIdentifierOwned {
            oid: signer.algorithm(),
            parameters: None,
        },
        signature: BitString::from_bytes(&signature)?,
    }
    .to_der()?)
}

/// Computes the SHA-1 key identifier of a public key.
pub(crate) fn key_identifier(public_key: &[u8]) -> Vec<u8> {
    Sha1::digest(public_key).to_vec()
}

/// Generates a random, positive, canonically encoded 16-byte serial.
fn random_serial() -> Result<[u8; 16]> {
    let mut serial = [0u8; 16];
    getrandom::fill(&mut serial).map_err(|e| Error::RuntimeFault {
        details: format!("serial generation failed: {e}"),
    })?;
    // Positive, non-zero and canonical: force the top byte into 0x40..=0x7f
    serial[0] = (serial[0] & 0x3F) | 0x40;
    Ok(serial)
}

fn unix_time(ts: u64) -> Result<Time> {
    Ok(Time::UtcTime(UtcTime::from_unix_duration(
        Duration::from_secs(ts),
    )?))
}

fn generalized_time(ts: u64) -> Result<GeneralizedTime> {
    Ok(GeneralizedTime::from_unix_duration(Duration::from_secs(
        ts,
    ))?)
}
