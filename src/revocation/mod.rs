// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Revocation facts: CRL import and OCSP response processing.
//!
//! The store keeps one replaceable revocation set per issuer DN. A full CRL
//! import replaces its issuer's set wholesale; a delta CRL is applied on top
//! of the base it names, with `removeFromCRL` entries deleting facts. OCSP
//! responses assert the status of exactly the serials they cover.

use crate::cert::{BasicCertInfo, Status};
use crate::name::DistinguishedName;
use crate::provider::{CryptoProvider, PublicKeyDescriptor};
use crate::store::backend::StorageBackend;
use crate::store::TrustStore;
use crate::{Error, Result};
use der::{Decode, Encode};
use log::{debug, warn};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use x509_parser::prelude::FromDer;
use x509_parser::revocation_list::CertificateRevocationList;
use x509_ocsp::{BasicOcspResponse, CertStatus, OcspResponse, OcspResponseStatus, ResponderId};

/// CRLNumber extension OID.
const OID_CRL_NUMBER: &str = "2.5.29.20";
/// DeltaCRLIndicator extension OID.
const OID_DELTA_CRL_INDICATOR: &str = "2.5.29.27";
/// id-pkix-ocsp-basic response type.
const OID_OCSP_BASIC: &str = "1.3.6.1.5.5.7.48.1.1";

/// One revocation fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevocationRecord {
    /// Revocation time, UNIX seconds.
    pub revoked_at: u64,
}

struct IssuerSet {
    revoked: HashMap<Vec<u8>, RevocationRecord>,
    // canonical big-endian CRLNumber bytes; up to 20 octets per RFC 5280
    crl_number: Option<Vec<u8>>,
    this_update: u64,
    next_update: Option<u64>,
}

/// Per-issuer revocation sets fed by CRL and OCSP material.
///
/// Not internally synchronized; callers serialize `import_crl` and
/// `check_cert_status` against reads, as with the trust store.
#[derive(Default)]
pub struct RevocationStore {
    issuers: HashMap<DistinguishedName, IssuerSet>,
    backend: Option<Box<dyn StorageBackend>>,
}

impl RevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a revocation store over a durable backend, replaying every CRL
    /// previously imported through it. Base CRLs are replayed before deltas.
    pub fn open(backend: Box<dyn StorageBackend>, at: u64) -> Result<Self> {
        let mut store = Self::new();
        let entries = backend.list()?;
        store.backend = Some(backend);

        for pass in ["crl/full/", "crl/delta/"] {
            for entry in entries.iter().filter(|e| e.starts_with(pass)) {
                let Some(data) = store.backend_get(entry)? else {
                    continue;
                };
                if let Err(e) = store.import_crl(&data, at) {
                    warn!("skipping undecodable CRL entry {entry}: {e}");
                }
            }
        }
        Ok(store)
    }

    /// Imports a full or delta CRL.
    ///
    /// Returns `Ok(false)` when the CRL's own validity window has elapsed at
    /// `at`: the entries are still recorded, but the caller should re-fetch.
    /// Malformed bytes fail with `UnexpectedValue`; a delta CRL whose base
    /// number does not match the stored set fails the same way.
    pub fn import_crl(&mut self, crl_der: &[u8], at: u64) -> Result<bool> {
        let (rem, crl) = CertificateRevocationList::from_der(crl_der)
            .map_err(|e| Error::unexpected(format!("malformed CRL: {e}")))?;
        if !rem.is_empty() {
            return Err(Error::unexpected("trailing data after CRL"));
        }

        let issuer = DistinguishedName::from_x509_name(crl.issuer())
            .map_err(|e| Error::unexpected(format!("malformed CRL issuer: {e}")))?;
        let this_update = timestamp(crl.last_update().timestamp())?;
        let next_update = crl
            .next_update()
            .map(|t| timestamp(t.timestamp()))
            .transpose()?;

        let crl_number = uint_extension(&crl, OID_CRL_NUMBER)?;
        let delta_base = uint_extension(&crl, OID_DELTA_CRL_INDICATOR)?;

        let mut added = Vec::new();
        let mut removed = Vec::new();
        for revoked in crl.iter_revoked_certificates() {
            let serial = revoked.raw_serial().to_vec();
            let record = RevocationRecord {
                revoked_at: timestamp(revoked.revocation_date.timestamp())?,
            };
            // reason code 8 is removeFromCRL (RFC 5280, section 5.3.1)
            let remove = revoked
                .reason_code()
                .is_some_and(|(_, reason)| reason.0 == 8);
            if remove {
                removed.push(serial);
            } else {
                added.push((serial, record));
            }
        }

        match delta_base {
            None => {
                if !removed.is_empty() {
                    return Err(Error::unexpected(
                        "removeFromCRL entry outside a delta CRL",
                    ));
                }
                debug!(
                    "replacing revocation set for issuer {issuer}: {} entries",
                    added.len()
                );
                self.issuers.insert(
                    issuer.clone(),
                    IssuerSet {
                        revoked: added.into_iter().collect(),
                        crl_number,
                        this_update,
                        next_update,
                    },
                );
                self.backend_put("crl/full/", &issuer, crl_der)?;
                // A new base supersedes any persisted delta
                self.backend_delete("crl/delta/", &issuer)?;
            }
            Some(base) => {
                let set = self.issuers.get_mut(&issuer).ok_or_else(|| {
                    Error::unexpected("delta CRL without an imported base CRL")
                })?;
                if set.crl_number.as_deref() != Some(base.as_slice()) {
                    return Err(Error::unexpected(
                        "delta CRL does not name the stored base CRL number",
                    ));
                }
                debug!(
                    "applying delta CRL for issuer {issuer}: +{} -{}",
                    added.len(),
                    removed.len()
                );
                for (serial, record) in added {
                    set.revoked.insert(serial, record);
                }
                for serial in removed {
                    set.revoked.remove(&serial);
                }
                set.this_update = this_update;
                set.next_update = next_update;
                self.backend_put("crl/delta/", &issuer, crl_der)?;
            }
        }

        let stale = next_update.is_some_and(|next| next < at);
        Ok(!stale)
    }

    /// Looks up the revocation fact for (issuer DN, serial).
    pub fn is_revoked(&self, issuer: &DistinguishedName, serial: &[u8]) -> bool {
        self.record(issuer, serial).is_some()
    }

    /// Like [`RevocationStore::is_revoked`] but exposing the record.
    pub fn record(
        &self,
        issuer: &DistinguishedName,
        serial: &[u8],
    ) -> Option<RevocationRecord> {
        self.issuers
            .get(issuer)
            .and_then(|set| set.revoked.get(serial))
            .copied()
    }

    /// Whether any revocation set is known for the given issuer.
    pub fn has_issuer(&self, issuer: &DistinguishedName) -> bool {
        self.issuers.contains_key(issuer)
    }

    /// Processes a signed OCSP response and updates the status of exactly
    /// the stored certificates it references.
    ///
    /// The response signature is verified against the responder key; the
    /// key is taken from the embedded responder certificate when present,
    /// otherwise resolved from the trust store via the responder ID. A
    /// structurally invalid or unverifiable response fails with
    /// `RuntimeFault`. Certificates asserted revoked are demoted together
    /// with everything in the store that chains through them.
    pub fn check_cert_status(
        &mut self,
        store: &mut TrustStore,
        ocsp_der: &[u8],
        provider: &dyn CryptoProvider,
    ) -> Result<()> {
        let response = OcspResponse::from_der(ocsp_der)
            .map_err(|e| fault(format!("malformed OCSP response: {e}")))?;
        if response.response_status != OcspResponseStatus::Successful {
            return Err(fault(format!(
                "OCSP responder reported {:?}",
                response.response_status
            )));
        }
        let bytes = response
            .response_bytes
            .ok_or_else(|| fault("successful OCSP response without response bytes"))?;
        if bytes.response_type.to_string() != OID_OCSP_BASIC {
            return Err(fault(format!(
                "unsupported OCSP response type {}",
                bytes.response_type
            )));
        }
        let basic = BasicOcspResponse::from_der(bytes.response.as_bytes())
            .map_err(|e| fault(format!("malformed basic OCSP response: {e}")))?;

        let responder_key = self.responder_key(store, &basic, provider)?;
        let tbs = basic
            .tbs_response_data
            .to_der()
            .map_err(|e| fault(format!("cannot re-encode response data: {e}")))?;
        let signature = basic
            .signature
            .as_bytes()
            .ok_or_else(|| fault("OCSP signature has unused bits"))?;
        let verified = provider
            .verify_signature(
                &responder_key,
                &tbs,
                signature,
                basic.signature_algorithm.oid,
            )
            .map_err(|e| fault(format!("OCSP signature check failed: {e}")))?;
        if !verified {
            return Err(fault("OCSP response signature does not verify"));
        }

        let mut newly_revoked = Vec::new();
        for single in &basic.tbs_response_data.responses {
            let serial = single.cert_id.serial_number.as_bytes();
            let Some(handle) = locate_by_cert_id(store, &single.cert_id, serial)? else {
                // The response covers a certificate we do not hold.
                continue;
            };
            match &single.cert_status {
                CertStatus::Good(_) => store.set_status(handle, Status::Valid)?,
                CertStatus::Unknown(_) => store.set_status(handle, Status::Unknown)?,
                CertStatus::Revoked(info) => {
                    store.set_status(handle, Status::Revoked)?;
                    if let Some(cert) = store.get(handle) {
                        let issuer = cert.issuer().clone();
                        let record = RevocationRecord {
                            revoked_at: info.revocation_time.0.to_unix_duration().as_secs(),
                        };
                        self.issuers
                            .entry(issuer)
                            .or_insert_with(|| IssuerSet {
                                revoked: HashMap::new(),
                                crl_number: None,
                                this_update: record.revoked_at,
                                next_update: None,
                            })
                            .revoked
                            .insert(serial.to_vec(), record);
                    }
                    newly_revoked.push(handle);
                }
            }
        }

        if !newly_revoked.is_empty() {
            demote_dependents(store, &newly_revoked)?;
        }
        Ok(())
    }

    /// Resolves the public key the response signature must verify under.
    ///
    /// An embedded responder certificate is never taken at face value: its
    /// key must belong to a certificate already resident in the trust
    /// store, or the certificate itself must verify under a store-resident
    /// issuer (a delegated responder). Anything else fails with
    /// `RuntimeFault` before the key is used.
    fn responder_key(
        &self,
        store: &TrustStore,
        basic: &BasicOcspResponse,
        provider: &dyn CryptoProvider,
    ) -> Result<PublicKeyDescriptor> {
        if let Some(certs) = &basic.certs
            && let Some(cert) = certs.first()
        {
            let der = cert
                .to_der()
                .map_err(|e| fault(format!("embedded responder certificate: {e}")))?;
            let cert = crate::cert::Certificate::parse_der(&der)
                .map_err(|e| fault(format!("embedded responder certificate: {e}")))?;
            let resident = store
                .iter()
                .any(|(_, held)| held.public_key() == cert.public_key());
            if resident {
                return Ok(cert.public_key().clone());
            }
            let delegated = store
                .find_issuer(&cert)
                .and_then(|handle| store.get(handle))
                .is_some_and(|issuer| {
                    provider
                        .verify_signature(
                            issuer.public_key(),
                            cert.signed_bytes(),
                            cert.signature(),
                            cert.signature_algorithm(),
                        )
                        .unwrap_or(false)
                });
            if delegated {
                return Ok(cert.public_key().clone());
            }
            return Err(fault("embedded OCSP responder certificate is not trusted"));
        }
        let handle = match &basic.tbs_response_data.responder_id {
            ResponderId::ByName(name) => {
                let der = name
                    .to_der()
                    .map_err(|e| fault(format!("responder name: {e}")))?;
                let dn = DistinguishedName::parse_der(&der)
                    .map_err(|e| fault(format!("responder name: {e}")))?;
                let mut cursor = store.cursor();
                store
                    .find_by_dn(Some(&dn), None, None, &mut cursor)
                    .map_err(|e| fault(format!("responder lookup: {e}")))?
            }
            ResponderId::ByKey(key_hash) => store.iter().find_map(|(handle, cert)| {
                (Sha1::digest(&cert.public_key().key).as_slice() == key_hash.as_bytes())
                    .then_some(handle)
            }),
        };
        let handle = handle.ok_or_else(|| fault("cannot resolve the OCSP responder key"))?;
        let cert = store
            .get(handle)
            .ok_or_else(|| fault("cannot resolve the OCSP responder key"))?;
        Ok(cert.public_key().clone())
    }

    fn backend_get(&self, entry: &str) -> Result<Option<Vec<u8>>> {
        match &self.backend {
            Some(backend) => backend.get(entry),
            None => Ok(None),
        }
    }

    fn backend_put(
        &mut self,
        prefix: &str,
        issuer: &DistinguishedName,
        data: &[u8],
    ) -> Result<()> {
        let entry = format!("{prefix}{}", issuer_digest(issuer)?);
        if let Some(backend) = &mut self.backend {
            backend.put(&entry, data)?;
        }
        Ok(())
    }

    fn backend_delete(&mut self, prefix: &str, issuer: &DistinguishedName) -> Result<()> {
        let entry = format!("{prefix}{}", issuer_digest(issuer)?);
        if let Some(backend) = &mut self.backend {
            backend.delete(&entry)?;
        }
        Ok(())
    }
}

/// Demotes every stored certificate that chains through one of `revoked`
/// to `Revoked`, transitively.
pub(crate) fn demote_dependents(
    store: &mut TrustStore,
    revoked: &[crate::store::CertHandle],
) -> Result<()> {
    // (subject DN, SKI) frontier of revoked issuers
    let mut frontier: Vec<(DistinguishedName, Option<Vec<u8>>)> = revoked
        .iter()
        .filter_map(|&handle| store.get(handle))
        .map(|cert| {
            (
                cert.subject().clone(),
                cert.subject_key_id().map(<[u8]>::to_vec),
            )
        })
        .collect();
    let mut seen: HashSet<DistinguishedName> =
        frontier.iter().map(|(dn, _)| dn.clone()).collect();

    while let Some((subject, ski)) = frontier.pop() {
        let dependents: Vec<_> = store
            .iter()
            .filter(|(_, cert)| {
                cert.issuer() == &subject
                    && match (cert.authority_key_id(), &ski) {
                        (Some(aki), Some(ski)) => aki == ski.as_slice(),
                        _ => true,
                    }
            })
            .map(|(handle, _)| handle)
            .collect();
        for handle in dependents {
            store.set_status(handle, Status::Revoked)?;
            if let Some(cert) = store.get(handle)
                && cert.is_ca()
                && seen.insert(cert.subject().clone())
            {
                frontier.push((
                    cert.subject().clone(),
                    cert.subject_key_id().map(<[u8]>::to_vec),
                ));
            }
        }
    }
    Ok(())
}

/// Locates a stored certificate matching an OCSP CertID.
///
/// The serial must match and the CertID's issuer name hash must equal the
/// hash of the certificate's issuer DN under the CertID's hash algorithm
/// (SHA-1 or SHA-256; anything else fails with `UnknownIdentifier`).
fn locate_by_cert_id(
    store: &TrustStore,
    cert_id: &x509_ocsp::CertId,
    serial: &[u8],
) -> Result<Option<crate::store::CertHandle>> {
    let alg = cert_id.hash_algorithm.oid.to_string();
    for (handle, cert) in store.iter() {
        if cert.serial() != serial {
            continue;
        }
        let issuer_der = cert.issuer().to_der()?;
        let name_hash: Vec<u8> = match alg.as_str() {
            "1.3.14.3.2.26" => Sha1::digest(&issuer_der).to_vec(),
            "2.16.840.1.101.3.4.2.1" => Sha256::digest(&issuer_der).to_vec(),
            _ => {
                return Err(Error::UnknownIdentifier {
                    details: format!("unsupported OCSP hash algorithm {alg}"),
                });
            }
        };
        if name_hash == cert_id.issuer_name_hash.as_bytes() {
            return Ok(Some(handle));
        }
    }
    Ok(None)
}

/// Decodes an unbounded INTEGER extension (CRLNumber, DeltaCRLIndicator)
/// into its canonical big-endian bytes. RFC 5280 allows up to 20 octets.
fn uint_extension(crl: &CertificateRevocationList<'_>, oid: &str) -> Result<Option<Vec<u8>>> {
    for ext in crl.extensions() {
        if ext.oid.to_id_string() == oid {
            let value = der::asn1::Uint::from_der(ext.value)
                .map_err(|e| Error::unexpected(format!("CRL extension {oid}: {e}")))?;
            return Ok(Some(value.as_bytes().to_vec()));
        }
    }
    Ok(None)
}

fn timestamp(ts: i64) -> Result<u64> {
    u64::try_from(ts).map_err(|_| Error::unexpected("timestamp before the UNIX epoch"))
}

fn fault(details: impl Into<String>) -> Error {
    Error::RuntimeFault {
        details: details.into(),
    }
}

fn issuer_digest(issuer: &DistinguishedName) -> Result<String> {
    let digest = Sha256::digest(issuer.to_der()?);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}
