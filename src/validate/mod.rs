// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Chain validation against locally held trust material.
//!
//! All verdicts are communicated through [`Status`] /
//! [`AttrCertStatus`] return values and cached on the validated objects;
//! the error channel is reserved for malformed input and API misuse. No
//! function here performs I/O: CRLs and OCSP responses must already be
//! imported into the [`RevocationStore`].

use crate::cert::{AttrCertStatus, AttributeCertificate, BasicCertInfo, Status};
use crate::provider::CryptoProvider;
use crate::revocation::RevocationStore;
use crate::store::{CertHandle, TrustStore};
use crate::{Error, Result};
use const_oid::ObjectIdentifier;
use std::time::{SystemTime, UNIX_EPOCH};

/// Extension OIDs the validator has built-in handling for; a critical
/// extension outside this set (and outside the caller's allow-list)
/// renders a certificate `Invalid`.
const KNOWN_EXTENSIONS: [ObjectIdentifier; 7] = [
    ObjectIdentifier::new_unwrap("2.5.29.19"), // basicConstraints
    ObjectIdentifier::new_unwrap("2.5.29.15"), // keyUsage
    ObjectIdentifier::new_unwrap("2.5.29.14"), // subjectKeyIdentifier
    ObjectIdentifier::new_unwrap("2.5.29.35"), // authorityKeyIdentifier
    ObjectIdentifier::new_unwrap("2.5.29.37"), // extendedKeyUsage
    ObjectIdentifier::new_unwrap("2.5.29.17"), // subjectAltName
    ObjectIdentifier::new_unwrap("2.5.29.31"), // cRLDistributionPoints
];

/// Reference time for validity checks.
#[derive(Clone, Copy, Debug, Default)]
pub enum ValidityCheck {
    /// Check against the current system time.
    #[default]
    Now,
    /// Check against a fixed UNIX timestamp.
    At(u64),
}

impl ValidityCheck {
    fn resolve(self) -> Result<u64> {
        match self {
            ValidityCheck::At(at) => Ok(at),
            ValidityCheck::Now => Ok(SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|_| Error::invalid("system clock is set before the UNIX epoch"))?
                .as_secs()),
        }
    }
}

/// Validates a single stored certificate and caches the verdict on it.
///
/// The issuer key is taken from `issuer` when given, otherwise located in
/// the store by issuer DN; a declared root of trust verifies against its
/// own key. Order of checks: temporal (`Expired`/`Future`), issuer
/// resolution (`NoTrust`), signature (`Invalid`), revocation (`Revoked`,
/// covering both the certificate and its located issuer).
pub fn verify_cert_by_crl(
    store: &mut TrustStore,
    cert: CertHandle,
    issuer: Option<CertHandle>,
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: ValidityCheck,
) -> Result<Status> {
    let at = at.resolve()?;
    let status = check_certificate(store, cert, issuer, revocation, provider, at, &[])?;
    store.set_status(cert, status)?;
    Ok(status)
}

/// Validates an ordered chain, root of trust first, end entity last.
///
/// Equivalent to [`verify_cert_chain_ext`] with an empty allow-list.
pub fn verify_cert_chain_by_crl(
    store: &mut TrustStore,
    chain: &[CertHandle],
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: ValidityCheck,
) -> Result<Status> {
    verify_cert_chain_ext(store, chain, revocation, provider, at, &[])
}

/// Validates an ordered chain with a caller-supplied allow-list of
/// critical extension OIDs to treat as recognized.
///
/// Element 0 must be a declared root of trust and every element's issuer
/// DN must equal its predecessor's subject DN. When that structural
/// precondition fails, no verification runs, no status is mutated, and the
/// returned status is `Unknown`. Otherwise elements are verified in order,
/// each against its predecessor's key; the chain's status is the status of
/// the first failing element, with statuses after the failure left at
/// their prior values. An empty chain yields `Invalid` without mutation.
pub fn verify_cert_chain_ext(
    store: &mut TrustStore,
    chain: &[CertHandle],
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: ValidityCheck,
    allowed_extensions: &[ObjectIdentifier],
) -> Result<Status> {
    let at = at.resolve()?;
    if chain.is_empty() {
        return Ok(Status::Invalid);
    }
    for &handle in chain {
        if store.get(handle).is_none() {
            return Err(Error::invalid("chain names a certificate not in the store"));
        }
    }

    // Structural precondition: anchored at a root of trust and linked by
    // an unbroken subject-to-issuer DN sequence. A failure here is a
    // deliberate no-op, not a verdict.
    let structurally_sound = store.is_root_of_trust(chain[0])
        && chain.windows(2).all(|pair| {
            match (store.get(pair[0]), store.get(pair[1])) {
                (Some(issuer), Some(subject)) => subject.issuer() == issuer.subject(),
                _ => false,
            }
        });
    if !structurally_sound {
        return Ok(Status::Unknown);
    }

    for (i, &handle) in chain.iter().enumerate() {
        let issuer = (i > 0).then(|| chain[i - 1]);
        let status = check_certificate(
            store,
            handle,
            issuer,
            revocation,
            provider,
            at,
            allowed_extensions,
        )?;
        store.set_status(handle, status)?;
        if status != Status::Valid {
            return Ok(status);
        }
    }
    Ok(Status::Valid)
}

fn check_certificate(
    store: &TrustStore,
    handle: CertHandle,
    issuer: Option<CertHandle>,
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: u64,
    allowed_extensions: &[ObjectIdentifier],
) -> Result<Status> {
    let cert = store
        .get(handle)
        .ok_or_else(|| Error::invalid("certificate is not in the store"))?;

    if at < cert.not_before() {
        return Ok(Status::Future);
    }
    if at > cert.not_after() {
        return Ok(Status::Expired);
    }

    for ext in cert.extensions() {
        if ext.critical
            && !KNOWN_EXTENSIONS.contains(&ext.oid)
            && !allowed_extensions.contains(&ext.oid)
        {
            return Ok(Status::Invalid);
        }
    }

    let issuer_handle = match issuer {
        Some(handle) => Some(handle),
        None if store.is_root_of_trust(handle) => Some(handle),
        None => store.find_issuer(cert),
    };
    let Some(issuer_handle) = issuer_handle else {
        return Ok(Status::NoTrust);
    };
    let issuer_cert = store
        .get(issuer_handle)
        .ok_or_else(|| Error::invalid("issuer certificate is not in the store"))?;

    let verified = provider.verify_signature(
        issuer_cert.public_key(),
        cert.signed_bytes(),
        cert.signature(),
        cert.signature_algorithm(),
    )?;
    if !verified {
        return Ok(Status::Invalid);
    }

    if revocation.is_revoked(cert.issuer(), cert.serial())
        || revocation.is_revoked(issuer_cert.issuer(), issuer_cert.serial())
    {
        return Ok(Status::Revoked);
    }
    Ok(Status::Valid)
}

/// Validates an attribute certificate against the store.
///
/// Equivalent to [`verify_attribute_cert_ext`] with an empty allow-list.
pub fn verify_attribute_cert(
    ac: &mut AttributeCertificate,
    store: &TrustStore,
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: ValidityCheck,
) -> Result<AttrCertStatus> {
    verify_attribute_cert_ext(ac, store, revocation, provider, at, &[])
}

/// Validates an attribute certificate, additionally treating the given
/// critical extension OIDs as recognized.
///
/// Both the holder certificate (by issuer DN and serial) and the issuing
/// attribute authority (by subject DN) must resolve in the store;
/// otherwise the verdict is `NoHolder` / `NoIssuer`. The verdict is cached
/// on the object and is never `Unknown` on return.
pub fn verify_attribute_cert_ext(
    ac: &mut AttributeCertificate,
    store: &TrustStore,
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: ValidityCheck,
    allowed_extensions: &[ObjectIdentifier],
) -> Result<AttrCertStatus> {
    let at = at.resolve()?;
    let status = check_attribute_cert(ac, store, revocation, provider, at, allowed_extensions)?;
    ac.set_status(status);
    Ok(status)
}

fn check_attribute_cert(
    ac: &AttributeCertificate,
    store: &TrustStore,
    revocation: &RevocationStore,
    provider: &dyn CryptoProvider,
    at: u64,
    allowed_extensions: &[ObjectIdentifier],
) -> Result<AttrCertStatus> {
    if at < ac.not_before() {
        return Ok(AttrCertStatus::Future);
    }
    if at > ac.not_after() {
        return Ok(AttrCertStatus::Expired);
    }

    for oid in ac.critical_extensions() {
        if !allowed_extensions.contains(oid) {
            return Ok(AttrCertStatus::Invalid);
        }
    }

    let Some(holder) = store.find_by_serial(ac.holder_serial(), ac.holder_issuer()) else {
        return Ok(AttrCertStatus::NoHolder);
    };

    let mut cursor = store.cursor();
    let Some(issuer) = store.find_by_dn(Some(ac.issuer()), None, None, &mut cursor)? else {
        return Ok(AttrCertStatus::NoIssuer);
    };
    let issuer_cert = store
        .get(issuer)
        .ok_or_else(|| Error::invalid("issuer certificate is not in the store"))?;

    let verified = provider.verify_signature(
        issuer_cert.public_key(),
        ac.signed_bytes(),
        ac.signature(),
        ac.signature_algorithm(),
    )?;
    if !verified {
        return Ok(AttrCertStatus::Invalid);
    }

    // Revocation of the attribute certificate itself, its holder, or its
    // issuing authority all void the assertion.
    let holder_revoked = store
        .get(holder)
        .is_some_and(|cert| revocation.is_revoked(cert.issuer(), cert.serial()));
    if holder_revoked
        || revocation.is_revoked(ac.issuer(), ac.serial())
        || revocation.is_revoked(issuer_cert.issuer(), issuer_cert.serial())
    {
        return Ok(AttrCertStatus::Invalid);
    }
    Ok(AttrCertStatus::Valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::Certificate;
    use crate::cert::issue::{
        CertTemplate, CrlEntry, Role, issue_attribute_cert, issue_certificate, issue_crl,
    };
    use crate::name::DistinguishedName;
    use crate::provider::{Ed25519Provider, Ed25519Signer, SigningContext};

    const T0: u64 = 1_750_000_000;

    struct Pki {
        root: Ed25519Signer,
        intermediate: Ed25519Signer,
        store: TrustStore,
        root_handle: CertHandle,
        intermediate_handle: CertHandle,
        leaf_handle: CertHandle,
    }

    fn issue_into(
        store: &mut TrustStore,
        signer: &Ed25519Signer,
        issued_by: &Ed25519Signer,
        subject: &str,
        issuer: &str,
        role: Role,
    ) -> CertHandle {
        let der = issue_certificate(
            &signer.public_key(),
            issued_by,
            &CertTemplate {
                subject: DistinguishedName::new().cn(subject),
                issuer: DistinguishedName::new().cn(issuer),
                not_before: 1_700_000_000,
                not_after: 1_800_000_000,
                role,
                ..Default::default()
            },
        )
        .unwrap();
        store
            .import(Certificate::parse_der(&der).unwrap(), true, None)
            .unwrap()
    }

    /// Builds root -> intermediate -> leaf with the root marked as a root
    /// of trust.
    fn three_level_pki() -> Pki {
        let root = Ed25519Signer::generate().unwrap();
        let intermediate = Ed25519Signer::generate().unwrap();
        let leaf = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();

        let root_handle = issue_into(
            &mut store,
            &root,
            &root,
            "Root",
            "Root",
            Role::Authority { path_len: None },
        );
        let intermediate_handle = issue_into(
            &mut store,
            &intermediate,
            &root,
            "Intermediate",
            "Root",
            Role::Authority { path_len: None },
        );
        let leaf_handle = issue_into(
            &mut store,
            &leaf,
            &intermediate,
            "Leaf",
            "Intermediate",
            Role::Leaf,
        );
        store.set_as_root_of_trust(root_handle).unwrap();

        Pki {
            root,
            intermediate,
            store,
            root_handle,
            intermediate_handle,
            leaf_handle,
        }
    }

    /// Verifies single-certificate validation with an explicitly supplied
    /// issuer handle: the actual issuer yields `Valid`, while naming the
    /// wrong issuer fails the signature check with `Invalid`.
    #[test]
    fn test_explicit_issuer_handle() {
        let mut pki = three_level_pki();
        let revocation = RevocationStore::new();

        let status = verify_cert_by_crl(
            &mut pki.store,
            pki.leaf_handle,
            Some(pki.intermediate_handle),
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Valid);

        let status = verify_cert_by_crl(
            &mut pki.store,
            pki.leaf_handle,
            Some(pki.root_handle),
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Invalid);
        assert_eq!(
            pki.store.get(pki.leaf_handle).unwrap().status(),
            Status::Invalid
        );
    }

    /// Verifies the reference scenario: a well-formed three-element chain
    /// validates, and revoking the intermediate via CRL turns the chain
    /// verdict into `Revoked` while the leaf's cached status is untouched.
    #[test]
    fn test_chain_valid_then_revoked_intermediate() {
        let mut pki = three_level_pki();
        let chain = [pki.root_handle, pki.intermediate_handle, pki.leaf_handle];
        let mut revocation = RevocationStore::new();

        let status = verify_cert_chain_by_crl(
            &mut pki.store,
            &chain,
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Valid);
        for handle in chain {
            assert_eq!(pki.store.get(handle).unwrap().status(), Status::Valid);
        }

        let intermediate_serial = pki
            .store
            .get(pki.intermediate_handle)
            .unwrap()
            .serial()
            .to_vec();
        let crl = issue_crl(
            &pki.root,
            &DistinguishedName::new().cn("Root"),
            &[CrlEntry {
                serial: intermediate_serial,
                revocation_time: T0,
                remove: false,
            }],
            T0,
            Some(T0 + 86_400),
            1,
            None,
        )
        .unwrap();
        assert!(revocation.import_crl(&crl, T0).unwrap());

        let status = verify_cert_chain_by_crl(
            &mut pki.store,
            &chain,
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Revoked);
        assert_eq!(
            pki.store.get(pki.intermediate_handle).unwrap().status(),
            Status::Revoked
        );
        // First failure stops the walk; the leaf keeps its prior verdict
        assert_eq!(
            pki.store.get(pki.leaf_handle).unwrap().status(),
            Status::Valid
        );
    }

    /// Verifies that a structurally broken chain is a complete no-op: the
    /// verdict is `Unknown` and no cached status moves.
    #[test]
    fn test_broken_chain_is_a_no_op() {
        let mut pki = three_level_pki();

        // Leaf before intermediate breaks the DN linkage
        let chain = [pki.root_handle, pki.leaf_handle, pki.intermediate_handle];
        let status = verify_cert_chain_by_crl(
            &mut pki.store,
            &chain,
            &RevocationStore::new(),
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Unknown);
        for handle in chain {
            assert_eq!(pki.store.get(handle).unwrap().status(), Status::Unknown);
        }

        // Unanchored chain: element 0 is not a declared root of trust
        let mut store = TrustStore::new();
        let fresh_root = Ed25519Signer::generate().unwrap();
        let handle = issue_into(
            &mut store,
            &fresh_root,
            &fresh_root,
            "Other Root",
            "Other Root",
            Role::Authority { path_len: None },
        );
        let status = verify_cert_chain_by_crl(
            &mut store,
            &[handle],
            &RevocationStore::new(),
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Unknown);
        assert_eq!(store.get(handle).unwrap().status(), Status::Unknown);
    }

    /// Verifies that an empty chain yields `Invalid` without mutation.
    #[test]
    fn test_empty_chain_is_invalid() {
        let mut pki = three_level_pki();
        let status = verify_cert_chain_by_crl(
            &mut pki.store,
            &[],
            &RevocationStore::new(),
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Invalid);
        assert_eq!(
            pki.store.get(pki.root_handle).unwrap().status(),
            Status::Unknown
        );
    }

    /// Verifies first-failure propagation: when the middle element's
    /// signature is broken, the chain verdict is that element's status and
    /// the later element keeps its prior status.
    #[test]
    fn test_first_failure_propagation() {
        let root = Ed25519Signer::generate().unwrap();
        let intermediate = Ed25519Signer::generate().unwrap();
        let impostor = Ed25519Signer::generate().unwrap();
        let leaf = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();

        let root_handle = issue_into(
            &mut store,
            &root,
            &root,
            "Root",
            "Root",
            Role::Authority { path_len: None },
        );
        // Claims to be issued by Root but is actually signed by the impostor
        let intermediate_handle = issue_into(
            &mut store,
            &intermediate,
            &impostor,
            "Intermediate",
            "Root",
            Role::Authority { path_len: None },
        );
        let leaf_handle = issue_into(
            &mut store,
            &leaf,
            &intermediate,
            "Leaf",
            "Intermediate",
            Role::Leaf,
        );
        store.set_as_root_of_trust(root_handle).unwrap();

        let status = verify_cert_chain_by_crl(
            &mut store,
            &[root_handle, intermediate_handle, leaf_handle],
            &RevocationStore::new(),
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Invalid);
        assert_eq!(store.get(root_handle).unwrap().status(), Status::Valid);
        assert_eq!(
            store.get(intermediate_handle).unwrap().status(),
            Status::Invalid
        );
        assert_eq!(store.get(leaf_handle).unwrap().status(), Status::Unknown);
    }

    /// Verifies single-certificate validation verdicts: valid with a store
    /// -located issuer, `Expired`/`Future` outside the window, `NoTrust`
    /// without any issuer.
    #[test]
    fn test_single_certificate_verdicts() {
        let mut pki = three_level_pki();
        let revocation = RevocationStore::new();

        let status = verify_cert_by_crl(
            &mut pki.store,
            pki.leaf_handle,
            None,
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Valid);

        assert_eq!(
            verify_cert_by_crl(
                &mut pki.store,
                pki.leaf_handle,
                None,
                &revocation,
                &Ed25519Provider,
                ValidityCheck::At(1_900_000_000),
            )
            .unwrap(),
            Status::Expired
        );
        assert_eq!(
            verify_cert_by_crl(
                &mut pki.store,
                pki.leaf_handle,
                None,
                &revocation,
                &Ed25519Provider,
                ValidityCheck::At(1_600_000_000),
            )
            .unwrap(),
            Status::Future
        );

        // An orphan with no issuer in the store and no trust marking
        let orphan_signer = Ed25519Signer::generate().unwrap();
        let stranger = Ed25519Signer::generate().unwrap();
        let orphan = issue_into(
            &mut pki.store,
            &orphan_signer,
            &stranger,
            "Orphan",
            "Nowhere CA",
            Role::Leaf,
        );
        assert_eq!(
            verify_cert_by_crl(
                &mut pki.store,
                orphan,
                None,
                &revocation,
                &Ed25519Provider,
                ValidityCheck::At(T0),
            )
            .unwrap(),
            Status::NoTrust
        );
    }

    /// Verifies the critical-extension allow-list: a certificate carrying
    /// an unrecognized critical extension is `Invalid` under the base
    /// entry point and `Valid` once the OID is allow-listed.
    #[test]
    fn test_critical_extension_allow_list() {
        let root = Ed25519Signer::generate().unwrap();
        let leaf = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();

        let root_handle = issue_into(
            &mut store,
            &root,
            &root,
            "Root",
            "Root",
            Role::Authority { path_len: None },
        );
        store.set_as_root_of_trust(root_handle).unwrap();

        let custom = ObjectIdentifier::new_unwrap("1.3.6.1.4.1.62253.9.3");
        let der = issue_certificate(
            &leaf.public_key(),
            &root,
            &CertTemplate {
                subject: DistinguishedName::new().cn("Leaf"),
                issuer: DistinguishedName::new().cn("Root"),
                not_before: 1_700_000_000,
                not_after: 1_800_000_000,
                role: Role::Leaf,
                extensions: vec![crate::cert::RawExtension {
                    oid: custom,
                    critical: true,
                    value: vec![0x05, 0x00],
                }],
                ..Default::default()
            },
        )
        .unwrap();
        let leaf_handle = store
            .import(Certificate::parse_der(&der).unwrap(), true, None)
            .unwrap();
        let chain = [root_handle, leaf_handle];

        let status = verify_cert_chain_by_crl(
            &mut store,
            &chain,
            &RevocationStore::new(),
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, Status::Invalid);

        let status = verify_cert_chain_ext(
            &mut store,
            &chain,
            &RevocationStore::new(),
            &Ed25519Provider,
            ValidityCheck::At(T0),
            &[custom],
        )
        .unwrap();
        assert_eq!(status, Status::Valid);
    }

    /// Verifies attribute certificate validation: valid with both ends
    /// resolved, `NoHolder` / `NoIssuer` when either reference is missing,
    /// and never `Unknown` on return.
    #[test]
    fn test_attribute_certificate_verdicts() {
        let mut pki = three_level_pki();
        let revocation = RevocationStore::new();
        let authority_dn = DistinguishedName::new().cn("Intermediate");

        let holder_der = pki.store.get(pki.leaf_handle).unwrap().to_der();
        let holder = Certificate::parse_der(&holder_der).unwrap();
        let ac_der = issue_attribute_cert(
            &pki.intermediate,
            &holder,
            &authority_dn,
            1_710_000_000,
            1_790_000_000,
            None,
        )
        .unwrap();

        let mut ac = AttributeCertificate::parse_der(&ac_der).unwrap();
        let status = verify_attribute_cert(
            &mut ac,
            &pki.store,
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, AttrCertStatus::Valid);
        assert_eq!(ac.status(), AttrCertStatus::Valid);

        // Remove the holder: NoHolder
        pki.store.remove(pki.leaf_handle).unwrap();
        let status = verify_attribute_cert(
            &mut ac,
            &pki.store,
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, AttrCertStatus::NoHolder);

        // An authority DN nobody in the store carries: NoIssuer
        let stranger_ac = issue_attribute_cert(
            &pki.root,
            &holder,
            &DistinguishedName::new().cn("Unknown Authority"),
            1_710_000_000,
            1_790_000_000,
            None,
        )
        .unwrap();
        let mut stranger_ac = AttributeCertificate::parse_der(&stranger_ac).unwrap();
        // Re-import the holder so only the issuer is missing
        let holder_cert = Certificate::parse_der(&holder_der).unwrap();
        pki.store.import(holder_cert, true, None).unwrap();
        let status = verify_attribute_cert(
            &mut stranger_ac,
            &pki.store,
            &revocation,
            &Ed25519Provider,
            ValidityCheck::At(T0),
        )
        .unwrap();
        assert_eq!(status, AttrCertStatus::NoIssuer);
    }
}
