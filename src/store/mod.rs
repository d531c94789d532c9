// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The trust store: arena-owned certificates across a volatile and a
//! persistent partition, with indexed retrieval and a pending-CSR sub-store.
//!
//! The store owns its [`Certificate`] objects outright and hands out
//! [`CertHandle`] indices. Mutation is not internally synchronized; callers
//! serialize writes against each other and against in-flight validation on
//! the same store.

pub mod backend;

use crate::cert::{
    BasicCertInfo, CertKey, CertSignRequest, Certificate, PendingStatus, Status, StorageLocation,
};
use crate::name::DistinguishedName;
use crate::{Error, Result};
use backend::StorageBackend;
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

/// Opaque handle to a certificate owned by a [`TrustStore`].
///
/// Handles stay valid until the certificate they name is removed; they are
/// never reused for a different certificate within one store lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CertHandle(usize);

/// Continuation cursor for DN-based search.
///
/// A cursor is bound to the store generation it was created under; any
/// import, removal or root marking invalidates it and further use fails
/// with [`Error::StaleCursor`].
#[derive(Clone, Copy, Debug)]
pub struct SearchCursor {
    generation: u64,
    next: usize,
}

struct PendingRequest {
    request: CertSignRequest,
    status: PendingStatus,
}

/// Certificate and CSR store with volatile and persistent partitions.
pub struct TrustStore {
    slots: Vec<Option<Certificate>>,
    by_key: HashMap<CertKey, CertHandle>,
    roots: HashSet<CertKey>,
    csrs: HashMap<(DistinguishedName, DistinguishedName), PendingRequest>,
    backend: Option<Box<dyn StorageBackend>>,
    generation: u64,
}

impl TrustStore {
    /// Creates a store without durable storage; the persistent partition
    /// then lives only as long as the process.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_key: HashMap::new(),
            roots: HashSet::new(),
            csrs: HashMap::new(),
            backend: None,
            generation: 0,
        }
    }

    /// Opens a store over a durable backend, reloading every certificate
    /// and root-of-trust marking previously written to it.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let mut store = Self::new();
        let labels = backend.list()?;
        store.backend = Some(backend);

        let mut root_markers = HashSet::new();
        for entry in &labels {
            if let Some(marker) = entry.strip_prefix("root/") {
                root_markers.insert(marker.to_owned());
                continue;
            }
            if !entry.starts_with("cert/") {
                continue;
            }
            let Some(data) = store.backend_get(entry)? else {
                continue;
            };
            let cert = match Certificate::parse_der(&data) {
                Ok(cert) => cert,
                Err(e) => {
                    warn!("skipping undecodable store entry {entry}: {e}");
                    continue;
                }
            };
            let label = entry.strip_prefix("cert/label/").map(str::to_owned);
            store.insert(cert, StorageLocation::Persistent, label)?;
        }
        for handle in store.handles() {
            let key = store.cert(handle)?.key();
            if root_markers.contains(&key_digest(&key)?) {
                store.roots.insert(key);
            }
        }
        store.generation = 0;
        Ok(store)
    }

    /// Imports a parsed certificate into the chosen partition.
    ///
    /// Fails with `ContentDuplication` when a certificate with the same
    /// issuer and serial is already stored, and with `IncompatibleObject`
    /// when a pending CSR for this subject carries a different public key.
    /// A label colliding within the target partition evicts the prior
    /// holder of that label.
    pub fn import(
        &mut self,
        cert: Certificate,
        to_volatile: bool,
        label: Option<&str>,
    ) -> Result<CertHandle> {
        if cert.location() != StorageLocation::Unassigned {
            return Err(Error::invalid("certificate was already imported"));
        }
        if self.by_key.contains_key(&cert.key()) {
            return Err(Error::ContentDuplication);
        }
        let csr_key = (cert.issuer().clone(), cert.subject().clone());
        if let Some(pending) = self.csrs.get(&csr_key)
            && pending.request.public_key() != cert.public_key()
        {
            return Err(Error::IncompatibleObject {
                details: "pending signing request carries a different public key".into(),
            });
        }

        let location = if to_volatile {
            StorageLocation::Volatile
        } else {
            StorageLocation::Persistent
        };
        self.insert(cert, location, label.map(str::to_owned))
    }

    fn insert(
        &mut self,
        mut cert: Certificate,
        location: StorageLocation,
        label: Option<String>,
    ) -> Result<CertHandle> {
        if let Some(label) = &label
            && let Some(prior) = self.find_labeled(label, location)
        {
            warn!("label {label:?} collision: evicting prior certificate");
            self.remove(prior)?;
        }

        cert.set_location(location);
        cert.set_label(label);
        // The durable write goes first: a backend failure must leave the
        // in-memory index untouched.
        if location == StorageLocation::Persistent {
            self.backend_put(&cert)?;
        }
        let handle = CertHandle(self.slots.len());
        debug!(
            "importing certificate subject={} into {location:?} partition",
            cert.subject()
        );
        self.by_key.insert(cert.key(), handle);
        self.slots.push(Some(cert));
        self.generation += 1;
        Ok(handle)
    }

    /// Moves a volatile certificate into the persistent partition in place.
    /// Already-persistent certificates are left as they are; the reverse
    /// move does not exist.
    pub fn move_to_persistent(&mut self, handle: CertHandle) -> Result<()> {
        if self.cert(handle)?.location() == StorageLocation::Persistent {
            return Ok(());
        }
        if let Some(label) = self.cert(handle)?.label().map(str::to_owned)
            && let Some(prior) = self.find_labeled(&label, StorageLocation::Persistent)
        {
            warn!("label {label:?} collision: evicting prior certificate");
            self.remove(prior)?;
        }
        let cert = self.cert(handle)?;
        let entry = cert_entry_name(cert)?;
        let der = cert.to_der();
        let key = cert.key();
        let root_entry = self.roots.contains(&key).then(|| key_digest(&key)).transpose()?;
        // Durable writes first; the location flips only once they succeed.
        if let Some(backend) = &mut self.backend {
            backend.put(&entry, &der)?;
            if let Some(marker) = root_entry {
                backend.put(&format!("root/{marker}"), b"1")?;
            }
        }
        self.cert_mut(handle)?
            .set_location(StorageLocation::Persistent);
        self.generation += 1;
        Ok(())
    }

    /// Removes the certificate behind `handle`. Returns whether anything
    /// was removed; a dangling handle is not an error.
    pub fn remove(&mut self, handle: CertHandle) -> Result<bool> {
        let Some(slot) = self.slots.get_mut(handle.0) else {
            return Ok(false);
        };
        let Some(cert) = slot.take() else {
            return Ok(false);
        };
        debug!("removing certificate subject={}", cert.subject());
        let key = cert.key();
        self.by_key.remove(&key);
        self.roots.remove(&key);
        if cert.location() == StorageLocation::Persistent {
            self.backend_delete(&cert, &key)?;
        }
        self.generation += 1;
        Ok(true)
    }

    /// Removes the certificate carrying `label`, searching the volatile
    /// partition first. Returns whether anything was removed.
    pub fn remove_by_label(&mut self, label: &str) -> Result<bool> {
        let handle = self
            .find_labeled(label, StorageLocation::Volatile)
            .or_else(|| self.find_labeled(label, StorageLocation::Persistent));
        match handle {
            Some(handle) => self.remove(handle),
            None => Ok(false),
        }
    }

    /// Marks an imported CA certificate as a root of trust. Marking is
    /// additive; independent roots coexist.
    pub fn set_as_root_of_trust(&mut self, handle: CertHandle) -> Result<()> {
        let cert = self.cert(handle)?;
        if !cert.is_ca() {
            return Err(Error::IncompatibleObject {
                details: "only a CA certificate can anchor trust".into(),
            });
        }
        let key = cert.key();
        if cert.location() == StorageLocation::Persistent {
            self.backend_put_root(&key)?;
        }
        self.roots.insert(key);
        self.generation += 1;
        Ok(())
    }

    /// Whether the certificate behind `handle` is a declared root of trust.
    pub fn is_root_of_trust(&self, handle: CertHandle) -> bool {
        self.get(handle)
            .is_some_and(|cert| self.roots.contains(&cert.key()))
    }

    /// Borrows the certificate behind `handle`, if it is still stored.
    pub fn get(&self, handle: CertHandle) -> Option<&Certificate> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn cert(&self, handle: CertHandle) -> Result<&Certificate> {
        self.get(handle)
            .ok_or_else(|| Error::invalid("certificate is not in the store"))
    }

    fn cert_mut(&mut self, handle: CertHandle) -> Result<&mut Certificate> {
        self.slots
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::invalid("certificate is not in the store"))
    }

    /// Updates the cached verification status of a stored certificate.
    ///
    /// Status is derived state; changing it leaves search cursors valid.
    pub(crate) fn set_status(&mut self, handle: CertHandle, status: Status) -> Result<()> {
        self.cert_mut(handle)?.set_status(status);
        Ok(())
    }

    /// Iterates over all stored certificates with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (CertHandle, &Certificate)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|cert| (CertHandle(i), cert)))
    }

    /// All live handles, in insertion order.
    pub fn handles(&self) -> Vec<CertHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    /// Creates a cursor bound to the store's current generation.
    pub fn cursor(&self) -> SearchCursor {
        SearchCursor {
            generation: self.generation,
            next: 0,
        }
    }

    /// Finds the certificate carrying `label` in either partition, volatile
    /// first.
    pub fn find_by_label(&self, label: &str) -> Option<CertHandle> {
        self.find_labeled(label, StorageLocation::Volatile)
            .or_else(|| self.find_labeled(label, StorageLocation::Persistent))
    }

    fn find_labeled(&self, label: &str, location: StorageLocation) -> Option<CertHandle> {
        self.iter()
            .find(|(_, cert)| cert.location() == location && cert.label() == Some(label))
            .map(|(handle, _)| handle)
    }

    /// Returns the next certificate matching the given subject and issuer
    /// DNs, valid at `at` when given, advancing the cursor. `None` means
    /// the enumeration is exhausted.
    pub fn find_by_dn(
        &self,
        subject: Option<&DistinguishedName>,
        issuer: Option<&DistinguishedName>,
        at: Option<u64>,
        cursor: &mut SearchCursor,
    ) -> Result<Option<CertHandle>> {
        self.scan(cursor, |cert| {
            subject.is_none_or(|dn| cert.subject() == dn)
                && issuer.is_none_or(|dn| cert.issuer() == dn)
                && at.is_none_or(|at| cert.valid_at(at))
        })
    }

    /// Like [`TrustStore::find_by_dn`] but the DNs are patterns whose
    /// wildcard attribute values accept any concrete value.
    pub fn find_by_dn_wildcard(
        &self,
        subject: Option<&DistinguishedName>,
        issuer: Option<&DistinguishedName>,
        at: Option<u64>,
        cursor: &mut SearchCursor,
    ) -> Result<Option<CertHandle>> {
        self.scan(cursor, |cert| {
            subject.is_none_or(|dn| dn.matches(cert.subject()))
                && issuer.is_none_or(|dn| dn.matches(cert.issuer()))
                && at.is_none_or(|at| cert.valid_at(at))
        })
    }

    fn scan(
        &self,
        cursor: &mut SearchCursor,
        matches: impl Fn(&Certificate) -> bool,
    ) -> Result<Option<CertHandle>> {
        if cursor.generation != self.generation {
            return Err(Error::StaleCursor);
        }
        while cursor.next < self.slots.len() {
            let index = cursor.next;
            cursor.next += 1;
            if let Some(cert) = &self.slots[index]
                && matches(cert)
            {
                return Ok(Some(CertHandle(index)));
            }
        }
        Ok(None)
    }

    /// Finds a certificate by subject key identifier, optionally also
    /// constrained by authority key identifier.
    pub fn find_by_key_ids(
        &self,
        subject_key_id: &[u8],
        authority_key_id: Option<&[u8]>,
    ) -> Option<CertHandle> {
        self.iter()
            .find(|(_, cert)| {
                cert.subject_key_id() == Some(subject_key_id)
                    && authority_key_id
                        .is_none_or(|aki| cert.authority_key_id() == Some(aki))
            })
            .map(|(handle, _)| handle)
    }

    /// Finds a certificate by its unique (issuer DN, serial) identity.
    pub fn find_by_serial(
        &self,
        serial: &[u8],
        issuer: &DistinguishedName,
    ) -> Option<CertHandle> {
        self.by_key
            .get(&CertKey {
                issuer: issuer.clone(),
                serial: serial.to_vec(),
            })
            .copied()
    }

    /// Locates the issuer of `cert` within the store: subject DN must equal
    /// the certificate's issuer DN, and when both sides carry key
    /// identifiers those must agree too.
    pub fn find_issuer(&self, cert: &Certificate) -> Option<CertHandle> {
        let mut fallback = None;
        for (handle, candidate) in self.iter() {
            if candidate.subject() != cert.issuer() {
                continue;
            }
            match (cert.authority_key_id(), candidate.subject_key_id()) {
                (Some(aki), Some(ski)) if aki == ski => return Some(handle),
                (Some(_), Some(_)) => {}
                _ => fallback = fallback.or(Some(handle)),
            }
        }
        fallback
    }

    // ---- Pending signing request sub-store -------------------------------

    /// Saves a signing request addressed to `authority`, keyed by
    /// (authority DN, subject DN). Re-saving for the same key replaces the
    /// request and resets its status to `New`.
    pub fn save_cert_sign_request(
        &mut self,
        authority: &DistinguishedName,
        request: CertSignRequest,
    ) -> Result<()> {
        if authority.attrs.is_empty() {
            return Err(Error::invalid("authority DN must not be empty"));
        }
        self.csrs.insert(
            (authority.clone(), request.subject().clone()),
            PendingRequest {
                request,
                status: PendingStatus::New,
            },
        );
        Ok(())
    }

    /// Moves a saved request between its lifecycle states.
    pub fn set_pending_status(
        &mut self,
        authority: &DistinguishedName,
        subject: &DistinguishedName,
        status: PendingStatus,
    ) -> Result<()> {
        let pending = self
            .csrs
            .get_mut(&(authority.clone(), subject.clone()))
            .ok_or_else(|| Error::invalid("no signing request saved for this subject"))?;
        pending.status = status;
        Ok(())
    }

    /// Looks up a saved request and its lifecycle state.
    pub fn find_cert_sign_request(
        &self,
        authority: &DistinguishedName,
        subject: &DistinguishedName,
    ) -> Option<(&CertSignRequest, PendingStatus)> {
        self.csrs
            .get(&(authority.clone(), subject.clone()))
            .map(|pending| (&pending.request, pending.status))
    }

    /// Drops a saved request. Returns whether one was present.
    pub fn remove_cert_sign_request(
        &mut self,
        authority: &DistinguishedName,
        subject: &DistinguishedName,
    ) -> bool {
        self.csrs
            .remove(&(authority.clone(), subject.clone()))
            .is_some()
    }

    // ---- Backend plumbing -------------------------------------------------

    fn backend_get(&self, label: &str) -> Result<Option<Vec<u8>>> {
        match &self.backend {
            Some(backend) => backend.get(label),
            None => Ok(None),
        }
    }

    fn backend_put(&mut self, cert: &Certificate) -> Result<()> {
        let entry = cert_entry_name(cert)?;
        let der = cert.to_der();
        if let Some(backend) = &mut self.backend {
            backend.put(&entry, &der)?;
        }
        Ok(())
    }

    fn backend_put_root(&mut self, key: &CertKey) -> Result<()> {
        let entry = format!("root/{}", key_digest(key)?);
        if let Some(backend) = &mut self.backend {
            backend.put(&entry, b"1")?;
        }
        Ok(())
    }

    fn backend_delete(&mut self, cert: &Certificate, key: &CertKey) -> Result<()> {
        let entry = cert_entry_name(cert)?;
        let root_entry = format!("root/{}", key_digest(key)?);
        if let Some(backend) = &mut self.backend {
            backend.delete(&entry)?;
            backend.delete(&root_entry)?;
        }
        Ok(())
    }
}

impl Default for TrustStore {
    fn default() -> Self {
        Self::new()
    }
}

fn cert_entry_name(cert: &Certificate) -> Result<String> {
    Ok(match cert.label() {
        Some(label) => format!("cert/label/{label}"),
        None => format!("cert/anon/{}", key_digest(&cert.key())?),
    })
}

/// Stable digest of a certificate identity, used for backend entry names.
fn key_digest(key: &CertKey) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(key.issuer.to_der()?);
    hasher.update(&key.serial);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::backend::MemoryBackend;
    use super::*;
    use crate::cert::issue::{CertTemplate, Role, issue_certificate};
    use crate::provider::{Ed25519Signer, SigningContext};

    fn ca_cert(signer: &Ed25519Signer, subject: &str, issued_by: &Ed25519Signer, issuer: &str)
    -> Certificate {
        let der = issue_certificate(
            &signer.public_key(),
            issued_by,
            &CertTemplate {
                subject: DistinguishedName::new().cn(subject),
                issuer: DistinguishedName::new().cn(issuer),
                not_before: 1_700_000_000,
                not_after: 1_800_000_000,
                role: Role::Authority { path_len: None },
                ..Default::default()
            },
        )
        .unwrap();
        Certificate::parse_der(&der).unwrap()
    }

    fn leaf_cert(signer: &Ed25519Signer, subject: &str, issued_by: &Ed25519Signer, issuer: &str)
    -> Certificate {
        let der = issue_certificate(
            &signer.public_key(),
            issued_by,
            &CertTemplate {
                subject: DistinguishedName::new().cn(subject),
                issuer: DistinguishedName::new().cn(issuer),
                not_before: 1_700_000_000,
                not_after: 1_800_000_000,
                role: Role::Leaf,
                ..Default::default()
            },
        )
        .unwrap();
        Certificate::parse_der(&der).unwrap()
    }

    /// Verifies that importing the same (issuer, serial) twice fails with
    /// a duplication error.
    #[test]
    fn test_duplicate_import_rejected() {
        let root = Ed25519Signer::generate().unwrap();
        let cert = ca_cert(&root, "Root", &root, "Root");
        let copy = Certificate::parse_der(&cert.to_der()).unwrap();

        let mut store = TrustStore::new();
        store.import(cert, true, None).unwrap();
        assert!(matches!(
            store.import(copy, true, None),
            Err(Error::ContentDuplication)
        ));
    }

    /// Verifies the partition lifecycle: volatile to persistent is allowed
    /// once, and the location is observable on the stored certificate.
    #[test]
    fn test_partition_lifecycle() {
        let root = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();
        let handle = store
            .import(ca_cert(&root, "Root", &root, "Root"), true, Some("anchor"))
            .unwrap();
        assert_eq!(
            store.get(handle).unwrap().location(),
            StorageLocation::Volatile
        );

        store.move_to_persistent(handle).unwrap();
        assert_eq!(
            store.get(handle).unwrap().location(),
            StorageLocation::Persistent
        );
        // A second move is a no-op, not an error
        store.move_to_persistent(handle).unwrap();
    }

    /// Verifies that a failed durable write leaves the store unchanged: no
    /// index entry is left behind, a later import of the same certificate
    /// is not misreported as a duplicate, and a failed partition move keeps
    /// the certificate volatile.
    #[test]
    fn test_failed_backend_write_leaves_store_unchanged() {
        struct FailingBackend;
        impl StorageBackend for FailingBackend {
            fn put(&mut self, _label: &str, _data: &[u8]) -> Result<()> {
                Err(std::io::Error::other("backing store unavailable").into())
            }
            fn get(&self, _label: &str) -> Result<Option<Vec<u8>>> {
                Ok(None)
            }
            fn delete(&mut self, _label: &str) -> Result<()> {
                Ok(())
            }
            fn list(&self) -> Result<Vec<String>> {
                Ok(Vec::new())
            }
        }

        let root = Ed25519Signer::generate().unwrap();
        let cert = ca_cert(&root, "Root", &root, "Root");
        let serial = cert.serial().to_vec();
        let issuer = cert.issuer().clone();
        let copy = Certificate::parse_der(&cert.to_der()).unwrap();

        let mut store = TrustStore::open(Box::new(FailingBackend)).unwrap();
        assert!(store.import(cert, false, None).is_err());
        assert_eq!(store.find_by_serial(&serial, &issuer), None);
        assert_eq!(store.iter().count(), 0);

        // The failed import must not poison a retry.
        let handle = store.import(copy, true, None).unwrap();
        assert_eq!(
            store.get(handle).unwrap().location(),
            StorageLocation::Volatile
        );

        // A failed partition move keeps the certificate where it was.
        assert!(store.move_to_persistent(handle).is_err());
        assert_eq!(
            store.get(handle).unwrap().location(),
            StorageLocation::Volatile
        );
    }

    /// Verifies that a label collision within one partition evicts the
    /// prior entry rather than failing.
    #[test]
    fn test_label_collision_evicts() {
        let root = Ed25519Signer::generate().unwrap();
        let other = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();
        let first = store
            .import(ca_cert(&root, "Root A", &root, "Root A"), true, Some("anchor"))
            .unwrap();
        let second = store
            .import(ca_cert(&other, "Root B", &other, "Root B"), true, Some("anchor"))
            .unwrap();

        assert!(store.get(first).is_none());
        assert_eq!(store.find_by_label("anchor"), Some(second));
    }

    /// Verifies that only CA certificates can be marked roots of trust and
    /// that marking is additive.
    #[test]
    fn test_root_of_trust_marking() {
        let root_a = Ed25519Signer::generate().unwrap();
        let root_b = Ed25519Signer::generate().unwrap();
        let leaf = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();

        let a = store
            .import(ca_cert(&root_a, "Root A", &root_a, "Root A"), true, None)
            .unwrap();
        let b = store
            .import(ca_cert(&root_b, "Root B", &root_b, "Root B"), true, None)
            .unwrap();
        let l = store
            .import(leaf_cert(&leaf, "Leaf", &root_a, "Root A"), true, None)
            .unwrap();

        store.set_as_root_of_trust(a).unwrap();
        store.set_as_root_of_trust(b).unwrap();
        assert!(store.is_root_of_trust(a));
        assert!(store.is_root_of_trust(b));
        assert!(matches!(
            store.set_as_root_of_trust(l),
            Err(Error::IncompatibleObject { .. })
        ));
    }

    /// Verifies that DN search with a fresh cursor enumerates matches in a
    /// stable order across repeated runs.
    #[test]
    fn test_find_by_dn_is_idempotent() {
        let root = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();
        for name in ["Leaf A", "Leaf B", "Leaf C"] {
            let signer = Ed25519Signer::generate().unwrap();
            store
                .import(leaf_cert(&signer, name, &root, "Root"), true, None)
                .unwrap();
        }

        let issuer = DistinguishedName::new().cn("Root");
        let collect = |store: &TrustStore| {
            let mut cursor = store.cursor();
            let mut found = Vec::new();
            while let Some(handle) = store
                .find_by_dn(None, Some(&issuer), Some(1_750_000_000), &mut cursor)
                .unwrap()
            {
                found.push(handle);
            }
            found
        };

        let first = collect(&store);
        assert_eq!(first.len(), 3);
        assert_eq!(first, collect(&store));
    }

    /// Verifies that a cursor created before a mutation fails closed
    /// instead of silently skipping entries.
    #[test]
    fn test_stale_cursor_fails_closed() {
        let root = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();
        let handle = store
            .import(ca_cert(&root, "Root", &root, "Root"), true, None)
            .unwrap();

        let mut cursor = store.cursor();
        store.remove(handle).unwrap();
        assert!(matches!(
            store.find_by_dn(None, None, None, &mut cursor),
            Err(Error::StaleCursor)
        ));
    }

    /// Verifies wildcard DN search against concrete subjects.
    #[test]
    fn test_find_by_dn_wildcard() {
        let root = Ed25519Signer::generate().unwrap();
        let signer = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();
        store
            .import(leaf_cert(&signer, "unit-7", &root, "Root"), true, None)
            .unwrap();

        let pattern = DistinguishedName::parse_str("CN=*").unwrap();
        let mut cursor = store.cursor();
        assert!(
            store
                .find_by_dn_wildcard(Some(&pattern), None, None, &mut cursor)
                .unwrap()
                .is_some()
        );
    }

    /// Verifies key-identifier and serial lookups against an issued pair.
    #[test]
    fn test_find_by_key_ids_and_serial() {
        let root = Ed25519Signer::generate().unwrap();
        let leaf = Ed25519Signer::generate().unwrap();
        let mut store = TrustStore::new();
        let root_handle = store
            .import(ca_cert(&root, "Root", &root, "Root"), true, None)
            .unwrap();
        let leaf_handle = store
            .import(leaf_cert(&leaf, "Leaf", &root, "Root"), true, None)
            .unwrap();

        let leaf_cert = store.get(leaf_handle).unwrap();
        let ski = leaf_cert.subject_key_id().unwrap().to_vec();
        let aki = leaf_cert.authority_key_id().unwrap().to_vec();
        let serial = leaf_cert.serial().to_vec();
        let issuer = leaf_cert.issuer().clone();

        assert_eq!(store.find_by_key_ids(&ski, Some(&aki)), Some(leaf_handle));
        assert_eq!(store.find_by_serial(&serial, &issuer), Some(leaf_handle));
        assert_eq!(
            store.find_issuer(store.get(leaf_handle).unwrap()),
            Some(root_handle)
        );
    }

    /// Verifies the CSR sub-store lifecycle and the key-mismatch guard on
    /// certificate import.
    #[test]
    fn test_pending_request_lifecycle() {
        let authority = DistinguishedName::new().cn("Root");
        let requester = Ed25519Signer::generate().unwrap();
        let csr = CertSignRequest::create(
            &DistinguishedName::new().cn("Leaf"),
            &requester,
            &[],
            None,
        )
        .unwrap();
        let subject = csr.subject().clone();

        let mut store = TrustStore::new();
        store.save_cert_sign_request(&authority, csr).unwrap();
        let (_, status) = store.find_cert_sign_request(&authority, &subject).unwrap();
        assert_eq!(status, PendingStatus::New);

        store
            .set_pending_status(&authority, &subject, PendingStatus::Pending)
            .unwrap();
        let (_, status) = store.find_cert_sign_request(&authority, &subject).unwrap();
        assert_eq!(status, PendingStatus::Pending);

        // A certificate answering the request with a different key must be
        // rejected at import.
        let impostor = Ed25519Signer::generate().unwrap();
        let root = Ed25519Signer::generate().unwrap();
        let cert = leaf_cert(&impostor, "Leaf", &root, "Root");
        assert!(matches!(
            store.import(cert, true, None),
            Err(Error::IncompatibleObject { .. })
        ));

        // The matching certificate imports; the request is then evicted by
        // the caller, not automatically.
        let cert = leaf_cert(&requester, "Leaf", &root, "Root");
        store.import(cert, true, None).unwrap();
        assert!(store.remove_cert_sign_request(&authority, &subject));
        assert!(store.find_cert_sign_request(&authority, &subject).is_none());
    }

    /// Verifies that the persistent partition and root markings survive a
    /// store reopen over the same backend.
    #[test]
    fn test_reopen_restores_persistent_partition() {
        let root = Ed25519Signer::generate().unwrap();
        let cert = ca_cert(&root, "Root", &root, "Root");
        let key = cert.key();

        let mut backend = MemoryBackend::new();
        {
            // Write through a throwaway store sharing the backend's state.
            let mut store = TrustStore::new();
            let handle = store.import(cert, false, Some("anchor")).unwrap();
            store.set_as_root_of_trust(handle).unwrap();
            // Mirror what a backend-attached store would have written.
            let stored = store.get(handle).unwrap();
            backend.put("cert/label/anchor", &stored.to_der()).unwrap();
            backend
                .put(&format!("root/{}", key_digest(&key).unwrap()), b"1")
                .unwrap();
        }

        let store = TrustStore::open(Box::new(backend)).unwrap();
        let handle = store.find_by_label("anchor").unwrap();
        assert_eq!(
            store.get(handle).unwrap().location(),
            StorageLocation::Persistent
        );
        assert!(store.is_root_of_trust(handle));
    }
}
