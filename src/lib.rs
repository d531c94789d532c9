// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! X.509 trust store and certificate-chain validation for embedded control
//! units: arena-owned certificate storage across volatile and persistent
//! partitions, CRL and OCSP revocation processing, chain validation against
//! locally held trust material, and a reserved-slot allocator for
//! real-time-constrained call paths.
//!
//! No operation in this crate performs network I/O; revocation material is
//! handed in as byte blobs fetched by the caller.

pub mod cert;
pub mod name;
pub mod pem;
pub mod pool;
pub mod provider;
pub mod revocation;
pub mod store;
pub mod validate;

mod error;

pub use cert::{
    AttrCertStatus, AttributeCertificate, BasicCertInfo, CertKey, CertSignRequest, Certificate,
    PendingStatus, RawExtension, Status, StorageLocation,
};
pub use error::{Error, Result};
pub use name::{AttributeId, DistinguishedName, NameAttribute, NameValue};
pub use provider::{CryptoProvider, PublicKeyDescriptor, SigningContext};
pub use revocation::RevocationStore;
pub use store::{CertHandle, SearchCursor, TrustStore};
pub use validate::{
    ValidityCheck, verify_attribute_cert, verify_attribute_cert_ext, verify_cert_by_crl,
    verify_cert_chain_by_crl, verify_cert_chain_ext,
};
