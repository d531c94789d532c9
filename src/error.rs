// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type used throughout the crate.
///
/// Validation *failure* (a certificate found expired, revoked or untrusted)
/// is never an error: it is reported through [`crate::cert::Status`]. The
/// error channel is reserved for malformed input and API misuse.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or semantically inconsistent input artifact.
    #[error("invalid argument: {details}")]
    InvalidArgument { details: String },
    /// Unsupported format or algorithm identifier.
    #[error("unknown identifier: {details}")]
    UnknownIdentifier { details: String },
    /// Uniqueness invariant violated on import.
    #[error("duplicate content: a certificate with this issuer and serial already exists")]
    ContentDuplication,
    /// Type or role mismatch (non-CA root, CSR/certificate key mismatch).
    #[error("incompatible object: {details}")]
    IncompatibleObject { details: String },
    /// A fixed-capacity container cannot accept another entry.
    #[error("insufficient capacity: {details}")]
    InsufficientCapacity { details: String },
    /// A slot reservation or allocation request cannot be satisfied.
    #[error("allocation failed: {details}")]
    BadAlloc { details: String },
    /// The addressed slot is already occupied.
    #[error("slot {index} is occupied")]
    BusyResource { index: usize },
    /// The addressed slot was never reserved.
    #[error("slot {index} was never reserved")]
    UnreservedResource { index: usize },
    /// The addressed slot is smaller than the object being placed.
    #[error("slot {index} capacity {capacity} is below the required {required} bytes")]
    InsufficientResource {
        index: usize,
        capacity: usize,
        required: usize,
    },
    /// Revocation-response processing failure.
    #[error("runtime fault: {details}")]
    RuntimeFault { details: String },
    /// Malformed CRL or OCSP blob.
    #[error("unexpected value: {details}")]
    UnexpectedValue { details: String },
    /// A search cursor outlived a store mutation.
    #[error("search cursor invalidated by a store mutation")]
    StaleCursor,
    #[error(transparent)]
    Der(#[from] der::Error),
    #[error(transparent)]
    Oid(#[from] const_oid::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub(crate) fn invalid(details: impl Into<String>) -> Self {
        Error::InvalidArgument {
            details: details.into(),
        }
    }

    /// Shorthand for [`Error::UnexpectedValue`].
    pub(crate) fn unexpected(details: impl Into<String>) -> Self {
        Error::UnexpectedValue {
            details: details.into(),
        }
    }
}
