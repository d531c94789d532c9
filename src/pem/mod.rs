// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Strict PEM encoding and decoding for trust-store artifacts.
//!
//! Exactly one block per input, header at byte 0, consistent line endings,
//! strict base64. Lenient multi-block PEM bundles are out of scope: callers
//! split bundles before handing blobs to this crate.

use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const PEM_HEADER: &[u8] = b"-----BEGIN ";
const PEM_FOOTER: &[u8] = b"-----END ";
const PEM_ENDING: &[u8] = b"-----";

/// PEM block kind for certificates.
pub const KIND_CERTIFICATE: &str = "CERTIFICATE";
/// PEM block kind for certificate signing requests.
pub const KIND_CERT_REQUEST: &str = "CERTIFICATE REQUEST";
/// PEM block kind for certificate revocation lists.
pub const KIND_CRL: &str = "X509 CRL";
/// PEM block kind for attribute certificates.
pub const KIND_ATTRIBUTE_CERT: &str = "ATTRIBUTE CERTIFICATE";

/// Decodes a single PEM block with strict validation, returning the block
/// kind and the decoded bytes.
pub fn decode(data: &[u8]) -> Result<(String, Vec<u8>)> {
    // Header must start at byte 0, no leading whitespace allowed
    if !data.starts_with(PEM_HEADER) {
        return Err(Error::unexpected("pem: missing PEM header"));
    }
    let header_end = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| Error::unexpected("pem: incomplete PEM header"))?;

    // Line ending style is fixed by the header line
    let line_ending: &[u8] = if header_end > 0 && data[header_end - 1] == b'\r' {
        b"\r\n"
    } else {
        b"\n"
    };
    let header = &data[..header_end + 1 - line_ending.len()];

    if !header.starts_with(PEM_HEADER) || !header.ends_with(PEM_ENDING) {
        return Err(Error::unexpected("pem: malformed PEM header"));
    }
    let kind_bytes = &header[PEM_HEADER.len()..header.len() - PEM_ENDING.len()];
    if kind_bytes.is_empty() {
        return Err(Error::unexpected("pem: empty PEM block kind"));
    }
    let kind = String::from_utf8(kind_bytes.to_vec())
        .map_err(|_| Error::unexpected("pem: non-UTF8 PEM block kind"))?;

    // The footer must name the same kind as the header
    let mut footer = Vec::with_capacity(PEM_FOOTER.len() + kind_bytes.len() + PEM_ENDING.len());
    footer.extend_from_slice(PEM_FOOTER);
    footer.extend_from_slice(kind_bytes);
    footer.extend_from_slice(PEM_ENDING);

    let search_area = &data[header_end + 1..];
    let footer_idx = search_area
        .windows(footer.len())
        .position(|w| w == footer.as_slice())
        .ok_or_else(|| Error::unexpected("pem: missing PEM footer"))?;
    let footer_start = header_end + 1 + footer_idx;
    let footer_end = footer_start + footer.len();

    // Nothing after the footer except one optional line ending
    let rest = &data[footer_end..];
    if !rest.is_empty() && rest != line_ending {
        return Err(Error::unexpected("pem: trailing data after PEM block"));
    }

    let body = &data[header_end + 1..footer_start];
    if body.is_empty() {
        return Err(Error::unexpected("pem: empty PEM body"));
    }
    if !body.ends_with(line_ending) {
        return Err(Error::unexpected(
            "pem: body must end with newline before footer",
        ));
    }
    let body = &body[..body.len() - line_ending.len()];

    let b64: Vec<u8> = body
        .split(|&b| b == b'\n')
        .flat_map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .copied()
        .collect();
    let decoded = STANDARD
        .decode(&b64)
        .map_err(|e| Error::unexpected(format!("pem: invalid base64 body: {e}")))?;

    Ok((kind, decoded))
}

/// Decodes a single PEM block, requiring the given kind.
pub fn decode_kind(data: &[u8], expected: &str) -> Result<Vec<u8>> {
    let (kind, decoded) = decode(data)?;
    if kind != expected {
        return Err(Error::unexpected(format!(
            "pem: block kind {kind} where {expected} was expected"
        )));
    }
    Ok(decoded)
}

/// Encodes data as a PEM block of the given kind, 64-character lines with
/// `\n` line endings.
pub fn encode(kind: &str, data: &[u8]) -> String {
    let b64 = STANDARD.encode(data);

    let mut buf = String::with_capacity(b64.len() + b64.len() / 64 + 2 * kind.len() + 32);
    buf.push_str("-----BEGIN ");
    buf.push_str(kind);
    buf.push_str("-----\n");
    let mut rest = b64.as_str();
    while !rest.is_empty() {
        let (line, tail) = rest.split_at(rest.len().min(64));
        buf.push_str(line);
        buf.push('\n');
        rest = tail;
    }
    buf.push_str("-----END ");
    buf.push_str(kind);
    buf.push_str("-----\n");
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies that encode and decode round-trip a block with its kind.
    #[test]
    fn test_roundtrip() {
        let data = b"trust store payload";
        let encoded = encode(KIND_CERTIFICATE, data);
        let (kind, decoded) = decode(encoded.as_bytes()).unwrap();
        assert_eq!(kind, KIND_CERTIFICATE);
        assert_eq!(decoded, data);
    }

    /// Verifies that both LF and CRLF encoded blocks decode.
    #[test]
    fn test_decode_line_endings() {
        let lf = b"-----BEGIN X509 CRL-----\nYWJj\n-----END X509 CRL-----\n";
        let (kind, data) = decode(lf).unwrap();
        assert_eq!(kind, KIND_CRL);
        assert_eq!(data, b"abc");

        let crlf = b"-----BEGIN X509 CRL-----\r\nYWJj\r\n-----END X509 CRL-----\r\n";
        let (kind, data) = decode(crlf).unwrap();
        assert_eq!(kind, KIND_CRL);
        assert_eq!(data, b"abc");
    }

    /// Verifies that decode_kind rejects a mismatched block kind.
    #[test]
    fn test_decode_kind_mismatch() {
        let encoded = encode(KIND_CERT_REQUEST, b"abc");
        assert!(decode_kind(encoded.as_bytes(), KIND_CERTIFICATE).is_err());
        assert_eq!(
            decode_kind(encoded.as_bytes(), KIND_CERT_REQUEST).unwrap(),
            b"abc"
        );
    }

    /// Verifies that structural violations are rejected.
    #[test]
    fn test_decode_rejects_malformed() {
        for bad in [
            &b"YWJj\n-----END CERTIFICATE-----\n"[..],
            &b"-----BEGIN CERTIFICATE-----\nYWJj\n"[..],
            &b"-----BEGIN CERTIFICATE-----\nYWJj\n-----END CERTIFICATE-----\nextra"[..],
            &b" -----BEGIN CERTIFICATE-----\nYWJj\n-----END CERTIFICATE-----\n"[..],
            &b"-----BEGIN CERTIFICATE-----\n!!!!\n-----END CERTIFICATE-----\n"[..],
            &b"-----BEGIN CERTIFICATE----------END CERTIFICATE-----\n"[..],
        ] {
            assert!(decode(bad).is_err());
        }
    }
}
