// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use libfuzzer_sys::fuzz_target;
use truststore::cert::{AttributeCertificate, CertSignRequest, Certificate};
use truststore::name::DistinguishedName;
use truststore::RevocationStore;

// Every parser must reject arbitrary input with an error, never panic.
fuzz_target!(|data: &[u8]| {
    let _ = Certificate::parse_der(data);
    let _ = CertSignRequest::parse_der(data);
    let _ = AttributeCertificate::parse_der(data);
    let _ = DistinguishedName::parse_der(data);
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = DistinguishedName::parse_str(text);
        let _ = Certificate::parse_pem(text);
    }
    let _ = RevocationStore::new().import_crl(data, 0);
});
