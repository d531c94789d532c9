// truststore-rs: X.509 trust store and chain validation
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Distinguished names as ordered attribute sequences.
//!
//! https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4
//!
//! Equality is structural equality of the attribute sequence. Repeatable
//! attributes (OU, DC) are addressed by a secondary index. Wildcard values
//! take part in pattern search only and are rejected on the issuance path.

use crate::{Error, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, SetOfVec};
use der::{Encode, Tag};
use std::fmt;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};
use x509_parser::prelude::FromDer;

/// Well-known DN attribute identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeId {
    /// commonName (2.5.4.3).
    CommonName,
    /// countryName (2.5.4.6).
    Country,
    /// localityName (2.5.4.7).
    Locality,
    /// stateOrProvinceName (2.5.4.8).
    State,
    /// organizationName (2.5.4.10).
    Organization,
    /// organizationalUnitName (2.5.4.11), repeatable.
    OrganizationalUnit,
    /// serialNumber (2.5.4.5).
    SerialNumber,
    /// domainComponent (0.9.2342.19200300.100.1.25), repeatable.
    DomainComponent,
    /// emailAddress (1.2.840.113549.1.9.1).
    EmailAddress,
    /// Any other attribute type.
    Other(ObjectIdentifier),
}

const OID_CN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const OID_C: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const OID_L: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const OID_ST: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const OID_O: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const OID_OU: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.11");
const OID_SN: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.5");
const OID_DC: ObjectIdentifier = ObjectIdentifier::new_unwrap("0.9.2342.19200300.100.1.25");
const OID_EMAIL: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

impl AttributeId {
    /// Returns the ASN.1 object identifier of this attribute type.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            AttributeId::CommonName => OID_CN,
            AttributeId::Country => OID_C,
            AttributeId::Locality => OID_L,
            AttributeId::State => OID_ST,
            AttributeId::Organization => OID_O,
            AttributeId::OrganizationalUnit => OID_OU,
            AttributeId::SerialNumber => OID_SN,
            AttributeId::DomainComponent => OID_DC,
            AttributeId::EmailAddress => OID_EMAIL,
            AttributeId::Other(oid) => *oid,
        }
    }

    /// Maps an object identifier back to an attribute id.
    pub fn from_oid(oid: ObjectIdentifier) -> Self {
        match oid {
            OID_CN => AttributeId::CommonName,
            OID_C => AttributeId::Country,
            OID_L => AttributeId::Locality,
            OID_ST => AttributeId::State,
            OID_O => AttributeId::Organization,
            OID_OU => AttributeId::OrganizationalUnit,
            OID_SN => AttributeId::SerialNumber,
            OID_DC => AttributeId::DomainComponent,
            OID_EMAIL => AttributeId::EmailAddress,
            other => AttributeId::Other(other),
        }
    }

    /// Whether this attribute type may appear more than once in a DN.
    pub fn repeatable(&self) -> bool {
        matches!(
            self,
            AttributeId::OrganizationalUnit | AttributeId::DomainComponent
        )
    }

    /// Short name used by the string form, if one exists.
    fn short_name(&self) -> Option<&'static str> {
        match self {
            AttributeId::CommonName => Some("CN"),
            AttributeId::Country => Some("C"),
            AttributeId::Locality => Some("L"),
            AttributeId::State => Some("ST"),
            AttributeId::Organization => Some("O"),
            AttributeId::OrganizationalUnit => Some("OU"),
            AttributeId::SerialNumber => Some("SERIALNUMBER"),
            AttributeId::DomainComponent => Some("DC"),
            AttributeId::EmailAddress => Some("E"),
            AttributeId::Other(_) => None,
        }
    }

    fn from_short_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "CN" => Some(AttributeId::CommonName),
            "C" => Some(AttributeId::Country),
            "L" => Some(AttributeId::Locality),
            "ST" => Some(AttributeId::State),
            "O" => Some(AttributeId::Organization),
            "OU" => Some(AttributeId::OrganizationalUnit),
            "SERIALNUMBER" => Some(AttributeId::SerialNumber),
            "DC" => Some(AttributeId::DomainComponent),
            "E" | "EMAILADDRESS" => Some(AttributeId::EmailAddress),
            _ => None,
        }
    }
}

/// A DN attribute value encoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameValue {
    /// UTF8String value.
    Utf8(String),
    /// PrintableString value (restricted ASCII subset from RFC 5280).
    Printable(String),
    /// IA5String value (7-bit ASCII).
    Ia5(String),
    /// Raw bytes for non-text or undecodable values.
    Bytes(Vec<u8>),
    /// Matches any value; valid only inside search patterns.
    Wildcard,
}

impl NameValue {
    /// Returns the textual content when the value is a string form.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NameValue::Utf8(s) | NameValue::Printable(s) | NameValue::Ia5(s) => Some(s),
            NameValue::Bytes(_) | NameValue::Wildcard => None,
        }
    }

    /// Whether this pattern value accepts the given concrete value. Text
    /// values match on content regardless of the string encoding.
    pub fn matches(&self, value: &NameValue) -> bool {
        match (self, value) {
            (NameValue::Wildcard, _) => true,
            (NameValue::Bytes(a), NameValue::Bytes(b)) => a == b,
            (a, b) => match (a.as_text(), b.as_text()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    fn to_any(&self) -> Result<Any> {
        match self {
            NameValue::Utf8(value) => Ok(Any::new(Tag::Utf8String, value.as_bytes())?),
            NameValue::Printable(value) => {
                if !is_printable_string(value) {
                    return Err(Error::invalid("invalid PrintableString characters"));
                }
                Ok(Any::new(Tag::PrintableString, value.as_bytes())?)
            }
            NameValue::Ia5(value) => {
                if !value.is_ascii() {
                    return Err(Error::invalid("invalid IA5String characters"));
                }
                Ok(Any::new(Tag::Ia5String, value.as_bytes())?)
            }
            NameValue::Bytes(_) => Err(Error::invalid(
                "raw DN attribute bytes cannot be re-encoded",
            )),
            NameValue::Wildcard => Err(Error::invalid(
                "wildcard DN values are only valid in search patterns",
            )),
        }
    }
}

fn is_printable_string(value: &str) -> bool {
    value.as_bytes().iter().all(|b| {
        b.is_ascii_alphanumeric()
            || matches!(
                *b,
                b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b'=' | b'?'
            )
    })
}

/// A single DN attribute.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NameAttribute {
    /// Attribute type.
    pub id: AttributeId,
    /// Encoded attribute value.
    pub value: NameValue,
}

/// Distinguished Name represented as ordered attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DistinguishedName {
    /// Ordered list of RDN attributes.
    pub attrs: Vec<NameAttribute>,
}

impl DistinguishedName {
    /// Creates an empty DN.
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Adds a UTF8String CN attribute.
    pub fn cn(self, value: impl Into<String>) -> Self {
        self.push(AttributeId::CommonName, NameValue::Utf8(value.into()))
    }

    /// Adds an arbitrary attribute, preserving order.
    pub fn push(mut self, id: AttributeId, value: NameValue) -> Self {
        self.attrs.push(NameAttribute { id, value });
        self
    }

    /// Returns the `index`-th occurrence of the given attribute type.
    ///
    /// Non-repeatable attributes only answer `index == 0`.
    pub fn get(&self, id: AttributeId, index: usize) -> Option<&NameValue> {
        if index > 0 && !id.repeatable() {
            return None;
        }
        self.attrs
            .iter()
            .filter(|attr| attr.id == id)
            .nth(index)
            .map(|attr| &attr.value)
    }

    /// Whether this DN, interpreted as a pattern, matches the given DN.
    ///
    /// The pattern must list the same attribute types in the same order;
    /// wildcard values accept any concrete value.
    pub fn matches(&self, other: &DistinguishedName) -> bool {
        self.attrs.len() == other.attrs.len()
            && self
                .attrs
                .iter()
                .zip(other.attrs.iter())
                .all(|(pat, val)| pat.id == val.id && pat.value.matches(&val.value))
    }

    /// Whether any attribute value is a wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.attrs
            .iter()
            .any(|attr| attr.value == NameValue::Wildcard)
    }

    /// Parses the `CN=...,OU=...` string form.
    ///
    /// A value of `*` is a wildcard. Unknown attribute types are accepted in
    /// dotted-OID form (`2.5.4.3=...`).
    pub fn parse_str(input: &str) -> Result<Self> {
        let mut dn = DistinguishedName::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(Error::invalid("empty DN component"));
            }
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| Error::invalid(format!("DN component without '=': {part}")))?;
            let key = key.trim();
            let value = value.trim();
            let id = match AttributeId::from_short_name(key) {
                Some(id) => id,
                None => AttributeId::Other(
                    ObjectIdentifier::new(key)
                        .map_err(|_| Error::invalid(format!("unknown DN attribute: {key}")))?,
                ),
            };
            let value = if value == "*" {
                NameValue::Wildcard
            } else {
                NameValue::Utf8(value.to_string())
            };
            dn = dn.push(id, value);
        }
        Ok(dn)
    }

    /// Builds a DN from an `x509-parser` name.
    pub fn from_x509_name(name: &x509_parser::x509::X509Name<'_>) -> Result<Self> {
        let mut attrs = Vec::new();
        for attr in name.iter_attributes() {
            let oid = ObjectIdentifier::new(attr.attr_type().to_id_string().as_str())?;
            let value = match attr.as_str() {
                Ok(text) => NameValue::Utf8(text.to_string()),
                Err(_) => NameValue::Bytes(attr.as_slice().to_vec()),
            };
            attrs.push(NameAttribute {
                id: AttributeId::from_oid(oid),
                value,
            });
        }
        Ok(DistinguishedName { attrs })
    }

    /// Converts the DN to an `x509-cert` name for issuance and encoding.
    pub fn to_x509_name(&self) -> Result<Name> {
        let mut rdns = Vec::with_capacity(self.attrs.len());
        for attr in &self.attrs {
            let mut set = SetOfVec::new();
            set.insert(AttributeTypeAndValue {
                oid: attr.id.oid(),
                value: attr.value.to_any()?,
            })
            .map_err(|e| Error::invalid(format!("DN attribute encoding: {e}")))?;
            rdns.push(RelativeDistinguishedName::from(set));
        }
        Ok(RdnSequence(rdns))
    }

    /// Encodes the DN as a DER RDNSequence.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_x509_name()?.to_der()?)
    }

    /// Parses a DER RDNSequence into a DN.
    pub fn parse_der(der: &[u8]) -> Result<Self> {
        let (rem, name) = x509_parser::x509::X509Name::from_der(der)
            .map_err(|e| Error::invalid(format!("malformed DN: {e}")))?;
        if !rem.is_empty() {
            return Err(Error::invalid("trailing data after DER DN"));
        }
        Self::from_x509_name(&name)
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attrs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match attr.id.short_name() {
                Some(name) => f.write_str(name)?,
                None => write!(f, "{}", attr.id.oid())?,
            }
            f.write_str("=")?;
            match &attr.value {
                NameValue::Utf8(s) | NameValue::Printable(s) | NameValue::Ia5(s) => {
                    f.write_str(s)?
                }
                NameValue::Bytes(b) => {
                    f.write_str("#")?;
                    for byte in b {
                        write!(f, "{byte:02x}")?;
                    }
                }
                NameValue::Wildcard => f.write_str("*")?,
            }
        }
        Ok(())
    }
}
