use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Any;
use der::asn1::{SetOfVec, Utf8StringRef};
use time::{Duration, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::X509ExtensionValue;
pub use crate::cert::extensions::{ExtendedKeyUsageOption, SubjectAltName};
use crate::error::{CaError, Result};
use crate::key::PublicKey;

const COMMON_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.3");
const ORGANIZATION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// Subject or issuer name of a certificate.
///
/// Only the attributes the issuance protocol carries are modeled: a common
/// name and zero or more organizations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Builder)]
pub struct DistinguishedName {
    pub common_name: String,
    #[builder(default)]
    pub organization: Vec<String>,
}

impl DistinguishedName {
    /// Converts the distinguished name to the x509-cert RDN representation.
    ///
    /// The sequence is built attribute by attribute rather than through the
    /// RFC 4514 string form, so values containing commas, plus signs or other
    /// special characters survive unchanged and cannot split into extra
    /// attributes.
    pub fn as_x509_name(&self) -> Result<RdnSequence> {
        let mut rdns = Vec::with_capacity(1 + self.organization.len());
        rdns.push(single_attribute_rdn(COMMON_NAME_OID, &self.common_name)?);
        for org in &self.organization {
            rdns.push(single_attribute_rdn(ORGANIZATION_OID, org)?);
        }
        Ok(RdnSequence(rdns))
    }

    /// Extracts the common name and organizations from an X.509 name.
    ///
    /// Attributes other than CN and O are ignored; string values may be
    /// UTF8String, PrintableString or IA5String.
    pub fn from_x509_name(name: &RdnSequence) -> Self {
        let mut common_name = String::new();
        let mut organization = Vec::new();
        for rdn in name.0.iter() {
            for attr in rdn.0.iter() {
                let Some(value) = decode_string_attr(attr) else {
                    continue;
                };
                if attr.oid == COMMON_NAME_OID {
                    common_name = value;
                } else if attr.oid == ORGANIZATION_OID {
                    organization.push(value);
                }
            }
        }
        DistinguishedName {
            common_name,
            organization,
        }
    }
}

fn single_attribute_rdn(oid: ObjectIdentifier, value: &str) -> Result<RelativeDistinguishedName> {
    let value = Any::encode_from(
        &Utf8StringRef::new(value)
            .map_err(|e| CaError::Encoding(format!("invalid name attribute: {e}")))?,
    )?;
    let set = SetOfVec::try_from(vec![AttributeTypeAndValue { oid, value }])?;
    Ok(RelativeDistinguishedName(set))
}

fn decode_string_attr(attr: &AttributeTypeAndValue) -> Option<String> {
    if let Ok(s) = attr.value.decode_as::<String>() {
        return Some(s);
    }
    if let Ok(s) = attr.value.decode_as::<der::asn1::PrintableString>() {
        return Some(s.to_string());
    }
    if let Ok(s) = attr.value.decode_as::<der::asn1::Ia5String>() {
        return Some(s.to_string());
    }
    None
}

/// Certificate validity period, the `notBefore`/`notAfter` pair.
#[derive(Clone, Debug)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// A validity window starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        Self::for_duration(Duration::days(days))
    }

    /// A validity window `[now, now + duration)`.
    pub fn for_duration(duration: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + duration,
        }
    }
}

/// Template for a certificate to be issued.
///
/// The signer fills in serial number, validity, issuer and signature; the
/// template carries everything the requester controls.
#[derive(Clone, Debug, Builder)]
pub struct CertificateTemplate {
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub subject_alt_names: Vec<String>,
}

/// A raw X.509 extension: OID, criticality and DER-encoded value.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Encodes a typed extension into its raw form.
    pub fn from_extension<E: X509ExtensionValue>(extension: &E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_der_value()?,
        })
    }

    /// Decodes the raw value back into a typed extension.
    pub fn to_extension<E: X509ExtensionValue>(&self) -> Result<E> {
        E::from_der_value(&self.value)
    }
}
