// Shared across the test binaries; not every binary uses every helper.
#![allow(dead_code)]

use der::asn1::BitString;
use der::{Decode, Encode};
use time::OffsetDateTime;
use x509_cert::certificate::{CertificateInner, Rfc5280};
use x509_cert::request::{CertReq, CertReqInfo, Version};
use x509_cert::spki::AlgorithmIdentifierOwned;

use edgeca::cert::params::DistinguishedName;
use edgeca::key::{EcKeyPair, PublicKey};

/// Builds a DER-encoded PKCS#10 CSR for the given subject, self-signed with
/// `key` the way an edge node would produce it.
pub fn make_csr_der(key: &EcKeyPair, subject: &DistinguishedName) -> Vec<u8> {
    make_csr_der_signed_with(key, key, subject)
}

/// Builds a CSR embedding `embedded_key`'s public key but signed with
/// `signing_key`; with distinct keys this yields an invalid proof of
/// possession.
pub fn make_csr_der_signed_with(
    embedded_key: &EcKeyPair,
    signing_key: &EcKeyPair,
    subject: &DistinguishedName,
) -> Vec<u8> {
    let info = CertReqInfo {
        version: Version::V1,
        subject: subject.as_x509_name().unwrap(),
        public_key: embedded_key.as_spki().unwrap(),
        attributes: Default::default(),
    };
    let signature = signing_key.sign_der(&info.to_der().unwrap());
    let req = CertReq {
        info,
        algorithm: AlgorithmIdentifierOwned {
            oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
            parameters: None,
        },
        signature: BitString::from_bytes(&signature).unwrap(),
    };
    req.to_der().unwrap()
}

/// Asserts that `cert_der`'s signature verifies under the public key of
/// `issuer_cert_der`.
pub fn verify_signed_by(cert_der: &[u8], issuer_cert_der: &[u8]) {
    let cert = CertificateInner::<Rfc5280>::from_der(cert_der).expect("certificate should parse");
    let issuer = CertificateInner::<Rfc5280>::from_der(issuer_cert_der).expect("issuer should parse");
    let issuer_key = PublicKey::from_spki(&issuer.tbs_certificate.subject_public_key_info)
        .expect("issuer public key should parse");
    let signed_bytes = cert.tbs_certificate.to_der().unwrap();
    let signature = cert.signature.as_bytes().expect("aligned signature");
    issuer_key
        .verify(cert.signature_algorithm.oid, &signed_bytes, signature)
        .expect("certificate should verify against its issuer");
}

/// Finds a raw extension value by OID in a DER certificate.
pub fn find_extension(cert_der: &[u8], oid: der::oid::ObjectIdentifier) -> Option<Vec<u8>> {
    let cert = CertificateInner::<Rfc5280>::from_der(cert_der).expect("certificate should parse");
    cert.tbs_certificate
        .extensions
        .as_deref()
        .unwrap_or_default()
        .iter()
        .find(|ext| ext.extn_id == oid)
        .map(|ext| ext.extn_value.as_bytes().to_vec())
}

/// Converts an X.509 validity time to an `OffsetDateTime`.
pub fn to_offset(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(t) => OffsetDateTime::from(t.to_system_time()),
        x509_cert::time::Time::GeneralTime(t) => OffsetDateTime::from(t.to_system_time()),
    }
}
