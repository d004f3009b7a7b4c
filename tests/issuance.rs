mod util;

use der::Decode;
use time::Duration;
use x509_cert::certificate::{CertificateInner, Rfc5280};

use edgeca::authority::{self, CertificateAuthority};
use edgeca::cert::extensions::{
    BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, X509ExtensionValue,
};
use edgeca::cert::params::DistinguishedName;
use edgeca::error::CaError;
use edgeca::key::{EcKeyPair, PublicKey};

fn test_ca() -> (Vec<u8>, Vec<u8>) {
    let subject = DistinguishedName::builder()
        .common_name("test-root".to_string())
        .build();
    let ca = CertificateAuthority::generate(&subject).unwrap();
    (
        ca.certificate().to_der().unwrap(),
        ca.key().to_sec1_der().unwrap(),
    )
}

fn edge_subject() -> DistinguishedName {
    DistinguishedName::builder()
        .common_name("edge-1".to_string())
        .organization(vec!["org-a".to_string()])
        .build()
}

#[test]
fn issued_cert_carries_subject_and_issuer() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let cert_der = authority::sign_client_cert(
        &edge_subject(),
        &PublicKey::EcdsaP256(node_key.verifying_key()),
        &ca_cert,
        &ca_key,
        Duration::days(30),
    )
    .unwrap();

    let cert = edgeca::cert::Certificate::from_der(&cert_der).unwrap();
    assert_eq!(cert.subject().common_name, "edge-1");
    assert_eq!(cert.subject().organization, vec!["org-a".to_string()]);
    assert_eq!(cert.issuer().common_name, "test-root");
    util::verify_signed_by(&cert_der, &ca_cert);
}

#[test]
fn issued_cert_is_client_auth_only_and_not_a_ca() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let cert_der = authority::sign_client_cert(
        &edge_subject(),
        &PublicKey::EcdsaP256(node_key.verifying_key()),
        &ca_cert,
        &ca_key,
        Duration::days(30),
    )
    .unwrap();

    let eku_value = util::find_extension(&cert_der, ExtendedKeyUsage::OID)
        .expect("issued cert should carry extended key usage");
    let eku = ExtendedKeyUsage::from_der_value(&eku_value).unwrap();
    assert_eq!(eku.usage, vec![ExtendedKeyUsageOption::ClientAuth]);

    let bc_value = util::find_extension(&cert_der, BasicConstraints::OID)
        .expect("issued cert should carry basic constraints");
    let bc = BasicConstraints::from_der_value(&bc_value).unwrap();
    assert!(!bc.is_ca);
}

#[test]
fn validity_window_matches_policy() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let validity = Duration::hours(6);
    let before = time::OffsetDateTime::now_utc();
    let cert_der = authority::sign_client_cert(
        &edge_subject(),
        &PublicKey::EcdsaP256(node_key.verifying_key()),
        &ca_cert,
        &ca_key,
        validity,
    )
    .unwrap();
    let after = time::OffsetDateTime::now_utc();

    let cert = CertificateInner::<Rfc5280>::from_der(&cert_der).unwrap();
    let not_before = util::to_offset(&cert.tbs_certificate.validity.not_before);
    let not_after = util::to_offset(&cert.tbs_certificate.validity.not_after);

    // UTCTime has one-second resolution.
    let tolerance = Duration::seconds(2);
    assert!(not_before >= before - tolerance);
    assert!(not_before <= after + tolerance);
    assert!((not_after - not_before - validity).abs() <= tolerance);
}

#[test]
fn subject_with_commas_survives_issuance() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let subject = DistinguishedName::builder()
        .common_name("Acme, Inc. edge-1".to_string())
        .organization(vec!["Acme, Inc.".to_string()])
        .build();
    let cert_der = authority::sign_client_cert(
        &subject,
        &PublicKey::EcdsaP256(node_key.verifying_key()),
        &ca_cert,
        &ca_key,
        Duration::days(30),
    )
    .unwrap();

    // The issued subject is exactly the requested one; the comma neither
    // fails encoding nor splits into additional attributes.
    let cert = edgeca::cert::Certificate::from_der(&cert_der).unwrap();
    assert_eq!(cert.subject(), subject);
    util::verify_signed_by(&cert_der, &ca_cert);
}

#[test]
fn validity_past_2049_switches_to_generalized_time() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let cert_der = authority::sign_client_cert(
        &edge_subject(),
        &PublicKey::EcdsaP256(node_key.verifying_key()),
        &ca_cert,
        &ca_key,
        Duration::days(30 * 365),
    )
    .unwrap();

    let cert = CertificateInner::<Rfc5280>::from_der(&cert_der).unwrap();
    assert!(matches!(
        cert.tbs_certificate.validity.not_before,
        x509_cert::time::Time::UtcTime(_)
    ));
    assert!(matches!(
        cert.tbs_certificate.validity.not_after,
        x509_cert::time::Time::GeneralTime(_)
    ));
    util::verify_signed_by(&cert_der, &ca_cert);
}

#[test]
fn serial_numbers_are_unique_per_issuance() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let public = PublicKey::EcdsaP256(node_key.verifying_key());
    let first = authority::sign_client_cert(
        &edge_subject(),
        &public,
        &ca_cert,
        &ca_key,
        Duration::days(1),
    )
    .unwrap();
    let second = authority::sign_client_cert(
        &edge_subject(),
        &public,
        &ca_cert,
        &ca_key,
        Duration::days(1),
    )
    .unwrap();

    let first = edgeca::cert::Certificate::from_der(&first).unwrap();
    let second = edgeca::cert::Certificate::from_der(&second).unwrap();
    assert_ne!(first.serial_number(), second.serial_number());
}

#[test]
fn corrupt_ca_material_is_reported_as_such() {
    let (ca_cert, ca_key) = test_ca();
    let node_key = EcKeyPair::generate();
    let public = PublicKey::EcdsaP256(node_key.verifying_key());

    let result = authority::sign_client_cert(
        &edge_subject(),
        &public,
        b"garbage",
        &ca_key,
        Duration::days(1),
    );
    assert!(matches!(result, Err(CaError::InvalidCaMaterial(_))));

    let result = authority::sign_client_cert(
        &edge_subject(),
        &public,
        &ca_cert,
        b"garbage",
        Duration::days(1),
    );
    assert!(matches!(result, Err(CaError::InvalidCaMaterial(_))));
}

#[test]
fn csr_with_wrong_signature_is_rejected() {
    let embedded = EcKeyPair::generate();
    let other = EcKeyPair::generate();
    let csr = util::make_csr_der_signed_with(&embedded, &other, &edge_subject());
    assert!(matches!(
        edgeca::csr::parse_csr(&csr),
        Err(CaError::InvalidCsr(_))
    ));
}

#[test]
fn valid_csr_yields_subject_and_key() {
    let key = EcKeyPair::generate();
    let csr = util::make_csr_der(&key, &edge_subject());
    let request = edgeca::csr::parse_csr(&csr).unwrap();
    assert_eq!(request.subject.common_name, "edge-1");
    assert_eq!(request.subject.organization, vec!["org-a".to_string()]);
    match request.public_key {
        PublicKey::EcdsaP256(vk) => assert_eq!(vk, key.verifying_key()),
        other => panic!("unexpected key type: {other:?}"),
    }
}

#[test]
fn pem_round_trip_is_byte_identical() {
    let (ca_cert, ca_key) = test_ca();

    let cert = edgeca::cert::Certificate::from_der(&ca_cert).unwrap();
    let reloaded = edgeca::cert::Certificate::from_pem(&cert.to_pem().unwrap()).unwrap();
    assert_eq!(ca_cert, reloaded.to_der().unwrap());

    let key = EcKeyPair::from_sec1_der(&ca_key).unwrap();
    let reloaded = EcKeyPair::from_sec1_pem(&key.to_sec1_pem().unwrap()).unwrap();
    assert_eq!(ca_key, reloaded.to_sec1_der().unwrap());
}
