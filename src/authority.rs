use der::Encode;
use der::asn1::BitString;
use rand_core::RngCore;
use sha1::{Digest, Sha1};
use time::Duration;
use x509_cert::certificate::CertificateInner;

use crate::cert::Certificate;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, FlagSet,
    KeyUsage, KeyUsages, SubjectAltName,
};
use crate::cert::params::{CertificateTemplate, DistinguishedName, ExtensionParam, Validity};
use crate::error::{CaError, Result};
use crate::key::{EcKeyPair, PublicKey};
use crate::tbs_certificate::TbsCertificate;

/// Validity of the self-signed root generated at bootstrap.
pub const ROOT_VALIDITY_DAYS: i64 = 3650;

/// A certificate authority: a certificate and the private key that signs with
/// its subject as issuer.
pub struct CertificateAuthority {
    cert: Certificate,
    key: EcKeyPair,
}

impl CertificateAuthority {
    /// Generates a fresh self-signed P-256 root with the given subject.
    pub fn generate(subject: &DistinguishedName) -> Result<Self> {
        let key = EcKeyPair::generate();
        let template = CertificateTemplate::builder()
            .subject(subject.clone())
            .subject_public_key(PublicKey::EcdsaP256(key.verifying_key()))
            .is_ca(true)
            .build();
        let cert = issue_with(&key, subject, &template, Validity::for_days(ROOT_VALIDITY_DAYS))?;
        Ok(Self { cert, key })
    }

    /// Loads a CA from stored DER material. Any parse failure is reported as
    /// invalid CA material so a corrupted store is distinguishable from a bad
    /// request.
    pub fn from_der(cert_der: &[u8], key_der: &[u8]) -> Result<Self> {
        let cert = Certificate::from_der(cert_der)
            .map_err(|e| CaError::InvalidCaMaterial(e.to_string()))?;
        let key = EcKeyPair::from_sec1_der(key_der)
            .map_err(|e| CaError::InvalidCaMaterial(e.to_string()))?;
        Ok(Self { cert, key })
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    pub fn key(&self) -> &EcKeyPair {
        &self.key
    }

    /// Issues a certificate for the template, signed by this CA.
    pub fn issue(&self, template: &CertificateTemplate, validity: Validity) -> Result<Certificate> {
        issue_with(&self.key, &self.cert.subject(), template, validity)
    }
}

/// Signs a client-authentication certificate for an edge node.
///
/// This is the per-request signing operation behind the issuance endpoint:
/// parse the stored CA material, restrict the template to `ClientAuth`, and
/// return the DER certificate. The requester's key is embedded as supplied.
pub fn sign_client_cert(
    subject: &DistinguishedName,
    public_key: &PublicKey,
    ca_cert_der: &[u8],
    ca_key_der: &[u8],
    validity: Duration,
) -> Result<Vec<u8>> {
    let ca = CertificateAuthority::from_der(ca_cert_der, ca_key_der)?;
    let template = CertificateTemplate::builder()
        .subject(subject.clone())
        .subject_public_key(public_key.clone())
        .usages(vec![ExtendedKeyUsageOption::ClientAuth])
        .build();
    let cert = ca.issue(&template, Validity::for_duration(validity))?;
    cert.to_der()
}

/// Core issuance path shared by the self-signed root and CA-signed leaves.
fn issue_with(
    signing_key: &EcKeyPair,
    issuer: &DistinguishedName,
    template: &CertificateTemplate,
    validity: Validity,
) -> Result<Certificate> {
    let mut extensions = vec![ExtensionParam::from_extension(
        &BasicConstraints {
            is_ca: template.is_ca,
            max_path_length: None,
        },
        true,
    )?];

    let mut key_usage_flags: FlagSet<KeyUsages> = KeyUsages::DigitalSignature.into();
    if template.is_ca {
        key_usage_flags |= KeyUsages::KeyCertSign;
        key_usage_flags |= KeyUsages::CRLSign;
    } else {
        key_usage_flags |= KeyUsages::KeyEncipherment;
        // Leaves chain back to the root via the signer's key id.
        let issuer_spki = signing_key.as_spki()?;
        let key_id = issuer_spki
            .subject_public_key
            .as_bytes()
            .map(|bits| Sha1::digest(bits).to_vec())
            .unwrap_or_default();
        extensions.push(ExtensionParam::from_extension(
            &AuthorityKeyIdentifier {
                key_identifier: key_id,
            },
            false,
        )?);
    }
    extensions.push(ExtensionParam::from_extension(
        &KeyUsage(key_usage_flags),
        true,
    )?);

    if !template.usages.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            &ExtendedKeyUsage {
                usage: template.usages.clone(),
            },
            true,
        )?);
    }

    if !template.subject_alt_names.is_empty() {
        extensions.push(ExtensionParam::from_extension(
            &SubjectAltName {
                names: template.subject_alt_names.clone(),
            },
            false,
        )?);
    }

    let tbs = TbsCertificate {
        serial_number: random_serial(),
        issuer: issuer.clone(),
        validity,
        subject: template.subject.clone(),
        subject_public_key: template.subject_public_key.to_spki()?,
        extensions,
    };

    let tbs_inner = tbs.to_inner()?;
    let tbs_der = tbs_inner.to_der()?;
    let signature = signing_key.sign_der(&tbs_der);

    let inner = CertificateInner {
        tbs_certificate: tbs_inner,
        signature_algorithm: crate::cert::ecdsa_sha256(),
        signature: BitString::from_bytes(&signature)
            .map_err(|e| CaError::Signing(e.to_string()))?,
    };

    Ok(Certificate { inner })
}

/// A 127-bit random serial number, positive and nonzero so it survives DER
/// INTEGER encoding, unique per issuance with overwhelming probability.
fn random_serial() -> Vec<u8> {
    let mut bytes = [0u8; 16];
    rand_core::OsRng.fill_bytes(&mut bytes);
    bytes[0] = (bytes[0] & 0x7f) | 0x01;
    bytes.to_vec()
}
