pub mod extensions;
pub mod params;

use der::{Decode, Encode};
use x509_cert::certificate::CertificateInner;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::{CaError, Result};
use crate::pem_utils::{self, CERTIFICATE_LABEL};

/// The signature algorithm this CA signs with: ECDSA over P-256 with SHA-256.
pub(crate) fn ecdsa_sha256() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
        parameters: None,
    }
}

/// An X.509 certificate, wrapping the x509-cert representation with the
/// DER/PEM codecs this crate exposes.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub inner: CertificateInner,
}

impl Certificate {
    /// Parses a DER-encoded X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)
            .map_err(|e| CaError::InvalidCertificate(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CaError::Encoding(e.to_string()))
    }

    /// Encodes the certificate into a PEM envelope.
    pub fn to_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_der()?, CERTIFICATE_LABEL))
    }

    /// Parses a PEM-encoded certificate.
    pub fn from_pem(pem: &str) -> Result<Self> {
        Self::from_der(&pem_utils::pem_to_der(pem, CERTIFICATE_LABEL)?)
    }

    /// The subject name of the certificate.
    pub fn subject(&self) -> params::DistinguishedName {
        params::DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    /// The issuer name of the certificate.
    pub fn issuer(&self) -> params::DistinguishedName {
        params::DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// The certificate serial number as raw bytes.
    pub fn serial_number(&self) -> Vec<u8> {
        self.inner
            .tbs_certificate
            .serial_number
            .as_bytes()
            .to_vec()
    }
}
