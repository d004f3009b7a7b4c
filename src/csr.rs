use der::{Decode, Encode};
use x509_cert::request::CertReq;

use crate::cert::params::DistinguishedName;
use crate::error::{CaError, Result};
use crate::key::PublicKey;

/// The subject and public key extracted from a verified CSR. Ephemeral,
/// lives for one issuance request.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub subject: DistinguishedName,
    pub public_key: PublicKey,
}

/// Parses a DER-encoded PKCS#10 certificate signing request and verifies its
/// self-signature before trusting the embedded public key.
///
/// The signature check is the proof-of-possession gate: a CSR whose signature
/// does not verify under its own public key is rejected, as is any signature
/// algorithm outside the supported families.
pub fn parse_csr(der: &[u8]) -> Result<SigningRequest> {
    let req = CertReq::from_der(der).map_err(|e| CaError::InvalidCsr(e.to_string()))?;

    let public_key = PublicKey::from_spki(&req.info.public_key)
        .map_err(|e| CaError::InvalidCsr(e.to_string()))?;

    let signed_bytes = req
        .info
        .to_der()
        .map_err(|e| CaError::InvalidCsr(e.to_string()))?;
    let signature = req
        .signature
        .as_bytes()
        .ok_or_else(|| CaError::InvalidCsr("signature bit string is unaligned".into()))?;
    public_key.verify(req.algorithm.oid, &signed_bytes, signature)?;

    let subject = DistinguishedName::from_x509_name(&req.info.subject);
    if subject.common_name.is_empty() {
        return Err(CaError::InvalidCsr("subject has no common name".into()));
    }

    Ok(SigningRequest {
        subject,
        public_key,
    })
}
