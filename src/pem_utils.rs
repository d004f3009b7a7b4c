use crate::error::{CaError, Result};

/// PEM label for X.509 certificates.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";
/// PEM label for SEC1-encoded EC private keys.
pub const EC_PRIVATE_KEY_LABEL: &str = "EC PRIVATE KEY";

/// Convert DER-encoded data into a PEM-encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(&pem, pem::EncodeConfig::new())
}

/// Convert a PEM-encoded string back to DER bytes, checking the label.
pub fn pem_to_der(pem_str: &str, expected_label: &str) -> Result<Vec<u8>> {
    let pem = pem::parse(pem_str).map_err(|e| CaError::Encoding(e.to_string()))?;
    if pem.tag() != expected_label {
        return Err(CaError::Encoding(format!(
            "unexpected PEM label {:?}, wanted {:?}",
            pem.tag(),
            expected_label
        )));
    }
    Ok(pem.contents().to_vec())
}
