use der::Encode;
use der::asn1::OctetString;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::params::{DistinguishedName, ExtensionParam, Validity};
use crate::error::{CaError, Result};

/// The "To Be Signed" portion of an X.509 certificate: everything the signer
/// commits to before producing the signature.
pub struct TbsCertificate {
    /// Unique per issuance; randomly generated by the signer.
    pub serial_number: Vec<u8>,
    pub issuer: DistinguishedName,
    pub validity: Validity,
    pub subject: DistinguishedName,
    /// Embedded verbatim from the requester.
    pub subject_public_key: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts into the x509-cert structure ready for DER encoding. The
    /// signature algorithm is fixed to this CA's ECDSA-P256-SHA256.
    pub fn to_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        let serial_number = SerialNumber::new(self.serial_number.as_slice())
            .map_err(|e| CaError::Encoding(format!("invalid serial number: {e}")))?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: crate::cert::ecdsa_sha256(),
            issuer: self.issuer.as_x509_name()?,
            validity,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Encodes the TBS structure into DER, the byte sequence the signature
    /// covers.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        Ok(self.to_inner()?.to_der()?)
    }
}

fn to_x509_time(t: time::OffsetDateTime) -> Result<x509_cert::time::Time> {
    // UTCTime cannot represent dates from 2050 on.
    if t.year() >= 2050 {
        let date_time = der::DateTime::from_system_time(t.into())
            .map_err(|e| CaError::Encoding(format!("validity out of range: {e}")))?;
        return Ok(x509_cert::time::Time::GeneralTime(
            der::asn1::GeneralizedTime::from_date_time(date_time),
        ));
    }
    let time = der::asn1::UtcTime::from_system_time(t.into())
        .map(x509_cert::time::Time::UtcTime)
        .map_err(|e| CaError::Encoding(format!("validity out of UTCTime range: {e}")))?;
    Ok(time)
}
