use der::asn1::ObjectIdentifier;
use p256::SecretKey;
use p256::ecdsa::{DerSignature, SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey};
use pkcs8::EncodePrivateKey;
use rsa::RsaPublicKey;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::signature::{Signer, Verifier};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{CaError, Result};
use crate::pem_utils::{self, EC_PRIVATE_KEY_LABEL};

/// An ECDSA P-256 key pair, the key type used for CA and server identities.
///
/// Keys are persisted as SEC1 DER; `to_pkcs8_der` exists for handing the
/// server key to the TLS stack.
pub struct EcKeyPair {
    secret: SecretKey,
}

impl EcKeyPair {
    /// Generate a fresh P-256 key pair from the OS RNG.
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut rand_core::OsRng);
        Self { secret }
    }

    /// Import a SEC1/DER-encoded EC private key.
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let secret =
            SecretKey::from_sec1_der(der).map_err(|e| CaError::InvalidKey(e.to_string()))?;
        Ok(Self { secret })
    }

    /// Export the private key as SEC1 DER, the inverse of [`Self::from_sec1_der`].
    pub fn to_sec1_der(&self) -> Result<Vec<u8>> {
        let der = self
            .secret
            .to_sec1_der()
            .map_err(|e| CaError::Encoding(e.to_string()))?;
        Ok(der.to_vec())
    }

    /// Import from a PEM-wrapped SEC1 key.
    pub fn from_sec1_pem(pem: &str) -> Result<Self> {
        Self::from_sec1_der(&pem_utils::pem_to_der(pem, EC_PRIVATE_KEY_LABEL)?)
    }

    /// Export as a PEM-wrapped SEC1 key.
    pub fn to_sec1_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(
            &self.to_sec1_der()?,
            EC_PRIVATE_KEY_LABEL,
        ))
    }

    /// Export the private key as PKCS#8 DER for TLS library consumption.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .secret
            .to_pkcs8_der()
            .map_err(|e| CaError::Encoding(e.to_string()))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// The verifying half of the pair.
    pub fn verifying_key(&self) -> P256VerifyingKey {
        P256VerifyingKey::from(self.secret.public_key())
    }

    /// Encode the public half as a SubjectPublicKeyInfo structure.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        SubjectPublicKeyInfoOwned::from_key(self.verifying_key())
            .map_err(|e| CaError::Encoding(e.to_string()))
    }

    /// Sign `data` with ECDSA-P256-SHA256, returning a DER-encoded signature
    /// as required by the X.509 signature bit string.
    pub fn sign_der(&self, data: &[u8]) -> Vec<u8> {
        let signing_key = P256SigningKey::from(&self.secret);
        let signature: DerSignature = signing_key.sign(data);
        signature.as_bytes().to_vec()
    }
}

/// A requester public key extracted from a CSR.
///
/// The signer embeds the key verbatim and never polices its strength; the
/// supported families are the ones in use across the fleet.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Rsa(Box<RsaPublicKey>),
    EcdsaP256(P256VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    /// Parse a SubjectPublicKeyInfo structure into a supported key.
    pub fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let raw = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| CaError::InvalidKey("public key bit string is unaligned".into()))?;
        match spki.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                let key = RsaPublicKey::from_pkcs1_der(raw)
                    .map_err(|e| CaError::InvalidKey(e.to_string()))?;
                Ok(PublicKey::Rsa(Box::new(key)))
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => {
                let curve = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|p| p.decode_as::<ObjectIdentifier>().ok())
                    .ok_or_else(|| CaError::InvalidKey("EC key without curve parameter".into()))?;
                if curve != const_oid::db::rfc5912::SECP_256_R_1 {
                    return Err(CaError::InvalidKey(format!("unsupported curve {curve}")));
                }
                let key = P256VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|e| CaError::InvalidKey(e.to_string()))?;
                Ok(PublicKey::EcdsaP256(key))
            }
            const_oid::db::rfc8410::ID_ED_25519 => {
                let key = ed25519_dalek::VerifyingKey::try_from(raw)
                    .map_err(|e| CaError::InvalidKey(e.to_string()))?;
                Ok(PublicKey::Ed25519(key))
            }
            other => Err(CaError::InvalidKey(format!(
                "unsupported public key algorithm {other}"
            ))),
        }
    }

    /// Encode back into a SubjectPublicKeyInfo structure for embedding in a
    /// certificate template.
    pub fn to_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            PublicKey::Rsa(key) => SubjectPublicKeyInfoOwned::from_key((**key).clone()),
            PublicKey::EcdsaP256(key) => SubjectPublicKeyInfoOwned::from_key(*key),
            PublicKey::Ed25519(key) => SubjectPublicKeyInfoOwned::from_key(*key),
        };
        spki.map_err(|e| CaError::Encoding(e.to_string()))
    }

    /// Verify `signature` over `message` under the given X.509 signature
    /// algorithm OID. Used to check a CSR's proof-of-possession signature.
    pub fn verify(&self, sig_alg: ObjectIdentifier, message: &[u8], signature: &[u8]) -> Result<()> {
        match (self, sig_alg) {
            (PublicKey::EcdsaP256(key), const_oid::db::rfc5912::ECDSA_WITH_SHA_256) => {
                let sig = DerSignature::try_from(signature)
                    .map_err(|e| CaError::InvalidCsr(e.to_string()))?;
                key.verify(message, &sig)
                    .map_err(|e| CaError::InvalidCsr(format!("signature check failed: {e}")))
            }
            (PublicKey::Rsa(key), const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION) => {
                let verifying_key = rsa::pkcs1v15::VerifyingKey::<Sha256>::new((**key).clone());
                let sig = rsa::pkcs1v15::Signature::try_from(signature)
                    .map_err(|e| CaError::InvalidCsr(e.to_string()))?;
                verifying_key
                    .verify(message, &sig)
                    .map_err(|e| CaError::InvalidCsr(format!("signature check failed: {e}")))
            }
            (PublicKey::Ed25519(key), const_oid::db::rfc8410::ID_ED_25519) => {
                let sig = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|e| CaError::InvalidCsr(e.to_string()))?;
                key.verify(message, &sig)
                    .map_err(|e| CaError::InvalidCsr(format!("signature check failed: {e}")))
            }
            (_, other) => Err(CaError::InvalidCsr(format!(
                "signature algorithm {other} does not match the embedded key"
            ))),
        }
    }
}
