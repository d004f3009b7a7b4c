use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CaError>;

/// Represents errors that can occur while bootstrapping or operating the CA.
///
/// The variants map one-to-one onto the failure classes the issuance endpoint
/// distinguishes: malformed input from the wire, corrupted stored CA material,
/// and failures inside certificate construction itself.
#[derive(Debug, Error)]
pub enum CaError {
    /// Error while encoding data to DER or PEM.
    #[error("failed to encode data: {0}")]
    Encoding(String),

    /// A DER blob did not parse as an X.509 certificate.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// A DER blob did not parse as a private or public key.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A request body did not parse or verify as a certificate signing request.
    #[error("invalid certificate signing request: {0}")]
    InvalidCsr(String),

    /// The stored CA certificate or CA key failed to parse. Repeated
    /// occurrence indicates a corrupted store and needs operator attention.
    #[error("invalid CA material: {0}")]
    InvalidCaMaterial(String),

    /// Certificate construction or signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// First-run key/certificate generation or persistence failed, or the
    /// store holds partial material (certificate without key or vice versa).
    /// Fatal: the server must not start without a consistent identity.
    #[error("bootstrap failed: {0}")]
    Bootstrap(String),

    /// The material store could not be read or written, or the listener
    /// failed at the socket level.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<der::Error> for CaError {
    fn from(err: der::Error) -> Self {
        CaError::Encoding(err.to_string())
    }
}
