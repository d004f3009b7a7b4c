use bon::Builder;
use tracing::info;

use crate::authority::CertificateAuthority;
use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::cert::params::{CertificateTemplate, DistinguishedName, Validity};
use crate::error::{CaError, Result};
use crate::key::{EcKeyPair, PublicKey};
use crate::store::{MaterialSlot, MaterialStore};

/// Validity of the bootstrap-generated server TLS identity.
const SERVER_IDENTITY_VALIDITY_DAYS: i64 = 3650;

/// Immutable snapshot of the CA and server identity, all DER-encoded.
///
/// Produced once by [`prepare_all_certs`] and injected into the issuance
/// server; handlers never reach into a global for key material.
#[derive(Clone)]
pub struct CaMaterial {
    pub ca_cert: Vec<u8>,
    pub ca_key: Vec<u8>,
    pub server_cert: Vec<u8>,
    pub server_key: Vec<u8>,
}

/// Names baked into generated material on first run.
#[derive(Clone, Debug, Builder)]
pub struct BootstrapOptions {
    pub ca_common_name: String,
    pub server_common_name: String,
    #[builder(default)]
    pub server_alt_names: Vec<String>,
}

/// Ensures the store holds a root CA and a server identity, generating and
/// persisting whichever is absent. Idempotent; must complete before the
/// issuance server binds.
///
/// A slot pair where exactly one of {certificate, key} is present is treated
/// as corruption and fails bootstrap rather than regenerating over it.
pub fn prepare_all_certs(
    store: &dyn MaterialStore,
    options: &BootstrapOptions,
) -> Result<CaMaterial> {
    let (ca_cert, ca_key) = ensure_ca(store, options)?;
    let (server_cert, server_key) = ensure_server_identity(store, options, &ca_cert, &ca_key)?;
    Ok(CaMaterial {
        ca_cert,
        ca_key,
        server_cert,
        server_key,
    })
}

fn ensure_ca(
    store: &dyn MaterialStore,
    options: &BootstrapOptions,
) -> Result<(Vec<u8>, Vec<u8>)> {
    let stored_cert = store.get(MaterialSlot::CaCertificate)?;
    let stored_key = store.get(MaterialSlot::CaKey)?;
    match (stored_cert, stored_key) {
        (Some(cert), Some(key)) => Ok((cert, key)),
        (None, None) => {
            info!(
                common_name = %options.ca_common_name,
                "no CA material in store, generating a self-signed root"
            );
            let subject = DistinguishedName::builder()
                .common_name(options.ca_common_name.clone())
                .build();
            let ca = CertificateAuthority::generate(&subject)
                .map_err(|e| CaError::Bootstrap(format!("generating root CA: {e}")))?;
            let cert_der = ca
                .certificate()
                .to_der()
                .map_err(|e| CaError::Bootstrap(format!("encoding CA certificate: {e}")))?;
            let key_der = ca
                .key()
                .to_sec1_der()
                .map_err(|e| CaError::Bootstrap(format!("encoding CA key: {e}")))?;
            store
                .put(MaterialSlot::CaCertificate, &cert_der)
                .and_then(|()| store.put(MaterialSlot::CaKey, &key_der))
                .map_err(|e| CaError::Bootstrap(format!("persisting CA material: {e}")))?;
            Ok((cert_der, key_der))
        }
        _ => Err(CaError::Bootstrap(
            "store holds a CA certificate without its key (or vice versa)".into(),
        )),
    }
}

fn ensure_server_identity(
    store: &dyn MaterialStore,
    options: &BootstrapOptions,
    ca_cert: &[u8],
    ca_key: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let stored_cert = store.get(MaterialSlot::ServerCertificate)?;
    let stored_key = store.get(MaterialSlot::ServerKey)?;
    match (stored_cert, stored_key) {
        (Some(cert), Some(key)) => Ok((cert, key)),
        (None, None) => {
            info!(
                common_name = %options.server_common_name,
                "no server identity in store, signing one with the CA"
            );
            let ca = CertificateAuthority::from_der(ca_cert, ca_key)
                .map_err(|e| CaError::Bootstrap(e.to_string()))?;
            let key = EcKeyPair::generate();
            let template = CertificateTemplate::builder()
                .subject(
                    DistinguishedName::builder()
                        .common_name(options.server_common_name.clone())
                        .build(),
                )
                .subject_public_key(PublicKey::EcdsaP256(key.verifying_key()))
                .usages(vec![ExtendedKeyUsageOption::ServerAuth])
                .subject_alt_names(options.server_alt_names.clone())
                .build();
            let cert = ca
                .issue(&template, Validity::for_days(SERVER_IDENTITY_VALIDITY_DAYS))
                .map_err(|e| CaError::Bootstrap(format!("signing server identity: {e}")))?;
            let cert_der = cert
                .to_der()
                .map_err(|e| CaError::Bootstrap(format!("encoding server certificate: {e}")))?;
            let key_der = key
                .to_sec1_der()
                .map_err(|e| CaError::Bootstrap(format!("encoding server key: {e}")))?;
            store
                .put(MaterialSlot::ServerCertificate, &cert_der)
                .and_then(|()| store.put(MaterialSlot::ServerKey, &key_der))
                .map_err(|e| CaError::Bootstrap(format!("persisting server identity: {e}")))?;
            Ok((cert_der, key_der))
        }
        _ => Err(CaError::Bootstrap(
            "store holds a server certificate without its key (or vice versa)".into(),
        )),
    }
}
