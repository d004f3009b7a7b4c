//! # edgeca - a minimal internal certificate authority for edge nodes
//!
//! edgeca bootstraps a self-signed ECDSA P-256 root and a TLS server identity
//! on first run, then serves two HTTPS endpoints: unauthenticated retrieval
//! of the CA certificate, and issuance of short-lived client-authentication
//! certificates against a DER-encoded CSR. It is built entirely on the
//! rustcrypto X.509 stack (`x509-cert`, `der`, `p256`), with no openssl or
//! ring dependency.
//!
//! ## Bootstrapping and issuing
//!
//! ```rust,no_run
//! use edgeca::{
//!     bootstrap::{self, BootstrapOptions},
//!     cert::params::DistinguishedName,
//!     key::{EcKeyPair, PublicKey},
//!     store::MemoryStore,
//! };
//!
//! # fn main() -> Result<(), edgeca::error::CaError> {
//! let store = MemoryStore::new();
//! let options = BootstrapOptions::builder()
//!     .ca_common_name("edgeca-root".to_string())
//!     .server_common_name("ca.edge.local".to_string())
//!     .build();
//!
//! // Generates and persists the root CA and server identity on first run;
//! // a second run loads the same material unchanged.
//! let material = bootstrap::prepare_all_certs(&store, &options)?;
//!
//! // Sign a client certificate for an edge node's public key.
//! let node_key = EcKeyPair::generate();
//! let subject = DistinguishedName::builder()
//!     .common_name("edge-1".to_string())
//!     .organization(vec!["org-a".to_string()])
//!     .build();
//! let cert_der = edgeca::authority::sign_client_cert(
//!     &subject,
//!     &PublicKey::EcdsaP256(node_key.verifying_key()),
//!     &material.ca_cert,
//!     &material.ca_key,
//!     time::Duration::days(30),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edgeca::server::{self, AppState};
//! # async fn run(material: edgeca::bootstrap::CaMaterial) -> Result<(), edgeca::error::CaError> {
//! let state = Arc::new(AppState {
//!     material,
//!     validity: time::Duration::days(365),
//! });
//! server::serve("0.0.0.0:7443".parse().unwrap(), state).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module organization
//!
//! - [`key`]: P-256 key pairs (SEC1/PKCS#8 codecs) and requester public keys
//! - [`cert`]: certificate wrapper, names, validity, typed extensions
//! - [`authority`]: root generation and the certificate signer
//! - [`csr`]: CSR parsing and proof-of-possession verification
//! - [`bootstrap`]: first-run generation of CA and server identity
//! - [`store`]: persistence of key material as DER blobs
//! - [`server`]: the HTTPS issuance endpoints
//! - [`error`]: the failure taxonomy

pub mod authority;
pub mod bootstrap;
pub mod cert;
pub mod csr;
pub mod error;
pub mod key;
pub mod pem_utils;
pub mod server;
pub mod store;
pub mod tbs_certificate;
