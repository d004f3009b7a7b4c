use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum_server::tls_rustls::RustlsConfig;
use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use tracing::{info, warn};

use crate::authority;
use crate::bootstrap::CaMaterial;
use crate::csr;
use crate::error::{CaError, Result};
use crate::key::EcKeyPair;

/// Path serving the raw DER CA certificate.
pub const CA_URL: &str = "/ca";
/// Path accepting DER CSR bodies and returning issued certificates.
pub const CERT_URL: &str = "/edge/certs";
/// Optional caller-supplied header correlating log lines to an edge site.
/// Diagnostic only, never an authorization input.
pub const SITE_ID_HEADER: &str = "SiteID";

const PKIX_CERT: &str = "application/pkix-cert";

/// Everything a request handler needs, injected at construction. The CA
/// material is read-only for the life of the process.
pub struct AppState {
    pub material: CaMaterial,
    /// Validity window applied to every issued client certificate.
    pub validity: time::Duration,
}

/// Builds the issuance router. The CSR endpoint answers both GET and POST;
/// some edge agents still fetch certificates with a bodied GET.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(CA_URL, get(get_ca))
        .route(CERT_URL, get(issue_cert).post(issue_cert))
        .with_state(state)
}

async fn get_ca(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PKIX_CERT)],
        state.material.ca_cert.clone(),
    )
}

async fn issue_cert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    let site_id = headers
        .get(SITE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    let body = match body {
        Ok(body) => body,
        Err(err) => {
            warn!(site_id, error = %err, "failed to read CSR request body");
            return (StatusCode::BAD_REQUEST, "unreadable request body").into_response();
        }
    };

    match sign_from_csr(&state, &body) {
        Ok(cert_der) => ([(header::CONTENT_TYPE, PKIX_CERT)], cert_der).into_response(),
        Err(err) => {
            warn!(site_id, error = %err, "failed to sign edge certificate");
            (status_for(&err), err.to_string()).into_response()
        }
    }
}

fn sign_from_csr(state: &AppState, body: &[u8]) -> Result<Vec<u8>> {
    let request = csr::parse_csr(body)?;
    authority::sign_client_cert(
        &request.subject,
        &request.public_key,
        &state.material.ca_cert,
        &state.material.ca_key,
        state.validity,
    )
}

/// Every failure maps to a non-2xx status; callers can detect a failed
/// issuance from the status code alone.
fn status_for(err: &CaError) -> StatusCode {
    match err {
        CaError::InvalidCsr(_) | CaError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// TLS configuration for the listener: the server identity as the certificate
/// chain, and a client-certificate *request* rooted at our own CA that does
/// not require the client to present one.
pub fn tls_server_config(material: &CaMaterial) -> Result<rustls::ServerConfig> {
    let mut roots = RootCertStore::empty();
    roots
        .add(CertificateDer::from(material.ca_cert.clone()))
        .map_err(|e| CaError::InvalidCaMaterial(e.to_string()))?;
    let client_verifier = WebPkiClientVerifier::builder(Arc::new(roots))
        .allow_unauthenticated()
        .build()
        .map_err(|e| CaError::InvalidCaMaterial(e.to_string()))?;

    let key_pkcs8 = EcKeyPair::from_sec1_der(&material.server_key)?.to_pkcs8_der()?;
    let config = rustls::ServerConfig::builder()
        .with_client_cert_verifier(client_verifier)
        .with_single_cert(
            vec![
                CertificateDer::from(material.server_cert.clone()),
                CertificateDer::from(material.ca_cert.clone()),
            ],
            PrivatePkcs8KeyDer::from(key_pkcs8).into(),
        )
        .map_err(|e| CaError::InvalidCaMaterial(e.to_string()))?;
    Ok(config)
}

/// Binds the HTTPS listener and serves until shutdown. Returns rather than
/// exiting on failure; exit policy belongs to the caller.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let tls = RustlsConfig::from_config(Arc::new(tls_server_config(&state.material)?));
    let router = create_router(state);
    info!(%addr, "issuance server listening");
    axum_server::bind_rustls(addr, tls)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}
