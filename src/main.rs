//! edgeca server binary: bootstrap the CA material, then serve the HTTPS
//! issuance endpoints until shutdown.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use edgeca::bootstrap::{self, BootstrapOptions};
use edgeca::server::{self, AppState};
use edgeca::store::DirStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("EDGECA_LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::Config::from_env()?;

    let store = DirStore::open(&config.state_dir)
        .with_context(|| format!("opening state directory {}", config.state_dir.display()))?;

    let options = BootstrapOptions::builder()
        .ca_common_name(config.ca_common_name.clone())
        .server_common_name(config.server_common_name.clone())
        .server_alt_names(config.server_alt_names.clone())
        .build();

    // Fatal on any failure: the listener must never start with a missing or
    // inconsistent identity.
    let material =
        bootstrap::prepare_all_certs(&store, &options).context("certificate bootstrap failed")?;

    info!(
        state_dir = %config.state_dir.display(),
        validity_days = config.cert_validity.whole_days(),
        "CA material ready"
    );

    let state = Arc::new(AppState {
        material,
        validity: config.cert_validity,
    });

    let addr = SocketAddr::new(config.address, config.port);
    server::serve(addr, state).await?;
    Ok(())
}
