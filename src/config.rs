use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub address: IpAddr,
    pub port: u16,
    pub state_dir: PathBuf,
    /// Signing policy: validity window of issued client certificates.
    pub cert_validity: time::Duration,
    pub ca_common_name: String,
    pub server_common_name: String,
    pub server_alt_names: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let address = env::var("EDGECA_ADDRESS")
            .unwrap_or_else(|_| "0.0.0.0".into())
            .parse()
            .context("EDGECA_ADDRESS must be an IP address")?;
        let port = env::var("EDGECA_PORT")
            .unwrap_or_else(|_| "7443".into())
            .parse()
            .context("EDGECA_PORT must be a valid port number")?;
        let state_dir =
            PathBuf::from(env::var("EDGECA_STATE_DIR").unwrap_or_else(|_| "/var/lib/edgeca".into()));
        let validity_days: i64 = env::var("EDGECA_CERT_VALIDITY_DAYS")
            .unwrap_or_else(|_| "365".into())
            .parse()
            .context("EDGECA_CERT_VALIDITY_DAYS must be a number of days")?;
        anyhow::ensure!(validity_days > 0, "EDGECA_CERT_VALIDITY_DAYS must be positive");

        let server_common_name =
            env::var("EDGECA_SERVER_COMMON_NAME").unwrap_or_else(|_| "ca.edge.local".into());
        let server_alt_names = env::var("EDGECA_SERVER_SANS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![server_common_name.clone()]);

        Ok(Self {
            address,
            port,
            state_dir,
            cert_validity: time::Duration::days(validity_days),
            ca_common_name: env::var("EDGECA_CA_COMMON_NAME")
                .unwrap_or_else(|_| "edgeca-root".into()),
            server_common_name,
            server_alt_names,
        })
    }
}
