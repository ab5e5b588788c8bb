use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Cadence of the batch `compute_all` run.
    pub snapshot_interval: Duration,
    pub snapshot_initial_delay: Duration,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("LB_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid LB_LISTEN_ADDR")?;
        let db_path = std::env::var("LB_DB_PATH").unwrap_or_else(|_| "./db/lendbook.db".into());
        let cors_allow = std::env::var("LB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(env_u64("LB_REQUEST_TIMEOUT_MS", 30_000)),
            snapshot_interval: Duration::from_secs(env_u64("LB_SNAPSHOT_INTERVAL_SECS", 86_400)),
            snapshot_initial_delay: Duration::from_secs(env_u64(
                "LB_SNAPSHOT_INITIAL_DELAY_SECS",
                60,
            )),
        })
    }
}
