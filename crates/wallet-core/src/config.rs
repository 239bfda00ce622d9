//! Runtime configuration from environment variables.
//!
//! ```bash
//! export SOLANA_RPC_URL="https://my-node.example.com"   # wins over the cluster
//! export SOLANA_CLUSTER=mainnet-beta                     # devnet | testnet | mainnet-beta
//! export WALLET_STORE_PATH=~/.solwallet.json
//! export BALANCE_POLL_INTERVAL_MS=15000
//! export CONFIRM_TIMEOUT_SECS=60
//! export RPC_TIMEOUT_SECS=10
//! export SOLANA_COMMITMENT=confirmed                    # confirmed | finalized
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chain_sol::{
    Commitment, RpcClient, DEFAULT_REQUEST_TIMEOUT, DEVNET_URL, MAINNET_URL, TESTNET_URL,
};

use crate::error::WalletError;

mod env_vars {
    pub const RPC_URL: &str = "SOLANA_RPC_URL";
    pub const CLUSTER: &str = "SOLANA_CLUSTER";
    pub const STORE_PATH: &str = "WALLET_STORE_PATH";
    pub const POLL_INTERVAL_MS: &str = "BALANCE_POLL_INTERVAL_MS";
    pub const CONFIRM_TIMEOUT_SECS: &str = "CONFIRM_TIMEOUT_SECS";
    pub const RPC_TIMEOUT_SECS: &str = "RPC_TIMEOUT_SECS";
    pub const COMMITMENT: &str = "SOLANA_COMMITMENT";
}

pub const DEFAULT_STORE_PATH: &str = "./solwallet.json";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(15_000);
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    pub fn rpc_url(self) -> &'static str {
        match self {
            Cluster::Devnet => DEVNET_URL,
            Cluster::Testnet => TESTNET_URL,
            Cluster::MainnetBeta => MAINNET_URL,
        }
    }
}

impl FromStr for Cluster {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::MainnetBeta),
            other => Err(WalletError::Config(format!("unknown cluster `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WalletConfig {
    pub rpc_url: String,
    pub store_path: PathBuf,
    pub poll_interval: Duration,
    pub confirm_timeout: Duration,
    /// Limit on each individual RPC request.
    pub rpc_timeout: Duration,
    pub commitment: Commitment,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: Cluster::default().rpc_url().to_owned(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            rpc_timeout: DEFAULT_REQUEST_TIMEOUT,
            commitment: Commitment::Confirmed,
        }
    }
}

impl WalletConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup. Unset or blank values fall
    /// back to defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WalletError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(env_vars::RPC_URL) {
            tracing::debug!("Using SOLANA_RPC_URL");
            config.rpc_url = url.trim().to_owned();
        } else if let Some(cluster) = get(env_vars::CLUSTER) {
            let cluster: Cluster = cluster.parse()?;
            tracing::debug!(?cluster, "Using cluster RPC endpoint");
            config.rpc_url = cluster.rpc_url().to_owned();
        }

        if let Some(path) = get(env_vars::STORE_PATH) {
            config.store_path = PathBuf::from(path.trim());
        }
        if let Some(ms) = get(env_vars::POLL_INTERVAL_MS) {
            config.poll_interval = Duration::from_millis(parse_u64(env_vars::POLL_INTERVAL_MS, &ms)?);
        }
        if let Some(secs) = get(env_vars::CONFIRM_TIMEOUT_SECS) {
            config.confirm_timeout =
                Duration::from_secs(parse_u64(env_vars::CONFIRM_TIMEOUT_SECS, &secs)?);
        }
        if let Some(secs) = get(env_vars::RPC_TIMEOUT_SECS) {
            config.rpc_timeout = Duration::from_secs(parse_u64(env_vars::RPC_TIMEOUT_SECS, &secs)?);
        }
        if let Some(level) = get(env_vars::COMMITMENT) {
            config.commitment = Commitment::parse(&level.to_ascii_lowercase()).ok_or_else(|| {
                WalletError::Config(format!("unknown commitment `{}`", level.trim()))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(WalletError::Config(format!(
                "RPC URL must be http(s): `{}`",
                self.rpc_url
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(WalletError::Config("poll interval must be non-zero".into()));
        }
        if self.confirm_timeout.is_zero() {
            return Err(WalletError::Config("confirm timeout must be non-zero".into()));
        }
        if self.rpc_timeout.is_zero() {
            return Err(WalletError::Config("rpc timeout must be non-zero".into()));
        }
        if self.commitment == Commitment::Processed {
            return Err(WalletError::Config(
                "commitment must be `confirmed` or `finalized`".into(),
            ));
        }
        Ok(())
    }

    /// RPC client for the configured endpoint, request timeout and commitment.
    pub fn rpc_client(&self) -> Result<RpcClient, WalletError> {
        let client = RpcClient::new(self.rpc_url.clone(), self.rpc_timeout)
            .map_err(|e| WalletError::Config(e.to_string()))?;
        Ok(client.with_commitment(self.commitment))
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, WalletError> {
    value
        .trim()
        .parse()
        .map_err(|_| WalletError::Config(format!("{key} must be a whole number, got `{value}`")))
}
