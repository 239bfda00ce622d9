//! Transfer submission and the transfer screen's state.

use std::time::Duration;

use async_trait::async_trait;
use chain_sol::{address_to_bytes, sign_transfer, sol_to_lamports, RpcClient, SolError, SolKeypair};
use tracing::{info, warn};

use crate::error::WalletError;
use crate::session_bridge::SessionBridge;

const DEFAULT_CONFIRM_POLL: Duration = Duration::from_millis(500);

/// Sends native SOL. One attempt per call; callers never retry on their own.
#[async_trait]
pub trait TransferSubmitter: Send + Sync {
    /// Returns the transaction signature once the transfer is confirmed.
    async fn submit(
        &self,
        secret_key: &str,
        destination: &str,
        amount_sol: f64,
    ) -> Result<String, WalletError>;
}

fn submission(e: SolError) -> WalletError {
    WalletError::Submission(e.to_string())
}

/// Builds, signs and broadcasts a System Program transfer over JSON-RPC.
pub struct RpcTransferSubmitter {
    client: RpcClient,
    confirm_timeout: Duration,
}

impl RpcTransferSubmitter {
    pub fn new(client: RpcClient, confirm_timeout: Duration) -> Self {
        Self {
            client,
            confirm_timeout,
        }
    }
}

#[async_trait]
impl TransferSubmitter for RpcTransferSubmitter {
    async fn submit(
        &self,
        secret_key: &str,
        destination: &str,
        amount_sol: f64,
    ) -> Result<String, WalletError> {
        let sender = SolKeypair::from_base58_secret(secret_key.trim()).map_err(submission)?;
        let to = address_to_bytes(destination).map_err(submission)?;
        let lamports = sol_to_lamports(amount_sol).map_err(submission)?;

        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(submission)?;
        let signed = sign_transfer(&sender, &to, lamports, &blockhash).map_err(submission)?;

        let signature = self
            .client
            .send_transaction(&signed.wire)
            .await
            .map_err(submission)?;
        info!(
            from = %sender.address(),
            to = %destination.trim(),
            lamports,
            %signature,
            "transfer sent"
        );

        self.client
            .confirm_transaction(&signature, self.confirm_timeout, DEFAULT_CONFIRM_POLL)
            .await
            .map_err(submission)?;
        info!(%signature, "transfer confirmed");
        Ok(signature)
    }
}

/// State of the transfer screen: which key it will send from.
pub struct TransferScreen {
    bridge: SessionBridge,
    sender_key: Option<String>,
}

impl TransferScreen {
    /// Open the screen. A key passed with the navigation wins; otherwise the
    /// bridge slot is taken and cleared.
    pub fn open(bridge: SessionBridge, explicit: Option<String>) -> Result<Self, WalletError> {
        let sender_key = match explicit.filter(|k| !k.trim().is_empty()) {
            Some(key) => Some(key),
            None => bridge.take_and_clear()?,
        };
        Ok(Self { bridge, sender_key })
    }

    pub fn sender_key(&self) -> Option<&str> {
        self.sender_key.as_deref()
    }

    /// Replace the pre-filled key with one the user typed.
    pub fn set_sender_key(&mut self, key: &str) {
        let key = key.trim();
        self.sender_key = (!key.is_empty()).then(|| key.to_owned());
    }

    /// Submit once. On success the bridge slot is cleared; on failure
    /// neither the slot nor the pre-filled key changes.
    ///
    /// Once the transfer is confirmed the signature is always returned, even
    /// if clearing the slot fails.
    pub async fn submit(
        &self,
        submitter: &dyn TransferSubmitter,
        destination: &str,
        amount_sol: f64,
    ) -> Result<String, WalletError> {
        let key = self
            .sender_key
            .as_deref()
            .ok_or_else(|| WalletError::missing("private key"))?;
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(WalletError::missing("destination"));
        }

        let signature = submitter.submit(key, destination, amount_sol).await?;
        if let Err(e) = self.bridge.clear() {
            warn!(%signature, error = %e, "transfer confirmed but sender slot not cleared");
        }
        Ok(signature)
    }
}
