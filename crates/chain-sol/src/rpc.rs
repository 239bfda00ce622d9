//! Minimal Solana JSON-RPC client.
//!
//! Covers the four calls the wallet makes: `getBalance`, `getLatestBlockhash`,
//! `sendTransaction` and `getSignatureStatuses`. Each call is a single HTTP
//! POST with no retry; callers decide what a failure means.

use std::time::Duration;

use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::SolError;

/// Public devnet endpoint.
pub const DEVNET_URL: &str = "https://api.devnet.solana.com";
/// Public testnet endpoint.
pub const TESTNET_URL: &str = "https://api.testnet.solana.com";
/// Public mainnet-beta endpoint (heavily rate limited).
pub const MAINNET_URL: &str = "https://api.mainnet-beta.solana.com";

/// Per-request limit applied unless the caller picks another.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Commitment level requested from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Commitment::Processed => 0,
            Commitment::Confirmed => 1,
            Commitment::Finalized => 2,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "processed" => Some(Commitment::Processed),
            "confirmed" => Some(Commitment::Confirmed),
            "finalized" => Some(Commitment::Finalized),
            _ => None,
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Status of a submitted transaction as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub commitment: Option<Commitment>,
    /// On-chain error, rendered as JSON, if the transaction failed.
    pub err: Option<String>,
}

/// HTTP JSON-RPC client bound to a single endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    commitment: Commitment,
}

impl RpcClient {
    /// Client for `url`. Every request, connect included, fails with
    /// [`SolError::Transport`] once `request_timeout` elapses.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Result<Self, SolError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| SolError::Transport(format!("http client init: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
            commitment: Commitment::Confirmed,
        })
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, SolError> {
        debug!(method, url = %self.url, "rpc call");
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let envelope: RpcEnvelope = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        unwrap_envelope(envelope)
    }

    /// Balance in lamports. `None` when the node returns no numeric value.
    pub async fn get_balance(&self, address: &str) -> Result<Option<u64>, SolError> {
        let result = self
            .call(
                "getBalance",
                json!([address, { "commitment": self.commitment.as_str() }]),
            )
            .await?;
        Ok(parse_balance(&result))
    }

    pub async fn get_latest_blockhash(&self) -> Result<[u8; 32], SolError> {
        let result = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        parse_blockhash(&result)
    }

    /// Submit a signed wire transaction. Returns the signature the node
    /// reports.
    pub async fn send_transaction(&self, wire: &[u8]) -> Result<String, SolError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
        let result = self
            .call(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "skipPreflight": false,
                    "preflightCommitment": self.commitment.as_str(),
                }]),
            )
            .await?;
        result
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| SolError::UnexpectedResponse(format!("sendTransaction: {result}")))
    }

    pub async fn get_signature_status(
        &self,
        signature: &str,
    ) -> Result<Option<SignatureStatus>, SolError> {
        let result = self
            .call(
                "getSignatureStatuses",
                json!([[signature], { "searchTransactionHistory": false }]),
            )
            .await?;
        parse_signature_status(&result)
    }

    /// Poll the signature status until it reaches this client's commitment,
    /// fails on chain, or `timeout` elapses.
    pub async fn confirm_transaction(
        &self,
        signature: &str,
        timeout: Duration,
        poll_every: Duration,
    ) -> Result<(), SolError> {
        let wait = async {
            loop {
                if let Some(status) = self.get_signature_status(signature).await? {
                    if let Some(reason) = status.err {
                        return Err(SolError::TransactionFailed {
                            signature: signature.to_owned(),
                            reason,
                        });
                    }
                    if status
                        .commitment
                        .is_some_and(|c| c.rank() >= self.commitment.rank())
                    {
                        return Ok(());
                    }
                }
                tokio::time::sleep(poll_every).await;
            }
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| SolError::ConfirmationTimeout(signature.to_owned()))?
    }
}

fn unwrap_envelope(envelope: RpcEnvelope) -> Result<Value, SolError> {
    if let Some(err) = envelope.error {
        return Err(SolError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| SolError::UnexpectedResponse("missing result".into()))
}

fn parse_balance(result: &Value) -> Option<u64> {
    result.get("value").and_then(Value::as_u64)
}

fn parse_blockhash(result: &Value) -> Result<[u8; 32], SolError> {
    let text = result
        .get("value")
        .and_then(|v| v.get("blockhash"))
        .and_then(Value::as_str)
        .ok_or_else(|| SolError::UnexpectedResponse(format!("getLatestBlockhash: {result}")))?;

    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|e| SolError::UnexpectedResponse(format!("blockhash not base58: {e}")))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::UnexpectedResponse(format!("blockhash is {} bytes", v.len()))
    })
}

fn parse_signature_status(result: &Value) -> Result<Option<SignatureStatus>, SolError> {
    let entry = result
        .get("value")
        .and_then(Value::as_array)
        .and_then(|values| values.first())
        .ok_or_else(|| {
            SolError::UnexpectedResponse(format!("getSignatureStatuses: {result}"))
        })?;

    if entry.is_null() {
        return Ok(None);
    }

    let commitment = entry
        .get("confirmationStatus")
        .and_then(Value::as_str)
        .and_then(Commitment::parse);
    let err = entry
        .get("err")
        .filter(|e| !e.is_null())
        .map(Value::to_string);

    Ok(Some(SignatureStatus { commitment, err }))
}
