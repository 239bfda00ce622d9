use thiserror::Error;

/// Solana chain operation errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("rpc transport error: {0}")]
    Transport(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected rpc response: {0}")]
    UnexpectedResponse(String),

    #[error("transaction {signature} failed on chain: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("transaction {0} not confirmed before timeout")]
    ConfirmationTimeout(String),
}

impl From<reqwest::Error> for SolError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SolError::Transport(format!("request timed out: {e}"))
        } else {
            SolError::Transport(e.to_string())
        }
    }
}
