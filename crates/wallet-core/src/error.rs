use thiserror::Error;

/// Storage port failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(String),

    #[error("stored value for `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    /// Required user input is missing; nothing was changed.
    #[error("{field} is required")]
    Validation { field: &'static str },

    #[error("Mnemonic generation failed: {0}")]
    Generation(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),

    #[error("Transfer submission failed: {0}")]
    Submission(String),

    #[error("Balance lookup failed: {0}")]
    Balance(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WalletError {
    pub(crate) fn missing(field: &'static str) -> Self {
        WalletError::Validation { field }
    }
}
