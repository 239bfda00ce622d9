//! Transient, dismissible user notifications.

use std::fmt;
use std::time::Duration;

use crate::error::WalletError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn wallet_added(name: &str) -> Self {
        Self::success("Wallet added", format!("Wallet \"{name}\" has been successfully added."))
    }

    pub fn transfer_succeeded(signature: &str) -> Self {
        Self::success("Transaction successful", format!("Transaction signature: {signature}"))
    }

    pub fn copied(what: &str) -> Self {
        Self::success(format!("Copied {what}"), "")
    }

    /// How long the notice stays up unless dismissed earlier.
    pub fn duration(&self) -> Duration {
        match self.level {
            NoticeLevel::Success => Duration::from_secs(3),
            NoticeLevel::Error => Duration::from_secs(5),
        }
    }
}

impl From<&WalletError> for Notice {
    fn from(err: &WalletError) -> Self {
        let title = match err {
            WalletError::Validation { field: "name" } => "Wallet name is required".to_owned(),
            WalletError::Validation { field } => capitalize(&format!("{field} is required")),
            WalletError::Generation(_) => "Mnemonic generation failed".to_owned(),
            WalletError::Derivation(_) => "Wallet creation failed".to_owned(),
            WalletError::Submission(_) => "Transaction failed".to_owned(),
            WalletError::Balance(_) => "Balance unavailable".to_owned(),
            WalletError::Storage(_) => "Could not save wallet data".to_owned(),
            WalletError::Config(_) => "Configuration error".to_owned(),
        };
        Notice::error(title, err.to_string())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.title)
        } else {
            write!(f, "{}: {}", self.title, self.description)
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
