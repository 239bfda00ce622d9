use bip39::{Language, Mnemonic};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::WalletError;

/// Supported phrase lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MnemonicLength {
    /// 128 bits of entropy.
    #[default]
    Words12,
    /// 256 bits of entropy.
    Words24,
}

impl MnemonicLength {
    pub fn entropy_bytes(&self) -> usize {
        match self {
            MnemonicLength::Words12 => 16,
            MnemonicLength::Words24 => 32,
        }
    }

    pub fn word_count(&self) -> usize {
        match self {
            MnemonicLength::Words12 => 12,
            MnemonicLength::Words24 => 24,
        }
    }

    pub fn from_word_count(words: usize) -> Option<Self> {
        match words {
            12 => Some(MnemonicLength::Words12),
            24 => Some(MnemonicLength::Words24),
            _ => None,
        }
    }
}

/// Generate a fresh English BIP-39 phrase.
///
/// Entropy comes from the OS; if the OS source is unavailable this fails
/// rather than falling back to a weaker generator.
pub fn generate_mnemonic(length: MnemonicLength) -> Result<String, WalletError> {
    let mut entropy = [0u8; 32];
    let entropy = &mut entropy[..length.entropy_bytes()];
    rand::rngs::OsRng
        .try_fill_bytes(entropy)
        .map_err(|e| WalletError::Generation(format!("entropy source unavailable: {e}")))?;

    let mnemonic = Mnemonic::from_entropy_in(Language::English, entropy)
        .map_err(|e| WalletError::Generation(e.to_string()));
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}

/// Whether `phrase` is a valid English BIP-39 mnemonic (words and checksum).
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// 64-byte BIP-39 seed for `phrase` with an empty passphrase.
/// Caller must zeroize the result.
pub fn mnemonic_to_seed(phrase: &str) -> Result<Vec<u8>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::Derivation(format!("invalid mnemonic: {e}")))?;
    Ok(mnemonic.to_seed("").to_vec())
}

/// Validate a single word against the English word list.
pub fn is_valid_word(word: &str) -> bool {
    Language::English.find_word(word).is_some()
}
