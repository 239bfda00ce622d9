//! Solana keypairs and their Base58 secret-key encoding.
//!
//! Solana tooling stores a keypair as 64 bytes: the 32-byte Ed25519 seed
//! followed by the 32-byte public key. That 64-byte blob, Base58 encoded, is
//! what the wallet list persists and what the transfer screen accepts.

use ed25519_dalek::{Signer, SigningKey};
use zeroize::Zeroize;

use crate::address::bytes_to_address;
use crate::error::SolError;

/// An Ed25519 keypair. The seed is zeroized on drop.
pub struct SolKeypair {
    seed: [u8; 32],
    public_key: [u8; 32],
}

impl SolKeypair {
    /// Build a keypair from a 32-byte Ed25519 seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self {
            seed: *seed,
            public_key: signing_key.verifying_key().to_bytes(),
        }
    }

    /// Parse a Base58 secret key.
    ///
    /// Accepts the 64-byte `seed || public_key` form (the embedded public key
    /// must match the one derived from the seed) or a bare 32-byte seed.
    pub fn from_base58_secret(secret: &str) -> Result<Self, SolError> {
        let mut bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| SolError::InvalidPrivateKey(format!("base58 decode failed: {e}")))?;

        let result = match bytes.len() {
            64 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes[..32]);
                let keypair = Self::from_seed(&seed);
                seed.zeroize();
                if keypair.public_key[..] != bytes[32..] {
                    Err(SolError::InvalidPrivateKey(
                        "embedded public key does not match secret seed".into(),
                    ))
                } else {
                    Ok(keypair)
                }
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                let keypair = Self::from_seed(&seed);
                seed.zeroize();
                Ok(keypair)
            }
            n => Err(SolError::InvalidPrivateKey(format!(
                "expected 64 or 32 bytes, got {n}"
            ))),
        };

        bytes.zeroize();
        result
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    /// Base58 address of the public key.
    pub fn address(&self) -> String {
        bytes_to_address(&self.public_key)
    }

    /// The 64-byte `seed || public_key` secret key, Base58 encoded.
    pub fn to_base58_secret(&self) -> String {
        let mut full = [0u8; 64];
        full[..32].copy_from_slice(&self.seed);
        full[32..].copy_from_slice(&self.public_key);
        let encoded = bs58::encode(&full).into_string();
        full.zeroize();
        encoded
    }

    /// Sign arbitrary bytes, returning the 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        SigningKey::from_bytes(&self.seed).sign(message).to_bytes()
    }
}

impl Drop for SolKeypair {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

impl std::fmt::Debug for SolKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
