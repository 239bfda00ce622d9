//! Solana addresses.
//!
//! An address is the Base58 encoding of a raw 32-byte Ed25519 public key,
//! with no hashing or checksum. Destination addresses typed by the user are
//! checked here before any transaction is built.

use crate::error::SolError;

/// Decode a Solana address string to its 32-byte public key.
///
/// Surrounding whitespace is ignored, since addresses are usually pasted.
pub fn address_to_bytes(address: &str) -> Result<[u8; 32], SolError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(SolError::InvalidAddress("address is empty".into()));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Encode a 32-byte public key as a Solana address.
pub fn bytes_to_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Check that `address` decodes to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<(), SolError> {
    address_to_bytes(address).map(|_| ())
}
