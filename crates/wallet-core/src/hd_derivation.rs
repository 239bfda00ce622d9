use chain_sol::SolKeypair;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroize;

use crate::error::WalletError;

type HmacSha512 = Hmac<Sha512>;

/// BIP-44 purpose and Solana coin type. Every wallet shares this prefix.
const ACCOUNT_PREFIX: &str = "m/44'/501'";

/// Solana path for the wallet at `index`: `m/44'/501'/{index}'/0'`.
///
/// Ed25519 under SLIP-0010 only supports hardened children, so every level is
/// hardened and the index is the only varying component.
pub fn derivation_path(index: u32) -> String {
    format!("{ACCOUNT_PREFIX}/{index}'/0'")
}

/// Derive the Solana keypair at `index` from a 64-byte BIP-39 seed.
pub fn derive_keypair(seed: &[u8], index: u32) -> Result<DerivedKeypair, WalletError> {
    let path = derivation_path(index);
    let mut key = derive_ed25519_seed(seed, &path)?;
    let keypair = SolKeypair::from_seed(&key);
    key.zeroize();

    Ok(DerivedKeypair {
        keypair,
        derivation_path: path,
    })
}

/// SLIP-0010 Ed25519 private key for `path`.
fn derive_ed25519_seed(seed: &[u8], path: &str) -> Result<[u8; 32], WalletError> {
    if seed.len() < 16 || seed.len() > 64 {
        return Err(WalletError::Derivation(format!(
            "seed must be 16..=64 bytes, got {}",
            seed.len()
        )));
    }

    // Master key: HMAC-SHA512(key = "ed25519 seed", data = seed)
    let mut mac = HmacSha512::new_from_slice(b"ed25519 seed")
        .map_err(|e| WalletError::Derivation(e.to_string()))?;
    mac.update(seed);
    let mut result = mac.finalize().into_bytes();

    let mut key = [0u8; 32];
    let mut chain_code = [0u8; 32];
    key.copy_from_slice(&result[..32]);
    chain_code.copy_from_slice(&result[32..]);
    result.as_mut_slice().zeroize();

    for child_index in parse_derivation_path(path)? {
        let mut mac = HmacSha512::new_from_slice(&chain_code)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;
        // Hardened child: 0x00 || key || ser32(index | 2^31)
        mac.update(&[0x00]);
        mac.update(&key);
        mac.update(&(child_index | 0x8000_0000).to_be_bytes());
        let mut result = mac.finalize().into_bytes();

        key.copy_from_slice(&result[..32]);
        chain_code.copy_from_slice(&result[32..]);
        result.as_mut_slice().zeroize();
    }

    chain_code.zeroize();
    Ok(key)
}

/// Parse "m/44'/501'/0'/0'" into [44, 501, 0, 0]. Every component must be
/// hardened.
fn parse_derivation_path(path: &str) -> Result<Vec<u32>, WalletError> {
    let rest = path
        .strip_prefix("m/")
        .ok_or_else(|| WalletError::Derivation("path must start with m/".into()))?;

    rest.split('/')
        .map(|component| {
            let num = component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
                .ok_or_else(|| {
                    WalletError::Derivation(format!(
                        "ed25519 path component `{component}` must be hardened"
                    ))
                })?;
            let value = num.parse::<u32>().map_err(|e| {
                WalletError::Derivation(format!("invalid path component `{component}`: {e}"))
            })?;
            if value >= 0x8000_0000 {
                return Err(WalletError::Derivation(format!(
                    "path component `{component}` out of range"
                )));
            }
            Ok(value)
        })
        .collect()
}

/// A derived keypair and the path that produced it.
#[derive(Debug)]
pub struct DerivedKeypair {
    pub keypair: SolKeypair,
    pub derivation_path: String,
}
