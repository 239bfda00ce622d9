use serde::{Deserialize, Serialize};

/// A derived wallet as persisted under the `wallets` key.
///
/// Never mutated after creation. Field names are camelCase on disk.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub name: String,
    /// Base58 address.
    pub public_key: String,
    /// Base58 64-byte `seed || public_key`.
    pub secret_key: String,
}

impl Wallet {
    /// The secret key with everything masked, for list displays.
    pub fn masked_secret(&self) -> &'static str {
        "***"
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("public_key", &self.public_key)
            .field("secret_key", &self.masked_secret())
            .finish()
    }
}
