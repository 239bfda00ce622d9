//! Ordered list of derived wallets and the next derivation index.
//!
//! Insertion order is creation order is derivation-index order, so after any
//! successful add `next_index == wallets.len()`. The list and the counter are
//! two separate store writes; [`WalletRegistry::load`] repairs a counter that
//! drifted from the list by trusting the list, and only starts from stored
//! state when both halves are present.

use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroize;

use crate::error::{StorageError, WalletError};
use crate::hd_derivation;
use crate::mnemonic;
use crate::seed_store::Seed;
use crate::storage::{KeyValueStore, SEED_PHRASE_KEY, WALLETS_KEY, WALLET_COUNT_KEY};
use crate::types::Wallet;

pub struct WalletRegistry {
    store: Arc<dyn KeyValueStore>,
    wallets: Vec<Wallet>,
    next_index: u32,
}

impl WalletRegistry {
    /// An empty registry backed by `store`. Call [`Self::load`] to restore
    /// a previous session.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            wallets: Vec::new(),
            next_index: 0,
        }
    }

    /// Reload the list and counter from the store.
    ///
    /// The registry is restored only when both the list and the counter are
    /// stored; if either is absent it starts empty at index 0. With both
    /// present, a counter that is unparsable or disagrees with the list
    /// length is replaced by the list length.
    pub fn load(&mut self) -> Result<(), WalletError> {
        let stored_list = self.store.get(WALLETS_KEY)?;
        let stored_count = self.store.get(WALLET_COUNT_KEY)?;

        let (json, count) = match (stored_list, stored_count) {
            (Some(json), Some(count)) => (json, count),
            (list, count) => {
                if list.is_some() || count.is_some() {
                    warn!(
                        has_list = list.is_some(),
                        has_counter = count.is_some(),
                        "incomplete wallet state in store; starting empty"
                    );
                }
                self.wallets = Vec::new();
                self.next_index = 0;
                return Ok(());
            }
        };

        let wallets: Vec<Wallet> =
            serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
                key: WALLETS_KEY.into(),
                reason: e.to_string(),
            })?;
        let len = wallets.len() as u32;
        match count.trim().parse::<u32>() {
            Ok(count) if count == len => {}
            other => warn!(
                stored = ?other.ok(),
                wallets = len,
                "wallet counter out of step with wallet list; using list length"
            ),
        }

        self.wallets = wallets;
        self.next_index = len;
        Ok(())
    }

    /// Derive the wallet at the next index, append it and persist.
    ///
    /// `seed` is checked before `name`. On any failure nothing is appended
    /// and the counter does not move.
    pub fn add_wallet(&mut self, seed: Option<&Seed>, name: &str) -> Result<Wallet, WalletError> {
        let seed = seed.ok_or_else(|| WalletError::missing("mnemonic"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(WalletError::missing("name"));
        }

        let index = self.next_index;
        let mut seed_bytes = mnemonic::mnemonic_to_seed(seed.expose())?;
        let derived = hd_derivation::derive_keypair(&seed_bytes, index);
        seed_bytes.zeroize();
        let derived = derived?;

        let wallet = Wallet {
            name: name.to_owned(),
            public_key: derived.keypair.address(),
            secret_key: derived.keypair.to_base58_secret(),
        };

        let mut updated = self.wallets.clone();
        updated.push(wallet.clone());
        let next = index
            .checked_add(1)
            .ok_or_else(|| WalletError::Derivation("derivation index exhausted".into()))?;
        self.persist(&updated, next)?;

        self.wallets = updated;
        self.next_index = next;
        info!(
            index,
            path = %derived.derivation_path,
            public_key = %wallet.public_key,
            "wallet added"
        );
        Ok(wallet)
    }

    fn persist(&self, wallets: &[Wallet], next_index: u32) -> Result<(), WalletError> {
        let json = serde_json::to_string(wallets)
            .map_err(|e| StorageError::Io(format!("serialize wallets: {e}")))?;
        self.store.set(WALLETS_KEY, &json)?;
        self.store.set(WALLET_COUNT_KEY, &next_index.to_string())?;
        Ok(())
    }

    /// Erase the seed, the wallet list and the counter, in memory and on disk.
    pub fn clear_all(&mut self) -> Result<(), WalletError> {
        self.store.delete(SEED_PHRASE_KEY)?;
        self.store.delete(WALLETS_KEY)?;
        self.store.delete(WALLET_COUNT_KEY)?;
        self.wallets.clear();
        self.next_index = 0;
        info!("session data cleared");
        Ok(())
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    pub fn get(&self, index: usize) -> Option<&Wallet> {
        self.wallets.get(index)
    }

    /// First wallet with this name. Names are not unique.
    pub fn find_by_name(&self, name: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.name == name.trim())
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}
