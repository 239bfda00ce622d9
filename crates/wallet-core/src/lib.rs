//! Wallet core: seed handling, deterministic Solana account derivation,
//! the persisted wallet registry, balance polling and transfer submission.
//!
//! Durable state lives behind [`storage::KeyValueStore`]; the front-end
//! picks the backing ([`storage::FileStore`] for the CLI, [`storage::MemoryStore`]
//! in tests).

pub mod balance;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod mnemonic;
pub mod notice;
pub mod registry;
pub mod routes;
pub mod seed_store;
pub mod session_bridge;
pub mod storage;
pub mod transfer;
pub mod types;

use std::sync::Arc;

pub use balance::{BalanceDisplay, BalancePoller, BalanceReading, BalanceSource, PollHandle};
pub use config::{Cluster, WalletConfig};
pub use error::{StorageError, WalletError};
pub use mnemonic::MnemonicLength;
pub use notice::{Notice, NoticeLevel};
pub use registry::WalletRegistry;
pub use routes::{Navigation, Route};
pub use seed_store::{Seed, SeedStore};
pub use session_bridge::SessionBridge;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use transfer::{RpcTransferSubmitter, TransferScreen, TransferSubmitter};
pub use types::Wallet;

// ─── Session ─────────────────────────────────────────────────────────

/// Everything one user session holds, loaded from a single store.
pub struct WalletSession {
    seeds: SeedStore,
    registry: WalletRegistry,
    bridge: SessionBridge,
}

impl WalletSession {
    /// Load the persisted seed and wallet list. Both may be absent.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, WalletError> {
        let mut seeds = SeedStore::new(Arc::clone(&store));
        seeds.load()?;
        let mut registry = WalletRegistry::new(Arc::clone(&store));
        registry.load()?;
        Ok(Self {
            seeds,
            registry,
            bridge: SessionBridge::new(store),
        })
    }

    /// The screen to land on: seed setup until a phrase exists.
    pub fn landing(&self) -> Route {
        if self.seeds.current().is_some() {
            Route::Wallets
        } else {
            Route::SeedSetup
        }
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seeds.current()
    }

    /// A fresh phrase for the setup screen. Not saved until [`Self::save_seed`].
    pub fn generate_seed(&self, length: MnemonicLength) -> Result<Seed, WalletError> {
        self.seeds.generate(length)
    }

    /// Save the phrase and move on to the wallet list.
    pub fn save_seed(&mut self, seed: Seed) -> Result<Navigation, WalletError> {
        self.seeds.persist(seed)?;
        Ok(Navigation::to(Route::Wallets))
    }

    pub fn import_seed(&mut self, phrase: &str) -> Result<Seed, WalletError> {
        self.seeds.set_manual(phrase)
    }

    pub fn add_wallet(&mut self, name: &str) -> Result<Wallet, WalletError> {
        self.registry.add_wallet(self.seeds.current(), name)
    }

    pub fn wallets(&self) -> &[Wallet] {
        self.registry.wallets()
    }

    pub fn registry(&self) -> &WalletRegistry {
        &self.registry
    }

    pub fn bridge(&self) -> &SessionBridge {
        &self.bridge
    }

    fn wallet_at(&self, index: usize) -> Result<&Wallet, WalletError> {
        self.registry
            .get(index)
            .ok_or_else(|| WalletError::missing("wallet"))
    }

    /// Navigate to the transfer screen with the wallet's key in memory.
    pub fn send_from(&self, index: usize) -> Result<Navigation, WalletError> {
        let wallet = self.wallet_at(index)?;
        Ok(Navigation::send_from(wallet.secret_key.clone()))
    }

    /// Put the wallet's key in the bridge slot, for front-ends that cannot
    /// carry it with the navigation.
    pub fn hand_off(&self, index: usize) -> Result<Navigation, WalletError> {
        let wallet = self.wallet_at(index)?;
        self.bridge.handoff(&wallet.secret_key)?;
        Ok(Navigation::to(Route::Send))
    }

    pub fn open_transfer(&self, navigation: &Navigation) -> Result<TransferScreen, WalletError> {
        TransferScreen::open(self.bridge.clone(), navigation.sender_key.clone())
    }

    /// Erase seed, wallets and counter, then return to seed setup.
    pub fn clear_all(&mut self) -> Result<Navigation, WalletError> {
        self.registry.clear_all()?;
        self.seeds.clear()?;
        Ok(Navigation::to(Route::SeedSetup))
    }
}
