//! The session's single mnemonic phrase.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use crate::error::WalletError;
use crate::mnemonic::{self, MnemonicLength};
use crate::storage::{KeyValueStore, SEED_PHRASE_KEY};

/// A mnemonic phrase. Only non-emptiness is guaranteed; whether the words
/// form a valid BIP-39 phrase is checked when keys are derived.
pub struct Seed(SecretString);

impl Seed {
    /// Wrap a candidate phrase, trimming surrounding whitespace.
    pub fn new(phrase: &str) -> Result<Self, WalletError> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(WalletError::missing("mnemonic"));
        }
        Ok(Self(SecretString::from(phrase.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Words in display order.
    pub fn words(&self) -> Vec<&str> {
        self.expose().split_whitespace().collect()
    }

    /// Whether the phrase passes the BIP-39 word list and checksum.
    pub fn is_valid_bip39(&self) -> bool {
        mnemonic::validate_mnemonic(self.expose())
    }
}

impl Clone for Seed {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.expose().to_owned()))
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seed([{} words])", self.words().len())
    }
}

/// Holds the active seed and mirrors it to the `seedPhrase` key.
pub struct SeedStore {
    store: Arc<dyn KeyValueStore>,
    current: Option<Seed>,
}

impl SeedStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Generate a fresh phrase. It is not persisted until [`Self::persist`].
    pub fn generate(&self, length: MnemonicLength) -> Result<Seed, WalletError> {
        let phrase = mnemonic::generate_mnemonic(length)?;
        Seed::new(&phrase)
    }

    /// Accept a user-entered phrase and persist it.
    pub fn set_manual(&mut self, phrase: &str) -> Result<Seed, WalletError> {
        let seed = Seed::new(phrase)?;
        self.persist(seed.clone())?;
        Ok(seed)
    }

    /// Read the persisted phrase. Absent on first run.
    pub fn load(&mut self) -> Result<Option<Seed>, WalletError> {
        self.current = match self.store.get(SEED_PHRASE_KEY)? {
            Some(phrase) if !phrase.trim().is_empty() => Some(Seed::new(&phrase)?),
            _ => None,
        };
        Ok(self.current.clone())
    }

    /// Overwrite the persisted phrase and make it active.
    pub fn persist(&mut self, seed: Seed) -> Result<(), WalletError> {
        self.store.set(SEED_PHRASE_KEY, seed.expose())?;
        self.current = Some(seed);
        Ok(())
    }

    pub fn current(&self) -> Option<&Seed> {
        self.current.as_ref()
    }

    /// Forget the phrase in memory and on disk.
    pub fn clear(&mut self) -> Result<(), WalletError> {
        self.store.delete(SEED_PHRASE_KEY)?;
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn load_on_first_run_is_absent() {
        let mut seeds = SeedStore::new(store());
        assert!(seeds.load().unwrap().is_none());
        assert!(seeds.current().is_none());
    }

    #[test]
    fn generate_does_not_persist() {
        let kv = store();
        let seeds = SeedStore::new(kv.clone());
        let seed = seeds.generate(MnemonicLength::Words12).unwrap();
        assert_eq!(seed.words().len(), 12);
        assert!(seed.is_valid_bip39());
        assert_eq!(kv.get(SEED_PHRASE_KEY).unwrap(), None);
    }

    #[test]
    fn persist_then_load_round_trips() {
        let kv = store();
        let mut seeds = SeedStore::new(kv.clone());
        let seed = seeds.generate(MnemonicLength::Words24).unwrap();
        let phrase = seed.expose().to_owned();
        seeds.persist(seed).unwrap();

        let mut fresh = SeedStore::new(kv);
        let loaded = fresh.load().unwrap().unwrap();
        assert_eq!(loaded.expose(), phrase);
    }

    #[test]
    fn persist_overwrites() {
        let kv = store();
        let mut seeds = SeedStore::new(kv.clone());
        seeds.set_manual("first phrase").unwrap();
        seeds.set_manual("second phrase").unwrap();
        assert_eq!(kv.get(SEED_PHRASE_KEY).unwrap().as_deref(), Some("second phrase"));
        assert_eq!(seeds.current().unwrap().expose(), "second phrase");
    }

    #[test]
    fn manual_entry_accepts_any_non_empty_text() {
        let mut seeds = SeedStore::new(store());
        let seed = seeds.set_manual("  not a bip39 phrase  ").unwrap();
        assert_eq!(seed.expose(), "not a bip39 phrase");
        assert!(!seed.is_valid_bip39());
    }

    #[test]
    fn manual_entry_rejects_blank() {
        let kv = store();
        let mut seeds = SeedStore::new(kv.clone());
        let err = seeds.set_manual("   ").unwrap_err();
        assert!(matches!(err, WalletError::Validation { field: "mnemonic" }));
        assert_eq!(kv.get(SEED_PHRASE_KEY).unwrap(), None);
    }

    #[test]
    fn clear_removes_phrase() {
        let kv = store();
        let mut seeds = SeedStore::new(kv.clone());
        seeds.set_manual("some words").unwrap();
        seeds.clear().unwrap();
        assert!(seeds.current().is_none());
        assert!(seeds.load().unwrap().is_none());
    }

    #[test]
    fn debug_does_not_leak_words() {
        let seed = Seed::new("alpha beta gamma").unwrap();
        let debug = format!("{seed:?}");
        assert_eq!(debug, "Seed([3 words])");
    }
}
