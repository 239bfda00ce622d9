//! Single-slot handoff of a secret key from the wallet list to the transfer
//! screen, for front-ends that cannot pass it along with navigation.

use std::sync::Arc;

use crate::error::WalletError;
use crate::storage::{KeyValueStore, SEND_KEY_SLOT};

#[derive(Clone)]
pub struct SessionBridge {
    store: Arc<dyn KeyValueStore>,
}

impl SessionBridge {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrite the slot. Last write wins.
    pub fn handoff(&self, secret_key: &str) -> Result<(), WalletError> {
        self.store.set(SEND_KEY_SLOT, secret_key)?;
        Ok(())
    }

    /// Read the slot and clear it. A second call returns `None`.
    pub fn take_and_clear(&self) -> Result<Option<String>, WalletError> {
        let value = self.store.get(SEND_KEY_SLOT)?;
        if value.is_some() {
            self.store.delete(SEND_KEY_SLOT)?;
        }
        Ok(value.filter(|v| !v.is_empty()))
    }

    /// Read the slot without consuming it.
    pub fn peek(&self) -> Result<Option<String>, WalletError> {
        Ok(self.store.get(SEND_KEY_SLOT)?.filter(|v| !v.is_empty()))
    }

    pub fn is_pending(&self) -> Result<bool, WalletError> {
        Ok(self.peek()?.is_some())
    }

    pub fn clear(&self) -> Result<(), WalletError> {
        self.store.delete(SEND_KEY_SLOT)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn bridge() -> SessionBridge {
        SessionBridge::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn take_returns_value_once() {
        let bridge = bridge();
        bridge.handoff("key-1").unwrap();
        assert_eq!(bridge.take_and_clear().unwrap().as_deref(), Some("key-1"));
        assert_eq!(bridge.take_and_clear().unwrap(), None);
    }

    #[test]
    fn last_write_wins() {
        let bridge = bridge();
        bridge.handoff("key-1").unwrap();
        bridge.handoff("key-2").unwrap();
        assert_eq!(bridge.take_and_clear().unwrap().as_deref(), Some("key-2"));
    }

    #[test]
    fn empty_slot_reads_absent() {
        let bridge = bridge();
        assert_eq!(bridge.take_and_clear().unwrap(), None);
        assert!(!bridge.is_pending().unwrap());
    }

    #[test]
    fn pending_does_not_consume() {
        let bridge = bridge();
        bridge.handoff("key").unwrap();
        assert!(bridge.is_pending().unwrap());
        assert_eq!(bridge.peek().unwrap().as_deref(), Some("key"));
        assert!(bridge.is_pending().unwrap());
        bridge.clear().unwrap();
        assert!(!bridge.is_pending().unwrap());
    }

    #[test]
    fn slot_is_shared_through_the_store() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        SessionBridge::new(kv.clone()).handoff("key").unwrap();
        assert_eq!(
            SessionBridge::new(kv).take_and_clear().unwrap().as_deref(),
            Some("key")
        );
    }
}
