//! Cross-crate integration tests exercising the full pipeline:
//! seed -> derive wallets -> persist -> reload -> hand off -> transfer.
//!
//! Network-facing pieces are replaced with in-process fakes; everything
//! else runs against a real `FileStore` in a temp directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chain_sol::{sign_transfer, SolKeypair};
use wallet_core::storage::{SEED_PHRASE_KEY, SEND_KEY_SLOT, WALLETS_KEY, WALLET_COUNT_KEY};
use wallet_core::*;

const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const FIXTURE_ADDRESS: &str = "HAgk14JpMQLgt6rVgv7cBQFJWFto5Dqxi472uT3DKpqk";

fn file_store(dir: &tempfile::TempDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir.path().join("wallet.json")).unwrap())
}

struct RecordingSubmitter {
    calls: AtomicUsize,
    reject: bool,
}

#[async_trait]
impl TransferSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        secret_key: &str,
        destination: &str,
        amount_sol: f64,
    ) -> Result<String, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject {
            return Err(WalletError::Submission("simulated network failure".into()));
        }
        // Build a real signed transfer so the key and amount are exercised.
        let sender = SolKeypair::from_base58_secret(secret_key).unwrap();
        let to = chain_sol::address_to_bytes(destination).unwrap();
        let lamports = chain_sol::sol_to_lamports(amount_sol).unwrap();
        let signed = sign_transfer(&sender, &to, lamports, &[9u8; 32]).unwrap();
        Ok(signed.signature_b58())
    }
}

// ─── Seed -> wallets -> disk -> reload ─────────────────────────────

#[test]
fn fixture_wallet_survives_reload_from_disk() {
    let dir = tempfile::tempdir().unwrap();

    let mut session = WalletSession::open(file_store(&dir)).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    let a = session.add_wallet("A").unwrap();
    assert_eq!(a.public_key, FIXTURE_ADDRESS);

    // A fresh process sees the same data.
    let reopened = WalletSession::open(file_store(&dir)).unwrap();
    assert_eq!(reopened.wallets(), &[a]);
    assert_eq!(reopened.registry().next_index(), 1);
    assert_eq!(reopened.landing(), Route::Wallets);
}

#[test]
fn on_disk_layout_uses_reserved_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WalletSession::open(file_store(&dir)).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    session.add_wallet("A").unwrap();

    let raw = std::fs::read_to_string(dir.path().join("wallet.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc[SEED_PHRASE_KEY], TEST_MNEMONIC);
    assert_eq!(doc[WALLET_COUNT_KEY], "1");

    let wallets: serde_json::Value =
        serde_json::from_str(doc[WALLETS_KEY].as_str().unwrap()).unwrap();
    assert_eq!(wallets[0]["name"], "A");
    assert_eq!(wallets[0]["publicKey"], FIXTURE_ADDRESS);
    assert!(wallets[0]["secretKey"].is_string());
}

#[test]
fn generated_seed_yields_distinct_wallets() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WalletSession::open(file_store(&dir)).unwrap();
    let seed = session.generate_seed(MnemonicLength::Words24).unwrap();
    assert_eq!(seed.words().len(), 24);
    session.save_seed(seed).unwrap();

    for i in 0..4 {
        session.add_wallet(&format!("w{i}")).unwrap();
    }
    let keys: std::collections::HashSet<_> =
        session.wallets().iter().map(|w| w.public_key.as_str()).collect();
    assert_eq!(keys.len(), 4);
    assert_eq!(session.registry().next_index(), 4);
}

#[test]
fn interrupted_add_is_reconciled_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let kv = file_store(&dir);
    let mut session = WalletSession::open(kv.clone()).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    session.add_wallet("A").unwrap();
    session.add_wallet("B").unwrap();

    // Counter written ahead of the list, as after a crash mid-add.
    kv.set(WALLET_COUNT_KEY, "3").unwrap();

    let mut reopened = WalletSession::open(file_store(&dir)).unwrap();
    assert_eq!(reopened.registry().next_index(), 2);
    let c = reopened.add_wallet("C").unwrap();
    assert_eq!(reopened.registry().next_index(), 3);
    assert_eq!(reopened.wallets()[2], c);
}

#[test]
fn clear_all_then_reload_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WalletSession::open(file_store(&dir)).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    session.add_wallet("A").unwrap();
    session.clear_all().unwrap();

    let reopened = WalletSession::open(file_store(&dir)).unwrap();
    assert!(reopened.seed().is_none());
    assert!(reopened.wallets().is_empty());
    assert_eq!(reopened.landing(), Route::SeedSetup);
}

// ─── Hand off -> transfer ──────────────────────────────────────────

#[tokio::test]
async fn bridge_handoff_then_successful_transfer() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WalletSession::open(file_store(&dir)).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    session.add_wallet("A").unwrap();
    let b = session.add_wallet("B").unwrap();

    // Separate invocation: list screen writes the slot, transfer screen reads it.
    session.hand_off(0).unwrap();
    let listing = WalletSession::open(file_store(&dir)).unwrap();
    let screen = listing.open_transfer(&Navigation::to(Route::Send)).unwrap();
    assert!(screen.sender_key().is_some());
    assert_eq!(file_store(&dir).get(SEND_KEY_SLOT).unwrap(), None);

    let submitter = RecordingSubmitter { calls: AtomicUsize::new(0), reject: false };
    let signature = screen.submit(&submitter, &b.public_key, 0.25).await.unwrap();
    assert!(!signature.is_empty());
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

    let notice = Notice::transfer_succeeded(&signature);
    assert_eq!(notice.level, NoticeLevel::Success);
}

#[tokio::test]
async fn rejected_transfer_changes_no_state() {
    let dir = tempfile::tempdir().unwrap();
    let kv = file_store(&dir);
    let mut session = WalletSession::open(kv.clone()).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    let a = session.add_wallet("A").unwrap();
    session.hand_off(0).unwrap();

    let nav = session.send_from(0).unwrap();
    let screen = session.open_transfer(&nav).unwrap();
    let before_wallets = kv.get(WALLETS_KEY).unwrap();

    let submitter = RecordingSubmitter { calls: AtomicUsize::new(0), reject: true };
    let err = screen.submit(&submitter, FIXTURE_ADDRESS, 1.0).await.unwrap_err();
    assert_eq!(Notice::from(&err).title, "Transaction failed");
    assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

    assert_eq!(kv.get(SEND_KEY_SLOT).unwrap().as_deref(), Some(a.secret_key.as_str()));
    assert_eq!(kv.get(WALLETS_KEY).unwrap(), before_wallets);
    assert_eq!(session.registry().next_index(), 1);
}

// ─── Balance polling ───────────────────────────────────────────────

struct FixedBalance(Option<u64>);

#[async_trait]
impl BalanceSource for FixedBalance {
    async fn balance(&self, _public_key: &str) -> BalanceReading {
        Ok(self.0)
    }
}

#[tokio::test(start_paused = true)]
async fn each_wallet_polls_its_own_balance() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = WalletSession::open(file_store(&dir)).unwrap();
    session.import_seed(TEST_MNEMONIC).unwrap();
    session.add_wallet("funded").unwrap();
    session.add_wallet("unknown").unwrap();

    let interval = Duration::from_secs(15);
    let wallets = session.wallets();
    let funded = BalancePoller::new(
        Arc::new(FixedBalance(Some(2_000_000_000))),
        wallets[0].public_key.as_str(),
        interval,
    )
    .unwrap();
    let unknown =
        BalancePoller::new(Arc::new(FixedBalance(None)), wallets[1].public_key.as_str(), interval)
            .unwrap();

    let mut a = funded.start();
    let mut b = unknown.start();
    assert_eq!(a.latest().to_string(), "Fetching...");

    a.next().await.unwrap().unwrap();
    b.next().await.unwrap().unwrap();
    assert_eq!(a.latest().to_string(), "2 SOL");
    assert_eq!(b.latest().to_string(), "unavailable");

    a.stop();
    b.stop();
}
