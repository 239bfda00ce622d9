//! Balance lookup and fixed-interval polling.
//!
//! Each displayed wallet gets its own [`PollHandle`]: one query immediately,
//! then one per interval until the handle is stopped or dropped. A failed
//! query is reported and the next tick queries again; there is no backoff and
//! no retry within a tick.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chain_sol::{lamports_to_sol, RpcClient};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::WalletError;

/// One balance query result: lamports, or `None` when the node had no value.
pub type BalanceReading = Result<Option<u64>, WalletError>;

#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn balance(&self, public_key: &str) -> BalanceReading;
}

#[async_trait]
impl BalanceSource for RpcClient {
    async fn balance(&self, public_key: &str) -> BalanceReading {
        self.get_balance(public_key)
            .await
            .map_err(|e| WalletError::Balance(e.to_string()))
    }
}

/// What a wallet card shows for its balance.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceDisplay {
    /// No reading yet.
    Fetching,
    Available(u64),
    /// The node answered without a balance.
    Unavailable,
    /// The last query failed.
    Failed(String),
}

impl BalanceDisplay {
    pub fn from_reading(reading: &BalanceReading) -> Self {
        match reading {
            Ok(Some(lamports)) => BalanceDisplay::Available(*lamports),
            Ok(None) => BalanceDisplay::Unavailable,
            Err(e) => BalanceDisplay::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for BalanceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceDisplay::Fetching => f.write_str("Fetching..."),
            BalanceDisplay::Available(lamports) => write!(f, "{} SOL", lamports_to_sol(*lamports)),
            BalanceDisplay::Unavailable => f.write_str("unavailable"),
            BalanceDisplay::Failed(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Restartable poll configuration for one public key.
#[derive(Clone)]
pub struct BalancePoller {
    source: Arc<dyn BalanceSource>,
    public_key: String,
    interval: Duration,
}

impl BalancePoller {
    pub fn new(
        source: Arc<dyn BalanceSource>,
        public_key: impl Into<String>,
        interval: Duration,
    ) -> Result<Self, WalletError> {
        if interval.is_zero() {
            return Err(WalletError::Config("poll interval must be non-zero".into()));
        }
        Ok(Self {
            source,
            public_key: public_key.into(),
            interval,
        })
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Spawn a polling task on the current tokio runtime.
    pub fn start(&self) -> PollHandle {
        let (tx, rx) = mpsc::channel(8);
        let source = Arc::clone(&self.source);
        let public_key = self.public_key.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reading = source.balance(&public_key).await;
                match &reading {
                    Ok(value) => debug!(%public_key, ?value, "balance polled"),
                    Err(e) => warn!(%public_key, error = %e, "balance poll failed"),
                }
                if tx.send(reading).await.is_err() {
                    break;
                }
            }
        });

        PollHandle {
            readings: rx,
            task,
            latest: BalanceDisplay::Fetching,
        }
    }
}

/// A running poll. Stops when [`PollHandle::stop`] is called or on drop.
pub struct PollHandle {
    readings: mpsc::Receiver<BalanceReading>,
    task: JoinHandle<()>,
    latest: BalanceDisplay,
}

impl PollHandle {
    /// Wait for the next reading. `None` once the poll has stopped and all
    /// buffered readings were consumed.
    pub async fn next(&mut self) -> Option<BalanceReading> {
        let reading = self.readings.recv().await?;
        self.latest = BalanceDisplay::from_reading(&reading);
        Some(reading)
    }

    /// Display state as of the last reading taken with [`Self::next`].
    pub fn latest(&self) -> &BalanceDisplay {
        &self.latest
    }

    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_stopped(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Query once without polling.
pub async fn fetch_once(source: &dyn BalanceSource, public_key: &str) -> BalanceDisplay {
    BalanceDisplay::from_reading(&source.balance(public_key).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted readings, then repeats the last one.
    struct ScriptedSource {
        script: Mutex<Vec<BalanceReading>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(mut script: Vec<BalanceReading>) -> Arc<Self> {
            script.reverse();
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl BalanceSource for ScriptedSource {
        async fn balance(&self, _public_key: &str) -> BalanceReading {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop().unwrap()
            } else {
                match script.last() {
                    Some(Ok(v)) => Ok(*v),
                    _ => Err(WalletError::Balance("exhausted".into())),
                }
            }
        }
    }

    #[test]
    fn display_never_defaults_to_zero() {
        assert_eq!(BalanceDisplay::from_reading(&Ok(None)).to_string(), "unavailable");
        assert_eq!(BalanceDisplay::from_reading(&Ok(Some(0))).to_string(), "0 SOL");
        assert_eq!(
            BalanceDisplay::from_reading(&Ok(Some(1_500_000_000))).to_string(),
            "1.5 SOL"
        );
        assert_eq!(BalanceDisplay::Fetching.to_string(), "Fetching...");
        assert!(BalanceDisplay::from_reading(&Err(WalletError::Balance("timeout".into())))
            .to_string()
            .contains("timeout"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let source = ScriptedSource::new(vec![Ok(Some(1))]);
        assert!(BalancePoller::new(source, "pk", Duration::ZERO).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn first_reading_is_immediate() {
        let source = ScriptedSource::new(vec![Ok(Some(5))]);
        let poller = BalancePoller::new(source.clone(), "pk", Duration::from_secs(30)).unwrap();
        let mut handle = poller.start();

        let start = tokio::time::Instant::now();
        assert_eq!(handle.next().await.unwrap().unwrap(), Some(5));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(handle.latest(), &BalanceDisplay::Available(5));
    }

    #[tokio::test(start_paused = true)]
    async fn polls_on_fixed_interval() {
        let source = ScriptedSource::new(vec![Ok(Some(1)), Ok(Some(2)), Ok(Some(3))]);
        let poller = BalancePoller::new(source.clone(), "pk", Duration::from_secs(10)).unwrap();
        let mut handle = poller.start();

        let start = tokio::time::Instant::now();
        handle.next().await.unwrap().unwrap();
        handle.next().await.unwrap().unwrap();
        let third = handle.next().await.unwrap().unwrap();
        assert_eq!(third, Some(3));
        assert!(start.elapsed() >= Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_stop_polling() {
        let source = ScriptedSource::new(vec![
            Err(WalletError::Balance("503".into())),
            Ok(None),
            Ok(Some(7)),
        ]);
        let poller = BalancePoller::new(source.clone(), "pk", Duration::from_secs(1)).unwrap();
        let mut handle = poller.start();

        assert!(handle.next().await.unwrap().is_err());
        assert!(matches!(handle.latest(), BalanceDisplay::Failed(_)));
        assert_eq!(handle.next().await.unwrap().unwrap(), None);
        assert_eq!(handle.latest(), &BalanceDisplay::Unavailable);
        assert_eq!(handle.next().await.unwrap().unwrap(), Some(7));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_stream() {
        let source = ScriptedSource::new(vec![Ok(Some(1))]);
        let poller = BalancePoller::new(source.clone(), "pk", Duration::from_secs(1)).unwrap();
        let mut handle = poller.start();
        handle.next().await.unwrap().unwrap();

        handle.stop();
        // Drain anything buffered before the abort, then the stream ends.
        while handle.next().await.is_some() {}
        let calls = source.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
        assert!(handle.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_spawns_a_fresh_poll() {
        let source = ScriptedSource::new(vec![Ok(Some(4))]);
        let poller = BalancePoller::new(source.clone(), "pk", Duration::from_secs(60)).unwrap();

        let mut first = poller.start();
        first.next().await.unwrap().unwrap();
        drop(first);

        let mut second = poller.start();
        assert_eq!(second.latest(), &BalanceDisplay::Fetching);
        assert_eq!(second.next().await.unwrap().unwrap(), Some(4));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn wallets_poll_independently() {
        let fast = ScriptedSource::new(vec![Ok(Some(1))]);
        let slow = ScriptedSource::new(vec![Ok(Some(2))]);
        let mut a = BalancePoller::new(fast.clone(), "a", Duration::from_secs(1))
            .unwrap()
            .start();
        let b = BalancePoller::new(slow.clone(), "b", Duration::from_secs(100))
            .unwrap()
            .start();

        for _ in 0..5 {
            a.next().await.unwrap().unwrap();
        }
        assert_eq!(fast.calls.load(Ordering::SeqCst), 5);
        assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
        drop(b);
    }

    #[tokio::test]
    async fn fetch_once_maps_none_to_unavailable() {
        let source = ScriptedSource::new(vec![Ok(None)]);
        assert_eq!(fetch_once(source.as_ref(), "pk").await, BalanceDisplay::Unavailable);
    }
}
