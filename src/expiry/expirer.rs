use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, trace};
use crate::core::cache::Cache;
use crate::core::error::{Error, ErrorKind, Result};

enum Command {
    Schedule { key: String, deadline: Instant },
    Shutdown,
}

/// Background timer that removes keys from a cache once their delay passes.
///
/// The cache itself has no notion of expiry: when a deadline fires the
/// worker calls `Cache::remove`, which is a no-op if the key is already
/// gone. Whatever is stored under the key at that moment is removed.
pub struct Expirer {
    sender: Sender<Command>,
    handle: Option<JoinHandle<()>>,
    pending: Arc<AtomicUsize>,
}

impl Expirer {
    pub fn spawn(cache: Arc<Cache>) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let pending = Arc::new(AtomicUsize::new(0));
        let worker_pending = pending.clone();

        let handle = thread::Builder::new()
            .name("ftcache-expiry".to_string())
            .spawn(move || Self::run(cache, receiver, worker_pending))?;
        info!("expiry worker started");

        Ok(Expirer {
            sender,
            handle: Some(handle),
            pending,
        })
    }

    /// Removes `key` from the cache after `delay`.
    ///
    /// A delay too large to be represented as a deadline never fires, so
    /// nothing is queued for it.
    pub fn schedule(&self, key: impl Into<String>, delay: Duration) -> Result<()> {
        let key = key.into();
        let Some(deadline) = Instant::now().checked_add(delay) else {
            debug!(key = %key, ?delay, "delay out of range, key never expires");
            return Ok(());
        };
        let command = Command::Schedule { key, deadline };
        self.pending.fetch_add(1, Ordering::Relaxed);
        self.sender.send(command).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::Relaxed);
            Error::new(ErrorKind::InvalidState, "expiry worker has stopped".to_string())
        })
    }

    /// Scheduled removals that have not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    /// Stops the worker, dropping removals that have not fired.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(Command::Shutdown);
            let _ = handle.join();
        }
    }

    fn run(cache: Arc<Cache>, receiver: Receiver<Command>, pending: Arc<AtomicUsize>) {
        let mut deadlines: BinaryHeap<Reverse<(Instant, String)>> = BinaryHeap::new();

        loop {
            let now = Instant::now();
            while deadlines.peek().is_some_and(|Reverse((deadline, _))| *deadline <= now) {
                if let Some(Reverse((_, key))) = deadlines.pop() {
                    let removed = cache.remove(&key).is_some();
                    pending.fetch_sub(1, Ordering::Relaxed);
                    trace!(key = %key, removed, "expired");
                }
            }

            let command = match deadlines.peek() {
                Some(Reverse((deadline, _))) => {
                    receiver.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match command {
                Ok(Command::Schedule { key, deadline }) => deadlines.push(Reverse((deadline, key))),
                Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        info!(dropped = deadlines.len(), "expiry worker stopped");
    }
}

impl Drop for Expirer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wait_until(mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_scheduled_key_is_removed() {
        let cache = Arc::new(Cache::new());
        cache.set("session", "token", true).unwrap();
        cache.set("keep", 1, false).unwrap();

        let expirer = Expirer::spawn(cache.clone()).unwrap();
        expirer.schedule("session", Duration::from_millis(20)).unwrap();

        assert!(wait_until(|| !cache.exists("session")));
        assert!(cache.exists("keep"));
        assert!(wait_until(|| expirer.pending() == 0));
    }

    #[test]
    fn test_expiring_absent_key_is_noop() {
        let cache = Arc::new(Cache::new());
        cache.set("a", 1, false).unwrap();

        let expirer = Expirer::spawn(cache.clone()).unwrap();
        expirer.schedule("a", Duration::from_millis(10)).unwrap();
        cache.remove("a");
        expirer.schedule("never-set", Duration::ZERO).unwrap();

        assert!(wait_until(|| expirer.pending() == 0));
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_shutdown_drops_pending() {
        let cache = Arc::new(Cache::new());
        cache.set("a", 1, false).unwrap();

        let expirer = Expirer::spawn(cache.clone()).unwrap();
        expirer.schedule("a", Duration::from_secs(3600)).unwrap();
        expirer.shutdown();

        assert!(cache.exists("a"));
    }

    #[test]
    fn test_earlier_deadline_fires_first() {
        let cache = Arc::new(Cache::new());
        cache.set("late", 1, false).unwrap();
        cache.set("early", 2, false).unwrap();

        let expirer = Expirer::spawn(cache.clone()).unwrap();
        expirer.schedule("late", Duration::from_secs(3600)).unwrap();
        expirer.schedule("early", Duration::from_millis(10)).unwrap();

        assert!(wait_until(|| !cache.exists("early")));
        assert!(wait_until(|| expirer.pending() == 1));
        assert!(cache.exists("late"));
    }

    #[test]
    fn test_unrepresentable_delay_never_fires() {
        let cache = Arc::new(Cache::new());
        cache.set("forever", 1, false).unwrap();
        cache.set("soon", 2, false).unwrap();

        let expirer = Expirer::spawn(cache.clone()).unwrap();
        expirer.schedule("forever", Duration::MAX).unwrap();
        assert_eq!(expirer.pending(), 0);

        // the worker keeps running after the out-of-range request
        expirer.schedule("soon", Duration::from_millis(10)).unwrap();
        assert!(wait_until(|| !cache.exists("soon")));
        assert!(wait_until(|| expirer.pending() == 0));
        assert!(cache.exists("forever"));
    }
}
