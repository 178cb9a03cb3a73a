//! Per-link mutual exclusion
//!
//! Scheduled and on-demand checks for the same link must not overlap, or two
//! results could race their status writes. Checks for different links never
//! wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one permit per link ID at a time
#[derive(Debug, Default)]
pub struct LinkGate {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one check; releases the link on drop
#[derive(Debug)]
pub struct LinkPermit {
    _guard: OwnedMutexGuard<()>,
}

impl LinkGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other check holds `link_id`, then claims it
    pub async fn acquire(&self, link_id: i64) -> LinkPermit {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the map still references are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(link_id).or_default().clone()
        };

        LinkPermit {
            _guard: lock.lock_owned().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_link_is_serialized() {
        let gate = Arc::new(LinkGate::new());
        let permit = gate.acquire(7).await;

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move {
                let _permit = gate.acquire(7).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(permit);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_links_do_not_block() {
        let gate = LinkGate::new();
        let _first = gate.acquire(1).await;

        let second = tokio::time::timeout(Duration::from_millis(100), gate.acquire(2)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_idle_entries_are_pruned() {
        let gate = LinkGate::new();
        {
            let _a = gate.acquire(1).await;
            let _b = gate.acquire(2).await;
            assert_eq!(gate.locks.lock().unwrap().len(), 2);
        }

        let _c = gate.acquire(3).await;
        assert_eq!(gate.locks.lock().unwrap().len(), 1);
    }
}
