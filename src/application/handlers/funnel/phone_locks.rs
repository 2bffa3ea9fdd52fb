//! Per-phone serialization of inbound turns.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

/// Hands out one async lock per phone number so that two messages from the
/// same lead never run the funnel concurrently. Different numbers proceed in
/// parallel.
#[derive(Debug, Default)]
pub struct PhoneLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

/// Holds the lock for one phone number until dropped.
pub struct PhoneGuard<'a> {
    owner: &'a PhoneLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl PhoneLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn for `phone_number` is in flight.
    pub async fn acquire(&self, phone_number: &str) -> PhoneGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            locks
                .entry(phone_number.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };

        let guard = lock.lock_owned().await;
        PhoneGuard {
            owner: self,
            key: phone_number.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of phone numbers currently holding or waiting on a lock.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl Drop for PhoneGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Forget the entry once nobody else holds or awaits it
        let mut locks = self
            .owner
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(lock) = locks.get(&self.key) {
            if Arc::strong_count(lock) == 1 {
                locks.remove(&self.key);
            }
        }
    }
}
