//! Session-scoped mutual exclusion: requests for one session id run one at a time,
//! requests for different ids never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard};

type GateMap = Arc<StdMutex<HashMap<String, Arc<SessionGateEntry>>>>;

#[derive(Clone, Default)]
pub struct SessionGate {
    inner: GateMap,
}

#[derive(Default)]
struct SessionGateEntry {
    lock: Arc<Mutex<()>>,
    permits: AtomicUsize,
}

/// Held for the duration of one turn; releasing it admits the next waiter.
pub struct SessionGuard {
    _lock_guard: OwnedMutexGuard<()>,
    _permit: SessionPermit,
}

struct SessionPermit {
    session_id: String,
    inner: GateMap,
    entry: Arc<SessionGateEntry>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session_id: &str) -> SessionGuard {
        let entry = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let entry = map
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(SessionGateEntry::default()))
                .clone();
            // Counted while the map lock is held so a concurrent drop cannot remove the entry.
            entry.permits.fetch_add(1, Ordering::AcqRel);
            entry
        };
        let permit = SessionPermit {
            session_id: session_id.to_string(),
            inner: Arc::clone(&self.inner),
            entry: Arc::clone(&entry),
        };
        let lock_guard = entry.lock.clone().lock_owned().await;
        SessionGuard {
            _lock_guard: lock_guard,
            _permit: permit,
        }
    }

    /// Session ids with at least one holder or waiter.
    pub fn active_sessions(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        let mut map = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let previous = self.entry.permits.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "session gate permit underflow");
        if previous != 1 {
            return;
        }
        let is_current = map
            .get(&self.session_id)
            .is_some_and(|current| Arc::ptr_eq(current, &self.entry));
        if is_current {
            map.remove(&self.session_id);
        }
    }
}
