//! In-memory session store: session_id → conversation, expiring after an idle TTL.
//!
//! Expiry is checked lazily on every lookup; the optional background sweeper only
//! reclaims memory for sessions nobody asks for again.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::observability::SessionEvent;

use super::state::Session;

struct SessionEntry {
    session: Session,
    expires_at: Instant,
}

#[derive(Default)]
struct StoreCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    created: AtomicU64,
    expired: AtomicU64,
    resets: AtomicU64,
}

/// Point-in-time store statistics for the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStoreStats {
    pub active_count: usize,
    pub hits: u64,
    pub misses: u64,
    pub created: u64,
    pub expired: u64,
    pub resets: u64,
}

/// Cloneable handle over one shared session map.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionEntry>>>,
    counters: Arc<StoreCounters>,
    ttl: Duration,
    system_prompt: Arc<str>,
}

/// Background eviction task; aborted on drop.
pub struct SweeperHandle {
    handle: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(
                event = SessionEvent::SessionSweeperStopped.as_str(),
                "session sweeper stopped"
            );
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fresh identifier: random v4 uuid plus wall-clock millis.
pub fn new_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or_default();
    format!("session_{}_{millis}", uuid::Uuid::new_v4().simple())
}

impl SessionStore {
    pub fn new(ttl: Duration, system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(StoreCounters::default()),
            ttl,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resume a live session (renewing its TTL) or start a new one.
    ///
    /// An absent, unknown or expired id yields a freshly generated id whose
    /// transcript holds only the system message.
    pub async fn get_or_create(&self, requested: Option<&str>) -> (String, Session) {
        let now = Instant::now();
        let mut map = self.inner.write().await;

        if let Some(session_id) = requested {
            let expired = match map.get_mut(session_id) {
                Some(entry) if entry.expires_at > now => {
                    entry.expires_at = now + self.ttl;
                    entry.session.last_activity = Utc::now();
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        event = SessionEvent::SessionResumed.as_str(),
                        session_id,
                        messages = entry.session.messages.len(),
                        "session resumed"
                    );
                    return (session_id.to_string(), entry.session.clone());
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                map.remove(session_id);
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
                tracing::info!(
                    event = SessionEvent::SessionExpired.as_str(),
                    session_id,
                    "session expired on lookup"
                );
            }
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
        }

        let mut session_id = new_session_id();
        while map.contains_key(&session_id) {
            session_id = new_session_id();
        }
        let session = Session::new(session_id.clone(), &self.system_prompt);
        map.insert(
            session_id.clone(),
            SessionEntry {
                session: session.clone(),
                expires_at: now + self.ttl,
            },
        );
        self.counters.created.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            event = SessionEvent::SessionCreated.as_str(),
            session_id = %session_id,
            requested = requested.is_some(),
            "session created"
        );
        (session_id, session)
    }

    /// Write back a session after a turn and re-arm its expiry.
    pub async fn touch_and_save(&self, session_id: &str, mut session: Session) {
        session.last_activity = Utc::now();
        let messages = session.messages.len();
        let mut map = self.inner.write().await;
        map.insert(
            session_id.to_string(),
            SessionEntry {
                session,
                expires_at: Instant::now() + self.ttl,
            },
        );
        tracing::debug!(
            event = SessionEvent::SessionSaved.as_str(),
            session_id,
            messages,
            "session saved"
        );
    }

    /// Drop a session explicitly. Returns whether it existed.
    pub async fn reset(&self, session_id: &str) -> bool {
        let removed = self.inner.write().await.remove(session_id).is_some();
        if removed {
            self.counters.resets.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                event = SessionEvent::SessionReset.as_str(),
                session_id,
                "session reset"
            );
        }
        removed
    }

    /// Whether a live (unexpired) session exists; does not renew it.
    pub async fn contains(&self, session_id: &str) -> bool {
        let now = Instant::now();
        self.inner
            .read()
            .await
            .get(session_id)
            .is_some_and(|entry| entry.expires_at > now)
    }

    /// Snapshot of a live session without renewing it.
    pub async fn peek(&self, session_id: &str) -> Option<Session> {
        let now = Instant::now();
        self.inner
            .read()
            .await
            .get(session_id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.session.clone())
    }

    /// Remove every expired entry. Returns how many were evicted.
    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|session_id, entry| {
            let keep = entry.expires_at > now;
            if !keep {
                tracing::info!(
                    event = SessionEvent::SessionExpired.as_str(),
                    session_id = %session_id,
                    "session expired"
                );
            }
            keep
        });
        let evicted = before - map.len();
        self.counters
            .expired
            .fetch_add(evicted as u64, Ordering::Relaxed);
        evicted
    }

    pub async fn stats(&self) -> SessionStoreStats {
        let now = Instant::now();
        let active_count = self
            .inner
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count();
        SessionStoreStats {
            active_count,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            created: self.counters.created.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            resets: self.counters.resets.load(Ordering::Relaxed),
        }
    }

    /// Start periodic eviction on the current tokio runtime.
    pub fn spawn_sweeper(&self, interval: Duration) -> SweeperHandle {
        let store = self.clone();
        let period = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick fires immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = store.evict_expired().await;
                tracing::debug!(
                    event = SessionEvent::SessionSweepCompleted.as_str(),
                    evicted,
                    "session sweep completed"
                );
            }
        });
        tracing::info!(
            event = SessionEvent::SessionSweeperStarted.as_str(),
            interval_secs = period.as_secs_f64(),
            ttl_secs = self.ttl.as_secs(),
            "session sweeper started"
        );
        SweeperHandle {
            handle: Some(handle),
        }
    }
}
