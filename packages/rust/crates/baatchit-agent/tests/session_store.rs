//! Session store: creation, resumption, idle expiry, renewal, reset and sweeping.
//! Runs on paused tokio time so expiry is deterministic.

use std::time::Duration;

use baatchit_agent::{ChatMessage, SessionStore, new_session_id};

const PROMPT: &str = "system prompt";

fn store(ttl_ms: u64) -> SessionStore {
    SessionStore::new(Duration::from_millis(ttl_ms), PROMPT)
}

#[tokio::test(start_paused = true)]
async fn new_session_holds_only_the_system_message() {
    let store = store(1_000);
    let (session_id, session) = store.get_or_create(None).await;

    assert_eq!(session.id, session_id);
    assert_eq!(session.messages, vec![ChatMessage::system(PROMPT)]);
    assert_eq!(session.conversation_length(), 0);
    let stats = store.stats().await;
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.misses, 0);
}

#[tokio::test(start_paused = true)]
async fn live_session_is_resumed_with_saved_transcript() {
    let store = store(1_000);
    let (session_id, mut session) = store.get_or_create(None).await;
    session.push(ChatMessage::user("hello"));
    session.push(ChatMessage::assistant("hi"));
    store.touch_and_save(&session_id, session).await;

    let (resumed_id, resumed) = store.get_or_create(Some(&session_id)).await;

    assert_eq!(resumed_id, session_id);
    assert_eq!(resumed.conversation_length(), 2);
    assert_eq!(store.stats().await.hits, 1);
}

#[tokio::test(start_paused = true)]
async fn idle_session_expires_and_lookup_starts_fresh() {
    let store = store(100);
    let (session_id, _) = store.get_or_create(None).await;

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(!store.contains(&session_id).await);
    let (fresh_id, fresh) = store.get_or_create(Some(&session_id)).await;
    assert_ne!(fresh_id, session_id);
    assert_eq!(fresh.messages.len(), 1);
    let stats = store.stats().await;
    assert_eq!(stats.expired, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.active_count, 1);
}

#[tokio::test(start_paused = true)]
async fn access_before_expiry_renews_the_ttl() {
    let store = store(300);
    let (session_id, _) = store.get_or_create(None).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    let (same_id, _) = store.get_or_create(Some(&session_id)).await;
    assert_eq!(same_id, session_id);

    // Past the first deadline, inside the renewed one.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(store.contains(&session_id).await);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!store.contains(&session_id).await);
}

#[tokio::test(start_paused = true)]
async fn save_rearms_expiry() {
    let store = store(300);
    let (session_id, session) = store.get_or_create(None).await;

    tokio::time::sleep(Duration::from_millis(200)).await;
    store.touch_and_save(&session_id, session).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(store.peek(&session_id).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn reset_removes_session_once() {
    let store = store(1_000);
    let (session_id, _) = store.get_or_create(None).await;

    assert!(store.reset(&session_id).await);
    assert!(!store.reset(&session_id).await);
    assert!(!store.contains(&session_id).await);
    assert_eq!(store.stats().await.resets, 1);
}

#[tokio::test(start_paused = true)]
async fn evict_expired_only_removes_stale_entries() {
    let store = store(100);
    store.get_or_create(None).await;
    store.get_or_create(None).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    let (live_id, _) = store.get_or_create(None).await;

    assert_eq!(store.evict_expired().await, 2);
    let stats = store.stats().await;
    assert_eq!(stats.active_count, 1);
    assert_eq!(stats.expired, 2);
    assert!(store.contains(&live_id).await);
}

#[tokio::test(start_paused = true)]
async fn sweeper_reclaims_expired_sessions_until_shut_down() {
    let store = store(50);
    store.get_or_create(None).await;

    let sweeper = store.spawn_sweeper(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(store.stats().await.expired, 1);
    assert_eq!(store.evict_expired().await, 0);
    sweeper.shutdown();
}

#[test]
fn generated_ids_are_unique_and_prefixed() {
    let first = new_session_id();
    let second = new_session_id();
    assert_ne!(first, second);
    assert!(first.starts_with("session_"));
    let parts: Vec<&str> = first.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[1].len(), 32);
    assert!(parts[2].parse::<u128>().is_ok());
}
