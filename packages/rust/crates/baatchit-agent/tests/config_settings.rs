//! System + user settings merge.

use std::fs;

use baatchit_agent::load_runtime_settings_from_paths;
use tempfile::TempDir;

#[test]
fn user_values_override_system_values_field_by_field() {
    let dir = TempDir::new().expect("tempdir");
    let system = dir.path().join("system.yaml");
    let user = dir.path().join("user.yaml");
    fs::write(
        &system,
        r"
inference:
  url: https://api.groq.com/openai/v1/chat/completions
  model: llama-3.1-8b-instant
  max_tokens: 1000
session:
  ttl_secs: 3600
agent:
  max_attempts: 10
gateway:
  bind: 0.0.0.0:8000
",
    )
    .expect("write system");
    fs::write(
        &user,
        r"
inference:
  model: llama-3.3-70b-versatile
session:
  ttl_secs: 120
gateway:
  max_concurrent: 4
",
    )
    .expect("write user");

    let settings = load_runtime_settings_from_paths(&system, &user);

    assert_eq!(
        settings.inference.url.as_deref(),
        Some("https://api.groq.com/openai/v1/chat/completions")
    );
    assert_eq!(settings.inference.model.as_deref(), Some("llama-3.3-70b-versatile"));
    assert_eq!(settings.inference.max_tokens, Some(1000));
    assert_eq!(settings.session.ttl_secs, Some(120));
    assert_eq!(settings.agent.max_attempts, Some(10));
    assert_eq!(settings.gateway.bind.as_deref(), Some("0.0.0.0:8000"));
    assert_eq!(settings.gateway.max_concurrent, Some(4));
    assert!(settings.search.endpoint.is_none());
}

#[test]
fn missing_files_yield_empty_settings() {
    let dir = TempDir::new().expect("tempdir");
    let settings = load_runtime_settings_from_paths(
        &dir.path().join("absent-system.yaml"),
        &dir.path().join("absent-user.yaml"),
    );
    assert!(settings.inference.url.is_none());
    assert!(settings.agent.max_attempts.is_none());
    assert!(settings.gateway.bind.is_none());
}

#[test]
fn empty_or_invalid_user_file_keeps_system_values() {
    let dir = TempDir::new().expect("tempdir");
    let system = dir.path().join("system.yaml");
    let empty = dir.path().join("empty.yaml");
    let broken = dir.path().join("broken.yaml");
    fs::write(&system, "search:\n  max_results: 2\n").expect("write system");
    fs::write(&empty, "").expect("write empty");
    fs::write(&broken, "search: [unterminated\n").expect("write broken");

    let with_empty = load_runtime_settings_from_paths(&system, &empty);
    assert_eq!(with_empty.search.max_results, Some(2));

    let with_broken = load_runtime_settings_from_paths(&system, &broken);
    assert_eq!(with_broken.search.max_results, Some(2));
}

#[test]
fn shipped_defaults_parse() {
    let shipped = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../conf/settings.yaml");
    let dir = TempDir::new().expect("tempdir");
    let settings = load_runtime_settings_from_paths(&shipped, &dir.path().join("none.yaml"));
    assert_eq!(settings.agent.max_attempts, Some(10));
    assert_eq!(settings.session.ttl_secs, Some(3600));
    assert_eq!(settings.gateway.bind.as_deref(), Some("0.0.0.0:8000"));
}
