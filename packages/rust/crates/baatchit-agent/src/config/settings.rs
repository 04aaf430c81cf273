//! Runtime settings loader for baatchit-agent.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/settings.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/baatchit/settings.yaml`
//!
//! Merge precedence is user over system.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/settings.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "baatchit/settings.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";
static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeSettings {
    #[serde(default)]
    pub inference: InferenceSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferenceSettings {
    pub url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchSettings {
    pub endpoint: Option<String>,
    pub max_results: Option<usize>,
    pub search_depth: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    pub ttl_secs: Option<u64>,
    pub sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentSettings {
    pub max_attempts: Option<u32>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewaySettings {
    pub bind: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_concurrent: Option<usize>,
}

impl RuntimeSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            inference: self.inference.merge(overlay.inference),
            search: self.search.merge(overlay.search),
            session: self.session.merge(overlay.session),
            agent: self.agent.merge(overlay.agent),
            gateway: self.gateway.merge(overlay.gateway),
        }
    }
}

impl InferenceSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            url: overlay.url.or(self.url),
            model: overlay.model.or(self.model),
            temperature: overlay.temperature.or(self.temperature),
            max_tokens: overlay.max_tokens.or(self.max_tokens),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl SearchSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            endpoint: overlay.endpoint.or(self.endpoint),
            max_results: overlay.max_results.or(self.max_results),
            search_depth: overlay.search_depth.or(self.search_depth),
            timeout_secs: overlay.timeout_secs.or(self.timeout_secs),
        }
    }
}

impl SessionSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            ttl_secs: overlay.ttl_secs.or(self.ttl_secs),
            sweep_interval_secs: overlay.sweep_interval_secs.or(self.sweep_interval_secs),
        }
    }
}

impl AgentSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            max_attempts: overlay.max_attempts.or(self.max_attempts),
            system_prompt: overlay.system_prompt.or(self.system_prompt),
        }
    }
}

impl GatewaySettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            bind: overlay.bind.or(self.bind),
            request_timeout_secs: overlay.request_timeout_secs.or(self.request_timeout_secs),
            max_concurrent: overlay.max_concurrent.or(self.max_concurrent),
        }
    }
}

/// Load merged runtime settings (user overrides system).
pub fn load_runtime_settings() -> RuntimeSettings {
    let (system_path, user_path) = runtime_settings_paths();
    load_runtime_settings_from_paths(&system_path, &user_path)
}

#[doc(hidden)]
pub fn runtime_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_runtime_settings_from_paths(system: &Path, user: &Path) -> RuntimeSettings {
    load_one(system).merge(load_one(user))
}

fn load_one(path: &Path) -> RuntimeSettings {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return RuntimeSettings::default();
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), error = %error, "settings file unreadable; skipped");
            return RuntimeSettings::default();
        }
    };
    // An empty document parses as `None`.
    serde_yaml::from_str::<Option<RuntimeSettings>>(&raw)
        .map(Option::unwrap_or_default)
        .unwrap_or_else(|error| {
            tracing::warn!(path = %path.display(), error = %error, "settings yaml invalid; skipped");
            RuntimeSettings::default()
        })
}

fn env_path(name: &str) -> Option<PathBuf> {
    let value = std::env::var(name).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn project_root() -> PathBuf {
    env_path("PRJ_ROOT")
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    let home = CONFIG_HOME_OVERRIDE
        .get()
        .cloned()
        .or_else(|| env_path("PRJ_CONFIG_HOME"))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_HOME_RELATIVE_PATH));
    if home.is_absolute() {
        home
    } else {
        project_root.join(home)
    }
}
