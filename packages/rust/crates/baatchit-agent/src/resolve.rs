pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

pub(crate) fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn resolve_string(
    cli_value: Option<String>,
    env_name: &str,
    settings_value: Option<&str>,
    default: &str,
) -> String {
    if let Some(value) = cli_value {
        return value;
    }
    if let Some(value) = non_empty_env(env_name) {
        return value;
    }
    if let Some(value) = settings_value {
        return value.to_string();
    }
    default.to_string()
}

pub(crate) fn resolve_positive_u64(
    cli_value: Option<u64>,
    env_name: &str,
    settings_value: Option<u64>,
    default: u64,
) -> u64 {
    if let Some(value) = cli_value
        && value > 0
    {
        return value;
    }
    if let Some(value) = parse_positive_u64_from_env(env_name) {
        return value;
    }
    if let Some(value) = settings_value
        && value > 0
    {
        return value;
    }
    default
}

pub(crate) fn resolve_positive_u32(
    env_name: &str,
    settings_value: Option<u32>,
    default: u32,
) -> u32 {
    parse_positive_u32_from_env(env_name)
        .or(settings_value.filter(|value| *value > 0))
        .unwrap_or(default)
}

/// `--bind` > `--port` > `PORT` > `gateway.bind` > `0.0.0.0:8000`.
pub(crate) fn resolve_bind_addr(
    cli_bind: Option<String>,
    cli_port: Option<u16>,
    settings_bind: Option<&str>,
) -> String {
    bind_addr_from(cli_bind, cli_port, non_empty_env("PORT"), settings_bind)
}

fn bind_addr_from(
    cli_bind: Option<String>,
    cli_port: Option<u16>,
    env_port: Option<String>,
    settings_bind: Option<&str>,
) -> String {
    if let Some(bind) = cli_bind.filter(|bind| !bind.trim().is_empty()) {
        return bind;
    }
    if let Some(port) = cli_port {
        return format!("0.0.0.0:{port}");
    }
    if let Some(raw) = env_port {
        match raw.parse::<u16>() {
            Ok(port) => return format!("0.0.0.0:{port}"),
            Err(_) => {
                tracing::warn!(env_var = "PORT", value = %raw, "invalid port env value");
            }
        }
    }
    settings_bind.map_or_else(|| DEFAULT_BIND_ADDR.to_string(), ToString::to_string)
}

pub(crate) fn parse_positive_u32_from_env(name: &str) -> Option<u32> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(env_var = %name, value = %raw, "invalid positive integer env value");
            None
        }
    }
}

pub(crate) fn parse_positive_u64_from_env(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!(env_var = %name, value = %raw, "invalid positive integer env value");
            None
        }
    }
}
