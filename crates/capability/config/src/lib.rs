//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env: {0}")]
    Missing(String),
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub install_id: String,
    pub install_name: String,
    pub language: String,
    pub polling_interval_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub metadata_ttl_seconds: u64,
    pub fixture_dir: String,
    pub simulate_multi_install: bool,
    pub oneshot: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let install_id = read_optional("DAB_INSTALL_ID")
            .ok_or_else(|| ConfigError::Missing("DAB_INSTALL_ID".to_string()))?;
        let install_name = read_optional("DAB_INSTALL_NAME").unwrap_or_else(|| install_id.clone());
        let language = env::var("DAB_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let polling_interval_seconds =
            read_u64_with_default("DAB_POLLING_INTERVAL_SECONDS", 20)?;
        if polling_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "DAB_POLLING_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let retry_attempts = read_u32_with_default("DAB_RETRY_ATTEMPTS", 3)?.max(1);
        let retry_delay_ms = read_u64_with_default("DAB_RETRY_DELAY_MS", 5_000)?;
        let metadata_ttl_seconds = read_u64_with_default("DAB_METADATA_TTL_SECONDS", 86_400)?;
        let fixture_dir = env::var("DAB_FIXTURE_DIR").unwrap_or_else(|_| "fixtures".to_string());
        let simulate_multi_install = read_bool_with_default("DAB_SIMULATE_MULTI_INSTALL", false);
        let oneshot = read_bool_with_default("DAB_ONESHOT", false);

        Ok(Self {
            install_id,
            install_name,
            language,
            polling_interval_seconds,
            retry_attempts,
            retry_delay_ms,
            metadata_ttl_seconds,
            fixture_dir,
            simulate_multi_install,
            oneshot,
        })
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
