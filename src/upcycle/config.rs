use crate::upcycle::paths::UpcyclePaths;
use crate::upcycle::provider::{is_disabled_name, parse_provider_alias};
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const MAX_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "auto".to_string(),
            model: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub enabled: bool,
    pub limit: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpcycleConfig {
    pub provider: ProviderConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialUpcycleConfig {
    provider: Option<ProviderConfig>,
    history: Option<HistoryConfig>,
}

fn env_or_u64(var: &str, fallback: u64) -> u64 {
    match env::var(var) {
        Ok(v) => v.trim().parse::<u64>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_optional(var: &str, fallback: Option<String>) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => fallback,
    }
}

pub fn validate(cfg: &UpcycleConfig) -> Result<()> {
    let name = cfg.provider.name.trim();
    if !name.eq_ignore_ascii_case("auto")
        && !is_disabled_name(name)
        && parse_provider_alias(name).is_none()
    {
        return Err(anyhow!(
            "invalid provider `{name}`: use auto, local, gemini, openai, anthropic, openai-compatible, openrouter, or huggingface"
        ));
    }
    let timeout = cfg.provider.timeout_secs;
    if timeout == 0 || timeout > MAX_TIMEOUT_SECS {
        return Err(anyhow!(
            "invalid provider timeout: require 1 <= timeout_secs <= {MAX_TIMEOUT_SECS}"
        ));
    }
    if cfg.history.limit == 0 {
        return Err(anyhow!("invalid history limit: must be >= 1"));
    }
    Ok(())
}

fn merge_file_config(base: &mut UpcycleConfig, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: PartialUpcycleConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse upcycle config {}: {err}", path.display()))?;
    if let Some(provider) = parsed.provider {
        base.provider = provider;
    }
    if let Some(history) = parsed.history {
        base.history = history;
    }
    Ok(())
}

fn apply_env_overrides(cfg: &mut UpcycleConfig) {
    cfg.provider.name = env_or_string("UPCYCLE_PROVIDER", &cfg.provider.name);
    cfg.provider.model = env_or_optional("UPCYCLE_MODEL", cfg.provider.model.take());
    cfg.provider.base_url = env_or_optional("UPCYCLE_BASE_URL", cfg.provider.base_url.take());
    cfg.provider.timeout_secs = env_or_u64("UPCYCLE_TIMEOUT_SECS", cfg.provider.timeout_secs);
    cfg.history.enabled = env_or_bool("UPCYCLE_HISTORY_ENABLED", cfg.history.enabled);
    cfg.history.limit = env_or_u64("UPCYCLE_HISTORY_LIMIT", cfg.history.limit);
}

pub fn load_config_from(path: &Path) -> Result<UpcycleConfig> {
    let mut cfg = UpcycleConfig::default();
    merge_file_config(&mut cfg, path)?;
    apply_env_overrides(&mut cfg);
    validate(&cfg)?;
    Ok(cfg)
}

pub fn resolve_config_path(paths: &UpcyclePaths) -> PathBuf {
    match env::var("UPCYCLE_CONFIG_PATH") {
        Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom.trim()),
        _ => paths.config_file.clone(),
    }
}

pub fn load_config(paths: &UpcyclePaths) -> Result<UpcycleConfig> {
    load_config_from(&resolve_config_path(paths))
}
