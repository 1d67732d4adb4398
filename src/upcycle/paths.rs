use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct UpcyclePaths {
    pub home: PathBuf,
    pub records_file: PathBuf,
    pub logs_dir: PathBuf,
    pub config_file: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<UpcyclePaths> {
    let home = match env::var("UPCYCLE_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".upcycle"),
    };

    let mut paths = UpcyclePaths::under(home);
    paths.records_file = env_or_default_path("UPCYCLE_RECORDS_FILE", paths.records_file);
    paths.logs_dir = env_or_default_path("UPCYCLE_LOGS_DIR", paths.logs_dir);
    Ok(paths)
}

impl UpcyclePaths {
    /// Default layout under `home`, before any per-path overrides.
    pub fn under(home: PathBuf) -> Self {
        Self {
            records_file: home.join("records.jsonl"),
            logs_dir: home.join("logs"),
            config_file: home.join("upcycle.toml"),
            home,
        }
    }
}
