use anyhow::Result;
use serde_json::json;
use std::env;

use crate::commands::CommandReport;
use crate::upcycle::audit::count_events;
use crate::upcycle::config::{load_config, resolve_config_path};
use crate::upcycle::paths::resolve_paths;
use crate::upcycle::provider::resolve_remote_config;

include!(concat!(env!("OUT_DIR"), "/upcycle_env_allowlist.rs"));

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    let config_path = resolve_config_path(&paths);
    report.detail(format!("home={}", paths.home.display()));
    report.detail(format!("records_file={}", paths.records_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    report.detail(format!(
        "config_file={}{}",
        config_path.display(),
        if config_path.exists() { "" } else { " (absent)" }
    ));

    let cfg = match load_config(&paths) {
        Ok(cfg) => cfg,
        Err(err) => {
            report.issue(format!("config invalid: {err:#}"));
            return Ok(report);
        }
    };

    let remote = resolve_remote_config(&cfg.provider);
    let (provider, model) = match &remote {
        Some(remote) => (remote.kind.label(), remote.model.as_str()),
        None => ("local", "na"),
    };
    report.detail(format!("provider={provider}"));
    report.detail(format!("model={model}"));
    report.detail(format!("timeout_secs={}", cfg.provider.timeout_secs));
    report.detail(format!("history.enabled={}", cfg.history.enabled));
    report.detail(format!("history.limit={}", cfg.history.limit));
    let audit_events = count_events(&paths)?;
    report.detail(format!("audit.events={audit_events}"));

    let set_vars: Vec<&str> = GENERATED_UPCYCLE_ENV_ALLOWLIST
        .iter()
        .copied()
        .filter(|key| env::var_os(key).is_some())
        .collect();
    for key in &set_vars {
        report.detail(format!("env.{key}=set"));
    }
    report.detail(format!("build_id={}", env!("BUILD_UUID")));

    report.payload(json!({
        "home": paths.home,
        "recordsFile": paths.records_file,
        "logsDir": paths.logs_dir,
        "configFile": config_path,
        "provider": provider,
        "model": model,
        "timeoutSecs": cfg.provider.timeout_secs,
        "history": {
            "enabled": cfg.history.enabled,
            "limit": cfg.history.limit,
        },
        "auditEvents": audit_events,
        "env": set_vars,
        "knownEnv": GENERATED_UPCYCLE_ENV_ALLOWLIST,
        "buildId": env!("BUILD_UUID"),
    }));
    Ok(report)
}
