pub mod analyze;
pub mod carbon;
pub mod categories;
pub mod history;
pub mod status;

use serde::Serialize;
use serde_json::Value;

use crate::error::WarnCode;
use crate::upcycle::audit::{self, AuditEvent};
use crate::upcycle::paths::UpcyclePaths;
use crate::upcycle::pipeline::SuggestionSource;
use crate::upcycle::warn;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
            payload: None,
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn payload(&mut self, value: Value) {
        self.payload = Some(value);
    }
}

/// Audit writes are best-effort; a failure becomes a warning line.
pub fn record_audit(
    paths: &UpcyclePaths,
    command: &str,
    material: &str,
    source: SuggestionSource,
) {
    let written = AuditEvent::for_run(command, material, source)
        .and_then(|event| audit::append_event(paths, &event));
    if let Err(err) = written {
        warn::emit(
            WarnCode::U005AuditWriteFailed,
            command,
            "na",
            "audit_skipped",
            &format!("{err:#}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::CommandReport;
    use serde_json::json;

    #[test]
    fn issue_flips_ok() {
        let mut report = CommandReport::new("analyze");
        report.detail("source=fallback:disabled");
        assert!(report.ok);
        report.issue("invalid request: quantity must be positive");
        assert!(!report.ok);
        assert_eq!(report.issues.len(), 1);
    }

    #[test]
    fn payload_is_omitted_until_set() {
        let mut report = CommandReport::new("status");
        let value = serde_json::to_value(&report).expect("json");
        assert!(value.get("payload").is_none());

        report.payload(json!({"categories": ["Bottles"]}));
        let value = serde_json::to_value(&report).expect("json");
        assert_eq!(value["payload"]["categories"][0], "Bottles");
    }
}
