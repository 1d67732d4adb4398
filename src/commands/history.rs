use anyhow::Result;

use crate::commands::CommandReport;
use crate::upcycle::config::load_config;
use crate::upcycle::paths::resolve_paths;
use crate::upcycle::records::{JsonlRecordStore, RecordStore, UpcycleRecord};

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub user: String,
    pub limit: Option<u64>,
}

fn summary_line(record: &UpcycleRecord) -> String {
    format!(
        "record={} created_at={} material={} quantity={} {} source={}",
        record.id,
        record.created_at,
        record.request.material(),
        record.request.quantity(),
        record.request.unit(),
        record.source
    )
}

pub fn run(opts: &HistoryOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("history");
    let paths = resolve_paths()?;
    let cfg = load_config(&paths)?;

    let limit = opts.limit.unwrap_or(cfg.history.limit);
    if limit == 0 {
        report.issue("invalid limit: must be >= 1");
        return Ok(report);
    }
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);

    let store = JsonlRecordStore::from_paths(&paths);
    let records = store.find_by_user(&opts.user, limit)?;
    report.detail(format!("ledger={}", store.path().display()));
    report.detail(format!("user={}", opts.user));
    report.detail(format!("records={}", records.len()));
    for record in &records {
        report.detail(summary_line(record));
    }
    report.payload(serde_json::to_value(&records)?);
    Ok(report)
}

pub fn show(user: &str, id: &str) -> Result<CommandReport> {
    let mut report = CommandReport::new("show");
    let paths = resolve_paths()?;
    let store = JsonlRecordStore::from_paths(&paths);

    let Some(record) = store.find_by_id(user, id.trim())? else {
        report.issue(format!("record `{}` not found", id.trim()));
        return Ok(report);
    };

    report.detail(summary_line(&record));
    report.detail(format!("carbon.if_wasted={}", record.carbon.if_wasted));
    report.detail(format!("carbon.if_upcycled={}", record.carbon.if_upcycled));
    for (index, suggestion) in record.suggestions.iter().enumerate() {
        report.detail(format!(
            "suggestion.{}={} | {}",
            index + 1,
            suggestion.id,
            suggestion.product_name
        ));
    }
    report.payload(serde_json::to_value(&record)?);
    Ok(report)
}
