use anyhow::Result;

use crate::commands::{CommandReport, record_audit};
use crate::error::WarnCode;
use crate::upcycle::config::load_config;
use crate::upcycle::model::MaterialRequest;
use crate::upcycle::paths::resolve_paths;
use crate::upcycle::pipeline::Pipeline;
use crate::upcycle::records::{JsonlRecordStore, NewRecord, RecordStore};
use crate::upcycle::util::truncate_with_ellipsis;
use crate::upcycle::warn;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub material: String,
    pub category: String,
    pub quantity: f64,
    pub unit: String,
    pub condition: Option<String>,
    pub user: String,
    pub no_save: bool,
}

pub fn run(opts: &AnalyzeOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("analyze");

    let request = match MaterialRequest::new(
        &opts.material,
        &opts.category,
        opts.quantity,
        &opts.unit,
        opts.condition.as_deref(),
    ) {
        Ok(request) => request,
        Err(err) => {
            report.issue(format!("invalid request: {err}"));
            return Ok(report);
        }
    };

    let paths = resolve_paths()?;
    let cfg = load_config(&paths)?;
    let pipeline = Pipeline::from_config(&cfg.provider);
    let outcome = pipeline.run(&request);

    report.detail(format!("material={}", request.material()));
    report.detail(format!("category={}", request.category()));
    report.detail(format!("quantity={} {}", request.quantity(), request.unit()));
    report.detail(format!("condition={}", request.condition().as_str()));
    report.detail(format!("carbon.if_wasted={}", outcome.carbon.if_wasted));
    report.detail(format!("carbon.if_upcycled={}", outcome.carbon.if_upcycled));
    report.detail(format!(
        "provider={}",
        pipeline.provider_label().unwrap_or("local")
    ));
    report.detail(format!("source={}", outcome.source));
    report.detail(format!("trace={}", outcome.trace.join(">")));
    for (index, suggestion) in outcome.analysis.suggestions.iter().enumerate() {
        report.detail(format!(
            "suggestion.{}={} | {} | {} | cost={} | roi={}%",
            index + 1,
            suggestion.id,
            truncate_with_ellipsis(&suggestion.product_name, 60),
            suggestion.difficulty.as_str(),
            suggestion.estimated_cost,
            suggestion.roi
        ));
    }

    let source = outcome.source.to_string();
    if cfg.history.enabled && !opts.no_save {
        let store = JsonlRecordStore::from_paths(&paths);
        match store.save(NewRecord {
            user: &opts.user,
            request: &request,
            carbon: outcome.carbon,
            suggestions: &outcome.analysis.suggestions,
            source: &source,
        }) {
            Ok(record) => report.detail(format!("record.id={}", record.id)),
            Err(err) => {
                warn::emit(
                    WarnCode::U004RecordSaveFailed,
                    "analyze",
                    "na",
                    "record_skipped",
                    &format!("{err:#}"),
                );
                report.detail("record.saved=false");
            }
        }
    } else {
        report.detail("record.saved=false");
    }

    record_audit(&paths, "analyze", request.material(), outcome.source);

    report.payload(serde_json::to_value(&outcome.analysis)?);
    Ok(report)
}
