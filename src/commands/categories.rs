use anyhow::Result;
use serde_json::json;

use crate::commands::{CommandReport, record_audit};
use crate::upcycle::config::load_config;
use crate::upcycle::paths::resolve_paths;
use crate::upcycle::pipeline::Pipeline;

pub fn run(material: &str) -> Result<CommandReport> {
    let mut report = CommandReport::new("categories");
    let paths = resolve_paths()?;
    let cfg = load_config(&paths)?;

    let outcome = match Pipeline::from_config(&cfg.provider).suggest_categories(material) {
        Ok(outcome) => outcome,
        Err(err) => {
            report.issue(format!("invalid request: {err}"));
            return Ok(report);
        }
    };

    for (index, category) in outcome.categories.iter().enumerate() {
        report.detail(format!("category.{}={category}", index + 1));
    }
    report.detail(format!("source={}", outcome.source));

    record_audit(&paths, "categories", material, outcome.source);

    report.payload(json!({
        "categories": outcome.categories,
        "source": outcome.source.to_string(),
    }));
    Ok(report)
}
