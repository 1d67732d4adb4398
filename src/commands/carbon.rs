use anyhow::Result;

use crate::commands::CommandReport;
use crate::upcycle::carbon::breakdown;
use crate::upcycle::model::validate_measure;

#[derive(Debug, Clone)]
pub struct CarbonOptions {
    pub material: String,
    pub quantity: f64,
    pub unit: String,
}

pub fn run(opts: &CarbonOptions) -> Result<CommandReport> {
    let mut report = CommandReport::new("carbon");

    let material = opts.material.trim();
    if material.is_empty() {
        report.issue("invalid request: material cannot be empty");
        return Ok(report);
    }
    let unit = match validate_measure(opts.quantity, &opts.unit) {
        Ok(unit) => unit,
        Err(err) => {
            report.issue(format!("invalid request: {err}"));
            return Ok(report);
        }
    };

    let out = breakdown(material, opts.quantity, unit);
    report.detail(format!("material={material}"));
    report.detail(format!("mass_kg={}", out.mass_kg));
    report.detail(format!("factor={} ({})", out.emission_factor, out.factor_key));
    report.detail(format!("if_wasted={}", out.result.if_wasted));
    report.detail(format!("if_upcycled={}", out.result.if_upcycled));
    report.payload(serde_json::to_value(out)?);
    Ok(report)
}
