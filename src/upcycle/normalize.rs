use crate::upcycle::carbon::round1;
use crate::upcycle::model::{Difficulty, SUGGESTION_COUNT, Suggestion, SuggestionSet};
use crate::upcycle::parser::RawSuggestionArray;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const MIN_CARBON_SAVINGS: f64 = 2.0;
pub const MAX_CARBON_SAVINGS: f64 = 15.0;

const DEFAULT_DESCRIPTION: &str = "AI-generated upcycling idea";
const DEFAULT_COST: u64 = 150;
const DEFAULT_PRICE_RANGE: &str = "₹200-500";
const DEFAULT_EARNING: &str = "₹50-350";
const DEFAULT_SAVINGS: f64 = 8.5;
const DEFAULT_DEMAND: u8 = 75;
const DEFAULT_ROI: u32 = 120;
const DEFAULT_TIME: &str = "2-3 hours";
const DEFAULT_AUDIENCE: &str = "General customers";
const DEFAULT_SUCCESS_RATE: &str = "80%";
const DEFAULT_RATING: &str = "4.0/5";
const DEFAULT_MATERIALS: [&str; 2] = ["Base materials", "Additional supplies"];
const DEFAULT_TOOLS: [&str; 1] = ["Basic tools"];
const DEFAULT_PLATFORMS: [&str; 1] = ["Online Platforms"];
const DEFAULT_STEPS: [&str; 5] = [
    "Clean and prepare the material",
    "Measure and mark the pieces you need",
    "Cut and shape the parts",
    "Assemble and secure the structure",
    "Finish, inspect and photograph for listing",
];

fn ai_id(position: usize) -> String {
    format!("ai_{}", position + 1)
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn text(entry: &Map<String, Value>, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn text_or(entry: &Map<String, Value>, key: &str, fallback: &str) -> String {
    text(entry, key).unwrap_or_else(|| fallback.to_string())
}

fn string_list(entry: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = entry
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() { None } else { Some(items) }
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_ascii_lowercase()))
        .collect()
}

fn number(entry: &Map<String, Value>, key: &str) -> Option<f64> {
    entry
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn id_field(entry: &Map<String, Value>) -> Option<String> {
    match entry.get("id")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn format_trimmed(value: f64) -> String {
    let rounded = round1(value);
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

/// Number from a JSON number or a string, with an optional `suffix` stripped first.
fn suffixed_number(value: Option<&Value>, suffix: &str) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.strip_suffix(suffix).unwrap_or(trimmed).trim().parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn success_rate(entry: &Map<String, Value>) -> String {
    match suffixed_number(entry.get("successRate"), "%") {
        Some(v) if v >= 0.0 => format!("{}%", format_trimmed(v.min(100.0))),
        _ => DEFAULT_SUCCESS_RATE.to_string(),
    }
}

fn customer_rating(entry: &Map<String, Value>) -> String {
    match suffixed_number(entry.get("customerRating"), "/5") {
        Some(v) => format!("{:.1}/5", v.clamp(0.0, 5.0)),
        None => DEFAULT_RATING.to_string(),
    }
}

/// Repair one provider entry into a full suggestion. `position` is 0-based.
pub fn normalize_entry(entry: &Map<String, Value>, position: usize) -> Suggestion {
    let difficulty = text(entry, "difficulty")
        .and_then(|raw| Difficulty::parse_loose(&raw))
        .unwrap_or(Difficulty::Beginner);

    let estimated_cost = number(entry, "estimatedCost")
        .map(f64::round)
        .filter(|v| *v >= 1.0)
        .map(|v| v as u64)
        .unwrap_or(DEFAULT_COST);

    let carbon_savings = number(entry, "carbonSavings")
        .map(|v| round1(v.clamp(MIN_CARBON_SAVINGS, MAX_CARBON_SAVINGS)))
        .unwrap_or(DEFAULT_SAVINGS);

    let market_demand = number(entry, "marketDemand")
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(DEFAULT_DEMAND);

    let roi = number(entry, "roi")
        .map(|v| v.round().clamp(0.0, u32::MAX as f64) as u32)
        .unwrap_or(DEFAULT_ROI);

    Suggestion {
        id: id_field(entry).unwrap_or_else(|| ai_id(position)),
        product_name: text(entry, "productName")
            .unwrap_or_else(|| format!("AI Generated {} Product", difficulty.as_str())),
        description: text_or(entry, "description", DEFAULT_DESCRIPTION),
        difficulty,
        estimated_cost,
        selling_price_range: text_or(entry, "sellingPriceRange", DEFAULT_PRICE_RANGE),
        earning_potential: text_or(entry, "earningPotential", DEFAULT_EARNING),
        carbon_savings,
        market_demand,
        roi,
        time_required: text_or(entry, "timeRequired", DEFAULT_TIME),
        materials_needed: string_list(entry, "materialsNeeded")
            .unwrap_or_else(|| owned(&DEFAULT_MATERIALS)),
        tools_required: string_list(entry, "toolsRequired")
            .unwrap_or_else(|| owned(&DEFAULT_TOOLS)),
        steps: string_list(entry, "steps").unwrap_or_else(|| owned(&DEFAULT_STEPS)),
        selling_platforms: string_list(entry, "sellingPlatforms")
            .map(dedup_preserving_order)
            .unwrap_or_else(|| owned(&DEFAULT_PLATFORMS)),
        target_audience: text_or(entry, "targetAudience", DEFAULT_AUDIENCE),
        success_rate: success_rate(entry),
        customer_rating: customer_rating(entry),
    }
}

/// Always yields exactly [`SUGGESTION_COUNT`] suggestions with unique ids.
/// Extra entries are dropped; missing ones are padded with placeholders.
pub fn normalize(raw: &RawSuggestionArray) -> SuggestionSet {
    let empty = Map::new();
    let mut items: [Suggestion; SUGGESTION_COUNT] = std::array::from_fn(|position| {
        normalize_entry(raw.get(position).unwrap_or(&empty), position)
    });

    let mut seen = BTreeSet::new();
    let mut bump = SUGGESTION_COUNT;
    for (position, item) in items.iter_mut().enumerate() {
        if seen.insert(item.id.clone()) {
            continue;
        }
        let mut candidate = ai_id(position);
        while seen.contains(&candidate) {
            bump += 1;
            candidate = ai_id(bump);
        }
        seen.insert(candidate.clone());
        item.id = candidate;
    }

    SuggestionSet::from_array(items)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_STEPS, normalize, normalize_entry};
    use crate::upcycle::model::{Difficulty, SUGGESTION_COUNT};
    use crate::upcycle::parser::RawSuggestionArray;
    use serde_json::{Map, Value, json};
    use std::collections::BTreeSet;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn full_entry(id: &str) -> Map<String, Value> {
        obj(json!({
            "id": id,
            "productName": "Bottle Planter",
            "description": "Hanging planters from bottles.",
            "difficulty": "Intermediate",
            "estimatedCost": 180,
            "sellingPriceRange": "₹300-600",
            "earningPotential": "₹120-420",
            "carbonSavings": 6.4,
            "marketDemand": 82,
            "roi": 140,
            "timeRequired": "3 hours",
            "materialsNeeded": ["bottles", "twine"],
            "toolsRequired": ["cutter"],
            "steps": ["cut", "drill", "hang"],
            "sellingPlatforms": ["Meesho", "OLX"],
            "targetAudience": "Balcony gardeners",
            "successRate": "88%",
            "customerRating": "4.6/5"
        }))
    }

    fn assert_structurally_valid(raw: &RawSuggestionArray) {
        let set = normalize(raw);
        assert_eq!(set.len(), SUGGESTION_COUNT);
        let ids: BTreeSet<_> = set.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), SUGGESTION_COUNT);
        for s in &set {
            assert!(!s.product_name.is_empty());
            assert!(s.estimated_cost > 0);
            assert!(s.market_demand <= 100);
            assert!((2.0..=15.0).contains(&s.carbon_savings));
            assert!(!s.materials_needed.is_empty());
            assert!(!s.tools_required.is_empty());
            assert!(!s.steps.is_empty());
            assert!(!s.selling_platforms.is_empty());
            assert!(s.success_rate.ends_with('%'));
            assert!(s.customer_rating.ends_with("/5"));
        }
    }

    #[test]
    fn always_returns_three_for_any_input_length() {
        assert_structurally_valid(&Vec::new());
        assert_structurally_valid(&vec![full_entry("a")]);
        assert_structurally_valid(&(0..5).map(|i| full_entry(&format!("x{i}"))).collect());
        assert_structurally_valid(&vec![
            obj(json!({"difficulty": 7, "steps": "not a list", "roi": "lots"})),
            obj(json!({"carbonSavings": 400, "marketDemand": -5, "estimatedCost": -10})),
        ]);
    }

    #[test]
    fn valid_fields_are_kept() {
        let got = normalize_entry(&full_entry("keep"), 0);
        assert_eq!(got.id, "keep");
        assert_eq!(got.difficulty, Difficulty::Intermediate);
        assert_eq!(got.estimated_cost, 180);
        assert_eq!(got.carbon_savings, 6.4);
        assert_eq!(got.market_demand, 82);
        assert_eq!(got.roi, 140);
        assert_eq!(got.steps, vec!["cut", "drill", "hang"]);
        assert_eq!(got.customer_rating, "4.6/5");
    }

    #[test]
    fn missing_fields_take_documented_defaults() {
        let got = normalize_entry(&Map::new(), 1);
        assert_eq!(got.id, "ai_2");
        assert_eq!(got.difficulty, Difficulty::Beginner);
        assert_eq!(got.product_name, "AI Generated Beginner Product");
        assert_eq!(got.estimated_cost, 150);
        assert_eq!(got.carbon_savings, 8.5);
        assert_eq!(got.market_demand, 75);
        assert_eq!(got.roi, 120);
        assert_eq!(got.steps.len(), DEFAULT_STEPS.len());
        assert_eq!(got.selling_platforms, vec!["Online Platforms"]);
        assert_eq!(got.success_rate, "80%");
        assert_eq!(got.customer_rating, "4.0/5");
    }

    #[test]
    fn out_of_range_numbers_are_clamped() {
        let got = normalize_entry(
            &obj(json!({"carbonSavings": 99.0, "marketDemand": 140, "roi": -20})),
            0,
        );
        assert_eq!(got.carbon_savings, 15.0);
        assert_eq!(got.market_demand, 100);
        assert_eq!(got.roi, 0);

        let low = normalize_entry(&obj(json!({"carbonSavings": 0.3})), 0);
        assert_eq!(low.carbon_savings, 2.0);
    }

    #[test]
    fn loose_formats_are_repaired() {
        let got = normalize_entry(
            &obj(json!({
                "difficulty": "advanced",
                "successRate": 85,
                "customerRating": "4.3",
                "sellingPlatforms": ["Etsy", "etsy", " ", "OLX"],
                "id": 7
            })),
            0,
        );
        assert_eq!(got.difficulty, Difficulty::Advanced);
        assert_eq!(got.success_rate, "85%");
        assert_eq!(got.customer_rating, "4.3/5");
        assert_eq!(got.selling_platforms, vec!["Etsy", "OLX"]);
        assert_eq!(got.id, "7");
    }

    #[test]
    fn suffixed_rates_are_clamped_like_numbers() {
        let high = normalize_entry(
            &obj(json!({"successRate": "150%", "customerRating": "9/5"})),
            0,
        );
        assert_eq!(high.success_rate, "100%");
        assert_eq!(high.customer_rating, "5.0/5");

        let junk = normalize_entry(
            &obj(json!({"successRate": "lots%", "customerRating": "great/5"})),
            0,
        );
        assert_eq!(junk.success_rate, "80%");
        assert_eq!(junk.customer_rating, "4.0/5");

        let plain = normalize_entry(
            &obj(json!({"successRate": " 92.5 % ", "customerRating": "4/5"})),
            0,
        );
        assert_eq!(plain.success_rate, "92.5%");
        assert_eq!(plain.customer_rating, "4.0/5");
    }

    #[test]
    fn duplicate_ids_are_reassigned() {
        let set = normalize(&vec![full_entry("same"), full_entry("same"), full_entry("same")]);
        let ids: Vec<_> = set.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["same", "ai_2", "ai_3"]);
    }

    #[test]
    fn padding_ids_do_not_collide_with_provider_ids() {
        let set = normalize(&vec![full_entry("ai_2")]);
        let ids: BTreeSet<_> = set.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("ai_2"));
    }
}
