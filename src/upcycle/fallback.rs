use crate::upcycle::carbon::round1;
use crate::upcycle::model::{Difficulty, SUGGESTION_COUNT, Suggestion, SuggestionSet, Unit};

const CURRENCY: &str = "₹";

struct Template {
    difficulty: Difficulty,
    cost_offset: u64,
    price_low_offset: u64,
    price_high_offset: u64,
    earning_low_ratio: f64,
    earning_high_ratio: f64,
    savings_per_unit: f64,
    savings_floor: f64,
    savings_cap: f64,
    market_demand: u8,
    roi: u32,
    time_required: &'static str,
    success_rate: &'static str,
    customer_rating: &'static str,
}

// Floors and caps keep the three savings values apart at every quantity.
const TEMPLATES: [Template; SUGGESTION_COUNT] = [
    Template {
        difficulty: Difficulty::Beginner,
        cost_offset: 0,
        price_low_offset: 0,
        price_high_offset: 300,
        earning_low_ratio: 0.3,
        earning_high_ratio: 0.7,
        savings_per_unit: 0.8,
        savings_floor: 2.5,
        savings_cap: 10.0,
        market_demand: 85,
        roi: 150,
        time_required: "2-3 hours",
        success_rate: "90%",
        customer_rating: "4.5/5",
    },
    Template {
        difficulty: Difficulty::Intermediate,
        cost_offset: 50,
        price_low_offset: 100,
        price_high_offset: 600,
        earning_low_ratio: 0.4,
        earning_high_ratio: 0.6,
        savings_per_unit: 0.6,
        savings_floor: 2.0,
        savings_cap: 8.0,
        market_demand: 78,
        roi: 120,
        time_required: "3-4 hours",
        success_rate: "85%",
        customer_rating: "4.3/5",
    },
    Template {
        difficulty: Difficulty::Advanced,
        cost_offset: 100,
        price_low_offset: 200,
        price_high_offset: 1000,
        earning_low_ratio: 0.5,
        earning_high_ratio: 0.5,
        savings_per_unit: 1.2,
        savings_floor: 3.0,
        savings_cap: 15.0,
        market_demand: 65,
        roi: 180,
        time_required: "4-5 hours",
        success_rate: "75%",
        customer_rating: "4.7/5",
    },
];

fn base_cost(quantity: f64) -> u64 {
    (quantity * 20.0).round().max(100.0) as u64
}

fn base_price(quantity: f64) -> u64 {
    (quantity * 50.0).round().max(200.0) as u64
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn texts(index: usize, material: &str, category: &str, unit: Unit) -> TemplateText {
    let subject = format!("{material} {category}");
    match index {
        0 => TemplateText {
            product_name: format!("Upcycled {} Planter", capitalize(&subject)),
            description: format!(
                "Turn {subject} into planters for balconies and small gardens. Works with any amount measured in {unit} and needs only basic tools."
            ),
            materials: vec![
                subject.clone(),
                "Potting soil".to_string(),
                "Seeds or small plants".to_string(),
                "Eco-friendly paint".to_string(),
                "Decorative stones".to_string(),
            ],
            tools: vec![
                "Scissors or cutter".to_string(),
                "Paint brushes".to_string(),
                "Drill for drainage".to_string(),
                "Measuring tape".to_string(),
            ],
            steps: vec![
                format!("Clean and prepare the {subject}"),
                "Create drainage holes at the bottom".to_string(),
                "Paint and decorate the exterior".to_string(),
                "Add soil and plant the seeds".to_string(),
                "Water lightly and place in sunlight".to_string(),
            ],
            platforms: vec![
                "Amazon India".to_string(),
                "Flipkart".to_string(),
                "Local nursery".to_string(),
            ],
            audience: "Urban gardeners and plant lovers",
        },
        1 => TemplateText {
            product_name: format!("{} Home Organizer", capitalize(&subject)),
            description: format!(
                "Build storage for kitchens, desks or bathrooms from {subject}. Sized from the {unit} you have on hand."
            ),
            materials: vec![
                subject.clone(),
                "Strong adhesive".to_string(),
                "Eco-friendly paint".to_string(),
                "Decorative paper".to_string(),
                "Small hardware".to_string(),
            ],
            tools: vec![
                "Measuring tape".to_string(),
                "Cutter or scissors".to_string(),
                "Paint brushes".to_string(),
                "Sandpaper".to_string(),
            ],
            steps: vec![
                format!("Measure and cut the {material} to the required sizes"),
                "Sand the edges for a smooth finish".to_string(),
                "Assemble the pieces with strong adhesive".to_string(),
                "Paint and decorate as desired".to_string(),
                "Add dividers or compartments".to_string(),
            ],
            platforms: vec![
                "Amazon India".to_string(),
                "Flipkart".to_string(),
                "Facebook Marketplace".to_string(),
            ],
            audience: "Home organization enthusiasts",
        },
        _ => TemplateText {
            product_name: format!("Creative {} Art Piece", capitalize(material)),
            description: format!(
                "Make wall art or decorative pieces from {subject}. Each piece is unique, which suits gifting and interior design orders."
            ),
            materials: vec![
                subject.clone(),
                "Art supplies".to_string(),
                "Frame materials".to_string(),
                "LED lights (optional)".to_string(),
                "Protective coating".to_string(),
            ],
            tools: vec![
                "Hot glue gun".to_string(),
                "Precision tools".to_string(),
                "Paint equipment".to_string(),
                "Safety gear".to_string(),
            ],
            steps: vec![
                format!("Sketch an art concept around the {material}"),
                "Prepare and clean all materials thoroughly".to_string(),
                "Assemble the main structure".to_string(),
                "Add artistic details and colors".to_string(),
                "Apply a protective coating and finish".to_string(),
            ],
            platforms: vec![
                "Etsy".to_string(),
                "Local art markets".to_string(),
                "Custom orders".to_string(),
            ],
            audience: "Art lovers and interior designers",
        },
    }
}

struct TemplateText {
    product_name: String,
    description: String,
    materials: Vec<String>,
    tools: Vec<String>,
    steps: Vec<String>,
    platforms: Vec<String>,
    audience: &'static str,
}

fn build(
    index: usize,
    template: &Template,
    material: &str,
    category: &str,
    quantity: f64,
    unit: Unit,
) -> Suggestion {
    let cost = base_cost(quantity);
    let price = base_price(quantity);
    let price_low = price.saturating_add(template.price_low_offset);
    let price_high = price.saturating_add(template.price_high_offset);
    let earning_low = (price_low as f64 * template.earning_low_ratio).round() as u64;
    let earning_high = (price_high as f64 * template.earning_high_ratio).round() as u64;
    let savings = round1(
        (quantity * template.savings_per_unit).clamp(template.savings_floor, template.savings_cap),
    );
    let text = texts(index, material, category, unit);

    Suggestion {
        id: format!("fallback_{}", index + 1),
        product_name: text.product_name,
        description: text.description,
        difficulty: template.difficulty,
        estimated_cost: cost.saturating_add(template.cost_offset),
        selling_price_range: format!("{CURRENCY}{price_low}-{price_high}"),
        earning_potential: format!("{CURRENCY}{earning_low}-{earning_high}"),
        carbon_savings: savings,
        market_demand: template.market_demand,
        roi: template.roi,
        time_required: template.time_required.to_string(),
        materials_needed: text.materials,
        tools_required: text.tools,
        steps: text.steps,
        selling_platforms: text.platforms,
        target_audience: text.audience.to_string(),
        success_rate: template.success_rate.to_string(),
        customer_rating: template.customer_rating.to_string(),
    }
}

/// Provider-free suggestions. Pure: equal inputs give equal output.
pub fn synthesize(material: &str, category: &str, quantity: f64, unit: Unit) -> SuggestionSet {
    let items: [Suggestion; SUGGESTION_COUNT] = std::array::from_fn(|index| {
        build(index, &TEMPLATES[index], material, category, quantity, unit)
    });
    SuggestionSet::from_array(items)
}

/// Static category table, first match wins.
const CATEGORY_TABLE: &[(&[&str], [&str; 5])] = &[
    (&["plastic"], ["Bottles", "Containers", "Bags", "Packaging", "Toys"]),
    (
        &["wood", "timber"],
        ["Furniture", "Pallets", "Construction", "Packaging", "Natural"],
    ),
    (&["metal"], ["Cans", "Foils", "Wires", "Utensils", "Scrap"]),
    (&["glass"], ["Bottles", "Jars", "Windows", "Containers", "Broken"]),
    (
        &["textile", "cloth"],
        ["Cotton", "Denim", "Wool", "Synthetic", "Mixed"],
    ),
    (
        &["electronic", "e-waste"],
        ["Phones", "Computers", "Wires", "Batteries", "Appliances"],
    ),
    (
        &["paper", "cardboard"],
        ["Newspaper", "Cardboard", "Books", "Packaging", "Office"],
    ),
    (
        &["organic", "food"],
        ["Food Waste", "Garden Waste", "Agricultural", "Compost", "Mixed"],
    ),
    (
        &["rubber", "tire", "tyre"],
        ["Tires", "Footwear", "Industrial", "Tubes", "Mats"],
    ),
];

const GENERIC_CATEGORIES: [&str; 5] = ["Household", "Industrial", "Packaging", "Construction", "Mixed"];

pub fn default_categories(material: &str) -> Vec<String> {
    let lower = material.to_lowercase();
    let row = CATEGORY_TABLE
        .iter()
        .find(|(keys, _)| keys.iter().any(|key| lower.contains(key)))
        .map(|(_, categories)| categories)
        .unwrap_or(&GENERIC_CATEGORIES);
    row.iter().map(|s| s.to_string()).collect()
}
