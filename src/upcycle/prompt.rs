use crate::upcycle::model::{SUGGESTION_COUNT, Unit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const SUGGESTION_OPTIONS: GenerateOptions = GenerateOptions {
    temperature: 0.7,
    max_tokens: 2048,
};

pub const CATEGORY_OPTIONS: GenerateOptions = GenerateOptions {
    temperature: 0.3,
    max_tokens: 500,
};

pub const MIN_CATEGORIES: usize = 3;
pub const MAX_CATEGORIES: usize = 5;

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

pub fn build_suggestion_prompt(material: &str, category: &str, quantity: f64, unit: Unit) -> String {
    let qty = format_quantity(quantity);
    format!(
        "Return ONLY valid JSON. No prose, no markdown, no code fences.\n\
You are an upcycling specialist for the Indian market. Propose {count} practical upcycling product ideas for {qty} {unit} of {material} (category: {category}).\n\
\n\
Use exactly this shape:\n\
{{\n\
  \"suggestions\": [\n\
    {{\n\
      \"id\": \"1\",\n\
      \"productName\": \"short product name\",\n\
      \"description\": \"2-3 sentences on what it is and who buys it\",\n\
      \"difficulty\": \"Beginner\",\n\
      \"estimatedCost\": 150,\n\
      \"sellingPriceRange\": \"₹200-500\",\n\
      \"earningPotential\": \"₹50-350\",\n\
      \"carbonSavings\": 8.5,\n\
      \"marketDemand\": 85,\n\
      \"roi\": 150,\n\
      \"timeRequired\": \"2-3 hours\",\n\
      \"materialsNeeded\": [\"{material} {category}\", \"material 2\", \"material 3\"],\n\
      \"toolsRequired\": [\"tool 1\", \"tool 2\"],\n\
      \"steps\": [\"Step 1\", \"Step 2\", \"Step 3\", \"Step 4\", \"Step 5\"],\n\
      \"sellingPlatforms\": [\"Amazon India\", \"Flipkart\", \"Local Markets\"],\n\
      \"targetAudience\": \"specific customer segment\",\n\
      \"successRate\": \"85%\",\n\
      \"customerRating\": \"4.5/5\"\n\
    }}\n\
  ]\n\
}}\n\
\n\
Rules:\n\
- exactly {count} entries, one each of Beginner, Intermediate, Advanced\n\
- estimatedCost is a positive whole number in rupees\n\
- carbonSavings between 2 and 15 (kg CO2)\n\
- marketDemand between 50 and 95 (percent)\n\
- roi between 80 and 300 (percent)\n\
- 5 sequential, actionable steps\n\
- platforms such as Amazon India, Flipkart, Meesho, OLX\n\
- every idea specific to {material} {category}\n",
        count = SUGGESTION_COUNT,
        qty = qty,
        unit = unit.as_str(),
        material = material,
        category = category,
    )
}

pub fn build_category_prompt(material: &str) -> String {
    format!(
        "Return ONLY valid JSON. No prose, no markdown, no code fences.\n\
You are a waste management and recycling expert. List the {min}-{max} most relevant waste categories of \"{material}\" for upcycling analysis.\n\
\n\
Use exactly this shape:\n\
{{\"categories\": [\"Category 1\", \"Category 2\", \"Category 3\"]}}\n\
\n\
Examples:\n\
- plastic: [\"Bottles\", \"Containers\", \"Bags\", \"Packaging\", \"Toys\"]\n\
- wood: [\"Furniture\", \"Pallets\", \"Construction\", \"Packaging\", \"Natural\"]\n",
        min = MIN_CATEGORIES,
        max = MAX_CATEGORIES,
        material = material,
    )
}

#[cfg(test)]
mod tests {
    use super::{build_category_prompt, build_suggestion_prompt};
    use crate::upcycle::model::Unit;

    #[test]
    fn suggestion_prompt_is_pure_and_mentions_inputs() {
        let a = build_suggestion_prompt("glass", "Jars", 12.0, Unit::Pieces);
        let b = build_suggestion_prompt("glass", "Jars", 12.0, Unit::Pieces);
        assert_eq!(a, b);
        assert!(a.contains("12 pieces of glass (category: Jars)"));
        assert!(a.contains("exactly 3 entries"));
        assert!(a.contains("\"suggestions\": ["));
        assert!(a.contains("carbonSavings between 2 and 15"));
    }

    #[test]
    fn fractional_quantity_is_kept() {
        let got = build_suggestion_prompt("paper", "Cardboard", 2.5, Unit::Kg);
        assert!(got.contains("2.5 kg of paper"));
    }

    #[test]
    fn category_prompt_asks_for_categories_key() {
        let got = build_category_prompt("rubber");
        assert!(got.contains("\"rubber\""));
        assert!(got.contains("{\"categories\": ["));
        assert!(got.contains("3-5"));
    }
}
