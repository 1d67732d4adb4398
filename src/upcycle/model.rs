use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of suggestions in every result set.
pub const SUGGESTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Pieces,
    Liters,
    Meters,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Pieces => "pieces",
            Unit::Liters => "liters",
            Unit::Meters => "meters",
        }
    }

    /// Kilograms represented by one unit of this kind.
    pub fn kg_per_unit(self) -> f64 {
        match self {
            Unit::Kg => 1.0,
            Unit::Pieces => 0.05,
            Unit::Liters => 0.5,
            Unit::Meters => 0.1,
        }
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(Unit::Kg),
            "pieces" | "piece" | "pcs" => Ok(Unit::Pieces),
            "liters" | "liter" | "litres" | "litre" | "l" => Ok(Unit::Liters),
            "meters" | "meter" | "metres" | "metre" | "m" => Ok(Unit::Meters),
            _ => Err(ValidationError::UnknownUnit(raw.to_string())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    Clean,
    Contaminated,
    Mixed,
    Damaged,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Clean => "clean",
            Condition::Contaminated => "contaminated",
            Condition::Mixed => "mixed",
            Condition::Damaged => "damaged",
        }
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clean" => Ok(Condition::Clean),
            "contaminated" => Ok(Condition::Contaminated),
            "mixed" => Ok(Condition::Mixed),
            "damaged" => Ok(Condition::Damaged),
            _ => Err(ValidationError::UnknownCondition(raw.to_string())),
        }
    }
}

/// Largest accepted quantity in any unit.
pub const MAX_QUANTITY: f64 = 1_000_000.0;

/// Quantity and unit checks shared by full requests and carbon-only lookups.
pub fn validate_measure(quantity: f64, unit: &str) -> Result<Unit, ValidationError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(ValidationError::InvalidQuantity(quantity));
    }
    if quantity > MAX_QUANTITY {
        return Err(ValidationError::QuantityTooLarge(quantity));
    }
    unit.parse::<Unit>()
}

/// Analysis input checked by [`MaterialRequest::new`]. Records read back from the
/// ledger deserialize without re-running those checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequest {
    material: String,
    category: String,
    quantity: f64,
    unit: Unit,
    #[serde(default)]
    condition: Condition,
}

impl MaterialRequest {
    pub fn new(
        material: &str,
        category: &str,
        quantity: f64,
        unit: &str,
        condition: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let material = material.trim();
        if material.is_empty() {
            return Err(ValidationError::EmptyMaterial);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        let unit = validate_measure(quantity, unit)?;
        let condition = match condition.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse::<Condition>()?,
            _ => Condition::default(),
        };

        Ok(Self {
            material: material.to_string(),
            category: category.to_string(),
            quantity,
            unit,
            condition,
        })
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }
}

/// kg CO2 emitted if the material is discarded vs. upcycled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonResult {
    pub if_wasted: f64,
    pub if_upcycled: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" | "easy" => Some(Difficulty::Beginner),
            "intermediate" | "medium" => Some(Difficulty::Intermediate),
            "advanced" | "hard" | "expert" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub product_name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_cost: u64,
    pub selling_price_range: String,
    pub earning_potential: String,
    pub carbon_savings: f64,
    pub market_demand: u8,
    pub roi: u32,
    pub time_required: String,
    pub materials_needed: Vec<String>,
    pub tools_required: Vec<String>,
    pub steps: Vec<String>,
    pub selling_platforms: Vec<String>,
    pub target_audience: String,
    pub success_rate: String,
    pub customer_rating: String,
}

/// Exactly [`SUGGESTION_COUNT`] suggestions with unique ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionSet([Suggestion; SUGGESTION_COUNT]);

impl SuggestionSet {
    /// Callers are responsible for id uniqueness; both producers in this crate
    /// assign positional ids.
    pub(crate) fn from_array(items: [Suggestion; SUGGESTION_COUNT]) -> Self {
        Self(items)
    }

    pub fn as_slice(&self) -> &[Suggestion] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Suggestion> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<'a> IntoIterator for &'a SuggestionSet {
    type Item = &'a Suggestion;
    type IntoIter = std::slice::Iter<'a, Suggestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Caller-facing result of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub carbon_footprint: f64,
    pub carbon_savings: f64,
    pub suggestions: SuggestionSet,
}

#[cfg(test)]
mod tests {
    use super::{Condition, Difficulty, MAX_QUANTITY, MaterialRequest, Unit};
    use crate::error::ValidationError;

    #[test]
    fn request_trims_and_defaults_condition() {
        let req = MaterialRequest::new("  plastic ", " Bottles", 2.0, "KG", None)
            .expect("valid request");
        assert_eq!(req.material(), "plastic");
        assert_eq!(req.category(), "Bottles");
        assert_eq!(req.unit(), Unit::Kg);
        assert_eq!(req.condition(), Condition::Clean);
    }

    #[test]
    fn request_rejects_blank_and_non_positive_fields() {
        assert_eq!(
            MaterialRequest::new(" ", "x", 1.0, "kg", None),
            Err(ValidationError::EmptyMaterial)
        );
        assert_eq!(
            MaterialRequest::new("glass", "", 1.0, "kg", None),
            Err(ValidationError::EmptyCategory)
        );
        assert!(matches!(
            MaterialRequest::new("glass", "Jars", 0.0, "kg", None),
            Err(ValidationError::InvalidQuantity(_))
        ));
        assert!(matches!(
            MaterialRequest::new("glass", "Jars", f64::NAN, "kg", None),
            Err(ValidationError::InvalidQuantity(_))
        ));
        assert!(matches!(
            MaterialRequest::new("glass", "Jars", 1e18, "kg", None),
            Err(ValidationError::QuantityTooLarge(_))
        ));
        assert!(MaterialRequest::new("glass", "Jars", MAX_QUANTITY, "kg", None).is_ok());
        assert_eq!(
            MaterialRequest::new("glass", "Jars", 1.0, "tons", None),
            Err(ValidationError::UnknownUnit("tons".to_string()))
        );
        assert_eq!(
            MaterialRequest::new("glass", "Jars", 1.0, "kg", Some("shiny")),
            Err(ValidationError::UnknownCondition("shiny".to_string()))
        );
    }

    #[test]
    fn difficulty_parse_is_case_insensitive() {
        assert_eq!(Difficulty::parse_loose("ADVANCED"), Some(Difficulty::Advanced));
        assert_eq!(Difficulty::parse_loose("medium"), Some(Difficulty::Intermediate));
        assert_eq!(Difficulty::parse_loose("legendary"), None);
    }

    #[test]
    fn unit_serializes_lowercase() {
        let raw = serde_json::to_string(&Unit::Liters).expect("serialize");
        assert_eq!(raw, "\"liters\"");
    }
}
