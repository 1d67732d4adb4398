use crate::upcycle::model::{CarbonResult, Unit};
use serde::Serialize;

/// Share of the discard emissions still attributed after upcycling.
pub const UPCYCLING_EFFICIENCY: f64 = 0.8;

pub const DEFAULT_EMISSION_KEY: &str = "mixed";

/// kg CO2 per kg of material. Matched by substring, first entry wins, so the
/// base materials sit ahead of the composite categories.
pub const EMISSION_FACTORS: &[(&str, f64)] = &[
    ("plastic", 2.5),
    ("paper", 0.8),
    ("metal", 1.8),
    ("glass", 0.9),
    ("textile", 3.0),
    ("electronic", 5.2),
    ("organic", 0.5),
    ("wood", 0.3),
    ("rubber", 2.2),
    // Composite categories carry estimated factors.
    ("furniture", 1.2),
    ("packaging", 1.0),
    ("construction", 0.6),
    (DEFAULT_EMISSION_KEY, 1.5),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonBreakdown {
    pub mass_kg: f64,
    pub factor_key: &'static str,
    pub emission_factor: f64,
    pub result: CarbonResult,
}

/// Round half-up to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn emission_factor_for(material: &str) -> (&'static str, f64) {
    let lower = material.to_lowercase();
    EMISSION_FACTORS
        .iter()
        .find(|(key, _)| lower.contains(key))
        .copied()
        .unwrap_or_else(default_factor)
}

fn default_factor() -> (&'static str, f64) {
    EMISSION_FACTORS
        .iter()
        .find(|(key, _)| *key == DEFAULT_EMISSION_KEY)
        .copied()
        .unwrap_or((DEFAULT_EMISSION_KEY, 1.5))
}

pub fn breakdown(material: &str, quantity: f64, unit: Unit) -> CarbonBreakdown {
    let mass_kg = quantity.max(0.0) * unit.kg_per_unit();
    let (factor_key, emission_factor) = emission_factor_for(material);
    let if_wasted = round1(emission_factor * mass_kg);
    let if_upcycled = round1(if_wasted * UPCYCLING_EFFICIENCY);
    CarbonBreakdown {
        mass_kg,
        factor_key,
        emission_factor,
        result: CarbonResult {
            if_wasted,
            if_upcycled,
        },
    }
}

pub fn compute(material: &str, quantity: f64, unit: Unit) -> CarbonResult {
    breakdown(material, quantity, unit).result
}

#[cfg(test)]
mod tests {
    use super::{
        EMISSION_FACTORS, UPCYCLING_EFFICIENCY, breakdown, compute, emission_factor_for, round1,
    };
    use crate::upcycle::model::Unit;

    #[test]
    fn pieces_convert_to_mass_before_factor() {
        let got = compute("plastic", 10.0, Unit::Pieces);
        assert_eq!(got.if_wasted, 1.3);
        assert_eq!(got.if_upcycled, 1.0);
    }

    #[test]
    fn wood_pallets_match_wood_factor() {
        let got = breakdown("wood pallets", 5.0, Unit::Kg);
        assert_eq!(got.factor_key, "wood");
        assert_eq!(got.emission_factor, 0.3);
        assert_eq!(got.result.if_wasted, 1.5);
        assert_eq!(got.result.if_upcycled, 1.2);
    }

    #[test]
    fn unknown_material_uses_mixed_default() {
        assert_eq!(emission_factor_for("Bamboo offcuts"), ("mixed", 1.5));
        let got = compute("bamboo", 2.0, Unit::Kg);
        assert_eq!(got.if_wasted, 3.0);
        assert_eq!(got.if_upcycled, 2.4);
    }

    #[test]
    fn composite_categories_follow_base_materials() {
        assert_eq!(emission_factor_for("old furniture"), ("furniture", 1.2));
        assert_eq!(emission_factor_for("Packaging waste"), ("packaging", 1.0));
        assert_eq!(emission_factor_for("construction debris"), ("construction", 0.6));
        let keys: Vec<_> = EMISSION_FACTORS.iter().map(|(key, _)| *key).collect();
        let rubber = keys.iter().position(|k| *k == "rubber").expect("rubber");
        let furniture = keys.iter().position(|k| *k == "furniture").expect("furniture");
        assert!(rubber < furniture);
    }

    #[test]
    fn first_table_entry_wins_on_overlap() {
        assert_eq!(emission_factor_for("plastic packaging").0, "plastic");
        assert_eq!(emission_factor_for("Wooden FURNITURE").0, "wood");
        assert_eq!(emission_factor_for("furniture foam").0, "furniture");
    }

    #[test]
    fn upcycled_is_rounded_fraction_of_wasted() {
        let units = [Unit::Kg, Unit::Pieces, Unit::Liters, Unit::Meters];
        let materials = ["plastic", "paper", "metal", "electronic", "rubber", "stone"];
        for material in materials {
            for unit in units {
                for quantity in [0.3, 1.0, 2.5, 7.0, 13.3, 120.0] {
                    let got = compute(material, quantity, unit);
                    assert!(got.if_wasted >= 0.0);
                    assert!(got.if_upcycled >= 0.0);
                    assert!(got.if_upcycled <= got.if_wasted);
                    assert_eq!(got.if_upcycled, round1(got.if_wasted * UPCYCLING_EFFICIENCY));
                }
            }
        }
    }

    #[test]
    fn liters_and_meters_use_fixed_densities() {
        assert_eq!(breakdown("glass", 4.0, Unit::Liters).mass_kg, 2.0);
        assert!((breakdown("textile", 10.0, Unit::Meters).mass_kg - 1.0).abs() < 1e-9);
    }
}
