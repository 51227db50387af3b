//! Product variant stock model
//!
//! A variant document owns exactly one of three stock shapes. The
//! discriminated union makes an unknown scenario unrepresentable:
//! decrement and restore match exhaustively.
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// Which stock shape a request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioType {
    /// Per-color, per-size counts
    #[serde(rename = "scenario1")]
    SizedColor,
    /// Per-color counts
    #[serde(rename = "scenario2")]
    ColorOnly,
    /// Single flat count
    #[serde(rename = "scenario3")]
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeQty {
    pub size: String,
    pub qty: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSizes {
    pub color: String,
    pub sizes: Vec<SizeQty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorQty {
    pub color: String,
    pub qty: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatQty {
    pub qty: i32,
}

/// The tagged stock representation stored in the variant row's JSONB
/// column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenarioType", content = "entries")]
pub enum VariantStock {
    #[serde(rename = "scenario1")]
    SizedColor(Vec<ColorSizes>),
    #[serde(rename = "scenario2")]
    ColorOnly(Vec<ColorQty>),
    #[serde(rename = "scenario3")]
    Flat(Vec<FlatQty>),
}

impl VariantStock {
    pub fn scenario_type(&self) -> ScenarioType {
        match self {
            VariantStock::SizedColor(_) => ScenarioType::SizedColor,
            VariantStock::ColorOnly(_) => ScenarioType::ColorOnly,
            VariantStock::Flat(_) => ScenarioType::Flat,
        }
    }

    /// Sum of all slot quantities, used to keep the product's
    /// aggregate stock column in sync.
    pub fn total_qty(&self) -> i64 {
        match self {
            VariantStock::SizedColor(groups) => groups
                .iter()
                .flat_map(|g| g.sizes.iter())
                .map(|s| s.qty as i64)
                .sum(),
            VariantStock::ColorOnly(entries) => entries.iter().map(|e| e.qty as i64).sum(),
            VariantStock::Flat(entries) => entries.iter().map(|e| e.qty as i64).sum(),
        }
    }
}

/// One variant document of a product. A product may carry several,
/// typically one per scenario.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub stock: Json<VariantStock>,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization_round_trip() {
        let stock = VariantStock::SizedColor(vec![ColorSizes {
            color: "Red".into(),
            sizes: vec![SizeQty {
                size: "M".into(),
                qty: 5,
            }],
        }]);

        let json = serde_json::to_string(&stock).unwrap();
        assert!(json.contains("\"scenarioType\":\"scenario1\""));

        let back: VariantStock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stock);
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        let err = serde_json::from_str::<VariantStock>(
            r#"{"scenarioType":"scenario4","entries":[{"qty":1}]}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn total_qty_sums_every_slot() {
        let stock = VariantStock::SizedColor(vec![
            ColorSizes {
                color: "Red".into(),
                sizes: vec![
                    SizeQty { size: "M".into(), qty: 3 },
                    SizeQty { size: "L".into(), qty: 4 },
                ],
            },
            ColorSizes {
                color: "Blue".into(),
                sizes: vec![SizeQty { size: "S".into(), qty: 2 }],
            },
        ]);
        assert_eq!(stock.total_qty(), 9);

        let flat = VariantStock::Flat(vec![FlatQty { qty: 7 }]);
        assert_eq!(flat.total_qty(), 7);
    }
}
