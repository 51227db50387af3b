//! Sale entities: point-of-sale records and invoices promoted to
//! sales on delivery.
use crate::models::variant::ScenarioType;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// A scenario-typed stock request carried by a sale line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleVariantRequest {
    #[serde(rename = "scenarioType")]
    pub scenario_type: ScenarioType,
    pub color: Option<String>,
    pub size: Option<String>,
    pub qty: i32,
    pub unit_cost: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub variants: Vec<SaleVariantRequest>,
    pub total_qty: i32,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub items: Json<Vec<SaleItem>>,
    pub vat_tax: f64,
    pub discount: f64,
    pub other_cost: f64,
    pub shipping_cost: f64,
    pub grand_total: f64,
    pub note: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// grandTotal = subtotal + vat% of subtotal − discount + otherCost + shippingCost
pub fn grand_total(
    items: &[SaleItem],
    vat_tax_percent: f64,
    discount: f64,
    other_cost: f64,
    shipping_cost: f64,
) -> f64 {
    let subtotal: f64 = items.iter().map(|i| i.total_cost).sum();
    let vat_amount = vat_tax_percent / 100.0 * subtotal;
    subtotal + vat_amount - discount + other_cost + shipping_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(total_cost: f64) -> SaleItem {
        SaleItem {
            product_id: Uuid::new_v4(),
            product_name: "Shirt".into(),
            variants: Vec::new(),
            total_qty: 1,
            total_cost,
        }
    }

    #[test]
    fn grand_total_formula() {
        let items = vec![item(100.0), item(50.0)];
        // 150 + 15 (10% vat) - 20 + 5 + 10
        let total = grand_total(&items, 10.0, 20.0, 5.0, 10.0);
        assert!((total - 160.0).abs() < f64::EPSILON);
    }

    #[test]
    fn grand_total_without_extras_is_subtotal() {
        let items = vec![item(75.0)];
        assert_eq!(grand_total(&items, 0.0, 0.0, 0.0, 0.0), 75.0);
    }
}
