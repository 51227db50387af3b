//! Catalog entities
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog product. `stock` is a derived aggregate kept in sync with
/// the variant documents; the variants are the source of truth once
/// they exist.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub stock: i32,
    pub remark: Option<String>,
    pub details: Option<String>,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub sub_sub_category_id: Option<Uuid>,
    pub slider_id: Option<Uuid>,
    pub campaign_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Product {
    /// Unit price after discount; an explicit override on the order
    /// line takes precedence over this.
    pub fn effective_price(&self) -> f64 {
        if self.discount > 0.0 {
            self.price - self.discount
        } else {
            self.price
        }
    }
}

/// Projection used in listings and the category tree
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub stock: i32,
    pub remark: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub sub_sub_category_id: Option<Uuid>,
}

/// Listing row joined with brand name and live variant stock total
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductListRow {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: f64,
    pub discount: f64,
    pub stock: i32,
    pub remark: Option<String>,
    pub brand_name: Option<String>,
    pub total_stock: i64,
}

/// Product detail page payload: the product with its variant documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDetail {
    pub product: Product,
    pub variants: Vec<crate::models::variant::ProductVariant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Slider {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub title: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, discount: f64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Shirt".into(),
            image: None,
            price,
            discount,
            stock: 10,
            remark: None,
            details: None,
            brand_id: None,
            category_id: None,
            sub_category_id: None,
            sub_sub_category_id: None,
            slider_id: None,
            campaign_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn effective_price_applies_discount_only_when_positive() {
        assert_eq!(product(100.0, 20.0).effective_price(), 80.0);
        assert_eq!(product(100.0, 0.0).effective_price(), 100.0);
    }
}
