//! Cart entities
//!
//! A cart row is owned by exactly one of a registered user or a guest
//! session; the same product+color+size for the same owner merges
//! into a single row.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    pub guest_id: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub qty: i32,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Cart row joined with product, brand and category names
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartListItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub color: Option<String>,
    pub size: Option<String>,
    pub qty: i32,
    pub image: Option<String>,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub product_price: Option<f64>,
    pub product_discount: Option<f64>,
    pub brand_name: Option<String>,
    pub category_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Cached/returned shape of a cart listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartListResult {
    pub total: i64,
    pub data: Vec<CartListItem>,
}

impl CartListResult {
    pub fn empty() -> Self {
        Self {
            total: 0,
            data: Vec::new(),
        }
    }
}
