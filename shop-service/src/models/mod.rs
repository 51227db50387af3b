//! Data structures for the shop service
pub mod cart;
pub mod category;
pub mod invoice;
pub mod product;
pub mod review;
pub mod sale;
pub mod user;
pub mod variant;

pub use cart::{CartItem, CartListItem, CartListResult};
pub use category::{Category, CategoryNode, SubSubcategory, SubSubcategoryNode, Subcategory, SubcategoryNode};
pub use invoice::{DeliveryStatus, Invoice, InvoiceLine};
pub use product::{Brand, Campaign, Product, ProductDetail, ProductListRow, ProductSummary, Slider};
pub use review::{Review, ReviewView};
pub use sale::{Sale, SaleItem, SaleVariantRequest};
pub use user::UserProfile;
pub use variant::{ColorQty, ColorSizes, FlatQty, ProductVariant, ScenarioType, SizeQty, VariantStock};

use serde::{Deserialize, Serialize};

/// Paginated query result shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: i64,
    pub rows: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
