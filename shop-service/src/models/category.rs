//! Category hierarchy: category → subcategory → sub-subcategory, each
//! level carrying its directly-associated products. Products whose
//! sub-subcategory is null attach at the subcategory level; products
//! with no subcategory attach at the category level.
use crate::models::product::ProductSummary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subcategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SubSubcategory {
    pub id: Uuid,
    pub sub_category_id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSubcategoryNode {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubcategoryNode {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub products: Vec<ProductSummary>,
    pub subsubcategories: Vec<SubSubcategoryNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub products: Vec<ProductSummary>,
    pub subcategories: Vec<SubcategoryNode>,
}
