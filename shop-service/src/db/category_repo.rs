//! Category hierarchy reads feeding the cached tree.
use crate::models::category::{Category, SubSubcategory, Subcategory};
use crate::models::ProductSummary;
use anyhow::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn all_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, image FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn all_subcategories(&self) -> Result<Vec<Subcategory>> {
        let rows = sqlx::query_as::<_, Subcategory>(
            "SELECT id, category_id, name, image FROM subcategories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn all_subsubcategories(&self) -> Result<Vec<SubSubcategory>> {
        let rows = sqlx::query_as::<_, SubSubcategory>(
            "SELECT id, sub_category_id, name, image FROM subsubcategories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every product summary that references any level of the
    /// hierarchy; attachment happens in the tree builder.
    pub async fn all_categorized_products(&self) -> Result<Vec<ProductSummary>> {
        let rows = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT id, name, image, price, discount, stock, remark,
                   category_id, sub_category_id, sub_sub_category_id
            FROM products
            WHERE category_id IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
