//! Variant repository: JSONB stock documents with row-locked reads
//! for the decrement/restore transactions.
use crate::db::Tx;
use crate::models::variant::{ProductVariant, VariantStock};
use anyhow::Result;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct VariantRepository {
    pool: PgPool,
}

impl VariantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_product(&self, product_id: Uuid) -> Result<Vec<ProductVariant>> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, stock, image, created_at, updated_at
            FROM product_variants
            WHERE product_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(variants)
    }

    /// All variant documents of a product, row-locked for the
    /// duration of the enclosing transaction. The stable ordering
    /// keeps lock acquisition deterministic across concurrent orders.
    pub async fn lock_for_product(
        &self,
        tx: &mut Tx<'_>,
        product_id: Uuid,
    ) -> Result<Vec<ProductVariant>> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, stock, image, created_at, updated_at
            FROM product_variants
            WHERE product_id = $1
            ORDER BY created_at
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(variants)
    }

    pub async fn save_stock(
        &self,
        tx: &mut Tx<'_>,
        variant_id: Uuid,
        stock: &VariantStock,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE product_variants SET stock = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(variant_id)
        .bind(Json(stock))
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
