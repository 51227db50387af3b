//! Sale repository: POS records and invoice-derived sales.
use crate::db::Tx;
use crate::models::{Page, Sale, SaleItem};
use anyhow::Result;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields for a new sale record
#[derive(Debug, Clone)]
pub struct NewSale {
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub items: Vec<SaleItem>,
    pub vat_tax: f64,
    pub discount: f64,
    pub other_cost: f64,
    pub shipping_cost: f64,
    pub grand_total: f64,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, tx: &mut Tx<'_>, sale: &NewSale) -> Result<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO sales
                (user_id, customer_id, customer_name, items, vat_tax, discount,
                 other_cost, shipping_cost, grand_total, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(sale.user_id)
        .bind(sale.customer_id)
        .bind(&sale.customer_name)
        .bind(Json(&sale.items))
        .bind(sale.vat_tax)
        .bind(sale.discount)
        .bind(sale.other_cost)
        .bind(sale.shipping_cost)
        .bind(sale.grand_total)
        .bind(&sale.note)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    /// Paginated sale listing, newest first, with keyword search over
    /// customer name, product names and the note.
    pub async fn list(&self, search: &str, page: u32, per_page: u32) -> Result<Page<Sale>> {
        // The pattern is always bound as $1, so even the no-search
        // branch has to reference the placeholder.
        let filter = if search.is_empty() || search == "0" {
            "$1::text IS NOT NULL"
        } else {
            r#"(customer_name ILIKE $1
                OR note ILIKE $1
                OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(items) AS it
                    WHERE it->>'product_name' ILIKE $1
                ))"#
        };

        let rows_sql = format!(
            r#"
            SELECT id, user_id, customer_id, customer_name, items, vat_tax,
                   discount, other_cost, shipping_cost, grand_total, note, created_at
            FROM sales
            WHERE {filter}
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        );
        let count_sql = format!("SELECT COUNT(*) FROM sales WHERE {filter}");

        let pattern = format!("%{}%", search);
        let offset = crate::db::page_offset(page, per_page);

        let rows = sqlx::query_as::<_, Sale>(&rows_sql)
            .bind(&pattern)
            .bind(offset)
            .bind(per_page as i64)
            .fetch_all(&self.pool)
            .await?;

        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page { total, rows })
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
