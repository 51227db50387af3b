//! Cart repository
//!
//! Rows are owned by a user id or a guest id, never both. Owner
//! predicates use `IS NOT DISTINCT FROM` so NULL owner columns match
//! the way the rows were written.
use crate::auth::Identity;
use crate::db::Tx;
use crate::models::{CartItem, CartListItem};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields for a new cart row
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub product_id: Uuid,
    pub color: Option<String>,
    pub size: Option<String>,
    pub qty: i32,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

fn owner_columns(identity: &Identity) -> (Option<Uuid>, Option<&str>) {
    (identity.user_id(), identity.guest_id())
}

#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All rows for one owner, used by the pure merge planning in the
    /// cart service
    pub async fn items_for(&self, identity: &Identity) -> Result<Vec<CartItem>> {
        let (user_id, guest_id) = owner_columns(identity);

        let rows = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, product_id, user_id, guest_id, color, size, qty,
                   name, image, price, created_at, updated_at
            FROM cart_items
            WHERE user_id IS NOT DISTINCT FROM $1
              AND guest_id IS NOT DISTINCT FROM $2
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn increment_qty(&self, id: Uuid, by: i32) -> Result<()> {
        sqlx::query("UPDATE cart_items SET qty = qty + $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(by)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert(&self, identity: &Identity, item: &NewCartItem) -> Result<Uuid> {
        let (user_id, guest_id) = owner_columns(identity);

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO cart_items
                (product_id, user_id, guest_id, color, size, qty, name, image, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(item.product_id)
        .bind(user_id)
        .bind(guest_id)
        .bind(&item.color)
        .bind(&item.size)
        .bind(item.qty)
        .bind(&item.name)
        .bind(&item.image)
        .bind(item.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Delete one row, constrained to the caller's identity. The
    /// affected-rows count distinguishes nothing between "not there"
    /// and "not yours".
    pub async fn delete_owned(&self, id: Uuid, identity: &Identity) -> Result<u64> {
        let (user_id, guest_id) = owner_columns(identity);

        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE id = $1
              AND user_id IS NOT DISTINCT FROM $2
              AND guest_id IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(guest_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Joined cart listing for one owner
    pub async fn list_joined(&self, identity: &Identity) -> Result<Vec<CartListItem>> {
        let (user_id, guest_id) = owner_columns(identity);

        let rows = sqlx::query_as::<_, CartListItem>(
            r#"
            SELECT ci.id, ci.product_id, ci.color, ci.size, ci.qty, ci.image,
                   p.name AS product_name,
                   p.image AS product_image,
                   p.price AS product_price,
                   p.discount AS product_discount,
                   b.name AS brand_name,
                   c.name AS category_name,
                   ci.created_at, ci.updated_at
            FROM cart_items ci
            LEFT JOIN products p ON p.id = ci.product_id
            LEFT JOIN brands b ON b.id = p.brand_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE ci.user_id IS NOT DISTINCT FROM $1
              AND ci.guest_id IS NOT DISTINCT FROM $2
            ORDER BY ci.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(guest_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Reassign a guest row to the logged-in user in place
    pub async fn reassign_to_user(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE cart_items SET user_id = $2, guest_id = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Clear explicitly listed rows inside an order transaction
    pub async fn delete_by_ids(&self, tx: &mut Tx<'_>, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }

    /// Clear all rows for the owner inside an order transaction
    pub async fn delete_for_owner(&self, tx: &mut Tx<'_>, identity: &Identity) -> Result<u64> {
        let (user_id, guest_id) = owner_columns(identity);

        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE user_id IS NOT DISTINCT FROM $1
              AND guest_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(user_id)
        .bind(guest_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
