//! Review repository
use crate::models::ReviewView;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn product_exists(&self, product_id: Uuid) -> Result<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    pub async fn insert(
        &self,
        product_id: Uuid,
        user_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> Result<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO reviews (product_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn for_product(&self, product_id: Uuid) -> Result<Vec<ReviewView>> {
        let rows = sqlx::query_as::<_, ReviewView>(
            r#"
            SELECT r.id, r.product_id, r.rating, r.comment,
                   TRIM(CONCAT(u.first_name, ' ', u.last_name)) AS reviewer_name,
                   r.created_at
            FROM reviews r
            LEFT JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
