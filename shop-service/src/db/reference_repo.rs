//! Reference lists: brands, sliders, campaigns
use crate::models::{Brand, Campaign, Slider};
use anyhow::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn brands(&self) -> Result<Vec<Brand>> {
        let rows = sqlx::query_as::<_, Brand>(
            "SELECT id, name, image, created_at FROM brands ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn active_sliders(&self) -> Result<Vec<Slider>> {
        let rows = sqlx::query_as::<_, Slider>(
            r#"
            SELECT id, title, image, is_active, created_at
            FROM sliders
            WHERE is_active
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn active_campaigns(&self) -> Result<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, title, image, is_active, created_at
            FROM campaigns
            WHERE is_active
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
