//! Product reviews: cached listing, write-invalidate create
use crate::db::review_repo::ReviewRepository;
use crate::error::{AppError, Result};
use crate::models::ReviewView;
use crate::services::read_through::{read_through, CachedPayload};
use serde::Deserialize;
use shop_cache::{keys::ttl, keys::CacheKey, CacheOperations, ShopCache};
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: Uuid,
    pub rating: i16,
    pub comment: String,
}

#[derive(Clone)]
pub struct ReviewService {
    reviews: ReviewRepository,
    cache: ShopCache,
    read_timeout: Duration,
}

impl ReviewService {
    pub fn new(reviews: ReviewRepository, cache: ShopCache, read_timeout: Duration) -> Self {
        Self {
            reviews,
            cache,
            read_timeout,
        }
    }

    pub async fn create(&self, user_id: Uuid, req: CreateReviewRequest) -> Result<Uuid> {
        if !(1..=5).contains(&req.rating) {
            return Err(AppError::Validation(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        if req.comment.trim().is_empty() {
            return Err(AppError::Validation("comment is required".to_string()));
        }
        if !self.reviews.product_exists(req.product_id).await? {
            return Err(AppError::NotFound("product not found".to_string()));
        }

        let id = self
            .reviews
            .insert(req.product_id, user_id, req.rating, req.comment.trim())
            .await?;

        // The next listing read repopulates with the new review
        let key = CacheKey::reviews(req.product_id);
        if let Err(e) = self.cache.del(&key).await {
            warn!(key = %key, error = %e, "review cache invalidation failed");
        }

        Ok(id)
    }

    pub async fn for_product(&self, product_id: Uuid) -> Result<CachedPayload<Vec<ReviewView>>> {
        let key = CacheKey::reviews(product_id);
        let reviews = self.reviews.clone();

        read_through(
            &self.cache,
            &key,
            ttl::ENTITY,
            self.read_timeout,
            |rows: &Vec<ReviewView>| !rows.is_empty(),
            || async move { Ok(reviews.for_product(product_id).await?) },
        )
        .await
    }
}
