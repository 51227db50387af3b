//! User profile reads through the cache
use crate::db::user_repo::UserRepository;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::services::read_through::{read_through, CachedPayload};
use shop_cache::{keys::ttl, keys::CacheKey, ShopCache};
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    cache: ShopCache,
    read_timeout: Duration,
}

impl UserService {
    pub fn new(users: UserRepository, cache: ShopCache, read_timeout: Duration) -> Self {
        Self {
            users,
            cache,
            read_timeout,
        }
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<CachedPayload<UserProfile>> {
        let key = CacheKey::user(user_id);
        let users = self.users.clone();

        read_through(
            &self.cache,
            &key,
            ttl::ENTITY,
            self.read_timeout,
            |_: &UserProfile| true,
            || async move {
                users
                    .profile(user_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("user not found".to_string()))
            },
        )
        .await
    }
}
