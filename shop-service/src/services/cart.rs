//! Cart operations
//!
//! Reads go through the cache-aside path under the owner's cart key;
//! empty carts are cached too, since "empty" is the common state for
//! fresh visitors. Mutations write the store first and then delete
//! the owner's key synchronously, so the next read never observes the
//! pre-mutation cart.
use crate::auth::{mint_guest_id, Identity};
use crate::db::cart_repo::{CartRepository, NewCartItem};
use crate::error::{AppError, Result};
use crate::models::{CartItem, CartListResult};
use crate::services::read_through::{read_through, CachedPayload, CacheStatus};
use serde::Deserialize;
use shop_cache::{keys::ttl, CacheOperations, ShopCache};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub qty: i32,
    pub color: Option<String>,
    pub size: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

/// Outcome of an add: the row touched plus, for first-time anonymous
/// visitors, the freshly minted guest id the client must persist.
#[derive(Debug, Clone)]
pub struct AddToCartOutcome {
    pub cart_item_id: Uuid,
    pub merged: bool,
    pub minted_guest_id: Option<String>,
}

/// One guest row's fate during migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStep {
    /// An equivalent user row exists: its qty absorbs the guest row
    Merge {
        guest_row: Uuid,
        user_row: Uuid,
        qty: i32,
    },
    /// No equivalent: the guest row changes owner in place
    Reassign { guest_row: Uuid },
}

/// The owner's existing row for product+color+size, if any. Color and
/// size match as exact optional equality, mirroring how rows were
/// keyed when they were written.
pub fn find_merge_target<'a>(
    rows: &'a [CartItem],
    product_id: Uuid,
    color: Option<&str>,
    size: Option<&str>,
) -> Option<&'a CartItem> {
    rows.iter().find(|row| {
        row.product_id == product_id
            && row.color.as_deref() == color
            && row.size.as_deref() == size
    })
}

/// Decide every guest row's fate against the user's current cart
pub fn migration_plan(guest_rows: &[CartItem], user_rows: &[CartItem]) -> Vec<MigrationStep> {
    guest_rows
        .iter()
        .map(|row| {
            match find_merge_target(
                user_rows,
                row.product_id,
                row.color.as_deref(),
                row.size.as_deref(),
            ) {
                Some(user_row) => MigrationStep::Merge {
                    guest_row: row.id,
                    user_row: user_row.id,
                    qty: row.qty,
                },
                None => MigrationStep::Reassign { guest_row: row.id },
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct CartService {
    carts: CartRepository,
    cache: ShopCache,
    read_timeout: Duration,
}

impl CartService {
    pub fn new(carts: CartRepository, cache: ShopCache, read_timeout: Duration) -> Self {
        Self {
            carts,
            cache,
            read_timeout,
        }
    }

    /// Cart listing for the resolved owner. No identity at all means
    /// an empty cart, not an error; the store is never touched.
    pub async fn list(&self, identity: Option<Identity>) -> Result<CachedPayload<CartListResult>> {
        let Some(identity) = identity else {
            return Ok(CachedPayload {
                data: CartListResult::empty(),
                status: CacheStatus::Fresh,
                note: None,
            });
        };

        let key = identity.cart_cache_key();
        let carts = self.carts.clone();

        read_through(
            &self.cache,
            &key,
            ttl::CART,
            self.read_timeout,
            // Empty carts are cached as well
            |_: &CartListResult| true,
            || async move {
                let data = carts.list_joined(&identity).await?;
                Ok(CartListResult {
                    total: data.len() as i64,
                    data,
                })
            },
        )
        .await
    }

    /// Add a product to the cart, merging into an existing row when
    /// the owner already carries the same product+color+size.
    pub async fn add(
        &self,
        identity: Option<Identity>,
        req: AddToCartRequest,
    ) -> Result<AddToCartOutcome> {
        if req.qty < 1 {
            return Err(AppError::Validation("qty must be at least 1".to_string()));
        }

        let (identity, minted_guest_id) = match identity {
            Some(identity) => (identity, None),
            None => {
                let guest_id = mint_guest_id();
                (Identity::Guest(guest_id.clone()), Some(guest_id))
            }
        };

        let rows = self.carts.items_for(&identity).await?;
        let existing =
            find_merge_target(&rows, req.product_id, req.color.as_deref(), req.size.as_deref());

        let outcome = match existing {
            Some(row) => {
                self.carts.increment_qty(row.id, req.qty).await?;
                AddToCartOutcome {
                    cart_item_id: row.id,
                    merged: true,
                    minted_guest_id,
                }
            }
            None => {
                let id = self
                    .carts
                    .insert(
                        &identity,
                        &NewCartItem {
                            product_id: req.product_id,
                            color: req.color,
                            size: req.size,
                            qty: req.qty,
                            name: req.name,
                            image: req.image,
                            price: req.price,
                        },
                    )
                    .await?;
                AddToCartOutcome {
                    cart_item_id: id,
                    merged: false,
                    minted_guest_id,
                }
            }
        };

        self.invalidate(&identity).await;
        Ok(outcome)
    }

    /// Remove one row; ownership is enforced by the delete predicate,
    /// so someone else's row reads as not found.
    pub async fn remove(&self, identity: &Identity, cart_item_id: Uuid) -> Result<()> {
        let deleted = self.carts.delete_owned(cart_item_id, identity).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(
                "cart item not found or not yours".to_string(),
            ));
        }

        self.invalidate(identity).await;
        Ok(())
    }

    /// Merge a guest cart into the freshly logged-in user's cart.
    /// Runs after login; failures are logged, never surfaced, because
    /// the login itself already succeeded.
    pub async fn migrate_guest_cart(&self, user_id: Uuid, guest_id: &str) -> Result<u64> {
        let guest_rows = self
            .carts
            .items_for(&Identity::Guest(guest_id.to_string()))
            .await?;
        let user_rows = self.carts.items_for(&Identity::User(user_id)).await?;

        let plan = migration_plan(&guest_rows, &user_rows);
        let moved = plan.len() as u64;

        for step in plan {
            match step {
                MigrationStep::Merge {
                    guest_row,
                    user_row,
                    qty,
                } => {
                    self.carts.increment_qty(user_row, qty).await?;
                    self.carts.delete(guest_row).await?;
                }
                MigrationStep::Reassign { guest_row } => {
                    self.carts.reassign_to_user(guest_row, user_id).await?
                }
            }
        }

        self.invalidate(&Identity::Guest(guest_id.to_string())).await;
        self.invalidate(&Identity::User(user_id)).await;

        if moved > 0 {
            info!(%user_id, moved, "guest cart merged into user cart");
        }
        Ok(moved)
    }

    /// Detached migration for the login path, which must not block
    pub fn spawn_migrate(&self, user_id: Uuid, guest_id: String) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.migrate_guest_cart(user_id, &guest_id).await {
                warn!(%user_id, error = %e, "guest cart migration failed");
            }
        });
    }

    /// Synchronous cache delete; a failure is logged and tolerated
    /// because the short cart TTL bounds the staleness window.
    async fn invalidate(&self, identity: &Identity) {
        let key = identity.cart_cache_key();
        if let Err(e) = self.cache.del(&key).await {
            warn!(key = %key, error = %e, "cart cache invalidation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(product_id: Uuid, color: Option<&str>, size: Option<&str>, qty: i32) -> CartItem {
        CartItem {
            id: Uuid::new_v4(),
            product_id,
            user_id: None,
            guest_id: None,
            color: color.map(String::from),
            size: size.map(String::from),
            qty,
            name: None,
            image: None,
            price: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn repeat_add_merges_into_one_row() {
        let product = Uuid::new_v4();
        let mut rows: Vec<CartItem> = Vec::new();

        // First add finds no target, so a row is inserted
        assert!(find_merge_target(&rows, product, Some("red"), Some("M")).is_none());
        rows.push(row(product, Some("red"), Some("M"), 2));

        // Second add of the same line lands on that row: 2 + 3 = 5
        let target = find_merge_target(&rows, product, Some("red"), Some("M"))
            .expect("second add should merge");
        assert_eq!(target.qty + 3, 5);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn merge_matching_is_exact_on_color_and_size() {
        let product = Uuid::new_v4();
        let rows = vec![row(product, Some("red"), Some("M"), 1)];

        assert!(find_merge_target(&rows, product, Some("red"), Some("L")).is_none());
        assert!(find_merge_target(&rows, product, None, Some("M")).is_none());
        assert!(find_merge_target(&rows, Uuid::new_v4(), Some("red"), Some("M")).is_none());
    }

    #[test]
    fn migration_merges_equivalents_and_reassigns_the_rest() {
        let shared = Uuid::new_v4();
        let guest_only = Uuid::new_v4();
        let guest_rows = vec![
            row(shared, Some("red"), Some("M"), 2),
            row(guest_only, None, None, 1),
        ];
        let user_rows = vec![row(shared, Some("red"), Some("M"), 3)];

        let plan = migration_plan(&guest_rows, &user_rows);
        assert_eq!(
            plan,
            vec![
                MigrationStep::Merge {
                    guest_row: guest_rows[0].id,
                    user_row: user_rows[0].id,
                    qty: 2,
                },
                MigrationStep::Reassign {
                    guest_row: guest_rows[1].id,
                },
            ]
        );
    }

    #[test]
    fn migrating_an_empty_guest_cart_plans_nothing() {
        let user_rows = vec![row(Uuid::new_v4(), None, None, 1)];
        assert!(migration_plan(&[], &user_rows).is_empty());
    }
}
