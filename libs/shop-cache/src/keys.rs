//! Cache key schema
//!
//! All services must build keys through these generators. The literal
//! formats are frozen: the previous implementation wrote the same keys
//! and mixed deployments read each other's entries.

use uuid::Uuid;

/// Fixed key holding the whole category tree. Invalidated by any
/// category, subcategory, sub-subcategory or product mutation.
pub const CATEGORY_TREE_KEY: &str = "ALL_CATEGORY_WITH_SUBS_TREE";

/// Per-entity TTLs (seconds)
pub mod ttl {
    /// Cart data changes frequently
    pub const CART: u64 = 2 * 60;
    /// Paginated listings, sliders and product detail
    pub const LISTING: u64 = 5 * 60;
    /// Category tree, campaigns, reviews, user profile
    pub const ENTITY: u64 = 10 * 60;
    /// Simple reference lists (brands)
    pub const REFERENCE: u64 = 15 * 60;
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Format: cart:user_{id}
    pub fn cart_user(user_id: Uuid) -> String {
        format!("cart:user_{}", user_id)
    }

    /// Format: cart:guest_{id}
    pub fn cart_guest(guest_id: &str) -> String {
        format!("cart:guest_{}", guest_id)
    }

    /// Format: product:{id}
    pub fn product(product_id: Uuid) -> String {
        format!("product:{}", product_id)
    }

    /// Format: reviews:{productId}
    pub fn reviews(product_id: Uuid) -> String {
        format!("reviews:{}", product_id)
    }

    /// Format: remark:{value}
    pub fn remark(remark: &str) -> String {
        format!("remark:{}", remark)
    }

    /// Format: category:{name}
    pub fn category_name(name: &str) -> String {
        format!("category:{}", name)
    }

    /// Format: user:{id}
    pub fn user(user_id: Uuid) -> String {
        format!("user:{}", user_id)
    }

    /// Format: all_brands:{collection}
    pub fn reference_list(collection: &str) -> String {
        format!("all_brands:{}", collection)
    }

    /// Format: all_sliders:active
    pub fn sliders() -> String {
        "all_sliders:active".to_string()
    }

    /// Format: all_campaigns:active
    pub fn campaigns() -> String {
        "all_campaigns:active".to_string()
    }

    /// Paginated listing key.
    /// Format: {prefix}:{qualifier}_{search}_{page}_{perPage}
    ///
    /// The search keyword uses "0" for "no search" so that the same
    /// logical query always canonicalizes to the same key.
    pub fn listing(prefix: ListingPrefix, qualifier: &str, search: &str, page: u32, per_page: u32) -> String {
        let search = if search.is_empty() { "0" } else { search };
        format!("{}:{}_{}_{}_{}", prefix.as_str(), qualifier, search, page, per_page)
    }
}

/// Namespaces for paginated product listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingPrefix {
    Category,
    Remark,
    Campaign,
    Slider,
    Search,
}

impl ListingPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingPrefix::Category => "all_category",
            ListingPrefix::Remark => "all_remark",
            ListingPrefix::Campaign => "all_campaign",
            ListingPrefix::Slider => "all_slider",
            ListingPrefix::Search => "all_search",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_keys() {
        let user_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            CacheKey::cart_user(user_id),
            "cart:user_550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(CacheKey::cart_guest("abc123"), "cart:guest_abc123");
    }

    #[test]
    fn listing_key_canonicalizes_empty_search() {
        let a = CacheKey::listing(ListingPrefix::Category, "cat1", "", 1, 20);
        let b = CacheKey::listing(ListingPrefix::Category, "cat1", "0", 1, 20);
        assert_eq!(a, b);
        assert_eq!(a, "all_category:cat1_0_1_20");
    }

    #[test]
    fn listing_prefixes() {
        assert_eq!(
            CacheKey::listing(ListingPrefix::Search, "q", "shoes", 2, 10),
            "all_search:q_shoes_2_10"
        );
        assert_eq!(ListingPrefix::Remark.as_str(), "all_remark");
    }

    #[test]
    fn entity_keys() {
        let id = Uuid::parse_str("660e8400-e29b-41d4-a716-446655440001").unwrap();
        assert_eq!(CacheKey::product(id), format!("product:{}", id));
        assert_eq!(CacheKey::reviews(id), format!("reviews:{}", id));
        assert_eq!(CacheKey::reference_list("brands"), "all_brands:brands");
    }
}
