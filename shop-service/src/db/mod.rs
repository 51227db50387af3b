//! Database access layer and repositories
//!
//! Read paths use plain pool queries; every inventory-mutating path
//! takes an open transaction so the caller controls commit/abort as
//! one atomic unit.
pub mod cart_repo;
pub mod category_repo;
pub mod invoice_repo;
pub mod product_repo;
pub mod reference_repo;
pub mod review_repo;
pub mod sale_repo;
pub mod user_repo;
pub mod variant_repo;

/// Open transaction handle threaded through transactional mutations
pub type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

/// OFFSET for a 1-based page. Computed in i64 because page and
/// per_page arrive unvalidated from the query string.
pub(crate) fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * i64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::page_offset;

    #[test]
    fn page_offset_is_zero_based_and_clamps_page_zero() {
        assert_eq!(page_offset(0, 20), 0);
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn page_offset_survives_hostile_query_values() {
        assert_eq!(
            page_offset(u32::MAX, u32::MAX),
            (i64::from(u32::MAX) - 1) * i64::from(u32::MAX)
        );
    }
}
