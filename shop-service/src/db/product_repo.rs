//! Product repository: listings, detail lookups and the row-locked
//! reads/aggregate-stock writes used inside order transactions.
use crate::db::Tx;
use crate::models::{Page, Product, ProductListRow, ProductSummary};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Live variant stock total per product, the SQL rendition of the
/// per-scenario quantity sums the listings expose as `total_stock`.
const TOTAL_STOCK_SQL: &str = r#"
    COALESCE((
        SELECT SUM(
            CASE v.stock->>'scenarioType'
                WHEN 'scenario1' THEN (
                    SELECT COALESCE(SUM((sz->>'qty')::int), 0)
                    FROM jsonb_array_elements(v.stock->'entries') AS g,
                         jsonb_array_elements(g->'sizes') AS sz
                )
                ELSE (
                    SELECT COALESCE(SUM((e->>'qty')::int), 0)
                    FROM jsonb_array_elements(v.stock->'entries') AS e
                )
            END)
        FROM product_variants v
        WHERE v.product_id = p.id
    ), 0)::bigint AS total_stock
"#;

/// Which catalog slice a paginated listing covers
#[derive(Debug, Clone)]
pub enum ListingScope {
    Category(Uuid),
    Remark(String),
    Campaign(Uuid),
    Slider(Uuid),
    Search,
}

impl ListingScope {
    fn where_clause(&self) -> &'static str {
        match self {
            ListingScope::Category(_) => "p.category_id = $1",
            ListingScope::Remark(_) => "p.remark = $1",
            ListingScope::Campaign(_) => "p.campaign_id = $1",
            ListingScope::Slider(_) => "p.slider_id = $1",
            // Search scopes filter purely on the keyword; the clause
            // still references $1 (bound NULL) so the placeholder
            // numbering stays stable across scopes.
            ListingScope::Search => "$1::uuid IS NULL",
        }
    }
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Paginated listing with brand name and live variant stock.
    /// `search` of "0" or "" means no keyword filter.
    pub async fn list(
        &self,
        scope: &ListingScope,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page<ProductListRow>> {
        // "0" is the wire convention for "no keyword". The pattern is
        // always bound, so the no-filter clause still names $2.
        let keyword_filter = if search.is_empty() || search == "0" {
            "$2::text IS NOT NULL"
        } else {
            "(p.name ILIKE $2 OR p.remark ILIKE $2)"
        };

        let rows_sql = format!(
            r#"
            SELECT p.id, p.name, p.image, p.price, p.discount, p.stock, p.remark,
                   b.name AS brand_name,
                   {total_stock}
            FROM products p
            LEFT JOIN brands b ON b.id = p.brand_id
            WHERE {scope} AND {keyword}
            ORDER BY p.created_at DESC
            OFFSET $3 LIMIT $4
            "#,
            total_stock = TOTAL_STOCK_SQL,
            scope = self.scope_sql(scope),
            keyword = keyword_filter,
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM products p WHERE {} AND {}",
            self.scope_sql(scope),
            keyword_filter,
        );

        let pattern = format!("%{}%", search);
        let offset = crate::db::page_offset(page, per_page);

        let rows = self
            .bind_scope(sqlx::query_as::<_, ProductListRow>(&rows_sql), scope)
            .bind(&pattern)
            .bind(offset)
            .bind(per_page as i64)
            .fetch_all(&self.pool)
            .await?;

        let (total,): (i64,) = self
            .bind_scope(sqlx::query_as(&count_sql), scope)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page { total, rows })
    }

    fn scope_sql(&self, scope: &ListingScope) -> &'static str {
        scope.where_clause()
    }

    fn bind_scope<'q, T>(
        &self,
        query: sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments>,
        scope: &'q ListingScope,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments> {
        match scope {
            ListingScope::Category(id)
            | ListingScope::Campaign(id)
            | ListingScope::Slider(id) => query.bind(*id),
            ListingScope::Remark(remark) => query.bind(remark.as_str()),
            // Keep the placeholder numbering stable
            ListingScope::Search => query.bind(Option::<Uuid>::None),
        }
    }

    pub async fn get(&self, product_id: Uuid) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, image, price, discount, stock, remark, details,
                   brand_id, category_id, sub_category_id, sub_sub_category_id,
                   slider_id, campaign_id, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Flat product list for one remark value (new arrival, trending...)
    pub async fn by_remark(&self, remark: &str, limit: i64) -> Result<Vec<ProductSummary>> {
        let rows = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT id, name, image, price, discount, stock, remark,
                   category_id, sub_category_id, sub_sub_category_id
            FROM products
            WHERE remark = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(remark)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Flat product list for a category referenced by name
    pub async fn by_category_name(&self, name: &str) -> Result<Vec<ProductSummary>> {
        let rows = sqlx::query_as::<_, ProductSummary>(
            r#"
            SELECT p.id, p.name, p.image, p.price, p.discount, p.stock, p.remark,
                   p.category_id, p.sub_category_id, p.sub_sub_category_id
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE LOWER(c.name) = LOWER($1)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Bulk fetch with row locks; orders read current stock before
    /// writing adjusted stock, inside the same transaction.
    pub async fn lock_many(&self, tx: &mut Tx<'_>, ids: &[Uuid]) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, image, price, discount, stock, remark, details,
                   brand_id, category_id, sub_category_id, sub_sub_category_id,
                   slider_id, campaign_id, created_at, updated_at
            FROM products
            WHERE id = ANY($1)
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(products)
    }

    pub async fn adjust_stock(&self, tx: &mut Tx<'_>, product_id: Uuid, delta: i32) -> Result<()> {
        sqlx::query(
            "UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_where_clauses() {
        let id = Uuid::new_v4();
        assert_eq!(
            ListingScope::Category(id).where_clause(),
            "p.category_id = $1"
        );
        assert_eq!(
            ListingScope::Remark("trending".into()).where_clause(),
            "p.remark = $1"
        );
        assert_eq!(ListingScope::Search.where_clause(), "$1::uuid IS NULL");
    }
}
