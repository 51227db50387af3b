//! Catalog reads: paginated listings, product detail, remark shelves
//! and reference lists. Every read goes through the cache-aside path;
//! paginated listings and detail pages use short TTLs, reference
//! lists the long one.
use crate::db::product_repo::{ListingScope, ProductRepository};
use crate::db::reference_repo::ReferenceRepository;
use crate::db::variant_repo::VariantRepository;
use crate::error::{AppError, Result};
use crate::models::{Brand, Campaign, Page, ProductDetail, ProductListRow, ProductSummary, Slider};
use crate::services::read_through::{read_through, CachedPayload};
use shop_cache::keys::{ttl, CacheKey, ListingPrefix};
use shop_cache::ShopCache;
use std::time::Duration;
use uuid::Uuid;

/// Default shelf size for remark lists (original fixed limit)
const REMARK_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
    variants: VariantRepository,
    reference: ReferenceRepository,
    cache: ShopCache,
    read_timeout: Duration,
}

impl CatalogService {
    pub fn new(
        products: ProductRepository,
        variants: VariantRepository,
        reference: ReferenceRepository,
        cache: ShopCache,
        read_timeout: Duration,
    ) -> Self {
        Self {
            products,
            variants,
            reference,
            cache,
            read_timeout,
        }
    }

    /// Paginated listing for one catalog slice. The cache key embeds
    /// prefix, qualifier, canonicalized search keyword and the page
    /// window, so every distinct query caches independently.
    pub async fn listing(
        &self,
        scope: ListingScope,
        search: &str,
        page: u32,
        per_page: u32,
    ) -> Result<CachedPayload<Page<ProductListRow>>> {
        let (prefix, qualifier) = match &scope {
            ListingScope::Category(id) => (ListingPrefix::Category, id.to_string()),
            ListingScope::Remark(remark) => (ListingPrefix::Remark, remark.clone()),
            ListingScope::Campaign(id) => (ListingPrefix::Campaign, id.to_string()),
            ListingScope::Slider(id) => (ListingPrefix::Slider, id.to_string()),
            ListingScope::Search => (ListingPrefix::Search, "q".to_string()),
        };
        let key = CacheKey::listing(prefix, &qualifier, search, page, per_page);

        let products = self.products.clone();
        let search = search.to_string();
        read_through(
            &self.cache,
            &key,
            ttl::LISTING,
            self.read_timeout,
            |page: &Page<ProductListRow>| !page.is_empty(),
            || async move { Ok(products.list(&scope, &search, page, per_page).await?) },
        )
        .await
    }

    /// Product detail: the product with its variant documents
    pub async fn product_detail(&self, product_id: Uuid) -> Result<CachedPayload<ProductDetail>> {
        let key = CacheKey::product(product_id);
        let products = self.products.clone();
        let variants = self.variants.clone();

        read_through(
            &self.cache,
            &key,
            ttl::LISTING,
            self.read_timeout,
            |_: &ProductDetail| true,
            || async move {
                let product = products
                    .get(product_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;
                let variants = variants.for_product(product_id).await?;
                Ok(ProductDetail { product, variants })
            },
        )
        .await
    }

    /// Fixed-size shelf of products sharing a remark tag
    pub async fn by_remark(&self, remark: &str) -> Result<CachedPayload<Vec<ProductSummary>>> {
        let key = CacheKey::remark(remark);
        let products = self.products.clone();
        let remark = remark.to_string();

        read_through(
            &self.cache,
            &key,
            ttl::LISTING,
            self.read_timeout,
            |rows: &Vec<ProductSummary>| !rows.is_empty(),
            || async move { Ok(products.by_remark(&remark, REMARK_LIMIT).await?) },
        )
        .await
    }

    /// All products of a category addressed by its name
    pub async fn by_category_name(&self, name: &str) -> Result<CachedPayload<Vec<ProductSummary>>> {
        let key = CacheKey::category_name(name);
        let products = self.products.clone();
        let name = name.to_string();

        read_through(
            &self.cache,
            &key,
            ttl::LISTING,
            self.read_timeout,
            |rows: &Vec<ProductSummary>| !rows.is_empty(),
            || async move { Ok(products.by_category_name(&name).await?) },
        )
        .await
    }

    pub async fn brands(&self) -> Result<CachedPayload<Vec<Brand>>> {
        let key = CacheKey::reference_list("brands");
        let reference = self.reference.clone();

        read_through(
            &self.cache,
            &key,
            ttl::REFERENCE,
            self.read_timeout,
            |rows: &Vec<Brand>| !rows.is_empty(),
            || async move { Ok(reference.brands().await?) },
        )
        .await
    }

    pub async fn sliders(&self) -> Result<CachedPayload<Vec<Slider>>> {
        let key = CacheKey::sliders();
        let reference = self.reference.clone();

        read_through(
            &self.cache,
            &key,
            ttl::LISTING,
            self.read_timeout,
            |rows: &Vec<Slider>| !rows.is_empty(),
            || async move { Ok(reference.active_sliders().await?) },
        )
        .await
    }

    pub async fn campaigns(&self) -> Result<CachedPayload<Vec<Campaign>>> {
        let key = CacheKey::campaigns();
        let reference = self.reference.clone();

        read_through(
            &self.cache,
            &key,
            ttl::ENTITY,
            self.read_timeout,
            |rows: &Vec<Campaign>| !rows.is_empty(),
            || async move { Ok(reference.active_campaigns().await?) },
        )
        .await
    }
}
