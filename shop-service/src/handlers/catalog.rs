//! Catalog read endpoints
use crate::db::product_repo::ListingScope;
use crate::error::Result;
use crate::handlers::{cached_json, ListingQuery};
use crate::services::{CatalogService, CategoryTreeService};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn products_by_category(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    let payload = service
        .listing(
            ListingScope::Category(path.into_inner()),
            &query.search,
            query.page,
            query.per_page,
        )
        .await?;
    Ok(cached_json(payload))
}

pub async fn products_by_campaign(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    let payload = service
        .listing(
            ListingScope::Campaign(path.into_inner()),
            &query.search,
            query.page,
            query.per_page,
        )
        .await?;
    Ok(cached_json(payload))
}

pub async fn products_by_slider(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    let payload = service
        .listing(
            ListingScope::Slider(path.into_inner()),
            &query.search,
            query.page,
            query.per_page,
        )
        .await?;
    Ok(cached_json(payload))
}

/// Keyword search across the whole catalog
pub async fn search_products(
    service: web::Data<CatalogService>,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    let payload = service
        .listing(
            ListingScope::Search,
            &query.search,
            query.page,
            query.per_page,
        )
        .await?;
    Ok(cached_json(payload))
}

pub async fn products_by_remark(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let payload = service.by_remark(&path.into_inner()).await?;
    Ok(cached_json(payload))
}

pub async fn products_by_category_name(
    service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let payload = service.by_category_name(&path.into_inner()).await?;
    Ok(cached_json(payload))
}

pub async fn product_detail(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let payload = service.product_detail(path.into_inner()).await?;
    Ok(cached_json(payload))
}

pub async fn brands(service: web::Data<CatalogService>) -> Result<HttpResponse> {
    Ok(cached_json(service.brands().await?))
}

pub async fn sliders(service: web::Data<CatalogService>) -> Result<HttpResponse> {
    Ok(cached_json(service.sliders().await?))
}

pub async fn campaigns(service: web::Data<CatalogService>) -> Result<HttpResponse> {
    Ok(cached_json(service.campaigns().await?))
}

pub async fn category_tree(service: web::Data<CategoryTreeService>) -> Result<HttpResponse> {
    Ok(cached_json(service.tree().await?))
}
