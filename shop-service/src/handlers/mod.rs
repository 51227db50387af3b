//! HTTP handlers for the shop endpoints
//!
//! Handlers stay thin: extract identity and parameters, call the
//! service, wrap the result in the response envelope. Cached reads
//! report their provenance (`cached`, and `stale` on degraded
//! responses) so clients and dashboards can see cache behavior.
use crate::services::{CachedPayload, CacheStatus};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

pub mod cart;
pub mod catalog;
pub mod invoices;
pub mod reviews;
pub mod sales;
pub mod users;

/// Query parameters shared by the paginated listing endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    /// Search keyword; empty or "0" means unfiltered
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

/// Success envelope for cached reads
pub fn cached_json<T: Serialize>(payload: CachedPayload<T>) -> HttpResponse {
    let mut body = serde_json::json!({
        "status": "success",
        "cached": payload.status.is_cached(),
        "data": payload.data,
    });
    if payload.status == CacheStatus::Stale {
        body["stale"] = serde_json::Value::Bool(true);
    }
    if let Some(note) = payload.note {
        body["message"] = serde_json::Value::String(note.to_string());
    }
    HttpResponse::Ok().json(body)
}

/// Route table for the API scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .route("/search", web::get().to(catalog::search_products))
            .route(
                "/category/{category_id}",
                web::get().to(catalog::products_by_category),
            )
            .route(
                "/campaign/{campaign_id}",
                web::get().to(catalog::products_by_campaign),
            )
            .route(
                "/slider/{slider_id}",
                web::get().to(catalog::products_by_slider),
            )
            .route("/remark/{remark}", web::get().to(catalog::products_by_remark))
            .route(
                "/category-name/{name}",
                web::get().to(catalog::products_by_category_name),
            )
            .route("/{product_id}", web::get().to(catalog::product_detail)),
    )
    .route("/brands", web::get().to(catalog::brands))
    .route("/sliders", web::get().to(catalog::sliders))
    .route("/campaigns", web::get().to(catalog::campaigns))
    .route("/categories/tree", web::get().to(catalog::category_tree))
    .service(
        web::scope("/cart")
            .route("", web::get().to(cart::list_cart))
            .route("", web::post().to(cart::add_to_cart))
            .route("/migrate", web::post().to(cart::migrate_cart))
            .route("/{cart_item_id}", web::delete().to(cart::remove_from_cart)),
    )
    .service(
        web::scope("/invoices")
            .route("", web::post().to(invoices::create_invoice))
            .route(
                "/{invoice_id}/status",
                web::patch().to(invoices::update_invoice_status),
            ),
    )
    .service(
        web::scope("/sales")
            .route("", web::post().to(sales::create_sale))
            .route("", web::get().to(sales::list_sales))
            .route("/{sale_id}", web::delete().to(sales::delete_sale)),
    )
    .service(
        web::scope("/reviews")
            .route("", web::post().to(reviews::create_review))
            .route("/{product_id}", web::get().to(reviews::product_reviews)),
    )
    .route("/profile", web::get().to(users::profile));
}
