//! Cart endpoints
//!
//! Listing and adding accept anonymous callers; the add path mints a
//! guest id on first contact and returns it so the client can send it
//! back in the `guestid` header from then on.
use crate::auth::{AuthUser, Identity};
use crate::error::Result;
use crate::handlers::cached_json;
use crate::services::cart::AddToCartRequest;
use crate::services::CartService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

pub async fn list_cart(
    service: web::Data<CartService>,
    identity: Option<Identity>,
) -> Result<HttpResponse> {
    let payload = service.list(identity).await?;
    Ok(cached_json(payload))
}

pub async fn add_to_cart(
    service: web::Data<CartService>,
    identity: Option<Identity>,
    req: web::Json<AddToCartRequest>,
) -> Result<HttpResponse> {
    let outcome = service.add(identity, req.into_inner()).await?;

    let mut body = serde_json::json!({
        "status": "success",
        "cartItemId": outcome.cart_item_id,
        "merged": outcome.merged,
    });
    if let Some(guest_id) = outcome.minted_guest_id {
        body["guestId"] = serde_json::Value::String(guest_id);
    }
    Ok(HttpResponse::Created().json(body))
}

pub async fn remove_from_cart(
    service: web::Data<CartService>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.remove(&identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "success"})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateCartRequest {
    pub guest_id: String,
}

/// Fired after login; the merge runs detached so the login response
/// never waits on it.
pub async fn migrate_cart(
    service: web::Data<CartService>,
    user: AuthUser,
    req: web::Json<MigrateCartRequest>,
) -> Result<HttpResponse> {
    service.spawn_migrate(user.0.user_id, req.into_inner().guest_id);
    Ok(HttpResponse::Accepted().json(serde_json::json!({"status": "success"})))
}
