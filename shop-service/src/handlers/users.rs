//! User profile endpoint
use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::cached_json;
use crate::services::UserService;
use actix_web::{web, HttpResponse};

pub async fn profile(service: web::Data<UserService>, user: AuthUser) -> Result<HttpResponse> {
    let payload = service.profile(user.0.user_id).await?;
    Ok(cached_json(payload))
}
