//! Review endpoints
use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::cached_json;
use crate::services::reviews::CreateReviewRequest;
use crate::services::ReviewService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn create_review(
    service: web::Data<ReviewService>,
    user: AuthUser,
    req: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse> {
    let review_id = service.create(user.0.user_id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": "success",
        "reviewId": review_id,
    })))
}

pub async fn product_reviews(
    service: web::Data<ReviewService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let payload = service.for_product(path.into_inner()).await?;
    Ok(cached_json(payload))
}
