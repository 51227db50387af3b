//! Point-of-sale endpoints, admin only
use crate::auth::AdminUser;
use crate::error::Result;
use crate::handlers::ListingQuery;
use crate::services::sales::CreateSaleRequest;
use crate::services::SalesService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn create_sale(
    service: web::Data<SalesService>,
    admin: AdminUser,
    req: web::Json<CreateSaleRequest>,
) -> Result<HttpResponse> {
    let sale_id = service.create(admin.0.user_id, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "status": "success",
        "saleId": sale_id,
    })))
}

pub async fn list_sales(
    service: web::Data<SalesService>,
    _admin: AdminUser,
    query: web::Query<ListingQuery>,
) -> Result<HttpResponse> {
    let page = service
        .list(&query.search, query.page, query.per_page)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "total": page.total,
        "data": page.rows,
    })))
}

pub async fn delete_sale(
    service: web::Data<SalesService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "success"})))
}
