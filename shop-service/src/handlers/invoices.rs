//! Order endpoints: checkout and delivery-status administration
use crate::auth::{AdminUser, Identity};
use crate::error::Result;
use crate::services::invoice::{CreateInvoiceRequest, UpdateStatusRequest};
use crate::services::InvoiceService;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

pub async fn create_invoice(
    service: web::Data<InvoiceService>,
    identity: Option<Identity>,
    req: web::Json<CreateInvoiceRequest>,
) -> Result<HttpResponse> {
    let result = service.create(identity, req.into_inner()).await?;

    let mut body = serde_json::json!({
        "status": "success",
        "invoiceId": result.invoice_id,
        "tranId": result.tran_id,
        "payable": result.payable,
    });
    if let Some(guest_id) = result.guest_id {
        body["guestId"] = serde_json::Value::String(guest_id);
    }
    Ok(HttpResponse::Created().json(body))
}

pub async fn update_invoice_status(
    service: web::Data<InvoiceService>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse> {
    let status = service
        .update_status(admin.0.user_id, path.into_inner(), req.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "success",
        "deliveryStatus": status,
    })))
}
