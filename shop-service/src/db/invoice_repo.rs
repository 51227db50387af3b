//! Invoice repository. All writes happen inside the caller's
//! transaction; the status row is locked before the state machine is
//! evaluated so concurrent transitions serialize.
use crate::db::Tx;
use crate::models::{DeliveryStatus, Invoice, InvoiceLine};
use anyhow::Result;
use sqlx::types::Json;
use uuid::Uuid;

/// Fields for a new invoice document
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: Option<Uuid>,
    pub guest_id: Option<String>,
    pub sub_total: f64,
    pub shipping_cost: f64,
    pub payable: f64,
    pub ship_area: String,
    pub ship_details: String,
    pub tran_id: String,
    pub payment_method: String,
    pub products: Vec<InvoiceLine>,
}

#[derive(Clone)]
pub struct InvoiceRepository;

impl InvoiceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn insert(&self, tx: &mut Tx<'_>, invoice: &NewInvoice) -> Result<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO invoices
                (user_id, guest_id, sub_total, shipping_cost, payable, ship_area,
                 ship_details, tran_id, val_id, payment_status, delivery_status,
                 payment_method, products)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, '0', 'pending', 'pending', $9, $10)
            RETURNING id
            "#,
        )
        .bind(invoice.user_id)
        .bind(&invoice.guest_id)
        .bind(invoice.sub_total)
        .bind(invoice.shipping_cost)
        .bind(invoice.payable)
        .bind(&invoice.ship_area)
        .bind(&invoice.ship_details)
        .bind(&invoice.tran_id)
        .bind(&invoice.payment_method)
        .bind(Json(&invoice.products))
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    pub async fn get_for_update(&self, tx: &mut Tx<'_>, id: Uuid) -> Result<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, user_id, guest_id, sub_total, shipping_cost, payable,
                   ship_area, ship_details, tran_id, val_id, payment_status,
                   delivery_status, payment_method, products, created_at, updated_at
            FROM invoices
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(invoice)
    }

    pub async fn update_status(
        &self,
        tx: &mut Tx<'_>,
        id: Uuid,
        status: DeliveryStatus,
        payment_method: Option<&str>,
        ship_details: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET delivery_status = $2,
                payment_method = COALESCE($3, payment_method),
                ship_details = COALESCE($4, ship_details),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(payment_method)
        .bind(ship_details)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

impl Default for InvoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}
