//! Order placement and delivery-status transitions
//!
//! Both operations run inside a single database transaction with the
//! touched rows locked, so concurrent checkouts for the last unit
//! serialize and exactly one succeeds. Cache invalidation happens
//! after commit; a failed transaction leaves the cache untouched.
use crate::auth::{synth_checkout_guest_id, Identity};
use crate::db::cart_repo::CartRepository;
use crate::db::invoice_repo::{InvoiceRepository, NewInvoice};
use crate::db::product_repo::ProductRepository;
use crate::db::sale_repo::{NewSale, SaleRepository};
use crate::db::variant_repo::VariantRepository;
use crate::error::{AppError, Result};
use crate::inventory::{decrement_across, restore_across, StockRequest};
use crate::models::sale::{SaleItem, SaleVariantRequest};
use crate::models::variant::VariantStock;
use crate::models::{DeliveryStatus, InvoiceLine, Product};
use crate::services::category_tree::CategoryTreeService;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use shop_cache::{CacheOperations, ShopCache};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// One ordered line as submitted by the storefront
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price override; absent means the catalog price applies
    pub price: Option<f64>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub name: String,
    pub phone: String,
    pub alternate_phone: Option<String>,
    pub area: String,
    pub thana: String,
    pub district: String,
    pub division: String,
    pub shipping_cost: f64,
    pub sub_total: f64,
    pub total_payable: f64,
    pub payment_method: String,
    pub products: Vec<OrderLineRequest>,
    /// Cart rows to clear inside the order transaction; absent means
    /// the whole owner cart is cleared.
    pub cart_item_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CreateInvoiceResult {
    pub invoice_id: Uuid,
    pub tran_id: String,
    pub payable: f64,
    /// Present only when the checkout was fully anonymous
    pub guest_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub delivery_status: DeliveryStatus,
    pub payment_method: Option<String>,
    pub ship_details: Option<String>,
}

static CUSTOMER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Name:([^,]+)").expect("Invalid customer name regex"));

/// Extract the customer name from a formatted shipping-details string
pub fn parse_customer_name(ship_details: &str) -> String {
    CUSTOMER_NAME_RE
        .captures(ship_details)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Walk-in Customer".to_string())
}

fn format_ship_details(req: &CreateInvoiceRequest) -> String {
    format!(
        "Name:{}, Number:{}, AlternateNumber:{}, Area:{}, Thana:{}, District:{}, Division:{}",
        req.name,
        req.phone,
        req.alternate_phone.as_deref().unwrap_or("N/A"),
        req.area,
        req.thana,
        req.district,
        req.division,
    )
}

fn mint_tran_id() -> String {
    rand::thread_rng().gen_range(10_000_000u32..100_000_000).to_string()
}

#[derive(Clone)]
pub struct InvoiceService {
    pool: PgPool,
    products: ProductRepository,
    variants: VariantRepository,
    carts: CartRepository,
    invoices: InvoiceRepository,
    sales: SaleRepository,
    tree: CategoryTreeService,
    cache: ShopCache,
}

impl InvoiceService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        products: ProductRepository,
        variants: VariantRepository,
        carts: CartRepository,
        invoices: InvoiceRepository,
        sales: SaleRepository,
        tree: CategoryTreeService,
        cache: ShopCache,
    ) -> Self {
        Self {
            pool,
            products,
            variants,
            carts,
            invoices,
            sales,
            tree,
            cache,
        }
    }

    /// Place an order: validate, lock, decrement, clear cart, insert,
    /// commit. Any insufficient line aborts the whole order with the
    /// offending line named; no partial decrements survive.
    pub async fn create(
        &self,
        identity: Option<Identity>,
        req: CreateInvoiceRequest,
    ) -> Result<CreateInvoiceResult> {
        validate_create(&req)?;

        let (identity, minted_guest) = match identity {
            Some(identity) => (identity, None),
            None => {
                let guest_id = synth_checkout_guest_id();
                (Identity::Guest(guest_id.clone()), Some(guest_id))
            }
        };

        let mut tx = self.pool.begin().await?;

        // Lock every ordered product up front; ids are deduplicated
        // and the ANY($1) read keeps lock order deterministic.
        let mut ids: Vec<Uuid> = req.products.iter().map(|l| l.product_id).collect();
        ids.sort();
        ids.dedup();
        let locked = self.products.lock_many(&mut tx, &ids).await?;
        let by_id: HashMap<Uuid, &Product> = locked.iter().map(|p| (p.id, p)).collect();

        let mut lines = Vec::with_capacity(req.products.len());
        for line in &req.products {
            let product = by_id.get(&line.product_id).ok_or_else(|| {
                AppError::NotFound(format!("product {} not found", line.product_id))
            })?;

            // Aggregate guard under the row lock; the variant slot
            // check below enforces the per-slot bound.
            if product.stock < line.quantity {
                let label =
                    StockRequest::from_line(line.color.clone(), line.size.clone(), line.quantity)
                        .label();
                return Err(AppError::InsufficientStock(label));
            }

            let unit_price = line.price.unwrap_or_else(|| product.effective_price());
            lines.push(InvoiceLine {
                product_id: product.id,
                name: line.name.clone().unwrap_or_else(|| product.name.clone()),
                image: line.image.clone().or_else(|| product.image.clone()),
                quantity: line.quantity,
                price: unit_price,
                color: line.color.clone(),
                size: line.size.clone(),
            });
        }

        // Variant decrement per line, plus the aggregate counter
        for line in &lines {
            self.decrement_line(&mut tx, line).await?;
        }

        // Clear the cart inside the same transaction
        match &req.cart_item_ids {
            Some(ids) if !ids.is_empty() => {
                self.carts.delete_by_ids(&mut tx, ids).await?;
            }
            _ => {
                self.carts.delete_for_owner(&mut tx, &identity).await?;
            }
        }

        let tran_id = mint_tran_id();
        let invoice_id = self
            .invoices
            .insert(
                &mut tx,
                &NewInvoice {
                    user_id: identity.user_id(),
                    guest_id: identity.guest_id().map(str::to_string),
                    sub_total: req.sub_total,
                    shipping_cost: req.shipping_cost,
                    payable: req.total_payable,
                    ship_area: req.area.clone(),
                    ship_details: format_ship_details(&req),
                    tran_id: tran_id.clone(),
                    payment_method: req.payment_method.clone(),
                    products: lines,
                },
            )
            .await?;

        tx.commit().await?;

        // Post-commit invalidation: cart key synchronously, the
        // category tree because product stock changed.
        let cart_key = identity.cart_cache_key();
        if let Err(e) = self.cache.del(&cart_key).await {
            warn!(key = %cart_key, error = %e, "cart cache invalidation failed");
        }
        self.tree.invalidate().await;

        info!(%invoice_id, tran_id = %tran_id, "order placed");
        Ok(CreateInvoiceResult {
            invoice_id,
            tran_id,
            payable: req.total_payable,
            guest_id: minted_guest,
        })
    }

    /// Move an invoice through the delivery state machine. First
    /// arrival in `delivered` synthesizes a sale record; first
    /// arrival in `return`/`cancelled` restores every decrement.
    pub async fn update_status(
        &self,
        admin_user_id: Uuid,
        invoice_id: Uuid,
        req: UpdateStatusRequest,
    ) -> Result<DeliveryStatus> {
        let mut tx = self.pool.begin().await?;

        let invoice = self
            .invoices
            .get_for_update(&mut tx, invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound("invoice not found".to_string()))?;

        let prev = invoice.delivery_status;
        let next = req.delivery_status;

        self.invoices
            .update_status(
                &mut tx,
                invoice_id,
                next,
                req.payment_method.as_deref(),
                req.ship_details.as_deref(),
            )
            .await?;

        if DeliveryStatus::fires_sale(prev, next) {
            let sale = sale_from_invoice(admin_user_id, &invoice);
            self.sales.insert(&mut tx, &sale).await?;
        }

        if DeliveryStatus::fires_restore(prev, next) {
            for line in invoice.products.0.iter() {
                self.restore_line(&mut tx, line).await?;
            }
        }

        tx.commit().await?;

        if DeliveryStatus::fires_restore(prev, next) {
            // Restored stock shows up in the tree
            self.tree.invalidate().await;
        }

        info!(%invoice_id, %prev, %next, "delivery status updated");
        Ok(next)
    }

    async fn decrement_line(
        &self,
        tx: &mut crate::db::Tx<'_>,
        line: &InvoiceLine,
    ) -> Result<()> {
        self.products
            .adjust_stock(tx, line.product_id, -line.quantity)
            .await?;

        let variants = self.variants.lock_for_product(tx, line.product_id).await?;
        if variants.is_empty() {
            // Products without variant documents track only the
            // aggregate counter
            return Ok(());
        }

        let req = StockRequest::from_line(line.color.clone(), line.size.clone(), line.quantity);
        let mut docs: Vec<VariantStock> = variants.iter().map(|v| v.stock.0.clone()).collect();
        let idx = decrement_across(&mut docs, &req)?;
        self.variants
            .save_stock(tx, variants[idx].id, &docs[idx])
            .await?;

        Ok(())
    }

    /// Exact inverse of the decrement. A slot that no longer exists is
    /// skipped with a warning; statement errors abort the transition so
    /// the transaction never commits half-restored.
    async fn restore_line(&self, tx: &mut crate::db::Tx<'_>, line: &InvoiceLine) -> Result<()> {
        self.products
            .adjust_stock(tx, line.product_id, line.quantity)
            .await?;

        let variants = self.variants.lock_for_product(tx, line.product_id).await?;
        if variants.is_empty() {
            return Ok(());
        }

        let req = StockRequest::from_line(line.color.clone(), line.size.clone(), line.quantity);
        let mut docs: Vec<VariantStock> = variants.iter().map(|v| v.stock.0.clone()).collect();
        match restore_across(&mut docs, &req) {
            Some(idx) => {
                self.variants
                    .save_stock(tx, variants[idx].id, &docs[idx])
                    .await?;
            }
            None => {
                warn!(
                    product_id = %line.product_id,
                    line = %req.label(),
                    "no matching variant slot to restore"
                );
            }
        }

        Ok(())
    }
}

fn validate_create(req: &CreateInvoiceRequest) -> Result<()> {
    let required = [
        ("name", &req.name),
        ("phone", &req.phone),
        ("area", &req.area),
        ("thana", &req.thana),
        ("district", &req.district),
        ("division", &req.division),
        ("paymentMethod", &req.payment_method),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
    }
    if req.products.is_empty() {
        return Err(AppError::Validation("order has no products".to_string()));
    }
    for line in &req.products {
        if line.quantity < 1 {
            return Err(AppError::Validation(
                "product quantity must be at least 1".to_string(),
            ));
        }
    }
    Ok(())
}

/// Build the sale record synthesized on first delivery
fn sale_from_invoice(admin_user_id: Uuid, invoice: &crate::models::Invoice) -> NewSale {
    let items = invoice
        .products
        .0
        .iter()
        .map(|line| {
            let req = StockRequest::from_line(line.color.clone(), line.size.clone(), line.quantity);
            let line_total = line.price * line.quantity as f64;
            SaleItem {
                product_id: line.product_id,
                product_name: line.name.clone(),
                variants: vec![SaleVariantRequest {
                    scenario_type: req.scenario,
                    color: line.color.clone(),
                    size: line.size.clone(),
                    qty: line.quantity,
                    unit_cost: line.price,
                    total: line_total,
                }],
                total_qty: line.quantity,
                total_cost: line_total,
            }
        })
        .collect();

    NewSale {
        user_id: admin_user_id,
        customer_id: invoice.user_id.unwrap_or(Uuid::nil()),
        customer_name: parse_customer_name(&invoice.ship_details),
        items,
        vat_tax: 0.0,
        discount: 0.0,
        other_cost: 0.0,
        shipping_cost: invoice.shipping_cost,
        grand_total: invoice.sub_total,
        note: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_name_extraction() {
        let details = "Name:Jane Roe, Number:0171, AlternateNumber:N/A, Area:X, Thana:Y, District:Z, Division:W";
        assert_eq!(parse_customer_name(details), "Jane Roe");
    }

    #[test]
    fn customer_name_falls_back_for_unparseable_details() {
        assert_eq!(parse_customer_name("garbage"), "Walk-in Customer");
        assert_eq!(parse_customer_name(""), "Walk-in Customer");
        assert_eq!(parse_customer_name("Name:, Number:1"), "Walk-in Customer");
    }

    #[test]
    fn ship_details_round_trips_through_name_parser() {
        let req = CreateInvoiceRequest {
            name: "Rahim Uddin".into(),
            phone: "01700000000".into(),
            alternate_phone: None,
            area: "Banani".into(),
            thana: "Gulshan".into(),
            district: "Dhaka".into(),
            division: "Dhaka".into(),
            shipping_cost: 60.0,
            sub_total: 500.0,
            total_payable: 560.0,
            payment_method: "cod".into(),
            products: Vec::new(),
            cart_item_ids: None,
        };
        let details = format_ship_details(&req);
        assert!(details.contains("AlternateNumber:N/A"));
        assert_eq!(parse_customer_name(&details), "Rahim Uddin");
    }

    #[test]
    fn restore_skips_only_a_vanished_slot() {
        use crate::models::variant::ColorQty;

        let line = InvoiceLine {
            product_id: Uuid::new_v4(),
            name: "Polo".into(),
            image: None,
            quantity: 2,
            price: 300.0,
            color: Some("Red".into()),
            size: None,
        };
        let req = StockRequest::from_line(line.color.clone(), line.size.clone(), line.quantity);

        // The slot vanished since the order: no write-back, the
        // transition carries on
        let mut gone = vec![VariantStock::ColorOnly(vec![ColorQty {
            color: "Blue".into(),
            qty: 4,
        }])];
        assert_eq!(restore_across(&mut gone, &req), None);

        // The slot is present: the restore lands and must be persisted
        let mut present = vec![VariantStock::ColorOnly(vec![ColorQty {
            color: "Red".into(),
            qty: 1,
        }])];
        assert_eq!(restore_across(&mut present, &req), Some(0));
        assert_eq!(
            present[0],
            VariantStock::ColorOnly(vec![ColorQty {
                color: "Red".into(),
                qty: 3,
            }])
        );
    }

    #[test]
    fn tran_id_is_eight_digits() {
        for _ in 0..100 {
            let id = mint_tran_id();
            assert_eq!(id.len(), 8);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn create_validation_rejects_blank_fields_and_empty_orders() {
        let mut req = CreateInvoiceRequest {
            name: "A".into(),
            phone: "1".into(),
            alternate_phone: None,
            area: "a".into(),
            thana: "t".into(),
            district: "d".into(),
            division: "v".into(),
            shipping_cost: 0.0,
            sub_total: 0.0,
            total_payable: 0.0,
            payment_method: "cod".into(),
            products: Vec::new(),
            cart_item_ids: None,
        };
        assert!(matches!(
            validate_create(&req),
            Err(AppError::Validation(_))
        ));

        req.products.push(OrderLineRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
            price: None,
            color: None,
            size: None,
            name: None,
            image: None,
        });
        assert!(matches!(
            validate_create(&req),
            Err(AppError::Validation(_))
        ));

        req.products[0].quantity = 2;
        assert!(validate_create(&req).is_ok());

        req.name = "  ".into();
        assert!(matches!(
            validate_create(&req),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn sale_synthesis_carries_invoice_lines() {
        use sqlx::types::Json;
        let admin = Uuid::new_v4();
        let invoice = crate::models::Invoice {
            id: Uuid::new_v4(),
            user_id: None,
            guest_id: Some("guest_1_abc".into()),
            sub_total: 200.0,
            shipping_cost: 60.0,
            payable: 260.0,
            ship_area: "Banani".into(),
            ship_details: "Name:Karim, Number:0170".into(),
            tran_id: "12345678".into(),
            val_id: "0".into(),
            payment_status: "pending".into(),
            delivery_status: DeliveryStatus::Pending,
            payment_method: "cod".into(),
            products: Json(vec![InvoiceLine {
                product_id: Uuid::new_v4(),
                name: "Shirt".into(),
                image: None,
                quantity: 2,
                price: 100.0,
                color: Some("Red".into()),
                size: Some("M".into()),
            }]),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let sale = sale_from_invoice(admin, &invoice);
        assert_eq!(sale.customer_name, "Karim");
        assert_eq!(sale.customer_id, Uuid::nil());
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].total_cost, 200.0);
        assert_eq!(sale.items[0].variants[0].qty, 2);
        assert_eq!(sale.grand_total, 200.0);
    }
}
