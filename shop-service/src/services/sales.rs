//! Point-of-sale records
//!
//! A POS sale decrements variant stock line by line inside one
//! transaction, exactly like an online order, and derives its grand
//! total server-side from the submitted cost components.
use crate::db::product_repo::ProductRepository;
use crate::db::sale_repo::{NewSale, SaleRepository};
use crate::db::variant_repo::VariantRepository;
use crate::error::{AppError, Result};
use crate::inventory::{decrement_across, StockRequest};
use crate::models::sale::{grand_total, Sale, SaleItem};
use crate::models::variant::VariantStock;
use crate::models::Page;
use crate::services::category_tree::CategoryTreeService;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    #[serde(default)]
    pub vat_tax: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub other_cost: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    pub note: Option<String>,
    pub items: Vec<SaleItem>,
}

#[derive(Clone)]
pub struct SalesService {
    pool: PgPool,
    sales: SaleRepository,
    products: ProductRepository,
    variants: VariantRepository,
    tree: CategoryTreeService,
}

impl SalesService {
    pub fn new(
        pool: PgPool,
        sales: SaleRepository,
        products: ProductRepository,
        variants: VariantRepository,
        tree: CategoryTreeService,
    ) -> Self {
        Self {
            pool,
            sales,
            products,
            variants,
            tree,
        }
    }

    /// Record a POS sale and decrement stock for every variant line.
    /// Any unsatisfiable line aborts the whole sale.
    pub async fn create(&self, user_id: Uuid, req: CreateSaleRequest) -> Result<Uuid> {
        validate(&req)?;

        let total = grand_total(
            &req.items,
            req.vat_tax,
            req.discount,
            req.other_cost,
            req.shipping_cost,
        );

        let mut tx = self.pool.begin().await?;

        for item in &req.items {
            for variant in &item.variants {
                let stock_req = StockRequest::new(
                    variant.scenario_type,
                    variant.color.clone(),
                    variant.size.clone(),
                    variant.qty,
                );

                self.products
                    .adjust_stock(&mut tx, item.product_id, -variant.qty)
                    .await?;

                let docs_db = self.variants.lock_for_product(&mut tx, item.product_id).await?;
                if docs_db.is_empty() {
                    return Err(AppError::Validation(format!(
                        "no product variants found for {}",
                        item.product_name
                    )));
                }

                let mut docs: Vec<VariantStock> =
                    docs_db.iter().map(|v| v.stock.0.clone()).collect();
                let idx = decrement_across(&mut docs, &stock_req)?;
                self.variants
                    .save_stock(&mut tx, docs_db[idx].id, &docs[idx])
                    .await?;
            }
        }

        let sale_id = self
            .sales
            .insert(
                &mut tx,
                &NewSale {
                    user_id,
                    customer_id: req.customer_id.unwrap_or(Uuid::nil()),
                    customer_name: req.customer_name.clone(),
                    items: req.items,
                    vat_tax: req.vat_tax,
                    discount: req.discount,
                    other_cost: req.other_cost,
                    shipping_cost: req.shipping_cost,
                    grand_total: total,
                    note: req.note,
                },
            )
            .await?;

        tx.commit().await?;
        self.tree.invalidate().await;

        info!(%sale_id, grand_total = total, "sale recorded");
        Ok(sale_id)
    }

    pub async fn list(&self, search: &str, page: u32, per_page: u32) -> Result<Page<Sale>> {
        Ok(self.sales.list(search, page, per_page).await?)
    }

    pub async fn delete(&self, sale_id: Uuid) -> Result<()> {
        let deleted = self.sales.delete(sale_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("sale not found".to_string()));
        }
        Ok(())
    }
}

fn validate(req: &CreateSaleRequest) -> Result<()> {
    if req.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customerName is required".to_string()));
    }
    if req.items.is_empty() {
        return Err(AppError::Validation("sale has no items".to_string()));
    }
    for item in &req.items {
        if item.variants.is_empty() {
            return Err(AppError::Validation(format!(
                "sale item {} has no variant lines",
                item.product_name
            )));
        }
        for variant in &item.variants {
            if variant.qty < 1 {
                return Err(AppError::Validation(
                    "variant qty must be at least 1".to_string(),
                ));
            }
        }
    }
    Ok(())
}
