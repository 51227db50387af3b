use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use db_pool::{create_pool, DbConfig};
use shop_cache::sweep::SweepGuard;
use shop_cache::{CacheOperations, ShopCache};
use shop_service::db::cart_repo::CartRepository;
use shop_service::db::category_repo::CategoryRepository;
use shop_service::db::invoice_repo::InvoiceRepository;
use shop_service::db::product_repo::ProductRepository;
use shop_service::db::reference_repo::ReferenceRepository;
use shop_service::db::review_repo::ReviewRepository;
use shop_service::db::sale_repo::SaleRepository;
use shop_service::db::user_repo::UserRepository;
use shop_service::db::variant_repo::VariantRepository;
use shop_service::services::{
    CartService, CatalogService, CategoryTreeService, InvoiceService, ReviewService, SalesService,
    UserService,
};
use shop_service::{handlers, Config};
use sqlx::PgPool;
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: PgPool,
    cache: ShopCache,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    let db_ok = sqlx::query("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
        .is_ok();
    let cache_ok = state.cache.get_raw("health:probe").await.is_ok();

    if db_ok && cache_ok {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "shop-service",
            "version": env!("CARGO_PKG_VERSION"),
        }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "postgres": db_ok,
            "redis": cache_ok,
        }))
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting shop-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_cfg = match DbConfig::from_env("shop-service") {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {e}");
            std::process::exit(1);
        }
    };
    db_cfg.log_config();
    let db_pool = match create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to database via db-pool crate");

    let cache = ShopCache::connect(&config.cache.redis_url)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to Redis: {e}")))?;

    // One corrupted-entry sweep per process, before traffic arrives
    let sweep_guard = SweepGuard::new();
    sweep_guard.ensure(&cache).await;

    let read_timeout = Duration::from_secs(config.app.read_timeout_secs);

    let products = ProductRepository::new(db_pool.clone());
    let variants = VariantRepository::new(db_pool.clone());
    let categories = CategoryRepository::new(db_pool.clone());
    let reference = ReferenceRepository::new(db_pool.clone());
    let carts = CartRepository::new(db_pool.clone());
    let invoices = InvoiceRepository::new();
    let sales = SaleRepository::new(db_pool.clone());
    let reviews = ReviewRepository::new(db_pool.clone());
    let users = UserRepository::new(db_pool.clone());

    let catalog_service = CatalogService::new(
        products.clone(),
        variants.clone(),
        reference,
        cache.clone(),
        read_timeout,
    );
    let tree_service = CategoryTreeService::new(categories, cache.clone(), read_timeout);
    let cart_service = CartService::new(carts.clone(), cache.clone(), read_timeout);
    let invoice_service = InvoiceService::new(
        db_pool.clone(),
        products.clone(),
        variants.clone(),
        carts,
        invoices,
        sales.clone(),
        tree_service.clone(),
        cache.clone(),
    );
    let sales_service = SalesService::new(
        db_pool.clone(),
        sales,
        products,
        variants,
        tree_service.clone(),
    );
    let review_service = ReviewService::new(reviews, cache.clone(), read_timeout);
    let user_service = UserService::new(users, cache.clone(), read_timeout);

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
        cache: cache.clone(),
    });

    let config_data = web::Data::new(config.clone());
    let catalog_data = web::Data::new(catalog_service);
    let tree_data = web::Data::new(tree_service);
    let cart_data = web::Data::new(cart_service);
    let invoice_data = web::Data::new(invoice_service);
    let sales_data = web::Data::new(sales_service);
    let review_data = web::Data::new(review_service);
    let user_data = web::Data::new(user_service);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(config_data.clone())
            .app_data(health_state.clone())
            .app_data(catalog_data.clone())
            .app_data(tree_data.clone())
            .app_data(cart_data.clone())
            .app_data(invoice_data.clone())
            .app_data(sales_data.clone())
            .app_data(review_data.clone())
            .app_data(user_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(web::scope("/api/v1").configure(handlers::configure))
    })
    .bind(&bind_address)?
    .run()
    .await
}
