//! Shop Service Library
//!
//! Catalog, cart, invoice, sales and review backend with a
//! read-through Redis cache and transactional inventory mutation.
//!
//! # Modules
//!
//! - `handlers`: HTTP request handlers (thin wrappers)
//! - `models`: Data structures for products, variants, carts, invoices, sales
//! - `services`: Business logic layer (read-through reads, transactional writes)
//! - `db`: Database access layer and repositories
//! - `inventory`: Variant matching, decrement and restore
//! - `auth`: Bearer-token claims and user/guest identity resolution
//! - `error`: Error types and handling
//! - `config`: Configuration management
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
