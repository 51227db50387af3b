//! Business logic, one service per domain area
//!
//! Reads flow through [`read_through::read_through`]; mutations run
//! in transactions and invalidate their cache keys after commit.
pub mod cart;
pub mod catalog;
pub mod category_tree;
pub mod invoice;
pub mod read_through;
pub mod reviews;
pub mod sales;
pub mod users;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use category_tree::CategoryTreeService;
pub use invoice::InvoiceService;
pub use read_through::{CacheStatus, CachedPayload};
pub use reviews::ReviewService;
pub use sales::SalesService;
pub use users::UserService;
