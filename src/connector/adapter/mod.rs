mod duckdb_offer_repository;
mod duckdb_order_repository;
mod duckdb_profile_repository;
mod duckdb_review_repository;
mod duckdb_support;
mod duckdb_user_repository;
mod sha256_credentials;

pub use duckdb_offer_repository::*;
pub use duckdb_order_repository::*;
pub use duckdb_profile_repository::*;
pub use duckdb_review_repository::*;
pub use duckdb_user_repository::*;
pub use sha256_credentials::*;
