mod credential_service;
mod offer_repository;
mod order_repository;
mod profile_repository;
mod review_repository;
mod user_repository;

pub use credential_service::*;
pub use offer_repository::*;
pub use order_repository::*;
pub use profile_repository::*;
pub use review_repository::*;
pub use user_repository::*;
