//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - DuckDB repositories for users, profiles, offers, orders and reviews
//! - Salted SHA-256 password hashing and token generation
//! - The DI container and CLI controllers (`api`)
//! - The REST API (`http`)

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
pub use api::*;
pub use http::build_router;
