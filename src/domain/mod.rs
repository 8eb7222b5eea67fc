//! # Domain Layer
//!
//! Marketplace entities, query objects, validation rules and errors.
//! This layer is independent of the HTTP framework and the database.

mod error;
pub mod models;
pub mod validation;

pub use error::*;
pub use models::*;
