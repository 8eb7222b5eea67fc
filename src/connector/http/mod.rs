//! JSON-over-HTTP surface of the marketplace, served with axum.

mod error;
mod extract;
mod handlers;
mod pagination;
mod routes;

pub use error::{ApiError, ApiResult};
pub use extract::{token_from_header, ApiJson, ApiPath, ApiQuery, CurrentUser};
pub use pagination::{page_url, Paginated};
pub use routes::{api_routes, build_router};
