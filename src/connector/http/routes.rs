use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tracing::info;

use crate::connector::api::Container;

use super::handlers::{auth, base_info, offers, orders, profiles, reviews};

/// Registers `path` (which ends in `/`) with and without the trailing slash.
fn both(router: Router<Container>, path: &str, method_router: MethodRouter<Container>) -> Router<Container> {
    let bare = path.trim_end_matches('/');
    router.route(path, method_router.clone()).route(bare, method_router)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "{} {}",
        method,
        path
    );
    response
}

pub fn api_routes() -> Router<Container> {
    let mut router = Router::new();
    router = both(router, "/registration/", post(auth::register));
    router = both(router, "/login/", post(auth::login));

    router = both(
        router,
        "/profile/{user_id}/",
        get(profiles::get_profile).patch(profiles::update_profile),
    );
    router = both(router, "/profiles/business/", get(profiles::list_business));
    router = both(router, "/profiles/customer/", get(profiles::list_customer));

    router = both(router, "/offers/", get(offers::list_offers).post(offers::create_offer));
    router = both(
        router,
        "/offers/{id}/",
        get(offers::get_offer)
            .patch(offers::update_offer)
            .delete(offers::delete_offer),
    );
    router = both(router, "/offerdetails/{id}/", get(offers::get_offer_detail));

    router = both(router, "/orders/", get(orders::list_orders).post(orders::create_order));
    router = both(
        router,
        "/orders/{id}/",
        get(orders::get_order)
            .patch(orders::update_order)
            .delete(orders::delete_order),
    );
    router = both(router, "/order-count/{business_user_id}/", get(orders::order_count));
    router = both(
        router,
        "/completed-order-count/{business_user_id}/",
        get(orders::completed_order_count),
    );

    router = both(router, "/reviews/", get(reviews::list_reviews).post(reviews::create_review));
    router = both(
        router,
        "/reviews/{id}/",
        get(reviews::get_review)
            .patch(reviews::update_review)
            .delete(reviews::delete_review),
    );

    both(router, "/base-info/", get(base_info::base_info))
}

/// The full application: every endpoint under `/api` plus request logging.
pub fn build_router(container: Container) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(middleware::from_fn(log_requests))
        .with_state(container)
}
