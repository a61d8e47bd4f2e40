//! Router configuration for the HTTP API.
//!
//! Sets up the routes and middleware (CORS, compression, tracing) and binds
//! the shared state.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/restaurants", get(handlers::list_restaurants))
        .route(
            "/restaurants/{id}",
            get(handlers::get_restaurant).delete(handlers::delete_restaurant),
        )
        .route("/pizzas", get(handlers::list_pizzas))
        .route(
            "/restaurant_pizzas",
            post(handlers::create_restaurant_pizza),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use crate::db::repositories::LocalRepository;

    #[tokio::test]
    async fn test_index_banner() {
        let router = create_router(AppState::from_repository(LocalRepository::new()));
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>Code challenge</h1>");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let router = create_router(AppState::from_repository(LocalRepository::new()));
        let response = router
            .oneshot(Request::builder().uri("/menus").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
