use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{AppState, handlers};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Assemble the full HTTP surface over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let library_routes = Router::new()
        .route("/books/view", get(handlers::view_books))
        .route("/books/sort", get(handlers::sort_books))
        .route("/books/add", post(handlers::add_book));

    let entry_routes = Router::new()
        .route("/books", get(handlers::list_entries))
        .route("/add", post(handlers::add_entry));

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(library_routes)
        .merge(entry_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        // Router layers wrap outward, so the id is set before it is propagated.
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
