use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// The `/api/v1` surface. Every route here sits behind the auth route layer, so
/// an unauthenticated request is answered with 401 before any extractor that
/// reads the body runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET  /api/v1/articles  -> every article, serialized with category and reviews
        // POST /api/v1/articles  -> validate and create
        .route(
            "/api/v1/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        // GET /api/v1/articles/{id}
        .route("/api/v1/articles/{id}", get(handlers::get_article))
        // POST /api/v1/articles/{id}/reviews
        .route(
            "/api/v1/articles/{id}/reviews",
            post(handlers::create_review),
        )
        // GET/POST /api/v1/categories
        .route(
            "/api/v1/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
}
