//! Journal API
//!
//! REST endpoints over `journal-core`:
//! - Registration, login and logout (session token in an HttpOnly cookie)
//! - Journal CRUD and title search, restricted to the owner
//!
//! Everything under `/api/journal` goes through [`middleware::require_auth`].

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout));

    let protected = Router::new()
        .route(
            "/journal",
            post(handlers::create_journal).get(handlers::list_journals),
        )
        .route("/journal/search", get(handlers::search_journals))
        .route(
            "/journal/:id",
            get(handlers::get_journal)
                .put(handlers::update_journal)
                .delete(handlers::delete_journal),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        .nest("/api", public.merge(protected))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(error::handle_panic))
                .layer(cors),
        )
        .with_state(state)
}
