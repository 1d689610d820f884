//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (store ping)
//!
//! # API (JSON envelope)
//! GET  /api/health                      - Status, backend, timestamp
//!
//! # Auth (rate limited)
//! POST /api/auth/register               - Create account, returns token
//! POST /api/auth/login                  - Returns token
//! GET  /api/auth/me                     - Current account
//!
//! # Customers (bearer token)
//! GET    /api/customers                 - List by name
//! GET    /api/customers/search?q=       - Substring search
//! GET    /api/customers/{id}
//! POST   /api/customers
//! PUT    /api/customers/{id}
//! DELETE /api/customers/{id}[?cascade=true]
//!
//! # Submissions (bearer token)
//! GET    /api/submissions?limit&offset  - Most recent first
//! GET    /api/submissions/stats
//! GET    /api/submissions/date-range?startDate&endDate
//! GET    /api/submissions/customer/{name}
//! DELETE /api/submissions/customer/{name}
//! GET    /api/submissions/{id}
//! POST   /api/submissions
//! PUT    /api/submissions/{id}
//! DELETE /api/submissions/{id}
//!
//! # Items (bearer token)
//! GET/POST /api/items, GET/PUT/DELETE /api/items/{id}
//!
//! # Dockets (bearer token)
//! GET  /api/dockets?customerName&startDate&endDate[&order]
//! GET  /api/dockets/print?...           - Printable HTML
//! ```

pub mod auth;
pub mod customers;
pub mod dockets;
pub mod health;
pub mod items;
pub mod submissions;

use axum::{
    Router,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    match auth_rate_limiter().filter(|_| rate_limit) {
        Some(limiter) => router.layer(limiter),
        None => router,
    }
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index).post(customers::create))
        .route("/search", get(customers::search))
        .route(
            "/{id}",
            get(customers::show)
                .put(customers::update)
                .delete(customers::destroy),
        )
}

/// Create the submission routes router.
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(submissions::index).post(submissions::create))
        .route("/stats", get(submissions::stats))
        .route("/date-range", get(submissions::date_range))
        .route(
            "/customer/{name}",
            get(submissions::for_customer).delete(submissions::destroy_for_customer),
        )
        .route(
            "/{id}",
            get(submissions::show)
                .put(submissions::update)
                .delete(submissions::destroy),
        )
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(items::index).post(items::create))
        .route(
            "/{id}",
            get(items::show).put(items::update).delete(items::destroy),
        )
}

/// Create the docket routes router.
pub fn docket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dockets::show))
        .route("/print", get(dockets::print))
}

/// Everything under `/api`.
pub fn api_routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::api_health))
        .nest("/auth", auth_routes(rate_limit))
        .nest("/customers", customer_routes())
        .nest("/submissions", submission_routes())
        .nest("/items", item_routes())
        .nest("/dockets", docket_routes())
        .fallback(api_not_found)
}

async fn api_not_found() -> AppError {
    AppError::NotFound("API endpoint not found".to_owned())
}
