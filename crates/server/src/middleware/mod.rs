//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span with `request_id` and `account_id` fields)
//! 3. Request ID (add unique ID to each request)
//! 4. Error detail (5xx `error` field outside production)
//! 5. CORS and body limit
//! 6. Rate limiting on `/api/auth/*` (governor)
//!
//! Bearer authentication is an extractor ([`RequireAuth`]) rather than a
//! layer, so public routes simply don't ask for it.

pub mod auth;
pub mod error_detail;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireAuth;
pub use error_detail::error_detail_middleware;
pub use rate_limit::auth_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
