//! Router assembly and serving.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::{ServerConfig, StoreConfig};
use crate::db::{self, MemoryStore, PgStore, Store};
use crate::middleware::{error_detail_middleware, request_id_middleware};
use crate::routes::{self, health};
use crate::state::AppState;

/// Request body cap (signature images travel inline).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Open the configured store backend.
///
/// # Errors
///
/// Returns `sqlx::Error` if the `PostgreSQL` pool cannot connect.
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn Store>, sqlx::Error> {
    match &config.store {
        StoreConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url).await?;
            tracing::info!("Database pool created");
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let config = state.config();
    let static_dir = config.static_dir.clone();
    let spa = ServeDir::new(&static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    let cors = cors_layer(config.cors_origin.as_deref());
    let api = routes::api_routes(config.rate_limit);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/api", api)
        .fallback_service(spa)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(from_fn_with_state(state.clone(), error_detail_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    account_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Serve the router on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, StatusCode, header};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let config = ServerConfig::in_memory(SecretString::from("k7Qm2xVp9Lr4Tz8Nw3Hs6Jd1Fb5Gc0Ya"));
        router(AppState::new(config, Arc::new(MemoryStore::new())))
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": email, "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"].as_str().unwrap().to_owned()
    }

    fn delivery(name: &str, date: &str, amount: f64) -> Value {
        json!({
            "customerName": name,
            "date": date,
            "time": "09:00 AM",
            "address": "1 Quarry Rd",
            "order": "Road Base",
            "amount": amount,
            "rego": "ABC123"
        })
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app();
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (status, body) = call(&app, Method::GET, "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["store"], "memory");
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let app = app();
        register(&app, "owner@example.com").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "OWNER@example.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        let token = body["data"]["token"].as_str().unwrap().to_owned();

        let (status, body) = call(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "owner@example.com");
    }

    #[tokio::test]
    async fn test_auth_failures() {
        let app = app();
        register(&app, "owner@example.com").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "owner@example.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already registered");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "owner@example.com", "password": "wrong-pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");

        let (status, body) = call(&app, Method::GET, "/api/customers", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = call(&app, Method::GET, "/api/customers", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validation_errors_are_listed() {
        let app = app();
        let token = register(&app, "owner@example.com").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/submissions",
            Some(&token),
            Some(json!({"customerName": "Acme", "amount": -5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"date"));
        assert!(fields.contains(&"amount"));
    }

    #[tokio::test]
    async fn test_malformed_json_uses_envelope() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_cross_account_access_is_forbidden() {
        let app = app();
        let alice = register(&app, "alice@example.com").await;
        let bob = register(&app, "bob@example.com").await;

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/customers",
            Some(&alice),
            Some(json!({"name": "Acme"})),
        )
        .await;
        let id = body["data"]["id"].as_i64().unwrap();
        let uri = format!("/api/customers/{id}");

        let (status, body) = call(&app, Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied");

        let (status, _) = call(
            &app,
            Method::PUT,
            &uri,
            Some(&bob),
            Some(json!({"name": "Stolen"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(&app, Method::GET, "/api/customers", Some(&bob), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn test_acme_scenario() {
        let app = app();
        let token = register(&app, "owner@example.com").await;

        let (status, body) = call(&app, Method::GET, "/api/submissions/stats", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!({"total_submissions": 0, "total_amount": 0.0, "unique_customers": 0})
        );

        for (date, amount) in [("2024-01-01", 100.0), ("2024-01-15", 250.0)] {
            let (status, _) = call(
                &app,
                Method::POST,
                "/api/submissions",
                Some(&token),
                Some(delivery("Acme", date, amount)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = call(&app, Method::GET, "/api/submissions/stats", Some(&token), None).await;
        assert_eq!(body["data"]["total_submissions"], 2);
        assert_eq!(body["data"]["total_amount"], 350.0);
        assert_eq!(body["data"]["unique_customers"], 1);

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/submissions/date-range?startDate=2024-01-01&endDate=2024-01-31",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/dockets?customerName=Acme&startDate=2024-01-01&endDate=2024-01-31",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total"], 350.0);
        assert_eq!(body["data"]["lineItems"].as_array().unwrap().len(), 2);

        let (status, body) = call(
            &app,
            Method::DELETE,
            "/api/submissions/customer/Acme",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deletedCount"], 2);
        assert_eq!(body["message"], "2 submission(s) deleted successfully");
    }

    #[tokio::test]
    async fn test_range_and_docket_errors() {
        let app = app();
        let token = register(&app, "owner@example.com").await;

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/submissions/date-range?startDate=2024-01-01",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "startDate and endDate are required");

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/dockets?customerName=Nobody&startDate=2024-01-01&endDate=2024-01-31",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["message"],
            "No submissions found for this customer in the selected date range"
        );
    }

    #[tokio::test]
    async fn test_docket_print_renders_html() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        call(
            &app,
            Method::POST,
            "/api/submissions",
            Some(&token),
            Some(delivery("Acme", "2024-01-01", 100.0)),
        )
        .await;

        let request = Request::builder()
            .uri("/api/dockets/print?customerName=Acme&startDate=2024-01-01&endDate=2024-01-31")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Acme"));
        assert!(html.contains("$100.00"));
    }

    #[tokio::test]
    async fn test_unknown_api_route_is_enveloped_404() {
        let app = app();
        let (status, body) = call(&app, Method::GET, "/api/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_customer_list_is_not_capped() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        for n in 0..101 {
            let (status, _) = call(
                &app,
                Method::POST,
                "/api/customers",
                Some(&token),
                Some(json!({"name": format!("Customer {n:03}")})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = call(&app, Method::GET, "/api/customers", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let listed = body["data"].as_array().unwrap();
        assert_eq!(listed.len(), 101);
        assert_eq!(listed[100]["name"], "Customer 100");

        let (_, body) =
            call(&app, Method::GET, "/api/customers?limit=10", Some(&token), None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_submission_paging() {
        let app = app();
        let token = register(&app, "owner@example.com").await;
        for _ in 0..105 {
            let (status, _) = call(
                &app,
                Method::POST,
                "/api/submissions",
                Some(&token),
                Some(delivery("Acme", "2024-01-01", 10.0)),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) =
            call(&app, Method::GET, "/api/submissions", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 100);

        let (_, body) = call(
            &app,
            Method::GET,
            "/api/submissions?limit=5&offset=102",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);

        let (_, body) = call(
            &app,
            Method::GET,
            "/api/submissions?limit=1000",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(body["data"].as_array().unwrap().len(), 105);

        for uri in ["/api/submissions?limit=0", "/api/submissions?offset=-1"] {
            let (status, body) = call(&app, Method::GET, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn test_owner_put_replaces_record() {
        let app = app();
        let token = register(&app, "owner@example.com").await;

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/customers",
            Some(&token),
            Some(json!({
                "name": "Acme",
                "email": "acme@example.com",
                "phone": "0400 000 000",
                "address": "1 Quarry Rd"
            })),
        )
        .await;
        let uri = format!("/api/customers/{}", body["data"]["id"]);
        let (status, body) = call(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(json!({"name": "Acme Pty Ltd"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Acme Pty Ltd");
        assert_eq!(body["data"]["email"], Value::Null);
        assert_eq!(body["data"]["phone"], Value::Null);
        assert_eq!(body["data"]["address"], Value::Null);

        let mut signed = delivery("Acme", "2024-01-01", 100.0);
        signed["signatureImage"] = json!("data:image/png;base64,iVBORw0KGgo=");
        let (_, body) =
            call(&app, Method::POST, "/api/submissions", Some(&token), Some(signed)).await;
        assert!(body["data"]["signatureImage"].is_string());
        let uri = format!("/api/submissions/{}", body["data"]["id"]);
        let (status, body) = call(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(delivery("Bolt", "2024-02-01", 75.5)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["customerName"], "Bolt");
        assert_eq!(body["data"]["date"], "2024-02-01");
        assert_eq!(body["data"]["amount"], 75.5);
        assert_eq!(body["data"]["signatureImage"], Value::Null);

        let (_, body) = call(&app, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(body["data"]["customerName"], "Bolt");
    }

    #[tokio::test]
    async fn test_update_after_delete_is_not_found() {
        let app = app();
        let token = register(&app, "owner@example.com").await;

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/submissions",
            Some(&token),
            Some(delivery("Acme", "2024-01-01", 100.0)),
        )
        .await;
        let uri = format!("/api/submissions/{}", body["data"]["id"]);
        let (status, _) = call(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            Method::PUT,
            &uri,
            Some(&token),
            Some(delivery("Acme", "2024-01-02", 50.0)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Submission not found");
    }

    #[tokio::test]
    async fn test_oversized_amount_is_rejected() {
        let app = app();
        let token = register(&app, "owner@example.com").await;

        for amount in [json!(5e28), json!("50000000000000000000000000000")] {
            let mut body = delivery("Acme", "2024-01-01", 0.0);
            body["amount"] = amount;
            let (status, body) =
                call(&app, Method::POST, "/api/submissions", Some(&token), Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["errors"][0]["field"], "amount");
        }

        for _ in 0..2 {
            let mut body = delivery("Acme", "2024-01-01", 0.0);
            body["amount"] = json!(999_999_999_999.99);
            let (status, _) =
                call(&app, Method::POST, "/api/submissions", Some(&token), Some(body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (status, body) =
            call(&app, Method::GET, "/api/submissions/stats", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["total_submissions"], 2);
    }
}
