//! Customer route handlers.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use flowrite_core::{Customer, CustomerId, CustomerInput, PageQuery};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub cascade: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCustomer {
    pub deleted_submissions: u64,
}

/// `GET /api/customers`
///
/// Every customer unless the caller asks for a `limit`.
#[instrument(skip(state))]
pub async fn index(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<ApiResponse<Vec<Customer>>> {
    let page = page.validate_or_all()?;
    Ok(ApiResponse::ok(state.records().list_customers(owner, page).await?))
}

/// `GET /api/customers/search?q=`
#[instrument(skip(state))]
pub async fn search(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<ApiResponse<Vec<Customer>>> {
    let found = state
        .records()
        .search_customers(owner, query.q.as_deref())
        .await?;
    Ok(ApiResponse::ok(found))
}

/// `GET /api/customers/{id}`
#[instrument(skip(state))]
pub async fn show(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
) -> Result<ApiResponse<Customer>> {
    Ok(ApiResponse::ok(state.records().get_customer(owner, id).await?))
}

/// `POST /api/customers`
#[instrument(skip(state, input))]
pub async fn create(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CustomerInput>,
) -> Result<ApiResponse<Customer>> {
    let customer = state.records().create_customer(owner, input).await?;
    Ok(ApiResponse::created(customer).with_message("Customer created successfully"))
}

/// `PUT /api/customers/{id}`
#[instrument(skip(state, input))]
pub async fn update(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiJson(input): ApiJson<CustomerInput>,
) -> Result<ApiResponse<Customer>> {
    let customer = state.records().update_customer(owner, id, input).await?;
    Ok(ApiResponse::ok(customer).with_message("Customer updated successfully"))
}

/// `DELETE /api/customers/{id}[?cascade=true]`
#[instrument(skip(state))]
pub async fn destroy(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<CustomerId>,
    ApiQuery(query): ApiQuery<DeleteQuery>,
) -> Result<ApiResponse<DeletedCustomer>> {
    let deleted_submissions = state
        .records()
        .delete_customer(owner, id, query.cascade)
        .await?;
    Ok(ApiResponse::ok(DeletedCustomer { deleted_submissions })
        .with_message("Customer deleted successfully"))
}
