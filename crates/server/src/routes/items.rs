//! Catalog item route handlers.

use axum::extract::State;
use tracing::instrument;

use flowrite_core::{Item, ItemId, ItemInput, PageQuery};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// `GET /api/items`
///
/// Every item unless the caller asks for a `limit`.
#[instrument(skip(state))]
pub async fn index(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<ApiResponse<Vec<Item>>> {
    let page = page.validate_or_all()?;
    Ok(ApiResponse::ok(state.records().list_items(owner, page).await?))
}

/// `GET /api/items/{id}`
#[instrument(skip(state))]
pub async fn show(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<ApiResponse<Item>> {
    Ok(ApiResponse::ok(state.records().get_item(owner, id).await?))
}

/// `POST /api/items`
#[instrument(skip(state, input))]
pub async fn create(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<ApiResponse<Item>> {
    let item = state.records().create_item(owner, input).await?;
    Ok(ApiResponse::created(item).with_message("Item created successfully"))
}

/// `PUT /api/items/{id}`
#[instrument(skip(state, input))]
pub async fn update(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
    ApiJson(input): ApiJson<ItemInput>,
) -> Result<ApiResponse<Item>> {
    let item = state.records().update_item(owner, id, input).await?;
    Ok(ApiResponse::ok(item).with_message("Item updated successfully"))
}

/// `DELETE /api/items/{id}`
#[instrument(skip(state))]
pub async fn destroy(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ItemId>,
) -> Result<ApiResponse<()>> {
    state.records().delete_item(owner, id).await?;
    Ok(ApiResponse::message("Item deleted successfully"))
}
