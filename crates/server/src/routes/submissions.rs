//! Submission route handlers.

use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use flowrite_core::{PageQuery, Submission, SubmissionId, SubmissionInput, SubmissionStats};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCount {
    pub deleted_count: u64,
}

/// `GET /api/submissions?limit&offset`
#[instrument(skip(state))]
pub async fn index(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> Result<ApiResponse<Vec<Submission>>> {
    let page = page.validate()?;
    Ok(ApiResponse::ok(state.records().list_submissions(owner, page).await?))
}

/// `GET /api/submissions/stats`
#[instrument(skip(state))]
pub async fn stats(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<SubmissionStats>> {
    Ok(ApiResponse::ok(state.records().submission_stats(owner).await?))
}

/// `GET /api/submissions/date-range?startDate&endDate`
#[instrument(skip(state))]
pub async fn date_range(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<RangeQuery>,
) -> Result<ApiResponse<Vec<Submission>>> {
    let found = state
        .records()
        .submissions_in_range(owner, range.start_date.as_deref(), range.end_date.as_deref())
        .await?;
    Ok(ApiResponse::ok(found))
}

/// `GET /api/submissions/customer/{name}`
#[instrument(skip(state))]
pub async fn for_customer(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<ApiResponse<Vec<Submission>>> {
    let found = state.records().submissions_for_customer(owner, &name).await?;
    Ok(ApiResponse::ok(found))
}

/// `DELETE /api/submissions/customer/{name}`
#[instrument(skip(state))]
pub async fn destroy_for_customer(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<ApiResponse<DeletedCount>> {
    let deleted_count = state
        .records()
        .delete_submissions_for_customer(owner, &name)
        .await?;
    Ok(ApiResponse::ok(DeletedCount { deleted_count })
        .with_message(format!("{deleted_count} submission(s) deleted successfully")))
}

/// `GET /api/submissions/{id}`
#[instrument(skip(state))]
pub async fn show(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubmissionId>,
) -> Result<ApiResponse<Submission>> {
    Ok(ApiResponse::ok(state.records().get_submission(owner, id).await?))
}

/// `POST /api/submissions`
#[instrument(skip(state, input))]
pub async fn create(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SubmissionInput>,
) -> Result<ApiResponse<Submission>> {
    let submission = state.records().create_submission(owner, input).await?;
    Ok(ApiResponse::created(submission).with_message("Submission created successfully"))
}

/// `PUT /api/submissions/{id}`
#[instrument(skip(state, input))]
pub async fn update(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubmissionId>,
    ApiJson(input): ApiJson<SubmissionInput>,
) -> Result<ApiResponse<Submission>> {
    let submission = state.records().update_submission(owner, id, input).await?;
    Ok(ApiResponse::ok(submission).with_message("Submission updated successfully"))
}

/// `DELETE /api/submissions/{id}`
#[instrument(skip(state))]
pub async fn destroy(
    RequireAuth(owner): RequireAuth,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<SubmissionId>,
) -> Result<ApiResponse<()>> {
    state.records().delete_submission(owner, id).await?;
    Ok(ApiResponse::message("Submission deleted successfully"))
}
