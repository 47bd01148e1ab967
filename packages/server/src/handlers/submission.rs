use axum::Json;
use axum::extract::State;
use tracing::{info, instrument};

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::submission::{SearchSubmissionsRequest, SubmissionResponse};
use crate::search;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/submissions",
    tag = "Submissions",
    operation_id = "searchSubmissions",
    summary = "Search mirrored submissions",
    description = "Refreshes the local mirror from the judge API for the requested user, problem, and language, then returns one page of matching submissions ranked by recency. Rows tied on submission time, user, and problem share a rank and are returned on the same page. With no filter at all, only stored submissions are searched.",
    request_body = SearchSubmissionsRequest,
    responses(
        (status = 200, description = "One page of ranked submissions", body = Vec<SubmissionResponse>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 502, description = "Judge API failure (UPSTREAM_UNAVAILABLE, UPSTREAM_DECODE_ERROR, MALFORMED_RECORD)", body = ErrorBody),
        (status = 503, description = "Database unavailable (STORAGE_UNAVAILABLE)", body = ErrorBody),
        (status = 500, description = "Internal error (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn search_submissions(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SearchSubmissionsRequest>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    let filter = payload.into_filter(state.config.search.max_page_size)?;

    let report = state.synchronizer.sync(&state.db, &filter).await?;
    let rows = search::search_submissions(&state.db, &filter).await?;

    info!(
        user_id = filter.user_id.as_deref(),
        problem_id = filter.problem_id.as_deref(),
        language = filter.language.as_deref(),
        fetched = report.fetched,
        inserted = report.inserted,
        returned = rows.len(),
        "Submission search served"
    );

    Ok(Json(rows.into_iter().map(SubmissionResponse::from).collect()))
}
