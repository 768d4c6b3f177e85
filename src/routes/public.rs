use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::ApplyPayload,
    dto::posting_dto::PostingListQuery,
    error::Result,
    middleware::auth::Claims,
    routes::account_id,
    AppState,
};

#[axum::debug_handler]
pub async fn list_open_postings(
    State(state): State<AppState>,
    Query(query): Query<PostingListQuery>,
) -> Result<impl IntoResponse> {
    let limit = query.limit.unwrap_or(20).min(100);
    let postings = state.posting_service.list_open(limit).await?;
    Ok(Json(postings))
}

#[axum::debug_handler]
pub async fn get_posting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.get_by_id(id).await?;
    Ok(Json(posting))
}

/// Submit an application, then give the closure policy a chance to flip the
/// posting's flag with the fresh count.
#[axum::debug_handler]
pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let applicant_id = account_id(&claims)?;
    let application = state
        .application_service
        .submit(id, applicant_id, payload)
        .await?;
    state.closure_policy.evaluate(id, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(application)))
}
