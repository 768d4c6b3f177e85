use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::posting_dto::{CreatePostingPayload, PinPayload, UpdatePostingPayload},
    error::{Error, Result},
    middleware::auth::Claims,
    routes::account_id,
    services::posting_service::PostingResult,
    AppState,
};

// Admission rejections become a 409 carrying the numbers; the accounting
// core only supplies them, the message is rendered here.
fn capacity_rejected(committed: i64, limit: i64) -> Response {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": format!(
                "Your total vacancies (currently {}) would exceed your limit of {}",
                committed, limit
            ),
            "committed": committed,
            "limit": limit,
        })),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn create_posting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostingPayload>,
) -> Result<Response> {
    payload.validate()?;
    let employer_id = account_id(&claims)?;
    match state.posting_service.create(employer_id, payload).await? {
        PostingResult::Saved(posting) => {
            Ok((StatusCode::CREATED, Json(posting)).into_response())
        }
        PostingResult::Rejected { committed, limit } => Ok(capacity_rejected(committed, limit)),
    }
}

#[axum::debug_handler]
pub async fn update_posting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostingPayload>,
) -> Result<Response> {
    payload.validate()?;
    let employer_id = account_id(&claims)?;
    match state
        .posting_service
        .update(employer_id, id, payload, Utc::now())
        .await?
    {
        PostingResult::Saved(posting) => Ok(Json(posting).into_response()),
        PostingResult::Rejected { committed, limit } => Ok(capacity_rejected(committed, limit)),
    }
}

#[axum::debug_handler]
pub async fn delete_posting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    state.posting_service.delete(employer_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn pin_posting(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PinPayload>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    let posting = state
        .posting_service
        .set_pin(employer_id, id, payload.pin_state)
        .await?;
    Ok(Json(posting))
}

#[axum::debug_handler]
pub async fn list_my_postings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    let postings = state.posting_service.list_for_employer(employer_id).await?;
    Ok(Json(postings))
}

#[axum::debug_handler]
pub async fn list_posting_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    let posting = state.posting_service.get_by_id(id).await?;
    if posting.employer_id != employer_id {
        return Err(Error::NotFound(
            "Posting not found or not owned by this employer".to_string(),
        ));
    }
    let applications = state.application_service.list_for_posting(id).await?;
    Ok(Json(applications))
}

#[axum::debug_handler]
pub async fn list_all_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    let applications = state
        .application_service
        .list_for_employer(employer_id)
        .await?;
    Ok(Json(applications))
}
