use axum::{
    extract::State,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::profile_dto::{CapacityStatusResponse, SaveProfilePayload},
    error::{Error, Result},
    middleware::auth::Claims,
    routes::account_id,
    AppState,
};

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    let profile = state
        .profile_service
        .get(employer_id)
        .await?
        .ok_or_else(|| Error::NotFound("Employer profile not set up yet".to_string()))?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn save_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SaveProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let employer_id = account_id(&claims)?;
    let profile = state.profile_service.save(employer_id, payload).await?;
    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn capacity_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let employer_id = account_id(&claims)?;
    let status = state.ledger.status(employer_id, None).await?;
    Ok(Json(CapacityStatusResponse::from(status)))
}
