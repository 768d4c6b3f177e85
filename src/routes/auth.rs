use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    config::get_config,
    dto::auth_dto::{LoginPayload, RegisterPayload, TokenResponse},
    error::{Error, Result},
    models::account::{ROLE_EMPLOYER, ROLE_SEEKER},
    utils::token::issue_token,
    AppState,
};

fn check_role(role: &str) -> Result<()> {
    if role != ROLE_SEEKER && role != ROLE_EMPLOYER {
        return Err(Error::BadRequest(format!(
            "Role must be '{}' or '{}'",
            ROLE_SEEKER, ROLE_EMPLOYER
        )));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    check_role(&payload.role)?;
    let account = state.account_service.register(payload).await?;
    let token = issue_token(&account, &get_config().jwt_secret)?;
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            account_id: account.id,
            role: account.role,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    check_role(&payload.role)?;
    let account = state.account_service.login(payload).await?;
    let token = issue_token(&account, &get_config().jwt_secret)?;
    Ok(Json(TokenResponse {
        token,
        account_id: account.id,
        role: account.role,
    }))
}
