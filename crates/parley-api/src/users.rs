use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use parley_core::CoreError;
use parley_crypto::Subject;
use parley_types::api::{UpdateUserRequest, UserResponse};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.accounts.get_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.accounts.get_one(&id).await?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    ensure_self(&subject, &id)?;
    let user = state.accounts.update(&id, &req.email, &req.password).await?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(subject): Extension<Subject>,
) -> Result<StatusCode, ApiError> {
    ensure_self(&subject, &id)?;
    state.accounts.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Accounts are only changed by their owner. Anyone else gets the same
/// answer as for an id that doesn't exist.
fn ensure_self(subject: &Subject, id: &str) -> Result<(), ApiError> {
    if subject.as_str() == id {
        Ok(())
    } else {
        Err(CoreError::NotFound(format!("user {} not found", id)).into())
    }
}
