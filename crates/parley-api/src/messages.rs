use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use parley_crypto::Subject;
use parley_types::api::{CreateMessageRequest, MessageResponse, UpdateMessageRequest};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let messages = state.messages.get_all().await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state.messages.get_one(&id).await?;
    Ok(Json(message.into()))
}

/// The owner comes from the validated token, never from the body.
pub async fn create_message(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<CreateMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.messages.create(&subject, &req.body).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

pub async fn update_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(subject): Extension<Subject>,
    Json(req): Json<UpdateMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state.messages.update(&id, &req.body, &subject).await?;
    Ok(Json(message.into()))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(subject): Extension<Subject>,
) -> Result<StatusCode, ApiError> {
    state.messages.delete(&id, &subject).await?;
    Ok(StatusCode::NO_CONTENT)
}
