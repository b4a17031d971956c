use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use parley_core::{AccountService, MessagingService};
use parley_crypto::TokenIssuer;
use parley_types::api::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: AccountService,
    pub messages: MessagingService,
    pub tokens: TokenIssuer,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.accounts.register(&req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let session = state.accounts.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        id: session.user_id,
        email: session.email,
        access_token: session.token,
    }))
}
