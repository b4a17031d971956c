use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use parley_core::CoreError;

use crate::auth::AppState;
use crate::error::ApiError;

/// Validate the bearer token and hand the resulting `Subject` to the
/// handler as a request extension. Rejected requests never reach a service.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let raw = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => value.to_str().map_err(|_| {
            ApiError::from(CoreError::Unauthenticated(
                "authorization header is not valid text".into(),
            ))
        })?,
        None => "",
    };

    let subject = state.tokens.validate(raw).map_err(|e| {
        warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        ApiError::from(CoreError::from(e))
    })?;

    req.extensions_mut().insert(subject);
    Ok(next.run(req).await)
}
