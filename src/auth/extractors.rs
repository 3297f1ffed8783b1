use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};

use crate::auth::dto::ErrorBody;
use crate::auth::store::User;
use crate::state::AppState;

/// Extracts the bearer token and resolves it to the authenticated user.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| unauthorized("missing Authorization header"))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| unauthorized("invalid auth scheme"))?;

        let user = state
            .auth
            .identify(token)
            .await
            .map_err(|_| unauthorized("invalid or expired token"))?;

        Ok(AuthUser(user))
    }
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::UNAUTHORIZED, Json(ErrorBody::new(message)))
}
