use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use crate::auth::{
    dto::{ErrorBody, LoginRequest, RegisterRequest, TokenResponse, UserQuery},
    extractors::AuthUser,
    service::AuthError,
    store::{StoreError, User},
};
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(register).get(lookup_user))
        .route("/user/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn error_response(err: AuthError) -> (StatusCode, Json<ErrorBody>) {
    let status = match err {
        AuthError::DuplicateUsername | AuthError::WeakInput(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AuthError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorBody::new(err.to_string())))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), (StatusCode, Json<ErrorBody>)> {
    let user = state
        .auth
        .register(&payload.username, &payload.password)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorBody>)> {
    let token = state
        .auth
        .login(&payload.username, &payload.password)
        .await
        .map_err(error_response)?;
    Ok(Json(TokenResponse {
        token,
        message: "Logged in successfully".into(),
    }))
}

/// `GET /user?id=N` or `GET /user?username=S`. The handler decides which
/// lookup to run, same as the original route table.
#[instrument(skip(state))]
pub async fn lookup_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<User>, (StatusCode, Json<ErrorBody>)> {
    let result = if let Some(id) = query.id {
        state.auth.user_by_id(id).await
    } else if let Some(username) = query.username.as_deref() {
        state.auth.user_by_username(username).await
    } else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("missing id or username parameter")),
        ));
    };

    match result {
        Ok(user) => Ok(Json(user)),
        Err(StoreError::NotFound) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("user not found")),
        )),
        Err(e) => {
            warn!(error = %e, "user lookup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("internal error")),
            ))
        }
    }
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_conditions_map_to_client_errors() {
        let (status, _) = error_response(AuthError::DuplicateUsername);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = error_response(AuthError::WeakInput("too short".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = error_response(AuthError::InvalidCredentials);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = error_response(AuthError::Unauthenticated);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let (status, Json(body)) = error_response(AuthError::Internal);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "internal error");
    }
}
