use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::ErrorBody;
use crate::auth::extractors::AuthUser;
use crate::keys::{dto::CreateKeyRequest, repo};
use crate::state::AppState;

pub fn key_routes() -> Router<AppState> {
    Router::new()
        .route("/keys", post(create_key).get(list_keys))
        .route("/keys/user/:id", get(list_keys_by_user))
        .route("/keys/:id", delete(delete_key))
}

fn internal() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("internal error")),
    )
}

#[instrument(skip(state, user, payload))]
pub async fn create_key(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<repo::PublicKey>), (StatusCode, Json<ErrorBody>)> {
    if payload.key_data.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("key_data must not be empty")),
        ));
    }

    let key = repo::insert(
        &state.db,
        user.id,
        payload.label.as_deref(),
        &payload.key_data,
    )
    .await
    .map_err(|e| {
        error!(error = %e, owner_id = user.id, "insert public key failed");
        internal()
    })?;

    info!(key_id = key.id, owner_id = user.id, "public key registered");
    Ok((StatusCode::CREATED, Json(key)))
}

#[instrument(skip(state))]
pub async fn list_keys(
    State(state): State<AppState>,
) -> Result<Json<Vec<repo::PublicKey>>, (StatusCode, Json<ErrorBody>)> {
    let keys = repo::list(&state.db).await.map_err(|e| {
        error!(error = %e, "list public keys failed");
        internal()
    })?;
    Ok(Json(keys))
}

#[instrument(skip(state))]
pub async fn list_keys_by_user(
    State(state): State<AppState>,
    Path(owner_id): Path<i64>,
) -> Result<Json<Vec<repo::PublicKey>>, (StatusCode, Json<ErrorBody>)> {
    let keys = repo::list_by_owner(&state.db, owner_id).await.map_err(|e| {
        error!(error = %e, owner_id, "list public keys by owner failed");
        internal()
    })?;
    Ok(Json(keys))
}

#[instrument(skip(state, user))]
pub async fn delete_key(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(key_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    let key = repo::get(&state.db, key_id)
        .await
        .map_err(|e| {
            error!(error = %e, key_id, "load public key failed");
            internal()
        })?
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new("public key not found")),
        ))?;

    if key.owner_id != user.id {
        warn!(key_id, owner_id = key.owner_id, caller_id = user.id, "key delete denied");
        return Err((
            StatusCode::FORBIDDEN,
            Json(ErrorBody::new("not the owner of this key")),
        ));
    }

    repo::delete(&state.db, key_id).await.map_err(|e| {
        error!(error = %e, key_id, "delete public key failed");
        internal()
    })?;

    info!(key_id, owner_id = user.id, "public key deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn public_key_serialization_includes_owner() {
        let key = repo::PublicKey {
            id: 7,
            owner_id: 3,
            label: Some("laptop".into()),
            key_data: "ssh-ed25519 AAAA...".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&key).expect("serialize");
        assert_eq!(json["id"], 7);
        assert_eq!(json["owner_id"], 3);
        assert_eq!(json["label"], "laptop");
    }
}
