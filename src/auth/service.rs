use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::auth::{
    jwt::JwtKeys,
    password::Hasher,
    store::{StoreError, User, UserStore},
};

/// Errors surfaced to callers of the authentication use cases.
///
/// Unknown-username and wrong-password logins both map to
/// [`AuthError::InvalidCredentials`] so responses cannot be used to probe
/// which usernames exist.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("{0}")]
    WeakInput(String),
    #[error("internal error")]
    Internal,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Hasher,
    keys: JwtKeys,
    min_password_len: usize,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Hasher,
        keys: JwtKeys,
        min_password_len: usize,
    ) -> Self {
        Self {
            users,
            hasher,
            keys,
            min_password_len,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() {
            return Err(AuthError::WeakInput("username must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AuthError::WeakInput("password must not be empty".into()));
        }
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::WeakInput(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }

        let hash = self.hasher.hash(password).map_err(|e| {
            error!(error = %e, "hash_password failed");
            AuthError::Internal
        })?;

        match self.users.create(username, &hash).await {
            Ok(user) => {
                info!(user_id = user.id, username = %user.username, "user registered");
                Ok(user)
            }
            Err(StoreError::DuplicateUsername) => {
                warn!(username = %username, "registration for taken username");
                Err(AuthError::DuplicateUsername)
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                Err(AuthError::Internal)
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = match self.users.by_username(username).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                warn!(username = %username, "login for unknown username");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "user lookup failed");
                return Err(AuthError::Internal);
            }
        };

        match self.hasher.verify(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = user.id, "login with wrong password");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, user_id = user.id, "password verification failed");
                return Err(AuthError::Internal);
            }
        }

        let token = self.keys.sign(&user.username).map_err(|e| {
            error!(error = %e, user_id = user.id, "token signing failed");
            AuthError::Internal
        })?;

        info!(user_id = user.id, username = %user.username, "user logged in");
        Ok(token)
    }

    /// Resolve a bearer token back to its user. Every failure mode collapses
    /// to [`AuthError::Unauthenticated`]; backend faults are still logged.
    pub async fn identify(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.keys.verify(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AuthError::Unauthenticated
        })?;

        match self.users.by_username(&claims.sub).await {
            Ok(user) => Ok(user),
            Err(StoreError::NotFound) => {
                warn!(subject = %claims.sub, "token subject no longer exists");
                Err(AuthError::Unauthenticated)
            }
            Err(e) => {
                error!(error = %e, subject = %claims.sub, "subject lookup failed");
                Err(AuthError::Unauthenticated)
            }
        }
    }

    pub async fn user_by_id(&self, id: i64) -> Result<User, StoreError> {
        self.users.by_id(id).await
    }

    pub async fn user_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.users.by_username(username).await
    }
}
