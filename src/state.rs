use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{jwt::JwtKeys, password::Hasher, service::AuthService, store::UserStore};
use crate::config::AppConfig;
use crate::db::{self, PgUserStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: AuthService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;
        Self::from_parts(db, config)
    }

    /// Wires the auth service from its parts. A bad signing secret or bad
    /// argon2 parameters fail here, before the server starts listening.
    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let keys = JwtKeys::from_config(&config.jwt)?;
        let hasher = Hasher::new(&config.hash)?;
        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        let auth = AuthService::new(users, hasher, keys, config.min_password_len);
        Ok(Self { db, auth, config })
    }
}
