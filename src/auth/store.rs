use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

/// User record. The hash never leaves the service in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Storage collaborator for user records. Usernames are matched exactly as
/// stored; no trimming or case folding happens at this layer.
///
/// `create` must be atomic under concurrent calls for the same username:
/// implementations rely on their own uniqueness guard and report a collision
/// as [`StoreError::DuplicateUsername`], never as a backend failure.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;
    async fn by_id(&self, id: i64) -> Result<User, StoreError>;
    async fn by_username(&self, username: &str) -> Result<User, StoreError>;
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use super::*;

    /// In-memory store for service tests. The mutex spans the whole
    /// check-then-insert, which is the atomicity `create` promises.
    #[derive(Default)]
    pub(crate) struct MemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl MemoryUserStore {
        pub(crate) fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserStore for MemoryUserStore {
        async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.username == username) {
                return Err(StoreError::DuplicateUsername);
            }
            let user = User {
                id: users.len() as i64 + 1,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at: OffsetDateTime::now_utc(),
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn by_id(&self, id: i64) -> Result<User, StoreError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or(StoreError::NotFound)
        }

        async fn by_username(&self, username: &str) -> Result<User, StoreError> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned()
                .ok_or(StoreError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryUserStore;
    use super::*;

    #[tokio::test]
    async fn create_then_lookup_by_both_keys() {
        let store = MemoryUserStore::default();
        let created = store.create("alice", "phc-string").await.expect("create");
        assert_eq!(store.by_id(created.id).await.expect("by id").username, "alice");
        assert_eq!(store.by_username("alice").await.expect("by name").id, created.id);
    }

    #[tokio::test]
    async fn duplicate_username_is_reported_as_such() {
        let store = MemoryUserStore::default();
        store.create("alice", "h1").await.expect("first create");
        let err = store.create("alice", "h2").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let store = MemoryUserStore::default();
        store.create("Alice", "h1").await.expect("create");
        assert!(matches!(
            store.by_username("alice").await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "phc-string".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }
}
