use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Public key registered by a user. `key_data` is opaque armored material;
/// this service stores and serves it but never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicKey {
    pub id: i64,
    pub owner_id: i64,
    pub label: Option<String>,
    pub key_data: String,
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    owner_id: i64,
    label: Option<&str>,
    key_data: &str,
) -> anyhow::Result<PublicKey> {
    let key = sqlx::query_as::<_, PublicKey>(
        r#"
        INSERT INTO public_keys (owner_id, label, key_data)
        VALUES ($1, $2, $3)
        RETURNING id, owner_id, label, key_data, created_at
        "#,
    )
    .bind(owner_id)
    .bind(label)
    .bind(key_data)
    .fetch_one(db)
    .await?;
    Ok(key)
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<PublicKey>> {
    let keys = sqlx::query_as::<_, PublicKey>(
        r#"
        SELECT id, owner_id, label, key_data, created_at
        FROM public_keys
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(keys)
}

pub async fn list_by_owner(db: &PgPool, owner_id: i64) -> anyhow::Result<Vec<PublicKey>> {
    let keys = sqlx::query_as::<_, PublicKey>(
        r#"
        SELECT id, owner_id, label, key_data, created_at
        FROM public_keys
        WHERE owner_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await?;
    Ok(keys)
}

pub async fn get(db: &PgPool, id: i64) -> anyhow::Result<Option<PublicKey>> {
    let key = sqlx::query_as::<_, PublicKey>(
        r#"
        SELECT id, owner_id, label, key_data, created_at
        FROM public_keys
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(key)
}

pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(r#"DELETE FROM public_keys WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
