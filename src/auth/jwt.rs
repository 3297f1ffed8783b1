use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtConfig;

/// Claims carried by a session token. `jti` is a fresh UUID per issuance, so
/// two tokens minted for the same subject in the same second still differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: Uuid,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature invalid")]
    BadSignature,
    #[error("token malformed")]
    Malformed,
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// HS256 signing and verification keys plus the configured validity window.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    /// An empty secret is a misconfiguration the process must not run with.
    pub fn from_config(cfg: &JwtConfig) -> anyhow::Result<Self> {
        if cfg.secret.is_empty() {
            anyhow::bail!("signing secret must not be empty");
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::hours(cfg.ttl_hours),
        })
    }

    pub fn sign(&self, username: &str) -> Result<String, TokenError> {
        self.sign_at(username, OffsetDateTime::now_utc())
    }

    pub(crate) fn sign_at(
        &self,
        username: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
            jti: Uuid::new_v4(),
        };
        let token =
            encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)?;
        debug!(subject = %claims.sub, jti = %claims.jti, "token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        // Expiry is exact; no clock leeway.
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            }
        })?;
        debug!(subject = %data.claims.sub, "token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            ttl_hours: 24,
        })
        .expect("keys from config")
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.sign("alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, claims.iat + 24 * 3600);
    }

    #[test]
    fn tokens_for_same_subject_differ() {
        let keys = make_keys("dev-secret");
        let first = keys.sign("alice").expect("first");
        let second = keys.sign("alice").expect("second");
        assert_ne!(first, second);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let keys = make_keys("dev-secret");
        // Issued 48h ago with a 24h window, so it expired 24h ago.
        let issued = OffsetDateTime::now_utc() - Duration::hours(48);
        let token = keys.sign_at("alice", issued).expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Expired));
    }

    #[test]
    fn foreign_secret_is_rejected_as_bad_signature() {
        let keys = make_keys("dev-secret");
        let other = make_keys("another-secret");
        let token = other.sign("alice").expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_rejected_as_malformed() {
        let keys = make_keys("dev-secret");
        let err = keys.verify("not.a.token").unwrap_err();
        assert!(matches!(err, TokenError::Malformed));
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let res = JwtKeys::from_config(&JwtConfig {
            secret: String::new(),
            ttl_hours: 24,
        });
        assert!(res.is_err());
    }
}
