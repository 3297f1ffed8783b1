use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub message: String,
}

/// Query parameters for `GET /user`.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub id: Option<i64>,
    pub username: Option<String>,
}

/// Uniform JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_serialization() {
        let response = TokenResponse {
            token: "abc.def.ghi".into(),
            message: "Logged in successfully".into(),
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["token"], "abc.def.ghi");
        assert_eq!(json["message"], "Logged in successfully");
    }
}
