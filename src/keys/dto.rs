use serde::Deserialize;

/// Request body for registering a public key.
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    pub label: Option<String>,
    pub key_data: String,
}
