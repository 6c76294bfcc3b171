//! Access token endpoint

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

/// Body of `GET ./voice-token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub identity: String,
}

pub async fn fetch_voice_token(client: &ApiClient, path: &str) -> Result<TokenResponse, ApiError> {
    client.get::<TokenResponse>(path).await
}
