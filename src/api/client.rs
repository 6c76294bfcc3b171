use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Invalid response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

/// HTTP client resolving request paths against a base URL.
///
/// In the browser the base is the page URL, so `./voice-token` lands next to
/// the page the same way a relative `fetch` would.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        // On wasm, we can't use timeout
        #[cfg(target_arch = "wasm32")]
        let client = Client::new();

        #[cfg(not(target_arch = "wasm32"))]
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(ApiClient { base_url, client })
    }

    /// Client rooted at the current page.
    #[cfg(target_arch = "wasm32")]
    pub fn for_current_page() -> Result<Self, ApiError> {
        let href = web_sys::window()
            .and_then(|w| w.location().href().ok())
            .ok_or_else(|| ApiError::InvalidUrl("window.location unavailable".to_string()))?;
        Self::new(&href)
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path)?;
        let response = self.client.get(url).send().await?;
        handle_response(response).await
    }
}

pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();

    match status {
        StatusCode::OK => response.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string())),
        StatusCode::NOT_FOUND => {
            let text = response.text().await.unwrap_or_default();
            Err(ApiError::NotFound(text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ApiError::Server(format!("{}: {}", status, text)))
        }
    }
}
