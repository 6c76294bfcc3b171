//! Development server
//!
//! Serves the built web bundle and forwards `GET /voice-token` to the token
//! service named by `VOICE_TOKEN_URL`, so the page can fetch its token from
//! its own origin.

use std::path::PathBuf;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{self, TokenResponse};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub dist_dir: PathBuf,
    pub voice_token_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let dist_dir = std::env::var("DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("dist"));
        let voice_token_url = std::env::var("VOICE_TOKEN_URL").ok().filter(|u| !u.is_empty());

        Self {
            port,
            dist_dir,
            voice_token_url,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub voice_token_url: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    token_proxy: bool,
}

pub fn create_router(state: AppState, dist_dir: PathBuf) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/voice-token", get(voice_token))
        .fallback_service(ServeDir::new(dist_dir).append_index_html_on_directories(true))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        token_proxy: state.voice_token_url.is_some(),
    })
}

async fn voice_token(State(state): State<AppState>) -> Result<Json<TokenResponse>, (StatusCode, String)> {
    let Some(url) = state.voice_token_url.as_deref() else {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "VOICE_TOKEN_URL is not configured".to_string()));
    };

    let response = state.http.get(url).send().await.map_err(|e| {
        tracing::error!("Token service unreachable: {}", e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let token: TokenResponse = api::client::handle_response(response).await.map_err(|e| {
        tracing::error!("Token service error: {}", e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    tracing::info!("Issued token for {}", token.identity);
    Ok(Json(token))
}

pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    if config.voice_token_url.is_none() {
        tracing::warn!("VOICE_TOKEN_URL not set; /voice-token will answer 503");
    }

    let state = AppState {
        http: reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?,
        voice_token_url: config.voice_token_url.clone(),
    };
    let app = create_router(state, config.dist_dir.clone());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Serving {} on http://{}", config.dist_dir.display(), addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
