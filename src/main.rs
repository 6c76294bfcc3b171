//! Voice Call UI
//!
//! Browser call panel for the Twilio Voice SDK, built with Dioxus.
//!
//! The wasm build is the panel itself. The native build is a small dev server
//! that serves the bundle and forwards `/voice-token`.

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod api;
mod config;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod controller;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod voice;

#[cfg(target_arch = "wasm32")]
mod components;

#[cfg(not(target_arch = "wasm32"))]
mod server;

#[cfg(target_arch = "wasm32")]
use dioxus::prelude::*;

fn main() {
    // On wasm, just run the app
    #[cfg(target_arch = "wasm32")]
    {
        dioxus::launch(App);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("voice_call_ui=info,tower_http=info")),
            )
            .init();

        // Load environment variables
        dotenvy::dotenv().ok();

        let config = server::ServerConfig::from_env();
        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!("Failed to start runtime: {}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = runtime.block_on(server::run_server(config)) {
            tracing::error!("Server error: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[component]
fn App() -> Element {
    rsx! {
        // Global styles
        style { {include_str!("../assets/styles.css")} }

        components::phone::CallPanel {}
    }
}
