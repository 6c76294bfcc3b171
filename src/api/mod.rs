pub mod client;
pub mod token;

pub use client::*;
pub use token::{fetch_voice_token, TokenResponse};
