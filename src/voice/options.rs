//! Options passed to the vendor device constructor

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Opus,
    Pcmu,
}

/// Device options, serialized in the SDK's camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceOptions {
    /// Codecs in order of preference.
    pub codec_preferences: Vec<Codec>,
    /// Play DTMF tones locally instead of capturing them from the mic.
    #[serde(rename = "fakeLocalDTMF")]
    pub fake_local_dtmf: bool,
    /// Emit `ringing` on outgoing connections.
    pub enable_ringing_state: bool,
    /// Regional ingress the SDK connects through.
    pub edge: String,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            codec_preferences: vec![Codec::Opus, Codec::Pcmu],
            fake_local_dtmf: true,
            enable_ringing_state: true,
            edge: "sao-paulo".to_string(),
        }
    }
}

impl DeviceOptions {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
