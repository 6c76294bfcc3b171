//! Microphone permission

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{MediaStream, MediaStreamConstraints, MediaStreamTrack};

use super::device::VoiceError;
use super::twilio::js_error_message;

/// Ask the browser for microphone access.
///
/// Device labels are hidden until the page holds a media permission, so this
/// runs before the output lists are refreshed. The granted stream is only
/// needed for the permission, so its tracks are stopped straight away.
pub async fn request_microphone() -> Result<(), VoiceError> {
    let window = web_sys::window().ok_or_else(|| VoiceError::Media("no window".to_string()))?;
    let media_devices = window
        .navigator()
        .media_devices()
        .map_err(|e| VoiceError::Media(js_error_message(&e)))?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);

    let promise = media_devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| VoiceError::Media(js_error_message(&e)))?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| VoiceError::Media(js_error_message(&e)))?
        .dyn_into()
        .map_err(|_| VoiceError::Media("getUserMedia did not return a MediaStream".to_string()))?;

    for track in stream.get_tracks().iter() {
        track.unchecked_into::<MediaStreamTrack>().stop();
    }
    tracing::debug!("Microphone permission granted, tracks released");
    Ok(())
}
