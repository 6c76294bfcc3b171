//! Call UI controller
//!
//! Bridges user actions to the voice device and device events to
//! [`PanelState`]. All vendor handles live in [`SessionState`]; every handler
//! is a method taking `&mut self`.

pub mod devices;
pub mod session;
pub mod volume;
mod wiring;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

use crate::api::{ApiError, TokenResponse};
use crate::config::UiConfig;
use crate::voice::{CallParams, DeviceEvent, DeviceOptions, OutputKind, VoiceConnection, VoiceDevice, VoiceError};

pub use devices::{render_device_options, selected_ids, DeviceOption};
pub use session::{ActivityLog, PanelState, SessionState};
pub use volume::{LevelColor, MeterReading};
pub use wiring::{bind_device_events, place_call, start, Notify, SharedController};

#[derive(Error, Debug, Clone)]
pub enum CallUiError {
    #[error("Could not get a token from server!")]
    Token(#[source] ApiError),
    #[error("Twilio.Device Error: {0}")]
    Voice(#[from] VoiceError),
    #[error("Twilio.Device is not set up")]
    NoDevice,
    #[error("No incoming connection to answer")]
    NoConnection,
}

pub struct CallController<D: VoiceDevice> {
    config: UiConfig,
    session: SessionState<D>,
    panel: PanelState,
}

impl<D: VoiceDevice> CallController<D> {
    pub fn new(config: UiConfig) -> Self {
        let panel = PanelState::new(config.log_capacity);
        Self {
            config,
            session: SessionState::default(),
            panel,
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn session(&self) -> &SessionState<D> {
        &self.session
    }

    pub fn device(&self) -> Option<&D> {
        self.session.device.as_ref()
    }

    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.panel.log.push(message);
    }

    pub fn log_error(&mut self, error: &CallUiError) {
        tracing::error!("{}", error);
        self.panel.log.push(error.to_string());
    }

    pub fn begin_token_request(&mut self) {
        self.log("Requesting Access Token...");
    }

    /// Second half of startup: build the device from the token response.
    ///
    /// On any failure the controller stays without a device and the reason
    /// is in the activity log.
    pub fn install_device<F>(&mut self, token: Result<TokenResponse, ApiError>, factory: F) -> Result<(), CallUiError>
    where
        F: FnOnce(&str, &DeviceOptions) -> Result<D, VoiceError>,
    {
        let token = match token {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Token request failed: {}", e);
                let err = CallUiError::Token(e);
                self.panel.log.push(err.to_string());
                return Err(err);
            }
        };

        self.log("Got a token.");
        tracing::debug!("Token: {}", token.token);

        let device = match factory(&token.token, &self.config.device_options) {
            Ok(device) => device,
            Err(e) => {
                let err = CallUiError::from(e);
                self.log_error(&err);
                return Err(err);
            }
        };

        self.panel.client_name = Some(token.identity);
        self.panel.output_selection_visible = device.is_output_selection_supported();
        self.session.device = Some(device);
        Ok(())
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent<D::Connection>) {
        match event {
            DeviceEvent::Ready => self.on_ready(),
            DeviceEvent::Error { message } => self.on_error(message),
            DeviceEvent::Incoming(conn) => self.on_incoming(conn.clone()),
            DeviceEvent::Cancel(conn) => self.on_cancel(conn),
            DeviceEvent::Connect(conn) => self.on_connect(conn),
            DeviceEvent::Disconnect(conn) => self.on_disconnect(conn),
            DeviceEvent::AudioDevicesChanged => self.refresh_devices(),
        }
    }

    pub fn on_ready(&mut self) {
        self.log("Twilio.Device Ready!");
        self.panel.call_controls_visible = true;
    }

    pub fn on_error(&mut self, message: &str) {
        tracing::error!("Twilio.Device Error: {}", message);
        self.panel.log.push(format!("Twilio.Device Error: {}", message));
    }

    /// A newer incoming call replaces one still waiting for an answer.
    pub fn on_incoming(&mut self, conn: D::Connection) {
        let from = conn.caller().unwrap_or_default();
        self.session.incoming = Some(conn);
        self.log(format!("Incoming connection from {}", from));
        self.show_answer_buttons(true);
    }

    pub fn on_cancel(&mut self, conn: &D::Connection) {
        if !self.session.is_incoming(conn) {
            return;
        }
        self.session.incoming = None;
        self.log("Incoming call cancelled.");
        self.show_answer_buttons(false);
    }

    pub fn on_connect(&mut self, conn: &D::Connection) {
        if self.session.is_incoming(conn) {
            self.session.incoming = None;
        }
        self.session.active = Some(conn.clone());
        self.log("Successfully established call!");
        self.panel.call_button_visible = false;
        self.panel.hangup_button_visible = true;
        self.show_answer_buttons(self.session.incoming.is_some());
        self.panel.volume_indicators_visible = true;
    }

    /// Only the handle that disconnected is dropped; another call waiting
    /// for an answer stays answerable.
    pub fn on_disconnect(&mut self, conn: &D::Connection) {
        if self.session.is_incoming(conn) {
            self.session.incoming = None;
            self.show_answer_buttons(false);
        }
        if self.session.is_active(conn) {
            self.session.active = None;
        }
        self.log("Call ended.");
        if self.session.active.is_none() {
            self.panel.call_button_visible = true;
            self.panel.hangup_button_visible = false;
            self.panel.volume_indicators_visible = false;
        }
    }

    pub fn on_ringing(&mut self) {
        self.log("Ringing...");
    }

    pub fn on_volume(&mut self, input: f64, output: f64) {
        self.panel.input_meter = MeterReading::from_level(input);
        self.panel.output_meter = MeterReading::from_level(output);
    }

    /// Dial `to`. Returns the outgoing connection so callers can listen for
    /// ringing; `None` when the device is not set up yet.
    pub fn call(&mut self, to: &str) -> Result<Option<D::Connection>, CallUiError> {
        tracing::info!("Calling {}...", to);
        let Some(device) = self.session.device.as_ref() else {
            tracing::warn!("Call requested before Twilio.Device was set up");
            return Ok(None);
        };

        let params = CallParams { to: to.to_string() };
        match device.connect(&params) {
            Ok(conn) => {
                self.session.active = Some(conn.clone());
                Ok(Some(conn))
            }
            Err(e) => {
                let err = CallUiError::from(e);
                self.log_error(&err);
                Err(err)
            }
        }
    }

    pub fn accept(&mut self) -> Result<(), CallUiError> {
        self.log("Accepting incoming call...");
        let conn = self.take_pending_answer()?;
        conn.accept();
        self.session.active = Some(conn);
        Ok(())
    }

    pub fn reject(&mut self) -> Result<(), CallUiError> {
        self.log("Rejecting incoming call...");
        let conn = self.take_pending_answer()?;
        conn.reject();
        Ok(())
    }

    /// Either answer consumes the waiting call, so only one takes effect.
    fn take_pending_answer(&mut self) -> Result<D::Connection, CallUiError> {
        let Some(conn) = self.session.incoming.take() else {
            let err = CallUiError::NoConnection;
            self.log_error(&err);
            return Err(err);
        };
        self.show_answer_buttons(false);
        Ok(conn)
    }

    fn show_answer_buttons(&mut self, visible: bool) {
        self.panel.accept_button_visible = visible;
        self.panel.reject_button_visible = visible;
    }

    pub fn hangup(&mut self) {
        self.log("Hanging up...");
        if let Some(device) = self.session.device.as_ref() {
            device.disconnect_all();
        }
    }

    /// Rebuild both output lists from what the device reports now.
    pub fn refresh_devices(&mut self) {
        let Some(device) = self.session.device.as_ref() else {
            return;
        };

        let available = device.available_output_devices();
        self.panel.speaker_options =
            render_device_options(&available, &device.selected_output_devices(OutputKind::Speaker));
        self.panel.ringtone_options =
            render_device_options(&available, &device.selected_output_devices(OutputKind::Ringtone));
        tracing::debug!("Rendered {} output devices", available.len());
    }

    pub fn select_output_devices(&mut self, kind: OutputKind, ids: Vec<String>) -> Result<(), CallUiError> {
        let device = self.session.device.as_ref().ok_or(CallUiError::NoDevice)?;
        device.set_output_devices(kind, &ids);

        let options = match kind {
            OutputKind::Speaker => &mut self.panel.speaker_options,
            OutputKind::Ringtone => &mut self.panel.ringtone_options,
        };
        devices::apply_selection(options, &ids);
        Ok(())
    }
}
