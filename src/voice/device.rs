//! Seam over the vendor voice SDK
//!
//! The controller talks to these traits only. The browser build implements
//! them on top of `Twilio.Device`; tests implement them with recording mocks.

use serde::Serialize;
use thiserror::Error;

use super::events::EventEmitter;

/// Sentinel id the SDK uses for the system default output.
pub const DEFAULT_DEVICE_ID: &str = "default";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoiceError {
    #[error("{0}")]
    Sdk(String),
    #[error("Microphone access failed: {0}")]
    Media(String),
}

/// Lifecycle events raised by the device.
#[derive(Debug, Clone)]
pub enum DeviceEvent<C> {
    Ready,
    Error { message: String },
    Incoming(C),
    /// The caller hung up before the incoming call was answered.
    Cancel(C),
    Connect(C),
    Disconnect(C),
    /// The set of available audio devices changed.
    AudioDevicesChanged,
}

/// Events raised by a single connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionEvent {
    Ringing,
    /// Input and output levels, each nominally in `[0, 1]`.
    Volume { input: f64, output: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Speaker,
    Ringtone,
}

impl OutputKind {
    pub fn element_id(&self) -> &'static str {
        match self {
            OutputKind::Speaker => "speaker-devices",
            OutputKind::Ringtone => "ringtone-devices",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputKind::Speaker => "Speaker Devices",
            OutputKind::Ringtone => "Ringtone Devices",
        }
    }
}

/// An audio output as reported by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDevice {
    pub id: String,
    pub label: String,
}

impl OutputDevice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Parameters for an outgoing call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallParams {
    #[serde(rename = "To")]
    pub to: String,
}

pub trait VoiceDevice: 'static {
    type Connection: VoiceConnection;

    fn events(&self) -> &EventEmitter<DeviceEvent<Self::Connection>>;

    fn connect(&self, params: &CallParams) -> Result<Self::Connection, VoiceError>;

    fn disconnect_all(&self);

    /// Available outputs in SDK order.
    fn available_output_devices(&self) -> Vec<OutputDevice>;

    /// Ids currently selected for `kind`.
    fn selected_output_devices(&self, kind: OutputKind) -> Vec<String>;

    fn set_output_devices(&self, kind: OutputKind, ids: &[String]);

    fn is_output_selection_supported(&self) -> bool;
}

pub trait VoiceConnection: Clone + 'static {
    fn events(&self) -> &EventEmitter<ConnectionEvent>;

    fn accept(&self);

    fn reject(&self);

    /// The `From` call parameter, when present.
    fn caller(&self) -> Option<String>;

    /// Whether both handles refer to the same call.
    fn same_as(&self, other: &Self) -> bool;
}
