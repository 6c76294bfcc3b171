//! Controller state

use std::collections::VecDeque;

use super::devices::DeviceOption;
use super::volume::MeterReading;
use crate::voice::{VoiceConnection, VoiceDevice};

/// Handles owned by the controller for the lifetime of the page.
///
/// An incoming call waiting for an answer and the call in progress are
/// tracked apart, so a ring during a call never displaces the live one.
pub struct SessionState<D: VoiceDevice> {
    pub device: Option<D>,
    /// Incoming connection waiting for accept or reject.
    pub incoming: Option<D::Connection>,
    /// Call in progress, dialed or answered.
    pub active: Option<D::Connection>,
}

impl<D: VoiceDevice> SessionState<D> {
    pub fn is_incoming(&self, conn: &D::Connection) -> bool {
        self.incoming.as_ref().is_some_and(|c| c.same_as(conn))
    }

    pub fn is_active(&self, conn: &D::Connection) -> bool {
        self.active.as_ref().is_some_and(|c| c.same_as(conn))
    }
}

impl<D: VoiceDevice> Default for SessionState<D> {
    fn default() -> Self {
        Self {
            device: None,
            incoming: None,
            active: None,
        }
    }
}

/// Bounded activity log, oldest line first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Everything the call panel renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub call_controls_visible: bool,
    pub call_button_visible: bool,
    pub hangup_button_visible: bool,
    pub accept_button_visible: bool,
    pub reject_button_visible: bool,
    pub volume_indicators_visible: bool,
    pub output_selection_visible: bool,
    pub client_name: Option<String>,
    pub input_meter: MeterReading,
    pub output_meter: MeterReading,
    pub speaker_options: Vec<DeviceOption>,
    pub ringtone_options: Vec<DeviceOption>,
    pub log: ActivityLog,
}

impl PanelState {
    pub fn new(log_capacity: usize) -> Self {
        Self {
            call_controls_visible: false,
            call_button_visible: true,
            hangup_button_visible: false,
            accept_button_visible: false,
            reject_button_visible: false,
            volume_indicators_visible: false,
            output_selection_visible: false,
            client_name: None,
            input_meter: MeterReading::default(),
            output_meter: MeterReading::default(),
            speaker_options: Vec::new(),
            ringtone_options: Vec::new(),
            log: ActivityLog::with_capacity(log_capacity),
        }
    }
}
