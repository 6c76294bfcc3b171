//! Recording mocks for controller tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::api::{ApiError, TokenResponse};
use crate::voice::{
    CallParams, ConnectionEvent, DeviceEvent, EventEmitter, OutputDevice, OutputKind, VoiceConnection, VoiceDevice,
    VoiceError,
};

pub fn ok_token(identity: &str) -> Result<TokenResponse, ApiError> {
    Ok(TokenResponse {
        token: format!("token-{}", identity),
        identity: identity.to_string(),
    })
}

#[derive(Clone, Default)]
pub struct MockConnection {
    inner: Rc<MockConnectionInner>,
}

#[derive(Default)]
struct MockConnectionInner {
    events: EventEmitter<ConnectionEvent>,
    caller: Option<String>,
    accepts: Cell<u32>,
    rejects: Cell<u32>,
}

impl MockConnection {
    pub fn from_caller(caller: &str) -> Self {
        Self {
            inner: Rc::new(MockConnectionInner {
                caller: Some(caller.to_string()),
                ..Default::default()
            }),
        }
    }

    pub fn accepts(&self) -> u32 {
        self.inner.accepts.get()
    }

    pub fn rejects(&self) -> u32 {
        self.inner.rejects.get()
    }

    pub fn emit(&self, event: ConnectionEvent) {
        self.inner.events.emit(&event);
    }
}

impl VoiceConnection for MockConnection {
    fn events(&self) -> &EventEmitter<ConnectionEvent> {
        &self.inner.events
    }

    fn accept(&self) {
        self.inner.accepts.set(self.inner.accepts.get() + 1);
    }

    fn reject(&self) {
        self.inner.rejects.set(self.inner.rejects.get() + 1);
    }

    fn caller(&self) -> Option<String> {
        self.inner.caller.clone()
    }

    fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

/// State shared between a [`MockDevice`] and the test that built it.
#[derive(Default)]
pub struct MockState {
    pub events: EventEmitter<DeviceEvent<MockConnection>>,
    pub constructed_with: RefCell<Option<String>>,
    pub dialed: RefCell<Vec<String>>,
    pub outgoing: RefCell<Vec<MockConnection>>,
    pub disconnect_all_calls: Cell<u32>,
    pub available: RefCell<Vec<OutputDevice>>,
    pub speaker_selection: RefCell<Vec<String>>,
    pub ringtone_selection: RefCell<Vec<String>>,
    pub output_selection_supported: Cell<bool>,
}

pub struct MockDevice {
    state: Rc<MockState>,
}

impl MockDevice {
    pub fn new(state: Rc<MockState>) -> Self {
        Self { state }
    }

    /// Factory usable with `install_device` / `start`.
    pub fn factory(state: Rc<MockState>) -> impl FnOnce(&str, &crate::voice::DeviceOptions) -> Result<Self, VoiceError> {
        move |token, _| {
            *state.constructed_with.borrow_mut() = Some(token.to_string());
            Ok(Self::new(state))
        }
    }
}

impl VoiceDevice for MockDevice {
    type Connection = MockConnection;

    fn events(&self) -> &EventEmitter<DeviceEvent<MockConnection>> {
        &self.state.events
    }

    fn connect(&self, params: &CallParams) -> Result<MockConnection, VoiceError> {
        self.state.dialed.borrow_mut().push(params.to.clone());
        let conn = MockConnection::default();
        self.state.outgoing.borrow_mut().push(conn.clone());
        Ok(conn)
    }

    fn disconnect_all(&self) {
        self.state.disconnect_all_calls.set(self.state.disconnect_all_calls.get() + 1);
    }

    fn available_output_devices(&self) -> Vec<OutputDevice> {
        self.state.available.borrow().clone()
    }

    fn selected_output_devices(&self, kind: OutputKind) -> Vec<String> {
        match kind {
            OutputKind::Speaker => self.state.speaker_selection.borrow().clone(),
            OutputKind::Ringtone => self.state.ringtone_selection.borrow().clone(),
        }
    }

    fn set_output_devices(&self, kind: OutputKind, ids: &[String]) {
        let target = match kind {
            OutputKind::Speaker => &self.state.speaker_selection,
            OutputKind::Ringtone => &self.state.ringtone_selection,
        };
        *target.borrow_mut() = ids.to_vec();
    }

    fn is_output_selection_supported(&self) -> bool {
        self.state.output_selection_supported.get()
    }
}
