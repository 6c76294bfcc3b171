//! Routes device and connection events into a shared controller.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::{CallController, CallUiError};
use crate::api::{ApiError, TokenResponse};
use crate::voice::{ConnectionEvent, DeviceEvent, DeviceOptions, ListenerId, VoiceConnection, VoiceDevice, VoiceError};

pub type SharedController<D> = Rc<RefCell<CallController<D>>>;

/// Called after every state change so the view can re-render.
pub type Notify = Rc<dyn Fn()>;

fn with_controller<D: VoiceDevice>(controller: &Weak<RefCell<CallController<D>>>, f: impl FnOnce(&mut CallController<D>)) {
    let Some(controller) = controller.upgrade() else {
        return;
    };
    let borrowed = controller.try_borrow_mut();
    match borrowed {
        Ok(mut guard) => f(&mut guard),
        Err(_) => tracing::warn!("Controller busy, dropping re-entrant event"),
    }
}

/// Build the device from the token response and subscribe to its events.
pub fn start<D, F>(
    controller: &SharedController<D>,
    token: Result<TokenResponse, ApiError>,
    factory: F,
    notify: &Notify,
) -> Result<(), CallUiError>
where
    D: VoiceDevice,
    F: FnOnce(&str, &DeviceOptions) -> Result<D, VoiceError>,
{
    let result = controller.borrow_mut().install_device(token, factory);
    if result.is_ok() {
        bind_device_events(controller, notify);
    }
    notify();
    result
}

/// Subscribe the controller's handlers to the device emitter.
///
/// Returns `None` when no device is installed yet.
pub fn bind_device_events<D: VoiceDevice>(controller: &SharedController<D>, notify: &Notify) -> Option<ListenerId> {
    let weak = Rc::downgrade(controller);
    let notify = Rc::clone(notify);

    let guard = controller.borrow();
    let device = guard.device()?;
    let id = device.events().subscribe(move |event: &DeviceEvent<D::Connection>| {
        if let DeviceEvent::Connect(conn) = event {
            bind_volume(&weak, conn, &notify);
        }
        with_controller(&weak, |c| c.handle_device_event(event));
        notify();
    });
    Some(id)
}

fn bind_volume<D: VoiceDevice>(controller: &Weak<RefCell<CallController<D>>>, conn: &D::Connection, notify: &Notify) {
    let weak = controller.clone();
    let notify = Rc::clone(notify);
    conn.events().subscribe(move |event| {
        if let ConnectionEvent::Volume { input, output } = *event {
            with_controller(&weak, |c| c.on_volume(input, output));
            notify();
        }
    });
}

/// Dial `to` and log when the far end starts ringing.
pub fn place_call<D: VoiceDevice>(controller: &SharedController<D>, to: &str, notify: &Notify) -> Result<(), CallUiError> {
    let outgoing = controller.borrow_mut().call(to);
    let result = outgoing.map(|conn| {
        if let Some(conn) = conn {
            let weak = Rc::downgrade(controller);
            let notify = Rc::clone(notify);
            conn.events().subscribe(move |event| {
                if *event == ConnectionEvent::Ringing {
                    with_controller(&weak, |c| c.on_ringing());
                    notify();
                }
            });
        }
    });
    notify();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::controller::testing::{ok_token, MockConnection, MockDevice, MockState};
    use crate::controller::{LevelColor, MeterReading};
    use std::cell::Cell;

    fn counter() -> (Notify, Rc<Cell<u32>>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (Rc::new(move || c.set(c.get() + 1)), count)
    }

    fn started() -> (SharedController<MockDevice>, Rc<MockState>, Notify, Rc<Cell<u32>>) {
        let state = Rc::new(MockState::default());
        let controller = Rc::new(RefCell::new(CallController::new(UiConfig::default())));
        let (notify, count) = counter();
        start(&controller, ok_token("alice"), MockDevice::factory(Rc::clone(&state)), &notify).unwrap();
        (controller, state, notify, count)
    }

    #[test]
    fn test_ready_event_reveals_controls() {
        let (controller, state, _, count) = started();
        assert!(!controller.borrow().panel().call_controls_visible);

        state.events.emit(&DeviceEvent::Ready);

        assert!(controller.borrow().panel().call_controls_visible);
        assert_eq!(controller.borrow().panel().log.last(), Some("Twilio.Device Ready!"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_failed_start_subscribes_nothing() {
        let state = Rc::new(MockState::default());
        let controller = Rc::new(RefCell::new(CallController::<MockDevice>::new(UiConfig::default())));
        let (notify, count) = counter();

        let result = start(
            &controller,
            Err(ApiError::Server("500 Internal Server Error: ".into())),
            MockDevice::factory(Rc::clone(&state)),
            &notify,
        );

        assert!(result.is_err());
        assert!(state.constructed_with.borrow().is_none());
        assert_eq!(state.events.listener_count(), 0);
        assert!(controller.borrow().panel().log.contains("Could not get a token from server!"));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_connect_binds_volume_meter() {
        let (controller, state, _, _) = started();
        let conn = MockConnection::from_caller("+15550001111");

        state.events.emit(&DeviceEvent::Connect(conn.clone()));
        conn.emit(ConnectionEvent::Volume { input: 0.5, output: 0.75 });

        let panel = controller.borrow().panel().clone();
        assert_eq!(panel.input_meter, MeterReading { width_px: 150, color: LevelColor::Yellow });
        assert_eq!(panel.output_meter, MeterReading { width_px: 225, color: LevelColor::Red });
        assert!(panel.volume_indicators_visible);
    }

    #[test]
    fn test_volume_ignored_after_connection_dropped() {
        let (controller, state, _, _) = started();
        let conn = MockConnection::from_caller("x");

        state.events.emit(&DeviceEvent::Connect(conn.clone()));
        drop(controller);

        // controller is gone; the listener must not panic
        conn.emit(ConnectionEvent::Volume { input: 1.0, output: 1.0 });
    }

    #[test]
    fn test_outgoing_call_logs_ringing() {
        let (controller, state, notify, _) = started();

        place_call(&controller, "+15551234567", &notify).unwrap();
        let outgoing = state.outgoing.borrow()[0].clone();
        outgoing.emit(ConnectionEvent::Ringing);

        assert_eq!(controller.borrow().panel().log.last(), Some("Ringing..."));
    }

    #[test]
    fn test_incoming_accept_then_disconnect_round_trip() {
        let (controller, state, _, _) = started();
        state.events.emit(&DeviceEvent::Ready);
        let conn = MockConnection::from_caller("client:bob");

        state.events.emit(&DeviceEvent::Incoming(conn.clone()));
        controller.borrow_mut().accept().unwrap();
        state.events.emit(&DeviceEvent::Connect(conn.clone()));
        assert!(controller.borrow().panel().hangup_button_visible);

        state.events.emit(&DeviceEvent::Disconnect(conn.clone()));
        let panel = controller.borrow().panel().clone();
        assert!(panel.call_button_visible);
        assert!(!panel.hangup_button_visible);
        assert!(!panel.volume_indicators_visible);
        assert_eq!(conn.accepts(), 1);
    }

    #[test]
    fn test_cancelled_ring_during_call_leaves_call_up() {
        let (controller, state, _, _) = started();
        let current = MockConnection::from_caller("current");
        let ringing = MockConnection::from_caller("client:carol");

        state.events.emit(&DeviceEvent::Connect(current.clone()));
        state.events.emit(&DeviceEvent::Incoming(ringing.clone()));
        state.events.emit(&DeviceEvent::Cancel(ringing));

        let panel = controller.borrow().panel().clone();
        assert!(!panel.accept_button_visible);
        assert!(panel.hangup_button_visible);
        assert!(controller.borrow().session().is_active(&current));
    }
}
