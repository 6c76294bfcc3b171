//! Twilio Voice SDK integration
//!
//! Rust bindings for the `Twilio.Device` JavaScript SDK loaded by the page,
//! plus the adapter that exposes it through [`VoiceDevice`].

use std::rc::Rc;

use js_sys::{Array, Function, Map, Reflect, JSON};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use super::device::{
    CallParams, ConnectionEvent, DeviceEvent, OutputDevice, OutputKind, VoiceConnection, VoiceDevice, VoiceError,
};
use super::events::EventEmitter;
use super::options::DeviceOptions;
use super::registry::{HandleRegistry, WeakRegistry};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Twilio, js_name = Device)]
    pub type JsDevice;

    #[wasm_bindgen(catch, constructor, js_namespace = Twilio, js_class = "Device")]
    pub fn new(token: &str, options: &JsValue) -> Result<JsDevice, JsValue>;

    #[wasm_bindgen(method)]
    pub fn on(this: &JsDevice, event: &str, handler: &Function);

    #[wasm_bindgen(catch, method)]
    pub fn connect(this: &JsDevice, params: &JsValue) -> Result<JsConnection, JsValue>;

    #[wasm_bindgen(method, js_name = disconnectAll)]
    pub fn disconnect_all(this: &JsDevice);

    #[wasm_bindgen(method, getter)]
    pub fn audio(this: &JsDevice) -> JsAudioHelper;

    #[wasm_bindgen(js_name = AudioHelper)]
    pub type JsAudioHelper;

    #[wasm_bindgen(method)]
    pub fn on(this: &JsAudioHelper, event: &str, handler: &Function);

    #[wasm_bindgen(method, getter, js_name = speakerDevices)]
    pub fn speaker_devices(this: &JsAudioHelper) -> JsOutputDeviceCollection;

    #[wasm_bindgen(method, getter, js_name = ringtoneDevices)]
    pub fn ringtone_devices(this: &JsAudioHelper) -> JsOutputDeviceCollection;

    #[wasm_bindgen(method, getter, js_name = availableOutputDevices)]
    pub fn available_output_devices(this: &JsAudioHelper) -> Map;

    #[wasm_bindgen(method, getter, js_name = isOutputSelectionSupported)]
    pub fn is_output_selection_supported(this: &JsAudioHelper) -> bool;

    #[wasm_bindgen(js_name = OutputDeviceCollection)]
    pub type JsOutputDeviceCollection;

    #[wasm_bindgen(method)]
    pub fn get(this: &JsOutputDeviceCollection) -> JsValue;

    #[wasm_bindgen(method)]
    pub fn set(this: &JsOutputDeviceCollection, ids: &Array) -> js_sys::Promise;

    #[wasm_bindgen(js_name = Connection)]
    pub type JsConnection;

    #[wasm_bindgen(method)]
    pub fn accept(this: &JsConnection);

    #[wasm_bindgen(method)]
    pub fn reject(this: &JsConnection);

    #[wasm_bindgen(method)]
    pub fn on(this: &JsConnection, event: &str, handler: &Function);

    #[wasm_bindgen(method, getter)]
    pub fn parameters(this: &JsConnection) -> JsValue;
}

/// Best-effort message extraction from a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    Reflect::get(value, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Emit on a later microtask. The SDK fires some events synchronously from
/// inside calls such as `disconnectAll()`, while the controller is borrowed.
fn deliver<E: 'static>(emitter: &Rc<EventEmitter<E>>, event: E) {
    let emitter = Rc::clone(emitter);
    wasm_bindgen_futures::spawn_local(async move { emitter.emit(&event) });
}

fn string_prop(value: &JsValue, key: &str) -> Option<String> {
    Reflect::get(value, &key.into()).ok().and_then(|v| v.as_string())
}

/// A connection handle plus the Rust-side emitter fed by its JS events.
#[derive(Clone)]
pub struct TwilioConnection {
    inner: Rc<ConnectionInner>,
}

struct ConnectionInner {
    raw: JsConnection,
    events: Rc<EventEmitter<ConnectionEvent>>,
    registry: WeakRegistry<JsValue, TwilioConnection>,
    _ringing: Closure<dyn FnMut()>,
    _volume: Closure<dyn FnMut(f64, f64)>,
}

impl TwilioConnection {
    fn bind(raw: JsConnection, registry: WeakRegistry<JsValue, TwilioConnection>) -> Self {
        let events = Rc::new(EventEmitter::new());

        let emitter = Rc::clone(&events);
        let ringing = Closure::wrap(Box::new(move || {
            deliver(&emitter, ConnectionEvent::Ringing);
        }) as Box<dyn FnMut()>);
        raw.on("ringing", ringing.as_ref().unchecked_ref());

        let emitter = Rc::clone(&events);
        let volume = Closure::wrap(Box::new(move |input: f64, output: f64| {
            deliver(&emitter, ConnectionEvent::Volume { input, output });
        }) as Box<dyn FnMut(f64, f64)>);
        raw.on("volume", volume.as_ref().unchecked_ref());

        Self {
            inner: Rc::new(ConnectionInner {
                raw,
                events,
                registry,
                _ringing: ringing,
                _volume: volume,
            }),
        }
    }

    fn key(&self) -> &JsValue {
        AsRef::<JsValue>::as_ref(&self.inner.raw)
    }
}

impl VoiceConnection for TwilioConnection {
    fn events(&self) -> &EventEmitter<ConnectionEvent> {
        &self.inner.events
    }

    fn accept(&self) {
        self.inner.raw.accept();
    }

    /// A rejected call never reaches `disconnect`, so it is released here.
    fn reject(&self) {
        self.inner.raw.reject();
        self.inner.registry.release(self.key());
    }

    fn caller(&self) -> Option<String> {
        string_prop(&self.inner.raw.parameters(), "From")
    }

    fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

type ConnectionRegistry = HandleRegistry<JsValue, TwilioConnection>;

fn resolve(registry: &ConnectionRegistry, raw: JsValue) -> TwilioConnection {
    let weak = registry.downgrade();
    registry.resolve(raw, |raw| TwilioConnection::bind(raw.clone().unchecked_into(), weak))
}

pub struct TwilioDevice {
    raw: JsDevice,
    events: Rc<EventEmitter<DeviceEvent<TwilioConnection>>>,
    connections: ConnectionRegistry,
    _closures: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl TwilioDevice {
    /// Construct `Twilio.Device` and forward its callbacks into the emitter.
    pub fn new(token: &str, options: &DeviceOptions) -> Result<Self, VoiceError> {
        let json = options.to_json().map_err(|e| VoiceError::Sdk(e.to_string()))?;
        let js_options = JSON::parse(&json).map_err(|e| VoiceError::Sdk(js_error_message(&e)))?;
        let raw = JsDevice::new(token, &js_options).map_err(|e| VoiceError::Sdk(js_error_message(&e)))?;

        let mut device = Self {
            raw,
            events: Rc::new(EventEmitter::new()),
            connections: ConnectionRegistry::default(),
            _closures: Vec::new(),
        };
        device.forward_events();
        Ok(device)
    }

    fn forward_events(&mut self) {
        let events = Rc::clone(&self.events);
        self.listen("ready", move |_| deliver(&events, DeviceEvent::Ready));

        let events = Rc::clone(&self.events);
        self.listen("error", move |err| {
            deliver(
                &events,
                DeviceEvent::Error {
                    message: js_error_message(&err),
                },
            )
        });

        let (events, registry) = (Rc::clone(&self.events), self.connections.clone());
        self.listen("incoming", move |raw| {
            deliver(&events, DeviceEvent::Incoming(resolve(&registry, raw)))
        });

        let (events, registry) = (Rc::clone(&self.events), self.connections.clone());
        self.listen("cancel", move |raw| {
            let conn = resolve(&registry, raw);
            registry.release(conn.key());
            deliver(&events, DeviceEvent::Cancel(conn))
        });

        let (events, registry) = (Rc::clone(&self.events), self.connections.clone());
        self.listen("connect", move |raw| {
            deliver(&events, DeviceEvent::Connect(resolve(&registry, raw)))
        });

        let (events, registry) = (Rc::clone(&self.events), self.connections.clone());
        self.listen("disconnect", move |raw| {
            let conn = resolve(&registry, raw);
            registry.release(conn.key());
            deliver(&events, DeviceEvent::Disconnect(conn))
        });

        let events = Rc::clone(&self.events);
        let device_change = Closure::wrap(Box::new(move |_lost: JsValue| {
            deliver(&events, DeviceEvent::AudioDevicesChanged)
        }) as Box<dyn FnMut(JsValue)>);
        self.raw.audio().on("deviceChange", device_change.as_ref().unchecked_ref());
        self._closures.push(device_change);
    }

    fn listen(&mut self, event: &str, handler: impl FnMut(JsValue) + 'static) {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(JsValue)>);
        self.raw.on(event, closure.as_ref().unchecked_ref());
        self._closures.push(closure);
    }

    fn collection(&self, kind: OutputKind) -> JsOutputDeviceCollection {
        let audio = self.raw.audio();
        match kind {
            OutputKind::Speaker => audio.speaker_devices(),
            OutputKind::Ringtone => audio.ringtone_devices(),
        }
    }
}

impl VoiceDevice for TwilioDevice {
    type Connection = TwilioConnection;

    fn events(&self) -> &EventEmitter<DeviceEvent<TwilioConnection>> {
        &self.events
    }

    fn connect(&self, params: &CallParams) -> Result<TwilioConnection, VoiceError> {
        let json = serde_json::to_string(params).map_err(|e| VoiceError::Sdk(e.to_string()))?;
        let js_params = JSON::parse(&json).map_err(|e| VoiceError::Sdk(js_error_message(&e)))?;
        let raw = self
            .raw
            .connect(&js_params)
            .map_err(|e| VoiceError::Sdk(js_error_message(&e)))?;
        Ok(resolve(&self.connections, raw.into()))
    }

    fn disconnect_all(&self) {
        self.raw.disconnect_all();
    }

    fn available_output_devices(&self) -> Vec<OutputDevice> {
        let mut devices = Vec::new();
        self.raw.audio().available_output_devices().for_each(&mut |info, id| {
            if let Some(id) = id.as_string() {
                let label = string_prop(&info, "label").unwrap_or_default();
                devices.push(OutputDevice { id, label });
            }
        });
        devices
    }

    fn selected_output_devices(&self, kind: OutputKind) -> Vec<String> {
        Array::from(&self.collection(kind).get())
            .iter()
            .filter_map(|info| string_prop(&info, "deviceId"))
            .collect()
    }

    fn set_output_devices(&self, kind: OutputKind, ids: &[String]) {
        let array: Array = ids.iter().map(|id| JsValue::from_str(id)).collect();
        let promise = self.collection(kind).set(&array);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                tracing::warn!("Failed to set {:?} devices: {}", kind, js_error_message(&e));
            }
        });
    }

    fn is_output_selection_supported(&self) -> bool {
        self.raw.audio().is_output_selection_supported()
    }
}
