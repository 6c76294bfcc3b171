//! Voice SDK bindings and the traits the controller is written against.

pub mod device;
pub mod events;
pub mod options;
pub mod registry;

#[cfg(target_arch = "wasm32")]
pub mod media;
#[cfg(target_arch = "wasm32")]
pub mod twilio;

pub use device::*;
pub use events::{EventEmitter, ListenerId};
pub use options::{Codec, DeviceOptions};
