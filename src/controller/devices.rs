//! Output device list rendering

use crate::voice::{OutputDevice, DEFAULT_DEVICE_ID};

/// One `<option>` in a device selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOption {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Build the option list for one selector.
///
/// An entry is selected when its id is in `selected`, or when nothing is
/// selected and it is the system default output.
pub fn render_device_options(available: &[OutputDevice], selected: &[String]) -> Vec<DeviceOption> {
    available
        .iter()
        .map(|device| {
            let is_active = if selected.is_empty() {
                device.id == DEFAULT_DEVICE_ID
            } else {
                selected.iter().any(|id| *id == device.id)
            };
            DeviceOption {
                id: device.id.clone(),
                label: device.label.clone(),
                selected: is_active,
            }
        })
        .collect()
}

pub fn selected_ids(options: &[DeviceOption]) -> Vec<String> {
    options
        .iter()
        .filter(|o| o.selected)
        .map(|o| o.id.clone())
        .collect()
}

/// Mark exactly `ids` as selected, keeping order and labels.
pub fn apply_selection(options: &mut [DeviceOption], ids: &[String]) {
    for option in options.iter_mut() {
        option.selected = ids.iter().any(|id| *id == option.id);
    }
}
