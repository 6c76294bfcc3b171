mod call_panel;
mod device_select;
mod log_panel;
mod volume_indicators;

pub use call_panel::*;
pub use device_select::*;
pub use log_panel::*;
pub use volume_indicators::*;

/// `display` value for an element that is either shown as `shown` or hidden.
fn display(visible: bool, shown: &'static str) -> &'static str {
    if visible {
        shown
    } else {
        "none"
    }
}
