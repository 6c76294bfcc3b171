use dioxus::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlSelectElement;

use crate::controller::DeviceOption;
use crate::voice::OutputKind;

#[component]
pub fn DeviceSelect(kind: OutputKind, options: Vec<DeviceOption>, on_select: EventHandler<Vec<String>>) -> Element {
    let element_id = kind.element_id();
    let label = kind.label();

    rsx! {
        label { r#for: element_id, "{label}" }
        select {
            id: element_id,
            multiple: true,
            onchange: move |_| on_select.call(read_selected_ids(element_id)),
            for device in options {
                option {
                    key: "{device.id}",
                    "data-id": "{device.id}",
                    selected: device.selected,
                    "{device.label}"
                }
            }
        }
    }
}

/// `data-id` of every selected `<option>` under the select element.
fn read_selected_ids(element_id: &str) -> Vec<String> {
    let Some(select) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(element_id))
        .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
    else {
        tracing::warn!("No select element #{}", element_id);
        return Vec::new();
    };

    let selected = select.selected_options();
    (0..selected.length())
        .filter_map(|i| selected.item(i))
        .filter_map(|node| node.get_attribute("data-id"))
        .collect()
}
