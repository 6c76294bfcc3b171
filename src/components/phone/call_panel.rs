//! Browser call panel
//!
//! Renders the controller's [`PanelState`](crate::controller::PanelState) and
//! forwards button clicks and selections to it.

use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;

use super::log_panel::scroll_log_to_bottom;
use super::{display, DeviceSelect, LogPanel, VolumeIndicators};
use crate::api::{fetch_voice_token, ApiClient};
use crate::config::UiConfig;
use crate::controller::{place_call, start, CallController, Notify, SharedController};
use crate::voice::media::request_microphone;
use crate::voice::twilio::TwilioDevice;
use crate::voice::OutputKind;

type Controller = SharedController<TwilioDevice>;

/// Fetch the token and bring up `Twilio.Device`. Setup halts on failure.
async fn run_startup(controller: Controller, notify: Notify) {
    let token_path = {
        let mut c = controller.borrow_mut();
        c.begin_token_request();
        c.config().token_path.clone()
    };
    notify();

    let token = match ApiClient::for_current_page() {
        Ok(client) => fetch_voice_token(&client, &token_path).await,
        Err(e) => Err(e),
    };

    if let Err(e) = start(&controller, token, TwilioDevice::new, &notify) {
        tracing::warn!("Call panel setup halted: {}", e);
    }
}

#[component]
pub fn CallPanel() -> Element {
    let controller: Controller = use_hook(|| Rc::new(RefCell::new(CallController::new(UiConfig::default()))));
    let revision = use_signal(|| 0u64);
    let notify: Notify = use_hook(|| {
        Rc::new(move || {
            let mut revision = revision;
            *revision.write() += 1;
        }) as Notify
    });
    let mut phone_number = use_signal(String::new);

    {
        let controller = controller.clone();
        let notify = notify.clone();
        use_hook(move || {
            spawn(run_startup(controller, notify));
        });
    }

    use_effect(move || {
        let _ = revision();
        scroll_log_to_bottom();
    });

    let _ = revision();
    let panel = controller.borrow().panel().clone();

    let make_call = {
        let (controller, notify) = (controller.clone(), notify.clone());
        move |_| {
            let to = phone_number();
            if let Err(e) = place_call(&controller, &to, &notify) {
                tracing::warn!("Call to {} failed: {}", to, e);
            }
        }
    };

    let accept = {
        let (controller, notify) = (controller.clone(), notify.clone());
        move |_| {
            if let Err(e) = controller.borrow_mut().accept() {
                tracing::debug!("Accept ignored: {}", e);
            }
            notify();
        }
    };

    let reject = {
        let (controller, notify) = (controller.clone(), notify.clone());
        move |_| {
            if let Err(e) = controller.borrow_mut().reject() {
                tracing::debug!("Reject ignored: {}", e);
            }
            notify();
        }
    };

    let hangup = {
        let (controller, notify) = (controller.clone(), notify.clone());
        move |_| {
            controller.borrow_mut().hangup();
            notify();
        }
    };

    let get_devices = {
        let (controller, notify) = (controller.clone(), notify.clone());
        move |_| {
            let (controller, notify) = (controller.clone(), notify.clone());
            spawn(async move {
                if let Err(e) = request_microphone().await {
                    controller.borrow_mut().log(e.to_string());
                }
                controller.borrow_mut().refresh_devices();
                notify();
            });
        }
    };

    let select_devices = |kind: OutputKind| {
        let (controller, notify) = (controller.clone(), notify.clone());
        move |ids: Vec<String>| {
            if let Err(e) = controller.borrow_mut().select_output_devices(kind, ids) {
                tracing::warn!("Selecting {:?} devices failed: {}", kind, e);
            }
            notify();
        }
    };

    let output_selection = display(panel.output_selection_visible, "block");
    let call_controls = display(panel.call_controls_visible, "block");
    let call_button = display(panel.call_button_visible, "inline");
    let hangup_button = display(panel.hangup_button_visible, "inline");
    let accept_button = display(panel.accept_button_visible, "inline");
    let reject_button = display(panel.reject_button_visible, "inline");
    let log_lines: Vec<String> = panel.log.lines().map(str::to_string).collect();

    rsx! {
        div { id: "controls",
            div { id: "info",
                p { class: "instructions", "Twilio Client" }
                div { id: "client-name",
                    if let Some(name) = panel.client_name.clone() {
                        "Your client name: "
                        strong { "{name}" }
                    }
                }
                div { id: "output-selection", style: "display: {output_selection}",
                    DeviceSelect {
                        kind: OutputKind::Ringtone,
                        options: panel.ringtone_options.clone(),
                        on_select: select_devices(OutputKind::Ringtone),
                    }
                    DeviceSelect {
                        kind: OutputKind::Speaker,
                        options: panel.speaker_options.clone(),
                        on_select: select_devices(OutputKind::Speaker),
                    }
                    br {}
                    button { id: "get-devices", onclick: get_devices, "Seeing unknown devices?" }
                }
            }
            div { id: "call-controls", style: "display: {call_controls}",
                p { class: "instructions", "Make a Call:" }
                input {
                    id: "phone-number",
                    r#type: "text",
                    placeholder: "Enter a phone # or client name",
                    value: "{phone_number}",
                    oninput: move |e| phone_number.set(e.value()),
                }
                button { id: "button-call", style: "display: {call_button}", onclick: make_call, "Call" }
                button { id: "button-hangup", style: "display: {hangup_button}", onclick: hangup, "Hangup" }
                button { id: "button-accept", style: "display: {accept_button}", onclick: accept, "Accept" }
                button { id: "button-reject", style: "display: {reject_button}", onclick: reject, "Reject" }
                VolumeIndicators {
                    visible: panel.volume_indicators_visible,
                    input: panel.input_meter,
                    output: panel.output_meter,
                }
            }
            LogPanel { lines: log_lines }
        }
    }
}
