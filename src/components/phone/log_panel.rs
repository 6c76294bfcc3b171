use dioxus::prelude::*;

#[component]
pub fn LogPanel(lines: Vec<String>) -> Element {
    rsx! {
        div { id: "log",
            for (i, line) in lines.iter().enumerate() {
                p { key: "{i}", "> {line}" }
            }
        }
    }
}

/// Keep the newest log line in view.
pub(crate) fn scroll_log_to_bottom() {
    if let Some(log) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("log"))
    {
        log.set_scroll_top(log.scroll_height());
    }
}
