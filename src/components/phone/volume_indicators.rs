use dioxus::prelude::*;

use super::display;
use crate::controller::MeterReading;

#[component]
pub fn VolumeIndicators(visible: bool, input: MeterReading, output: MeterReading) -> Element {
    let shown = display(visible, "block");
    let input_style = input.style();
    let output_style = output.style();

    rsx! {
        div { id: "volume-indicators", style: "display: {shown}",
            label { "Mic Volume" }
            div { id: "input-volume", class: "volume-bar", style: "{input_style}" }
            label { "Speaker Volume" }
            div { id: "output-volume", class: "volume-bar", style: "{output_style}" }
        }
    }
}
