use crate::components::Icon;
use crate::utils::format_seek_delta;
use dioxus::prelude::*;

/// -/+ seek buttons; `on_seek` receives `true` for forward.
#[component]
pub fn SeekControls(step_secs: u32, delta_secs: f64, on_seek: EventHandler<bool>) -> Element {
    rsx! {
        if delta_secs != 0.0 {
            span { class: "seek-delta", "{format_seek_delta(delta_secs)}" }
        }
        button {
            r#type: "button",
            class: "card-button",
            title: "Seek backward",
            onclick: move |_| on_seek.call(false),
            Icon { name: "rewind".to_string(), class: "icon".to_string() }
            "-{step_secs}s"
        }
        button {
            r#type: "button",
            class: "card-button",
            title: "Seek forward",
            onclick: move |_| on_seek.call(true),
            "+{step_secs}s"
            Icon { name: "forward".to_string(), class: "icon".to_string() }
        }
    }
}
