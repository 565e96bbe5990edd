use crate::components::Icon;
use dioxus::prelude::*;

#[component]
pub fn CardMenu(
    on_jump_to_last_played: EventHandler<MouseEvent>,
    on_clear_played: EventHandler<MouseEvent>,
) -> Element {
    let mut menu_open = use_signal(|| false);

    rsx! {
        div { class: "card-menu",
            button {
                r#type: "button",
                class: "card-button",
                aria_haspopup: "true",
                aria_expanded: "{menu_open()}",
                onclick: move |_| menu_open.with_mut(|open| *open = !*open),
                Icon { name: "more".to_string(), class: "icon".to_string() }
            }
            if menu_open() {
                // Clicking anywhere outside the menu closes it.
                div { class: "card-menu-backdrop", onclick: move |_| menu_open.set(false) }
                div { class: "card-menu-items", role: "menu",
                    button {
                        class: "card-menu-item",
                        role: "menuitem",
                        onclick: move |evt| {
                            menu_open.set(false);
                            on_jump_to_last_played.call(evt);
                        },
                        "Jump to last played"
                    }
                    button {
                        class: "card-menu-item",
                        role: "menuitem",
                        onclick: move |evt| {
                            menu_open.set(false);
                            on_clear_played.call(evt);
                        },
                        "Clear played items"
                    }
                }
            }
        }
    }
}
