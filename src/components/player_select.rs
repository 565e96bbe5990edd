use crate::card::CardController;
use dioxus::prelude::*;

#[component]
pub fn PlayerSelect() -> Element {
    let mut controller = use_context::<Signal<CardController>>();

    let card = controller.read();
    let players = card.players().available().to_vec();
    let selected_id = card.players().selected().map(|target| target.id.clone());
    drop(card);

    if players.is_empty() {
        return rsx! {};
    }

    rsx! {
        select {
            class: "player-select",
            onchange: move |evt: FormEvent| {
                controller.write().select_player(&evt.value());
            },
            for player in players {
                option {
                    key: "{player.id}",
                    value: "{player.id}",
                    selected: selected_id.as_deref() == Some(player.id.as_str()),
                    "{player.display_name}"
                }
            }
        }
    }
}
