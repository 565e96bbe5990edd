use crate::api::{DirectoryItem, HostHandle};
use crate::card::{CardController, Clock, SelectOutcome, SystemClock};
use crate::components::{
    spawn_fetch, spawn_play, spawn_seek, CardMenu, FileList, FileRow, Icon, NoticeSignal,
    PlayerSelect, SeekControls,
};
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
fn scroll_row_into_view(index: usize) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    if let Some(row) = document.get_element_by_id(&row_dom_id(index)) {
        row.scroll_into_view();
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn scroll_row_into_view(_index: usize) {}

pub fn row_dom_id(index: usize) -> String {
    format!("media-browser-row-{index}")
}

#[component]
pub fn MediaBrowserCard() -> Element {
    let mut controller = use_context::<Signal<CardController>>();
    let notice = use_context::<NoticeSignal>();
    let host = use_context::<HostHandle>();

    let card = controller.read();
    let rows: Vec<FileRow> = card
        .browser()
        .children()
        .iter()
        .map(|item| FileRow {
            is_playing: card.is_item_playing(item),
            has_been_played: card.has_been_played(item),
            item: item.clone(),
        })
        .collect();
    let can_go_back = card.browser().can_go_back();
    let has_listing = card.browser().listing().is_some();
    let directory_title = card
        .browser()
        .listing()
        .map(|listing| listing.item.title.clone())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "Media Browser".to_string());
    let can_seek = card.playing_item_id().is_some();
    let seek_delta = card.pending_seek_delta();
    let seek_step = card.config().seek_step() as u32;
    drop(card);

    let on_back = {
        let host = host.clone();
        move |_| {
            let ticket = controller.write().back();
            if let Some(ticket) = ticket {
                spawn_fetch(host.clone(), controller, notice, ticket);
            }
        }
    };

    let on_select = {
        let host = host.clone();
        move |item: DirectoryItem| {
            let outcome = controller.write().select(&item);
            match outcome {
                SelectOutcome::Navigate(ticket) => {
                    spawn_fetch(host.clone(), controller, notice, ticket)
                }
                SelectOutcome::Play(request) => spawn_play(host.clone(), controller, notice, request),
                SelectOutcome::Ignored => {
                    tracing::debug!("no playback target selected, ignoring {}", item.title)
                }
            }
        }
    };

    let on_seek = {
        let host = host.clone();
        move |forward: bool| {
            let now = SystemClock.now();
            let ticket = if forward {
                controller.write().seek_forward(now)
            } else {
                controller.write().seek_backward(now)
            };
            if let Some(ticket) = ticket {
                spawn_seek(host.clone(), controller, notice, ticket);
            }
        }
    };

    let on_jump_to_last_played = move |_| {
        if let Some(index) = controller.peek().last_played_index() {
            scroll_row_into_view(index);
        }
    };

    let on_clear_played = move |_| {
        controller.write().clear_played();
    };

    let notice_message = notice.0.read().clone();
    let is_loading = !has_listing && notice_message.is_none();

    rsx! {
        div { class: "card",
            div { class: "card-header",
                div { class: "card-title-row",
                    h3 { class: "card-title", "{directory_title}" }
                    PlayerSelect {}
                }
                if can_go_back {
                    div { class: "card-toolbar",
                        button {
                            r#type: "button",
                            class: "card-button",
                            onclick: on_back,
                            Icon { name: "back".to_string(), class: "icon".to_string() }
                            "Back"
                        }
                        div { class: "card-toolbar-actions",
                            if can_seek {
                                SeekControls { step_secs: seek_step, delta_secs: seek_delta, on_seek }
                            }
                            CardMenu {
                                on_jump_to_last_played,
                                on_clear_played,
                            }
                        }
                    }
                }
            }
            if let Some(message) = notice_message {
                div { class: "card-notice", role: "alert",
                    Icon { name: "alert".to_string(), class: "icon".to_string() }
                    span { "{message}" }
                }
            }
            div { class: "card-body",
                if is_loading {
                    div { class: "card-empty",
                        Icon { name: "loader".to_string(), class: "icon".to_string() }
                    }
                } else if rows.is_empty() {
                    div { class: "card-empty", "No files found." }
                } else {
                    FileList { rows, on_select }
                }
            }
        }
    }
}
