use crate::api::{HostError, HostHandle};
use crate::card::{
    actions, CardConfig, CardController, Clock, FetchTicket, PlayRequest, SystemClock, TimerTicket,
};
use crate::components::MediaBrowserCard;
use crate::db::open_preferences;
use dioxus::prelude::*;

const HOST_POLL_MS: u64 = 250;
const NOTICE_DISMISS_MS: u64 = 4000;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn delay_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn delay_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms.min(u64::from(u32::MAX)) as u32).await;
}

/// Transient error message shown above the file list.
#[derive(Clone, Copy)]
pub struct NoticeSignal(pub Signal<Option<String>>);

impl NoticeSignal {
    pub fn show(self, message: String) {
        let mut notice = self.0;
        notice.set(Some(message.clone()));
        spawn(async move {
            delay_ms(NOTICE_DISMISS_MS).await;
            // A newer notice keeps its own timer.
            if notice.peek().as_deref() == Some(message.as_str()) {
                notice.set(None);
            }
        });
    }
}

/// Runs the directory fetch for `ticket` and applies the result if it is
/// still the latest navigation.
pub fn spawn_fetch(
    host: HostHandle,
    mut controller: Signal<CardController>,
    notice: NoticeSignal,
    ticket: FetchTicket,
) {
    spawn(async move {
        let result = actions::fetch_directory(&*host.0, &ticket).await;
        if let Err(err) = controller.write().finish_fetch(&ticket, result) {
            tracing::warn!("failed to browse {:?}: {err}", ticket.content_id);
            notice.show(format!("Could not load directory: {err}"));
        }
    });
}

pub fn spawn_play(
    host: HostHandle,
    mut controller: Signal<CardController>,
    notice: NoticeSignal,
    request: PlayRequest,
) {
    spawn(async move {
        let result = actions::play_item(&*host.0, &request, actions::open_local).await;
        if let Err(err) = controller.write().finish_play(&request, result) {
            tracing::warn!("failed to play {}: {err}", request.item.media_content_id);
            notice.show(format!("Could not play {}: {err}", request.item.title));
        }
    });
}

/// Waits out the quiet period, then sends whatever the seek ticket released.
pub fn spawn_seek(
    host: HostHandle,
    mut controller: Signal<CardController>,
    notice: NoticeSignal,
    ticket: TimerTicket,
) {
    let quiet = controller.peek().config().seek_quiet_period();
    spawn(async move {
        delay_ms(quiet.as_millis() as u64).await;
        let command = controller.write().claim_seek(ticket, SystemClock.now());
        let Some(command) = command else {
            return;
        };
        if let Err(err) = actions::send_seek(&*host.0, &command).await {
            tracing::warn!("seek failed: {err}");
            notice.show(format!("Could not seek: {err}"));
        }
    });
}

/// Owns the controller of one card instance and keeps it in sync with the
/// host.
#[component]
pub fn CardShell(host: HostHandle, config: CardConfig) -> Element {
    let mut controller = use_signal(|| CardController::new(config.clone(), open_preferences()));
    let notice = NoticeSignal(use_signal(|| None::<String>));

    use_context_provider(|| controller);
    use_context_provider(|| notice);
    use_context_provider(|| host.clone());

    // Load the persisted directory once, after the first render. The effect
    // reads no signal, so it never reruns.
    {
        let host = host.clone();
        use_effect(move || {
            let ticket = controller.write().refresh();
            spawn_fetch(host.clone(), controller, notice, ticket);
        });
    }

    // Pick up every new host state object.
    {
        let host = host.clone();
        use_future(move || {
            let host = host.clone();
            async move {
                let mut controller = controller;
                let mut failed_revision = None;
                loop {
                    let revision = host.0.revision();
                    if controller.peek().is_stale(revision) && failed_revision != Some(revision) {
                        match host.0.states() {
                            Ok(states) => controller.write().apply_host_states(revision, states),
                            Err(HostError::Unavailable) => {}
                            Err(err) => {
                                tracing::warn!("could not read host state: {err}");
                                failed_revision = Some(revision);
                            }
                        }
                    }
                    delay_ms(HOST_POLL_MS).await;
                }
            }
        });
    }

    use_drop(move || {
        if let Ok(mut card) = controller.try_write() {
            card.cancel_pending_seek();
        }
    });

    rsx! {
        MediaBrowserCard {}
    }
}

/// Placeholder shown when no host connection exists, e.g. outside a
/// dashboard.
#[component]
pub fn HostUnavailable() -> Element {
    rsx! {
        div { class: "card",
            div { class: "card-empty", "Media browser is waiting for the Home Assistant connection." }
        }
    }
}
