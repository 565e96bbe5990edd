use dioxus::prelude::*;

const CARD_CSS: Asset = asset!("/assets/styling/card.css");

fn main() {
    if let Err(err) = dioxus::logger::init(tracing::Level::INFO) {
        eprintln!("failed to initialize logger: {err}");
    }
    dioxus::launch(Root);
}

#[cfg(target_arch = "wasm32")]
const CONFIG_POLL_MS: u32 = 500;

#[cfg(target_arch = "wasm32")]
#[component]
fn Root() -> Element {
    use media_browser_card::api::hass_bridge::{self, HassBridge};
    use media_browser_card::api::HostHandle;
    use media_browser_card::components::CardShell;

    let host = use_hook(|| HostHandle::new(HassBridge));
    let mut config_revision = use_signal(hass_bridge::config_revision);

    // The dashboard can hand over a new config at any time.
    use_future(move || async move {
        loop {
            gloo_timers::future::TimeoutFuture::new(CONFIG_POLL_MS).await;
            let revision = hass_bridge::config_revision();
            if *config_revision.peek() != revision {
                config_revision.set(revision);
            }
        }
    });

    let revision = config_revision();
    let config = hass_bridge::current_config();

    rsx! {
        document::Stylesheet { href: CARD_CSS }
        CardShell { key: "{revision}", host, config }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[component]
fn Root() -> Element {
    use media_browser_card::components::HostUnavailable;

    rsx! {
        document::Stylesheet { href: CARD_CSS }
        HostUnavailable {}
    }
}
