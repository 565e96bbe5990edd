//! Host calls behind controller tickets and requests.

use super::{FetchTicket, PlayRequest, SeekCommand};
use crate::api::{DirectoryListing, HostError, MediaHost};

pub async fn fetch_directory(
    host: &dyn MediaHost,
    ticket: &FetchTicket,
) -> Result<DirectoryListing, HostError> {
    host.browse_media(ticket.content_id.as_deref()).await
}

/// Plays the requested item. The browser target resolves the item to a URL
/// and hands it to `open_local`; host targets get a play command.
pub async fn play_item<F>(
    host: &dyn MediaHost,
    request: &PlayRequest,
    open_local: F,
) -> Result<(), HostError>
where
    F: FnOnce(&str) -> Result<(), HostError>,
{
    let item = &request.item;
    if request.target.is_browser() {
        let resolved = host.resolve_media(&item.media_content_id).await?;
        tracing::info!(url = %resolved.url, "opening media in the browser");
        return open_local(&resolved.url);
    }

    tracing::info!(
        target_id = %request.target.id,
        content_id = %item.media_content_id,
        "playing media"
    );
    host.play_media(
        &request.target.id,
        &item.media_content_id,
        &item.media_content_type,
    )
    .await
}

pub async fn send_seek(host: &dyn MediaHost, command: &SeekCommand) -> Result<(), HostError> {
    tracing::info!(
        target_id = %command.target_id,
        position = command.position_secs,
        "seeking"
    );
    host.seek(&command.target_id, command.position_secs).await
}

/// Opens a resolved URL for playback in this browser.
#[cfg(target_arch = "wasm32")]
pub fn open_local(url: &str) -> Result<(), HostError> {
    crate::api::hass_bridge::open_in_new_tab(url)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_local(url: &str) -> Result<(), HostError> {
    tracing::info!(url = %url, "no browser window to open media in");
    Ok(())
}
