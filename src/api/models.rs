use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Entity id of the synthetic target that plays media in this browser tab.
pub const BROWSER_PLAYER_ID: &str = "browser";
pub const BROWSER_PLAYER_NAME: &str = "Browser";

/// Entity id prefix of playback devices.
pub const MEDIA_PLAYER_PREFIX: &str = "media_player.";

/// `MediaPlayerEntityFeature.BROWSE_MEDIA` on the host side.
pub const BROWSE_MEDIA_FEATURE: u64 = 131_072;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaClass {
    Directory,
    App,
    #[default]
    #[serde(other)]
    Other,
}

impl MediaClass {
    pub fn is_navigable(self) -> bool {
        matches!(self, Self::Directory | Self::App)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DirectoryItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub media_class: MediaClass,
    #[serde(default)]
    pub media_content_id: String,
    #[serde(default)]
    pub media_content_type: String,
    #[serde(default)]
    pub can_play: bool,
    #[serde(default)]
    pub can_expand: bool,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl DirectoryItem {
    pub fn is_directory(&self) -> bool {
        self.media_class.is_navigable()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DirectoryListing {
    #[serde(flatten)]
    pub item: DirectoryItem,
    #[serde(default)]
    pub children: Vec<DirectoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub url: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerTarget {
    pub id: String,
    pub display_name: String,
}

impl PlayerTarget {
    pub fn browser() -> Self {
        Self {
            id: BROWSER_PLAYER_ID.to_string(),
            display_name: BROWSER_PLAYER_NAME.to_string(),
        }
    }

    pub fn is_browser(&self) -> bool {
        self.id == BROWSER_PLAYER_ID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Playing,
    Paused,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityAttributes {
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub supported_features: u64,
    #[serde(default, deserialize_with = "lenient_content_id")]
    pub media_content_id: Option<String>,
    #[serde(default)]
    pub media_position: Option<f64>,
    #[serde(default)]
    pub media_position_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub media_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EntityState {
    pub entity_id: String,
    #[serde(default)]
    pub state: PlayerStatus,
    #[serde(default)]
    pub attributes: EntityAttributes,
}

/// Some integrations report numeric content ids.
fn lenient_content_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Some(id),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}

/// Host state snapshot keyed by entity id. Ordered so target lists are stable.
pub type HostStates = BTreeMap<String, EntityState>;

/// Picks the media players out of the host's full `states` object.
///
/// Entities are decoded one by one; one that does not fit [`EntityState`] is
/// skipped instead of failing the whole snapshot.
pub fn decode_host_states(raw: BTreeMap<String, serde_json::Value>) -> HostStates {
    raw.into_iter()
        .filter(|(entity_id, _)| entity_id.starts_with(MEDIA_PLAYER_PREFIX))
        .filter_map(|(entity_id, value)| match serde_json::from_value(value) {
            Ok(state) => Some((entity_id, state)),
            Err(err) => {
                tracing::debug!(entity_id = %entity_id, "skipping undecodable entity: {err}");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_decodes_host_payload() {
        let payload = r#"{
            "title": "Media",
            "media_class": "directory",
            "media_content_id": "media-source://media_source",
            "media_content_type": "",
            "can_play": false,
            "can_expand": true,
            "children_media_class": "directory",
            "thumbnail": null,
            "children": [
                {"title": "Podcasts", "media_class": "app", "media_content_id": "media-source://podcasts", "media_content_type": "app"},
                {"title": "song.mp3", "media_class": "music", "media_content_id": "media-source://media_source/local/song.mp3", "media_content_type": "audio/mpeg"}
            ]
        }"#;

        let listing: DirectoryListing = serde_json::from_str(payload).unwrap();
        assert_eq!(listing.item.title, "Media");
        assert!(listing.item.is_directory());
        assert_eq!(listing.children.len(), 2);
        assert!(listing.children[0].is_directory());
        assert_eq!(listing.children[1].media_class, MediaClass::Other);
        assert!(!listing.children[1].is_directory());
    }

    #[test]
    fn entity_state_decodes_timestamps_and_unknown_states() {
        let payload = r#"{
            "entity_id": "media_player.kitchen",
            "state": "buffering",
            "attributes": {
                "friendly_name": "Kitchen",
                "supported_features": 152461,
                "media_position": 12.5,
                "media_position_updated_at": "2024-03-01T10:00:00.123456+00:00"
            }
        }"#;

        let state: EntityState = serde_json::from_str(payload).unwrap();
        assert_eq!(state.state, PlayerStatus::Other);
        assert_eq!(state.attributes.media_position, Some(12.5));
        assert!(state.attributes.media_position_updated_at.is_some());
        assert_eq!(state.attributes.media_duration, None);
    }

    #[test]
    fn one_malformed_entity_does_not_hide_the_others() {
        let payload = r#"{
            "media_player.den": {"entity_id": "media_player.den", "state": "playing", "attributes": {"friendly_name": "Den", "supported_features": 131072, "media_content_id": "media-source://a.mp3"}},
            "media_player.kodi": {"entity_id": "media_player.kodi", "state": "idle", "attributes": {"friendly_name": "Kodi", "supported_features": 131072, "media_content_id": 1234}},
            "media_player.broken": {"entity_id": "media_player.broken", "state": "idle", "attributes": {"supported_features": "lots"}},
            "light.hall": {"entity_id": "light.hall", "state": "on", "attributes": {"brightness": 255}}
        }"#;

        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(payload).unwrap();
        let states = decode_host_states(raw);

        assert_eq!(
            states.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["media_player.den", "media_player.kodi"]
        );
        assert_eq!(
            states["media_player.kodi"].attributes.media_content_id.as_deref(),
            Some("1234")
        );
        assert_eq!(
            states["media_player.den"].attributes.media_content_id.as_deref(),
            Some("media-source://a.mp3")
        );
    }
}
