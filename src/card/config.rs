use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SEEK_STEP_SECS: u32 = 30;
pub const DEFAULT_SEEK_QUIET_MS: u64 = 1500;
pub const DEFAULT_CARD_SIZE: u32 = 3;

/// How a listing row is recognised as the item currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NowPlayingMatch {
    /// Exact content id, or the playing id containing the row title. The title
    /// check catches players that rewrite ids but misfires on short titles.
    #[default]
    TitleSubstring,
    /// Exact content id only.
    Exact,
}

/// Card options from the dashboard YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Preferred player id or display name when nothing was persisted.
    pub target: Option<String>,
    /// Content id browsed when the path is empty. `/` means the host root.
    pub start_dir: Option<String>,
    pub seek_step_secs: u32,
    pub seek_quiet_ms: u64,
    pub now_playing_match: NowPlayingMatch,
    pub card_size: u32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            target: None,
            start_dir: None,
            seek_step_secs: DEFAULT_SEEK_STEP_SECS,
            seek_quiet_ms: DEFAULT_SEEK_QUIET_MS,
            now_playing_match: NowPlayingMatch::default(),
            card_size: DEFAULT_CARD_SIZE,
        }
    }
}

impl CardConfig {
    /// The stub the dashboard editor inserts for a new card.
    pub fn stub() -> Self {
        Self {
            target: Some("Browser".to_string()),
            start_dir: Some("/".to_string()),
            ..Self::default()
        }
    }

    /// Content id for the empty path, `None` for the host's own root.
    pub fn root_content_id(&self) -> Option<&str> {
        self.start_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty() && *dir != "/")
    }

    pub fn seek_step(&self) -> f64 {
        f64::from(self.seek_step_secs.max(1))
    }

    pub fn seek_quiet_period(&self) -> Duration {
        Duration::from_millis(self.seek_quiet_ms)
    }
}
