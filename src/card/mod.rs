//! Card state and the operations the UI drives.
//!
//! [`CardController`] owns the directory browser, player registry, seek
//! accumulator and preference store of one card instance. Operations that
//! need the host return a ticket or request; the caller performs the async
//! call (see [`actions`]) and feeds the result back.

pub mod actions;
mod config;
mod directory;
mod players;
mod progress;
mod timer;

pub use config::*;
pub use directory::{DirectoryBrowser, FetchTicket};
pub use players::{available_targets, reselect, PlayerRegistry};
pub use progress::{current_progress, SeekAccumulator, SeekCommand};
pub use timer::{Clock, ManualClock, SingleSlotTimer, SystemClock, TimerTicket};

use chrono::{DateTime, Utc};

use crate::api::{
    DirectoryItem, DirectoryListing, EntityState, HostError, HostStates, PlayerTarget,
};
use crate::db::{PreferenceStore, PreferencesPatch, UiPreferences};
use crate::utils::{decode_content_id, is_now_playing};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub target: PlayerTarget,
    pub item: DirectoryItem,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Navigate(FetchTicket),
    Play(PlayRequest),
    /// Leaf selected while no playback target is available.
    Ignored,
}

#[derive(Debug)]
pub struct CardController {
    config: CardConfig,
    prefs: PreferenceStore,
    browser: DirectoryBrowser,
    players: PlayerRegistry,
    seek: SeekAccumulator,
    states: HostStates,
    seen_revision: Option<u64>,
    playing_item_id: Option<String>,
}

impl CardController {
    pub fn new(config: CardConfig, prefs: PreferenceStore) -> Self {
        let browser = DirectoryBrowser::new(
            prefs.get().current_path.clone(),
            config.root_content_id().map(str::to_string),
        );
        Self {
            config,
            prefs,
            browser,
            players: PlayerRegistry::new(),
            seek: SeekAccumulator::new(),
            states: HostStates::new(),
            seen_revision: None,
            playing_item_id: None,
        }
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn preferences(&self) -> &UiPreferences {
        self.prefs.get()
    }

    pub fn browser(&self) -> &DirectoryBrowser {
        &self.browser
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    pub fn playing_item_id(&self) -> Option<&str> {
        self.playing_item_id.as_deref()
    }

    pub fn pending_seek_delta(&self) -> f64 {
        self.seek.pending_delta()
    }

    // Navigation

    pub fn refresh(&mut self) -> FetchTicket {
        self.browser.refresh()
    }

    pub fn select(&mut self, item: &DirectoryItem) -> SelectOutcome {
        if item.is_directory() {
            let ticket = self.browser.enter(&item.media_content_id);
            self.persist_path();
            return SelectOutcome::Navigate(ticket);
        }

        match self.players.selected() {
            Some(target) => SelectOutcome::Play(PlayRequest {
                target: target.clone(),
                item: item.clone(),
            }),
            None => SelectOutcome::Ignored,
        }
    }

    pub fn back(&mut self) -> Option<FetchTicket> {
        let ticket = self.browser.back()?;
        self.persist_path();
        Some(ticket)
    }

    pub fn apply_listing(&mut self, ticket: &FetchTicket, listing: DirectoryListing) -> bool {
        self.browser.apply(ticket, listing)
    }

    /// Applies the outcome of the fetch for `ticket`. A failure of the
    /// current fetch is returned for the caller to surface; the previous
    /// listing stays. Failures of superseded fetches are swallowed.
    pub fn finish_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<DirectoryListing, HostError>,
    ) -> Result<bool, HostError> {
        match result {
            Ok(listing) => Ok(self.apply_listing(ticket, listing)),
            Err(err) if self.browser.is_current(ticket) => Err(err),
            Err(err) => {
                tracing::debug!("ignoring failure of superseded fetch: {err}");
                Ok(false)
            }
        }
    }

    fn persist_path(&mut self) {
        self.prefs
            .save_or_log(PreferencesPatch::current_path(self.browser.path().to_vec()));
    }

    // Host state and players

    /// Whether the host has handed over a state object not yet applied.
    pub fn is_stale(&self, revision: u64) -> bool {
        self.seen_revision != Some(revision)
    }

    pub fn apply_host_states(&mut self, revision: u64, states: HostStates) {
        self.seen_revision = Some(revision);
        self.states = states;

        let persisted = self.prefs.get().selected_player_id.clone();
        let replaced = self.players.update(
            &self.states,
            persisted.as_deref(),
            self.config.target.as_deref(),
        );
        if let Some(selection) = replaced {
            tracing::info!(
                player = selection.as_ref().map(|t| t.id.as_str()).unwrap_or("none"),
                "selected playback target"
            );
            self.prefs.save_or_log(PreferencesPatch::selected_player_id(
                selection.map(|target| target.id),
            ));
        }

        self.refresh_playing_item();
    }

    /// Selects the player with `id`. Unknown ids are ignored.
    pub fn select_player(&mut self, id: &str) -> bool {
        if self.players.select(id).is_none() {
            tracing::debug!(player = %id, "ignoring selection of unknown player");
            return false;
        }
        self.prefs
            .save_or_log(PreferencesPatch::selected_player_id(Some(id.to_string())));
        self.seek.cancel();
        self.refresh_playing_item();
        true
    }

    fn selected_state(&self) -> Option<&EntityState> {
        let selected = self.players.selected()?;
        self.states.get(&selected.id)
    }

    fn refresh_playing_item(&mut self) {
        self.playing_item_id = self
            .selected_state()
            .and_then(|state| state.attributes.media_content_id.as_deref())
            .filter(|id| !id.is_empty())
            .map(decode_content_id);
    }

    // Played items

    pub fn is_item_playing(&self, item: &DirectoryItem) -> bool {
        if item.is_directory() {
            return false;
        }
        self.playing_item_id.as_deref().is_some_and(|playing| {
            is_now_playing(
                playing,
                &item.media_content_id,
                &item.title,
                self.config.now_playing_match,
            )
        })
    }

    pub fn has_been_played(&self, item: &DirectoryItem) -> bool {
        self.prefs.get().has_played(&item.media_content_id)
    }

    pub fn mark_played(&mut self, content_id: &str) {
        if self.prefs.get().has_played(content_id) {
            return;
        }
        let mut ids = self.prefs.get().played_item_ids.clone();
        ids.push(content_id.to_string());
        self.prefs.save_or_log(PreferencesPatch::played_item_ids(ids));
    }

    /// Records a finished play request. Only a successful play marks the
    /// item played.
    pub fn finish_play(
        &mut self,
        request: &PlayRequest,
        result: Result<(), HostError>,
    ) -> Result<(), HostError> {
        result?;
        self.mark_played(&request.item.media_content_id);
        Ok(())
    }

    pub fn clear_played(&mut self) {
        self.prefs
            .save_or_log(PreferencesPatch::played_item_ids(Vec::new()));
    }

    /// Index of the last child in the current listing that was played.
    pub fn last_played_index(&self) -> Option<usize> {
        let prefs = self.prefs.get();
        self.browser
            .children()
            .iter()
            .rposition(|child| prefs.has_played(&child.media_content_id))
    }

    // Seeking

    pub fn seek_backward(&mut self, now: DateTime<Utc>) -> Option<TimerTicket> {
        let step = -self.config.seek_step();
        self.push_seek(step, now)
    }

    pub fn seek_forward(&mut self, now: DateTime<Utc>) -> Option<TimerTicket> {
        let step = self.config.seek_step();
        self.push_seek(step, now)
    }

    fn push_seek(&mut self, step: f64, now: DateTime<Utc>) -> Option<TimerTicket> {
        self.playing_item_id.as_ref()?;
        Some(self.seek.push(step, now, self.config.seek_quiet_period()))
    }

    /// Command for `ticket` once its quiet period elapsed on the event loop.
    pub fn claim_seek(&mut self, ticket: TimerTicket, now: DateTime<Utc>) -> Option<SeekCommand> {
        let Some(target_id) = self.players.selected().map(|t| t.id.clone()) else {
            self.seek.cancel();
            return None;
        };
        let state = self.states.get(&target_id);
        self.seek.claim(ticket, &target_id, state, now)
    }

    /// Command due at `now`, for callers driving a clock instead of sleeping.
    pub fn poll_seek(&mut self, now: DateTime<Utc>) -> Option<SeekCommand> {
        let Some(target_id) = self.players.selected().map(|t| t.id.clone()) else {
            self.seek.cancel();
            return None;
        };
        let state = self.states.get(&target_id);
        self.seek.poll(&target_id, state, now)
    }

    pub fn cancel_pending_seek(&mut self) {
        self.seek.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EntityAttributes, MediaClass, PlayerStatus, BROWSE_MEDIA_FEATURE};
    use crate::db::{MemoryStorage, PREFERENCES_KEY};
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn leaf(id: &str, title: &str) -> DirectoryItem {
        DirectoryItem {
            title: title.into(),
            media_class: MediaClass::Other,
            media_content_id: id.into(),
            media_content_type: "audio/mpeg".into(),
            ..DirectoryItem::default()
        }
    }

    fn folder(id: &str) -> DirectoryItem {
        DirectoryItem {
            title: id.into(),
            media_class: MediaClass::Directory,
            media_content_id: id.into(),
            ..DirectoryItem::default()
        }
    }

    fn den(content_id: Option<&str>) -> HostStates {
        let state = EntityState {
            entity_id: "media_player.den".into(),
            state: PlayerStatus::Playing,
            attributes: EntityAttributes {
                friendly_name: Some("Den".into()),
                supported_features: BROWSE_MEDIA_FEATURE,
                media_content_id: content_id.map(str::to_string),
                media_position: Some(10.0),
                media_position_updated_at: Some(t0()),
                media_duration: Some(300.0),
            },
        };
        [("media_player.den".to_string(), state)].into_iter().collect()
    }

    fn controller() -> CardController {
        CardController::new(
            CardConfig::default(),
            PreferenceStore::load(MemoryStorage::new()),
        )
    }

    #[test]
    fn path_is_restored_from_preferences() {
        let storage = MemoryStorage::with_entry(PREFERENCES_KEY, r#"{"currentPath":["a","b"]}"#);
        let mut card = CardController::new(CardConfig::default(), PreferenceStore::load(storage));
        assert_eq!(card.refresh().content_id.as_deref(), Some("b"));
    }

    #[test]
    fn selecting_a_folder_navigates_and_persists() {
        let mut card = controller();
        let outcome = card.select(&folder("albums"));
        assert!(matches!(outcome, SelectOutcome::Navigate(ref t) if t.content_id.as_deref() == Some("albums")));
        assert_eq!(card.preferences().current_path, vec!["albums".to_string()]);

        card.back();
        assert!(card.preferences().current_path.is_empty());
    }

    #[test]
    fn selecting_a_leaf_without_players_is_ignored() {
        let mut card = controller();
        assert_eq!(card.select(&leaf("x", "x")), SelectOutcome::Ignored);
    }

    #[test]
    fn selecting_a_leaf_plays_on_the_selected_target() {
        let mut card = controller();
        card.apply_host_states(1, den(None));
        assert!(card.select_player("media_player.den"));

        match card.select(&leaf("song", "Song")) {
            SelectOutcome::Play(request) => {
                assert_eq!(request.target.id, "media_player.den");
                assert_eq!(request.item.media_content_id, "song");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn first_state_update_selects_and_persists() {
        let mut card = controller();
        assert!(card.is_stale(7));
        card.apply_host_states(7, den(None));
        assert!(!card.is_stale(7));
        assert_eq!(card.players().selected().unwrap().id, "browser");
        assert_eq!(card.preferences().selected_player_id.as_deref(), Some("browser"));
    }

    #[test]
    fn playing_item_is_decoded_and_matched() {
        let mut card = controller();
        card.apply_host_states(1, den(Some("media-source://local/My%20Song.mp3")));
        card.select_player("media_player.den");

        assert_eq!(card.playing_item_id(), Some("media-source://local/My Song.mp3"));
        assert!(card.is_item_playing(&leaf("other-id", "My Song")));
        assert!(!card.is_item_playing(&folder("My Song")));
    }

    #[test]
    fn played_items_are_deduplicated_and_cleared() {
        let mut card = controller();
        card.mark_played("a");
        card.mark_played("a");
        card.mark_played("b");
        assert_eq!(card.preferences().played_item_ids, vec!["a".to_string(), "b".to_string()]);

        card.clear_played();
        assert!(card.preferences().played_item_ids.is_empty());
    }

    #[test]
    fn last_played_is_the_last_matching_child() {
        let mut card = controller();
        let ticket = card.refresh();
        card.apply_listing(
            &ticket,
            DirectoryListing {
                item: folder("root"),
                children: vec![leaf("1", "1"), leaf("2", "2"), leaf("3", "3")],
            },
        );
        assert_eq!(card.last_played_index(), None);

        card.mark_played("2");
        card.mark_played("1");
        assert_eq!(card.last_played_index(), Some(1));
    }

    #[test]
    fn seek_requires_something_playing() {
        let mut card = controller();
        card.apply_host_states(1, den(None));
        card.select_player("media_player.den");
        assert!(card.seek_forward(t0()).is_none());
        assert_eq!(card.pending_seek_delta(), 0.0);
    }

    #[test]
    fn seek_is_sent_once_after_quiet_period() {
        let clock = ManualClock::new(t0());
        let mut card = controller();
        card.apply_host_states(1, den(Some("song")));
        card.select_player("media_player.den");

        card.seek_forward(clock.now()).unwrap();
        card.seek_forward(clock.now()).unwrap();
        clock.advance(std::time::Duration::from_millis(1000));
        card.seek_backward(clock.now()).unwrap();

        clock.advance(std::time::Duration::from_millis(1000));
        assert_eq!(card.poll_seek(clock.now()), None);

        clock.advance(std::time::Duration::from_millis(500));
        let command = card.poll_seek(clock.now()).unwrap();
        assert_eq!(command.target_id, "media_player.den");
        // 10s reported at t0, 2.5s elapsed, +30 accumulated.
        assert!((command.position_secs - 42.5).abs() < 1e-6);
        assert_eq!(card.poll_seek(clock.now() + chrono::Duration::seconds(10)), None);
    }

    #[test]
    fn switching_players_drops_pending_seek() {
        let mut card = controller();
        card.apply_host_states(1, den(Some("song")));
        card.select_player("media_player.den");
        let ticket = card.seek_forward(t0()).unwrap();

        card.select_player("browser");
        assert_eq!(card.claim_seek(ticket, t0()), None);
        assert_eq!(card.pending_seek_delta(), 0.0);
    }
}
