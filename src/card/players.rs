use crate::api::{HostStates, PlayerTarget, BROWSE_MEDIA_FEATURE, MEDIA_PLAYER_PREFIX};

/// Browser target first, then every host media player able to browse media.
pub fn available_targets(states: &HostStates) -> Vec<PlayerTarget> {
    let hosted = states.values().filter(|entity| {
        entity.entity_id.starts_with(MEDIA_PLAYER_PREFIX)
            && entity.attributes.supported_features & BROWSE_MEDIA_FEATURE != 0
    });

    std::iter::once(PlayerTarget::browser())
        .chain(hosted.map(|entity| PlayerTarget {
            id: entity.entity_id.clone(),
            display_name: entity
                .attributes
                .friendly_name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| entity.entity_id.clone()),
        }))
        .collect()
}

/// Picks a replacement selection: the persisted id, then the configured
/// preference (id or display name), then the first target.
pub fn reselect(
    available: &[PlayerTarget],
    persisted_id: Option<&str>,
    preferred: Option<&str>,
) -> Option<PlayerTarget> {
    persisted_id
        .and_then(|id| available.iter().find(|target| target.id == id))
        .or_else(|| {
            preferred.and_then(|wanted| {
                available
                    .iter()
                    .find(|target| target.id == wanted || target.display_name == wanted)
            })
        })
        .or_else(|| available.first())
        .cloned()
}

#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    available: Vec<PlayerTarget>,
    selected: Option<PlayerTarget>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available(&self) -> &[PlayerTarget] {
        &self.available
    }

    pub fn selected(&self) -> Option<&PlayerTarget> {
        self.selected.as_ref()
    }

    /// Refreshes the target list. Returns the new selection when the previous
    /// one disappeared and had to be replaced.
    pub fn update(
        &mut self,
        states: &HostStates,
        persisted_id: Option<&str>,
        preferred: Option<&str>,
    ) -> Option<Option<PlayerTarget>> {
        self.available = available_targets(states);

        let still_available = self
            .selected
            .as_ref()
            .is_some_and(|selected| self.available.iter().any(|t| t.id == selected.id));
        if still_available {
            // Pick up display name changes.
            if let Some(selected) = self.selected.as_mut() {
                if let Some(fresh) = self.available.iter().find(|t| t.id == selected.id) {
                    selected.display_name = fresh.display_name.clone();
                }
            }
            return None;
        }

        self.selected = reselect(&self.available, persisted_id, preferred);
        Some(self.selected.clone())
    }

    /// Selects `id` if it is available. Unknown ids leave the selection alone.
    pub fn select(&mut self, id: &str) -> Option<&PlayerTarget> {
        let target = self.available.iter().find(|t| t.id == id)?.clone();
        self.selected = Some(target);
        self.selected.as_ref()
    }
}
