use crate::api::{DirectoryItem, DirectoryListing};

/// A directory fetch in flight. Only the most recently issued one is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub sequence: u64,
    pub content_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryBrowser {
    path: Vec<String>,
    listing: Option<DirectoryListing>,
    sequence: u64,
    root: Option<String>,
}

impl DirectoryBrowser {
    pub fn new(path: Vec<String>, root: Option<String>) -> Self {
        Self {
            path,
            listing: None,
            sequence: 0,
            root,
        }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn listing(&self) -> Option<&DirectoryListing> {
        self.listing.as_ref()
    }

    pub fn children(&self) -> &[DirectoryItem] {
        self.listing
            .as_ref()
            .map(|listing| listing.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn can_go_back(&self) -> bool {
        !self.path.is_empty()
    }

    /// Starts a fetch of the directory at the end of the path, invalidating
    /// any fetch still in flight.
    pub fn refresh(&mut self) -> FetchTicket {
        self.sequence = self.sequence.wrapping_add(1);
        FetchTicket {
            sequence: self.sequence,
            content_id: self.path.last().cloned().or_else(|| self.root.clone()),
        }
    }

    pub fn enter(&mut self, content_id: &str) -> FetchTicket {
        self.path.push(content_id.to_string());
        self.refresh()
    }

    /// Pops one level. `None` when already at the root; nothing is refetched.
    pub fn back(&mut self) -> Option<FetchTicket> {
        self.path.pop()?;
        Some(self.refresh())
    }

    /// Stores `listing` if `ticket` is still the latest fetch.
    pub fn apply(&mut self, ticket: &FetchTicket, listing: DirectoryListing) -> bool {
        if ticket.sequence != self.sequence {
            tracing::debug!(
                stale = ticket.sequence,
                current = self.sequence,
                "discarding stale directory listing"
            );
            return false;
        }
        self.listing = Some(listing);
        true
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.sequence == self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(title: &str) -> DirectoryListing {
        DirectoryListing {
            item: DirectoryItem {
                title: title.to_string(),
                ..DirectoryItem::default()
            },
            children: Vec::new(),
        }
    }

    #[test]
    fn empty_path_browses_the_root() {
        let mut browser = DirectoryBrowser::new(Vec::new(), None);
        assert_eq!(browser.refresh().content_id, None);

        let mut rooted = DirectoryBrowser::new(Vec::new(), Some("media-source://local".into()));
        assert_eq!(rooted.refresh().content_id.as_deref(), Some("media-source://local"));
    }

    #[test]
    fn three_pushes_two_backs_leave_one() {
        let mut browser = DirectoryBrowser::new(Vec::new(), None);
        browser.enter("a");
        browser.enter("b");
        let ticket = browser.enter("c");
        assert_eq!(ticket.content_id.as_deref(), Some("c"));

        assert_eq!(browser.back().unwrap().content_id.as_deref(), Some("b"));
        assert_eq!(browser.back().unwrap().content_id.as_deref(), Some("a"));
        assert_eq!(browser.path(), ["a".to_string()]);
    }

    #[test]
    fn back_on_empty_path_is_a_no_op() {
        let mut browser = DirectoryBrowser::new(Vec::new(), None);
        let before = browser.refresh();
        assert!(browser.back().is_none());
        assert!(browser.is_current(&before));
        assert!(browser.path().is_empty());
    }

    #[test]
    fn stale_fetch_is_discarded() {
        let mut browser = DirectoryBrowser::new(Vec::new(), None);
        let slow = browser.enter("slow");
        let fast = browser.back().unwrap();

        assert!(browser.apply(&fast, listing("root")));
        assert!(!browser.apply(&slow, listing("slow")));
        assert_eq!(browser.listing().unwrap().item.title, "root");
    }
}
