//! Append-only message feed.
//!
//! The feed is the canonical in-memory message list. It is created empty,
//! populated once by the snapshot load (the only full overwrite in its
//! lifetime), then grown strictly at the tail by push events. Accepted
//! entries are never reordered or removed; order is client arrival order,
//! not server creation-time order.

use patter_types::Message;

/// Append-only ordered message container with a monotonic revision counter.
///
/// The revision increments on every mutation that changes the visible feed,
/// so a presentation layer can cheaply detect staleness.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    entries: Vec<Message>,
    revision: u64,
}

impl Feed {
    /// Create an empty feed at revision zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feed with a snapshot, dropping `null` entries.
    ///
    /// This is the single full overwrite in the feed lifecycle. Returns the
    /// number of entries kept; the number dropped is the difference from the
    /// input length.
    pub fn replace_with_snapshot(&mut self, entries: Vec<Option<Message>>) -> usize {
        self.entries = entries.into_iter().flatten().collect();
        self.revision += 1;
        self.entries.len()
    }

    /// Append a message at the tail.
    pub fn append(&mut self, message: Message) {
        self.entries.push(message);
        self.revision += 1;
    }

    /// Ingest a push event: `None` is discarded without changing the feed,
    /// `Some` is appended. Returns whether the feed changed.
    pub fn ingest(&mut self, event: Option<Message>) -> bool {
        match event {
            Some(message) => {
                self.append(message);
                true
            }
            None => false,
        }
    }

    /// The accepted entries, in arrival order.
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    /// Number of accepted entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the feed holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current revision; increments on every visible change.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(content: &str) -> Message {
        Message::outbound(content, "A")
    }

    #[test]
    fn new_feed_is_empty() {
        let feed = Feed::new();
        assert!(feed.is_empty());
        assert_eq!(feed.revision(), 0);
    }

    #[test]
    fn snapshot_drops_null_entries() {
        let mut feed = Feed::new();
        let kept = feed.replace_with_snapshot(vec![Some(msg("hi")), None]);

        assert_eq!(kept, 1);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.entries()[0].content.as_deref(), Some("hi"));
    }

    #[test]
    fn ingest_null_never_changes_length() {
        let mut feed = Feed::new();
        feed.append(msg("one"));
        let rev = feed.revision();

        assert!(!feed.ingest(None));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.revision(), rev);
    }

    #[test]
    fn pushes_append_after_snapshot_in_arrival_order() {
        let mut feed = Feed::new();
        feed.replace_with_snapshot(vec![Some(msg("S1")), Some(msg("S2"))]);
        for content in ["A", "B", "C"] {
            assert!(feed.ingest(Some(msg(content))));
        }

        let order: Vec<_> = feed
            .entries()
            .iter()
            .map(|m| m.content.as_deref().unwrap())
            .collect();
        assert_eq!(order, ["S1", "S2", "A", "B", "C"]);
    }

    #[test]
    fn duplicate_pushes_are_kept() {
        // No dedup key exists in the contract; a duplicate broadcast is
        // visible twice.
        let mut feed = Feed::new();
        feed.ingest(Some(msg("same")));
        feed.ingest(Some(msg("same")));
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn revision_tracks_every_visible_change() {
        let mut feed = Feed::new();
        feed.replace_with_snapshot(vec![]);
        assert_eq!(feed.revision(), 1);
        feed.append(msg("x"));
        assert_eq!(feed.revision(), 2);
        feed.ingest(None);
        assert_eq!(feed.revision(), 2);
    }
}
