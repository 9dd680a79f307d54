use bevy::prelude::*;
use crossbeam_channel::{unbounded, Receiver, Sender};

/// What the markdown viewer needs to open a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDescriptor {
    pub identifier: String,
    pub display_name: String,
    /// Path of the document, `content/<identifier>.md`.
    pub content_reference: String,
}

impl TopicDescriptor {
    pub fn new(identifier: &str, display_name: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            display_name: display_name.to_string(),
            content_reference: format!("content/{identifier}.md"),
        }
    }
}

/// Topics handed out to markers in turn.
#[derive(Resource, Debug, Clone)]
pub struct TopicCatalog {
    topics: Vec<TopicDescriptor>,
    next: usize,
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self::new(vec![
            TopicDescriptor::new("about", "About"),
            TopicDescriptor::new("projects", "Projects"),
            TopicDescriptor::new("experience", "Experience"),
            TopicDescriptor::new("skills", "Skills"),
            TopicDescriptor::new("writing", "Writing"),
            TopicDescriptor::new("contact", "Contact"),
        ])
    }
}

impl TopicCatalog {
    pub fn new(topics: Vec<TopicDescriptor>) -> Self {
        Self { topics, next: 0 }
    }

    /// Round robin over the catalog; `None` only when it is empty.
    pub fn assign(&mut self) -> Option<TopicDescriptor> {
        if self.topics.is_empty() {
            return None;
        }
        let topic = self.topics[self.next % self.topics.len()].clone();
        self.next = (self.next + 1) % self.topics.len();
        Some(topic)
    }
}

/// Fired inside the app when a marker is clicked.
#[derive(Event, Debug, Clone)]
pub struct TopicOpened(pub TopicDescriptor);

/// Host-side sink for picked topics. Insert it to receive descriptors outside
/// the ECS.
#[derive(Resource, Clone)]
pub struct TopicOutbox {
    tx: Sender<TopicDescriptor>,
}

impl TopicOutbox {
    pub fn channel() -> (Self, Receiver<TopicDescriptor>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    /// False once the receiving side is gone.
    pub fn send(&self, topic: TopicDescriptor) -> bool {
        self.tx.send(topic).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_assigns_round_robin() {
        let mut catalog = TopicCatalog::default();
        let first: Vec<_> = (0..6).filter_map(|_| catalog.assign()).collect();
        let again = catalog.assign().map(|t| t.identifier);
        assert_eq!(again, Some(first[0].identifier.clone()));
        assert_eq!(first[1].content_reference, "content/projects.md");
    }

    #[test]
    fn test_empty_catalog_assigns_nothing() {
        assert_eq!(TopicCatalog::new(Vec::new()).assign(), None);
    }

    #[test]
    fn test_outbox_delivers_until_receiver_drops() {
        let (outbox, rx) = TopicOutbox::channel();
        assert!(outbox.send(TopicDescriptor::new("about", "About")));
        assert_eq!(rx.try_recv().map(|t| t.identifier), Ok("about".to_string()));
        drop(rx);
        assert!(!outbox.send(TopicDescriptor::new("contact", "Contact")));
    }
}
