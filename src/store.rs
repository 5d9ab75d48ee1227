use anyhow::Result;
use uuid::Uuid;

/// Shown in place of a reply whenever the proxy call fails for any reason.
/// The user never sees status codes or raw error text.
pub const APOLOGY: &str =
    "Sorry, I couldn't get a response just now. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

/// In-memory conversation for one chat session: the ordered message list
/// plus the single in-flight request flag. The store performs no I/O; the
/// caller sends whatever `submit` hands back and feeds the outcome to
/// `resolve`.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    pending: bool,
    revision: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the composer text and returns the trimmed message to send,
    /// or `None` when the text is blank or a request is already in flight
    /// (silently ignored, not an error).
    pub fn submit(&mut self, raw: &str) -> Option<String> {
        let text = raw.trim();
        if text.is_empty() || self.pending {
            return None;
        }
        self.append(Role::User, text.to_string());
        self.pending = true;
        Some(text.to_string())
    }

    /// Completes the in-flight request: a reply appends an assistant
    /// message, a failure appends the fixed apology. Exactly one message is
    /// appended either way.
    pub fn resolve(&mut self, outcome: Result<String>) {
        if !self.pending {
            return;
        }
        match outcome {
            Ok(reply) => self.append(Role::Assistant, reply),
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.append(Role::Assistant, APOLOGY.to_string());
            }
        }
        self.pending = false;
    }

    /// Starts a fresh conversation.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.pending = false;
        self.revision += 1;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Bumped whenever the message list changes, so the view knows to
    /// re-render and scroll to the latest message.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn append(&mut self, role: Role, content: String) {
        self.messages.push(Message {
            id: Uuid::new_v4().to_string(),
            role,
            content,
        });
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashSet;

    #[test]
    fn test_submit_appends_user_message() {
        let mut store = ConversationStore::new();
        let sent = store.submit("  hello there  ");
        assert_eq!(sent.as_deref(), Some("hello there"));
        assert!(store.is_pending());
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].role, Role::User);
        assert_eq!(store.messages()[0].content, "hello there");
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut store = ConversationStore::new();
        assert!(store.submit("").is_none());
        assert!(store.submit("   \n\t ").is_none());
        assert!(!store.is_pending());
        assert!(store.messages().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_submit_while_pending_is_ignored() {
        let mut store = ConversationStore::new();
        store.submit("first").unwrap();
        assert!(store.submit("second").is_none());
        assert_eq!(store.messages().len(), 1);
    }

    #[test]
    fn test_cycle_appends_exactly_two_messages() {
        let mut store = ConversationStore::new();
        store.submit("hi").unwrap();
        store.resolve(Ok("hello!".to_string()));
        assert_eq!(store.messages().len(), 2);
        assert_eq!(store.messages()[1].role, Role::Assistant);
        assert_eq!(store.messages()[1].content, "hello!");
        assert!(!store.is_pending());

        // Each further cycle grows the list by exactly two.
        store.submit("again").unwrap();
        store.resolve(Ok("sure".to_string()));
        assert_eq!(store.messages().len(), 4);
    }

    #[test]
    fn test_failure_appends_apology() {
        let mut store = ConversationStore::new();
        store.submit("hi").unwrap();
        store.resolve(Err(anyhow!("connection refused")));
        assert_eq!(store.messages().len(), 2);
        assert_eq!(store.messages()[1].content, APOLOGY);
        assert!(!store.is_pending());
    }

    #[test]
    fn test_resolve_without_pending_is_ignored() {
        let mut store = ConversationStore::new();
        store.resolve(Ok("stray".to_string()));
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let mut store = ConversationStore::new();
        for i in 0..50 {
            store.submit(&format!("message {i}")).unwrap();
            store.resolve(Ok(format!("reply {i}")));
        }
        let ids: HashSet<&str> = store.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), store.messages().len());
    }

    #[test]
    fn test_revision_tracks_appends() {
        let mut store = ConversationStore::new();
        assert_eq!(store.revision(), 0);
        store.submit("hi").unwrap();
        assert_eq!(store.revision(), 1);
        store.resolve(Ok("hello".to_string()));
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = ConversationStore::new();
        store.submit("hi").unwrap();
        store.reset();
        assert!(store.messages().is_empty());
        assert!(!store.is_pending());
        // A new submission works normally after reset.
        assert!(store.submit("fresh").is_some());
    }
}
