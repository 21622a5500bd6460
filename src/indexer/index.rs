use std::collections::HashMap;
use std::sync::Arc;

use crate::models::{ConversationKey, Message};

/// Per-conversation view over a parsed backup.
///
/// Every message appears in the all-messages sequence and in exactly one
/// contact-keyed sequence (shared via `Arc`, not duplicated). After
/// [`finalize`](ConversationIndex::finalize) the index is read-only; it has
/// no interior mutability, so any number of consumers may query it
/// concurrently.
#[derive(Debug, Default)]
pub struct ConversationIndex {
    all: Vec<Arc<Message>>,
    conversations: HashMap<String, Vec<Arc<Message>>>,
    contacts: Vec<String>,
}

impl ConversationIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert one message under its resolved conversation key
    pub(crate) fn insert(&mut self, message: Message) {
        let message = Arc::new(message);
        let key = message.contact().to_string();
        self.conversations.entry(key).or_default().push(Arc::clone(&message));
        self.all.push(message);
    }

    /// Sort every sequence chronologically and freeze the contact list.
    ///
    /// MMS records always follow the SMS records in the document, so the
    /// insertion order is not chronological. Timestamps are compared as
    /// integers; the sort is stable, so equal timestamps keep document
    /// order.
    pub(crate) fn finalize(&mut self) {
        self.all.sort_by_key(|m| m.timestamp());
        for sequence in self.conversations.values_mut() {
            sequence.sort_by_key(|m| m.timestamp());
        }
        let mut contacts: Vec<String> = self.conversations.keys().cloned().collect();
        contacts.sort_by_key(|c| c.to_lowercase());
        self.contacts = contacts;
    }

    /// Every message in the backup, chronologically ordered
    pub fn all_messages(&self) -> &[Arc<Message>] {
        &self.all
    }

    /// The conversation with one contact, chronologically ordered
    pub fn messages_for(&self, contact: &str) -> Option<&[Arc<Message>]> {
        self.conversations.get(contact).map(Vec::as_slice)
    }

    /// Lookup by [`ConversationKey`]
    pub fn messages(&self, key: &ConversationKey) -> Option<&[Arc<Message>]> {
        match key {
            ConversationKey::All => Some(&self.all),
            ConversationKey::Contact(contact) => self.messages_for(contact),
        }
    }

    /// Conversation partners, ordered case-insensitively
    pub fn contacts(&self) -> &[String] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
