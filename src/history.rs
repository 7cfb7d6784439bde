//! Per-channel conversation history storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use log::debug;
use poise::serenity_prelude::ChannelId;
use tokio::sync::Mutex;

use crate::huggingface::ChatMessage;

/// Maximum number of user/assistant turns kept per channel, not counting
/// the system turn.
pub const MAX_TURNS: usize = 10;

/// Ordered conversation history for one channel.
///
/// The first message is always the system turn; trimming only ever discards
/// the oldest user/assistant turns.
#[derive(Debug)]
pub struct ConversationBuffer {
    messages: Vec<ChatMessage>,
}

impl ConversationBuffer {
    fn new(system_prompt: &str) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Enforce the history cap, keeping the system turn plus the
    /// [`MAX_TURNS`] most recent turns.
    ///
    /// Recomputed from the current contents on every call rather than
    /// maintained incrementally.
    pub fn trim(&mut self) {
        if self.messages.len() > MAX_TURNS + 1 {
            let tail = self.messages.split_off(self.messages.len() - MAX_TURNS);
            self.messages.truncate(1);
            self.messages.extend(tail);
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

/// Process-wide map from channel to conversation buffer.
///
/// Constructed once at startup and shared through the bot state. Each
/// buffer sits behind its own async mutex so that concurrent asks on the
/// same channel serialize, while different channels proceed independently.
/// The outer map lock is only held for lookups, never across an await.
pub struct HistoryStore {
    system_prompt: String,
    channels: StdMutex<HashMap<ChannelId, Arc<Mutex<ConversationBuffer>>>>,
}

impl HistoryStore {
    #[must_use]
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            channels: StdMutex::new(HashMap::new()),
        }
    }

    /// Return the channel's buffer, creating one seeded with the system
    /// turn on first use.
    pub fn get_or_create(&self, channel_id: ChannelId) -> Arc<Mutex<ConversationBuffer>> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Arc::clone(channels.entry(channel_id).or_insert_with(|| {
            debug!("Creating conversation buffer for channel {channel_id}");
            Arc::new(Mutex::new(ConversationBuffer::new(&self.system_prompt)))
        }))
    }

    /// Drop the channel's history entirely. The next prompt reseeds a fresh
    /// buffer. Returns whether an entry existed.
    pub fn reset(&self, channel_id: ChannelId) -> bool {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        channels.remove(&channel_id).is_some()
    }

    #[must_use]
    pub fn contains(&self, channel_id: ChannelId) -> bool {
        let channels = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        channels.contains_key(&channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::MessageRole;

    const PROMPT: &str = "You are a test assistant.";

    fn channel(id: u64) -> ChannelId {
        ChannelId::new(id)
    }

    #[tokio::test]
    async fn new_buffer_is_seeded_with_system_turn() {
        let store = HistoryStore::new(PROMPT);
        let buffer = store.get_or_create(channel(1));
        let buffer = buffer.lock().await;

        assert_eq!(buffer.messages().len(), 1);
        assert_eq!(buffer.messages()[0].role, MessageRole::System);
        assert_eq!(buffer.messages()[0].content, PROMPT);
    }

    #[tokio::test]
    async fn get_or_create_returns_same_buffer() {
        let store = HistoryStore::new(PROMPT);

        {
            let buffer = store.get_or_create(channel(1));
            buffer.lock().await.push_user("first question");
        }

        let buffer = store.get_or_create(channel(1));
        let buffer = buffer.lock().await;
        assert_eq!(buffer.messages().len(), 2);
        assert_eq!(buffer.messages()[1].content, "first question");
    }

    #[tokio::test]
    async fn channels_have_independent_buffers() {
        let store = HistoryStore::new(PROMPT);

        store
            .get_or_create(channel(1))
            .lock()
            .await
            .push_user("only in channel one");

        let other = store.get_or_create(channel(2));
        assert_eq!(other.lock().await.messages().len(), 1);
    }

    #[test]
    fn trim_is_a_no_op_under_the_cap() {
        let mut buffer = ConversationBuffer::new(PROMPT);
        for i in 0..MAX_TURNS {
            buffer.push_user(format!("question {i}"));
        }

        buffer.trim();
        assert_eq!(buffer.messages().len(), MAX_TURNS + 1);
        assert_eq!(buffer.messages()[1].content, "question 0");
    }

    #[test]
    fn trim_keeps_system_turn_and_most_recent_turns() {
        let mut buffer = ConversationBuffer::new(PROMPT);
        for i in 0..8 {
            buffer.push_user(format!("question {i}"));
            buffer.push_assistant(format!("answer {i}"));
        }

        buffer.trim();

        let messages = buffer.messages();
        assert_eq!(messages.len(), MAX_TURNS + 1);
        assert_eq!(messages[0].role, MessageRole::System);
        // 16 turns total, so the oldest 6 are gone and "question 3" leads.
        assert_eq!(messages[1].content, "question 3");
        assert_eq!(messages[MAX_TURNS].content, "answer 7");
    }

    #[test]
    fn trim_recovers_from_arbitrarily_oversized_state() {
        let mut buffer = ConversationBuffer::new(PROMPT);
        for i in 0..50 {
            buffer.push_user(format!("question {i}"));
        }

        buffer.trim();

        let messages = buffer.messages();
        assert_eq!(messages.len(), MAX_TURNS + 1);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].content, "question 40");
        assert_eq!(messages[MAX_TURNS].content, "question 49");
    }

    #[test]
    fn trim_never_duplicates_the_system_turn() {
        let mut buffer = ConversationBuffer::new(PROMPT);
        for i in 0..30 {
            buffer.push_user(format!("question {i}"));
            buffer.trim();
        }

        let system_turns = buffer
            .messages()
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .count();
        assert_eq!(system_turns, 1);
    }

    #[test]
    fn reset_removes_the_entry() {
        let store = HistoryStore::new(PROMPT);
        store.get_or_create(channel(1));

        assert!(store.contains(channel(1)));
        assert!(store.reset(channel(1)));
        assert!(!store.contains(channel(1)));
    }

    #[test]
    fn reset_of_unknown_channel_is_a_no_op() {
        let store = HistoryStore::new(PROMPT);
        assert!(!store.reset(channel(42)));
    }
}
