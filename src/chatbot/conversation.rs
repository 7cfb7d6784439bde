//! Conversation management: history-backed asks against the completion
//! backend.

use log::{debug, error};
use poise::serenity_prelude::ChannelId;

use crate::history::HistoryStore;
use crate::huggingface::ChatCompletion;

/// Reply substituted when the completion call fails.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again later.";

/// Ties the [`HistoryStore`] to a [`ChatCompletion`] backend.
pub struct ConversationManager<C> {
    history: HistoryStore,
    client: C,
}

impl<C: ChatCompletion> ConversationManager<C> {
    #[must_use]
    pub fn new(history: HistoryStore, client: C) -> Self {
        Self { history, client }
    }

    /// Answer a prompt with the channel's rolling context.
    ///
    /// The channel buffer stays locked across the completion call, so asks
    /// on the same channel serialize while other channels proceed.
    ///
    /// A failed completion is logged and replaced with [`FALLBACK_REPLY`];
    /// the user turn stays in history with no assistant turn after it, so a
    /// retried prompt still sees what was asked.
    pub async fn ask(&self, channel_id: ChannelId, prompt: &str) -> String {
        let buffer = self.history.get_or_create(channel_id);
        let mut buffer = buffer.lock().await;

        buffer.push_user(prompt);
        buffer.trim();

        debug!(
            "Requesting completion for channel {channel_id} with {} messages",
            buffer.messages().len()
        );

        match self.client.complete(buffer.messages()).await {
            Ok(reply) => {
                buffer.push_assistant(&reply);
                buffer.trim();
                reply
            }
            Err(e) => {
                error!("Completion failed for channel {channel_id}: {e}");
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Forget the channel's history. Returns whether there was any.
    pub fn reset(&self, channel_id: ChannelId) -> bool {
        self.history.reset(channel_id)
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }
}
