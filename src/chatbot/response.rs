//! Reply sending and chunking for Discord.

use log::debug;
use poise::serenity_prelude::{ChannelId, Context, CreateMessage};

use crate::error::Result;

/// Discord rejects messages longer than this (standard users).
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Chunk size used when a reply has to be split, leaving headroom under the
/// hard limit.
pub const CHUNK_SIZE: usize = 1900;

/// Split a reply into chunks of at most [`CHUNK_SIZE`] characters,
/// preserving order.
#[must_use]
pub fn split_reply(reply: &str) -> Vec<String> {
    reply
        .chars()
        .collect::<Vec<_>>()
        .chunks(CHUNK_SIZE)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Send a reply to the channel, splitting it if it exceeds the Discord
/// message limit.
pub async fn send_reply(ctx: &Context, channel_id: ChannelId, reply: &str) -> Result<()> {
    if reply.chars().count() <= DISCORD_MESSAGE_LIMIT {
        channel_id
            .send_message(&ctx.http, CreateMessage::new().content(reply))
            .await?;
        return Ok(());
    }

    let chunks = split_reply(reply);
    debug!(
        "Reply exceeds {DISCORD_MESSAGE_LIMIT} characters, sending {} chunks",
        chunks.len()
    );

    for chunk in chunks {
        channel_id
            .send_message(&ctx.http, CreateMessage::new().content(chunk))
            .await?;
    }

    Ok(())
}
