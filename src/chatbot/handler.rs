//! Mention handling: classify inbound messages and route them.

use log::{debug, info};
use poise::serenity_prelude::{Context, CreateMessage, Message as SerenityMessage, UserId};

use crate::bot::Data;
use crate::error::Result;

use super::response::send_reply;

const HELP_MESSAGE: &str = "👋 Hello! I'm DeepHat, your ethical hacking assistant. \
Ask me about:\n\
• Security vulnerabilities\n\
• Code review\n\
• Penetration testing\n\
• Secure coding practices\n\
• Threat analysis\n\n\
**Example:** `@DeepHat analyze this SQL query for vulnerabilities`";

const RESET_CONFIRMATION: &str = "🔄 Conversation history cleared. Starting fresh!";

const RESET_COMMANDS: [&str; 3] = ["clear", "reset", "new conversation"];

/// What to do with an inbound message.
#[derive(Debug, PartialEq, Eq)]
enum MentionAction {
    /// Not addressed to the bot (or authored by it).
    Ignore,
    /// Mention with no prompt text.
    Help,
    /// Mention carrying a reset command.
    Reset,
    /// Mention carrying a prompt.
    Ask(String),
}

fn strip_mention(content: &str, bot_user_id: UserId) -> String {
    content
        .replace(&format!("<@{bot_user_id}>"), "")
        .replace(&format!("<@!{bot_user_id}>"), "")
        .trim()
        .to_string()
}

fn is_reset_command(prompt: &str) -> bool {
    RESET_COMMANDS
        .iter()
        .any(|command| prompt.eq_ignore_ascii_case(command))
}

fn classify_message(
    author_is_bot: bool,
    mentions_bot: bool,
    content: &str,
    bot_user_id: UserId,
) -> MentionAction {
    if author_is_bot || !mentions_bot {
        return MentionAction::Ignore;
    }

    let prompt = strip_mention(content, bot_user_id);
    if prompt.is_empty() {
        return MentionAction::Help;
    }
    if is_reset_command(&prompt) {
        return MentionAction::Reset;
    }

    MentionAction::Ask(prompt)
}

/// Handle one gateway message event.
pub async fn handle_message(
    ctx: &Context,
    new_message: &SerenityMessage,
    data: &Data,
) -> Result<()> {
    let bot_user_id = ctx.cache.current_user().id;
    let action = classify_message(
        new_message.author.id == bot_user_id,
        new_message.mentions_user_id(bot_user_id),
        &new_message.content,
        bot_user_id,
    );

    match action {
        MentionAction::Ignore => {}
        MentionAction::Help => {
            new_message
                .channel_id
                .send_message(&ctx.http, CreateMessage::new().content(HELP_MESSAGE))
                .await?;
            info!(
                "Sent help message to {} in channel {}",
                new_message.author.tag(),
                new_message.channel_id
            );
        }
        MentionAction::Reset => {
            data.manager().reset(new_message.channel_id);
            new_message
                .channel_id
                .send_message(&ctx.http, CreateMessage::new().content(RESET_CONFIRMATION))
                .await?;
            info!(
                "Cleared conversation history for channel {}",
                new_message.channel_id
            );
        }
        MentionAction::Ask(prompt) => {
            info!(
                "Received prompt from {} in channel {}: {prompt}",
                new_message.author.tag(),
                new_message.channel_id
            );

            if let Err(e) = new_message.channel_id.broadcast_typing(&ctx.http).await {
                debug!("Failed to broadcast typing indicator: {e}");
            }

            let reply = data.manager().ask(new_message.channel_id, &prompt).await;
            send_reply(ctx, new_message.channel_id, &reply).await?;

            info!(
                "Replied to {} in channel {}",
                new_message.author.tag(),
                new_message.channel_id
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_ID: u64 = 42;

    fn classify(author_is_bot: bool, mentions_bot: bool, content: &str) -> MentionAction {
        classify_message(author_is_bot, mentions_bot, content, UserId::new(BOT_ID))
    }

    #[test]
    fn own_messages_are_ignored() {
        let action = classify(true, true, "<@42> hello");
        assert_eq!(action, MentionAction::Ignore);
    }

    #[test]
    fn messages_without_a_mention_are_ignored() {
        let action = classify(false, false, "just chatting");
        assert_eq!(action, MentionAction::Ignore);
    }

    #[test]
    fn bare_mention_asks_for_help() {
        let action = classify(false, true, "<@42>   ");
        assert_eq!(action, MentionAction::Help);
    }

    #[test]
    fn nickname_mention_form_is_stripped_too() {
        let action = classify(false, true, "<@!42>");
        assert_eq!(action, MentionAction::Help);
    }

    #[test]
    fn reset_commands_match_case_insensitively() {
        for content in ["<@42> reset", "<@42> RESET", "<@42>  Clear ", "<@42> New Conversation"] {
            assert_eq!(classify(false, true, content), MentionAction::Reset);
        }
    }

    #[test]
    fn reset_must_match_the_whole_prompt() {
        let action = classify(false, true, "<@42> reset the router");
        assert_eq!(action, MentionAction::Ask("reset the router".to_string()));
    }

    #[test]
    fn prompt_text_survives_with_mention_removed() {
        let action = classify(false, true, "<@42> what is a buffer overflow?");
        assert_eq!(
            action,
            MentionAction::Ask("what is a buffer overflow?".to_string())
        );
    }

    #[test]
    fn mention_in_the_middle_is_stripped() {
        let action = classify(false, true, "hey <@42> explain CSRF");
        assert_eq!(action, MentionAction::Ask("hey  explain CSRF".to_string()));
    }
}
