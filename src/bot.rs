//! Discord bot core logic and event handling.

use std::error::Error as StdError;

use log::{debug, info};
use poise::{
    Framework, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};

use crate::chatbot::{self, ConversationManager};
use crate::config::{Config, SYSTEM_PROMPT};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::huggingface::HuggingFaceClient;

type EventResult = std::result::Result<(), Box<dyn StdError + Send + Sync>>;

/// Shared bot state, constructed once during framework setup.
pub struct Data {
    manager: ConversationManager<HuggingFaceClient>,
}

impl Data {
    pub(crate) fn manager(&self) -> &ConversationManager<HuggingFaceClient> {
        &self.manager
    }
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    debug!("Initializing completion client");
    let completion_client = HuggingFaceClient::new(config.hf_token.clone(), config.model.clone());
    let manager = ConversationManager::new(HistoryStore::new(SYSTEM_PROMPT), completion_client);

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready and connected to Discord");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data { manager })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

async fn event_handler(ctx: &Context, event: &FullEvent, data: &Data) -> EventResult {
    if let FullEvent::Message { new_message } = event {
        chatbot::handle_message(ctx, new_message, data).await?;
    }
    Ok(())
}
