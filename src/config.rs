use std::env;

use log::{debug, error, info};

use crate::error::Result;

/// Default model served through the HuggingFace inference router.
pub const DEFAULT_MODEL: &str = "DeepHat/DeepHat-V1-7B:featherless-ai";

/// Persona instructions sent as the first turn of every conversation.
pub const SYSTEM_PROMPT: &str = "You are DeepHat, an ethical hacking and cybersecurity assistant. Your purpose is to help users learn about:
- Vulnerability analysis and identification
- Secure coding practices
- Penetration testing concepts
- Red/blue team strategies
- Threat modeling
- Security best practices

Always emphasize ethical and legal use of security knowledge. Provide educational content only.";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub hf_token: String,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let hf_token = env::var("HF_TOKEN").map_err(|e| {
            error!("Failed to load HF_TOKEN from environment: {e}");
            e
        })?;

        let model = env::var("HF_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("HuggingFace token length: {} characters", hf_token.len());
        debug!("Model: {model}");

        Ok(Self {
            discord_token,
            hf_token,
            model,
        })
    }
}
