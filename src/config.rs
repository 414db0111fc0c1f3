//! Bot configuration loaded from the environment

use crate::chat::{ChatConfig, DEFAULT_COOLDOWN};
use crate::clock::DEFAULT_TIMEZONE;
use chrono_tz::Tz;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Unknown time zone '{0}'")]
    InvalidTimezone(String),
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub chat: ChatConfig,
    /// Chat user allowed to run admin commands
    pub admin: String,
    /// Where votes.json, index.html and archives/ are written
    pub output_dir: PathBuf,
    /// Saved session state (ledger, quotas, week)
    pub session_file: PathBuf,
    /// Link shown on the rendered pages
    pub stream_url: Option<String>,
    /// Reference zone for days and voting weeks
    pub timezone: Tz,
    /// Minimum spacing between chat replies
    pub cooldown: Duration,
    /// Commit and push the output directory after changes
    pub publish_git: bool,
    /// Serve the output directory over HTTP on this address
    pub http_addr: Option<SocketAddr>,
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    env_string(name).ok_or(ConfigError::Missing(name))
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = require("BOT_USERNAME")?;
        let oauth_token = require("OAUTH_TOKEN")?;
        let channel = require("CHANNEL_NAME")?;
        let admin = env_string("ADMIN_USERNAME").unwrap_or_else(|| username.clone());

        let chat = ChatConfig {
            host: env_string("IRC_HOST").unwrap_or_else(|| "irc.chat.twitch.tv".to_string()),
            port: env_string("IRC_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(6667),
            username,
            oauth_token,
            channel,
        };

        let timezone = match env_string("VOTE_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name))?,
            None => DEFAULT_TIMEZONE,
        };

        let output_dir = PathBuf::from(env_string("OUTPUT_DIR").unwrap_or_else(|| "site".to_string()));
        let session_file = env_string("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("session.json"));

        let cooldown = env_string("MESSAGE_COOLDOWN_MS")
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_COOLDOWN);

        let publish_git = env_string("PUBLISH_GIT")
            .map(|v| v != "0" && v.to_lowercase() != "false")
            .unwrap_or(false);

        let http_addr = env_string("HTTP_ADDR").and_then(|addr| match addr.parse() {
            Ok(addr) => Some(addr),
            Err(e) => {
                tracing::warn!(addr = %addr, "Ignoring invalid HTTP_ADDR: {}", e);
                None
            }
        });

        let config = Self {
            chat,
            admin,
            output_dir,
            session_file,
            stream_url: env_string("STREAM_URL"),
            timezone,
            cooldown,
            publish_git,
            http_addr,
        };

        tracing::info!(
            channel = %config.chat.channel,
            admin = %config.admin,
            timezone = %config.timezone,
            output_dir = %config.output_dir.display(),
            publish_git = config.publish_git,
            "Bot config loaded"
        );
        Ok(config)
    }
}
