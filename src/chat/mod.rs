//! Twitch chat transport and the bot event loop

mod bot;
pub mod irc;
mod throttle;

pub use bot::Bot;
pub use throttle::{ReplyThrottle, DEFAULT_COOLDOWN};

use crate::types::ChatEvent;
use irc::IrcLine;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Result type for chat transport operations
pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chat connection closed")]
    Closed,

    #[error("Chat login rejected: {0}")]
    Auth(String),
}

/// Where and as whom to connect
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub oauth_token: String,
    /// Channel name without the leading `#`
    pub channel: String,
}

impl ChatConfig {
    pub fn channel_tag(&self) -> String {
        format!("#{}", self.channel.trim_start_matches('#').to_lowercase())
    }

    fn pass(&self) -> String {
        if self.oauth_token.starts_with("oauth:") {
            self.oauth_token.clone()
        } else {
            format!("oauth:{}", self.oauth_token)
        }
    }
}

/// One logged-in chat connection joined to a single channel
pub struct ChatConnection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    channel: String,
    throttle: ReplyThrottle,
}

impl ChatConnection {
    /// Connect, log in and join the configured channel
    pub async fn connect(config: &ChatConfig, throttle: ReplyThrottle) -> ChatResult<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
        let (read, write) = stream.into_split();

        let mut conn = Self {
            lines: BufReader::new(read).lines(),
            writer: write,
            channel: config.channel_tag(),
            throttle,
        };

        conn.send_raw(&format!("PASS {}", config.pass())).await?;
        conn.send_raw(&format!("NICK {}", config.username.to_lowercase()))
            .await?;
        let join = format!("JOIN {}", conn.channel);
        conn.send_raw(&join).await?;

        tracing::info!(host = %config.host, channel = %conn.channel, "Connected to chat");
        Ok(conn)
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    async fn send_raw(&mut self, line: &str) -> ChatResult<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Post a message to the channel, waiting for the throttle first
    pub async fn send_message(&mut self, text: &str) -> ChatResult<()> {
        self.throttle.wait().await;
        let line = irc::privmsg(&self.channel, text);
        self.send_raw(&line).await
    }

    /// Next raw line from the server. Cancel safe.
    pub async fn read_line(&mut self) -> ChatResult<String> {
        self.lines.next_line().await?.ok_or(ChatError::Closed)
    }

    /// Answer protocol traffic and turn channel messages into events
    pub async fn handle_line(&mut self, line: &str) -> ChatResult<Option<ChatEvent>> {
        match IrcLine::parse(line) {
            IrcLine::Ping(token) => {
                self.send_raw(&irc::pong(&token)).await?;
                Ok(None)
            }
            IrcLine::Privmsg {
                user,
                channel,
                text,
            } if channel.eq_ignore_ascii_case(&self.channel) => {
                Ok(Some(ChatEvent::new(user, text, chrono::Utc::now())))
            }
            IrcLine::Notice(text) if text.contains("authentication failed") => {
                Err(ChatError::Auth(text))
            }
            IrcLine::Notice(text) => {
                tracing::info!(notice = %text, "Chat notice");
                Ok(None)
            }
            IrcLine::Reconnect => Err(ChatError::Closed),
            _ => Ok(None),
        }
    }

    /// Wait for the next channel message
    pub async fn next_event(&mut self) -> ChatResult<ChatEvent> {
        loop {
            let line = self.read_line().await?;
            if let Some(event) = self.handle_line(&line).await? {
                return Ok(event);
            }
        }
    }
}
