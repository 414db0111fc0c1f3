use super::{ChatConfig, ChatConnection, ChatError, ChatResult, ReplyThrottle};
use crate::processor::{CommandProcessor, Outcome};
use crate::publish::Publisher;
use crate::state::export::SessionExport;
use crate::types::ChatEvent;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const BOUNDARY_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Owns the voting session and drives it from chat.
///
/// Every event is fully processed, rendered, published and saved before the
/// next line is read, so the session never needs a lock.
pub struct Bot {
    chat: ChatConfig,
    processor: CommandProcessor,
    publisher: Publisher,
    session_file: PathBuf,
    cooldown: Duration,
    reconnect_delay: Duration,
    boundary_check: Duration,
}

impl Bot {
    pub fn new(
        chat: ChatConfig,
        processor: CommandProcessor,
        publisher: Publisher,
        session_file: impl Into<PathBuf>,
        cooldown: Duration,
    ) -> Self {
        Self {
            chat,
            processor,
            publisher,
            session_file: session_file.into(),
            cooldown,
            reconnect_delay: RECONNECT_DELAY,
            boundary_check: BOUNDARY_CHECK_INTERVAL,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn processor(&self) -> &CommandProcessor {
        &self.processor
    }

    /// Catch up on a missed week boundary and publish the current tally
    pub async fn startup(&mut self) {
        if !self.check_week_boundary(Utc::now()).await {
            self.persist(&Outcome {
                changed: true,
                ..Outcome::default()
            })
            .await;
        }
    }

    /// Connect and serve chat until the login is rejected.
    ///
    /// Lost connections are retried after a fixed delay.
    pub async fn run(mut self) -> ChatResult<()> {
        self.startup().await;

        loop {
            let throttle = ReplyThrottle::new(self.cooldown);
            match ChatConnection::connect(&self.chat, throttle).await {
                Ok(mut conn) => match self.serve(&mut conn).await {
                    Err(ChatError::Auth(reason)) => {
                        tracing::error!(reason = %reason, "Chat login rejected");
                        return Err(ChatError::Auth(reason));
                    }
                    Err(e) => tracing::warn!("Chat connection lost: {}", e),
                    Ok(()) => tracing::warn!("Chat connection ended"),
                },
                Err(e) => tracing::warn!("Failed to connect to chat: {}", e),
            }

            tracing::info!(delay = ?self.reconnect_delay, "Reconnecting to chat");
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn serve(&mut self, conn: &mut ChatConnection) -> ChatResult<()> {
        let mut boundary = tokio::time::interval(self.boundary_check);
        boundary.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                line = conn.read_line() => {
                    let line = line?;
                    let Some(event) = conn.handle_line(&line).await? else {
                        continue;
                    };
                    let outcome = self.handle_event(&event).await;
                    if let Some(reply) = outcome.reply {
                        conn.send_message(&reply).await?;
                    }
                }
                _ = boundary.tick() => {
                    self.check_week_boundary(Utc::now()).await;
                }
            }
        }
    }

    /// Process one chat event and persist whatever it changed
    pub async fn handle_event(&mut self, event: &ChatEvent) -> Outcome {
        let outcome = self.processor.handle_event(event).await;
        self.persist(&outcome).await;
        outcome
    }

    /// Run the weekly transition if `now` is in a later week.
    ///
    /// Returns whether it ran.
    pub async fn check_week_boundary(&mut self, now: DateTime<Utc>) -> bool {
        if !self.processor.week_rolled_over(now) {
            return false;
        }
        let outcome = self.processor.on_week_boundary(now).await;
        self.persist(&outcome).await;
        outcome.changed
    }

    async fn persist(&mut self, outcome: &Outcome) {
        if outcome.changed {
            let snapshot = self.processor.snapshot();
            if let Err(e) = self.publisher.publish_tally(&snapshot).await {
                tracing::error!("Failed to publish tally: {}", e);
            }

            let export = SessionExport::new(self.processor.session());
            if let Err(e) = export.save(&self.session_file).await {
                tracing::error!(
                    path = %self.session_file.display(),
                    "Failed to save session: {}",
                    e
                );
            }
        }

        if outcome.archives_changed {
            if let Err(e) = self.publisher.publish_archives().await {
                tracing::error!("Failed to publish archives: {}", e);
            }
        }
    }
}
