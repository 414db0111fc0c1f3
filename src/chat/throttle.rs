use tokio::time::{Duration, Instant};

/// Default spacing between two outgoing chat messages
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(300);

/// Enforces a minimum interval between outgoing messages.
///
/// Callers wait for their slot instead of having messages dropped.
#[derive(Debug, Clone)]
pub struct ReplyThrottle {
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl Default for ReplyThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl ReplyThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: None,
        }
    }

    /// How long a message sent at `now` would have to wait
    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_sent {
            Some(last) => (last + self.min_interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the next message may go out, then claim the slot
    pub async fn wait(&mut self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            tracing::trace!(?delay, "Throttling chat reply");
            tokio::time::sleep(delay).await;
        }
        self.last_sent = Some(Instant::now());
    }
}
