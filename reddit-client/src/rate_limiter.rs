use tokio::time::{sleep, Duration, Instant};

/// Spaces outbound requests at least `min_interval` apart.
///
/// The interval is measured from the moment the previous request finished
/// sending, so a slow server naturally stretches the gap. The gate is owned by
/// a single dispatcher and mutated through `&mut self`; it is not meant to be
/// shared between tasks.
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    last_dispatch: Option<Instant>,
}

impl RequestGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: None,
        }
    }

    /// Reddit asks API clients to keep below 30 requests per minute.
    pub fn reddit() -> Self {
        Self::new(Duration::from_secs(2))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// How long a request issued right now would have to wait.
    pub fn wait_time(&self) -> Duration {
        match self.last_dispatch {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Sleeps until the next request may be sent. Returns the time spent waiting.
    pub async fn wait(&self) -> Duration {
        let wait_time = self.wait_time();
        if !wait_time.is_zero() {
            tracing::debug!("Rate limit reached, waiting {:?}", wait_time);
            sleep(wait_time).await;
        }
        wait_time
    }

    pub fn mark_dispatched(&mut self) {
        self.last_dispatch = Some(Instant::now());
    }
}
