//! Simulated latency applied before upload and summary requests leave the client.
//!
//! The web client this crate replaces waited a fixed three seconds before every
//! upload and summary request. That delay is kept as an explicit policy so it can
//! be tuned or switched off (`LatencyPolicy::none()`) instead of hiding in a timer.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::config::DEFAULT_SIMULATED_LATENCY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyPolicy {
    delay: Duration,
}

impl LatencyPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay, then run `request`
    pub async fn dispatch<F, T>(&self, label: &str, request: F) -> T
    where
        F: Future<Output = T>,
    {
        if !self.delay.is_zero() {
            debug!("Delaying {} by {:?}", label, self.delay);
            tokio::time::sleep(self.delay).await;
        }
        request.await
    }
}

impl Default for LatencyPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_SIMULATED_LATENCY)
    }
}
