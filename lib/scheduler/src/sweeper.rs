//! Periodic deletion of expired sessions.
//!
//! Expired sessions are also evicted lazily when presented, so the sweeper
//! only bounds how long an abandoned session row lingers. A failed sweep is
//! logged and retried on the next tick.

use crate::error::SweepError;
use nexus_core::Clock;
use nexus_platform_access::SessionStore;
use rootcause::Report;
use rootcause::prelude::ResultExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Background task deleting expired sessions on a fixed interval.
pub struct SessionSweeper {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    period: Duration,
    shutdown: CancellationToken,
}

impl SessionSweeper {
    /// Creates a sweeper that runs every `period` until `shutdown` is
    /// cancelled.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            clock,
            period,
            shutdown,
        }
    }

    /// Runs until cancelled. The first sweep happens immediately.
    pub async fn run(self) {
        info!(period_secs = self.period.as_secs(), "Session sweeper started");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    info!("Session sweeper stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!(error = %e, "Failed to remove expired sessions");
                    }
                }
            }
        }
    }

    /// Deletes every session expired as of now. Returns the count removed.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailed` if the session store could not be written.
    pub async fn sweep(&self) -> Result<u64, Report<SweepError>> {
        let removed = self
            .store
            .delete_expired(self.clock.now())
            .await
            .context(SweepError::StoreFailed)?;
        if removed > 0 {
            info!(removed, "{removed} expired sessions removed");
        } else {
            debug!("No expired sessions found");
        }
        Ok(removed)
    }
}
