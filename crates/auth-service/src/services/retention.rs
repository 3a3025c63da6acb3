//! Retention sweep
//!
//! Expired and consumed rows stay in their tables for a retention window
//! (verification failures classify against them), then are hard-deleted by
//! a periodic sweep.

use std::time::Duration as StdDuration;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Counts of rows removed by one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub refresh_tokens: u64,
    pub otps: u64,
    pub reset_tokens: u64,
}

impl SweepReport {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.refresh_tokens + self.otps + self.reset_tokens
    }
}

/// Periodic hard-deletion of dead credential rows
pub struct RetentionSweeper {
    ctx: ServiceContext,
    interval: StdDuration,
}

impl RetentionSweeper {
    /// Create a sweeper with the given pass interval
    pub fn new(ctx: ServiceContext, interval: StdDuration) -> Self {
        Self { ctx, interval }
    }

    /// Run one sweep pass
    ///
    /// The cutoff is now minus the retention window: rows whose expiry,
    /// revocation, or consumption is older than that are removed.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> ServiceResult<SweepReport> {
        let cutoff = self.ctx.now() - self.ctx.policy().retention;

        let report = SweepReport {
            refresh_tokens: self.ctx.refresh_token_repo().delete_stale(cutoff).await?,
            otps: self.ctx.otp_repo().delete_stale(cutoff).await?,
            reset_tokens: self.ctx.reset_repo().delete_stale(cutoff).await?,
        };

        info!(
            refresh_tokens = report.refresh_tokens,
            otps = report.otps,
            reset_tokens = report.reset_tokens,
            "Retention sweep completed"
        );

        Ok(report)
    }

    /// Spawn the sweep loop on the runtime
    ///
    /// The first tick fires after one full interval, not at startup.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; consume the first tick
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    error!(error = %e, "Retention sweep failed");
                }
            }
        })
    }
}
