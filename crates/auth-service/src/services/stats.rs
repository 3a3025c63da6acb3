//! Session statistics aggregation
//!
//! Pure derive layer over usable token rows. Reads are snapshots; the
//! numbers are advisory reporting data, not a correctness gate.

use auth_core::{Platform, RefreshToken, SessionState};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::dto::SessionStatsResponse;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Aggregate usable tokens into the statistics read model
///
/// Unknown-platform sessions count toward total/active/inactive but are
/// excluded from the per-platform breakdown, so the platform sum may be
/// less than the total.
#[must_use]
pub fn aggregate(tokens: &[RefreshToken], now: DateTime<Utc>) -> SessionStatsResponse {
    let mut stats = SessionStatsResponse::default();

    for token in tokens {
        stats.total += 1;
        match token.classify(now) {
            SessionState::Active => stats.active += 1,
            SessionState::Inactive => stats.inactive += 1,
        }
        match token.platform {
            Platform::Web => stats.by_platform.web += 1,
            Platform::Ios => stats.by_platform.ios += 1,
            Platform::Android => stats.by_platform.android += 1,
            Platform::Unknown => {}
        }
    }

    stats
}

/// Repository-backed statistics reads for dashboards
pub struct SessionStatsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionStatsService<'a> {
    /// Create a new SessionStatsService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Current statistics over all usable sessions
    #[instrument(skip(self))]
    pub async fn current(&self) -> ServiceResult<SessionStatsResponse> {
        let now = self.ctx.now();
        let tokens = self.ctx.refresh_token_repo().list_usable(now).await?;
        Ok(aggregate(&tokens, now))
    }
}
