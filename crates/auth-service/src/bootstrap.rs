//! Process composition root
//!
//! Initializes every dependency once at startup and wires the PostgreSQL
//! repositories into a `ServiceContext`. Nothing here is a module-level
//! singleton; the returned context is the only handle.

use std::sync::Arc;

use auth_common::{AppConfig, AppError, JwtService};
use auth_core::SnowflakeGenerator;
use auth_db::{
    create_pool, PgOtpRepository, PgPasswordResetRepository, PgRefreshTokenRepository,
    PgUserRepository,
};
use chrono::Duration;
use tracing::info;

use crate::services::{
    RetentionSweeper, ServiceContext, ServiceContextBuilder, TokenPolicy,
};

/// Derive the policy knobs from configuration
#[must_use]
pub fn policy_from_config(config: &AppConfig) -> TokenPolicy {
    TokenPolicy {
        refresh_ttl: Duration::seconds(config.session.refresh_token_expiry),
        otp_ttl: Duration::seconds(config.otp.ttl_seconds),
        reset_ttl: Duration::seconds(config.password_reset.ttl_seconds),
        retention: Duration::days(config.retention.keep_days),
    }
}

/// Initialize all dependencies and create the ServiceContext
///
/// Delivery and biometric-vault collaborators default to the no-op
/// implementations; the embedding process swaps in its real ones through
/// the builder when it has them.
pub async fn create_service_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    // Create database pool
    info!("Connecting to PostgreSQL...");
    let db_config = auth_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    // Create JWT service
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
    ));

    // Create Snowflake generator
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));

    // Create repositories
    let user_repo = Arc::new(PgUserRepository::new(pool.clone()));
    let refresh_token_repo = Arc::new(PgRefreshTokenRepository::new(pool.clone()));
    let otp_repo = Arc::new(PgOtpRepository::new(pool.clone()));
    let reset_repo = Arc::new(PgPasswordResetRepository::new(pool));

    // Build service context
    ServiceContextBuilder::new()
        .user_repo(user_repo)
        .refresh_token_repo(refresh_token_repo)
        .otp_repo(otp_repo)
        .reset_repo(reset_repo)
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator)
        .policy(policy_from_config(config))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))
}

/// Spawn the retention sweep loop for a composed context
pub fn spawn_retention_sweeper(
    ctx: ServiceContext,
    config: &AppConfig,
) -> tokio::task::JoinHandle<()> {
    let interval = std::time::Duration::from_secs(config.retention.sweep_interval_seconds);
    RetentionSweeper::new(ctx, interval).spawn()
}
