//! Service context - dependency container for services
//!
//! The process's composition root: every repository, collaborator, and
//! policy value is constructed once at startup and injected here. No
//! service reaches for a module-level singleton.

use std::sync::Arc;

use auth_common::{Clock, JwtService, PasswordService, SecretHasher, SystemClock};
use auth_core::traits::{
    BiometricTokenVault, OtpRepository, OtpSender, PasswordResetRepository,
    RefreshTokenRepository, UserRepository,
};
use auth_core::{Snowflake, SnowflakeGenerator};
use chrono::{DateTime, Duration, Utc};

/// Validity windows and policy knobs shared by the services
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    /// Refresh token lifetime
    pub refresh_ttl: Duration,
    /// OTP code lifetime
    pub otp_ttl: Duration,
    /// Password-reset token lifetime
    pub reset_ttl: Duration,
    /// Rows expired/consumed longer than this ago are swept
    pub retention: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            refresh_ttl: Duration::days(30),
            otp_ttl: Duration::minutes(10),
            reset_ttl: Duration::minutes(60),
            retention: Duration::days(7),
        }
    }
}

/// Service context containing all dependencies
///
/// This is the dependency container passed to every service. It provides:
/// - Repositories for users, refresh tokens, OTPs, and reset tokens
/// - Collaborators for out-of-band delivery and the device biometric vault
/// - JWT signing, password hashing, secret hashing
/// - The clock and the Snowflake generator
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    refresh_token_repo: Arc<dyn RefreshTokenRepository>,
    otp_repo: Arc<dyn OtpRepository>,
    reset_repo: Arc<dyn PasswordResetRepository>,

    // Collaborators
    otp_sender: Arc<dyn OtpSender>,
    biometric_vault: Arc<dyn BiometricTokenVault>,

    // Services
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,
    secret_hasher: SecretHasher,
    clock: Arc<dyn Clock>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    // Policy
    policy: TokenPolicy,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the refresh token repository
    pub fn refresh_token_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_token_repo.as_ref()
    }

    /// Get the OTP repository
    pub fn otp_repo(&self) -> &dyn OtpRepository {
        self.otp_repo.as_ref()
    }

    /// Get the password reset repository
    pub fn reset_repo(&self) -> &dyn PasswordResetRepository {
        self.reset_repo.as_ref()
    }

    // === Collaborators ===

    /// Get the out-of-band delivery collaborator
    pub fn otp_sender(&self) -> &dyn OtpSender {
        self.otp_sender.as_ref()
    }

    /// Get the device-side biometric vault collaborator
    pub fn biometric_vault(&self) -> &dyn BiometricTokenVault {
        self.biometric_vault.as_ref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the password service
    pub fn passwords(&self) -> &PasswordService {
        &self.password_service
    }

    /// Get the secret hasher for OTP codes and reset tokens
    pub fn hasher(&self) -> &SecretHasher {
        &self.secret_hasher
    }

    /// Get the policy knobs
    pub fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    /// Current instant from the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    refresh_token_repo: Option<Arc<dyn RefreshTokenRepository>>,
    otp_repo: Option<Arc<dyn OtpRepository>>,
    reset_repo: Option<Arc<dyn PasswordResetRepository>>,
    otp_sender: Option<Arc<dyn OtpSender>>,
    biometric_vault: Option<Arc<dyn BiometricTokenVault>>,
    jwt_service: Option<Arc<JwtService>>,
    password_service: PasswordService,
    secret_hasher: SecretHasher,
    clock: Option<Arc<dyn Clock>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    policy: TokenPolicy,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            user_repo: None,
            refresh_token_repo: None,
            otp_repo: None,
            reset_repo: None,
            otp_sender: None,
            biometric_vault: None,
            jwt_service: None,
            password_service: PasswordService::new(),
            secret_hasher: SecretHasher::new(),
            clock: None,
            snowflake_generator: None,
            policy: TokenPolicy::default(),
        }
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn refresh_token_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_token_repo = Some(repo);
        self
    }

    pub fn otp_repo(mut self, repo: Arc<dyn OtpRepository>) -> Self {
        self.otp_repo = Some(repo);
        self
    }

    pub fn reset_repo(mut self, repo: Arc<dyn PasswordResetRepository>) -> Self {
        self.reset_repo = Some(repo);
        self
    }

    pub fn otp_sender(mut self, sender: Arc<dyn OtpSender>) -> Self {
        self.otp_sender = Some(sender);
        self
    }

    pub fn biometric_vault(mut self, vault: Arc<dyn BiometricTokenVault>) -> Self {
        self.biometric_vault = Some(vault);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the ServiceContext
    ///
    /// Clock defaults to the system clock, the Snowflake generator to worker
    /// 0, and collaborators to the no-op implementations.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a required dependency is missing
    pub fn build(self) -> super::error::ServiceResult<ServiceContext> {
        use super::error::ServiceError;

        Ok(ServiceContext {
            user_repo: self
                .user_repo
                .ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            refresh_token_repo: self
                .refresh_token_repo
                .ok_or_else(|| ServiceError::validation("refresh_token_repo is required"))?,
            otp_repo: self
                .otp_repo
                .ok_or_else(|| ServiceError::validation("otp_repo is required"))?,
            reset_repo: self
                .reset_repo
                .ok_or_else(|| ServiceError::validation("reset_repo is required"))?,
            otp_sender: self
                .otp_sender
                .unwrap_or_else(|| Arc::new(auth_core::NoopOtpSender)),
            biometric_vault: self
                .biometric_vault
                .unwrap_or_else(|| Arc::new(auth_core::NoopBiometricVault)),
            jwt_service: self
                .jwt_service
                .ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            password_service: self.password_service,
            secret_hasher: self.secret_hasher,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            policy: self.policy,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
