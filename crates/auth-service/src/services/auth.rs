//! Authentication facade
//!
//! Orchestrates login, token refresh, logout, logout-all, and access-token
//! validation over the session store and the credential collaborators.

use auth_common::AppError;
use auth_core::{Snowflake, User};
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, CurrentUserResponse, DeviceContext, LoginRequest, SessionResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::session::SessionService;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn sessions(&self) -> SessionService<'a> {
        SessionService::new(self.ctx)
    }

    async fn find_by_identifier(&self, request: &LoginRequest) -> ServiceResult<Option<User>> {
        if let Some(email) = &request.email {
            return Ok(self.ctx.user_repo().find_by_email(email).await?);
        }
        if let Some(mobile) = &request.mobile {
            return Ok(self.ctx.user_repo().find_by_mobile(mobile).await?);
        }
        Err(ServiceError::validation("email or mobile is required"))
    }

    fn mint_response(&self, user: &User, refresh_token: String) -> ServiceResult<AuthResponse> {
        let access_token = self
            .ctx
            .jwt_service()
            .issue_access_token(user.id, user.role, self.ctx.now())
            .map_err(ServiceError::from)?;

        Ok(AuthResponse::new(
            access_token,
            refresh_token,
            self.ctx.jwt_service().access_token_expiry(),
            CurrentUserResponse::from(user),
        ))
    }

    /// Login with email or mobile plus password
    ///
    /// Every failure on this path surfaces `InvalidCredentials`; the
    /// response never says which part was wrong.
    #[instrument(skip(self, request, device))]
    pub async fn login(
        &self,
        request: LoginRequest,
        device: DeviceContext,
    ) -> ServiceResult<AuthResponse> {
        let user = self.find_by_identifier(&request).await?.ok_or_else(|| {
            warn!("Login failed: no account for identifier");
            ServiceError::App(AppError::InvalidCredentials)
        })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .filter(|hash| !hash.is_empty())
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: signup not completed");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        self.ctx
            .passwords()
            .verify_or_error(&request.password, &password_hash)
            .map_err(|e| {
                warn!(user_id = %user.id, "Login failed: invalid password");
                ServiceError::App(e)
            })?;

        let session = self.sessions().issue(user.id, &device).await?;

        info!(user_id = %user.id, platform = %session.platform, "User logged in");
        self.mint_response(&user, session.token)
    }

    /// Exchange a refresh token for a fresh token pair
    ///
    /// The old refresh token is revoked by the rotation; a concurrent
    /// duplicate refresh with the same value fails with `TokenRevoked`.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<AuthResponse> {
        let replacement = self.sessions().rotate(refresh_token).await?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(replacement.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", replacement.user_id.to_string()))?;

        info!(user_id = %user.id, "Tokens refreshed");
        self.mint_response(&user, replacement.token)
    }

    /// Logout one session by revoking its refresh token; idempotent
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: &str) -> ServiceResult<()> {
        self.sessions().revoke(refresh_token).await?;
        info!("Session logged out");
        Ok(())
    }

    /// Logout every device of a user and clear the biometric vault
    #[instrument(skip(self))]
    pub async fn logout_all(&self, user_id: Snowflake) -> ServiceResult<u64> {
        let revoked = self.sessions().revoke_all(user_id).await?;

        // The revocations are durable; a vault failure must not undo them
        if let Err(e) = self
            .ctx
            .biometric_vault()
            .clear_biometric_token(user_id)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Biometric vault clear failed");
        }

        info!(user_id = %user_id, revoked, "User logged out everywhere");
        Ok(revoked)
    }

    /// Stamp activity for a session (heartbeat or authenticated request)
    #[instrument(skip(self, refresh_token))]
    pub async fn heartbeat(&self, refresh_token: &str) -> ServiceResult<bool> {
        self.sessions().touch_activity(refresh_token).await
    }

    /// Validate an access token and return the user ID
    #[instrument(skip(self, token))]
    pub async fn validate_token(&self, token: &str) -> ServiceResult<Snowflake> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_access_token(token)
            .map_err(ServiceError::from)?;

        claims.user_id().map_err(ServiceError::from)
    }

    /// List a user's sessions for the device-management screen
    #[instrument(skip(self))]
    pub async fn list_sessions(&self, user_id: Snowflake) -> ServiceResult<Vec<SessionResponse>> {
        let now = self.ctx.now();
        let tokens = self.sessions().list_for_user(user_id).await?;

        Ok(tokens
            .iter()
            .filter(|t| t.is_usable(now))
            .map(|t| SessionResponse::from_token(t, now))
            .collect())
    }
}
