/// Authentication orchestrator
///
/// Composes the lockout policy, OTP lifecycle, and referral generation
/// around the signup, login, verification, and password-reset workflows.
use crate::{
    account::{
        lockout::{self, DenyReason},
        referral, LoginRequest, LoginResponse, ResetPasswordRequest, ResetTokenResponse,
        SendOtpRequest, SignupRequest, UserView, VerifyOtpRequest,
    },
    auth::TokenIssuer,
    config::AppConfig,
    crypto::CryptoService,
    db::{
        login_events::LoginEventStore,
        models::{NewUser, User},
        otp::OtpStore,
        users::UserStore,
    },
    error::{AuthError, AuthResult},
    metrics,
    notify::OtpSender,
    otp::{Channel, OtpManager, OtpPurpose, VerifyOutcome},
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Network origin of a login attempt, kept for the audit trail
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub ip_address: String,
    pub user_agent: String,
}

/// Account workflow orchestrator
pub struct AccountManager {
    users: UserStore,
    login_events: LoginEventStore,
    otp: OtpManager,
    crypto: CryptoService,
    tokens: TokenIssuer,
    access_token_ttl: Duration,
    reset_token_ttl: Duration,
}

impl AccountManager {
    /// Create a new account manager wired to the given senders
    pub fn new(
        config: &AppConfig,
        db: SqlitePool,
        email_sender: Arc<dyn OtpSender>,
        sms_sender: Arc<dyn OtpSender>,
    ) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            login_events: LoginEventStore::new(db.clone()),
            otp: OtpManager::new(OtpStore::new(db), email_sender, sms_sender),
            crypto: CryptoService::new(&config.auth),
            tokens: TokenIssuer::new(config.auth.jwt_secret.clone()),
            access_token_ttl: Duration::hours(config.auth.access_token_ttl_hours),
            reset_token_ttl: Duration::minutes(config.auth.reset_token_ttl_mins),
        }
    }

    /// Register a new account with both channels unverified
    pub async fn signup(&self, request: SignupRequest) -> AuthResult<UserView> {
        // Duplicate checks run against non-deleted identities only
        if self.users.email_exists(&request.email).await? {
            return Err(AuthError::Conflict(
                "Email is already registered!".to_string(),
            ));
        }
        if self.users.mobile_exists(&request.mobile).await? {
            return Err(AuthError::Conflict(
                "Mobile number is already registered!".to_string(),
            ));
        }

        let referral_code = referral::generate_referral_code(&self.users).await?;
        let password_hash = self.crypto.hash_password(&request.password)?;

        let user = self
            .users
            .create(NewUser {
                name: request.name,
                email: request.email,
                mobile: request.mobile,
                password_hash,
                referral_code,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.id, user.email);
        metrics::record_signup();

        Ok(UserView::from(user))
    }

    /// Authenticate a user, enforcing verification and the lockout policy
    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientMeta,
    ) -> AuthResult<LoginResponse> {
        let channel = request.channel()?;
        let mut user = match self.find_by_channel(&channel).await? {
            Some(user) => user,
            None => {
                metrics::record_login_denied("invalid_credentials");
                return Err(AuthError::Unauthorized("Invalid credentials!".to_string()));
            }
        };

        let now = Utc::now();
        match lockout::gate_attempt(&mut user, now) {
            // Lapsed blocks and decayed counters persist even if the
            // attempt goes on to fail
            Ok(dirty) => {
                if dirty {
                    self.users.save_login_state(&user).await?;
                }
            }
            Err(reason) => {
                metrics::record_login_denied(deny_label(reason));
                return Err(deny_error(reason));
            }
        }

        if !self
            .crypto
            .verify_password(&request.password, &user.password_hash)?
        {
            lockout::record_failure(&mut user, now);
            self.users.save_login_state(&user).await?;

            if user.is_blocked {
                tracing::warn!("User {} blocked after repeated login failures", user.id);
                metrics::record_lockout();
            }
            metrics::record_login_denied(deny_label(DenyReason::WrongPassword));
            return Err(deny_error(DenyReason::WrongPassword));
        }

        lockout::record_success(&mut user, now);
        self.users.save_login_state(&user).await?;

        // Best-effort audit write; a failure never blocks the login
        if let Err(e) = self
            .login_events
            .record(user.id, &client.ip_address, &client.user_agent)
            .await
        {
            tracing::warn!("Failed to record login event for user {}: {}", user.id, e);
        }

        let token = self
            .tokens
            .issue(user.id, &user.name, &user.role, self.access_token_ttl)?;

        tracing::info!("User {} logged in from {}", user.id, client.ip_address);
        metrics::record_login_success();

        Ok(LoginResponse {
            user: UserView::from(user),
            token,
        })
    }

    /// Issue verification codes on every supplied channel
    pub async fn send_otp(&self, request: SendOtpRequest) -> AuthResult<()> {
        for channel in request.channels()? {
            let user = self.resolve_unverified(&channel).await?;
            self.otp
                .issue(user.id, &channel, OtpPurpose::Verification)
                .await?;
            metrics::record_otp_issued(OtpPurpose::Verification.as_str());
        }
        Ok(())
    }

    /// Consume a verification code and flip the matching verified flag
    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> AuthResult<()> {
        let channel = request.channel()?;
        let user = self
            .find_by_channel(&channel)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User not found!".to_string()))?;

        self.consume_code(&channel, &request.code).await?;

        match &channel {
            Channel::Email(_) => self.users.mark_email_verified(user.id).await?,
            Channel::Mobile(_) => self.users.mark_mobile_verified(user.id).await?,
        }

        tracing::info!(
            "Verified {} channel for user {}",
            channel_label(&channel),
            user.id
        );
        metrics::record_otp_verified(OtpPurpose::Verification.as_str());
        Ok(())
    }

    /// Issue password-reset codes; verified state is not required here
    pub async fn forgot_password_send_otp(&self, request: SendOtpRequest) -> AuthResult<()> {
        for channel in request.channels()? {
            let user = self.find_by_channel(&channel).await?.ok_or_else(|| {
                let message = match &channel {
                    Channel::Email(_) => "Invalid email credentials!",
                    Channel::Mobile(_) => "Invalid mobile credentials!",
                };
                AuthError::Unauthorized(message.to_string())
            })?;

            self.otp
                .issue(user.id, &channel, OtpPurpose::PasswordReset)
                .await?;
            metrics::record_otp_issued(OtpPurpose::PasswordReset.as_str());
        }
        Ok(())
    }

    /// Consume a password-reset code and mint a short-lived reset token
    pub async fn forgot_password_verify_otp(
        &self,
        request: VerifyOtpRequest,
    ) -> AuthResult<ResetTokenResponse> {
        let channel = request.channel()?;
        let user = self
            .find_by_channel(&channel)
            .await?
            .ok_or_else(|| AuthError::Unauthorized("User not found!".to_string()))?;

        self.consume_code(&channel, &request.code).await?;

        let token = self
            .tokens
            .issue(user.id, &user.name, &user.role, self.reset_token_ttl)?;

        tracing::info!("Issued password-reset token for user {}", user.id);
        metrics::record_otp_verified(OtpPurpose::PasswordReset.as_str());

        Ok(ResetTokenResponse { token })
    }

    /// Replace the password for a bearer-authenticated user
    pub async fn reset_password(
        &self,
        user_id: i64,
        request: ResetPasswordRequest,
    ) -> AuthResult<()> {
        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            AuthError::Unauthorized("User not found or invalid credentials!".to_string())
        })?;

        let password_hash = self.crypto.hash_password(&request.password)?;
        self.users.update_password(user.id, &password_hash).await?;

        tracing::info!("Password reset for user {}", user.id);
        metrics::record_password_reset();
        Ok(())
    }

    /// Sanitized identity view for the authenticated user
    pub async fn profile(&self, user_id: i64) -> AuthResult<UserView> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        Ok(UserView::from(user))
    }

    async fn find_by_channel(&self, channel: &Channel) -> AuthResult<Option<User>> {
        match channel {
            Channel::Email(address) => self.users.find_by_email(address).await,
            Channel::Mobile(number) => self.users.find_by_mobile(number).await,
        }
    }

    /// Resolve a channel owner that has not verified that channel yet
    async fn resolve_unverified(&self, channel: &Channel) -> AuthResult<User> {
        match channel {
            Channel::Email(address) => {
                let user = self
                    .users
                    .find_by_email(address)
                    .await?
                    .ok_or_else(|| AuthError::Unauthorized("Invalid email!".to_string()))?;
                if user.is_email_verified {
                    return Err(AuthError::Unauthorized(
                        "Email already verified!".to_string(),
                    ));
                }
                Ok(user)
            }
            Channel::Mobile(number) => {
                let user = self
                    .users
                    .find_by_mobile(number)
                    .await?
                    .ok_or_else(|| AuthError::Unauthorized("Invalid mobile!".to_string()))?;
                if user.is_mobile_verified {
                    return Err(AuthError::Unauthorized(
                        "Mobile already verified!".to_string(),
                    ));
                }
                Ok(user)
            }
        }
    }

    async fn consume_code(&self, channel: &Channel, code: &str) -> AuthResult<()> {
        match self.otp.verify(channel, code).await? {
            VerifyOutcome::Consumed => Ok(()),
            VerifyOutcome::Invalid => Err(AuthError::Unauthorized(
                "Invalid OTP or OTP expired!".to_string(),
            )),
            VerifyOutcome::Expired => Err(AuthError::Expired("OTP has expired!".to_string())),
        }
    }
}

fn deny_error(reason: DenyReason) -> AuthError {
    let message = match reason {
        DenyReason::EmailNotVerified => "Email not verified!",
        DenyReason::MobileNotVerified => "Mobile not verified!",
        DenyReason::TemporarilyBlocked => "Your account is temporarily blocked. Try again later.",
        DenyReason::WrongPassword => "Wrong Password",
    };
    AuthError::Unauthorized(message.to_string())
}

fn deny_label(reason: DenyReason) -> &'static str {
    match reason {
        DenyReason::EmailNotVerified => "email_not_verified",
        DenyReason::MobileNotVerified => "mobile_not_verified",
        DenyReason::TemporarilyBlocked => "blocked",
        DenyReason::WrongPassword => "wrong_password",
    }
}

fn channel_label(channel: &Channel) -> &'static str {
    match channel {
        Channel::Email(_) => "email",
        Channel::Mobile(_) => "mobile",
    }
}
