/// Account lifecycle and authentication workflows
///
/// Handles signup, credential login with progressive lockout, channel
/// verification, and password reset.

mod lockout;
mod manager;
mod referral;

pub use lockout::DenyReason;
pub use manager::{AccountManager, ClientMeta};

use crate::db::models::User;
use crate::error::{AuthError, AuthResult};
use crate::otp::Channel;
use crate::validation::{
    validate_mobile, validate_name, validate_optional_email, validate_optional_mobile,
    validate_password,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(email(message = "Invalid email!"))]
    pub email: String,
    #[validate(custom(function = "validate_mobile"))]
    pub mobile: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// Login request; at least one identifier must be supplied
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_optional_mobile"))]
    pub mobile: Option<String>,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// Send-OTP request; email, mobile, or both
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendOtpRequest {
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_optional_mobile"))]
    pub mobile: Option<String>,
}

/// Verify-OTP request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(custom(function = "validate_optional_email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_optional_mobile"))]
    pub mobile: Option<String>,
    pub code: String,
}

/// Reset-password request, authorized by a bearer token
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

impl LoginRequest {
    /// Email wins when both identifiers are supplied
    pub fn channel(&self) -> AuthResult<Channel> {
        resolve_channel(&self.email, &self.mobile)
    }
}

impl VerifyOtpRequest {
    pub fn channel(&self) -> AuthResult<Channel> {
        resolve_channel(&self.email, &self.mobile)
    }
}

impl SendOtpRequest {
    /// Every supplied channel, email first
    pub fn channels(&self) -> AuthResult<Vec<Channel>> {
        let mut channels = Vec::new();
        if let Some(email) = non_empty(&self.email) {
            channels.push(Channel::Email(email));
        }
        if let Some(mobile) = non_empty(&self.mobile) {
            channels.push(Channel::Mobile(mobile));
        }

        if channels.is_empty() {
            return Err(AuthError::Validation(
                "Either email or mobile number is required!".to_string(),
            ));
        }
        Ok(channels)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn resolve_channel(email: &Option<String>, mobile: &Option<String>) -> AuthResult<Channel> {
    if let Some(email) = non_empty(email) {
        return Ok(Channel::Email(email));
    }
    if let Some(mobile) = non_empty(mobile) {
        return Ok(Channel::Mobile(mobile));
    }
    Err(AuthError::Validation(
        "Either email or mobile number is required!".to_string(),
    ))
}

/// Identity view with credential material stripped
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub role: String,
    pub referral_code: String,
    pub is_email_verified: bool,
    pub is_mobile_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            mobile: user.mobile,
            role: user.role,
            referral_code: user.referral_code,
            is_email_verified: user.is_email_verified,
            is_mobile_verified: user.is_mobile_verified,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

/// Successful login payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserView,
    pub token: String,
}

/// Password-reset authorization payload
#[derive(Debug, Clone, Serialize)]
pub struct ResetTokenResponse {
    pub token: String,
}
