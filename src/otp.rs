/// One-time code issuance and verification
use crate::{
    db::models::NewOtpCode,
    db::otp::OtpStore,
    error::{AuthError, AuthResult},
    notify::OtpSender,
};
use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;

/// Codes lapse this many minutes after issuance
pub const OTP_TTL_MINUTES: i64 = 5;

const OTP_DIGITS: usize = 6;

/// What a one-time code is issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Verification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Verification => "verification",
            OtpPurpose::PasswordReset => "password-reset",
        }
    }
}

/// A delivery channel together with its destination address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Email(String),
    Mobile(String),
}

impl Channel {
    pub fn destination(&self) -> &str {
        match self {
            Channel::Email(address) => address,
            Channel::Mobile(number) => number,
        }
    }
}

/// Result of checking a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched a live record, now consumed
    Consumed,
    /// No live code matches the submission
    Invalid,
    /// A matching code exists but has lapsed
    Expired,
}

/// Creates, dispatches, and validates one-time codes
pub struct OtpManager {
    store: OtpStore,
    email_sender: Arc<dyn OtpSender>,
    sms_sender: Arc<dyn OtpSender>,
}

impl OtpManager {
    pub fn new(
        store: OtpStore,
        email_sender: Arc<dyn OtpSender>,
        sms_sender: Arc<dyn OtpSender>,
    ) -> Self {
        Self {
            store,
            email_sender,
            sms_sender,
        }
    }

    /// Six independent decimal digits, leading zeros included
    fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..OTP_DIGITS)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Issue a fresh code on a channel, retiring any still-pending ones
    /// for the same user, channel, and purpose first. The record persists
    /// even when dispatch fails.
    pub async fn issue(
        &self,
        user_id: i64,
        channel: &Channel,
        purpose: OtpPurpose,
    ) -> AuthResult<String> {
        let code = Self::generate_code();
        let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

        let retired = match channel {
            Channel::Email(address) => {
                self.store
                    .retire_outstanding_by_email(user_id, address, purpose.as_str())
                    .await?
            }
            Channel::Mobile(number) => {
                self.store
                    .retire_outstanding_by_mobile(user_id, number, purpose.as_str())
                    .await?
            }
        };
        if retired > 0 {
            tracing::debug!("Retired {} outstanding codes for user {}", retired, user_id);
        }

        let (email, mobile) = match channel {
            Channel::Email(address) => (Some(address.clone()), None),
            Channel::Mobile(number) => (None, Some(number.clone())),
        };

        self.store
            .create(NewOtpCode {
                user_id,
                email,
                mobile,
                code: code.clone(),
                purpose: purpose.as_str().to_string(),
                expires_at,
            })
            .await?;

        let send_result = match channel {
            Channel::Email(address) => self.email_sender.send(address, &code).await,
            Channel::Mobile(number) => self.sms_sender.send(number, &code).await,
        };

        if let Err(e) = send_result {
            tracing::error!("OTP dispatch failed for user {}: {}", user_id, e);
            let message = match channel {
                Channel::Email(_) => "Failed to send OTP to email!",
                Channel::Mobile(_) => "Failed to send OTP to mobile!",
            };
            return Err(AuthError::Dispatch(message.to_string()));
        }

        tracing::info!("Issued {} OTP for user {}", purpose.as_str(), user_id);
        Ok(code)
    }

    /// Check a submitted code on a channel. The oldest live code wins, and
    /// expiry is judged here so a lapsed match reports as expired rather
    /// than unknown. Expired codes are left untouched.
    pub async fn verify(&self, channel: &Channel, code: &str) -> AuthResult<VerifyOutcome> {
        let pending = match channel {
            Channel::Email(address) => self.store.find_pending_by_email(address, code).await?,
            Channel::Mobile(number) => self.store.find_pending_by_mobile(number, code).await?,
        };

        let row = match pending {
            Some(row) => row,
            None => return Ok(VerifyOutcome::Invalid),
        };

        if row.expires_at < Utc::now() {
            return Ok(VerifyOutcome::Expired);
        }

        self.store.mark_used(row.id).await?;
        Ok(VerifyOutcome::Consumed)
    }
}
