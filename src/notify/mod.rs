/// OTP delivery channels
///
/// Hands one-time codes to users over email or SMS. Implementations own
/// their transport and surface failures as dispatch errors.

pub mod mailer;
pub mod sms;

pub use mailer::EmailOtpSender;
pub use sms::SmsOtpSender;

use crate::error::AuthResult;
use async_trait::async_trait;

/// A delivery channel for one-time codes
#[async_trait]
pub trait OtpSender: Send + Sync {
    /// Deliver a code to a destination address on this channel
    async fn send(&self, destination: &str, code: &str) -> AuthResult<()>;
}
