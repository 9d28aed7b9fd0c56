/// SMS gateway delivery for one-time codes
use crate::{
    config::SmsConfig,
    error::{AuthError, AuthResult},
    notify::OtpSender,
};
use async_trait::async_trait;
use serde::Serialize;

#[derive(Serialize)]
struct SmsPayload<'a> {
    sender_id: &'a str,
    mobile: &'a str,
    message: String,
}

/// Texts one-time codes through an HTTP SMS gateway
#[derive(Clone)]
pub struct SmsOtpSender {
    config: Option<SmsConfig>,
    http_client: reqwest::Client,
}

impl SmsOtpSender {
    /// Create a sender; without SMS config it stays inert and fails dispatch
    pub fn new(config: Option<SmsConfig>) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Check if SMS delivery is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl OtpSender for SmsOtpSender {
    async fn send(&self, destination: &str, code: &str) -> AuthResult<()> {
        let config = match &self.config {
            Some(config) => config,
            None => {
                tracing::warn!("SMS not configured, cannot deliver OTP to {}", destination);
                return Err(AuthError::Dispatch(
                    "SMS delivery is not configured".to_string(),
                ));
            }
        };

        let payload = SmsPayload {
            sender_id: &config.sender_id,
            mobile: destination,
            message: format!("Your verification code is {}. It expires in 5 minutes.", code),
        };

        let response = self
            .http_client
            .post(&config.gateway_url)
            .header("authorization", &config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AuthError::Dispatch(format!("SMS gateway request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Dispatch(format!(
                "SMS gateway returned status {}",
                response.status()
            )));
        }

        tracing::info!("Sent OTP SMS to {}", destination);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_sender_fails_dispatch() {
        let sender = SmsOtpSender::new(None).unwrap();
        assert!(!sender.is_configured());

        let err = sender.send("9876543210", "123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Dispatch(_)));
    }
}
