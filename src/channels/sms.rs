//! Outbound SMS for the Twilio webhook channel.
//!
//! Sending is fire-and-forget from the caller's point of view: the service
//! logs failures and never lets them abort an inbound request.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::ChannelError;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Outcome of a send attempt that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsDelivery {
    /// Accepted by the provider.
    Sent { sid: Option<String> },
    /// No transport configured; nothing was sent.
    Skipped,
}

/// Outbound SMS transport.
#[async_trait]
pub trait SmsSender: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, to: &str, body: &str) -> Result<SmsDelivery, ChannelError>;
}

/// Twilio credentials. All three values are required for SMS sending.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from_number: String,
}

impl TwilioConfig {
    /// Load from `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`.
    ///
    /// Returns `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        Self::from_parts(
            std::env::var("TWILIO_ACCOUNT_SID").ok(),
            std::env::var("TWILIO_AUTH_TOKEN").ok(),
            std::env::var("TWILIO_PHONE_NUMBER").ok(),
        )
    }

    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
    ) -> Option<Self> {
        let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Some(Self {
            account_sid: present(account_sid)?,
            auth_token: SecretString::from(present(auth_token)?),
            from_number: present(from_number)?,
        })
    }
}

#[derive(Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
}

/// Sends SMS through the Twilio Messages API.
pub struct TwilioSender {
    config: TwilioConfig,
    api_base: String,
    client: reqwest::Client,
}

impl TwilioSender {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            api_base: TWILIO_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base, self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioSender {
    fn name(&self) -> &str {
        "twilio"
    }

    async fn send(&self, to: &str, body: &str) -> Result<SmsDelivery, ChannelError> {
        if to.trim().is_empty() {
            return Err(ChannelError::InvalidMessage("missing recipient".into()));
        }

        let form = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body.trim()),
        ];

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.config.account_sid,
                Some(self.config.auth_token.expose_secret()),
            )
            .form(&form)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "twilio".into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "twilio".into(),
                reason: format!("{} {}", status, err),
            });
        }

        let sid = resp
            .json::<TwilioMessage>()
            .await
            .ok()
            .and_then(|m| m.sid);
        tracing::info!(to = %to, sid = ?sid, "SMS sent via Twilio");
        Ok(SmsDelivery::Sent { sid })
    }
}

/// Used when no SMS transport is configured.
pub struct NoopSender;

#[async_trait]
impl SmsSender for NoopSender {
    fn name(&self) -> &str {
        "noop"
    }

    async fn send(&self, to: &str, body: &str) -> Result<SmsDelivery, ChannelError> {
        tracing::info!(
            to = %to,
            preview = %body.chars().take(60).collect::<String>(),
            "SMS transport not configured; reply not sent"
        );
        Ok(SmsDelivery::Skipped)
    }
}
