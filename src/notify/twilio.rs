//! WhatsApp delivery through the Twilio Messages API

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::settings::WhatsAppSettings;
use crate::error::{PayupError, PayupResult};

use super::MessageGateway;

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Twilio account record, as returned by the accounts endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TwilioAccount {
    pub sid: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

/// Gateway that sends WhatsApp messages via Twilio
pub struct TwilioGateway {
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base: String,
    client: Client,
}

impl TwilioGateway {
    /// Build a gateway from settings
    ///
    /// Fails before any request is made when the account SID or auth token
    /// is missing.
    pub fn from_settings(settings: &WhatsAppSettings) -> PayupResult<Self> {
        let (account_sid, auth_token) = match (&settings.account_sid, &settings.auth_token) {
            (Some(sid), Some(token)) if !sid.trim().is_empty() && !token.trim().is_empty() => {
                (sid.trim().to_string(), token.trim().to_string())
            }
            _ => {
                return Err(PayupError::Notification(
                    "WhatsApp credentials not configured".into(),
                ))
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PayupError::Notification(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            account_sid,
            auth_token,
            from_number: whatsapp_address(&settings.from_number),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.api_base, self.account_sid)
    }

    fn account_url(&self) -> String {
        format!("{}/Accounts/{}.json", self.api_base, self.account_sid)
    }

    /// Fetch the account record to confirm the credentials work
    pub fn check_connection(&self) -> PayupResult<TwilioAccount> {
        let response = self
            .client
            .get(self.account_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .map_err(|e| PayupError::Notification(format!("Twilio request failed: {}", e)))?;

        parse_response(response)
    }
}

impl MessageGateway for TwilioGateway {
    fn name(&self) -> &str {
        "twilio"
    }

    fn send(&self, to: &str, body: &str) -> PayupResult<String> {
        let to = whatsapp_address(to);
        debug!(to = %to, "sending WhatsApp message");

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", self.from_number.as_str()),
                ("To", to.as_str()),
                ("Body", body),
            ])
            .send()
            .map_err(|e| PayupError::Notification(format!("Twilio request failed: {}", e)))?;

        let message: MessageResponse = parse_response(response)?;
        Ok(message.sid)
    }
}

/// Prefix a phone number with the WhatsApp channel marker if it lacks one
fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> PayupResult<T> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|e| PayupError::Notification(format!("Failed to read Twilio response: {}", e)))?;

    if !status.is_success() {
        let detail = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(ErrorResponse {
                code: Some(code),
                message,
            }) => format!("{} (code {})", message, code),
            Ok(ErrorResponse { message, .. }) => message,
            Err(_) => text,
        };
        return Err(PayupError::Notification(format!(
            "Twilio API error {}: {}",
            status.as_u16(),
            detail
        )));
    }

    serde_json::from_str(&text)
        .map_err(|e| PayupError::Notification(format!("Unexpected Twilio response: {}", e)))
}
