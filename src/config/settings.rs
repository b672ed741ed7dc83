//! User settings for PayUp
//!
//! Manages preferences, WhatsApp gateway credentials and the logged-in
//! member. Settings are loaded once at startup and passed by reference to
//! whatever needs them.

use serde::{Deserialize, Serialize};

use super::paths::PayupPaths;
use crate::error::PayupError;
use crate::models::MemberId;

/// Environment variable holding the Twilio account SID
pub const TWILIO_ACCOUNT_SID_ENV: &str = "TWILIO_ACCOUNT_SID";
/// Environment variable holding the Twilio auth token
pub const TWILIO_AUTH_TOKEN_ENV: &str = "TWILIO_AUTH_TOKEN";
/// Environment variable holding the WhatsApp sender number
pub const TWILIO_WHATSAPP_NUMBER_ENV: &str = "TWILIO_WHATSAPP_NUMBER";
/// Environment variable holding the default UPI id for new groups
pub const UPI_ID_ENV: &str = "UPI_ID";

/// WhatsApp gateway settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppSettings {
    /// Twilio account SID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,

    /// Twilio auth token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Sender number, including the `whatsapp:` prefix
    #[serde(default = "default_from_number")]
    pub from_number: String,

    /// Base URL of the messaging API
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl WhatsAppSettings {
    /// Both credentials are present and non-blank
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.trim().is_empty());
        present(&self.account_sid) && present(&self.auth_token)
    }
}

impl Default for WhatsAppSettings {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            from_number: default_from_number(),
            api_base: default_api_base(),
        }
    }
}

/// User settings for PayUp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used in reminders and reports
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Payment-collection id given to groups created without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_payment_id: Option<String>,

    /// WhatsApp gateway configuration
    #[serde(default)]
    pub whatsapp: WhatsAppSettings,

    /// Member logged in on this machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_member: Option<MemberId>,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_from_number() -> String {
    "whatsapp:+14155238886".to_string()
}

fn default_api_base() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            default_payment_id: None,
            whatsapp: WhatsAppSettings::default(),
            active_member: None,
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &PayupPaths) -> Result<Self, PayupError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| PayupError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                PayupError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    ///
    /// Values that came from environment overrides are saved too, so callers
    /// persist only settings loaded without overrides.
    pub fn save(&self, paths: &PayupPaths) -> Result<(), PayupError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PayupError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| PayupError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(sid) = value(TWILIO_ACCOUNT_SID_ENV) {
            self.whatsapp.account_sid = Some(sid);
        }
        if let Some(token) = value(TWILIO_AUTH_TOKEN_ENV) {
            self.whatsapp.auth_token = Some(token);
        }
        if let Some(number) = value(TWILIO_WHATSAPP_NUMBER_ENV) {
            self.whatsapp.from_number = number;
        }
        if let Some(upi) = value(UPI_ID_ENV) {
            self.default_payment_id = Some(upi);
        }
    }
}
