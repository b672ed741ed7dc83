//! Dry-run gateway that logs messages instead of delivering them

use std::sync::Mutex;

use tracing::info;

use crate::error::{PayupError, PayupResult};

use super::MessageGateway;

/// Gateway that records each message and writes it to the log
#[derive(Debug, Default)]
pub struct LogGateway {
    sent: Mutex<Vec<(String, String)>>,
}

impl LogGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far as (handle, body) pairs
    pub fn sent(&self) -> PayupResult<Vec<(String, String)>> {
        let sent = self
            .sent
            .lock()
            .map_err(|e| PayupError::Notification(format!("Failed to acquire lock: {}", e)))?;
        Ok(sent.clone())
    }
}

impl MessageGateway for LogGateway {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send(&self, to: &str, body: &str) -> PayupResult<String> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| PayupError::Notification(format!("Failed to acquire lock: {}", e)))?;

        sent.push((to.to_string(), body.to_string()));
        let message_id = format!("dry-run-{}", sent.len());
        info!(to, message_id = %message_id, body, "dry run: message not delivered");

        Ok(message_id)
    }
}
