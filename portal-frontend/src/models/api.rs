//! The backend's response envelope: `{ success, message?, data? }`.

use serde::Deserialize;
use service_core::error::{AppError, GENERIC_FAILURE_MESSAGE};

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// A successful call's payload plus the server's message, if any.
#[derive(Debug)]
pub struct ApiReply<T> {
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiReply<T> {
    /// Payload, or an upstream error when a successful call carried none.
    pub fn require_data(self) -> Result<T, AppError> {
        self.data.ok_or_else(|| AppError::Upstream {
            status: 200,
            message: self
                .message
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        })
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

impl<T> ApiEnvelope<T> {
    /// Interprets the envelope for an HTTP `status`. Non-2xx statuses and
    /// `success: false` both become [`AppError::Upstream`], carrying the
    /// server's message when present.
    pub fn into_reply(self, status: u16) -> Result<ApiReply<T>, AppError> {
        let message = self.message.filter(|m| !m.trim().is_empty());
        if !(200..300).contains(&status) || !self.success {
            return Err(AppError::Upstream {
                status: if (200..300).contains(&status) { 422 } else { status },
                message: message.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            });
        }
        Ok(ApiReply {
            message,
            data: self.data,
        })
    }
}
