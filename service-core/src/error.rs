use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Fallback text shown when the backend gives no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backend answered, but with a non-2xx status or `success: false`.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream unreachable: {0}")]
    Unreachable(String),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout
        } else if err.is_connect() || err.is_request() {
            AppError::Unreachable(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Upstream {
                status: status.as_u16(),
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            }
        } else {
            AppError::InternalError(anyhow::Error::new(err))
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Upstream { status, .. } => {
                // Client errors from the backend are the user's to fix; anything
                // else is reported as a gateway failure.
                match StatusCode::from_u16(*status) {
                    Ok(code) if code.is_client_error() => code,
                    _ => StatusCode::BAD_GATEWAY,
                }
            }
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unreachable(_) => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message suitable for showing to the person using the form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError(errors) => summarize_validation(errors),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg) => msg.clone(),
            AppError::Upstream { message, .. } => message.clone(),
            AppError::Timeout => "The server took too long to respond.".to_string(),
            AppError::Unreachable(_) => "The server could not be reached.".to_string(),
            AppError::InternalError(_) | AppError::ConfigError(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }
}

/// Flattens `validator` output into "field: message" pairs, sorted by field.
pub fn summarize_validation(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value", field),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let status = self.status_code();
        let details = match &self {
            AppError::ValidationError(err) => Some(err.to_string()),
            AppError::Upstream { status, .. } => Some(format!("upstream status {}", status)),
            AppError::Unreachable(err) => Some(err.clone()),
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Internal error");
                None
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                None
            }
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.user_message(),
                details,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 2, message = "too short"))]
        name: String,
    }

    #[test]
    fn upstream_client_errors_keep_their_status() {
        let err = AppError::Upstream {
            status: 409,
            message: "Category already exists".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.user_message(), "Category already exists");
    }

    #[test]
    fn upstream_server_errors_become_bad_gateway() {
        let err = AppError::Upstream {
            status: 503,
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_errors_are_flattened() {
        let err = Probe {
            name: "a".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(summarize_validation(&err), "name: too short");
        assert_eq!(
            AppError::from(err).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn timeout_has_friendly_message() {
        assert_eq!(AppError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert!(AppError::Timeout.user_message().contains("too long"));
    }
}
