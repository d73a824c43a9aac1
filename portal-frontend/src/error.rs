//! Failures shown to the person using a page.
//!
//! Nothing here is fatal: every error becomes a dismissible notification
//! fragment swapped into `#notifications`, and the form stays editable.

use askama::Template;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use service_core::error::AppError;
use validator::ValidationErrors;

use crate::billing::{InvoiceError, ItemFieldError};
use crate::models::roster::ImportError;

pub const NOTIFICATIONS_TARGET: &str = "#notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    pub fn css(&self) -> &'static str {
        match self {
            NoticeKind::Success => "notice-success",
            NoticeKind::Error => "notice-error",
        }
    }
}

#[derive(Template, Debug, Clone)]
#[template(path = "partials/notice.html")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub details: Vec<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    /// Markup for out-of-band inclusion in a larger fragment.
    pub fn to_html(&self) -> String {
        self.render().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Notice template failed to render");
            format!("<div class=\"notice {}\">{}</div>", self.kind.css(), self.message)
        })
    }
}

/// Handler error: an [`AppError`] rendered as a notice instead of JSON.
#[derive(Debug)]
pub struct Notify {
    pub status: StatusCode,
    pub notice: Notice,
}

impl Notify {
    pub fn new(status: StatusCode, notice: Notice) -> Self {
        Self { status, notice }
    }
}

impl From<AppError> for Notify {
    fn from(err: AppError) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::info!(error = %err, "Request rejected");
        }

        let details = match &err {
            AppError::ValidationError(errors) => validation_details(errors),
            _ => Vec::new(),
        };
        let message = match &err {
            AppError::ValidationError(_) => "Please correct the highlighted fields".to_string(),
            _ => err.user_message(),
        };
        Notify::new(status, Notice::error(message).with_details(details))
    }
}

impl From<ValidationErrors> for Notify {
    fn from(errors: ValidationErrors) -> Self {
        AppError::from(errors).into()
    }
}

impl From<InvoiceError> for Notify {
    fn from(err: InvoiceError) -> Self {
        let details = match &err {
            InvoiceError::IncompleteItems(rows) => rows.iter().map(describe_row).collect(),
            InvoiceError::UnknownCategory(rows) => rows
                .iter()
                .map(|(row, name)| format!("Row {}: \"{}\" is not one of your categories", row, name))
                .collect(),
            _ => Vec::new(),
        };
        Notify::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            Notice::error(err.to_string()).with_details(details),
        )
    }
}

impl From<ImportError> for Notify {
    fn from(err: ImportError) -> Self {
        let details = match &err {
            ImportError::InvalidRows(report) => report
                .errors
                .iter()
                .map(|e| format!("Row {}: {}", e.row, e.message))
                .collect(),
            _ => Vec::new(),
        };
        Notify::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            Notice::error(err.to_string()).with_details(details),
        )
    }
}

impl IntoResponse for Notify {
    fn into_response(self) -> Response {
        let mut response = (self.status, Html(self.notice.to_html())).into_response();
        let headers = response.headers_mut();
        headers.insert("HX-Retarget", HeaderValue::from_static(NOTIFICATIONS_TARGET));
        headers.insert("HX-Reswap", HeaderValue::from_static("afterbegin"));
        response
    }
}

fn describe_row(err: &ItemFieldError) -> String {
    let fields: Vec<&str> = err.missing.iter().map(|f| f.as_str()).collect();
    format!("Row {}: missing {}", err.row, fields.join(", "))
}

fn validation_details(errors: &ValidationErrors) -> Vec<String> {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    details.sort();
    details
}
