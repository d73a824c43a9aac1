//! Who is signed in, carried explicitly through the session store.
//!
//! A [`SessionContext`] is created by sign-in plus one `/auth/verify` call,
//! read back on every request that needs it and removed on sign-out.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;

use crate::billing::InvoiceDraft;
use crate::middleware::access::{Role, SIGN_IN_ROUTE};
use crate::models::roster::RosterRow;

pub const SESSION_CONTEXT_KEY: &str = "session_context";
pub const INVOICE_DRAFT_KEY: &str = "invoice_draft";
pub const ROSTER_UPLOAD_KEY: &str = "roster_upload";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub is_organization_configured: bool,
}

impl SessionUser {
    pub fn initials(&self) -> String {
        let initials: String = self
            .name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase();
        if initials.is_empty() {
            "U".to_string()
        } else {
            initials
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub access_token: String,
    pub user: SessionUser,
}

impl SessionContext {
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Organization the signed-in user administers.
    pub fn organization(&self) -> Result<&str, AppError> {
        self.user
            .organization
            .as_deref()
            .filter(|org| !org.is_empty())
            .ok_or_else(|| {
                AppError::Forbidden("Your account is not linked to an organization".to_string())
            })
    }

    /// Admins must register their organization before using the portal.
    pub fn needs_onboarding(&self) -> bool {
        self.user.role == Role::Admin && !self.user.is_organization_configured
    }

    pub async fn load(session: &Session) -> Option<Self> {
        match session.get::<SessionContext>(SESSION_CONTEXT_KEY).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable session context, treating as signed out");
                None
            }
        }
    }

    pub async fn store(&self, session: &Session) -> Result<(), AppError> {
        session
            .insert(SESSION_CONTEXT_KEY, self)
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {}", e)))
    }

    /// Drops the context and any bill in progress.
    pub async fn clear(session: &Session) -> Result<(), AppError> {
        session
            .flush()
            .await
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("session flush failed: {}", e)))
    }
}

/// Draft persistence helpers. A missing or unreadable draft is `None`.
pub async fn load_draft(session: &Session) -> Option<InvoiceDraft> {
    session
        .get::<InvoiceDraft>(INVOICE_DRAFT_KEY)
        .await
        .unwrap_or_default()
}

pub async fn store_draft(session: &Session, draft: &InvoiceDraft) -> Result<(), AppError> {
    session
        .insert(INVOICE_DRAFT_KEY, draft)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {}", e)))
}

pub async fn discard_draft(session: &Session) -> Result<(), AppError> {
    session
        .remove::<InvoiceDraft>(INVOICE_DRAFT_KEY)
        .await
        .map(|_| ())
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {}", e)))
}

/// Rows of a previewed CSV upload, kept until the user saves or discards them.
pub async fn load_roster_upload(session: &Session) -> Option<Vec<RosterRow>> {
    session
        .get::<Vec<RosterRow>>(ROSTER_UPLOAD_KEY)
        .await
        .unwrap_or_default()
}

pub async fn store_roster_upload(session: &Session, rows: &[RosterRow]) -> Result<(), AppError> {
    session
        .insert(ROSTER_UPLOAD_KEY, rows)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {}", e)))
}

pub async fn discard_roster_upload(session: &Session) -> Result<(), AppError> {
    session
        .remove::<Vec<RosterRow>>(ROSTER_UPLOAD_KEY)
        .await
        .map(|_| ())
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("session write failed: {}", e)))
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The role gate already loaded it for gated routes.
        if let Some(context) = parts.extensions.get::<SessionContext>() {
            return Ok(context.clone());
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        SessionContext::load(&session)
            .await
            .ok_or_else(|| Redirect::to(SIGN_IN_ROUTE).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, role: Role) -> SessionUser {
        SessionUser {
            name: name.to_string(),
            email: "a@b.in".to_string(),
            organization: None,
            role,
            is_organization_configured: false,
        }
    }

    #[test]
    fn initials_take_the_first_two_words() {
        assert_eq!(user("asha rao kumar", Role::User).initials(), "AR");
        assert_eq!(user("", Role::User).initials(), "U");
    }

    #[test]
    fn only_unconfigured_admins_need_onboarding() {
        let admin = SessionContext {
            access_token: "t".to_string(),
            user: user("Asha", Role::Admin),
        };
        assert!(admin.needs_onboarding());
        assert!(admin.organization().is_err());

        let member = SessionContext {
            access_token: "t".to_string(),
            user: user("Ravi", Role::User),
        };
        assert!(!member.needs_onboarding());
    }

    #[test]
    fn backend_user_shape_deserializes() {
        let user: SessionUser = serde_json::from_str(
            r#"{"name":"Asha","email":"a@b.in","role":"SUPER_USER","organization":"org-1","isOrganizationConfigured":true}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::SuperUser);
        assert_eq!(user.organization.as_deref(), Some("org-1"));
    }
}
