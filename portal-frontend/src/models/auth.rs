use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::middleware::access::Role;
use crate::models::session::SessionUser;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 20,
        message = "Password must be between 8 and 20 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 20,
        message = "Password must be between 8 and 20 characters"
    ))]
    pub password: String,
}

/// `data` of a successful `POST /auth/sign-in`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInData {
    pub access_token: String,
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub is_organization_configured: bool,
}

impl SignInData {
    pub fn user(&self) -> SessionUser {
        SessionUser {
            name: self.name.clone(),
            email: self.email.clone(),
            organization: self.organization.clone(),
            role: self.role,
            is_organization_configured: self.is_organization_configured,
        }
    }
}

/// `data` of `GET /auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyData {
    pub user: SessionUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_password_length_is_bounded() {
        let short = SignInForm {
            email: "a@b.in".to_string(),
            password: "1234567".to_string(),
        };
        assert!(short.validate().is_err());

        let long = SignInForm {
            email: "a@b.in".to_string(),
            password: "x".repeat(21),
        };
        assert!(long.validate().is_err());

        let ok = SignInForm {
            email: "a@b.in".to_string(),
            password: "secret-pass".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn sign_up_requires_a_real_name() {
        let form = SignUpForm {
            name: "A".to_string(),
            email: "a@b.in".to_string(),
            password: "secret-pass".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn sign_in_payload_maps_to_session_user() {
        let data: SignInData = serde_json::from_str(
            r#"{"accessToken":"tok","role":"ADMIN","name":"Asha","email":"a@b.in","isOrganizationConfigured":false}"#,
        )
        .unwrap();
        let user = data.user();
        assert_eq!(user.role, Role::Admin);
        assert!(!user.is_organization_configured);
        assert_eq!(user.organization, None);
    }
}
