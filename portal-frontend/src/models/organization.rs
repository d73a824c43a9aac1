use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Admin onboarding: registers the organization the admin will manage.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrganizationForm {
    #[validate(length(min = 2, message = "Organization name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub contact_email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_phone"))]
    pub contact_phone: String,
    #[validate(length(min = 2, message = "Principal name must be at least 2 characters"))]
    pub principal_name: String,
    #[validate(url(message = "Please enter a valid URL"))]
    pub website: String,
    #[validate(length(min = 1, message = "Street is required"))]
    pub street: String,
    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "State is required"))]
    pub state: String,
    #[validate(length(min = 4, message = "Postal code must be at least 4 characters"))]
    pub postal_code: String,
}

impl OrganizationForm {
    /// Body for `POST /organizations`.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "contactEmail": self.contact_email.trim(),
            "contactPhone": self.contact_phone.trim(),
            "principalName": self.principal_name.trim(),
            "website": self.website.trim(),
            "address": {
                "street": self.street.trim(),
                "city": self.city.trim(),
                "state": self.state.trim(),
                "postalCode": self.postal_code.trim(),
            },
        })
    }
}

/// Empty, or at least ten characters.
fn validate_optional_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() || phone.chars().count() >= 10 {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Phone number must be at least 10 digits".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> OrganizationForm {
        OrganizationForm {
            name: "Sunrise School".to_string(),
            contact_email: "office@sunrise.in".to_string(),
            contact_phone: String::new(),
            principal_name: "R. Iyer".to_string(),
            website: "https://sunrise.in".to_string(),
            street: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    #[test]
    fn phone_may_be_left_blank() {
        assert!(form().validate().is_ok());
        let short = OrganizationForm {
            contact_phone: "12345".to_string(),
            ..form()
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn address_is_nested_in_the_payload() {
        let payload = form().to_payload();
        assert_eq!(payload["address"]["state"], "Maharashtra");
        assert_eq!(payload["address"]["postalCode"], "411001");
        assert_eq!(payload["contactEmail"], "office@sunrise.in");
    }
}
