use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Colour used on bills when the organization has not chosen a theme.
pub const DEFAULT_THEME_COLOR: &str = "#000000";

/// Branding and contact details printed on every bill of an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationTemplate {
    #[serde(default)]
    pub org_name: String,
    #[serde(default)]
    pub org_place: String,
    #[serde(default)]
    pub org_phone: String,
    #[serde(default)]
    pub org_email: String,
    /// A palette id (`"blue"`) or a CSS colour (`"#3B82F6"`).
    #[serde(default, alias = "orgTheme")]
    pub theme_color: String,
}

impl OrganizationTemplate {
    pub fn css_color(&self) -> String {
        let value = self.theme_color.trim();
        if let Some(theme) = ThemeColor::from_id(value) {
            theme.primary().to_string()
        } else if value.starts_with('#') {
            value.to_string()
        } else {
            DEFAULT_THEME_COLOR.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeColor {
    Blue,
    Orange,
    Green,
    Purple,
    Red,
    Teal,
}

impl ThemeColor {
    pub const ALL: [ThemeColor; 6] = [
        ThemeColor::Blue,
        ThemeColor::Orange,
        ThemeColor::Green,
        ThemeColor::Purple,
        ThemeColor::Red,
        ThemeColor::Teal,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "blue",
            ThemeColor::Orange => "orange",
            ThemeColor::Green => "green",
            ThemeColor::Purple => "purple",
            ThemeColor::Red => "red",
            ThemeColor::Teal => "teal",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "Blue",
            ThemeColor::Orange => "Orange",
            ThemeColor::Green => "Green",
            ThemeColor::Purple => "Purple",
            ThemeColor::Red => "Red",
            ThemeColor::Teal => "Teal",
        }
    }

    pub fn primary(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "#3B82F6",
            ThemeColor::Orange => "#F97316",
            ThemeColor::Green => "#10B981",
            ThemeColor::Purple => "#8B5CF6",
            ThemeColor::Red => "#EF4444",
            ThemeColor::Teal => "#14B8A6",
        }
    }

    pub fn secondary(&self) -> &'static str {
        match self {
            ThemeColor::Blue => "#DBEAFE",
            ThemeColor::Orange => "#FED7AA",
            ThemeColor::Green => "#D1FAE5",
            ThemeColor::Purple => "#E9D5FF",
            ThemeColor::Red => "#FECACA",
            ThemeColor::Teal => "#CCFBF1",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.id() == id)
    }
}

/// The template editor form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateForm {
    #[validate(length(min = 1, message = "Organization name is required"))]
    pub org_name: String,
    #[validate(length(min = 1, message = "Organization place is required"))]
    pub org_place: String,
    #[validate(custom(function = "validate_phone"))]
    pub org_phone: String,
    #[validate(email(message = "Invalid email format"))]
    pub org_email: String,
    #[validate(custom(function = "validate_theme"))]
    pub theme_color: String,
}

impl TemplateForm {
    /// Body for `PUT /organizations/template/update`.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "orgName": self.org_name.trim(),
            "orgPlace": self.org_place.trim(),
            "orgPhone": self.org_phone.trim(),
            "orgEmail": self.org_email.trim(),
            "orgTheme": self.theme_color,
        })
    }
}

/// At least ten characters of digits, spaces, dashes or parentheses, with an
/// optional leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));
    if allowed && body.chars().count() >= 10 {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Invalid phone number format".into());
        Err(err)
    }
}

fn validate_theme(theme: &str) -> Result<(), ValidationError> {
    if ThemeColor::from_id(theme).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("theme");
        err.message = Some("Please select a theme color".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_rule_matches_the_form_pattern() {
        assert!(validate_phone("8624800390").is_ok());
        assert!(validate_phone("+91 (862) 480-0390").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("86248OO390").is_err());
    }

    #[test]
    fn theme_ids_resolve_to_css_colours() {
        let mut template = OrganizationTemplate {
            theme_color: "teal".to_string(),
            ..Default::default()
        };
        assert_eq!(template.css_color(), "#14B8A6");
        template.theme_color = "#123456".to_string();
        assert_eq!(template.css_color(), "#123456");
        template.theme_color = String::new();
        assert_eq!(template.css_color(), DEFAULT_THEME_COLOR);
    }

    #[test]
    fn backend_theme_field_is_accepted() {
        let template: OrganizationTemplate =
            serde_json::from_str(r#"{"orgName":"Sunrise School","orgTheme":"red"}"#).unwrap();
        assert_eq!(template.org_name, "Sunrise School");
        assert_eq!(template.css_color(), "#EF4444");
    }

    #[test]
    fn form_requires_a_known_theme() {
        let form = TemplateForm {
            org_name: "Sunrise School".to_string(),
            org_place: "New Delhi".to_string(),
            org_phone: "8624800390".to_string(),
            org_email: "office@sunrise.in".to_string(),
            theme_color: "pink".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("theme_color"));
    }
}
