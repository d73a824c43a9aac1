//! Portfolio profile: banner, avatar, bio, quick-intro items, social links
//! and skills.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(default)]
    pub bg_color: String,
    #[serde(default)]
    pub bg_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub banner: Banner,
    #[serde(default)]
    pub quick_intro: Vec<QuickIntroItem>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Icons offered for quick-intro items. Unknown names fall back to `Circle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntroIcon {
    User,
    Briefcase,
    GraduationCap,
    BookOpen,
    Code,
    Globe,
    Mail,
    Phone,
    MapPin,
    Calendar,
    Github,
    Linkedin,
    Circle,
}

impl IntroIcon {
    pub const ALL: [IntroIcon; 13] = [
        IntroIcon::User,
        IntroIcon::Briefcase,
        IntroIcon::GraduationCap,
        IntroIcon::BookOpen,
        IntroIcon::Code,
        IntroIcon::Globe,
        IntroIcon::Mail,
        IntroIcon::Phone,
        IntroIcon::MapPin,
        IntroIcon::Calendar,
        IntroIcon::Github,
        IntroIcon::Linkedin,
        IntroIcon::Circle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IntroIcon::User => "User",
            IntroIcon::Briefcase => "Briefcase",
            IntroIcon::GraduationCap => "GraduationCap",
            IntroIcon::BookOpen => "BookOpen",
            IntroIcon::Code => "Code",
            IntroIcon::Globe => "Globe",
            IntroIcon::Mail => "Mail",
            IntroIcon::Phone => "Phone",
            IntroIcon::MapPin => "MapPin",
            IntroIcon::Calendar => "Calendar",
            IntroIcon::Github => "Github",
            IntroIcon::Linkedin => "Linkedin",
            IntroIcon::Circle => "Circle",
        }
    }

    /// Glyph rendered next to the item text.
    pub fn glyph(&self) -> &'static str {
        match self {
            IntroIcon::User => "👤",
            IntroIcon::Briefcase => "💼",
            IntroIcon::GraduationCap => "🎓",
            IntroIcon::BookOpen => "📖",
            IntroIcon::Code => "</>",
            IntroIcon::Globe => "🌐",
            IntroIcon::Mail => "✉",
            IntroIcon::Phone => "☎",
            IntroIcon::MapPin => "📍",
            IntroIcon::Calendar => "📅",
            IntroIcon::Github => "GH",
            IntroIcon::Linkedin => "in",
            IntroIcon::Circle => "●",
        }
    }
}

impl From<String> for IntroIcon {
    fn from(name: String) -> Self {
        IntroIcon::ALL
            .into_iter()
            .find(|icon| icon.name() == name)
            .unwrap_or(IntroIcon::Circle)
    }
}

impl From<IntroIcon> for String {
    fn from(icon: IntroIcon) -> Self {
        icon.name().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickIntroItem {
    pub icon: IntroIcon,
    pub text: String,
}

/// Ordered onboarding checks; the first failure is the one shown.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub bg_color: String,
    #[serde(default)]
    pub bg_text: String,
    #[serde(default)]
    pub avatar: String,
}

impl OnboardingForm {
    pub fn check(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Display name cannot be empty.");
        }
        if self.username.trim().is_empty() {
            return Err("Username cannot be empty.");
        }
        if self.bio.trim().is_empty() {
            return Err("Bio cannot be empty.");
        }
        if self.bg_text.trim().is_empty() {
            return Err("Banner text cannot be empty.");
        }
        if self.avatar.trim().is_empty() {
            return Err("Please select an avatar.");
        }
        Ok(())
    }

    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "username": self.username.trim(),
            "bio": self.bio.trim(),
            "bgColor": self.bg_color,
            "bgText": self.bg_text.trim(),
            "avatar": self.avatar,
        })
    }
}

/// A kind of link the platform knows about (`GET /links`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(alias = "_id", default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LinkForm {
    #[validate(length(min = 1, message = "Please choose a link type"))]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[validate(url(message = "Please enter a valid URL"))]
    pub url: String,
}

impl LinkForm {
    /// Fills name and icon from the chosen type, as the picker does.
    pub fn to_payload(&self, types: &[LinkType]) -> serde_json::Value {
        let chosen = types.iter().find(|t| t.kind == self.kind);
        let name = match (self.name.trim(), chosen) {
            ("", Some(t)) => t.name.clone(),
            (name, _) => name.to_string(),
        };
        serde_json::json!({
            "type": self.kind,
            "name": name,
            "url": self.url.trim(),
            "icon": chosen.map(|t| t.logo.clone()).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SkillCategoryForm {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SkillForm {
    pub category_id: String,
    #[validate(length(min = 1, message = "Skill name is required"))]
    pub name: String,
}
