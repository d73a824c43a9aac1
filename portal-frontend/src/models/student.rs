use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::billing::BillingSubject;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub section: Option<String>,
}

impl Student {
    /// Class with its section, e.g. `"5-A"`; just the class when unsectioned.
    pub fn class_label(&self) -> String {
        match self.section.as_deref().map(str::trim) {
            Some(section) if !section.is_empty() => format!("{}-{}", self.class, section),
            _ => self.class.clone(),
        }
    }

    pub fn to_subject(&self) -> BillingSubject {
        BillingSubject {
            name: self.name.clone(),
            external_id: self.student_id.clone(),
            class_label: self.class_label(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    pub fn pages(&self) -> Vec<u32> {
        (1..=self.total_pages).collect()
    }

    pub fn previous(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.page < self.total_pages).then(|| self.page + 1)
    }
}

/// `data` of the paged roster listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPage {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Filters of the roster page. `"all"` or empty means no filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub page: Option<u32>,
}

impl StudentFilter {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let keep = |value: &str| {
            let value = value.trim();
            if value.is_empty() || value == "all" {
                String::new()
            } else {
                value.to_string()
            }
        };
        vec![
            ("query", self.query.trim().to_string()),
            ("class", keep(&self.class)),
            ("section", keep(&self.section)),
            ("page", self.page.unwrap_or(1).max(1).to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 2, message = "Student ID must be at least 2 characters"))]
    pub student_id: String,
    pub class: String,
    #[serde(default)]
    pub section: String,
}

impl StudentForm {
    /// Field checks plus membership of `class` in the organization's list.
    pub fn validate_with(&self, classes: &[String]) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if !classes.iter().any(|c| c == self.class.trim()) {
            let mut err = ValidationError::new("class");
            err.message = Some("Please select a class".into());
            errors.add("class", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn to_payload(&self, organization: &str) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "studentId": self.student_id.trim(),
            "class": self.class.trim(),
            "section": self.section.trim(),
            "organization": organization,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        ["LKG", "UKG", "1", "2"].iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn subject_carries_class_and_section() {
        let student: Student = serde_json::from_str(
            r#"{"_id":"s1","name":"Asha","studentId":"STU-1","class":"5","section":"A"}"#,
        )
        .unwrap();
        let subject = student.to_subject();
        assert_eq!(subject.external_id, "STU-1");
        assert_eq!(subject.class_label, "5-A");
    }

    #[test]
    fn class_must_be_one_of_the_configured_list() {
        let form = StudentForm {
            name: "Asha".to_string(),
            student_id: "STU-1".to_string(),
            class: "13".to_string(),
            section: String::new(),
        };
        let errors = form.validate_with(&classes()).unwrap_err();
        assert!(errors.field_errors().contains_key("class"));

        let form = StudentForm {
            class: "UKG".to_string(),
            ..form
        };
        assert!(form.validate_with(&classes()).is_ok());
    }

    #[test]
    fn all_filter_is_sent_as_empty() {
        let filter = StudentFilter {
            class: "all".to_string(),
            section: "B".to_string(),
            ..Default::default()
        };
        let query = filter.to_query();
        assert!(query.contains(&("class", String::new())));
        assert!(query.contains(&("section", "B".to_string())));
        assert!(query.contains(&("page", "1".to_string())));
    }

    #[test]
    fn pagination_neighbours() {
        let p = Pagination {
            page: 1,
            total_pages: 3,
            total: 25,
        };
        assert_eq!(p.previous(), None);
        assert_eq!(p.next(), Some(2));
        assert_eq!(p.pages(), vec![1, 2, 3]);
    }
}
