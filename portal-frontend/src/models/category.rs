use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::billing::CategorySet;

/// A fee category offered by an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = 60, message = "Category name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryForm {
    pub fn create_payload(&self, organization: &str) -> serde_json::Value {
        serde_json::json!({
            "name": self.name.trim(),
            "description": self.description.trim(),
            "organization": organization,
        })
    }

    pub fn update_payload(&self, id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": self.name.trim(),
            "description": self.description.trim(),
        })
    }
}

pub fn category_set(categories: &[Category]) -> CategorySet {
    CategorySet::new(categories.iter().map(|c| c.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mongo_style_ids_are_accepted() {
        let category: Category =
            serde_json::from_str(r#"{"_id":"c1","name":"Tuition"}"#).unwrap();
        assert_eq!(category.id, "c1");
        assert_eq!(category.description, None);
    }

    #[test]
    fn set_keeps_first_occurrence_order() {
        let categories = vec![
            Category {
                id: "1".to_string(),
                name: "Tuition".to_string(),
                description: None,
            },
            Category {
                id: "2".to_string(),
                name: "Transport".to_string(),
                description: None,
            },
            Category {
                id: "3".to_string(),
                name: "Tuition".to_string(),
                description: None,
            },
        ];
        let set = category_set(&categories);
        assert_eq!(set.names(), ["Tuition".to_string(), "Transport".to_string()]);
    }
}
