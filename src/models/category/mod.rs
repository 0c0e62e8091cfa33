// Category module

use serde::{Deserialize, Serialize};

/// Task category. Tasks reference categories weakly: the service embeds a
/// copy on each task and nulls it when the category is deleted, so nothing
/// here is load-bearing for task correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

fn default_color() -> String {
    "#3B82F6".to_string()
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Result<Self, String> {
        let category = Self {
            id,
            name: name.into(),
            color: default_color(),
            icon: String::new(),
        };
        category.validate()?;
        Ok(category)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Category name cannot be empty".to_string());
        }
        if !self.color.starts_with('#') || (self.color.len() != 7 && self.color.len() != 4) {
            return Err("Color must be in hex format (#RRGGBB or #RGB)".to_string());
        }
        Ok(())
    }
}

/// Draft body for `POST categories/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub icon: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category_defaults() {
        let category = Category::new(1, "Work").unwrap();
        assert_eq!(category.color, "#3B82F6");
    }

    #[test]
    fn test_validate_rejects_bad_color() {
        let mut category = Category::new(1, "Work").unwrap();
        category.color = "blue".to_string();
        assert!(category.validate().unwrap_err().contains("hex format"));
    }

    #[test]
    fn test_validate_accepts_short_hex() {
        let mut category = Category::new(1, "Work").unwrap();
        category.color = "#F57".to_string();
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Category::new(1, "  ").is_err());
    }
}
