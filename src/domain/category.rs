use serde::{Deserialize, Serialize};

use crate::domain::option::SelectOption;
use crate::domain::types::{CategoryId, CategoryName, Slug};
use crate::domain::wallpaper::CategoryRef;

fn default_active() -> bool {
    true
}

/// Catalog category; `parent` is `None` for top-level entries.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub parent: Option<CategoryRef>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub order: i32,
}

impl Category {
    pub fn parent_id(&self) -> Option<&CategoryId> {
        self.parent.as_ref().map(CategoryRef::id)
    }

    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

impl From<&Category> for SelectOption {
    fn from(category: &Category) -> Self {
        SelectOption::new(category.id.as_str(), category.name.as_str())
    }
}

/// JSON body for `POST /categories` and `PATCH /categories/:id`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: CategoryName,
    pub slug: Slug,
    pub parent: Option<CategoryId>,
    pub is_active: bool,
    pub order: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_missing_flags() {
        let category: Category =
            serde_json::from_str(r#"{"_id": "c1", "name": "Nature", "parent": null}"#).unwrap();
        assert!(category.is_active);
        assert_eq!(category.order, 0);
        assert!(category.is_top_level());
    }

    #[test]
    fn category_parent_accepts_populated_reference() {
        let category: Category = serde_json::from_str(
            r#"{"_id": "c2", "name": "Forest", "parent": {"_id": "c1", "name": "Nature"}}"#,
        )
        .unwrap();
        assert_eq!(category.parent_id().map(CategoryId::as_str), Some("c1"));
    }

    #[test]
    fn payload_serializes_camel_case() {
        let payload = CategoryPayload {
            name: CategoryName::new("Forest").unwrap(),
            slug: Slug::new("forest").unwrap(),
            parent: Some(CategoryId::new("c1").unwrap()),
            is_active: false,
            order: 3,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["isActive"], false);
        assert_eq!(value["parent"], "c1");
        assert_eq!(value["slug"], "forest");
    }
}
