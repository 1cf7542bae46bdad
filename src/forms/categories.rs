//! Category create/edit form.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::category::{Category, CategoryPayload};
use crate::domain::types::{CategoryId, CategoryName, Slug};
use crate::forms::{FormError, checkbox};

fn validate_order(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().parse::<i32>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("order").with_message("Order must be a whole number".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
/// Form data for creating or editing a category.
pub struct CategoryForm {
    #[validate(length(min = 1, message = "Name is required"))]
    #[serde(default)]
    pub name: String,
    /// Derived from `name` when left blank.
    #[serde(default)]
    pub slug: String,
    /// Parent category id; blank for top-level categories.
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub is_active: Option<String>,
    #[validate(custom(function = "validate_order"))]
    #[serde(default)]
    pub order: String,
}

impl CategoryForm {
    /// Values pre-filled for an existing category.
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent: category
                .parent_id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            is_active: category.is_active.then(|| "on".to_string()),
            order: category.order.to_string(),
        }
    }

    /// Defaults of the create screen.
    pub fn initial() -> Self {
        Self {
            is_active: Some("on".to_string()),
            order: "0".to_string(),
            ..Default::default()
        }
    }
}

impl TryFrom<CategoryForm> for CategoryPayload {
    type Error = FormError;

    fn try_from(form: CategoryForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = CategoryName::new(form.name.as_str()).map_err(|_| FormError::InvalidName)?;
        let slug_source = if form.slug.trim().is_empty() {
            name.as_str()
        } else {
            form.slug.as_str()
        };
        let slug = Slug::new(slug_source).map_err(|_| FormError::InvalidSlug)?;

        let parent = match form.parent.trim() {
            "" => None,
            id => Some(CategoryId::new(id).map_err(|_| FormError::InvalidCategory)?),
        };
        let order = form.order.trim().parse::<i32>().unwrap_or(0);

        Ok(CategoryPayload {
            name,
            slug,
            parent,
            is_active: checkbox(form.is_active.as_deref()),
            order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FieldErrors;

    fn form(name: &str, slug: &str, parent: &str, order: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_string(),
            slug: slug.to_string(),
            parent: parent.to_string(),
            is_active: Some("on".to_string()),
            order: order.to_string(),
        }
    }

    #[test]
    fn slug_is_derived_from_name_when_blank() {
        let payload = CategoryPayload::try_from(form("Night City!", "", "", "")).unwrap();
        assert_eq!(payload.slug.as_str(), "night-city");
        assert_eq!(payload.order, 0);
        assert_eq!(payload.parent, None);
        assert!(payload.is_active);
    }

    #[test]
    fn explicit_slug_and_parent_are_kept() {
        let mut category = form("Forest", " Deep Woods ", "nature", "3");
        category.is_active = None;

        let payload = CategoryPayload::try_from(category).unwrap();
        assert_eq!(payload.slug.as_str(), "deep-woods");
        assert_eq!(payload.parent.as_ref().map(CategoryId::as_str), Some("nature"));
        assert_eq!(payload.order, 3);
        assert!(!payload.is_active);
    }

    #[test]
    fn blank_name_and_bad_order_are_rejected() {
        let err = CategoryPayload::try_from(form("  ", "", "", "first")).unwrap_err();
        let errors = FieldErrors::from(&err);
        assert!(errors.get("order").is_some());
    }

    #[test]
    fn slug_without_alphanumerics_is_rejected() {
        let err = CategoryPayload::try_from(form("Forest", "---", "", "")).unwrap_err();
        assert!(matches!(err, FormError::InvalidSlug));
    }

    #[test]
    fn form_deserializes_urlencoded_body() {
        let form: CategoryForm =
            serde_html_form::from_str("name=Sea&slug=&parent=c1&is_active=on&order=2").unwrap();
        assert_eq!(form.name, "Sea");
        assert_eq!(form.parent, "c1");
        assert_eq!(form.order, "2");
    }
}
