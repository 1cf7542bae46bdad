//! DTOs used by the category screens.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::option::SelectOption;
use crate::dto::{FormMode, ListPageData};
use crate::forms::FieldErrors;
use crate::forms::categories::CategoryForm;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub parent: Option<String>,
    pub is_active: bool,
    pub order: i32,
}

impl CategoryRow {
    pub fn new(category: Category, names: &HashMap<String, String>) -> Self {
        let parent = category.parent.as_ref().and_then(|parent| {
            parent
                .name()
                .map(str::to_string)
                .or_else(|| names.get(parent.id().as_str()).cloned())
        });

        Self {
            id: category.id.to_string(),
            name: category.name,
            slug: category.slug,
            parent,
            is_active: category.is_active,
            order: category.order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesPageData {
    pub list: ListPageData<CategoryRow>,
    pub parents: Vec<SelectOption>,
}

#[derive(Debug, Serialize)]
pub struct CategoryFormData {
    pub mode: FormMode,
    pub form: CategoryForm,
    /// Top-level categories, excluding the one being edited.
    pub parents: Vec<SelectOption>,
    pub errors: FieldErrors,
}
