//! DTOs used by the wallpaper screens.

use std::collections::HashMap;

use serde::Serialize;

use crate::components::category_picker::{CategorySelects, CategoryTree};
use crate::components::searchable_select::SelectView;
use crate::components::upload_queue::{UploadEntry, UploadSummary};
use crate::domain::option::SelectOption;
use crate::domain::wallpaper::{Wallpaper, WallpaperFormat, WallpaperStatus};
use crate::dto::{FormMode, ListPageData};
use crate::forms::FieldErrors;
use crate::forms::wallpapers::WallpaperFields;

/// Table row of the wallpaper list.
#[derive(Debug, Clone, Serialize)]
pub struct WallpaperRow {
    pub id: String,
    pub title: String,
    pub preview: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub format: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
}

impl WallpaperRow {
    /// Builds the row; ids that came back unpopulated are named through
    /// `category_names`.
    pub fn new(wallpaper: Wallpaper, category_names: &HashMap<String, String>) -> Self {
        let category = wallpaper.category.as_ref().and_then(|category| {
            category
                .name()
                .map(str::to_string)
                .or_else(|| category_names.get(category.id().as_str()).cloned())
        });

        Self {
            id: wallpaper.id.to_string(),
            preview: wallpaper.thumbnail.unwrap_or(wallpaper.image),
            title: wallpaper.title,
            category,
            tags: wallpaper.tags,
            format: wallpaper.format.map(|f| f.to_string()),
            status: wallpaper.status.to_string(),
            created_at: wallpaper
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WallpapersPageData {
    pub list: ListPageData<WallpaperRow>,
    pub categories: Vec<SelectOption>,
    pub statuses: Vec<&'static str>,
}

/// Data of the create and edit screens.
#[derive(Debug, Serialize)]
pub struct WallpaperFormData {
    pub mode: FormMode,
    pub fields: WallpaperFields,
    pub parent_select: SelectView,
    /// Lists the children of the selected parent.
    pub child_select: SelectView,
    pub formats: Vec<&'static str>,
    pub statuses: Vec<&'static str>,
    pub errors: FieldErrors,
    /// Current image in edit mode.
    pub preview: Option<String>,
}

impl WallpaperFormData {
    pub fn new(mode: FormMode, fields: WallpaperFields) -> Self {
        let CategorySelects { parent, child, .. } = CategoryTree::default().selects("", "");
        Self {
            mode,
            fields,
            parent_select: parent,
            child_select: child,
            formats: WallpaperFormat::ALL.iter().map(|f| f.as_str()).collect(),
            statuses: WallpaperStatus::ALL.iter().map(|s| s.as_str()).collect(),
            errors: FieldErrors::new(),
            preview: None,
        }
    }

    /// Renders the category pair of `fields` against `tree`.
    pub fn with_categories(mut self, tree: &CategoryTree) -> Self {
        let selects = tree.selects(&self.fields.parent_category, &self.fields.child_category);
        self.parent_select = selects.parent;
        self.child_select = selects.child;
        self
    }
}

/// Per-file outcome of a batch upload.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub entries: Vec<UploadEntry>,
    pub summary: UploadSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_names_unpopulated_category() {
        let wallpaper: Wallpaper = serde_json::from_str(
            r#"{"_id": "w1", "title": "Dune", "image": "full.jpg", "category": "c1", "format": "png"}"#,
        )
        .unwrap();
        let names = HashMap::from([("c1".to_string(), "Desert".to_string())]);

        let row = WallpaperRow::new(wallpaper, &names);
        assert_eq!(row.category.as_deref(), Some("Desert"));
        assert_eq!(row.preview, "full.jpg");
        assert_eq!(row.format.as_deref(), Some("png"));
        assert_eq!(row.status, "active");
    }
}
