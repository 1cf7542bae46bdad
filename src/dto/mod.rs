//! DTO modules that bridge services with templates and the JSON API.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::components::list_controller::{ListState, ListView, PAGE_SIZES};
use crate::pagination::Pager;

pub mod categories;
pub mod users;
pub mod wallpapers;

/// Create when the route carries no id, edit otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit(String),
}

impl FormMode {
    pub fn from_route(id: Option<&str>) -> Self {
        match id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => FormMode::Edit(id.to_string()),
            None => FormMode::Create,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, FormMode::Edit(_))
    }
}

/// Table, pager and toolbar state of a list screen.
#[derive(Debug, Serialize)]
pub struct ListPageData<T> {
    pub rows: Vec<T>,
    pub total: usize,
    /// `-1` until a page was loaded.
    pub page_count: i64,
    pub stale: bool,
    pub pager: Pager,
    pub search: String,
    pub filters: BTreeMap<String, String>,
    pub page_size: usize,
    pub page_sizes: [usize; 4],
    /// Current URL query, carried by forms that return to this list.
    pub query: String,
    /// Fetch failure to show inline; the rows above are the last good page.
    pub error: Option<String>,
}

impl<T> ListPageData<T> {
    pub fn new<S>(
        base_path: &str,
        state: &ListState,
        view: ListView<S>,
        error: Option<String>,
        row: impl Fn(S) -> T,
    ) -> Self {
        Self {
            rows: view.rows.into_iter().map(row).collect(),
            total: view.total,
            page_count: view.page_count,
            stale: view.stale,
            pager: Pager::new(base_path, state, view.page_count),
            search: state.debounced_search.clone(),
            filters: state.column_filters.clone(),
            page_size: state.pagination.page_size,
            page_sizes: PAGE_SIZES,
            query: state.to_url_query(),
            error,
        }
    }
}

/// Confirmation step shown before any delete.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmData {
    pub title: String,
    pub message: String,
    /// Form target receiving `confirm=yes`.
    pub action: String,
    pub ids: Vec<String>,
    /// Where "cancel" leads.
    pub back: String,
}

/// Result of deleting several rows one request at a time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkDeleteReport {
    pub deleted: usize,
    pub failed: Vec<(String, String)>,
}
