//! Paginated list state machine.
//!
//! [`ListState`] holds what the user controls (pagination, column filters,
//! search) and mirrors it into the URL query string. [`ListController`] adds
//! the fetch bookkeeping: it derives [`QueryParams`], tags every request with
//! a generation and applies results last-request-wins.
//!
//! Search text is debounced in the browser; it reaches the controller already
//! settled.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::page::Page;

/// Page sizes offered by list screens; `limit` values outside this set are
/// snapped to the nearest allowed size.
pub const PAGE_SIZES: [usize; 4] = [10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// `page_count` value meaning "not loaded yet".
pub const PAGE_COUNT_UNKNOWN: i64 = -1;

const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";
const SEARCH_PARAM: &str = "search";

/// Largest `page` accepted from a URL; anything above falls back to page 1.
pub const MAX_PAGE: usize = u32::MAX as usize;

/// Snaps `size` to the closest allowed page size.
pub fn clamp_page_size(size: usize) -> usize {
    PAGE_SIZES
        .iter()
        .copied()
        .min_by_key(|allowed| allowed.abs_diff(size))
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: clamp_page_size(page_size),
        }
    }

    /// One-based page number as used in URLs and by the backend.
    pub fn page(&self) -> usize {
        self.page_index + 1
    }
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl QueryParams {
    pub fn filter(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }
}

/// User-controlled list state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    pub pagination: PaginationState,
    pub column_filters: BTreeMap<String, String>,
    /// Raw search input, possibly still being typed.
    pub global_filter: String,
    /// Search text that already passed the debounce delay.
    pub debounced_search: String,
}

impl ListState {
    pub fn new(page_size: usize) -> Self {
        Self {
            pagination: PaginationState::new(0, page_size),
            ..Default::default()
        }
    }

    /// Restores state from a URL query string. `filter_keys` names the column
    /// filters the list understands; other keys are ignored. Missing or
    /// invalid `page`/`limit` fall back to the first page and `default_size`.
    pub fn from_url_query(raw: &str, filter_keys: &[&str], default_size: usize) -> Self {
        let pairs: Vec<(String, String)> = serde_html_form::from_str(raw).unwrap_or_default();

        let mut state = Self::new(default_size);
        for (key, value) in pairs {
            let value = value.trim().to_string();
            match key.as_str() {
                PAGE_PARAM => {
                    if let Ok(page @ 0..=MAX_PAGE) = value.parse::<usize>() {
                        state.pagination.page_index = page.saturating_sub(1);
                    }
                }
                LIMIT_PARAM => {
                    if let Ok(limit) = value.parse::<usize>() {
                        state.pagination.page_size = clamp_page_size(limit);
                    }
                }
                SEARCH_PARAM => {
                    state.global_filter = value.clone();
                    state.debounced_search = value;
                }
                other if filter_keys.contains(&other) && !value.is_empty() => {
                    state.column_filters.insert(key, value);
                }
                _ => {}
            }
        }

        state
    }

    /// URL query mirroring this state: `page` (one-based) and `limit` always,
    /// search and column filters only when set.
    pub fn to_url_query(&self) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            (PAGE_PARAM, self.pagination.page().to_string()),
            (LIMIT_PARAM, self.pagination.page_size.to_string()),
        ];
        if !self.debounced_search.is_empty() {
            pairs.push((SEARCH_PARAM, self.debounced_search.clone()));
        }
        for (key, value) in &self.column_filters {
            pairs.push((key.as_str(), value.clone()));
        }
        serde_html_form::to_string(&pairs).unwrap_or_default()
    }

    /// URL query of the same list at another page.
    pub fn url_for_page(&self, page_index: usize) -> String {
        let mut state = self.clone();
        state.pagination.page_index = page_index;
        state.to_url_query()
    }

    pub fn query_params(&self) -> QueryParams {
        let search = self.debounced_search.trim();
        QueryParams {
            page: self.pagination.page(),
            limit: self.pagination.page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
            filters: self.column_filters.clone(),
        }
    }
}

/// Handle of an issued request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub params: QueryParams,
}

/// What happened to a fetch result handed to [`ListController::apply`].
#[derive(Debug, PartialEq, Eq)]
pub enum FetchOutcome<E> {
    Applied,
    /// A newer request was issued; the result was dropped.
    Discarded,
    /// The request failed; previously loaded rows are kept and marked stale.
    Failed(E),
}

/// Rendered state of the table.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<T> {
    pub rows: Vec<T>,
    pub total: usize,
    pub page_count: i64,
    pub loading: bool,
    pub stale: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
            page_count: PAGE_COUNT_UNKNOWN,
            loading: false,
            stale: false,
        }
    }
}

impl<T> ListView<T> {
    pub fn is_loaded(&self) -> bool {
        self.page_count != PAGE_COUNT_UNKNOWN
    }
}

#[derive(Debug)]
pub struct ListController<T> {
    state: ListState,
    generation: u64,
    view: ListView<T>,
}

impl<T: Clone> ListController<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: ListState::new(page_size),
            generation: 0,
            view: ListView::default(),
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn view(&self) -> &ListView<T> {
        &self.view
    }

    /// Moves to the state read from a request URL.
    ///
    /// Before the first fetch the state is taken as is, so a bookmarked URL
    /// opens on its page. Afterwards the fields go through the setters: a
    /// changed page size, column filter or search lands on the first page and
    /// the requested page index only applies when the query stayed the same.
    pub fn navigate(&mut self, target: ListState) {
        if self.generation == 0 {
            self.state = target;
            return;
        }

        let previous = self.state.clone();

        if target.pagination.page_size != previous.pagination.page_size {
            self.set_page_size(target.pagination.page_size);
        }

        let keys: Vec<String> = previous
            .column_filters
            .keys()
            .chain(target.column_filters.keys())
            .cloned()
            .collect();
        for key in keys {
            let value = target.column_filters.get(&key).cloned();
            self.set_column_filter(key, value);
        }

        self.set_global_filter(target.global_filter);
        self.apply_debounced_search(target.debounced_search);

        let same_query = previous.pagination.page_size == self.state.pagination.page_size
            && previous.column_filters == self.state.column_filters
            && previous.debounced_search == self.state.debounced_search;
        if same_query {
            self.set_page_index(target.pagination.page_index);
        }
    }

    pub fn set_page_index(&mut self, page_index: usize) {
        self.state.pagination.page_index = page_index;
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.state.pagination = PaginationState::new(0, page_size);
    }

    /// Records raw search input; it only affects the query once debounced.
    pub fn set_global_filter(&mut self, text: impl Into<String>) {
        self.state.global_filter = text.into();
    }

    /// Folds settled search text into the query, resetting to the first page
    /// when it changed.
    pub fn apply_debounced_search(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.state.debounced_search != text {
            self.state.debounced_search = text;
            self.state.pagination.page_index = 0;
        }
    }

    /// Sets or clears a column filter, resetting to the first page when it
    /// changed.
    pub fn set_column_filter(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let changed = match &value {
            Some(value) => self.state.column_filters.get(&key) != Some(value),
            None => self.state.column_filters.contains_key(&key),
        };
        if !changed {
            return;
        }
        match value {
            Some(value) => {
                self.state.column_filters.insert(key, value);
            }
            None => {
                self.state.column_filters.remove(&key);
            }
        }
        self.state.pagination.page_index = 0;
    }

    pub fn query_params(&self) -> QueryParams {
        self.state.query_params()
    }

    /// Issues a new request ticket; any earlier outstanding ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        let params = self.query_params();
        self.view.loading = true;
        FetchTicket {
            generation: self.generation,
            params,
        }
    }

    pub fn is_latest(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn apply<E>(&mut self, ticket: FetchTicket, result: Result<Page<T>, E>) -> FetchOutcome<E> {
        if !self.is_latest(&ticket) {
            return FetchOutcome::Discarded;
        }

        self.view.loading = false;
        match result {
            Ok(page) => {
                self.view.rows = page.items;
                self.view.total = page.total;
                self.view.page_count = i64::try_from(page.total_pages).unwrap_or(i64::MAX);
                self.view.stale = false;
                FetchOutcome::Applied
            }
            Err(err) => {
                self.view.stale = self.view.is_loaded();
                FetchOutcome::Failed(err)
            }
        }
    }
}
