//! Typeahead dropdown model.
//!
//! The select is bound to a `(value, on_change)` pair: it only reports the
//! chosen id through the callback and never owns the selection beyond what the
//! caller passes back in via [`SearchableSelect::set_value`]. Pointer handling
//! (outside clicks) stays in the browser; the server renders [`SelectView`].

use serde::Serialize;

use crate::domain::option::SelectOption;

const DEFAULT_PLACEHOLDER: &str = "Select...";
const DEFAULT_NO_MATCHES_LABEL: &str = "No matches found";

/// Returns the options whose name contains `query`, ignoring case, in their
/// original order.
pub fn filter_options<'a>(options: &'a [SelectOption], query: &str) -> Vec<&'a SelectOption> {
    let needle = query.to_lowercase();
    options
        .iter()
        .filter(|option| option.name.to_lowercase().contains(&needle))
        .collect()
}

/// Dropdown body: either the matching options or the "no matches" placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum FilteredOptions {
    Matches(Vec<SelectOption>),
    NoMatches,
}

/// Snapshot handed to templates and to the typeahead endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectView {
    pub label: String,
    pub placeholder: String,
    pub value: Option<String>,
    pub open: bool,
    pub disabled: bool,
    pub filter: String,
    pub no_matches_label: String,
    pub options: FilteredOptions,
}

type ChangeCallback<'a> = Box<dyn FnMut(&str) + 'a>;

pub struct SearchableSelect<'a> {
    options: Vec<SelectOption>,
    value: Option<String>,
    placeholder: String,
    no_matches_label: String,
    disabled: bool,
    open: bool,
    filter: String,
    on_change: Option<ChangeCallback<'a>>,
}

impl std::fmt::Debug for SearchableSelect<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchableSelect")
            .field("options", &self.options.len())
            .field("value", &self.value)
            .field("open", &self.open)
            .field("filter", &self.filter)
            .field("disabled", &self.disabled)
            .finish()
    }
}

impl<'a> SearchableSelect<'a> {
    pub fn new(options: Vec<SelectOption>) -> Self {
        Self {
            options,
            value: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            no_matches_label: DEFAULT_NO_MATCHES_LABEL.to_string(),
            disabled: false,
            open: false,
            filter: String::new(),
            on_change: None,
        }
    }

    pub fn value(mut self, value: Option<impl Into<String>>) -> Self {
        self.value = value.map(Into::into);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn on_change(mut self, callback: impl FnMut(&str) + 'a) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Opens the dropdown unless the select is disabled.
    pub fn open(&mut self) {
        if !self.disabled {
            self.open = true;
        }
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
    }

    /// Option currently bound to `value`, if it is part of `options`.
    pub fn selected(&self) -> Option<&SelectOption> {
        let value = self.value.as_deref()?;
        self.options.iter().find(|option| option.id == value)
    }

    /// Text shown on the trigger button.
    pub fn label(&self) -> &str {
        self.selected()
            .map(|option| option.name.as_str())
            .unwrap_or(self.placeholder.as_str())
    }

    pub fn filtered(&self) -> FilteredOptions {
        let matches = filter_options(&self.options, &self.filter);
        if matches.is_empty() {
            FilteredOptions::NoMatches
        } else {
            FilteredOptions::Matches(matches.into_iter().cloned().collect())
        }
    }

    /// Reports `id` through `on_change`, closes the dropdown and clears the
    /// filter. Unknown ids are ignored and `false` is returned.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.options.iter().any(|option| option.id == id) {
            return false;
        }

        if let Some(callback) = self.on_change.as_mut() {
            callback(id);
        }
        self.open = false;
        self.filter.clear();
        true
    }

    pub fn view(&self) -> SelectView {
        SelectView {
            label: self.label().to_string(),
            placeholder: self.placeholder.clone(),
            value: self.value.clone(),
            open: self.open,
            disabled: self.disabled,
            filter: self.filter.clone(),
            no_matches_label: self.no_matches_label.clone(),
            options: self.filtered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("1", "Nature"),
            SelectOption::new("2", "Cars"),
            SelectOption::new("3", "Abstract Art"),
            SelectOption::new("4", "Night City"),
        ]
    }

    #[test]
    fn filter_matches_case_insensitive_substrings() {
        let options = options();
        for query in ["", "n", "NAT", "art", "city", "zzz", " "] {
            let expected: Vec<&SelectOption> = options
                .iter()
                .filter(|o| o.name.to_lowercase().contains(&query.to_lowercase()))
                .collect();
            assert_eq!(filter_options(&options, query), expected, "query {query:?}");
        }

        let names: Vec<_> = filter_options(&options, "AR")
            .into_iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["Cars", "Abstract Art"]);
    }

    #[test]
    fn empty_result_yields_no_matches_placeholder() {
        let mut select = SearchableSelect::new(options());
        select.set_filter("volcano");
        assert_eq!(select.filtered(), FilteredOptions::NoMatches);
        assert_eq!(select.view().no_matches_label, "No matches found");
    }

    #[test]
    fn label_shows_selection_or_placeholder() {
        let select = SearchableSelect::new(options()).placeholder("Pick one");
        assert_eq!(select.label(), "Pick one");

        let select = SearchableSelect::new(options()).value(Some("2"));
        assert_eq!(select.label(), "Cars");

        let select = SearchableSelect::new(options()).value(Some("99"));
        assert_eq!(select.label(), "Select...");
    }

    #[test]
    fn disabled_select_does_not_open() {
        let mut select = SearchableSelect::new(options()).disabled(true);
        select.open();
        assert!(!select.view().open);
    }

    #[test]
    fn select_reports_closes_and_clears_filter() {
        let mut chosen = Vec::new();
        let mut select =
            SearchableSelect::new(options()).on_change(|id| chosen.push(id.to_string()));

        select.open();
        select.set_filter("night");
        assert!(select.select("4"));

        let view = select.view();
        assert!(!view.open);
        assert_eq!(view.filter, "");
        drop(select);
        assert_eq!(chosen, vec!["4".to_string()]);
    }

    #[test]
    fn selecting_unknown_id_is_ignored() {
        let mut calls = 0;
        let mut select = SearchableSelect::new(options()).on_change(|_| calls += 1);
        select.open();
        assert!(!select.select("99"));
        assert!(select.view().open);
        drop(select);
        assert_eq!(calls, 0);
    }
}
