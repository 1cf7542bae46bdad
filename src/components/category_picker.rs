//! Two-tier (parent, child) category selection.

use std::cell::RefCell;

use crate::components::searchable_select::{SearchableSelect, SelectView};
use crate::domain::category::Category;
use crate::domain::option::SelectOption;
use crate::domain::types::CategoryId;

/// Categories split into top-level parents and their direct children.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: Vec<Category>,
}

impl CategoryTree {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn parents(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_top_level())
    }

    pub fn children_of<'a>(&'a self, parent: &'a CategoryId) -> impl Iterator<Item = &'a Category> {
        self.categories
            .iter()
            .filter(move |c| c.parent_id() == Some(parent))
    }

    pub fn parent_options(&self) -> Vec<SelectOption> {
        self.parents().map(SelectOption::from).collect()
    }

    pub fn child_options(&self, parent: &CategoryId) -> Vec<SelectOption> {
        self.children_of(parent).map(SelectOption::from).collect()
    }

    /// Every category as a flat option list.
    pub fn options(&self) -> Vec<SelectOption> {
        self.categories.iter().map(SelectOption::from).collect()
    }

    /// Maps a stored category reference back onto the two selects. Only one
    /// level of nesting is recognised: a category whose parent is not
    /// top-level resolves to an empty selection.
    pub fn resolve(&self, id: &CategoryId) -> CategorySelection {
        let Some(category) = self.get(id) else {
            return CategorySelection::default();
        };

        match category.parent_id() {
            None => CategorySelection {
                parent: Some(category.id.clone()),
                child: None,
            },
            Some(parent_id) => match self.get(parent_id) {
                Some(parent) if parent.is_top_level() => CategorySelection {
                    parent: Some(parent.id.clone()),
                    child: Some(category.id.clone()),
                },
                _ => CategorySelection::default(),
            },
        }
    }

    /// Feeds submitted `parent` and `child` ids through the two selects. Ids
    /// the selects do not offer are ignored, so the resulting selection only
    /// holds a top-level parent and one of its direct children.
    pub fn selects(&self, parent: &str, child: &str) -> CategorySelects {
        let selection = RefCell::new(CategorySelection::default());

        let mut parent_select = SearchableSelect::new(self.parent_options())
            .placeholder("Choose a category")
            .on_change(|id| {
                selection
                    .borrow_mut()
                    .select_parent(self, CategoryId::new(id).ok());
            });
        parent_select.select(parent);
        parent_select.set_value(selection.borrow().parent.as_ref().map(ToString::to_string));

        let children = selection
            .borrow()
            .parent
            .as_ref()
            .map(|parent| self.child_options(parent))
            .unwrap_or_default();
        let mut child_select = SearchableSelect::new(children)
            .placeholder("None")
            .disabled(selection.borrow().parent.is_none())
            .on_change(|id| {
                selection
                    .borrow_mut()
                    .select_child(self, CategoryId::new(id).ok());
            });
        child_select.select(child);
        child_select.set_value(selection.borrow().child.as_ref().map(ToString::to_string));

        let parent_view = parent_select.view();
        let child_view = child_select.view();
        let chosen = selection.borrow().clone();
        CategorySelects {
            selection: chosen,
            parent: parent_view,
            child: child_view,
        }
    }
}

/// Rendered parent and child selects plus the selection they hold.
#[derive(Debug, Clone)]
pub struct CategorySelects {
    pub selection: CategorySelection,
    pub parent: SelectView,
    pub child: SelectView,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    pub parent: Option<CategoryId>,
    pub child: Option<CategoryId>,
}

impl CategorySelection {
    /// Selects `parent`; the child is kept only if it still belongs to it.
    pub fn select_parent(&mut self, tree: &CategoryTree, parent: Option<CategoryId>) {
        let keep_child = match (&parent, &self.child) {
            (Some(parent), Some(child)) => tree
                .get(child)
                .and_then(Category::parent_id)
                .is_some_and(|p| p == parent),
            _ => false,
        };
        if !keep_child {
            self.child = None;
        }
        self.parent = parent;
    }

    /// Selects `child` when it is a direct child of the current parent.
    /// Returns `false` and leaves the selection untouched otherwise.
    pub fn select_child(&mut self, tree: &CategoryTree, child: Option<CategoryId>) -> bool {
        let Some(child) = child else {
            self.child = None;
            return true;
        };
        let belongs = match (&self.parent, tree.get(&child).and_then(Category::parent_id)) {
            (Some(parent), Some(actual)) => parent == actual,
            _ => false,
        };
        if belongs {
            self.child = Some(child);
        }
        belongs
    }
}
