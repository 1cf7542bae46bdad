//! Typeahead option lookups.

use crate::components::category_picker::CategoryTree;
use crate::components::searchable_select::{SearchableSelect, SelectView};
use crate::domain::types::CategoryId;
use crate::repository::{CategoryListQuery, CategoryReader};
use crate::services::ServiceResult;

/// Open category select filtered by `q`. Without `parent` it offers the
/// top-level categories, otherwise the children of `parent`. `selected` is the
/// id currently chosen in the browser.
pub async fn category_select<R>(
    repo: &R,
    q: &str,
    parent: Option<&str>,
    selected: Option<&str>,
) -> ServiceResult<SelectView>
where
    R: CategoryReader + ?Sized,
{
    let page = repo.list_categories(CategoryListQuery::active()).await?;
    let tree = CategoryTree::new(page.items);

    let select = match parent.map(str::trim).filter(|p| !p.is_empty()) {
        Some(parent) => {
            SearchableSelect::new(tree.child_options(&CategoryId::new(parent)?)).placeholder("None")
        }
        None => SearchableSelect::new(tree.parent_options()).placeholder("Choose a category"),
    };
    let mut select = select.value(selected.filter(|id| !id.is_empty()));
    select.set_filter(q.trim());
    select.open();

    Ok(select.view())
}
