use serde::Serialize;

use crate::components::list_controller::ListState;

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let current_page = current_page.min(last_page);
    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current + 1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One entry of the pager; `page: None` renders as an ellipsis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: Option<usize>,
    pub href: Option<String>,
    pub current: bool,
}

/// Pager state of a list screen. Links keep the list's search and filters.
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub page: usize,
    pub page_count: i64,
    pub links: Vec<PageLink>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Pager {
    pub fn new(base_path: &str, state: &ListState, page_count: i64) -> Self {
        let current_page = state.pagination.page();
        let total_pages = usize::try_from(page_count).unwrap_or(0);
        let href = |page: usize| format!("{base_path}?{}", state.url_for_page(page - 1));

        let links = get_pages(total_pages, current_page, 2, 2, 4, 2)
            .into_iter()
            .map(|page| PageLink {
                page,
                href: page.map(&href),
                current: page == Some(current_page),
            })
            .collect();

        Self {
            page: current_page,
            page_count,
            links,
            prev: (current_page > 1).then(|| href(current_page - 1)),
            next: (current_page < total_pages).then(|| href(current_page + 1)),
        }
    }
}
