//! List controllers kept across requests, one set per browser session.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, error, warn};

use crate::components::list_controller::{
    FetchOutcome, ListController, ListState, ListView, QueryParams,
};
use crate::domain::category::Category;
use crate::domain::page::Page;
use crate::domain::user::AppUser;
use crate::domain::wallpaper::Wallpaper;
use crate::repository::errors::{RepositoryError, RepositoryResult};

/// Sessions remembered at once; the least recently seen one is dropped first.
pub const MAX_SESSIONS: usize = 1024;

/// The list screens of one browser session. Locks are only held to start a
/// fetch and to apply its result, never across the backend call.
#[derive(Debug)]
pub struct SessionLists {
    page_size: usize,
    pub wallpapers: Mutex<ListController<Wallpaper>>,
    pub categories: Mutex<ListController<Category>>,
    pub users: Mutex<ListController<AppUser>>,
}

impl SessionLists {
    fn new(page_size: usize) -> Self {
        Self {
            page_size,
            wallpapers: Mutex::new(ListController::new(page_size)),
            categories: Mutex::new(ListController::new(page_size)),
            users: Mutex::new(ListController::new(page_size)),
        }
    }

    /// Page size used when the URL names none.
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[derive(Debug, Default)]
struct Sessions {
    lists: HashMap<String, Arc<SessionLists>>,
    /// Session ids, least recently used first.
    recent: VecDeque<String>,
}

#[derive(Debug)]
pub struct ListRegistry {
    page_size: usize,
    search_delay: Duration,
    capacity: usize,
    sessions: Mutex<Sessions>,
}

impl ListRegistry {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            search_delay: Duration::from_millis(500),
            capacity: MAX_SESSIONS,
            sessions: Mutex::new(Sessions::default()),
        }
    }

    /// Delay the search boxes wait for typing to settle before reloading.
    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_delay(&self) -> Duration {
        self.search_delay
    }

    pub fn search_delay_ms(&self) -> u64 {
        u64::try_from(self.search_delay.as_millis()).unwrap_or(u64::MAX)
    }

    /// Controllers of `session_id`, created on first use.
    pub fn session(&self, session_id: &str) -> Arc<SessionLists> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(lists) = sessions.lists.get(session_id).cloned() {
            if let Some(pos) = sessions.recent.iter().position(|id| id == session_id) {
                sessions.recent.remove(pos);
            }
            sessions.recent.push_back(session_id.to_string());
            return lists;
        }

        while sessions.lists.len() >= self.capacity {
            let Some(oldest) = sessions.recent.pop_front() else {
                break;
            };
            debug!("Dropping list state of session {oldest}");
            sessions.lists.remove(&oldest);
        }

        let lists = Arc::new(SessionLists::new(self.page_size));
        sessions
            .lists
            .insert(session_id.to_string(), Arc::clone(&lists));
        sessions.recent.push_back(session_id.to_string());
        lists
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lists
            .len()
    }
}

impl Default for ListRegistry {
    fn default() -> Self {
        Self::new(crate::components::list_controller::DEFAULT_PAGE_SIZE)
    }
}

pub(crate) fn lock<T>(list: &Mutex<ListController<T>>) -> MutexGuard<'_, ListController<T>> {
    list.lock().unwrap_or_else(|e| e.into_inner())
}

/// Outcome of loading one list page.
#[derive(Debug)]
pub struct LoadedList<T> {
    pub state: ListState,
    pub view: ListView<T>,
    pub error: Option<RepositoryError>,
}

fn view_from_page<T>(page: Page<T>) -> ListView<T> {
    ListView {
        rows: page.items,
        total: page.total,
        page_count: i64::try_from(page.total_pages).unwrap_or(i64::MAX),
        loading: false,
        stale: false,
    }
}

/// Moves the controller to `state`, fetches the page and applies the result
/// last-request-wins. A request overtaken by a newer one still renders its own
/// page; a failed request renders the last good rows marked stale.
pub async fn load_list<T, F, Fut>(
    list: &Mutex<ListController<T>>,
    state: ListState,
    fetch: F,
) -> LoadedList<T>
where
    T: Clone,
    F: FnOnce(QueryParams) -> Fut,
    Fut: Future<Output = RepositoryResult<Page<T>>>,
{
    let (ticket, state) = {
        let mut controller = lock(list);
        controller.navigate(state);
        (controller.begin_fetch(), controller.state().clone())
    };

    let result = fetch(ticket.params.clone()).await;

    let mut controller = lock(list);
    if !controller.is_latest(&ticket) {
        warn!("Discarding superseded list result for {:?}", ticket.params);
        return match result {
            Ok(page) => LoadedList {
                state,
                view: view_from_page(page),
                error: None,
            },
            Err(err) => {
                error!("Failed to load list page: {err}");
                let mut view = controller.view().clone();
                view.loading = false;
                view.stale = view.is_loaded();
                LoadedList {
                    state,
                    view,
                    error: Some(err),
                }
            }
        };
    }

    match controller.apply(ticket, result) {
        FetchOutcome::Applied => LoadedList {
            state,
            view: controller.view().clone(),
            error: None,
        },
        FetchOutcome::Failed(err) => {
            error!("Failed to load list page: {err}");
            LoadedList {
                state,
                view: controller.view().clone(),
                error: Some(err),
            }
        }
        FetchOutcome::Discarded => LoadedList {
            state,
            view: controller.view().clone(),
            error: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<&'static str>) -> Page<&'static str> {
        Page {
            total: items.len(),
            total_pages: 1,
            items,
        }
    }

    #[tokio::test]
    async fn applied_result_is_rendered() {
        let list = Mutex::new(ListController::new(10));
        let state = ListState::from_url_query("page=2&limit=10", &[], 10);

        let loaded = load_list(&list, state, |params| async move {
            assert_eq!(params.page, 2);
            assert_eq!(params.limit, 10);
            Ok(page(vec!["a", "b"]))
        })
        .await;

        assert_eq!(loaded.view.rows, vec!["a", "b"]);
        assert!(loaded.error.is_none());
        assert_eq!(lock(&list).view().rows, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn failure_renders_last_good_rows_as_stale() {
        let list = Mutex::new(ListController::new(10));
        load_list(&list, ListState::new(10), |_| async { Ok(page(vec!["kept"])) }).await;

        let loaded = load_list(&list, ListState::new(10), |_| async {
            Err(RepositoryError::Transport("connection refused".to_string()))
        })
        .await;

        assert_eq!(loaded.view.rows, vec!["kept"]);
        assert!(loaded.view.stale);
        assert!(matches!(loaded.error, Some(RepositoryError::Transport(_))));
    }

    #[tokio::test]
    async fn overtaken_request_keeps_newer_controller_state() {
        let list = Mutex::new(ListController::new(10));

        let loaded = load_list(&list, ListState::new(10), |_| {
            // A second request starts while the first is in flight.
            let ticket = lock(&list).begin_fetch();
            let applied = lock(&list).apply::<RepositoryError>(ticket, Ok(page(vec!["newer"])));
            assert!(matches!(applied, FetchOutcome::Applied));
            async { Ok(page(vec!["older"])) }
        })
        .await;

        assert_eq!(loaded.view.rows, vec!["older"]);
        assert_eq!(lock(&list).view().rows, vec!["newer"]);
    }

    #[tokio::test]
    async fn overtaken_failure_renders_newer_rows_as_stale() {
        let list = Mutex::new(ListController::new(10));

        let loaded = load_list(&list, ListState::new(10), |_| {
            let ticket = lock(&list).begin_fetch();
            lock(&list).apply::<RepositoryError>(ticket, Ok(page(vec!["newer"])));
            async { Err(RepositoryError::Transport("timed out".to_string())) }
        })
        .await;

        assert_eq!(loaded.view.rows, vec!["newer"]);
        assert!(loaded.view.stale);
        assert!(!loaded.view.loading);
        assert!(loaded.view.is_loaded());
        assert!(loaded.error.is_some());
    }

    #[tokio::test]
    async fn sessions_do_not_share_list_state() {
        let registry = ListRegistry::new(10);
        let alice = registry.session("alice");
        let bob = registry.session("bob");

        load_list(
            &alice.wallpapers,
            ListState::from_url_query("page=3&search=sea", &[], 10),
            |_| async { Ok(Page::single(Vec::new())) },
        )
        .await;

        assert_eq!(lock(&alice.wallpapers).query_params().page, 3);
        assert_eq!(lock(&bob.wallpapers).query_params().page, 1);
        assert!(Arc::ptr_eq(&alice, &registry.session("alice")));
        assert_eq!(registry.session_count(), 2);
    }

    #[test]
    fn least_recently_seen_session_is_dropped_at_capacity() {
        let registry = ListRegistry::new(10).with_capacity(2);
        let first = registry.session("a");
        registry.session("b");
        registry.session("a");
        registry.session("c");

        assert_eq!(registry.session_count(), 2);
        assert!(Arc::ptr_eq(&first, &registry.session("a")));
        assert_eq!(registry.session_count(), 2, "b was evicted, a kept");
    }
}
