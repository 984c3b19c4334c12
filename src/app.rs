//! Application state management.
//!
//! Composes the catalog view (displayed list, selection, sort menu) and the
//! search control (query input) around a single `CatalogStore`.

use crate::article::ArticleView;
use crate::catalog::{CatalogItem, CatalogSource};
use crate::requests::{FetchOutcome, RequestRunner};
use crate::session::Session;
use crate::store::{CatalogStore, ListStatus, RequestKind};
use std::cmp;
use tracing::info;

/// Current UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Normal list view
    List,
    /// Typing into the search bar
    Search,
    /// Sort options menu is open
    SortMenu,
    /// Reading a news article
    Article,
}

/// Entries of the sort options menu.
///
/// Presentation only: choosing one does not reorder or refetch anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOption {
    Popularity,
    Latest,
    PriceLowHigh,
    PriceHighLow,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Popularity,
        SortOption::Latest,
        SortOption::PriceLowHigh,
        SortOption::PriceHighLow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Popularity => "popularity",
            SortOption::Latest => "Latest",
            SortOption::PriceLowHigh => "Price: Low-High",
            SortOption::PriceHighLow => "Price: High-Low",
        }
    }
}

/// Open/closed state of the sort options menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortMenu {
    pub open: bool,
    /// Highlighted entry in `SortOption::ALL`
    pub highlighted: usize,
}

/// Main application state.
///
/// Owns the catalog store and the request runner; every change to the
/// displayed list goes through a ticket issued by the store.
pub struct App<S: CatalogSource> {
    /// Single source of truth for the displayed list
    pub store: CatalogStore,
    /// Background fetches
    pub runner: RequestRunner<S>,
    /// Currently selected card index
    pub selected_index: usize,
    /// Search query string
    pub search_query: String,
    /// Sort options menu
    pub sort_menu: SortMenu,
    /// Current UI mode
    pub mode: UiMode,
    /// Status message to display
    pub status_message: Option<String>,
    /// Symbol shown before prices
    pub currency_symbol: String,
    /// Login session
    pub session: Session,
    /// Article page, when one was requested
    pub article: Option<ArticleView>,
}

impl<S: CatalogSource> App<S> {
    /// Create a new application state.
    ///
    /// # Arguments
    /// * `runner` - Request runner bound to the catalog backend
    /// * `currency_symbol` - Symbol shown before prices
    /// * `session` - Login session
    ///
    /// # Returns
    /// * `App` - New application state, showing "loading"
    pub fn new(runner: RequestRunner<S>, currency_symbol: String, session: Session) -> Self {
        Self {
            store: CatalogStore::new(),
            runner,
            selected_index: 0,
            search_query: String::new(),
            sort_menu: SortMenu::default(),
            mode: UiMode::List,
            status_message: None,
            currency_symbol,
            session,
            article: None,
        }
    }

    /// Request the full catalog.
    ///
    /// # Details
    /// Called once on start and again on manual reload. The result replaces
    /// the displayed list only if no newer request was issued meanwhile.
    pub fn initialize(&mut self) {
        let ticket = self.store.begin(RequestKind::Load);
        info!(seq = ticket.seq, "Loading catalog");
        self.runner.spawn_load(ticket);
    }

    /// Handle a new search query.
    ///
    /// # Arguments
    /// * `query` - Full query text after the edit
    ///
    /// # Details
    /// Issues a filtered fetch on every change. Any earlier request, load or
    /// search, loses the right to write the displayed list.
    pub fn on_query_change(&mut self, query: String) {
        self.search_query = query;
        let ticket = self.store.begin(RequestKind::Search);
        info!(seq = ticket.seq, query = %self.search_query, "Searching catalog");
        self.runner.spawn_search(ticket, self.search_query.clone());
    }

    /// Add a character to the search query.
    ///
    /// # Details
    /// Only works in Search mode.
    pub fn add_search_char(&mut self, ch: char) {
        if self.mode == UiMode::Search {
            let mut query = self.search_query.clone();
            query.push(ch);
            self.on_query_change(query);
        }
    }

    /// Remove last character from search query.
    ///
    /// # Details
    /// Only works in Search mode. Does nothing on an empty query.
    pub fn remove_search_char(&mut self) {
        if self.mode == UiMode::Search && !self.search_query.is_empty() {
            let mut query = self.search_query.clone();
            query.pop();
            self.on_query_change(query);
        }
    }

    /// Clear search query.
    ///
    /// # Details
    /// Only searches again if there was a query to clear.
    pub fn clear_search(&mut self) {
        if !self.search_query.is_empty() {
            self.on_query_change(String::new());
        }
    }

    /// Apply one finished request to the store.
    ///
    /// # Returns
    /// * `bool` - True if the displayed list changed
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> bool {
        let kind = outcome.ticket.kind;
        if !self.store.apply(outcome.ticket, outcome.result) {
            return false;
        }

        self.selected_index = cmp::min(
            self.selected_index,
            self.store.items().len().saturating_sub(1),
        );
        let status = match (kind, self.store.status()) {
            (_, ListStatus::Failed(message)) => message.to_string(),
            (RequestKind::Load, _) => format!("Loaded {} trees", self.store.items().len()),
            (RequestKind::Search, _) => format!(
                "{} trees match \"{}\"",
                self.store.items().len(),
                self.search_query
            ),
        };
        self.set_status(status);
        true
    }

    /// Apply every outcome that has already arrived.
    ///
    /// # Returns
    /// * `bool` - True if the displayed list changed
    pub fn drain_outcomes(&mut self) -> bool {
        let mut changed = false;
        while let Some(outcome) = self.runner.try_next() {
            changed |= self.apply_outcome(outcome);
        }
        changed
    }

    /// Open or close the sort options menu.
    ///
    /// # Details
    /// Local state only: no request is issued and the list is not reordered.
    pub fn toggle_sort_menu(&mut self) {
        self.sort_menu.open = !self.sort_menu.open;
        self.mode = if self.sort_menu.open {
            UiMode::SortMenu
        } else {
            UiMode::List
        };
    }

    /// Move the sort menu highlight, wrapping around.
    pub fn move_sort_highlight(&mut self, down: bool) {
        let len = SortOption::ALL.len();
        self.sort_menu.highlighted = if down {
            (self.sort_menu.highlighted + 1) % len
        } else {
            (self.sort_menu.highlighted + len - 1) % len
        };
    }

    /// Move selection up.
    ///
    /// # Details
    /// Decrements selected index, wrapping to bottom if at top.
    pub fn move_up(&mut self) {
        let len = self.store.items().len();
        if len == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = len - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Move selection down.
    ///
    /// # Details
    /// Increments selected index, wrapping to top if at bottom.
    pub fn move_down(&mut self) {
        let len = self.store.items().len();
        if len == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % len;
    }

    /// Get the currently selected item.
    ///
    /// # Returns
    /// * `Option<&CatalogItem>` - Selected item or None if the list is empty
    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.store.items().get(self.selected_index)
    }

    /// Show the article page in its loading state.
    pub fn open_article(&mut self) {
        self.article = Some(ArticleView::Loading);
        self.mode = UiMode::Article;
    }

    /// Leave the article page and go back to the catalog.
    pub fn close_article(&mut self) {
        self.article = None;
        self.mode = UiMode::List;
    }

    /// Set status message.
    ///
    /// # Arguments
    /// * `message` - Status message to display
    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testing::{FakeCatalog, item};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn create_test_app(fake: &Arc<FakeCatalog>) -> App<FakeCatalog> {
        let runner = RequestRunner::new(Arc::clone(fake), Duration::ZERO);
        App::new(runner, "€".to_string(), Session::default())
    }

    async fn settle_one(app: &mut App<FakeCatalog>) -> bool {
        let outcome = app.runner.next().await.unwrap();
        app.apply_outcome(outcome)
    }

    #[tokio::test]
    async fn test_initial_load_renders_every_item() {
        let fake = Arc::new(FakeCatalog::with_catalog(vec![item("a1", "Oak", "12.50")]));
        let mut app = create_test_app(&fake);
        assert_eq!(app.store.status(), ListStatus::Loading);

        app.initialize();
        assert!(settle_one(&mut app).await);

        let items = app.store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Oak");
        assert_eq!(items[0].format_price(&app.currency_symbol), "€12.50");
        assert_eq!(items[0].detail_route(), "/trees/a1");
        assert_eq!(app.status_message.as_deref(), Some("Loaded 1 trees"));
    }

    #[tokio::test]
    async fn test_initial_load_failure_shows_error() {
        let fake = Arc::new(FakeCatalog::default());
        *fake.catalog.lock().unwrap() = Some(Err(502));
        let mut app = create_test_app(&fake);

        app.initialize();
        settle_one(&mut app).await;

        assert_eq!(app.store.status(), ListStatus::Failed("Failed to load tree data"));
    }

    #[tokio::test]
    async fn test_search_result_replaces_list_exactly() {
        let fake = Arc::new(
            FakeCatalog::with_catalog(vec![item("a", "Ash", "1"), item("b", "Oak", "2")])
                .search_result("oak", Ok(vec![item("b", "Oak", "2")])),
        );
        let mut app = create_test_app(&fake);
        app.initialize();
        settle_one(&mut app).await;

        app.on_query_change("oak".to_string());
        settle_one(&mut app).await;

        assert_eq!(app.store.items(), &[item("b", "Oak", "2")]);
        assert_eq!(app.status_message.as_deref(), Some("1 trees match \"oak\""));
    }

    #[tokio::test]
    async fn test_slow_initial_load_does_not_overwrite_search() {
        let gate = Arc::new(Notify::new());
        let fake = Arc::new(
            FakeCatalog::with_catalog(vec![item("p", "Pine", "5")])
                .gated(Arc::clone(&gate))
                .search_result("oak", Ok(Vec::new())),
        );
        let mut app = create_test_app(&fake);

        app.initialize();
        app.on_query_change("oak".to_string());

        // Search answers first
        assert!(settle_one(&mut app).await);
        assert_eq!(app.store.status(), ListStatus::Empty);

        gate.notify_one();
        assert!(!settle_one(&mut app).await);
        assert_eq!(app.store.status(), ListStatus::Empty);
        assert!(app.store.items().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_uses_display_slot() {
        let fake = Arc::new(
            FakeCatalog::with_catalog(vec![item("a", "Ash", "1")]).search_result("x", Err(500)),
        );
        let mut app = create_test_app(&fake);
        app.initialize();
        settle_one(&mut app).await;

        app.on_query_change("x".to_string());
        settle_one(&mut app).await;

        assert_eq!(app.store.status(), ListStatus::Failed("Failed to search trees"));
        assert_eq!(app.status_message.as_deref(), Some("Failed to search trees"));
    }

    #[tokio::test]
    async fn test_toggling_sort_menu_issues_no_request() {
        let fake = Arc::new(FakeCatalog::with_catalog(vec![item("a", "Ash", "1")]));
        let mut app = create_test_app(&fake);

        app.toggle_sort_menu();
        assert!(app.sort_menu.open);
        assert_eq!(app.mode, UiMode::SortMenu);
        app.move_sort_highlight(true);
        app.toggle_sort_menu();
        assert!(!app.sort_menu.open);
        assert_eq!(app.mode, UiMode::List);

        tokio::task::yield_now().await;
        assert_eq!(fake.calls(), 0);
        assert!(app.runner.try_next().is_none());
        assert_eq!(app.store.status(), ListStatus::Loading);
    }

    #[tokio::test]
    async fn test_typing_searches_with_full_query() {
        let fake = Arc::new(
            FakeCatalog::default()
                .search_result("o", Ok(vec![item("1", "Olive", "1")]))
                .search_result("oa", Ok(Vec::new())),
        );
        let mut app = create_test_app(&fake);
        app.mode = UiMode::Search;

        app.add_search_char('o');
        app.add_search_char('a');
        assert_eq!(app.search_query, "oa");

        assert!(settle_one(&mut app).await);
        assert_eq!(app.store.status(), ListStatus::Empty);
        assert!(!app.store.is_pending());
    }

    #[tokio::test]
    async fn test_search_chars_ignored_outside_search_mode() {
        let fake = Arc::new(FakeCatalog::default());
        let mut app = create_test_app(&fake);

        app.add_search_char('o');
        app.remove_search_char();
        assert!(app.search_query.is_empty());
        tokio::task::yield_now().await;
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_move_selection_wraps() {
        let fake = Arc::new(FakeCatalog::with_catalog(vec![
            item("1", "Ash", "1"),
            item("2", "Elm", "2"),
            item("3", "Oak", "3"),
        ]));
        let mut app = create_test_app(&fake);
        app.initialize();
        settle_one(&mut app).await;
        assert_eq!(app.selected_index, 0);

        app.move_down();
        assert_eq!(app.selected_index, 1);

        app.move_up();
        assert_eq!(app.selected_index, 0);

        app.move_up();
        assert_eq!(app.selected_index, 2);
        assert_eq!(app.selected_item().unwrap().name, "Oak");
    }

    #[tokio::test]
    async fn test_selection_clamped_when_list_shrinks() {
        let fake = Arc::new(
            FakeCatalog::with_catalog(vec![item("1", "Ash", "1"), item("2", "Elm", "2")])
                .search_result("ash", Ok(vec![item("1", "Ash", "1")])),
        );
        let mut app = create_test_app(&fake);
        app.initialize();
        settle_one(&mut app).await;
        app.move_down();

        app.on_query_change("ash".to_string());
        settle_one(&mut app).await;
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_sort_option_labels() {
        let labels: Vec<&str> = SortOption::ALL.iter().map(|o| o.label()).collect();
        assert_eq!(
            labels,
            vec!["popularity", "Latest", "Price: Low-High", "Price: High-Low"]
        );
    }
}
