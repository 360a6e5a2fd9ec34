//! Application state management for the Pokédex
//!
//! This module contains the main application state, handling keyboard input,
//! navigation between the list and detail screens, and the query
//! subscription that backs whichever screen is showing.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::StartupConfig;
use crate::data::PokeApiClient;
use crate::query::{Fetcher, QueryCache, QueryKey, QuerySnapshot, Subscription};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Index of Pokémon
    ListView,
    /// Details for the named Pokémon
    DetailView(String),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Index of the highlighted row in the list view
    pub selected_index: usize,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Page size requested for the list view
    pub list_limit: u32,
    cache: QueryCache,
    /// Subscription for the query behind the current view
    subscription: Option<Subscription>,
}

impl App {
    /// Creates a new App talking to PokéAPI as configured
    ///
    /// Must be called inside a tokio runtime: the first screen's query is
    /// subscribed immediately.
    pub fn new(config: &StartupConfig) -> Self {
        Self::with_fetcher(PokeApiClient::with_base_url(config.base_url.as_str()), config)
    }

    /// Creates a new App with a custom fetcher (for testing)
    pub fn with_fetcher(fetcher: impl Fetcher, config: &StartupConfig) -> Self {
        let state = match &config.initial_pokemon {
            Some(name) => AppState::DetailView(name.clone()),
            None => AppState::ListView,
        };
        let mut app = Self {
            state,
            selected_index: 0,
            should_quit: false,
            show_help: false,
            list_limit: config.list_limit,
            cache: QueryCache::new(fetcher, config.query.clone()),
            subscription: None,
        };
        app.sync_subscription();
        app
    }

    /// The navigation state: `None` on the list, the name on a detail view
    pub fn selected_pokemon(&self) -> Option<&str> {
        match &self.state {
            AppState::ListView => None,
            AppState::DetailView(name) => Some(name),
        }
    }

    /// Query key backing the current view
    pub fn current_key(&self) -> QueryKey {
        match &self.state {
            AppState::ListView => QueryKey::pokemon_list(self.list_limit),
            AppState::DetailView(name) => QueryKey::pokemon_detail(name.as_str()),
        }
    }

    /// State of the current view's query
    pub fn snapshot(&self) -> QuerySnapshot {
        self.subscription
            .as_ref()
            .map(Subscription::snapshot)
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Number of rows currently shown in the list view
    pub fn list_len(&self) -> usize {
        match self.state {
            AppState::ListView => self
                .snapshot()
                .listing()
                .map(|listing| listing.results.len())
                .unwrap_or(0),
            AppState::DetailView(_) => 0,
        }
    }

    /// Name of the highlighted list row, if the list is loaded
    pub fn highlighted_name(&self) -> Option<String> {
        if self.state != AppState::ListView {
            return None;
        }
        self.snapshot()
            .listing()
            .and_then(|listing| listing.results.get(self.selected_index))
            .map(|entry| entry.name.clone())
    }

    /// Shows the detail view for `name`
    pub fn select(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!(pokemon = %name, "showing details");
        self.state = AppState::DetailView(name);
        self.show_help = false;
        self.sync_subscription();
    }

    /// Returns to the list view
    pub fn back(&mut self) {
        tracing::info!("back to list");
        self.state = AppState::ListView;
        self.show_help = false;
        self.sync_subscription();
    }

    /// Revalidates the current view's query
    pub fn refresh(&mut self) -> bool {
        let key = self.current_key();
        self.cache.refetch(&key)
    }

    /// Applies finished fetches and evicts unused queries
    ///
    /// Returns whether anything visible may have changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let applied = self.cache.poll_events();
        self.cache.collect_garbage(now);
        self.clamp_selection();
        applied > 0
    }

    /// Waits for the next fetch to finish and applies it
    pub async fn next_update(&mut self) -> bool {
        let applied = self.cache.next_event().await;
        self.clamp_selection();
        applied
    }

    /// Keeps exactly one subscription, for the current view's key
    fn sync_subscription(&mut self) {
        let key = self.current_key();
        if self.subscription.as_ref().map(Subscription::key) == Some(&key) {
            return;
        }
        if let Some(previous) = self.subscription.take() {
            self.cache.unsubscribe(previous);
        }
        self.subscription = Some(self.cache.subscribe(key));
    }

    fn clamp_selection(&mut self) {
        let count = self.list_len();
        if count > 0 && self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Esc` (in ListView): Quit the application
    /// - `Up`/`k`, `Down`/`j`: Move selection in list
    /// - `Enter`: Show details for the highlighted Pokémon
    /// - `Esc`/`Backspace`/`b` (in DetailView): Go back to list view
    /// - `r`: Refetch the current view's data
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::ListView => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.move_selection_up();
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.move_selection_down();
                }
                KeyCode::Enter => {
                    if let Some(name) = self.highlighted_name() {
                        self.select(name);
                    }
                }
                KeyCode::Char('r') => {
                    self.refresh();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::DetailView(_) => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') => {
                    self.back();
                }
                KeyCode::Char('r') => {
                    self.refresh();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }

    /// Moves the selection up in the list, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.list_len();
        if count == 0 {
            return;
        }
        if self.selected_index == 0 {
            self.selected_index = count - 1;
        } else {
            self.selected_index -= 1;
        }
    }

    /// Moves the selection down in the list, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.list_len();
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::stub::{detail, listing, StaticFetcher};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_fetcher() -> StaticFetcher {
        StaticFetcher::default()
            .with(
                QueryKey::pokemon_list(9),
                listing(&["bulbasaur", "ivysaur", "venusaur"]),
            )
            .with(
                QueryKey::pokemon_detail("bulbasaur"),
                detail(1, "bulbasaur", &["grass", "poison"]),
            )
            .with(
                QueryKey::pokemon_detail("ivysaur"),
                detail(2, "ivysaur", &["grass", "poison"]),
            )
    }

    /// Creates an app whose list has loaded
    async fn loaded_app() -> (App, StaticFetcher) {
        let fetcher = test_fetcher();
        let mut app = App::with_fetcher(fetcher.clone(), &StartupConfig::default());
        assert!(app.next_update().await);
        (app, fetcher)
    }

    #[tokio::test]
    async fn test_initial_state_is_list_view() {
        let app = App::with_fetcher(test_fetcher(), &StartupConfig::default());
        assert_eq!(app.state, AppState::ListView);
        assert!(app.selected_pokemon().is_none());
        assert_eq!(app.selected_index, 0);
        assert!(!app.should_quit);
        assert!(app.snapshot().is_loading());
    }

    #[tokio::test]
    async fn test_startup_config_with_pokemon_opens_detail_view() {
        let config = StartupConfig {
            initial_pokemon: Some("ivysaur".to_string()),
            ..Default::default()
        };
        let mut app = App::with_fetcher(test_fetcher(), &config);

        assert_eq!(app.state, AppState::DetailView("ivysaur".to_string()));
        app.next_update().await;
        assert_eq!(app.snapshot().detail().map(|d| d.id), Some(2));
    }

    #[tokio::test]
    async fn test_list_loads_into_snapshot() {
        let (app, fetcher) = loaded_app().await;
        assert!(app.snapshot().is_success());
        assert_eq!(app.list_len(), 3);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_enter_transitions_to_detail_view() {
        let (mut app, _fetcher) = loaded_app().await;

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.state, AppState::DetailView("bulbasaur".to_string()));
        assert_eq!(app.selected_pokemon(), Some("bulbasaur"));
        assert_eq!(app.current_key(), QueryKey::pokemon_detail("bulbasaur"));
    }

    #[tokio::test]
    async fn test_enter_ignored_while_list_loading() {
        let mut app = App::with_fetcher(test_fetcher(), &StartupConfig::default());

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.state, AppState::ListView);
    }

    #[tokio::test]
    async fn test_select_then_back_round_trip() {
        let (mut app, _fetcher) = loaded_app().await;

        app.select("bulbasaur");
        assert_eq!(app.state, AppState::DetailView("bulbasaur".to_string()));

        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.state, AppState::ListView);
        assert!(app.selected_pokemon().is_none());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_back_keys_from_detail() {
        for code in [KeyCode::Esc, KeyCode::Backspace, KeyCode::Char('b')] {
            let (mut app, _fetcher) = loaded_app().await;
            app.select("bulbasaur");

            app.handle_key(key_event(code));

            assert_eq!(app.state, AppState::ListView, "{:?} should go back", code);
        }
    }

    #[tokio::test]
    async fn test_returning_to_list_reuses_cached_listing() {
        let (mut app, fetcher) = loaded_app().await;

        app.handle_key(key_event(KeyCode::Enter));
        app.next_update().await;
        app.handle_key(key_event(KeyCode::Esc));

        assert!(app.snapshot().is_success(), "listing should come from cache");
        assert_eq!(fetcher.calls(), 2, "list once, detail once");
    }

    #[tokio::test]
    async fn test_only_current_view_is_subscribed() {
        let (mut app, _fetcher) = loaded_app().await;
        let list_key = QueryKey::pokemon_list(9);
        let detail_key = QueryKey::pokemon_detail("bulbasaur");

        app.select("bulbasaur");

        assert_eq!(app.cache().subscriber_count(&list_key), 0);
        assert_eq!(app.cache().subscriber_count(&detail_key), 1);
    }

    #[tokio::test]
    async fn test_unused_list_evicted_after_grace_period() {
        let (mut app, _fetcher) = loaded_app().await;
        app.select("bulbasaur");

        app.tick(Instant::now() + Duration::from_secs(61));

        assert!(!app.cache().contains(&QueryKey::pokemon_list(9)));
        assert!(app.cache().contains(&QueryKey::pokemon_detail("bulbasaur")));
    }

    #[tokio::test]
    async fn test_unknown_pokemon_shows_error() {
        let (mut app, _fetcher) = loaded_app().await;

        app.select("missingno");
        app.next_update().await;

        let snapshot = app.snapshot();
        assert!(snapshot.is_error());
        assert!(snapshot.data().is_none());
    }

    #[tokio::test]
    async fn test_navigation_down_increases_index() {
        let (mut app, _fetcher) = loaded_app().await;

        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_index, 1);

        app.handle_key(key_event(KeyCode::Char('j')));
        assert_eq!(app.selected_index, 2);
    }

    #[tokio::test]
    async fn test_navigation_wraps_at_bottom_and_top() {
        let (mut app, _fetcher) = loaded_app().await;
        app.selected_index = 2;

        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_index, 0, "Should wrap to top");

        app.handle_key(key_event(KeyCode::Char('k')));
        assert_eq!(app.selected_index, 2, "Should wrap to bottom");
    }

    #[tokio::test]
    async fn test_navigation_ignored_while_loading() {
        let mut app = App::with_fetcher(test_fetcher(), &StartupConfig::default());

        app.handle_key(key_event(KeyCode::Down));

        assert_eq!(app.selected_index, 0);
    }

    #[tokio::test]
    async fn test_enter_selects_highlighted_row() {
        let (mut app, _fetcher) = loaded_app().await;
        app.handle_key(key_event(KeyCode::Down));

        app.handle_key(key_event(KeyCode::Enter));

        assert_eq!(app.state, AppState::DetailView("ivysaur".to_string()));
    }

    #[tokio::test]
    async fn test_selection_preserved_after_back() {
        let (mut app, _fetcher) = loaded_app().await;
        app.handle_key(key_event(KeyCode::Down));
        app.handle_key(key_event(KeyCode::Enter));

        app.handle_key(key_event(KeyCode::Esc));

        assert_eq!(app.selected_index, 1);
    }

    #[tokio::test]
    async fn test_q_quits_from_both_views() {
        let (mut app, _fetcher) = loaded_app().await;
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);

        let (mut app, _fetcher) = loaded_app().await;
        app.select("bulbasaur");
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_esc_quits_from_list_view() {
        let (mut app, _fetcher) = loaded_app().await;
        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_r_refetches_current_query() {
        let (mut app, fetcher) = loaded_app().await;

        app.handle_key(key_event(KeyCode::Char('r')));

        assert_eq!(fetcher.calls(), 2);
        assert!(app.snapshot().is_success());
        assert!(app.snapshot().is_fetching);
    }

    #[tokio::test]
    async fn test_help_overlay_intercepts_keys() {
        let (mut app, _fetcher) = loaded_app().await;

        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Enter));
        assert_eq!(app.state, AppState::ListView, "Enter is swallowed by help");

        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_tick_applies_finished_fetches() {
        let mut app = App::with_fetcher(test_fetcher(), &StartupConfig::default());
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(app.tick(Instant::now()));
        assert!(app.snapshot().is_success());
        assert!(!app.tick(Instant::now()));
    }
}
