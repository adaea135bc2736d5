//! Application state management for contestboard.
//!
//! `App` wraps the core `ContestPipeline` and adds the UI-only state:
//! which overlay is open, which row is selected, and the status line.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use contestboard_core::api::{ApiClient, ContestSource};
use contestboard_core::cache::{CacheStore, FileStore, MemoryStore};
use contestboard_core::models::{next_option, phase_options, type_options, Contest};
use contestboard_core::pipeline::{ContestPipeline, SystemClock};
use contestboard_core::Config;

/// Step for the `+`/`-` page size keys
const PAGE_SIZE_STEP: usize = 1;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Contests,
    Durations,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Contests => "Contests",
            Tab::Durations => "Durations",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Contests => Tab::Durations,
            Tab::Durations => Tab::Contests,
        }
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

pub struct App {
    pub pipeline: ContestPipeline,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    /// Row within the current page
    pub selection: usize,

    pub status_message: Option<String>,
}

impl App {
    /// Build the app against the real catalog and the on-disk cache.
    pub fn new(config: Config) -> Result<Self> {
        let source: Arc<dyn ContestSource> = Arc::new(
            ApiClient::with_base_url(&config.api_base_url, config.request_timeout_secs)
                .context("Failed to build HTTP client")?,
        );
        let cache_dir = Config::cache_dir()?;
        let durable = FileStore::new(cache_dir.clone())
            .with_context(|| format!("Failed to open cache at {}", cache_dir.display()))?;
        let cache = CacheStore::new(Box::new(durable), Box::new(MemoryStore::new()));

        info!(base_url = %config.api_base_url, "Using contest catalog");
        let pipeline = ContestPipeline::new(
            source,
            cache,
            Arc::new(SystemClock),
            config.pipeline_options(),
        );
        Ok(Self::with_pipeline(pipeline))
    }

    pub fn with_pipeline(pipeline: ContestPipeline) -> Self {
        Self {
            pipeline,
            state: AppState::Normal,
            current_tab: Tab::Contests,
            focus: Focus::List,
            selection: 0,
            status_message: None,
        }
    }

    /// Start loading in the background. The table shows "Loading..." until
    /// the first result arrives.
    pub fn start(&mut self) {
        self.pipeline.spawn_initialize();
        if self.pipeline.is_loading() {
            self.status_message = Some("Loading contests...".to_string());
        }
    }

    /// Apply timed and background work. Called once per event-loop pass.
    pub fn check_background_tasks(&mut self) {
        if self.pipeline.tick() {
            self.selection = 0;
        }

        if self.pipeline.poll_background() {
            self.status_message = self
                .pipeline
                .error()
                .map(|e| format!("Error: {}", e));
            self.clamp_selection();
        }
    }

    pub fn refresh(&mut self) {
        if self.pipeline.spawn_refresh() {
            self.status_message = Some("Refreshing contests...".to_string());
        } else {
            self.status_message = Some("Refresh already in progress".to_string());
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selected_contest(&self) -> Option<&Contest> {
        self.pipeline.view().items.get(self.selection).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.pipeline.view().items.len();
        if self.selection + 1 < len {
            self.selection += 1;
        } else if self.pipeline.page().current_page < self.pipeline.total_pages() {
            self.pipeline.next_page();
            self.selection = 0;
        }
    }

    pub fn select_prev(&mut self) {
        if self.selection > 0 {
            self.selection -= 1;
        } else if self.pipeline.page().current_page > 1 {
            self.pipeline.prev_page();
            self.selection = self.pipeline.view().items.len().saturating_sub(1);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.pipeline.view().items.len();
        self.selection = self.selection.min(len.saturating_sub(1));
    }

    // =========================================================================
    // Criteria shortcuts
    // =========================================================================

    pub fn cycle_type(&mut self) {
        let next = next_option(&type_options(), &self.pipeline.criteria().contest_type);
        self.pipeline.set_type(next);
        self.selection = 0;
    }

    pub fn cycle_phase(&mut self) {
        let next = next_option(&phase_options(), &self.pipeline.criteria().phase);
        self.pipeline.set_phase(next);
        self.selection = 0;
    }

    pub fn cycle_sort(&mut self) {
        let next = self.pipeline.criteria().sort_key.next();
        self.pipeline.set_sort(next);
        self.selection = 0;
    }

    pub fn toggle_favorites_only(&mut self) {
        let show = !self.pipeline.criteria().show_favorites_only;
        self.pipeline.set_show_favorites_only(show);
        self.selection = 0;
    }

    pub fn toggle_selected_favorite(&mut self) {
        let Some((id, name)) = self.selected_contest().map(|c| (c.id, c.name.clone())) else {
            return;
        };
        let now_favorite = self.pipeline.toggle_favorite(id);
        self.status_message = Some(if now_favorite {
            format!("Added {} to favorites", name)
        } else {
            format!("Removed {} from favorites", name)
        });
        self.clamp_selection();
    }

    pub fn next_page(&mut self) {
        self.pipeline.next_page();
        self.selection = 0;
    }

    pub fn prev_page(&mut self) {
        self.pipeline.prev_page();
        self.selection = 0;
    }

    pub fn grow_page(&mut self) {
        let size = self.pipeline.page().page_size + PAGE_SIZE_STEP;
        self.resize_page(size);
    }

    pub fn shrink_page(&mut self) {
        let size = self.pipeline.page().page_size.saturating_sub(PAGE_SIZE_STEP);
        self.resize_page(size);
    }

    fn resize_page(&mut self, size: usize) {
        if self.pipeline.set_page_size(size) {
            self.selection = 0;
            self.status_message = Some(format!("Showing {} contests per page", size));
        } else {
            self.status_message = Some("Page size must be between 5 and 15".to_string());
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    pub fn push_search_char(&mut self, c: char) {
        let mut text = self.pipeline.search_input().to_string();
        text.push(c);
        self.pipeline.set_search_text(text);
    }

    pub fn pop_search_char(&mut self) {
        let mut text = self.pipeline.search_input().to_string();
        text.pop();
        self.pipeline.set_search_text(text);
    }

    pub fn commit_search(&mut self) {
        self.pipeline.flush_search();
        self.selection = 0;
    }

    pub fn clear_search(&mut self) {
        self.pipeline.clear_search();
        self.selection = 0;
    }
}

/// Check if a character is valid for search input (no control characters)
pub fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contestboard_core::api::ApiError;
    use contestboard_core::models::{ContestPhase, ContestType, Selection, SortKey};
    use contestboard_core::pipeline::{ManualClock, PipelineOptions};

    struct StaticSource(Vec<Contest>);

    #[async_trait]
    impl ContestSource for StaticSource {
        async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn contests(n: i64) -> Vec<Contest> {
        (1..=n)
            .map(|i| Contest {
                id: i,
                name: format!("Round {}", i),
                contest_type: if i % 2 == 0 { ContestType::Icpc } else { ContestType::Cf },
                phase: ContestPhase::Finished,
                start_time_seconds: i * 1000,
                duration_seconds: 7200,
                frozen: false,
                relative_time_seconds: None,
            })
            .collect()
    }

    async fn app_with(n: i64) -> App {
        let cache = CacheStore::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
        let mut pipeline = ContestPipeline::new(
            Arc::new(StaticSource(contests(n))),
            cache,
            Arc::new(ManualClock::new(0)),
            PipelineOptions::default(),
        );
        pipeline.initialize().await.unwrap();
        App::with_pipeline(pipeline)
    }

    #[test]
    fn test_tab_next_wraps() {
        assert_eq!(Tab::Contests.next(), Tab::Durations);
        assert_eq!(Tab::Durations.next(), Tab::Contests);
    }

    #[tokio::test]
    async fn test_selection_crosses_pages() {
        let mut app = app_with(12).await;
        for _ in 0..9 {
            app.select_next();
        }
        assert_eq!(app.selection, 9);

        app.select_next();
        assert_eq!(app.pipeline.page().current_page, 2);
        assert_eq!(app.selection, 0);

        app.select_prev();
        assert_eq!(app.pipeline.page().current_page, 1);
        assert_eq!(app.selection, 9);
    }

    #[tokio::test]
    async fn test_cycle_filters() {
        let mut app = app_with(4).await;

        app.cycle_type();
        assert_eq!(
            app.pipeline.criteria().contest_type,
            Selection::Only(ContestType::Icpc)
        );
        app.cycle_sort();
        assert_eq!(app.pipeline.criteria().sort_key, SortKey::DateAsc);
        assert_eq!(app.selected_contest().map(|c| c.id), Some(2));
    }

    #[tokio::test]
    async fn test_toggle_selected_favorite_in_favorites_view() {
        let mut app = app_with(3).await;
        app.toggle_selected_favorite();
        let id = app.pipeline.favorites().iter().next().unwrap();
        assert_eq!(id, 3);

        app.toggle_favorites_only();
        assert_eq!(app.pipeline.view().items.len(), 1);

        app.toggle_selected_favorite();
        assert!(app.pipeline.view().items.is_empty());
        assert!(app.selected_contest().is_none());
    }

    #[tokio::test]
    async fn test_page_size_keys_respect_bounds() {
        let mut app = app_with(30).await;
        for _ in 0..10 {
            app.grow_page();
        }
        assert_eq!(app.pipeline.page().page_size, 15);
        for _ in 0..20 {
            app.shrink_page();
        }
        assert_eq!(app.pipeline.page().page_size, 5);
    }

    #[tokio::test]
    async fn test_search_editing_then_commit() {
        let mut app = app_with(12).await;
        for c in "round 1".chars() {
            app.push_search_char(c);
        }
        app.push_search_char('x');
        app.pop_search_char();
        assert_eq!(app.pipeline.search_input(), "round 1");

        app.commit_search();
        let ids: Vec<i64> = app.pipeline.view().items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![12, 11, 10, 1]);

        app.clear_search();
        assert_eq!(app.pipeline.view().total_matches, 12);
    }

    #[test]
    fn test_is_valid_input_char() {
        assert!(is_valid_input_char('a'));
        assert!(is_valid_input_char('#'));
        assert!(!is_valid_input_char('\n'));
        assert!(!is_valid_input_char('\x00'));
    }
}
