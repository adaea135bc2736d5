//! The contest pipeline: authoritative list, cache-checked loading, and the
//! derived view the presentation layer renders.
//!
//! Every mutating call recomputes the filtered list in full before it
//! returns, so `view()` can never observe stale derived state.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, ContestSource, ErrorKind};
use crate::cache::{age_display, age_minutes, CacheEntry, CacheStore, DEFAULT_CACHE_TTL_MS};
use crate::models::{Contest, ContestPhase, ContestType, FavoriteSet, Selection, SortKey};

use super::debounce::{Clock, Debouncer};
use super::view::{
    filtered_indices, is_valid_page_size, paginate, pagination_label, total_pages,
    FilterCriteria, FilterPatch, PageState, DEFAULT_PAGE_SIZE,
};

// ============================================================================
// Constants
// ============================================================================

/// Quiet period before typed search text is applied
pub const SEARCH_DEBOUNCE_MS: i64 = 300;

/// Buffer size for the background fetch channel
const CHANNEL_BUFFER_SIZE: usize = 4;

/// Load failure shown to the user. The previous list stays visible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<&ApiError> for LoadError {
    fn from(e: &ApiError) -> Self {
        match e.kind() {
            ErrorKind::Network => LoadError::Network(e.to_string()),
            ErrorKind::Upstream => LoadError::Upstream(e.to_string()),
        }
    }
}

/// Where the current list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    Cache,
    StaleCache,
    Network,
}

/// Tunables, normally filled from `Config`
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub cache_ttl_ms: i64,
    pub page_size: usize,
    pub search_debounce_ms: i64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
        }
    }
}

/// Snapshot of what the presentation layer should draw
#[derive(Debug)]
pub struct ContestView<'a> {
    pub items: Vec<&'a Contest>,
    pub page: PageState,
    pub total_pages: usize,
    pub total_matches: usize,
    pub loading: bool,
    pub error: Option<&'a LoadError>,
}

impl ContestView<'_> {
    pub fn pagination_label(&self) -> String {
        pagination_label(self.page, self.total_matches)
    }
}

type FetchResult = Result<Vec<Contest>, ApiError>;

/// Owner of all contest state.
pub struct ContestPipeline {
    source: Arc<dyn ContestSource>,
    cache: CacheStore,
    clock: Arc<dyn Clock>,
    cache_ttl_ms: i64,

    contests: Vec<Contest>,
    criteria: FilterCriteria,
    favorites: FavoriteSet,
    page: PageState,
    /// Positions into `contests`, filtered and sorted
    filtered: Vec<usize>,
    search: Debouncer<String>,

    initialized: bool,
    fetch_in_flight: bool,
    error: Option<LoadError>,
    fetched_at_ms: Option<i64>,
    origin: Option<DataOrigin>,

    fetch_tx: mpsc::Sender<FetchResult>,
    fetch_rx: mpsc::Receiver<FetchResult>,
}

impl ContestPipeline {
    pub fn new(
        source: Arc<dyn ContestSource>,
        cache: CacheStore,
        clock: Arc<dyn Clock>,
        options: PipelineOptions,
    ) -> Self {
        let page_size = if is_valid_page_size(options.page_size) {
            options.page_size
        } else {
            warn!(page_size = options.page_size, "Ignoring out-of-range page size");
            DEFAULT_PAGE_SIZE
        };
        let (fetch_tx, fetch_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            source,
            cache,
            clock,
            cache_ttl_ms: options.cache_ttl_ms,

            contests: Vec::new(),
            criteria: FilterCriteria::default(),
            favorites: FavoriteSet::new(),
            page: PageState {
                current_page: 1,
                page_size,
            },
            filtered: Vec::new(),
            search: Debouncer::new(options.search_debounce_ms),

            initialized: false,
            fetch_in_flight: false,
            error: None,
            fetched_at_ms: None,
            origin: None,

            fetch_tx,
            fetch_rx,
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load favorites and contests, hitting the network only on a cache miss.
    ///
    /// Runs once per pipeline; later calls just report the current error state.
    pub async fn initialize(&mut self) -> Result<(), LoadError> {
        if self.begin_initialize() {
            let result = self.source.fetch_contests().await;
            self.finish_fetch(result);
        }
        self.current_result()
    }

    /// Same as `initialize`, but the network fetch runs on a background task.
    /// Call `poll_background` to pick up its result.
    pub fn spawn_initialize(&mut self) {
        if self.begin_initialize() {
            self.spawn_fetch();
        }
    }

    /// Fetch from the network regardless of cache freshness.
    /// Returns false if a fetch was already running.
    pub async fn refresh(&mut self) -> bool {
        if !self.begin_fetch() {
            return false;
        }
        let result = self.source.fetch_contests().await;
        self.finish_fetch(result);
        true
    }

    pub fn spawn_refresh(&mut self) -> bool {
        if !self.begin_fetch() {
            return false;
        }
        self.spawn_fetch();
        true
    }

    /// Apply any finished background fetch. Returns true if state changed.
    pub fn poll_background(&mut self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.fetch_rx.try_recv() {
            self.finish_fetch(result);
            changed = true;
        }
        changed
    }

    /// Returns true when a network fetch is needed.
    fn begin_initialize(&mut self) -> bool {
        if self.initialized {
            debug!("Pipeline already initialized");
            return false;
        }
        self.initialized = true;
        info!("Initializing contest pipeline");

        self.favorites = self.cache.read_favorites();
        debug!(count = self.favorites.len(), "Favorites loaded");

        let now = self.clock.now_ms();
        match self.cache.read() {
            Some(entry) if entry.is_fresh(now, self.cache_ttl_ms) => {
                info!(count = entry.data.len(), "Using cached contests");
                self.seed(entry.data, entry.fetched_at_ms, DataOrigin::Cache);
                return false;
            }
            Some(entry) => {
                // Show what we have while the fresh copy loads
                debug!(age_ms = now - entry.fetched_at_ms, "Contest cache is stale");
                self.seed(entry.data, entry.fetched_at_ms, DataOrigin::StaleCache);
            }
            None => debug!("No usable contest cache"),
        }

        self.begin_fetch()
    }

    fn begin_fetch(&mut self) -> bool {
        if self.fetch_in_flight {
            debug!("Contest fetch already in flight");
            return false;
        }
        self.fetch_in_flight = true;
        true
    }

    fn spawn_fetch(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_contests().await;
            if let Err(e) = tx.send(result).await {
                error!(error = %e, "Failed to deliver fetch result - channel closed");
            }
        });
    }

    fn finish_fetch(&mut self, result: FetchResult) {
        self.fetch_in_flight = false;

        match result {
            Ok(contests) => {
                let entry = CacheEntry::new(contests, self.clock.now_ms());
                let fetched_at_ms = match self.cache.write(&entry) {
                    Ok(stored_at) => stored_at,
                    Err(e) => {
                        warn!(error = %e, "Failed to write contest cache");
                        entry.fetched_at_ms
                    }
                };
                info!(count = entry.data.len(), "Contests fetched");
                self.error = None;
                self.seed(entry.data, fetched_at_ms, DataOrigin::Network);
            }
            Err(e) => {
                error!(error = %e, "Error fetching contests");
                self.error = Some(LoadError::from(&e));
            }
        }
    }

    fn seed(&mut self, contests: Vec<Contest>, fetched_at_ms: i64, origin: DataOrigin) {
        self.contests = contests;
        self.fetched_at_ms = Some(fetched_at_ms);
        self.origin = Some(origin);
        self.recompute();
    }

    fn current_result(&self) -> Result<(), LoadError> {
        match &self.error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Criteria
    // =========================================================================

    pub fn set_filter(&mut self, patch: FilterPatch) {
        if patch.search_text.is_some() {
            self.search.cancel();
        }
        self.criteria.apply(patch);
        self.recompute();
    }

    pub fn set_type(&mut self, contest_type: Selection<ContestType>) {
        self.set_filter(FilterPatch {
            contest_type: Some(contest_type),
            ..Default::default()
        });
    }

    pub fn set_phase(&mut self, phase: Selection<ContestPhase>) {
        self.set_filter(FilterPatch {
            phase: Some(phase),
            ..Default::default()
        });
    }

    pub fn set_sort(&mut self, sort_key: SortKey) {
        self.set_filter(FilterPatch {
            sort_key: Some(sort_key),
            ..Default::default()
        });
    }

    pub fn set_show_favorites_only(&mut self, show: bool) {
        self.set_filter(FilterPatch {
            show_favorites_only: Some(show),
            ..Default::default()
        });
    }

    /// Queue search text. It is applied by `tick` once input has been quiet
    /// for the debounce window; a newer call replaces an older pending one.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search.schedule(text.into(), self.clock.now_ms());
    }

    /// Apply pending search text immediately
    pub fn flush_search(&mut self) {
        if let Some(text) = self.search.cancel() {
            self.apply_search(text);
        }
    }

    pub fn clear_search(&mut self) {
        self.search.cancel();
        self.apply_search(String::new());
    }

    /// Drive timed work. Returns true if the view changed.
    pub fn tick(&mut self) -> bool {
        match self.search.poll(self.clock.now_ms()) {
            Some(text) => {
                self.apply_search(text);
                true
            }
            None => false,
        }
    }

    fn apply_search(&mut self, text: String) {
        debug!(query = %text, "Applying search");
        self.criteria.search_text = text;
        self.recompute();
    }

    /// Text the user has typed, including a pending, not yet applied edit
    pub fn search_input(&self) -> &str {
        self.search
            .pending()
            .map(String::as_str)
            .unwrap_or(&self.criteria.search_text)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Flip a favorite and persist the set. Returns true if it is now a favorite.
    pub fn toggle_favorite(&mut self, contest_id: i64) -> bool {
        let now_favorite = self.favorites.toggle(contest_id);
        if let Err(e) = self.cache.write_favorites(&self.favorites) {
            warn!(error = %e, "Failed to persist favorites");
        }
        if self.criteria.show_favorites_only {
            self.recompute();
        }
        now_favorite
    }

    pub fn is_favorite(&self, contest_id: i64) -> bool {
        self.favorites.contains(contest_id)
    }

    // =========================================================================
    // Paging
    // =========================================================================

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page.page_size)
    }

    /// Move to page `n`, clamped to the pages that exist.
    pub fn set_page(&mut self, n: usize) {
        let last = self.total_pages().max(1);
        self.page.current_page = n.clamp(1, last);
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.current_page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.current_page.saturating_sub(1));
    }

    /// Accept sizes in 5..=15 and go back to page 1; anything else is ignored.
    pub fn set_page_size(&mut self, n: usize) -> bool {
        if !is_valid_page_size(n) {
            debug!(page_size = n, "Rejected page size");
            return false;
        }
        self.page.page_size = n;
        self.page.current_page = 1;
        true
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    fn recompute(&mut self) {
        self.filtered = filtered_indices(&self.contests, &self.criteria, &self.favorites);
        self.page.current_page = 1;
    }

    pub fn view(&self) -> ContestView<'_> {
        let items = paginate(&self.filtered, self.page)
            .iter()
            .map(|&i| &self.contests[i])
            .collect();

        ContestView {
            items,
            page: self.page,
            total_pages: self.total_pages(),
            total_matches: self.filtered.len(),
            loading: self.fetch_in_flight,
            error: self.error.as_ref(),
        }
    }

    /// The whole filtered and sorted list, across all pages
    pub fn filtered(&self) -> Vec<&Contest> {
        self.filtered.iter().map(|&i| &self.contests[i]).collect()
    }

    /// Point lookup for the detail view. `None` means the contest is unknown.
    pub fn find_contest(&self, contest_id: i64) -> Option<&Contest> {
        self.contests.iter().find(|c| c.id == contest_id)
    }

    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn origin(&self) -> Option<DataOrigin> {
        self.origin
    }

    /// "5m ago" style age of the current data, or "never"
    pub fn data_age_display(&self) -> String {
        match self.fetched_at_ms {
            Some(at) => age_display(age_minutes(at, self.clock.now_ms())),
            None => "never".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::cache::{
        KeyValueStore, MemoryStore, SharedStore, CONTESTS_CACHE_KEY, FAVORITES_KEY,
    };
    use crate::pipeline::ManualClock;

    const T0: i64 = 1_700_000_000_000;

    enum Behavior {
        Ok(Vec<Contest>),
        Status(u16),
        Upstream(&'static str),
    }

    struct FakeSource {
        calls: AtomicUsize,
        behavior: Behavior,
    }

    impl FakeSource {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                behavior,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContestSource for FakeSource {
        async fn fetch_contests(&self) -> Result<Vec<Contest>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Ok(list) => Ok(list.clone()),
                Behavior::Status(code) => Err(ApiError::Status {
                    status: *code,
                    body: String::new(),
                }),
                Behavior::Upstream(msg) => Err(ApiError::Upstream(msg.to_string())),
            }
        }
    }

    fn contest(
        id: i64,
        name: &str,
        t: ContestType,
        phase: ContestPhase,
        start: i64,
        dur: u64,
    ) -> Contest {
        Contest {
            id,
            name: name.to_string(),
            contest_type: t,
            phase,
            start_time_seconds: start,
            duration_seconds: dur,
            frozen: false,
            relative_time_seconds: None,
        }
    }

    fn scenario() -> Vec<Contest> {
        vec![
            contest(1, "Alpha Cup", ContestType::Cf, ContestPhase::Finished, 1000, 7200),
            contest(2, "Beta Open", ContestType::Icpc, ContestPhase::Before, 2000, 3600),
        ]
    }

    fn many(n: i64) -> Vec<Contest> {
        (1..=n)
            .map(|i| {
                contest(
                    i,
                    &format!("Round {}", i),
                    if i % 2 == 0 { ContestType::Icpc } else { ContestType::Cf },
                    ContestPhase::Finished,
                    i * 100,
                    (i as u64) * 60,
                )
            })
            .collect()
    }

    struct Harness {
        pipeline: ContestPipeline,
        source: Arc<FakeSource>,
        clock: Arc<ManualClock>,
        durable: SharedStore,
        session: SharedStore,
    }

    fn harness(behavior: Behavior) -> Harness {
        harness_with(behavior, SharedStore::default(), SharedStore::default())
    }

    fn harness_with(behavior: Behavior, durable: SharedStore, session: SharedStore) -> Harness {
        let source = FakeSource::new(behavior);
        let clock = Arc::new(ManualClock::new(T0));
        let cache = CacheStore::new(Box::new(durable.clone()), Box::new(session.clone()));
        let pipeline = ContestPipeline::new(
            source.clone(),
            cache,
            clock.clone(),
            PipelineOptions::default(),
        );
        Harness {
            pipeline,
            source,
            clock,
            durable,
            session,
        }
    }

    fn seeded_cache(contests: Vec<Contest>, fetched_at_ms: i64) -> SharedStore {
        let durable = SharedStore::default();
        let cache = CacheStore::new(Box::new(durable.clone()), Box::new(MemoryStore::new()));
        cache
            .write(&CacheEntry::new(contests, fetched_at_ms))
            .unwrap();
        durable
    }

    fn view_ids(p: &ContestPipeline) -> Vec<i64> {
        p.view().items.iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn test_initialize_fetches_and_caches_on_miss() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        assert_eq!(h.source.calls(), 1);
        assert_eq!(view_ids(&h.pipeline), vec![2, 1]);
        assert_eq!(h.pipeline.origin(), Some(DataOrigin::Network));

        let raw = h.durable.get(CONTESTS_CACHE_KEY).unwrap().unwrap();
        let entry: CacheEntry = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.fetched_at_ms, T0);
        assert_eq!(entry.data.len(), 2);
    }

    #[tokio::test]
    async fn test_fresh_cache_short_circuits_fetch() {
        let durable = seeded_cache(scenario(), T0 - 1000);
        let mut h = harness_with(Behavior::Status(503), durable, SharedStore::default());

        h.pipeline.initialize().await.unwrap();

        assert_eq!(h.source.calls(), 0);
        assert!(h.pipeline.error().is_none());
        assert_eq!(h.pipeline.contests().len(), 2);
        assert_eq!(h.pipeline.origin(), Some(DataOrigin::Cache));
    }

    #[tokio::test]
    async fn test_stale_cache_fetches() {
        let durable = seeded_cache(scenario(), T0 - DEFAULT_CACHE_TTL_MS);
        let mut h = harness_with(Behavior::Ok(many(3)), durable, SharedStore::default());

        h.pipeline.initialize().await.unwrap();

        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.pipeline.contests().len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_cache_fetches() {
        let durable = SharedStore::default();
        durable.set(CONTESTS_CACHE_KEY, "garbage").unwrap();
        let mut h = harness_with(Behavior::Ok(scenario()), durable, SharedStore::default());

        h.pipeline.initialize().await.unwrap();
        assert_eq!(h.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();
        h.pipeline.initialize().await.unwrap();
        h.pipeline.spawn_initialize();
        assert_eq!(h.source.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_previous_list() {
        let durable = seeded_cache(scenario(), T0 - 2 * DEFAULT_CACHE_TTL_MS);
        let mut h = harness_with(Behavior::Status(500), durable, SharedStore::default());

        let err = h.pipeline.initialize().await.unwrap_err();

        assert!(matches!(err, LoadError::Network(_)));
        assert!(!h.pipeline.is_loading());
        assert_eq!(h.pipeline.contests().len(), 2);
        assert_eq!(h.pipeline.origin(), Some(DataOrigin::StaleCache));
        assert!(h.pipeline.view().error.is_some());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_distinguishable() {
        let mut h = harness(Behavior::Upstream("Call limit exceeded"));
        let err = h.pipeline.initialize().await.unwrap_err();
        assert!(matches!(err, LoadError::Upstream(ref m) if m.contains("Call limit")));
        assert!(h.pipeline.contests().is_empty());
        assert!(h.durable.get(CONTESTS_CACHE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_list_and_cache() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        // swap to a failing source by building a second pipeline over the same stores
        let mut failing = harness_with(Behavior::Status(502), h.durable.clone(), h.session.clone());
        failing.clock.set(T0 + 10);
        failing.pipeline.initialize().await.unwrap();
        assert!(failing.pipeline.refresh().await);

        assert!(failing.pipeline.error().is_some());
        assert_eq!(failing.pipeline.contests().len(), 2);
        let raw = h.durable.get(CONTESTS_CACHE_KEY).unwrap().unwrap();
        let entry: CacheEntry = serde_json::from_str(&raw).unwrap();
        assert_eq!(entry.fetched_at_ms, T0);
    }

    #[tokio::test]
    async fn test_spawned_initialize_delivers_through_poll() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.spawn_initialize();
        assert!(h.pipeline.is_loading());
        assert!(h.pipeline.view().loading);

        // a second request while the first is running is ignored
        assert!(!h.pipeline.spawn_refresh());

        for _ in 0..200 {
            if h.pipeline.poll_background() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert!(!h.pipeline.is_loading());
        assert_eq!(h.source.calls(), 1);
        assert_eq!(h.pipeline.contests().len(), 2);
    }

    #[tokio::test]
    async fn test_scenario_filter_and_sort() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.set_type(Selection::Only(ContestType::Cf));
        assert_eq!(view_ids(&h.pipeline), vec![1]);

        h.pipeline.set_type(Selection::All);
        h.pipeline.set_sort(SortKey::DateAsc);
        assert_eq!(view_ids(&h.pipeline), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_set_filter_is_idempotent() {
        let mut h = harness(Behavior::Ok(many(30)));
        h.pipeline.initialize().await.unwrap();

        let patch = || FilterPatch {
            contest_type: Some(Selection::Only(ContestType::Icpc)),
            sort_key: Some(SortKey::DurationDesc),
            ..Default::default()
        };
        h.pipeline.set_filter(patch());
        let once = view_ids(&h.pipeline);
        h.pipeline.set_filter(patch());
        assert_eq!(view_ids(&h.pipeline), once);
        assert_eq!(once, vec![30, 28, 26, 24, 22, 20, 18, 16, 14, 12]);
    }

    #[tokio::test]
    async fn test_view_never_exceeds_page_size() {
        let mut h = harness(Behavior::Ok(many(23)));
        h.pipeline.initialize().await.unwrap();

        for size in [5, 7, 10, 15] {
            assert!(h.pipeline.set_page_size(size));
            let pages = h.pipeline.total_pages();
            let all: Vec<i64> = h.pipeline.filtered().iter().map(|c| c.id).collect();
            for page in 1..=pages {
                h.pipeline.set_page(page);
                let view = h.pipeline.view();
                assert!(view.items.len() <= size);
                let start = (page - 1) * size;
                let end = (start + size).min(all.len());
                assert_eq!(view_ids(&h.pipeline), all[start..end].to_vec());
            }
        }
    }

    #[tokio::test]
    async fn test_criteria_changes_reset_page() {
        let mut h = harness(Behavior::Ok(many(40)));
        h.pipeline.initialize().await.unwrap();

        fn check(p: &mut ContestPipeline, f: impl FnOnce(&mut ContestPipeline)) {
            p.set_page(3);
            assert_eq!(p.page().current_page, 3);
            f(p);
            assert_eq!(p.page().current_page, 1);
        }

        check(&mut h.pipeline, |p| p.set_sort(SortKey::DurationAsc));
        check(&mut h.pipeline, |p| p.set_phase(Selection::Only(ContestPhase::Finished)));
        check(&mut h.pipeline, |p| p.set_type(Selection::All));
        check(&mut h.pipeline, |p| {
            p.set_filter(FilterPatch {
                search_text: Some("round".into()),
                ..Default::default()
            })
        });
    }

    #[tokio::test]
    async fn test_debounced_search_resets_page() {
        let mut h = harness(Behavior::Ok(many(40)));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.set_page(3);
        h.pipeline.set_search_text("round");
        // pending text does not touch the page yet
        assert_eq!(h.pipeline.page().current_page, 3);

        h.clock.advance(SEARCH_DEBOUNCE_MS);
        assert!(h.pipeline.tick());
        assert_eq!(h.pipeline.criteria().search_text, "round");
        assert_eq!(h.pipeline.page().current_page, 1);
    }

    #[tokio::test]
    async fn test_set_filter_search_cancels_pending_text() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.set_search_text("alpha");
        h.pipeline.set_filter(FilterPatch {
            search_text: Some("beta".into()),
            ..Default::default()
        });
        assert_eq!(h.pipeline.search_input(), "beta");
        assert_eq!(view_ids(&h.pipeline), vec![2]);

        h.clock.advance(1000);
        assert!(!h.pipeline.tick());
        assert_eq!(h.pipeline.criteria().search_text, "beta");
        assert_eq!(view_ids(&h.pipeline), vec![2]);
    }

    #[tokio::test]
    async fn test_favorites_only_resets_page() {
        let mut h = harness(Behavior::Ok(many(40)));
        h.pipeline.initialize().await.unwrap();
        h.pipeline.set_page(2);
        h.pipeline.set_show_favorites_only(false);
        assert_eq!(h.pipeline.page().current_page, 1);
    }

    #[tokio::test]
    async fn test_page_navigation_keeps_filtered_set() {
        let mut h = harness(Behavior::Ok(many(40)));
        h.pipeline.initialize().await.unwrap();
        h.pipeline.set_type(Selection::Only(ContestType::Cf));
        let before: Vec<i64> = h.pipeline.filtered().iter().map(|c| c.id).collect();

        h.pipeline.next_page();
        assert_eq!(h.pipeline.page().current_page, 2);
        let after: Vec<i64> = h.pipeline.filtered().iter().map(|c| c.id).collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_set_page_clamps() {
        let mut h = harness(Behavior::Ok(many(23)));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.set_page(99);
        assert_eq!(h.pipeline.page().current_page, 3);
        h.pipeline.set_page(0);
        assert_eq!(h.pipeline.page().current_page, 1);
        h.pipeline.prev_page();
        assert_eq!(h.pipeline.page().current_page, 1);

        h.pipeline.set_search_text("no such contest");
        h.pipeline.flush_search();
        h.pipeline.set_page(5);
        assert_eq!(h.pipeline.page().current_page, 1);
        assert_eq!(h.pipeline.total_pages(), 0);
    }

    #[tokio::test]
    async fn test_page_size_out_of_range_rejected() {
        let mut h = harness(Behavior::Ok(many(23)));
        h.pipeline.initialize().await.unwrap();
        assert_eq!(h.pipeline.page().page_size, 10);

        h.pipeline.set_page(2);
        assert!(!h.pipeline.set_page_size(20));
        assert!(!h.pipeline.set_page_size(4));
        assert_eq!(h.pipeline.page().page_size, 10);
        assert_eq!(h.pipeline.page().current_page, 2);

        assert!(h.pipeline.set_page_size(15));
        assert_eq!(h.pipeline.page().current_page, 1);
        assert_eq!(h.pipeline.view().items.len(), 15);
    }

    #[tokio::test]
    async fn test_search_is_debounced() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.set_search_text("a");
        h.clock.advance(200);
        h.pipeline.set_search_text("alp");
        assert_eq!(h.pipeline.search_input(), "alp");

        h.clock.advance(200);
        assert!(!h.pipeline.tick());
        assert_eq!(h.pipeline.criteria().search_text, "");
        assert_eq!(view_ids(&h.pipeline), vec![2, 1]);

        h.clock.advance(100);
        assert!(h.pipeline.tick());
        assert_eq!(h.pipeline.criteria().search_text, "alp");
        assert_eq!(view_ids(&h.pipeline), vec![1]);
        assert!(!h.pipeline.tick());
    }

    #[tokio::test]
    async fn test_clear_search_cancels_pending() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.set_search_text("beta");
        h.pipeline.clear_search();
        h.clock.advance(1000);
        assert!(!h.pipeline.tick());
        assert_eq!(view_ids(&h.pipeline), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_toggle_favorite_persists_and_is_self_inverse() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();
        let before = h.pipeline.favorites().clone();

        assert!(h.pipeline.toggle_favorite(2));
        assert!(h.pipeline.is_favorite(2));
        assert_eq!(h.session.get(FAVORITES_KEY).unwrap().as_deref(), Some("[2]"));

        assert!(!h.pipeline.toggle_favorite(2));
        assert_eq!(h.pipeline.favorites(), &before);
        assert_eq!(h.session.get(FAVORITES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_unfavorite_hides_contest_in_favorites_only_view() {
        let mut h = harness(Behavior::Ok(scenario()));
        h.pipeline.initialize().await.unwrap();

        h.pipeline.toggle_favorite(1);
        h.pipeline.toggle_favorite(2);
        h.pipeline.set_show_favorites_only(true);
        assert_eq!(view_ids(&h.pipeline), vec![2, 1]);

        h.pipeline.toggle_favorite(1);
        assert_eq!(view_ids(&h.pipeline), vec![2]);
    }

    #[tokio::test]
    async fn test_favorites_loaded_at_initialize() {
        let session = SharedStore::default();
        session.set(FAVORITES_KEY, "[1]").unwrap();
        let mut h = harness_with(Behavior::Ok(scenario()), SharedStore::default(), session);

        assert!(!h.pipeline.is_favorite(1));
        h.pipeline.initialize().await.unwrap();
        assert!(h.pipeline.is_favorite(1));

        h.pipeline.set_show_favorites_only(true);
        assert_eq!(view_ids(&h.pipeline), vec![1]);
    }

    #[tokio::test]
    async fn test_find_contest() {
        let mut h = harness(Behavior::Ok(scenario()));
        assert!(h.pipeline.find_contest(1).is_none());
        h.pipeline.initialize().await.unwrap();
        assert_eq!(h.pipeline.find_contest(2).map(|c| c.name.as_str()), Some("Beta Open"));
        assert!(h.pipeline.find_contest(99).is_none());
    }

    #[tokio::test]
    async fn test_data_age_display() {
        let mut h = harness(Behavior::Ok(scenario()));
        assert_eq!(h.pipeline.data_age_display(), "never");
        h.pipeline.initialize().await.unwrap();
        h.clock.advance(5 * 60_000);
        assert_eq!(h.pipeline.data_age_display(), "5m ago");
    }

    #[test]
    fn test_invalid_configured_page_size_falls_back() {
        let source = FakeSource::new(Behavior::Ok(vec![]));
        let cache = CacheStore::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()));
        let pipeline = ContestPipeline::new(
            source,
            cache,
            Arc::new(ManualClock::new(0)),
            PipelineOptions {
                page_size: 50,
                ..Default::default()
            },
        );
        assert_eq!(pipeline.page().page_size, DEFAULT_PAGE_SIZE);
    }
}
