//! Pure derivation of the visible contest list.
//!
//! Everything here is a plain function of its inputs so the list the user
//! sees can be checked without a pipeline, a cache, or a terminal.

use crate::models::{Contest, ContestPhase, ContestType, FavoriteSet, Selection, SortKey};
use crate::utils::{contains_ignore_case, shorten};

/// Smallest accepted page size
pub const MIN_PAGE_SIZE: usize = 5;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: usize = 15;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Chart labels longer than this are cut and given an ellipsis
const CHART_LABEL_MAX_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub contest_type: Selection<ContestType>,
    pub phase: Selection<ContestPhase>,
    pub search_text: String,
    pub sort_key: SortKey,
    pub show_favorites_only: bool,
}

/// Partial update to `FilterCriteria`; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub contest_type: Option<Selection<ContestType>>,
    pub phase: Option<Selection<ContestPhase>>,
    pub search_text: Option<String>,
    pub sort_key: Option<SortKey>,
    pub show_favorites_only: Option<bool>,
}

impl FilterCriteria {
    pub fn apply(&mut self, patch: FilterPatch) {
        if let Some(t) = patch.contest_type {
            self.contest_type = t;
        }
        if let Some(p) = patch.phase {
            self.phase = p;
        }
        if let Some(s) = patch.search_text {
            self.search_text = s;
        }
        if let Some(k) = patch.sort_key {
            self.sort_key = k;
        }
        if let Some(f) = patch.show_favorites_only {
            self.show_favorites_only = f;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

pub fn is_valid_page_size(size: usize) -> bool {
    (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&size)
}

/// Apply type, phase, search and favorites filters, then sort.
///
/// Returns positions into `contests`. The sort is stable: contests with
/// equal keys keep their catalog order.
pub fn filtered_indices(
    contests: &[Contest],
    criteria: &FilterCriteria,
    favorites: &FavoriteSet,
) -> Vec<usize> {
    let query = criteria.search_text.to_lowercase();

    let mut result: Vec<usize> = contests
        .iter()
        .enumerate()
        .filter(|(_, c)| criteria.contest_type.matches(&c.contest_type))
        .filter(|(_, c)| criteria.phase.matches(&c.phase))
        .filter(|(_, c)| contains_ignore_case(&c.name, &query))
        .filter(|(_, c)| !criteria.show_favorites_only || favorites.contains(c.id))
        .map(|(i, _)| i)
        .collect();

    let start = |i: usize| contests[i].start_time_seconds;
    let duration = |i: usize| contests[i].duration_seconds;

    match criteria.sort_key {
        SortKey::DateDesc => result.sort_by(|&a, &b| start(b).cmp(&start(a))),
        SortKey::DateAsc => result.sort_by(|&a, &b| start(a).cmp(&start(b))),
        SortKey::DurationDesc => result.sort_by(|&a, &b| duration(b).cmp(&duration(a))),
        SortKey::DurationAsc => result.sort_by(|&a, &b| duration(a).cmp(&duration(b))),
    }

    result
}

/// `filtered_indices` resolved to the contests themselves.
pub fn filter_and_sort<'a>(
    contests: &'a [Contest],
    criteria: &FilterCriteria,
    favorites: &FavoriteSet,
) -> Vec<&'a Contest> {
    filtered_indices(contests, criteria, favorites)
        .into_iter()
        .map(|i| &contests[i])
        .collect()
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Slice `[(page-1)*size, page*size)`, clipped to the list.
pub fn paginate<T>(items: &[T], page: PageState) -> &[T] {
    let page_index = page.current_page.max(1) - 1;
    let start = page_index.saturating_mul(page.page_size).min(items.len());
    let end = start.saturating_add(page.page_size).min(items.len());
    &items[start..end]
}

/// "11-20 of 42 contests", or empty when nothing matches.
pub fn pagination_label(page: PageState, total_items: usize) -> String {
    if total_items == 0 {
        return String::new();
    }
    let first = (page.current_page.max(1) - 1) * page.page_size;
    let last = (first + page.page_size).min(total_items);
    format!("{}-{} of {} contests", first + 1, last, total_items)
}

/// One bar of the duration chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBar {
    pub label: String,
    pub hours: u64,
}

/// Bars for the given contests: duration rounded to whole hours.
pub fn duration_chart(contests: &[&Contest]) -> Vec<ChartBar> {
    contests
        .iter()
        .map(|c| ChartBar {
            label: shorten(&c.name, CHART_LABEL_MAX_CHARS),
            hours: (c.duration_seconds + 1800) / 3600,
        })
        .collect()
}
