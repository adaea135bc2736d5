//! Contest pipeline: loading, filtering, sorting, searching and paging.
//!
//! - `contest_pipeline`: the stateful `ContestPipeline` owner
//! - `view`: pure filter, sort and pagination functions
//! - `debounce`: clock abstraction and the search debouncer

pub mod contest_pipeline;
pub mod debounce;
pub mod view;

pub use contest_pipeline::{
    ContestPipeline, ContestView, DataOrigin, LoadError, PipelineOptions, SEARCH_DEBOUNCE_MS,
};
pub use debounce::{Clock, Debouncer, ManualClock, SystemClock};
pub use view::{
    duration_chart, filter_and_sort, filtered_indices, is_valid_page_size, paginate,
    pagination_label, total_pages, ChartBar, FilterCriteria, FilterPatch, PageState,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE,
};
