//! contestboard core library.
//!
//! Shared logic for browsing the Codeforces contest catalog: the API client,
//! the local cache, the filter/sort/paginate pipeline and formatting helpers.
//! Front ends drive a `ContestPipeline` and render its `view()`.

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use config::Config;
