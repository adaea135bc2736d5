//! REST API client module for the contest catalog.
//!
//! This module provides the `ApiClient` for fetching the contest list and
//! the `ContestSource` trait the pipeline depends on.

pub mod client;
pub mod error;

pub use client::{ApiClient, ContestSource, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::{ApiError, ErrorKind};
