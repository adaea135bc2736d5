//! Data models for catalog entities.
//!
//! - `Contest`: a single contest record as received from the catalog
//! - `ContestType`, `ContestPhase`: open enumerations that keep unknown values
//! - `SortKey`, `Selection`: list ordering and filter choices
//! - `FavoriteSet`: starred contest ids

pub mod contest;
pub mod favorites;

pub use contest::{
    next_option, phase_options, selection_label, type_options, Contest, ContestListResponse,
    ContestPhase, ContestType, Selection, SortKey,
};
pub use favorites::FavoriteSet;
