use std::fmt;

use serde::{Deserialize, Serialize};

/// Contest format as reported by the catalog.
///
/// The catalog is free to add new formats, so anything unrecognized is kept
/// verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContestType {
    Cf,
    Icpc,
    Ioi,
    Other(String),
}

impl ContestType {
    pub fn as_str(&self) -> &str {
        match self {
            ContestType::Cf => "CF",
            ContestType::Icpc => "ICPC",
            ContestType::Ioi => "IOI",
            ContestType::Other(s) => s,
        }
    }
}

impl From<String> for ContestType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "CF" => ContestType::Cf,
            "ICPC" => ContestType::Icpc,
            "IOI" => ContestType::Ioi,
            _ => ContestType::Other(s),
        }
    }
}

impl From<ContestType> for String {
    fn from(t: ContestType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for ContestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle stage of a contest. Open set: unknown phases round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContestPhase {
    Before,
    Coding,
    PendingSystemTest,
    SystemTest,
    Finished,
    Other(String),
}

impl ContestPhase {
    pub fn as_str(&self) -> &str {
        match self {
            ContestPhase::Before => "BEFORE",
            ContestPhase::Coding => "CODING",
            ContestPhase::PendingSystemTest => "PENDING_SYSTEM_TEST",
            ContestPhase::SystemTest => "SYSTEM_TEST",
            ContestPhase::Finished => "FINISHED",
            ContestPhase::Other(s) => s,
        }
    }

    /// Human-readable label. Phases without a dedicated label show their raw value.
    pub fn label(&self) -> &str {
        match self {
            ContestPhase::Before => "Upcoming",
            ContestPhase::Coding => "Live",
            ContestPhase::Finished => "Completed",
            other => other.as_str(),
        }
    }
}

impl From<String> for ContestPhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "BEFORE" => ContestPhase::Before,
            "CODING" => ContestPhase::Coding,
            "PENDING_SYSTEM_TEST" => ContestPhase::PendingSystemTest,
            "SYSTEM_TEST" => ContestPhase::SystemTest,
            "FINISHED" => ContestPhase::Finished,
            _ => ContestPhase::Other(s),
        }
    }
}

impl From<ContestPhase> for String {
    fn from(p: ContestPhase) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for ContestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contest record, kept exactly as the catalog sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub contest_type: ContestType,
    pub phase: ContestPhase,
    // Some gym entries have no scheduled start
    #[serde(rename = "startTimeSeconds", default)]
    pub start_time_seconds: i64,
    #[serde(rename = "durationSeconds")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub frozen: bool,
    #[serde(
        rename = "relativeTimeSeconds",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub relative_time_seconds: Option<i64>,
}

impl Contest {
    /// Link to the contest page on Codeforces
    pub fn url(&self) -> String {
        format!("https://codeforces.com/contests/{}", self.id)
    }
}

/// Sort order for the contest list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    DurationDesc,
    DurationAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::DurationDesc,
        SortKey::DurationAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::DurationDesc => "duration-desc",
            SortKey::DurationAsc => "duration-asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::DateDesc => "Date (New to Old)",
            SortKey::DateAsc => "Date (Old to New)",
            SortKey::DurationDesc => "Duration (High to Low)",
            SortKey::DurationAsc => "Duration (Low to High)",
        }
    }

    /// Get the next sort key (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            SortKey::DateDesc => SortKey::DateAsc,
            SortKey::DateAsc => SortKey::DurationDesc,
            SortKey::DurationDesc => SortKey::DurationAsc,
            SortKey::DurationAsc => SortKey::DateDesc,
        }
    }
}

/// Either every value, or only one
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

/// Type filter choices offered to the user, in display order.
pub fn type_options() -> Vec<(&'static str, Selection<ContestType>)> {
    vec![
        ("All", Selection::All),
        ("ICPC", Selection::Only(ContestType::Icpc)),
        ("CF", Selection::Only(ContestType::Cf)),
    ]
}

/// Phase filter choices offered to the user, in display order.
pub fn phase_options() -> Vec<(&'static str, Selection<ContestPhase>)> {
    vec![
        ("All", Selection::All),
        ("Upcoming", Selection::Only(ContestPhase::Before)),
        ("Live", Selection::Only(ContestPhase::Coding)),
        ("Completed", Selection::Only(ContestPhase::Finished)),
    ]
}

/// Step to the option after `current`, wrapping. Unknown selections restart at the first option.
pub fn next_option<T: PartialEq + Clone>(
    options: &[(&'static str, Selection<T>)],
    current: &Selection<T>,
) -> Selection<T> {
    let idx = options.iter().position(|(_, s)| s == current);
    let next = match idx {
        Some(i) => (i + 1) % options.len(),
        None => 0,
    };
    options
        .get(next)
        .map(|(_, s)| s.clone())
        .unwrap_or(Selection::All)
}

/// Display label for a selection, falling back to the raw value.
pub fn selection_label<T: PartialEq + fmt::Display>(
    options: &[(&'static str, Selection<T>)],
    current: &Selection<T>,
) -> String {
    options
        .iter()
        .find(|(_, s)| s == current)
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| match current {
            Selection::All => "All".to_string(),
            Selection::Only(v) => v.to_string(),
        })
}

/// Response envelope returned by the catalog API.
#[derive(Debug, Deserialize)]
pub struct ContestListResponse {
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub result: Vec<Contest>,
}
