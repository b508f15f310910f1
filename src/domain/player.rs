//! Player records and per-line query results

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One player row as returned by the grading search.
///
/// Grade fields are either a numeric string or empty (ungraded / unknown).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Stable external identifier, the dedup key
    pub pnum: String,
    /// "Surname, Forename"
    pub name: String,
    /// Club code, possibly several comma-separated codes
    pub club: String,
    /// "Adult", "New", "Junior", a junior's numeric age, or the raw status
    pub age: String,
    pub standard_published: String,
    pub standard_live: String,
    pub allegro_published: String,
    pub allegro_live: String,
    pub blitz_published: String,
    pub blitz_live: String,
}

impl PlayerRecord {
    /// Club codes split out of the comma-separated club field
    pub fn club_codes(&self) -> Vec<&str> {
        self.club
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .collect()
    }

    /// Case-insensitive substring test against the name field
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Why a query line was rejected without searching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InvalidQuery {
    /// Name present but shorter than the minimum length
    NameTooShort { name: String, min_length: usize },
    /// Club-only query whose club text resolved to no code.
    ///
    /// An extension of the grading rules: the line would otherwise run an
    /// unfiltered scan of the whole database, so it is rejected instead. A
    /// name with an unknown club still searches without a club filter.
    UnresolvedClub { club: String },
}

impl fmt::Display for InvalidQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameTooShort { name, min_length } => {
                write!(f, "'{name}' is too short (min {min_length} chars required)")
            }
            Self::UnresolvedClub { club } => write!(f, "club '{club}' not recognised"),
        }
    }
}

/// Outcome of resolving one query line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum QueryResult {
    /// Non-empty, in server order, unique by pnum
    Found(Vec<PlayerRecord>),
    NotFound,
    Invalid(InvalidQuery),
}

impl QueryResult {
    /// Wrap a merged record list, mapping an empty list to `NotFound`
    pub fn from_records(records: Vec<PlayerRecord>) -> Self {
        if records.is_empty() {
            Self::NotFound
        } else {
            Self::Found(records)
        }
    }

    pub fn records(&self) -> &[PlayerRecord] {
        match self {
            Self::Found(records) => records,
            Self::NotFound | Self::Invalid(_) => &[],
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn match_kind(&self) -> MatchKind {
        match self {
            Self::Found(records) if records.len() == 1 => MatchKind::Exact,
            Self::Found(_) => MatchKind::Multiple,
            Self::NotFound => MatchKind::NotFound,
            Self::Invalid(_) => MatchKind::Invalid,
        }
    }
}

/// Display classification of a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Multiple,
    NotFound,
    Invalid,
}

/// Append `incoming` to `merged`, skipping pnums already present.
///
/// First occurrence wins, so callers control precedence by merge order.
pub fn merge_unique(merged: &mut Vec<PlayerRecord>, incoming: Vec<PlayerRecord>) {
    let mut seen: HashSet<String> = merged.iter().map(|r| r.pnum.clone()).collect();
    for record in incoming {
        if seen.insert(record.pnum.clone()) {
            merged.push(record);
        }
    }
}
