//! Search planning
//!
//! Turns a parsed [`Query`] into the exact set of remote searches to issue.
//! Planning is pure; execution lives in the application layer.

use super::club_directory::ClubDirectory;
use super::player::InvalidQuery;
use super::query::Query;
use serde::{Deserialize, Serialize};

/// Identity and filter fields of one remote search call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub forename: String,
    pub surname: String,
    pub club: String,
}

impl SearchParams {
    pub fn new(forename: impl Into<String>, surname: impl Into<String>, club: impl Into<String>) -> Self {
        Self {
            forename: forename.into(),
            surname: surname.into(),
            club: club.into(),
        }
    }
}

/// What to search for a single query line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    /// No name, only a club filter: one search
    ClubOnly { club: String },
    /// One name token that may be a forename or a surname: two searches
    EitherName { token: String, club: String },
    /// Several tokens: last is the surname, the rest the forename
    FullName {
        forename: String,
        surname: String,
        club: String,
    },
    /// Nothing is searched
    Rejected(InvalidQuery),
}

impl SearchPlan {
    /// Plan the searches for `query`, resolving its club through `directory`.
    pub fn for_query(query: &Query, directory: &ClubDirectory, min_name_length: usize) -> Self {
        let mut name = query.name_part().to_string();
        let club = if !query.club_part().is_empty() {
            directory.resolve_code(query.club_part())
        } else if query.is_single_token() && name.chars().count() == 2 {
            // A bare two-letter line is a club code, not a name.
            std::mem::take(&mut name).to_uppercase()
        } else {
            String::new()
        };

        if !name.is_empty() && name.chars().count() < min_name_length {
            return Self::Rejected(InvalidQuery::NameTooShort {
                name,
                min_length: min_name_length,
            });
        }

        if name.is_empty() {
            if club.is_empty() {
                return Self::Rejected(InvalidQuery::UnresolvedClub {
                    club: query.club_part().to_string(),
                });
            }
            return Self::ClubOnly { club };
        }

        let tokens: Vec<&str> = name.split_whitespace().collect();
        match tokens.split_last() {
            Some((surname, forenames)) if !forenames.is_empty() => Self::FullName {
                forename: forenames.join(" "),
                surname: (*surname).to_string(),
                club,
            },
            _ => Self::EitherName { token: name, club },
        }
    }

    /// Searches to issue, in merge order
    pub fn searches(&self) -> Vec<SearchParams> {
        match self {
            Self::ClubOnly { club } => vec![SearchParams::new("", "", club.as_str())],
            Self::EitherName { token, club } => vec![
                SearchParams::new(token.as_str(), "", club.as_str()),
                SearchParams::new("", token.as_str(), club.as_str()),
            ],
            Self::FullName {
                forename,
                surname,
                club,
            } => vec![SearchParams::new(forename.as_str(), surname.as_str(), club.as_str())],
            Self::Rejected(_) => Vec::new(),
        }
    }

    /// Client-side name filter applied to returned rows.
    ///
    /// The remote search returns superset matches for full names, so rows
    /// whose name lacks the surname are dropped.
    pub fn name_filter(&self) -> Option<&str> {
        match self {
            Self::FullName { surname, .. } => Some(surname),
            _ => None,
        }
    }

    /// Short label for logging
    pub fn shape(&self) -> &'static str {
        match self {
            Self::ClubOnly { .. } => "club-only",
            Self::EitherName { .. } => "single-token",
            Self::FullName { .. } => "full-name",
            Self::Rejected(_) => "rejected",
        }
    }
}
