//! Query line parsing
//!
//! Each input line is `Name` or `Name, Club`. The trimmed raw line doubles as
//! the cache key.

use serde::{Deserialize, Serialize};

/// One parsed input line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    raw: String,
    name_part: String,
    club_part: String,
    is_single_token: bool,
}

impl Query {
    /// Parse a raw input line.
    ///
    /// Splits on the first comma. Returns `None` only when both the name and
    /// the club part are empty after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (name, club) = match raw.split_once(',') {
            Some((name, club)) => (name.trim(), club.trim()),
            None => (raw.trim(), ""),
        };

        if name.is_empty() && club.is_empty() {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            name_part: name.to_string(),
            club_part: club.to_string(),
            is_single_token: name.split_whitespace().count() == 1,
        })
    }

    /// Parse every line of a text block, dropping empty lines
    pub fn parse_lines<'a, I>(lines: I) -> Vec<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().filter_map(Self::parse).collect()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn name_part(&self) -> &str {
        &self.name_part
    }

    pub fn club_part(&self) -> &str {
        &self.club_part
    }

    pub fn is_single_token(&self) -> bool {
        self.is_single_token
    }

    /// Whitespace separated name tokens
    pub fn name_tokens(&self) -> Vec<&str> {
        self.name_part.split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Nathanael Loch", "Nathanael Loch", "", false)]
    #[case("  Nat  ", "Nat", "", true)]
    #[case("Nat, Stirling", "Nat", "Stirling", true)]
    #[case(", ST", "", "ST", false)]
    #[case("Loch, ST, extra", "Loch", "ST, extra", true)]
    #[case("Mary Ann Smith ,  CW ", "Mary Ann Smith", "CW", false)]
    fn test_parse_shapes(
        #[case] raw: &str,
        #[case] name: &str,
        #[case] club: &str,
        #[case] single: bool,
    ) {
        let query = Query::parse(raw).unwrap();
        assert_eq!(query.raw(), raw.trim());
        assert_eq!(query.name_part(), name);
        assert_eq!(query.club_part(), club);
        assert_eq!(query.is_single_token(), single);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case(" , ")]
    #[case(",")]
    fn test_blank_lines_are_dropped(#[case] raw: &str) {
        assert!(Query::parse(raw).is_none());
    }

    #[test]
    fn test_parse_lines_keeps_order() {
        let queries = Query::parse_lines("Nat\n\nLoch, ST\n , \nst".lines());
        let raws: Vec<&str> = queries.iter().map(Query::raw).collect();
        assert_eq!(raws, vec!["Nat", "Loch, ST", "st"]);
    }
}
