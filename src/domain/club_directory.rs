//! Club reference directory
//!
//! Static name↔code table loaded once per process and read-only afterwards.
//! Resolves free-form club text to the two-letter code the grading search
//! expects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// One row of the club reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubEntry {
    pub name: String,
    pub code: String,
}

/// Case-folded lookup over the club reference table
#[derive(Debug, Clone, Default)]
pub struct ClubDirectory {
    entries: Vec<ClubEntry>,
    by_folded_name: HashMap<String, String>,
}

impl ClubDirectory {
    /// Directory with no clubs. Only the two-character short-circuit resolves.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a directory from already parsed entries
    pub fn from_entries(entries: impl IntoIterator<Item = ClubEntry>) -> Self {
        let mut directory = Self::default();
        for entry in entries {
            directory.insert(entry);
        }
        directory
    }

    /// Load the `Full Club Name,CODE` table from disk.
    ///
    /// A missing or unreadable file yields an empty directory; the failure is
    /// logged and never fatal.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => {
                let directory = Self::from_reader(file);
                info!("Loaded {} clubs from {}", directory.len(), path.display());
                directory
            }
            Err(e) => {
                warn!("Club directory {} unavailable ({}); club names will not resolve", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Parse the club table from any reader. Malformed rows are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping unreadable club row {}: {}", line + 1, e);
                    continue;
                }
            };

            // A name may itself contain commas when unquoted, so the code is
            // always the last field. Fields are rejoined untrimmed so the
            // spacing inside the name survives.
            let fields: Vec<&str> = record.iter().collect();
            let Some((code, name_parts)) = fields.split_last() else {
                continue;
            };
            let code = code.trim();
            let name = name_parts.join(",").trim().to_string();
            if name.is_empty() || code.is_empty() {
                debug!("Skipping malformed club row {}: {:?}", line + 1, fields);
                continue;
            }

            entries.push(ClubEntry {
                name,
                code: code.to_uppercase(),
            });
        }

        Self::from_entries(entries)
    }

    /// Parse the club table from an in-memory string
    pub fn from_csv_str(content: &str) -> Self {
        Self::from_reader(content.as_bytes())
    }

    fn insert(&mut self, entry: ClubEntry) {
        self.by_folded_name
            .insert(entry.name.to_lowercase(), entry.code.clone());
        self.entries.push(entry);
    }

    /// Resolve free-form club text to a club code.
    ///
    /// Returns an empty string when nothing matches, meaning "no club filter".
    pub fn resolve_code(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return String::new();
        }

        // Two characters are always taken as a code, known or not.
        if query.chars().count() == 2 {
            return query.to_uppercase();
        }

        let folded = query.to_lowercase();
        if let Some(code) = self.by_folded_name.get(&folded) {
            return code.clone();
        }

        // Shortest containing name wins: "Stirling" beats "Stirling University".
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&folded))
            .min_by_key(|entry| entry.name.chars().count())
            .map(|entry| entry.code.clone())
            .unwrap_or_default()
    }

    /// Display name for a club code, if known
    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.code.eq_ignore_ascii_case(code.trim()))
            .map(|entry| entry.name.as_str())
    }

    /// Clubs in file order, for reference display
    pub fn clubs(&self) -> &[ClubEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    fn stirling_directory() -> ClubDirectory {
        ClubDirectory::from_csv_str("Stirling,ST\nStirling University,SU\nCrowwood,CW\nD.N.A.,DN\n")
    }

    #[test]
    fn test_exact_name_match() {
        let directory = stirling_directory();
        assert_eq!(directory.resolve_code("Crowwood"), "CW");
        assert_eq!(directory.resolve_code("crowwood"), "CW");
        assert_eq!(directory.resolve_code("Stirling University"), "SU");
    }

    #[test]
    fn test_shortest_substring_match_wins() {
        let directory = stirling_directory();
        assert_eq!(directory.resolve_code("Stirling"), "ST");
        assert_eq!(directory.resolve_code("stirl"), "ST");
        assert_eq!(directory.resolve_code("University"), "SU");
    }

    #[test]
    fn test_two_characters_short_circuit() {
        let directory = stirling_directory();
        assert_eq!(directory.resolve_code("st"), "ST");
        assert_eq!(directory.resolve_code("bo"), "BO");
        assert_eq!(ClubDirectory::empty().resolve_code("zz"), "ZZ");
    }

    #[test]
    fn test_unknown_and_empty_queries() {
        let directory = stirling_directory();
        assert_eq!(directory.resolve_code(""), "");
        assert_eq!(directory.resolve_code("   "), "");
        assert_eq!(directory.resolve_code("Nowhere Chess Club"), "");
    }

    #[test]
    fn test_names_with_commas_and_malformed_rows() {
        let directory = ClubDirectory::from_csv_str(
            "\"Edinburgh, West\",EW\nNo code row\n,XX\nBon Accord,ba\n",
        );
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.resolve_code("edinburgh, west"), "EW");
        assert_eq!(directory.resolve_code("Bon Accord"), "BA");
        assert_eq!(directory.name_for_code("ew"), Some("Edinburgh, West"));
    }

    #[test]
    fn test_unquoted_name_with_comma_keeps_spacing() {
        let directory = ClubDirectory::from_csv_str("Edinburgh, West,EW\nStirling , st \n");
        assert_eq!(
            directory.clubs(),
            &[
                ClubEntry { name: "Edinburgh, West".into(), code: "EW".into() },
                ClubEntry { name: "Stirling".into(), code: "ST".into() },
            ]
        );
        assert_eq!(directory.resolve_code("Edinburgh, West"), "EW");
        assert_eq!(directory.resolve_code("h, We"), "EW");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Stirling,ST").unwrap();
        writeln!(file, "Crowwood,CW").unwrap();

        let directory = ClubDirectory::load(file.path());
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.clubs()[1], ClubEntry { name: "Crowwood".into(), code: "CW".into() });
    }

    #[test]
    fn test_missing_file_gives_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let directory = ClubDirectory::load(dir.path().join("missing.csv"));
        assert!(directory.is_empty());
        assert_eq!(directory.resolve_code("Stirling"), "");
        assert_eq!(directory.resolve_code("st"), "ST");
    }

    proptest! {
        #[test]
        fn two_char_queries_resolve_to_themselves(query in "[a-zA-Z0-9]{2}") {
            let directory = stirling_directory();
            prop_assert_eq!(directory.resolve_code(&query), query.to_uppercase());
        }

        #[test]
        fn exact_names_resolve_to_their_code(name in "[A-Za-z][A-Za-z ]{2,20}[A-Za-z]", code in "[A-Z]{2}") {
            let directory = ClubDirectory::from_entries([ClubEntry { name: name.clone(), code: code.clone() }]);
            prop_assert_eq!(directory.resolve_code(&name), code);
        }

        #[test]
        fn comma_names_survive_the_club_file(
            head in "[A-Za-z]{2,10}",
            tail in "[A-Za-z]{2,10}",
            code in "[A-Z]{2}",
        ) {
            let name = format!("{head}, {tail}");
            let directory = ClubDirectory::from_csv_str(&format!("{name},{code}\n"));
            prop_assert_eq!(directory.clubs()[0].name.as_str(), name.as_str());
            prop_assert_eq!(directory.resolve_code(&name), code);
        }
    }
}
