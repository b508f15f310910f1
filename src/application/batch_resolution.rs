//! Batch-level view of resolved query lines

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

use crate::domain::{MatchKind, PlayerRecord, QueryResult};

/// Results of one batch, in input order, one entry per distinct raw line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResolution {
    entries: Vec<(String, QueryResult)>,
    transport_failures: Vec<String>,
    cache_hits: usize,
}

impl BatchResolution {
    pub fn new(entries: Vec<(String, QueryResult)>, transport_failures: Vec<String>, cache_hits: usize) -> Self {
        Self {
            entries,
            transport_failures,
            cache_hits,
        }
    }

    pub fn get(&self, raw: &str) -> Option<&QueryResult> {
        self.entries
            .iter()
            .find(|(line, _)| line == raw)
            .map(|(_, result)| result)
    }

    pub fn match_kind(&self, raw: &str) -> Option<MatchKind> {
        self.get(raw).map(QueryResult::match_kind)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &QueryResult)> {
        self.entries.iter().map(|(raw, result)| (raw.as_str(), result))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines with at least one failed search; their result may be incomplete
    pub fn transport_failures(&self) -> &[String] {
        &self.transport_failures
    }

    /// Lines answered from the cache without a request
    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Number of lines per match kind
    pub fn summary(&self) -> HashMap<MatchKind, usize> {
        let mut counts = HashMap::new();
        for (_, result) in &self.entries {
            *counts.entry(result.match_kind()).or_insert(0) += 1;
        }
        counts
    }

    /// Every player of the batch once, keyed by pnum.
    ///
    /// A record from an exact-match line replaces a same-pnum record that
    /// only appeared inside a multiple-match line; otherwise first seen wins.
    pub fn unique_players(&self) -> Vec<PlayerRecord> {
        let mut players: Vec<(PlayerRecord, bool)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (_, result) in &self.entries {
            let exact = result.match_kind() == MatchKind::Exact;
            for record in result.records() {
                match index.get(&record.pnum) {
                    Some(&at) => {
                        if exact && !players[at].1 {
                            players[at] = (record.clone(), true);
                        }
                    }
                    None => {
                        index.insert(record.pnum.clone(), players.len());
                        players.push((record.clone(), exact));
                    }
                }
            }
        }

        players.into_iter().map(|(record, _)| record).collect()
    }
}

/// Serialised as an ordered map of raw line to result
impl Serialize for BatchResolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (raw, result) in &self.entries {
            map.serialize_entry(raw, result)?;
        }
        map.end()
    }
}
