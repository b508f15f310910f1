//! Per-process result cache keyed by raw query line
//!
//! Entries are never evicted or refreshed: a line resolved once is answered
//! from memory for the rest of the process lifetime.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use tracing::info;

use super::query_resolver::LineResolution;
use crate::domain::{Query, QueryResult};

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, QueryResult>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, raw: &str) -> Option<&QueryResult> {
        self.entries.get(raw)
    }

    pub fn put(&mut self, raw: impl Into<String>, result: QueryResult) {
        self.entries.insert(raw.into(), result);
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queries whose raw line is not cached, first occurrence only
    pub fn missing(&self, queries: &[Query]) -> Vec<Query> {
        let mut seen = HashSet::new();
        queries
            .iter()
            .filter(|query| !self.contains(query.raw()) && seen.insert(query.raw()))
            .cloned()
            .collect()
    }

    /// Fetch the uncached subset of `queries` through `fetch` and store the
    /// cacheable results.
    ///
    /// `fetch` is not called at all when every line is cached. Returns the
    /// freshly fetched lines, including the ones that were not cached.
    pub async fn merge_missing<F, Fut, E>(&mut self, queries: &[Query], fetch: F) -> Result<Vec<LineResolution>, E>
    where
        F: FnOnce(Vec<Query>) -> Fut,
        Fut: Future<Output = Result<Vec<LineResolution>, E>>,
    {
        let missing = self.missing(queries);
        info!(
            "📦 Cache: {} line(s) cached, {} to fetch",
            queries.len().saturating_sub(missing.len()),
            missing.len()
        );
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = fetch(missing).await?;
        for line in fetched.iter().filter(|line| line.is_cacheable()) {
            self.put(line.raw.clone(), line.result.clone());
        }
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlayerRecord;

    fn found(pnum: &str) -> QueryResult {
        QueryResult::Found(vec![PlayerRecord {
            pnum: pnum.into(),
            name: "Doe, John".into(),
            ..Default::default()
        }])
    }

    fn resolved(raw: &str, result: QueryResult, transport_failures: usize) -> LineResolution {
        LineResolution {
            raw: raw.into(),
            result,
            transport_failures,
        }
    }

    #[tokio::test]
    async fn test_only_missing_lines_are_fetched() {
        let mut cache = ResultCache::new();
        cache.put("John Doe", found("1"));

        let queries = Query::parse_lines(["John Doe", "Jane Roe", "Jane Roe"]);
        let fetched = cache
            .merge_missing(&queries, |missing| async move {
                let raws: Vec<&str> = missing.iter().map(Query::raw).collect();
                assert_eq!(raws, vec!["Jane Roe"]);
                Ok::<_, ()>(vec![resolved("Jane Roe", found("2"), 0)])
            })
            .await
            .unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(cache.get("Jane Roe"), Some(&found("2")));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_fully_cached_batch_skips_fetch() {
        let mut cache = ResultCache::new();
        cache.put("John Doe", found("1"));

        let queries = Query::parse_lines(["John Doe"]);
        let fetched = cache
            .merge_missing(&queries, |_| async { Err::<Vec<LineResolution>, _>("fetch must not run") })
            .await
            .unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_failed_lines_are_not_cached() {
        let mut cache = ResultCache::new();
        let queries = Query::parse_lines(["John Doe"]);
        cache
            .merge_missing(&queries, |_| async {
                Ok::<_, ()>(vec![resolved("John Doe", QueryResult::NotFound, 1)])
            })
            .await
            .unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_leaves_cache_untouched() {
        let mut cache = ResultCache::new();
        let queries = Query::parse_lines(["John Doe"]);
        let result = cache
            .merge_missing(&queries, |_| async { Err::<Vec<LineResolution>, _>("bootstrap failed") })
            .await;
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
