//! Grading Service
//!
//! Entry points used by front ends: batch resolution through the shared
//! result cache, and the club listing.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::batch_resolution::BatchResolution;
use super::query_resolver::QueryResolver;
use super::result_cache::ResultCache;
use crate::domain::{ClubDirectory, ClubEntry, Query, QueryResult};
use crate::infrastructure::config::ResolverConfig;
use crate::infrastructure::grading_backend::{BootstrapError, GradingBackend};
use crate::infrastructure::parsing::ParsingError;

#[derive(Error, Debug)]
pub enum GradingError {
    /// No session could be established; nothing in the batch was resolved
    #[error("Could not open a grading session: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Result parser setup failed: {0}")]
    Parser(#[from] ParsingError),
}

pub struct GradingService<B: GradingBackend> {
    backend: B,
    clubs: Arc<ClubDirectory>,
    resolver: QueryResolver,
    // Held for a whole batch so concurrent batches never fetch the same line twice
    cache: Mutex<ResultCache>,
}

impl<B: GradingBackend> GradingService<B> {
    pub fn new(backend: B, clubs: ClubDirectory, config: ResolverConfig) -> Result<Self, GradingError> {
        let clubs = Arc::new(clubs);
        let resolver = QueryResolver::new(clubs.clone(), config)?;
        Ok(Self {
            backend,
            clubs,
            resolver,
            cache: Mutex::new(ResultCache::new()),
        })
    }

    /// Resolve raw input lines. Blank lines are dropped.
    pub async fn resolve_batch<I, S>(&self, lines: I) -> Result<BatchResolution, GradingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries: Vec<Query> = lines.into_iter().filter_map(|line| Query::parse(line.as_ref())).collect();
        self.resolve_queries(queries).await
    }

    /// Resolve already parsed queries; results come back in input order
    pub async fn resolve_queries(&self, queries: Vec<Query>) -> Result<BatchResolution, GradingError> {
        let mut cache = self.cache.lock().await;
        let fetched = cache
            .merge_missing(&queries, |missing| self.resolver.resolve_all(&self.backend, missing))
            .await?;

        let fetched_lines = fetched.len();
        let mut transport_failures = Vec::new();
        let mut fresh: HashMap<String, QueryResult> = HashMap::with_capacity(fetched.len());
        for line in fetched {
            if !line.is_cacheable() {
                warn!("'{}' had {} failed search(es); not cached", line.raw, line.transport_failures);
                transport_failures.push(line.raw.clone());
            }
            fresh.insert(line.raw, line.result);
        }

        let mut entries: Vec<(String, QueryResult)> = Vec::with_capacity(queries.len());
        for query in &queries {
            if entries.iter().any(|(raw, _)| raw == query.raw()) {
                continue;
            }
            let result = fresh
                .get(query.raw())
                .or_else(|| cache.get(query.raw()))
                .cloned()
                .unwrap_or(QueryResult::NotFound);
            entries.push((query.raw().to_string(), result));
        }

        let cache_hits = entries.len().saturating_sub(fetched_lines);
        info!("✅ Resolved {} line(s), {} from cache", entries.len(), cache_hits);
        Ok(BatchResolution::new(entries, transport_failures, cache_hits))
    }

    /// Club reference list as `{name, code}` pairs
    pub fn clubs(&self) -> &[ClubEntry] {
        self.clubs.clubs()
    }

    pub fn club_directory(&self) -> &ClubDirectory {
        &self.clubs
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Number of cached raw lines
    pub async fn cached_lines(&self) -> usize {
        self.cache.lock().await.len()
    }
}
