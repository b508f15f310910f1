//! Query Resolver
//!
//! Executes the search plan of each query line against a [`GradingBackend`]:
//! one session per batch (opened lazily), one or two searches per line,
//! client-side name filtering and pnum deduplication of the merged rows.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{merge_unique, ClubDirectory, PlayerRecord, Query, QueryResult, SearchParams, SearchPlan};
use crate::infrastructure::config::ResolverConfig;
use crate::infrastructure::grading_backend::{BootstrapError, GradingBackend, SearchError};
use crate::infrastructure::parsing::{ParsingResult, PlayerTableParser};

/// Result of resolving one query line
#[derive(Debug, Clone, PartialEq)]
pub struct LineResolution {
    pub raw: String,
    pub result: QueryResult,
    /// Searches for this line that failed and were counted as empty
    pub transport_failures: usize,
}

impl LineResolution {
    /// Lines with a failed search may be incomplete and are never cached
    pub fn is_cacheable(&self) -> bool {
        self.transport_failures == 0
    }
}

/// Session shared by every search of one batch
struct BatchSession<S> {
    session: Option<S>,
    rebootstrapped: bool,
}

impl<S> BatchSession<S> {
    fn new() -> Self {
        Self {
            session: None,
            rebootstrapped: false,
        }
    }

    async fn get<B>(&mut self, backend: &B) -> Result<&S, BootstrapError>
    where
        B: GradingBackend<Session = S>,
    {
        let session = match self.session.take() {
            Some(session) => session,
            None => backend.open_session().await?,
        };
        Ok(self.session.insert(session))
    }

    async fn reopen<B>(&mut self, backend: &B) -> Result<&S, BootstrapError>
    where
        B: GradingBackend<Session = S>,
    {
        self.rebootstrapped = true;
        self.session = None;
        self.get(backend).await
    }
}

pub struct QueryResolver {
    clubs: Arc<ClubDirectory>,
    parser: PlayerTableParser,
    config: ResolverConfig,
}

impl QueryResolver {
    pub fn new(clubs: Arc<ClubDirectory>, config: ResolverConfig) -> ParsingResult<Self> {
        Ok(Self {
            clubs,
            parser: PlayerTableParser::new()?,
            config,
        })
    }

    /// Plan the searches for one query
    pub fn plan(&self, query: &Query) -> SearchPlan {
        SearchPlan::for_query(query, &self.clubs, self.config.min_name_length)
    }

    /// Resolve `queries` in order.
    ///
    /// The session is opened on the first search that needs it, so a batch of
    /// rejected lines does no network I/O. A failed bootstrap aborts the whole
    /// batch; failed searches only empty their own line.
    pub async fn resolve_all<B: GradingBackend>(
        &self,
        backend: &B,
        queries: Vec<Query>,
    ) -> Result<Vec<LineResolution>, BootstrapError> {
        let mut session = BatchSession::new();
        let mut resolved = Vec::with_capacity(queries.len());

        for query in queries {
            let plan = self.plan(&query);
            debug!("Resolving '{}' as {}", query.raw(), plan.shape());

            let line = match plan {
                SearchPlan::Rejected(reason) => {
                    info!("Invalid query '{}': {}", query.raw(), reason);
                    LineResolution {
                        raw: query.raw().to_string(),
                        result: QueryResult::Invalid(reason),
                        transport_failures: 0,
                    }
                }
                plan => self.execute(backend, &mut session, &query, &plan).await?,
            };
            resolved.push(line);
        }

        Ok(resolved)
    }

    async fn execute<B: GradingBackend>(
        &self,
        backend: &B,
        session: &mut BatchSession<B::Session>,
        query: &Query,
        plan: &SearchPlan,
    ) -> Result<LineResolution, BootstrapError> {
        let mut merged: Vec<PlayerRecord> = Vec::new();
        let mut transport_failures = 0;

        for params in plan.searches() {
            match self.search(backend, session, &params).await? {
                Some(html) => merge_unique(&mut merged, self.parser.parse_players(&html, plan.name_filter())),
                None => transport_failures += 1,
            }
        }

        debug!("'{}' matched {} player(s)", query.raw(), merged.len());
        Ok(LineResolution {
            raw: query.raw().to_string(),
            result: QueryResult::from_records(merged),
            transport_failures,
        })
    }

    /// One search call; `Ok(None)` is a soft failure counted as no rows
    async fn search<B: GradingBackend>(
        &self,
        backend: &B,
        session: &mut BatchSession<B::Session>,
        params: &SearchParams,
    ) -> Result<Option<String>, BootstrapError> {
        let current = session.get(backend).await?;
        let status = match backend.search(current, params).await {
            Ok(html) => return Ok(Some(html)),
            Err(SearchError::TokenRejected(status)) => status,
            Err(e) => {
                warn!("Search {:?} failed: {}", params, e);
                return Ok(None);
            }
        };

        if !self.config.rebootstrap_on_token_rejection || session.rebootstrapped {
            warn!("Search token rejected ({}), treating {:?} as empty", status, params);
            return Ok(None);
        }

        warn!("🔄 Search token rejected ({}), re-opening session once", status);
        let fresh = session.reopen(backend).await?;
        match backend.search(fresh, params).await {
            Ok(html) => Ok(Some(html)),
            Err(e) => {
                warn!("Retried search {:?} failed: {}", params, e);
                Ok(None)
            }
        }
    }
}
