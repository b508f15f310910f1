//! Remote grading site access
//!
//! The grading database has no public API. A session is bootstrapped by
//! loading the landing page (cookie + hidden CSRF token) and searches are
//! then POSTed to the form handler as multipart fields, exactly as the site's
//! own search form does.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN};
use reqwest::multipart::Form;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::search_plan::SearchParams;
use crate::infrastructure::config::{EndpointConfig, HttpSettings};
use crate::infrastructure::http_client::{self, HttpClient, HttpError, SharedRateLimiter};
use crate::infrastructure::parsing::{LandingPageParser, CSRF_FIELD};

const SEARCH_ACTION: &str = "search_players";
const AJAX_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// Failure to establish a session; fatal for the whole batch
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Could not build HTTP client: {0}")]
    Client(String),

    #[error("Could not reach grading landing page {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("CSRF token not found on {url}; the page markup may have changed")]
    TokenNotFound { url: String },
}

/// Failure of a single search call; recovered by the resolver
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Transport(#[source] HttpError),

    #[error("Search token rejected with status {0}")]
    TokenRejected(StatusCode),
}

impl From<HttpError> for SearchError {
    fn from(error: HttpError) -> Self {
        match error.status() {
            Some(status) if is_token_rejection(status) => Self::TokenRejected(status),
            _ => Self::Transport(error),
        }
    }
}

/// 403 and 419 ("page expired") are how the form handler refuses a stale token
fn is_token_rejection(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status.as_u16() == 419
}

/// Access to the grading search, abstracted for the resolver
#[async_trait]
pub trait GradingBackend: Send + Sync {
    type Session: Send + Sync;

    /// Establish a session and scrape its CSRF token
    async fn open_session(&self) -> Result<Self::Session, BootstrapError>;

    /// Run one search and return the raw HTML fragment
    async fn search(&self, session: &Self::Session, params: &SearchParams) -> Result<String, SearchError>;
}

/// A bootstrapped session: its own cookie jar plus the scraped token
pub struct RemoteSession {
    client: HttpClient,
    token: String,
}

impl RemoteSession {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// `reqwest` implementation of [`GradingBackend`]
pub struct RemoteGradingBackend {
    endpoint: EndpointConfig,
    http: HttpSettings,
    rate_limiter: SharedRateLimiter,
    landing_parser: LandingPageParser,
}

impl RemoteGradingBackend {
    pub fn new(endpoint: EndpointConfig, http: HttpSettings) -> Result<Self, BootstrapError> {
        let rate_limiter = http_client::rate_limiter(&http).map_err(|e| BootstrapError::Client(e.to_string()))?;
        let landing_parser = LandingPageParser::new().map_err(|e| BootstrapError::Client(e.to_string()))?;
        Ok(Self {
            endpoint,
            http,
            rate_limiter,
            landing_parser,
        })
    }

    fn search_form(token: &str, params: &SearchParams) -> Form {
        Form::new()
            .text(CSRF_FIELD, token.to_string())
            .text("action", SEARCH_ACTION)
            .text("forename", params.forename.clone())
            .text("surname", params.surname.clone())
            .text("pnum", "")
            .text("gender", "")
            .text("club", params.club.clone())
            .text("fide_fed", "")
            .text("min_age", "")
            .text("max_age", "")
    }

    fn search_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
        headers.insert(ACCEPT, HeaderValue::from_static(AJAX_ACCEPT));
        match HeaderValue::from_str(&self.endpoint.origin) {
            Ok(origin) => {
                headers.insert(ORIGIN, origin);
            }
            Err(e) => warn!("Ignoring invalid origin '{}': {}", self.endpoint.origin, e),
        }
        headers
    }
}

#[async_trait]
impl GradingBackend for RemoteGradingBackend {
    type Session = RemoteSession;

    async fn open_session(&self) -> Result<RemoteSession, BootstrapError> {
        let url = &self.endpoint.landing_url;
        let client = HttpClient::new(&self.http, url, self.rate_limiter.clone())
            .map_err(|e| BootstrapError::Client(e.to_string()))?;

        let page = client.get_text(url).await.map_err(|source| BootstrapError::Connection {
            url: url.clone(),
            source,
        })?;

        let token = self
            .landing_parser
            .extract_csrf_token(&page)
            .map_err(|_| BootstrapError::TokenNotFound { url: url.clone() })?;

        info!("Grading session established ({} byte token)", token.len());
        Ok(RemoteSession { client, token })
    }

    async fn search(&self, session: &RemoteSession, params: &SearchParams) -> Result<String, SearchError> {
        debug!(
            forename = %params.forename,
            surname = %params.surname,
            club = %params.club,
            "Searching grading database"
        );
        let body = session
            .client
            .post_multipart(
                &self.endpoint.form_url,
                Self::search_form(&session.token, params),
                self.search_headers(),
            )
            .await?;
        Ok(extract_html_fragment(&body))
    }
}

/// Unwrap the HTML fragment from the form handler's response.
///
/// A JSON object's `html` string or a bare JSON string is the fragment; other
/// JSON carries no rows; anything that is not JSON is taken as HTML itself.
pub fn extract_html_fragment(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("html") {
            Some(serde_json::Value::String(html)) => html.clone(),
            _ => {
                debug!("JSON response without an html field");
                String::new()
            }
        },
        Ok(serde_json::Value::String(html)) => html,
        Ok(_) => String::new(),
        Err(_) => body.to_string(),
    }
}
