//! HTTP client for the grading site with rate limiting and error handling
//!
//! Wraps a cookie-carrying `reqwest` client so the session cookie set by the
//! landing page travels with every later search. Requests share a rate
//! limiter so one batch never hammers the remote form handler.

use governor::{
    clock::DefaultClock,
    state::{direct::NotKeyed, InMemoryState},
    Quota, RateLimiter,
};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::infrastructure::config::HttpSettings;

pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {message}")]
    Build { message: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed with status {status}: {url}")]
    Status { status: StatusCode, url: String },
}

impl HttpError {
    /// Status code for `Status` errors
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Build the shared limiter from the configured request rate
pub fn rate_limiter(settings: &HttpSettings) -> Result<SharedRateLimiter, HttpError> {
    let per_second = NonZeroU32::new(settings.max_requests_per_second).ok_or_else(|| HttpError::Build {
        message: "Rate limit must be greater than 0".to_string(),
    })?;
    Ok(Arc::new(RateLimiter::direct(Quota::per_second(per_second))))
}

/// Cookie-carrying HTTP client bound to one grading session
pub struct HttpClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
}

impl HttpClient {
    /// Create a client with a fresh cookie jar.
    ///
    /// `referer` is sent on every request, as a browser would after loading
    /// the landing page.
    pub fn new(settings: &HttpSettings, referer: &str, rate_limiter: SharedRateLimiter) -> Result<Self, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent).map_err(|e| HttpError::Build {
                message: format!("Invalid user agent: {e}"),
            })?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(referer).map_err(|e| HttpError::Build {
                message: format!("Invalid referer: {e}"),
            })?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .default_headers(headers)
            .cookie_store(true)
            .redirect(if settings.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| HttpError::Build {
                message: e.to_string(),
            })?;

        Ok(Self { client, rate_limiter })
    }

    /// Fetch URL and return text content
    pub async fn get_text(&self, url: &str) -> Result<String, HttpError> {
        self.rate_limiter.until_ready().await;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| transport(url, source))?;

        Self::read_body(url, response).await
    }

    /// POST a multipart form and return the response body
    pub async fn post_multipart(&self, url: &str, form: Form, headers: HeaderMap) -> Result<String, HttpError> {
        self.rate_limiter.until_ready().await;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .headers(headers)
            .multipart(form)
            .send()
            .await
            .map_err(|source| transport(url, source))?;

        Self::read_body(url, response).await
    }

    async fn read_body(url: &str, response: reqwest::Response) -> Result<String, HttpError> {
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status,
                url: url.to_string(),
            });
        }

        let text = response.text().await.map_err(|source| transport(url, source))?;
        tracing::debug!("Fetched {} ({} chars)", url, text.len());
        Ok(text)
    }
}

fn transport(url: &str, source: reqwest::Error) -> HttpError {
    HttpError::Transport {
        url: url.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_client_creation() {
        let settings = HttpSettings::default();
        let limiter = rate_limiter(&settings).unwrap();
        let client = HttpClient::new(&settings, "https://example.com/grading", limiter);
        assert!(client.is_ok());
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        let settings = HttpSettings {
            max_requests_per_second: 0,
            ..Default::default()
        };
        assert!(matches!(rate_limiter(&settings), Err(HttpError::Build { .. })));
    }

    #[test]
    fn test_invalid_user_agent_is_rejected() {
        let settings = HttpSettings {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        let limiter = rate_limiter(&HttpSettings::default()).unwrap();
        assert!(HttpClient::new(&settings, "https://example.com", limiter).is_err());
    }
}
