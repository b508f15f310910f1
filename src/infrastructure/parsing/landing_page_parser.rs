//! Landing page parser
//!
//! Pulls the anti-forgery token out of the grading landing page.

use super::compile_selector;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
use scraper::{Html, Selector};

/// Name of the hidden form field carrying the token
pub const CSRF_FIELD: &str = "_csrf_token";

pub struct LandingPageParser {
    token_input: Selector,
}

impl LandingPageParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            token_input: compile_selector(&format!("input[name=\"{CSRF_FIELD}\"]"))?,
        })
    }

    /// Value of the first non-empty token field
    pub fn extract_csrf_token(&self, html: &str) -> ParsingResult<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.token_input)
            .filter_map(|input| input.value().attr("value"))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| ParsingError::required_field_missing(CSRF_FIELD, Some("landing page")))
    }
}
