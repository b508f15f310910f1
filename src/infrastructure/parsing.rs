//! HTML parsing infrastructure for the grading site
//!
//! Selector-driven extraction with best-effort semantics: malformed rows are
//! skipped and only unusable selectors are reported as errors.

pub mod landing_page_parser;
pub mod player_table_parser;
pub mod selectors;

pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use landing_page_parser::{LandingPageParser, CSRF_FIELD};
pub use player_table_parser::{sanitize_grade, status_to_age, PlayerTableParser};
pub use selectors::PlayerTableSelectors;

use scraper::Selector;
use tracing::warn;

/// Compile one CSS selector, reporting failures as [`ParsingError`]
pub(crate) fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| {
        warn!("Failed to compile selector '{}': {}", selector, e);
        ParsingError::invalid_selector(selector, e)
    })
}
