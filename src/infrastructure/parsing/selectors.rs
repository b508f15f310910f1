//! Selector configuration for the grading result table
//!
//! The server marks most cells with a `data-column` attribute. The club cell
//! is the exception and is located by position instead.

use serde::{Deserialize, Serialize};

/// Column markers of the search result rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTableSelectors {
    pub row: String,
    pub cell: String,
    /// Attribute naming the column of a cell
    pub column_attribute: String,
    /// Zero-based position of the unmarked club cell
    pub club_cell_index: usize,
    pub pnum: String,
    pub name: String,
    pub status: String,
    pub standard_published: String,
    pub standard_live: String,
    pub allegro_published: String,
    pub allegro_live: String,
    pub blitz_published: String,
    pub blitz_live: String,
}

impl Default for PlayerTableSelectors {
    fn default() -> Self {
        Self {
            row: "tr".to_string(),
            cell: "td".to_string(),
            column_attribute: "data-column".to_string(),
            club_cell_index: 2,
            pnum: "pnum".to_string(),
            name: "name".to_string(),
            status: "status".to_string(),
            standard_published: "standard_published".to_string(),
            standard_live: "standard_live".to_string(),
            allegro_published: "allegro_published".to_string(),
            allegro_live: "allegro_live".to_string(),
            blitz_published: "blitz_published".to_string(),
            blitz_live: "blitz_live".to_string(),
        }
    }
}

impl PlayerTableSelectors {
    /// CSS selector for the cell carrying `column`
    pub fn column_selector(&self, column: &str) -> String {
        format!("{}[{}=\"{}\"]", self.cell, self.column_attribute, column)
    }
}
