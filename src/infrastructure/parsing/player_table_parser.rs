//! Player result table parser
//!
//! Converts the HTML fragment returned by a grading search into
//! [`PlayerRecord`]s. Parsing is best effort: rows without a pnum or name
//! cell are skipped, never reported as errors.

use super::selectors::PlayerTableSelectors;
use super::compile_selector;
use crate::domain::player::PlayerRecord;
use crate::infrastructure::parsing_error::ParsingResult;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Grade-cell placeholders that mean "ungraded" or "not applicable"
const GRADE_PLACEHOLDERS: &[&str] = &["", "-", "\u{2014}", "&mdash;"];

/// Compiled selectors for one result table layout
pub struct PlayerTableParser {
    row: Selector,
    cell: Selector,
    column_attribute: String,
    club_cell_index: usize,
    pnum: Selector,
    name: Selector,
    status: Selector,
    standard_published: Selector,
    standard_live: Selector,
    allegro_published: Selector,
    allegro_live: Selector,
    blitz_published: Selector,
    blitz_live: Selector,
}

impl PlayerTableParser {
    /// Create a parser for the default table layout
    pub fn new() -> ParsingResult<Self> {
        Self::with_selectors(&PlayerTableSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_selectors(selectors: &PlayerTableSelectors) -> ParsingResult<Self> {
        let column = |name: &str| compile_selector(&selectors.column_selector(name));
        Ok(Self {
            row: compile_selector(&selectors.row)?,
            cell: compile_selector(&selectors.cell)?,
            column_attribute: selectors.column_attribute.clone(),
            club_cell_index: selectors.club_cell_index,
            pnum: column(&selectors.pnum)?,
            name: column(&selectors.name)?,
            status: column(&selectors.status)?,
            standard_published: column(&selectors.standard_published)?,
            standard_live: column(&selectors.standard_live)?,
            allegro_published: column(&selectors.allegro_published)?,
            allegro_live: column(&selectors.allegro_live)?,
            blitz_published: column(&selectors.blitz_published)?,
            blitz_live: column(&selectors.blitz_live)?,
        })
    }

    /// Parse every player row in `html`.
    ///
    /// With `name_filter`, rows whose name does not contain it
    /// (case-insensitive) are dropped.
    pub fn parse_players(&self, html: &str, name_filter: Option<&str>) -> Vec<PlayerRecord> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let document = Html::parse_fragment(&wrap_table_fragment(html));
        let filter = name_filter.map(str::to_lowercase).filter(|f| !f.is_empty());

        let mut players = Vec::new();
        for (index, row) in document.select(&self.row).enumerate() {
            let Some(player) = self.parse_row(&row) else {
                debug!("Skipping row {} without pnum/name cells", index);
                continue;
            };

            if let Some(filter) = &filter {
                if !player.name.to_lowercase().contains(filter.as_str()) {
                    debug!("Filtered out {} ({}) by name '{}'", player.name, player.pnum, filter);
                    continue;
                }
            }

            players.push(player);
        }

        players
    }

    fn parse_row(&self, row: &ElementRef) -> Option<PlayerRecord> {
        let pnum = select_text(row, &self.pnum).filter(|text| !text.is_empty())?;
        let name = select_text(row, &self.name).filter(|text| !text.is_empty())?;

        let status = select_text(row, &self.status).unwrap_or_default();
        let grade = |selector: &Selector| {
            select_text(row, selector)
                .map(|text| sanitize_grade(&text))
                .unwrap_or_default()
        };

        Some(PlayerRecord {
            pnum,
            name,
            club: self.club_cell(row),
            age: status_to_age(&status),
            standard_published: grade(&self.standard_published),
            standard_live: grade(&self.standard_live),
            allegro_published: grade(&self.allegro_published),
            allegro_live: grade(&self.allegro_live),
            blitz_published: grade(&self.blitz_published),
            blitz_live: grade(&self.blitz_live),
        })
    }

    /// The club cell carries no column marker; take the cell at the club
    /// position only when it is unmarked, so a status cell is never misread.
    fn club_cell(&self, row: &ElementRef) -> String {
        row.select(&self.cell)
            .nth(self.club_cell_index)
            .filter(|cell| cell.value().attr(&self.column_attribute).is_none())
            .map(|cell| element_text(&cell))
            .unwrap_or_default()
    }
}

/// Table rows outside a `<table>` are dropped by HTML fragment parsing, so
/// bare `<tr>` fragments get a table wrapper first.
fn wrap_table_fragment(html: &str) -> String {
    if html.to_lowercase().contains("<table") {
        html.to_string()
    } else {
        format!("<table>{html}</table>")
    }
}

fn select_text(row: &ElementRef, selector: &Selector) -> Option<String> {
    row.select(selector).next().map(|cell| element_text(&cell))
}

/// Visible text with each text node trimmed and whitespace collapsed
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map the server's status column to an age label
pub fn status_to_age(status: &str) -> String {
    let status = status.trim();
    match status {
        "A" => "Adult".to_string(),
        "NEW" => "New".to_string(),
        "J?" => "Junior".to_string(),
        _ => match status.strip_prefix('J') {
            Some(age) if !age.is_empty() && age.chars().all(|c| c.is_ascii_digit()) => age.to_string(),
            _ => status.to_string(),
        },
    }
}

/// Normalise a grade cell: placeholders become empty, numbers pass through
pub fn sanitize_grade(text: &str) -> String {
    let text = text.trim();
    if GRADE_PLACEHOLDERS.contains(&text) {
        String::new()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(pnum: &str, name: &str, club: &str, status: &str, std_pub: &str, std_live: &str) -> String {
        format!(
            r#"<tr>
                <td class="screen_large screen_medium" data-column="pnum">{pnum}</td>
                <td class="left_align" data-column="name"><a href="/player/{pnum}">{name}</a></td>
                <td class="screen_large">{club}</td>
                <td data-column="status">{status}</td>
                <td data-column="standard_published">{std_pub}</td>
                <td data-column="standard_live">{std_live}</td>
                <td data-column="allegro_published">&mdash;</td>
                <td data-column="allegro_live">-</td>
                <td data-column="blitz_published"></td>
                <td data-column="blitz_live">1490</td>
            </tr>"#
        )
    }

    fn parse(html: &str, filter: Option<&str>) -> Vec<PlayerRecord> {
        PlayerTableParser::new().unwrap().parse_players(html, filter)
    }

    #[test]
    fn test_parse_adult_row() {
        let players = parse(&row("12345", "Doe, John", "ST", "A", "1500", "1510"), None);
        assert_eq!(players.len(), 1);
        let player = &players[0];
        assert_eq!(player.pnum, "12345");
        assert_eq!(player.name, "Doe, John");
        assert_eq!(player.club, "ST");
        assert_eq!(player.age, "Adult");
        assert_eq!(player.standard_published, "1500");
        assert_eq!(player.standard_live, "1510");
        assert_eq!(player.allegro_published, "");
        assert_eq!(player.allegro_live, "");
        assert_eq!(player.blitz_published, "");
        assert_eq!(player.blitz_live, "1490");
    }

    #[rstest]
    #[case("A", "Adult")]
    #[case("NEW", "New")]
    #[case("J?", "Junior")]
    #[case("J14", "14")]
    #[case("J8", "8")]
    #[case("J", "J")]
    #[case("Jx1", "Jx1")]
    #[case("X", "X")]
    #[case("", "")]
    fn test_status_to_age(#[case] status: &str, #[case] age: &str) {
        assert_eq!(status_to_age(status), age);
    }

    #[rstest]
    #[case("\u{2014}", "")]
    #[case("&mdash;", "")]
    #[case("-", "")]
    #[case("", "")]
    #[case("  ", "")]
    #[case("1515", "1515")]
    #[case(" 1515 ", "1515")]
    fn test_sanitize_grade(#[case] cell: &str, #[case] expected: &str) {
        assert_eq!(sanitize_grade(cell), expected);
    }

    #[test]
    fn test_rows_without_pnum_or_name_are_skipped() {
        let html = format!(
            "<tr><th>Pnum</th><th>Name</th></tr>\
             <tr><td data-column=\"name\">Orphan, Row</td></tr>\
             {}",
            row("67890", "Smith, Jane", "CW", "J14", "1200", "1250")
        );
        let players = parse(&html, None);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].pnum, "67890");
        assert_eq!(players[0].age, "14");
    }

    #[test]
    fn test_marked_third_cell_is_not_read_as_club() {
        let html = r#"<tr>
            <td data-column="pnum">11111</td>
            <td data-column="name">Player, New</td>
            <td data-column="status">NEW</td>
        </tr>"#;
        let players = parse(html, None);
        assert_eq!(players[0].club, "");
        assert_eq!(players[0].age, "New");
    }

    #[test]
    fn test_multiple_club_codes_kept() {
        let players = parse(&row("3", "Test, Player", "DN, CW", "A", "", ""), None);
        assert_eq!(players[0].club, "DN, CW");
        assert_eq!(players[0].club_codes(), vec!["DN", "CW"]);
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let html = format!(
            "{}{}",
            row("1", "Loch, Nathanael", "ST", "A", "1600", ""),
            row("2", "Lochhead, Nathan", "ST", "A", "1400", "")
        );
        assert_eq!(parse(&html, Some("loch")).len(), 2);
        assert_eq!(parse(&html, Some("HEAD")).len(), 1);
        assert!(parse(&html, Some("smith")).is_empty());
    }

    #[test]
    fn test_full_table_markup() {
        let html = format!(
            "<table class=\"results\"><thead><tr><th>Pnum</th></tr></thead><tbody>{}</tbody></table>",
            row("9", "Brown, Amy", "EW", "J?", "", "900")
        );
        let players = parse(&html, None);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].age, "Junior");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let html = "<tr><td data-column=\"pnum\"> 42 </td>\
                    <td data-column=\"name\"><span>Doe,</span>\n   <span>John</span></td></tr>";
        let players = parse(html, None);
        assert_eq!(players[0].pnum, "42");
        assert_eq!(players[0].name, "Doe, John");
    }

    #[test]
    fn test_empty_fragment() {
        assert!(parse("", None).is_empty());
        assert!(parse("<p>No players found</p>", None).is_empty());
    }
}
