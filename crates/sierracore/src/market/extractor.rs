//! Row extraction from the price page markup.
//!
//! The page is not machine readable, so rows are located by their visible
//! label and the cells are read off in document order. `MarkerScan` does not
//! build a tree: it takes everything after the first occurrence of the label
//! and picks the `<td>` cells from there. This only holds for pages where the
//! label is followed by its own row's cells, which is the case for the tables
//! we scrape. Another `RowLocator` can replace it without touching callers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Lower-case cell pair, lazy body, first closing tag wins.
static CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<td[^>]*>([\s\S]*?)</td>").expect("cell regex"));

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("html tag regex"));

/// `&lrm;` `&rlm;` and their decimal/hex numeric forms.
static BIDI_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&(?:lrm|rlm|#820[67]|#x200[ef]);").expect("bidi entity regex"));

const LEFT_TO_RIGHT_MARK: char = '\u{200E}';
const RIGHT_TO_LEFT_MARK: char = '\u{200F}';

/// The two cleaned columns of one located row.
///
/// Digits are returned in whatever script the page uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRow {
    pub value: String,
    pub change: String,
}

/// What one call site asks for: the row label and two 0-based cell ordinals
/// counted from the first cell after the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowQuery<'a> {
    pub marker: &'a str,
    pub value_column: usize,
    pub change_column: usize,
}

impl<'a> RowQuery<'a> {
    pub const fn new(marker: &'a str, value_column: usize, change_column: usize) -> Self {
        Self {
            marker,
            value_column,
            change_column,
        }
    }

    /// Number of cells that must follow the marker for the query to match.
    /// `None` when an ordinal is too large for any document to satisfy.
    pub fn required_cells(&self) -> Option<usize> {
        self.value_column.max(self.change_column).checked_add(1)
    }

    /// Runs the query with the default [`MarkerScan`] strategy.
    pub fn extract(&self, document: &str) -> Option<ExtractedRow> {
        MarkerScan.locate(document, self)
    }
}

/// Strategy for turning a document and a query into a row.
pub trait RowLocator {
    /// Returns `None` when the row is absent or has too few cells.
    fn locate(&self, document: &str, query: &RowQuery<'_>) -> Option<ExtractedRow>;
}

/// First literal occurrence of the marker, then cells in document order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerScan;

impl RowLocator for MarkerScan {
    fn locate(&self, document: &str, query: &RowQuery<'_>) -> Option<ExtractedRow> {
        let start = document.find(query.marker)?;
        let tail = &document[start..];

        let required = query.required_cells()?;
        let cells = cell_fragments(tail, required);
        if cells.len() < required {
            log::debug!(
                "Row '{}' has {} cells, {} required",
                query.marker,
                cells.len(),
                required
            );
            return None;
        }

        Some(ExtractedRow {
            value: clean_cell(cells[query.value_column]),
            change: clean_cell(cells[query.change_column]),
        })
    }
}

/// Extracts the `value_column` and `change_column` cells of the row labelled
/// `marker`.
///
/// # Example
/// ```
/// use sierracore::market::extract_row;
///
/// let html = "<tr><td>Tether</td><td>1,000</td><td>+2</td></tr>";
/// let row = extract_row(html, "Tether", 0, 1).unwrap();
/// assert_eq!(row.value, "1,000");
/// assert_eq!(row.change, "+2");
/// assert!(extract_row(html, "Gold", 0, 1).is_none());
/// ```
pub fn extract_row(document: &str, marker: &str, value_column: usize, change_column: usize) -> Option<ExtractedRow> {
    RowQuery::new(marker, value_column, change_column).extract(document)
}

/// Inner markup of up to `limit` `<td>` cells, in order of appearance.
fn cell_fragments(tail: &str, limit: usize) -> Vec<&str> {
    CELL_RE
        .captures_iter(tail)
        .take(limit)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Drops every tag and directional mark, then trims.
fn clean_cell(fragment: &str) -> String {
    let text = HTML_TAG_RE.replace_all(fragment, "");
    let text = BIDI_ENTITY_RE.replace_all(&text, "");
    text.replace([LEFT_TO_RIGHT_MARK, RIGHT_TO_LEFT_MARK], "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GOLD: &str = "هر گرم طلای ۱۸ عیار";

    fn gold_document() -> String {
        format!("<p>header</p>...{GOLD}...<td>1,234,000</td><td>+0.5%</td>...")
    }

    #[test]
    fn test_extracts_first_two_cells_after_marker() {
        let row = extract_row(&gold_document(), GOLD, 0, 1).unwrap();
        assert_eq!(
            row,
            ExtractedRow {
                value: "1,234,000".to_string(),
                change: "+0.5%".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_marker_is_none() {
        assert_eq!(extract_row(&gold_document(), "not-present", 0, 1), None);
    }

    #[test]
    fn test_too_few_cells_is_none() {
        let html = format!("{GOLD}<td>1</td><td>2</td>");
        assert!(extract_row(&html, GOLD, 0, 1).is_some());
        assert_eq!(extract_row(&html, GOLD, 1, 2), None);
        assert_eq!(extract_row(&format!("{GOLD} no cells"), GOLD, 0, 0), None);
    }

    #[test]
    fn test_cells_before_marker_are_ignored() {
        let html = format!("<td>old</td><td>stale</td><tr><td>{GOLD}</td><td>42</td><td>-1</td></tr>");
        let row = extract_row(&html, GOLD, 0, 1).unwrap();
        assert_eq!(row.value, "42");
        assert_eq!(row.change, "-1");
    }

    #[test]
    fn test_first_marker_occurrence_wins() {
        let html = format!("{GOLD}<td>first</td><td>a</td>{GOLD}<td>second</td><td>b</td>");
        let row = extract_row(&html, GOLD, 0, 1).unwrap();
        assert_eq!(row.value, "first");
        assert_eq!(row.change, "a");
    }

    #[test]
    fn test_ordinals_can_skip_and_reverse() {
        let html = "Tether<td>USDT</td><td>615,200</td><td>(0.3%)</td>";
        let row = extract_row(html, "Tether", 1, 2).unwrap();
        assert_eq!(row.value, "615,200");
        assert_eq!(row.change, "(0.3%)");

        let swapped = extract_row(html, "Tether", 2, 1).unwrap();
        assert_eq!(swapped.value, "(0.3%)");
        assert_eq!(swapped.change, "615,200");
    }

    #[test]
    fn test_nested_and_attribute_tags_are_stripped() {
        let html = r#"Gold<td class="price" data-x='1'><span style="color:green"><b>1,000</b></span><br/></td><td><img src="up.png" /> +5 <i>%</i></td>"#;
        let row = extract_row(html, "Gold", 0, 1).unwrap();
        assert_eq!(row.value, "1,000");
        assert_eq!(row.change, "+5 %");
    }

    #[test]
    fn test_directional_marks_are_stripped() {
        let html = "Gold<td>\u{200F}1,000\u{200E}</td><td> &lrm;+5&rlm; &#8206;&#x200F;</td>";
        let row = extract_row(html, "Gold", 0, 1).unwrap();
        assert_eq!(row.value, "1,000");
        assert_eq!(row.change, "+5");
    }

    #[test]
    fn test_persian_digits_pass_through() {
        let html = format!("{GOLD}<td> ۱۲۳,۴۵۶ </td><td>\n۰.۵٪\n</td>");
        let row = extract_row(&html, GOLD, 0, 1).unwrap();
        assert_eq!(row.value, "۱۲۳,۴۵۶");
        assert_eq!(row.change, "۰.۵٪");
    }

    #[test]
    fn test_multiline_cells() {
        let html = "Gold<td>\n  <div>\n 7 \n</div>\n</td><td>\r\n-3\r\n</td>";
        let row = extract_row(html, "Gold", 0, 1).unwrap();
        assert_eq!(row.value, "7");
        assert_eq!(row.change, "-3");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = gold_document();
        assert_eq!(extract_row(&html, GOLD, 0, 1), extract_row(&html, GOLD, 0, 1));
    }

    #[test]
    fn test_required_cells() {
        assert_eq!(RowQuery::new("x", 0, 1).required_cells(), Some(2));
        assert_eq!(RowQuery::new("x", 3, 1).required_cells(), Some(4));
        assert_eq!(RowQuery::new("x", 0, 0).required_cells(), Some(1));
        assert_eq!(RowQuery::new("x", usize::MAX, 0).required_cells(), None);
    }

    #[test]
    fn test_out_of_range_ordinal_is_none() {
        let html = "Gold<td>1</td><td>2</td>";
        assert_eq!(extract_row(html, "Gold", usize::MAX, 0), None);
        assert_eq!(extract_row(html, "Gold", 0, usize::MAX), None);
        assert_eq!(extract_row(html, "Gold", 0, 2), None);
    }

    #[test]
    fn test_custom_locator_through_trait() {
        struct Fixed;
        impl RowLocator for Fixed {
            fn locate(&self, _document: &str, query: &RowQuery<'_>) -> Option<ExtractedRow> {
                Some(ExtractedRow {
                    value: query.marker.to_string(),
                    change: String::new(),
                })
            }
        }

        let query = RowQuery::new("label", 0, 1);
        assert_eq!(Fixed.locate("", &query).unwrap().value, "label");
        assert_eq!(MarkerScan.locate("", &query), None);
    }
}
