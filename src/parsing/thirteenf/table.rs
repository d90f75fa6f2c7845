//! Column-aligned text holdings tables.
//!
//! Before the XML information table became mandatory, holdings were typed into the 13F-HR
//! document as a fixed-width table inside `<TABLE>` markup:
//!
//! ```text
//! <TABLE>
//! <CAPTION>
//! NAME OF ISSUER               TITLE OF CLASS  CUSIP      VALUE (X$1000)  SHARES   SH/PRN
//! - --------------------------- --------------- ---------- --------------- -------- ------
//! <S>                          <C>             <C>        <C>             <C>      <C>
//! BAXTER INTERNATIONAL         COM             071813109           16,017  255,000 SH
//! </TABLE>
//! ```
//!
//! The dashed separator (escaped with a leading `- ` by EDGAR) fixes the column layout. Rows
//! are cut at those offsets. Every line that does not yield a valid CUSIP is treated as noise,
//! which lets captions, page headers, totals and footnotes pass through without special casing.

use super::super::filing::extract_section;
use super::holding::{Holding, VALUE_MULTIPLIER, float_to_i64, is_valid_cusip};
use crate::error::{EdgarError, Result};

const TABLE_START: &str = "<TABLE>";
const TABLE_END: &str = "</TABLE>";
const SEPARATOR_PREFIX: &str = "- --";

const SHARE_TYPES: &[&str] = &["SH", "PRN"];

/// Configuration for [`TableParser`].
///
/// # Fields
/// * `min_column_breaks` - Separator lines yielding fewer offsets fail the table
/// * `max_entries` - Optional limit on the number of holdings returned
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub min_column_breaks: usize,
    pub max_entries: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_column_breaks: 5,
            max_entries: None,
        }
    }
}

/// Position of the row scanner relative to the holdings rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// No valid row seen yet; failures are column headers and captions.
    BeforeTable,
    /// Inside the data rows.
    InTable,
    /// A row failed after data was seen: totals, footnotes or a page break.
    Trailer,
}

impl RowState {
    /// Next state after a row parsed (`accepted`) or failed.
    pub fn next(self, accepted: bool) -> Self {
        match (self, accepted) {
            (_, true) => RowState::InTable,
            (RowState::BeforeTable, false) => RowState::BeforeTable,
            (RowState::InTable | RowState::Trailer, false) => RowState::Trailer,
        }
    }
}

/// Returns the column offsets described by a dashed separator line.
///
/// Each position where a dash follows a space starts a column; the line length closes the
/// last one. Offsets are character positions.
///
/// ```
/// use edgar13f::parsing::thirteenf::derive_column_boundaries;
///
/// assert_eq!(derive_column_boundaries("- ---- --- --"), vec![2, 7, 11, 13]);
/// ```
pub fn derive_column_boundaries(separator: &str) -> Vec<usize> {
    let chars: Vec<char> = separator.trim_end().chars().collect();
    let mut boundaries: Vec<usize> = chars
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] == ' ' && pair[1] == '-')
        .map(|(i, _)| i + 1)
        .collect();
    boundaries.push(chars.len());
    boundaries
}

/// Cuts a row into trimmed, upper-cased fields.
///
/// The first field always starts at column zero: the separator is shifted right by the
/// `- ` escape that rows do not carry. The last field runs to the end of the row.
pub fn slice_fields(line: &str, boundaries: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let last = boundaries.len().saturating_sub(2);
    boundaries
        .windows(2)
        .enumerate()
        .map(|(i, window)| {
            let start = if i == 0 { 0 } else { window[0] }.min(chars.len());
            let end = if i == last { chars.len() } else { window[1].min(chars.len()) }.max(start);
            chars[start..end]
                .iter()
                .collect::<String>()
                .trim()
                .to_uppercase()
        })
        .collect()
}

/// Parses thousands-separated integers (`"1,234"`), tolerating `$` and decimals.
///
/// Returns `None` when the text is not a single number or does not fit an `i64`.
pub fn parse_number(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    let mut tokens = cleaned.split_whitespace();
    let token = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    token
        .parse::<i64>()
        .ok()
        .or_else(|| token.parse::<f64>().ok().and_then(float_to_i64))
}

/// Numeric cells degrade to zero instead of failing the row.
fn lenient_number(field: &'static str, text: &str, cusip: &str) -> i64 {
    parse_number(text).unwrap_or_else(|| {
        tracing::warn!(cusip, "Unparsable {} {:?}, using 0", field, text);
        0
    })
}

/// Parser for the fixed-width tables of pre-XML 13F-HR documents.
///
/// # Examples
///
/// ```
/// use edgar13f::parsing::thirteenf::{TableConfig, TableParser};
///
/// let document = "<TABLE>\n\
/// - ---------- ---- --------- ------ ---------\n\
/// ACME CORP    COM  000360206  1,000  2,000 SH\n\
/// </TABLE>\n";
/// let holdings = TableParser::new(TableConfig::default()).parse(document).unwrap();
/// assert_eq!(holdings[0].value, 1_000_000);
/// ```
pub struct TableParser {
    config: TableConfig,
}

impl TableParser {
    pub fn new(config: TableConfig) -> Self {
        Self { config }
    }

    /// Parses every `<TABLE>` section of a 13F-HR document, in order.
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::InvalidTable` only if no section could be read and at least one
    /// had an unusable separator line. Sections without a separator (cover page tables, lists
    /// of other managers) contribute nothing.
    pub fn parse(&self, document: &str) -> Result<Vec<Holding>> {
        let mut holdings = Vec::new();
        let mut failure = None;
        let mut parsed_any = false;

        let (mut table, mut rest) = extract_section(document, TABLE_START, TABLE_END);
        while !table.is_empty() {
            match self.parse_table(table) {
                Ok(rows) => {
                    parsed_any = true;
                    holdings.extend(rows);
                }
                Err(err) => {
                    tracing::warn!("Skipping holdings table: {}", err);
                    failure = Some(err);
                }
            }
            (table, rest) = extract_section(rest, TABLE_START, TABLE_END);
        }

        if let (false, Some(err)) = (parsed_any, failure) {
            return Err(err);
        }

        if let Some(max) = self.config.max_entries {
            holdings.truncate(max);
        }
        Ok(holdings)
    }

    /// Parses the rows of a single `<TABLE>` section.
    ///
    /// Each separator line (re)defines the columns, so tables repeating their header on every
    /// page keep working. Lines before the first separator are ignored.
    pub fn parse_table(&self, table: &str) -> Result<Vec<Holding>> {
        let mut holdings = Vec::new();
        let mut boundaries: Option<Vec<usize>> = None;
        let mut state = RowState::BeforeTable;

        for line in table.lines() {
            if line.starts_with(SEPARATOR_PREFIX) {
                let breaks = derive_column_boundaries(line);
                if breaks.len() < self.config.min_column_breaks {
                    return Err(EdgarError::InvalidTable(format!(
                        "expected at least {} column breaks, found {} in {:?}",
                        self.config.min_column_breaks,
                        breaks.len(),
                        line.trim_end()
                    )));
                }
                boundaries = Some(breaks);
                continue;
            }

            let Some(breaks) = boundaries.as_deref() else {
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }

            let row = self.parse_row(line, breaks);
            let next = state.next(row.is_ok());
            match row {
                Ok(holding) => holdings.push(holding),
                Err(err) if state != RowState::BeforeTable => {
                    tracing::warn!("Skipping holdings row {:?}: {}", line.trim(), err);
                }
                Err(_) => {}
            }
            if next != state {
                tracing::trace!(?state, ?next, "row state");
            }
            state = next;
        }

        Ok(holdings)
    }

    /// Reads one row as issuer, class, CUSIP, value, number (optionally followed by the share
    /// type) and an optional share type column.
    ///
    /// With only four columns the last one holds value, number and share type together.
    ///
    /// # Errors
    ///
    /// `EdgarError::InvalidCusip` when the third column is not a CUSIP. Numeric columns never
    /// fail the row.
    pub fn parse_row(&self, line: &str, boundaries: &[usize]) -> Result<Holding> {
        let fields = slice_fields(line, boundaries);
        let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");

        let cusip = field(2);
        if !is_valid_cusip(cusip) {
            return Err(EdgarError::InvalidCusip(cusip.to_string()));
        }

        let (value_cell, number_cell) = if fields.len() > 4 {
            (field(3), field(4))
        } else {
            field(3)
                .split_once(char::is_whitespace)
                .map_or((field(3), ""), |(value, rest)| (value, rest.trim_start()))
        };

        let value = lenient_number("value", value_cell, cusip)
            .checked_mul(VALUE_MULTIPLIER)
            .unwrap_or_else(|| {
                tracing::warn!(cusip, "Value {:?} overflows in dollars, using 0", value_cell);
                0
            });

        let mut number_tokens = number_cell.split_whitespace();
        let number = lenient_number("number", number_tokens.next().unwrap_or(""), cusip);
        let share_type = number_tokens
            .next()
            .or_else(|| field(5).split_whitespace().next())
            .filter(|token| SHARE_TYPES.contains(token))
            .unwrap_or("");

        Ok(Holding {
            name_of_issuer: field(0).to_string(),
            title_of_class: field(1).to_string(),
            cusip: cusip.to_string(),
            value,
            number,
            share_type: share_type.to_string(),
        })
    }
}
