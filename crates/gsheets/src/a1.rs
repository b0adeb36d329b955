//! A1 notation helpers.
//!
//! Ranges are normally passed to the values API verbatim. Parsing is only
//! needed where a request must be expressed in grid coordinates, such as the
//! source ranges of a chart.

use crate::error::{Result, SheetsError};

/// A parsed A1 range with 0-based, end-exclusive bounds.
///
/// `None` bounds are open: `A:C` has no row bounds, `2:5` has no column
/// bounds, and a bare sheet title has neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct A1Range {
    pub sheet_title: Option<String>,
    pub start_row: Option<u32>,
    pub end_row: Option<u32>,
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
}

impl A1Range {
    /// Parses `[sheet!]start[:end]`, with optional `'quoted sheet'` titles and
    /// `$` anchors.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Validation`] when the range is not valid A1
    /// notation.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SheetsError::validation("range must not be empty"));
        }

        let (sheet_title, cells) = split_sheet(trimmed)?;
        let mut range = Self {
            sheet_title,
            ..Self::default()
        };
        if cells.is_empty() {
            return Ok(range);
        }

        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (start, end),
            None => (cells, cells),
        };
        let start = parse_cell(start).ok_or_else(|| invalid(input))?;
        let end = parse_cell(end).ok_or_else(|| invalid(input))?;

        range.start_column = start.column;
        range.start_row = start.row;
        range.end_column = end.column.map(|column| column + 1);
        range.end_row = end.row.map(|row| row + 1);

        if let (Some(start), Some(end)) = (range.start_column, range.end_column)
            && start >= end
        {
            return Err(invalid(input));
        }
        if let (Some(start), Some(end)) = (range.start_row, range.end_row)
            && start >= end
        {
            return Err(invalid(input));
        }
        Ok(range)
    }

    /// Number of columns covered, when both column bounds are known.
    pub fn width(&self) -> Option<u32> {
        Some(self.end_column? - self.start_column.unwrap_or(0))
    }
}

/// Columns stop at `ZZZ`; longer alphabetic runs are sheet titles.
const MAX_COLUMN_LETTERS: usize = 3;

struct CellRef {
    column: Option<u32>,
    row: Option<u32>,
}

fn invalid(input: &str) -> SheetsError {
    SheetsError::validation(format!("'{input}' is not a valid A1 range"))
}

fn split_sheet(input: &str) -> Result<(Option<String>, &str)> {
    if let Some(rest) = input.strip_prefix('\'') {
        let mut title = String::new();
        let mut chars = rest.char_indices();
        while let Some((idx, ch)) = chars.next() {
            if ch != '\'' {
                title.push(ch);
                continue;
            }
            let after = &rest[idx + 1..];
            if after.starts_with('\'') {
                title.push('\'');
                chars.next();
                continue;
            }
            return match after.strip_prefix('!') {
                Some(cells) => Ok((Some(title), cells)),
                None if after.is_empty() => Ok((Some(title), "")),
                None => Err(invalid(input)),
            };
        }
        return Err(invalid(input));
    }

    match input.rsplit_once('!') {
        Some((sheet, cells)) => Ok((Some(sheet.to_string()), cells)),
        None if parse_cells_only(input) => Ok((None, input)),
        None if input.contains(':') => Err(invalid(input)),
        None => Ok((Some(input.to_string()), "")),
    }
}

/// A string without `!` is either a cell range or a bare sheet title.
fn parse_cells_only(input: &str) -> bool {
    let (start, end) = input.split_once(':').unwrap_or((input, input));
    parse_cell(start).is_some() && parse_cell(end).is_some()
}

fn parse_cell(cell: &str) -> Option<CellRef> {
    let cell = cell.replace('$', "");
    let letters_len = cell
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let (letters, digits) = cell.split_at(letters_len);
    if (letters.is_empty() && digits.is_empty()) || letters.len() > MAX_COLUMN_LETTERS {
        return None;
    }
    if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    let column = if letters.is_empty() {
        None
    } else {
        Some(column_index(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        let row: u32 = digits.parse().ok()?;
        Some(row.checked_sub(1)?)
    };
    Some(CellRef { column, row })
}

/// Converts column letters to a 0-based index (`A` = 0, `AA` = 26).
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for byte in letters.bytes() {
        if !byte.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(byte.to_ascii_uppercase() - b'A') + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a 0-based column index to letters (0 = `A`, 26 = `AA`).
pub fn column_letters(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let remainder = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(remainder).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Quotes a sheet title for use in a range when it contains anything other
/// than ASCII letters, digits, or underscores.
pub fn quote_sheet_title(title: &str) -> String {
    let plain = !title.is_empty()
        && title
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if plain {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

/// Builds `sheet!cells`, quoting the title when needed.
pub fn qualify(sheet_title: &str, cells: &str) -> String {
    format!("{}!{cells}", quote_sheet_title(sheet_title))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_range_with_sheet() {
        let range = A1Range::parse("Sheet1!A1:E30").unwrap();
        assert_eq!(range.sheet_title.as_deref(), Some("Sheet1"));
        assert_eq!(range.start_column, Some(0));
        assert_eq!(range.end_column, Some(5));
        assert_eq!(range.start_row, Some(0));
        assert_eq!(range.end_row, Some(30));
        assert_eq!(range.width(), Some(5));
    }

    #[test]
    fn test_parse_column_only_range_is_row_unbounded() {
        let range = A1Range::parse("B:D").unwrap();
        assert!(range.sheet_title.is_none());
        assert_eq!(range.start_column, Some(1));
        assert_eq!(range.end_column, Some(4));
        assert!(range.start_row.is_none());
        assert!(range.end_row.is_none());
    }

    #[test]
    fn test_parse_quoted_sheet_with_escaped_quote() {
        let range = A1Range::parse("'Bob''s Data'!$A$2:$C$9").unwrap();
        assert_eq!(range.sheet_title.as_deref(), Some("Bob's Data"));
        assert_eq!(range.start_row, Some(1));
        assert_eq!(range.end_row, Some(9));
        assert_eq!(range.end_column, Some(3));
    }

    #[test]
    fn test_parse_bare_sheet_title() {
        let range = A1Range::parse("Summary").unwrap();
        assert_eq!(range.sheet_title.as_deref(), Some("Summary"));
        assert!(range.width().is_none());
    }

    #[test]
    fn test_parse_single_cell() {
        let range = A1Range::parse("C3").unwrap();
        assert_eq!(range.start_column, Some(2));
        assert_eq!(range.end_column, Some(3));
        assert_eq!(range.start_row, Some(2));
        assert_eq!(range.end_row, Some(3));
    }

    #[test]
    fn test_parse_rejects_reversed_and_zero_rows() {
        assert!(A1Range::parse("Sheet1!D1:A5").is_err());
        assert!(A1Range::parse("A0:B2").is_err());
        assert!(A1Range::parse("Sheet1!A1:B2:C3").is_err());
        assert!(A1Range::parse("   ").is_err());
    }

    #[test]
    fn test_column_conversion_round_trips_known_points() {
        assert_eq!(column_index("A"), Some(0));
        assert_eq!(column_index("z"), Some(25));
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
    }

    #[test]
    fn test_quote_sheet_title() {
        assert_eq!(quote_sheet_title("Sheet1"), "Sheet1");
        assert_eq!(quote_sheet_title("Q1 Sales"), "'Q1 Sales'");
        assert_eq!(quote_sheet_title("Bob's"), "'Bob''s'");
        assert_eq!(qualify("Data", "A:A"), "Data!A:A");
    }
}
