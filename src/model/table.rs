//! Table, Row, and Cell data structures

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::schema::Column;

/// A cell value with type information
///
/// `Null` and `Float(NaN)` are both "missing": readers produce `Null` for
/// empty cells and `NaN` for not-available markers such as `#N/A`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison, exact on the integer side
            (CellValue::Int(a), CellValue::Float(b)) => integral(*b) == Some(*a),
            (CellValue::Float(a), CellValue::Int(b)) => integral(*a) == Some(*b),
            _ => false,
        }
    }
}

impl Eq for CellValue {}

/// The integer an integral, in-range float stands for
fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

// Integral floats hash like the equal `Int` so that keys mixing the two
// encodings (common in spreadsheets) land in the same bucket.
impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Null => 0u8.hash(state),
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            CellValue::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            CellValue::Float(f) => {
                if f.is_nan() {
                    3u8.hash(state);
                } else if let Some(i) = integral(*f) {
                    2u8.hash(state);
                    i.hash(state);
                } else {
                    4u8.hash(state);
                    f.to_bits().hash(state);
                }
            }
            CellValue::String(s) => {
                5u8.hash(state);
                s.hash(state);
            }
            CellValue::Date(d) => {
                6u8.hash(state);
                d.hash(state);
            }
            CellValue::DateTime(dt) => {
                7u8.hash(state);
                dt.hash(state);
            }
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is missing under any encoding (null or NaN)
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Borrow the text of a string cell
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
    /// Original line/row number in source file (1-indexed)
    pub source_line: usize,
}

impl Row {
    pub fn new(cells: Vec<CellValue>, source_line: usize) -> Self {
        Self { cells, source_line }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table containing columns and rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create an empty table from header names
    pub fn with_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.as_ref(), i))
            .collect();
        Self::new(columns)
    }

    /// Add a row to the table, padding short rows with nulls and
    /// dropping cells past the last column
    pub fn add_row(&mut self, mut cells: Vec<CellValue>, source_line: usize) {
        cells.resize(self.column_count(), CellValue::Null);
        self.rows.push(Row::new(cells, source_line));
    }

    /// Builder-style variant of [`Table::add_row`] numbering rows after the header
    pub fn push(mut self, cells: Vec<CellValue>) -> Self {
        let line = self.rows.len() + 2;
        self.add_row(cells, line);
        self
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a cell by row position and column name
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col_idx = self.column_index(column)?;
        self.rows.get(row)?.get(col_idx)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(value: &CellValue) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_missing_encodings() {
        assert!(CellValue::Null.is_missing());
        assert!(CellValue::Float(f64::NAN).is_missing());
        assert!(!CellValue::Float(0.0).is_missing());
        assert!(!CellValue::from("").is_missing());
    }

    #[test]
    fn test_hash_matches_cross_type_equality() {
        assert_eq!(CellValue::Int(30), CellValue::Float(30.0));
        assert_eq!(hash_of(&CellValue::Int(30)), hash_of(&CellValue::Float(30.0)));
        assert_ne!(
            hash_of(&CellValue::Float(30.5)),
            hash_of(&CellValue::Int(30))
        );
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let exact = CellValue::Float(9_007_199_254_740_992.0);
        assert_eq!(CellValue::Int(9_007_199_254_740_992), exact);
        assert_ne!(CellValue::Int(9_007_199_254_740_993), exact);
        assert_ne!(exact, CellValue::Int(9_007_199_254_740_993));
        assert_ne!(CellValue::Float(9.3e18), CellValue::Int(i64::MAX));
    }

    #[test]
    fn test_add_row_pads_short_rows() {
        let mut table = Table::with_headers(&["id", "name", "age"]);
        table.add_row(vec![CellValue::Int(1)], 2);

        assert_eq!(table.rows[0].cells.len(), 3);
        assert_eq!(table.cell(0, "age"), Some(&CellValue::Null));
        assert_eq!(table.cell(0, "missing"), None);
    }

    #[test]
    fn test_display_keeps_whitespace() {
        assert_eq!(CellValue::from(" Bob ").display(), " Bob ");
        assert_eq!(CellValue::Float(31.0).display(), "31");
        assert_eq!(CellValue::Null.display(), "NULL");
    }
}
