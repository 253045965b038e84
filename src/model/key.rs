//! Primary key handling utilities

use std::fmt;

use indexmap::map::Entry;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Serialize;

use super::table::{CellValue, Row, Table};
use crate::error::{DiffError, TableSide};

/// The key of a row: one value per key column, compared component-wise
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RowKey(Vec<CellValue>);

impl RowKey {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self(values)
    }

    /// Extract the key of `row` from the given column positions
    pub fn from_row(row: &Row, column_indices: &[usize]) -> Self {
        Self(
            column_indices
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Null))
                .collect(),
        )
    }

    pub fn values(&self) -> &[CellValue] {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{}", single),
            values => {
                write!(f, "(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl<T: Into<CellValue>> FromIterator<T> for RowKey {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Rows of one table indexed by key, in table order
#[derive(Debug)]
pub struct KeyIndex {
    column_indices: Vec<usize>,
    rows: IndexMap<RowKey, usize, FxBuildHasher>,
}

impl KeyIndex {
    /// Index `table` by the named key columns.
    ///
    /// Fails if a key column is absent or a key value repeats.
    pub fn build(table: &Table, key_columns: &[String], side: TableSide) -> Result<Self, DiffError> {
        let column_indices = resolve_key_columns(table, key_columns, side)?;

        let mut rows: IndexMap<RowKey, usize, FxBuildHasher> =
            IndexMap::with_capacity_and_hasher(table.row_count(), FxBuildHasher);
        for (idx, row) in table.rows.iter().enumerate() {
            match rows.entry(RowKey::from_row(row, &column_indices)) {
                Entry::Occupied(entry) => {
                    return Err(DiffError::DuplicateKey {
                        key: entry.key().to_string(),
                        side,
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(idx);
                }
            }
        }

        Ok(Self {
            column_indices,
            rows,
        })
    }

    /// Positions of the key columns in the indexed table
    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    /// Row position for a key
    pub fn get(&self, key: &RowKey) -> Option<usize> {
        self.rows.get(key).copied()
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.rows.contains_key(key)
    }

    /// Keys and row positions in table order
    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, usize)> {
        self.rows.iter().map(|(key, &idx)| (key, idx))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolve key column names to positions, failing on the first absent one
pub fn resolve_key_columns(
    table: &Table,
    key_columns: &[String],
    side: TableSide,
) -> Result<Vec<usize>, DiffError> {
    if key_columns.is_empty() {
        return Err(DiffError::EmptyKey);
    }
    for (i, name) in key_columns.iter().enumerate() {
        if key_columns[..i].contains(name) {
            return Err(DiffError::RepeatedKeyColumn {
                column: name.clone(),
            });
        }
    }

    key_columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| DiffError::KeyColumnMissing {
                    column: name.clone(),
                    side,
                })
        })
        .collect()
}
