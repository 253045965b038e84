//! Diff engine for comparing tables

pub mod cell_diff;
mod row_diff;
mod schema_diff;

use std::fmt;

use serde::Serialize;

use crate::error::{DiffError, TableSide};
use crate::model::{resolve_key_columns, CellValue, Column, KeyIndex, Row, RowKey, Table};

pub use cell_diff::{cells_equal, normalize, render_cell, CHANGE_ARROW};
pub use row_diff::{partition_keys, KeyPartition};
pub use schema_diff::{SchemaChange, SchemaDiff, SharedColumn};

/// A change to a single cell of a row present in both tables
#[derive(Debug, Clone, Serialize)]
pub struct CellChange {
    /// Key of the row
    pub key: String,
    /// Column name
    pub column: String,
    /// Old value
    pub old_value: CellValue,
    /// New value
    pub new_value: CellValue,
}

/// One of the result sets of a diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSection {
    Removed,
    Added,
    Changed,
}

impl DiffSection {
    pub const ALL: [DiffSection; 3] = [DiffSection::Removed, DiffSection::Added, DiffSection::Changed];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffSection::Removed => "removed",
            DiffSection::Added => "added",
            DiffSection::Changed => "changed",
        }
    }
}

impl fmt::Display for DiffSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics about the diff
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub rows_added: usize,
    pub rows_removed: usize,
    pub rows_modified: usize,
    pub rows_unchanged: usize,
    pub cells_changed: usize,
    pub old_row_count: usize,
    pub new_row_count: usize,
}

/// Result of comparing two tables.
///
/// Each result table starts with the key columns. A section is `None`
/// when it would hold no rows.
#[derive(Debug, Clone, Default)]
pub struct TableDiff {
    /// Key columns the tables were matched on
    pub key_columns: Vec<String>,
    /// Old rows whose key is absent from the new table
    pub removed: Option<Table>,
    /// New rows whose key is absent from the old table
    pub added: Option<Table>,
    /// Rows in both tables with at least one differing shared column
    pub changed: Option<Table>,
    /// Cell-level changes behind `changed`, in row then column order
    pub cell_changes: Vec<CellChange>,
    /// Columns present in only one table (informational)
    pub schema_changes: Vec<SchemaChange>,
    /// Statistics
    pub stats: DiffStats,
}

impl TableDiff {
    /// True when no section holds a row
    pub fn is_empty(&self) -> bool {
        self.removed.is_none() && self.added.is_none() && self.changed.is_none()
    }

    /// Table for a section, if non-empty
    pub fn section(&self, section: DiffSection) -> Option<&Table> {
        match section {
            DiffSection::Removed => self.removed.as_ref(),
            DiffSection::Added => self.added.as_ref(),
            DiffSection::Changed => self.changed.as_ref(),
        }
    }

    /// Non-empty sections in `removed`, `added`, `changed` order
    pub fn sheets(&self) -> impl Iterator<Item = (DiffSection, &Table)> {
        DiffSection::ALL
            .into_iter()
            .filter_map(move |section| self.section(section).map(|table| (section, table)))
    }

    /// Keys of the rows in a section, in row order
    pub fn section_keys(&self, section: DiffSection) -> Vec<RowKey> {
        let key_positions: Vec<usize> = (0..self.key_columns.len()).collect();
        self.section(section)
            .map(|table| {
                table
                    .rows
                    .iter()
                    .map(|row| RowKey::from_row(row, &key_positions))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Main diff engine
pub struct DiffEngine {
    key_columns: Vec<String>,
}

impl DiffEngine {
    /// Create a diff engine matching rows on the given key columns
    pub fn new(key_columns: Vec<String>) -> Self {
        Self { key_columns }
    }

    /// Compare two tables
    pub fn diff(&self, old_table: &Table, new_table: &Table) -> Result<TableDiff, DiffError> {
        // Both sides are checked for key columns before duplicates are looked for
        resolve_key_columns(old_table, &self.key_columns, TableSide::Old)?;
        resolve_key_columns(new_table, &self.key_columns, TableSide::New)?;

        let old_index = KeyIndex::build(old_table, &self.key_columns, TableSide::Old)?;
        let new_index = KeyIndex::build(new_table, &self.key_columns, TableSide::New)?;
        let partition = partition_keys(&old_index, &new_index);

        let mut result = TableDiff {
            key_columns: self.key_columns.clone(),
            schema_changes: SchemaDiff::compare(old_table, new_table),
            ..Default::default()
        };
        result.stats.old_row_count = old_table.row_count();
        result.stats.new_row_count = new_table.row_count();
        result.stats.rows_removed = partition.removed.len();
        result.stats.rows_added = partition.added.len();

        result.removed = project_rows(
            old_table,
            old_index.column_indices(),
            partition.removed.iter().map(|&(_, idx)| idx),
        );
        result.added = project_rows(
            new_table,
            new_index.column_indices(),
            partition.added.iter().map(|&(_, idx)| idx),
        );

        let shared = SchemaDiff::shared_columns(old_table, new_table, &self.key_columns);
        let mut changed = Table::new(
            self.key_columns
                .iter()
                .chain(shared.iter().map(|col| &col.name))
                .enumerate()
                .map(|(i, name)| Column::new(name.as_str(), i))
                .collect(),
        );

        for &(key, old_idx, new_idx) in &partition.common {
            let old_row = &old_table.rows[old_idx];
            let new_row = &new_table.rows[new_idx];
            let changes = compare_shared_cells(key, old_row, new_row, &shared);

            if changes.is_empty() {
                result.stats.rows_unchanged += 1;
                continue;
            }

            let mut cells = key.values().to_vec();
            cells.extend(shared.iter().map(|col| {
                render_cell(cell_at(old_row, col.old_index), cell_at(new_row, col.new_index))
            }));
            changed.rows.push(Row::new(cells, old_row.source_line));

            result.stats.rows_modified += 1;
            result.stats.cells_changed += changes.len();
            result.cell_changes.extend(changes);
        }

        if !changed.is_empty() {
            result.changed = Some(changed);
        }

        Ok(result)
    }
}

/// Compare two tables on the given key columns
pub fn diff_tables(
    old_table: &Table,
    new_table: &Table,
    key_columns: &[String],
) -> Result<TableDiff, DiffError> {
    DiffEngine::new(key_columns.to_vec()).diff(old_table, new_table)
}

static NULL: CellValue = CellValue::Null;

fn cell_at(row: &Row, index: usize) -> &CellValue {
    row.get(index).unwrap_or(&NULL)
}

/// Shared columns whose normalized values differ
fn compare_shared_cells(
    key: &RowKey,
    old_row: &Row,
    new_row: &Row,
    shared: &[SharedColumn],
) -> Vec<CellChange> {
    shared
        .iter()
        .filter_map(|col| {
            let old_value = cell_at(old_row, col.old_index);
            let new_value = cell_at(new_row, col.new_index);
            if cells_equal(old_value, new_value) {
                None
            } else {
                Some(CellChange {
                    key: key.to_string(),
                    column: col.name.clone(),
                    old_value: old_value.clone(),
                    new_value: new_value.clone(),
                })
            }
        })
        .collect()
}

/// Copy the selected rows with the key columns moved to the front.
/// Returns `None` when no row is selected.
fn project_rows(
    table: &Table,
    key_indices: &[usize],
    row_indices: impl Iterator<Item = usize>,
) -> Option<Table> {
    let order: Vec<usize> = key_indices
        .iter()
        .copied()
        .chain((0..table.column_count()).filter(|i| !key_indices.contains(i)))
        .collect();

    let mut projected = Table::new(
        order
            .iter()
            .enumerate()
            .map(|(i, &src)| Column::new(table.columns[src].name.as_str(), i))
            .collect(),
    );
    for idx in row_indices {
        let row = &table.rows[idx];
        let cells = order.iter().map(|&src| cell_at(row, src).clone()).collect();
        projected.rows.push(Row::new(cells, row.source_line));
    }

    if projected.is_empty() {
        None
    } else {
        Some(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn people_old() -> Table {
        Table::with_headers(&["id", "name", "age"])
            .push(vec![1i64.into(), "Alice".into(), 30i64.into()])
            .push(vec![2i64.into(), "Bob".into(), 25i64.into()])
    }

    fn people_new() -> Table {
        Table::with_headers(&["id", "name", "age"])
            .push(vec![1i64.into(), "Alice".into(), 31i64.into()])
            .push(vec![3i64.into(), "Carl".into(), 40i64.into()])
    }

    #[test]
    fn test_added_removed_changed() {
        let diff = diff_tables(&people_old(), &people_new(), &key(&["id"])).unwrap();

        let removed = diff.removed.as_ref().unwrap();
        assert_eq!(removed.row_count(), 1);
        assert_eq!(removed.cell(0, "id"), Some(&CellValue::Int(2)));
        assert_eq!(removed.cell(0, "name"), Some(&CellValue::from("Bob")));

        let added = diff.added.as_ref().unwrap();
        assert_eq!(added.row_count(), 1);
        assert_eq!(added.cell(0, "id"), Some(&CellValue::Int(3)));

        let changed = diff.changed.as_ref().unwrap();
        assert_eq!(changed.column_names().collect::<Vec<_>>(), vec!["id", "name", "age"]);
        assert_eq!(changed.cell(0, "name"), Some(&CellValue::from("Alice")));
        assert_eq!(changed.cell(0, "age"), Some(&CellValue::from("30 ---> 31")));

        assert_eq!(diff.cell_changes.len(), 1);
        assert_eq!(diff.cell_changes[0].key, "1");
        assert_eq!(diff.cell_changes[0].column, "age");
        assert_eq!(
            diff.stats,
            DiffStats {
                rows_added: 1,
                rows_removed: 1,
                rows_modified: 1,
                rows_unchanged: 0,
                cells_changed: 1,
                old_row_count: 2,
                new_row_count: 2,
            }
        );
    }

    #[test]
    fn test_key_columns_lead_projected_rows() {
        let old = Table::with_headers(&["name", "id"]).push(vec!["Bob".into(), 2i64.into()]);
        let new = Table::with_headers(&["name", "id"]);

        let diff = diff_tables(&old, &new, &key(&["id"])).unwrap();
        let removed = diff.removed.unwrap();
        assert_eq!(removed.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(removed.rows[0].cells, vec![CellValue::Int(2), CellValue::from("Bob")]);
        assert!(diff.added.is_none());
    }

    #[test]
    fn test_one_sided_column_never_changes_a_row() {
        let old = Table::with_headers(&["id", "name", "fax"])
            .push(vec![1i64.into(), "Alice".into(), "555".into()]);
        let new = Table::with_headers(&["id", "name", "email"])
            .push(vec![1i64.into(), "Alice".into(), "a@x.org".into()]);

        let diff = diff_tables(&old, &new, &key(&["id"])).unwrap();
        assert!(diff.is_empty());
        assert_eq!(diff.stats.rows_unchanged, 1);
        assert_eq!(diff.schema_changes.len(), 2);
    }

    #[test]
    fn test_changed_only_carries_shared_columns() {
        let old = Table::with_headers(&["id", "name", "fax"])
            .push(vec![1i64.into(), "Alice".into(), "555".into()]);
        let new = Table::with_headers(&["email", "name", "id"])
            .push(vec!["a@x.org".into(), "Alicia".into(), 1i64.into()]);

        let diff = diff_tables(&old, &new, &key(&["id"])).unwrap();
        let changed = diff.changed.unwrap();
        assert_eq!(changed.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(changed.cell(0, "name"), Some(&CellValue::from("Alice ---> Alicia")));
    }

    #[test]
    fn test_whitespace_gates_detection_not_display() {
        let old = Table::with_headers(&["id", "name", "age"])
            .push(vec![1i64.into(), " Alice ".into(), 30i64.into()]);
        let new = Table::with_headers(&["id", "name", "age"])
            .push(vec![1i64.into(), "Alice".into(), 31i64.into()]);

        let diff = diff_tables(&old, &new, &key(&["id"])).unwrap();
        let changed = diff.changed.unwrap();
        assert_eq!(changed.cell(0, "name"), Some(&CellValue::from(" Alice ")));
        assert_eq!(changed.cell(0, "age"), Some(&CellValue::from("30 ---> 31")));
        assert_eq!(diff.cell_changes.len(), 1);
    }

    #[test]
    fn test_blank_text_differs_from_empty_cell() {
        let old = Table::with_headers(&["id", "note"]).push(vec![1i64.into(), "  ".into()]);
        let new = Table::with_headers(&["id", "note"]).push(vec![1i64.into(), CellValue::Null]);

        let diff = diff_tables(&old, &new, &key(&["id"])).unwrap();
        let changed = diff.changed.unwrap();
        assert_eq!(changed.cell(0, "note"), Some(&CellValue::from("   ---> NULL")));
        assert_eq!(diff.stats.cells_changed, 1);
    }

    #[test]
    fn test_missing_key_column_is_reported_before_duplicates() {
        let old = Table::with_headers(&["sku", "qty"])
            .push(vec!["A".into(), 1i64.into()])
            .push(vec!["A".into(), 2i64.into()]);
        let new = Table::with_headers(&["code", "qty"]);

        let err = diff_tables(&old, &new, &key(&["sku"])).unwrap_err();
        assert_eq!(
            err,
            DiffError::KeyColumnMissing {
                column: "sku".to_string(),
                side: TableSide::New,
            }
        );
    }

    #[test]
    fn test_sheets_skip_empty_sections() {
        let new = people_old().push(vec![9i64.into(), "Zed".into(), 50i64.into()]);
        let diff = diff_tables(&people_old(), &new, &key(&["id"])).unwrap();

        let sections: Vec<_> = diff.sheets().map(|(section, _)| section).collect();
        assert_eq!(sections, vec![DiffSection::Added]);
        assert_eq!(diff.section_keys(DiffSection::Added), vec![RowKey::new(vec![CellValue::Int(9)])]);
        assert!(diff.section_keys(DiffSection::Removed).is_empty());
    }
}
