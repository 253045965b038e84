//! Column set comparison

use serde::Serialize;

use crate::model::Table;

/// A column present in only one of the two tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SchemaChange {
    /// Column only exists in the new table
    ColumnAdded { name: String, index: usize },
    /// Column only exists in the old table
    ColumnRemoved { name: String, index: usize },
}

impl std::fmt::Display for SchemaChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaChange::ColumnAdded { name, index } => {
                write!(f, "+ {} (new column at position {})", name, index)
            }
            SchemaChange::ColumnRemoved { name, index } => {
                write!(f, "- {} (removed from position {})", name, index)
            }
        }
    }
}

/// A non-key column present in both tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedColumn {
    pub name: String,
    pub old_index: usize,
    pub new_index: usize,
}

/// Schema comparison engine
pub struct SchemaDiff;

impl SchemaDiff {
    /// Columns present in only one table, old-only first
    pub fn compare(old_table: &Table, new_table: &Table) -> Vec<SchemaChange> {
        let mut changes = Vec::new();

        for (old_idx, old_col) in old_table.columns.iter().enumerate() {
            if new_table.column_index(&old_col.name).is_none() {
                changes.push(SchemaChange::ColumnRemoved {
                    name: old_col.name.clone(),
                    index: old_idx,
                });
            }
        }

        for (new_idx, new_col) in new_table.columns.iter().enumerate() {
            if old_table.column_index(&new_col.name).is_none() {
                changes.push(SchemaChange::ColumnAdded {
                    name: new_col.name.clone(),
                    index: new_idx,
                });
            }
        }

        changes
    }

    /// Non-key columns present in both tables, in old table order
    pub fn shared_columns(
        old_table: &Table,
        new_table: &Table,
        key_columns: &[String],
    ) -> Vec<SharedColumn> {
        old_table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, col)| !key_columns.contains(&col.name))
            .filter_map(|(old_index, col)| {
                new_table.column_index(&col.name).map(|new_index| SharedColumn {
                    name: col.name.clone(),
                    old_index,
                    new_index,
                })
            })
            .collect()
    }
}
